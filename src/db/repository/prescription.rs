use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Prescription;

pub fn insert_prescription(conn: &Connection, p: &Prescription) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescripcion (id_ficha, medicamento, dosis, frecuencia, duracion,
             via_administracion, fecha_emision, observaciones, estado)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            p.id_ficha,
            p.medicamento,
            p.dosis,
            p.frecuencia,
            p.duracion,
            p.via_administracion,
            p.fecha_emision,
            p.observaciones,
            p.estado,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_prescriptions_for_visit(
    conn: &Connection,
    id_ficha: i64,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id_prescripcion, id_ficha, medicamento, dosis, frecuencia, duracion,
                via_administracion, fecha_emision, observaciones, estado
         FROM prescripcion WHERE id_ficha = ?1 ORDER BY fecha_emision DESC",
    )?;
    let rows = stmt.query_map(params![id_ficha], |row| {
        Ok(Prescription {
            id: row.get(0)?,
            id_ficha: row.get(1)?,
            medicamento: row.get(2)?,
            dosis: row.get(3)?,
            frecuencia: row.get(4)?,
            duracion: row.get(5)?,
            via_administracion: row.get(6)?,
            fecha_emision: row.get(7)?,
            observaciones: row.get(8)?,
            estado: row.get(9)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_prescription(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM prescripcion WHERE id_prescripcion = ?1",
        params![id],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "prescripcion".into(),
            id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_patient, insert_visit};
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Patient, VisitRecord};
    use chrono::NaiveDateTime;

    fn seed_visit(conn: &Connection) -> i64 {
        let pid = insert_patient(
            conn,
            &Patient {
                rut: Some("12345678-5".into()),
                nombre: "Ana Díaz".into(),
                ..Patient::default()
            },
        )
        .unwrap();
        insert_visit(
            conn,
            &VisitRecord {
                id: 0,
                id_paciente: pid,
                fecha_hora: NaiveDateTime::parse_from_str(
                    "2025-11-20 10:00:00",
                    "%Y-%m-%d %H:%M:%S",
                )
                .unwrap(),
                motivo_consulta: "Control".into(),
                anamnesis: None,
                observaciones: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn several_prescriptions_per_visit() {
        let conn = open_memory_database().unwrap();
        let fid = seed_visit(&conn);
        for med in ["Paracetamol", "Ibuprofeno"] {
            insert_prescription(
                &conn,
                &Prescription {
                    id_ficha: fid,
                    medicamento: Some(med.into()),
                    dosis: Some("500mg".into()),
                    frecuencia: Some("cada 8 horas".into()),
                    fecha_emision: Some("2025-11-20".into()),
                    estado: Some("Pendiente".into()),
                    ..Prescription::default()
                },
            )
            .unwrap();
        }
        assert_eq!(list_prescriptions_for_visit(&conn, fid).unwrap().len(), 2);
    }

    #[test]
    fn delete_prescription_works() {
        let conn = open_memory_database().unwrap();
        let fid = seed_visit(&conn);
        let id = insert_prescription(
            &conn,
            &Prescription {
                id_ficha: fid,
                medicamento: Some("Amoxicilina".into()),
                ..Prescription::default()
            },
        )
        .unwrap();
        delete_prescription(&conn, id).unwrap();
        assert!(list_prescriptions_for_visit(&conn, fid).unwrap().is_empty());
    }
}
