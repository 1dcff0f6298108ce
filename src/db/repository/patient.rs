use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::Patient;

use super::require_non_empty;

const PATIENT_COLUMNS: &str = "id_paciente, rut, nombre, fecha_nacimiento, correo, telefono, \
     direccion, alergias, enfermedades_previas, nacionalidad, sexo, estado_civil, \
     tipo_paciente, tipo_sangre, prevision";

/// Insert a patient and return the assigned id. A colliding RUT surfaces as
/// `Duplicate`, never as a raw SQLite error.
pub fn insert_patient(conn: &Connection, p: &Patient) -> Result<i64, DatabaseError> {
    require_non_empty(&p.nombre, "nombre")?;
    conn.execute(
        "INSERT INTO paciente (rut, nombre, fecha_nacimiento, correo, telefono, direccion,
             alergias, enfermedades_previas, nacionalidad, sexo, estado_civil,
             tipo_paciente, tipo_sangre, prevision)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            p.rut,
            p.nombre,
            p.fecha_nacimiento.map(|d| d.format("%Y-%m-%d").to_string()),
            p.correo,
            p.telefono,
            p.direccion,
            p.alergias,
            p.enfermedades_previas,
            p.nacionalidad,
            p.sexo,
            p.estado_civil,
            p.tipo_paciente,
            p.tipo_sangre,
            p.prevision,
        ],
    )
    .map_err(|e| DatabaseError::on_insert(e, "paciente", p.rut.as_deref().unwrap_or("")))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {PATIENT_COLUMNS} FROM paciente WHERE id_paciente = ?1"),
        params![id],
        row_to_patient,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn get_patient_by_rut(conn: &Connection, rut: &str) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {PATIENT_COLUMNS} FROM paciente WHERE rut = ?1"),
        params![rut],
        row_to_patient,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// All patients ordered by name, as the listing screen shows them.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {PATIENT_COLUMNS} FROM paciente ORDER BY nombre"))?;
    let rows = stmt.query_map([], row_to_patient)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn update_patient(conn: &Connection, p: &Patient) -> Result<(), DatabaseError> {
    require_non_empty(&p.nombre, "nombre")?;
    let affected = conn.execute(
        "UPDATE paciente SET rut = ?1, nombre = ?2, fecha_nacimiento = ?3, correo = ?4,
             telefono = ?5, direccion = ?6, alergias = ?7, enfermedades_previas = ?8,
             nacionalidad = ?9, sexo = ?10, estado_civil = ?11, tipo_paciente = ?12,
             tipo_sangre = ?13, prevision = ?14
         WHERE id_paciente = ?15",
        params![
            p.rut,
            p.nombre,
            p.fecha_nacimiento.map(|d| d.format("%Y-%m-%d").to_string()),
            p.correo,
            p.telefono,
            p.direccion,
            p.alergias,
            p.enfermedades_previas,
            p.nacionalidad,
            p.sexo,
            p.estado_civil,
            p.tipo_paciente,
            p.tipo_sangre,
            p.prevision,
            p.id,
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "paciente".into(),
            id: p.id,
        });
    }
    Ok(())
}

/// Delete a patient; visit records, appointments and history rows go with it
/// through the declared cascades.
pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM paciente WHERE id_paciente = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "paciente".into(),
            id,
        });
    }
    Ok(())
}

fn row_to_patient(row: &rusqlite::Row) -> Result<Patient, rusqlite::Error> {
    let fecha: Option<String> = row.get(3)?;
    Ok(Patient {
        id: row.get(0)?,
        rut: row.get(1)?,
        nombre: row.get(2)?,
        fecha_nacimiento: fecha
            .and_then(|f| NaiveDate::parse_from_str(&f, "%Y-%m-%d").ok()),
        correo: row.get(4)?,
        telefono: row.get(5)?,
        direccion: row.get(6)?,
        alergias: row.get(7)?,
        enfermedades_previas: row.get(8)?,
        nacionalidad: row.get(9)?,
        sexo: row.get(10)?,
        estado_civil: row.get(11)?,
        tipo_paciente: row.get(12)?,
        tipo_sangre: row.get(13)?,
        prevision: row.get(14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn make_patient(rut: &str, nombre: &str) -> Patient {
        Patient {
            rut: Some(rut.to_string()),
            nombre: nombre.to_string(),
            fecha_nacimiento: NaiveDate::from_ymd_opt(1985, 6, 20),
            prevision: Some("Fonasa".to_string()),
            ..Patient::default()
        }
    }

    #[test]
    fn insert_and_retrieve() {
        let conn = open_memory_database().unwrap();
        let id = insert_patient(&conn, &make_patient("12345678-5", "Ana Díaz")).unwrap();
        assert!(id > 0);

        let p = get_patient(&conn, id).unwrap().unwrap();
        assert_eq!(p.nombre, "Ana Díaz");
        assert_eq!(p.rut.as_deref(), Some("12345678-5"));
        assert_eq!(p.fecha_nacimiento, NaiveDate::from_ymd_opt(1985, 6, 20));
    }

    #[test]
    fn empty_name_rejected_before_write() {
        let conn = open_memory_database().unwrap();
        let err = insert_patient(&conn, &make_patient("12345678-5", "  ")).unwrap_err();
        assert!(matches!(err, DatabaseError::EmptyField("nombre")));
        assert!(list_patients(&conn).unwrap().is_empty());
    }

    #[test]
    fn duplicate_rut_reported_as_duplicate() {
        let conn = open_memory_database().unwrap();
        insert_patient(&conn, &make_patient("12345678-5", "Ana Díaz")).unwrap();
        let err = insert_patient(&conn, &make_patient("12345678-5", "Otra Ana")).unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate { .. }));
    }

    #[test]
    fn invalid_prevision_rejected_by_check() {
        let conn = open_memory_database().unwrap();
        let mut p = make_patient("12345678-5", "Ana Díaz");
        p.prevision = Some("Particular".to_string());
        assert!(insert_patient(&conn, &p).is_err());
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let conn = open_memory_database().unwrap();
        let mut p = make_patient("12345678-5", "Ana Díaz");
        p.id = 99;
        let err = update_patient(&conn, &p).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn delete_cascades_to_children() {
        let conn = open_memory_database().unwrap();
        let id = insert_patient(&conn, &make_patient("12345678-5", "Ana Díaz")).unwrap();
        conn.execute(
            "INSERT INTO alergia_paciente (id_paciente, sustancia) VALUES (?1, 'Penicilina')",
            params![id],
        )
        .unwrap();

        delete_patient(&conn, id).unwrap();
        let left: i64 = conn
            .query_row("SELECT COUNT(*) FROM alergia_paciente", [], |r| r.get(0))
            .unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn list_is_ordered_by_name() {
        let conn = open_memory_database().unwrap();
        insert_patient(&conn, &make_patient("9876543-3", "Zoila Rojas")).unwrap();
        insert_patient(&conn, &make_patient("12345678-5", "Ana Díaz")).unwrap();
        let all = list_patients(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].nombre, "Ana Díaz");
    }
}
