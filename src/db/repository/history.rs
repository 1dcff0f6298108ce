//! Patient background ("antecedentes"): six independent child tables, each
//! with the same add / list / delete lifecycle.

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{
    ChronicCondition, CurrentMedication, DeclaredAllergy, PatientHabit, PriorSurgery,
    PriorTreatment,
};

use super::require_non_empty;

fn delete_by_id(conn: &Connection, table: &str, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: table.into(),
            id,
        });
    }
    Ok(())
}

pub fn insert_chronic_condition(
    conn: &Connection,
    c: &ChronicCondition,
) -> Result<i64, DatabaseError> {
    require_non_empty(&c.nombre_enfermedad, "nombre_enfermedad")?;
    conn.execute(
        "INSERT INTO enfermedad_cronica (id_paciente, nombre_enfermedad, observacion, tratamiento_actual, anio_diagnostico)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![c.id_paciente, c.nombre_enfermedad, c.observacion, c.tratamiento_actual, c.anio_diagnostico],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_chronic_conditions(
    conn: &Connection,
    id_paciente: i64,
) -> Result<Vec<ChronicCondition>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, id_paciente, nombre_enfermedad, observacion, tratamiento_actual, anio_diagnostico
         FROM enfermedad_cronica WHERE id_paciente = ?1 ORDER BY nombre_enfermedad",
    )?;
    let rows = stmt.query_map(params![id_paciente], |row| {
        Ok(ChronicCondition {
            id: row.get(0)?,
            id_paciente: row.get(1)?,
            nombre_enfermedad: row.get(2)?,
            observacion: row.get(3)?,
            tratamiento_actual: row.get(4)?,
            anio_diagnostico: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_chronic_condition(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    delete_by_id(conn, "enfermedad_cronica", id)
}

pub fn insert_prior_surgery(conn: &Connection, s: &PriorSurgery) -> Result<i64, DatabaseError> {
    require_non_empty(&s.nombre, "nombre")?;
    conn.execute(
        "INSERT INTO cirugia_previa (id_paciente, nombre, fecha, observacion) VALUES (?1, ?2, ?3, ?4)",
        params![s.id_paciente, s.nombre, s.fecha, s.observacion],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_prior_surgeries(
    conn: &Connection,
    id_paciente: i64,
) -> Result<Vec<PriorSurgery>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, id_paciente, nombre, fecha, observacion
         FROM cirugia_previa WHERE id_paciente = ?1 ORDER BY fecha DESC",
    )?;
    let rows = stmt.query_map(params![id_paciente], |row| {
        Ok(PriorSurgery {
            id: row.get(0)?,
            id_paciente: row.get(1)?,
            nombre: row.get(2)?,
            fecha: row.get(3)?,
            observacion: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_prior_surgery(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    delete_by_id(conn, "cirugia_previa", id)
}

pub fn insert_declared_allergy(
    conn: &Connection,
    a: &DeclaredAllergy,
) -> Result<i64, DatabaseError> {
    require_non_empty(&a.sustancia, "sustancia")?;
    conn.execute(
        "INSERT INTO alergia_paciente (id_paciente, sustancia, reaccion, gravedad) VALUES (?1, ?2, ?3, ?4)",
        params![a.id_paciente, a.sustancia, a.reaccion, a.gravedad],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_declared_allergies(
    conn: &Connection,
    id_paciente: i64,
) -> Result<Vec<DeclaredAllergy>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, id_paciente, sustancia, reaccion, gravedad
         FROM alergia_paciente WHERE id_paciente = ?1 ORDER BY sustancia",
    )?;
    let rows = stmt.query_map(params![id_paciente], |row| {
        Ok(DeclaredAllergy {
            id: row.get(0)?,
            id_paciente: row.get(1)?,
            sustancia: row.get(2)?,
            reaccion: row.get(3)?,
            gravedad: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_declared_allergy(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    delete_by_id(conn, "alergia_paciente", id)
}

pub fn insert_current_medication(
    conn: &Connection,
    m: &CurrentMedication,
) -> Result<i64, DatabaseError> {
    require_non_empty(&m.nombre, "nombre")?;
    conn.execute(
        "INSERT INTO medicamento_actual (id_paciente, nombre, dosis, frecuencia, via, indicaciones)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![m.id_paciente, m.nombre, m.dosis, m.frecuencia, m.via, m.indicaciones],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_current_medications(
    conn: &Connection,
    id_paciente: i64,
) -> Result<Vec<CurrentMedication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, id_paciente, nombre, dosis, frecuencia, via, indicaciones
         FROM medicamento_actual WHERE id_paciente = ?1 ORDER BY nombre",
    )?;
    let rows = stmt.query_map(params![id_paciente], |row| {
        Ok(CurrentMedication {
            id: row.get(0)?,
            id_paciente: row.get(1)?,
            nombre: row.get(2)?,
            dosis: row.get(3)?,
            frecuencia: row.get(4)?,
            via: row.get(5)?,
            indicaciones: row.get(6)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_current_medication(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    delete_by_id(conn, "medicamento_actual", id)
}

pub fn insert_patient_habit(conn: &Connection, h: &PatientHabit) -> Result<i64, DatabaseError> {
    require_non_empty(&h.tipo, "tipo")?;
    conn.execute(
        "INSERT INTO habito_paciente (id_paciente, tipo, descripcion, frecuencia) VALUES (?1, ?2, ?3, ?4)",
        params![h.id_paciente, h.tipo, h.descripcion, h.frecuencia],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_patient_habits(
    conn: &Connection,
    id_paciente: i64,
) -> Result<Vec<PatientHabit>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, id_paciente, tipo, descripcion, frecuencia
         FROM habito_paciente WHERE id_paciente = ?1 ORDER BY tipo",
    )?;
    let rows = stmt.query_map(params![id_paciente], |row| {
        Ok(PatientHabit {
            id: row.get(0)?,
            id_paciente: row.get(1)?,
            tipo: row.get(2)?,
            descripcion: row.get(3)?,
            frecuencia: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_patient_habit(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    delete_by_id(conn, "habito_paciente", id)
}

pub fn insert_prior_treatment(
    conn: &Connection,
    t: &PriorTreatment,
) -> Result<i64, DatabaseError> {
    require_non_empty(&t.nombre, "nombre")?;
    conn.execute(
        "INSERT INTO tratamiento_previo (id_paciente, nombre, fecha_inicio, fecha_fin, resultado)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![t.id_paciente, t.nombre, t.fecha_inicio, t.fecha_fin, t.resultado],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_prior_treatments(
    conn: &Connection,
    id_paciente: i64,
) -> Result<Vec<PriorTreatment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, id_paciente, nombre, fecha_inicio, fecha_fin, resultado
         FROM tratamiento_previo WHERE id_paciente = ?1 ORDER BY fecha_inicio DESC",
    )?;
    let rows = stmt.query_map(params![id_paciente], |row| {
        Ok(PriorTreatment {
            id: row.get(0)?,
            id_paciente: row.get(1)?,
            nombre: row.get(2)?,
            fecha_inicio: row.get(3)?,
            fecha_fin: row.get(4)?,
            resultado: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_prior_treatment(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    delete_by_id(conn, "tratamiento_previo", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Patient;

    fn seed_patient(conn: &Connection) -> i64 {
        insert_patient(
            conn,
            &Patient {
                rut: Some("12345678-5".into()),
                nombre: "Ana Díaz".into(),
                ..Patient::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn history_tables_are_independent() {
        let conn = open_memory_database().unwrap();
        let pid = seed_patient(&conn);

        insert_declared_allergy(
            &conn,
            &DeclaredAllergy {
                id: 0,
                id_paciente: pid,
                sustancia: "Penicilina".into(),
                reaccion: Some("Urticaria".into()),
                gravedad: Some("Moderada".into()),
            },
        )
        .unwrap();
        insert_patient_habit(
            &conn,
            &PatientHabit {
                id: 0,
                id_paciente: pid,
                tipo: "Tabaquismo".into(),
                descripcion: None,
                frecuencia: Some("Diario".into()),
            },
        )
        .unwrap();

        assert_eq!(list_declared_allergies(&conn, pid).unwrap().len(), 1);
        assert_eq!(list_patient_habits(&conn, pid).unwrap().len(), 1);
        assert!(list_chronic_conditions(&conn, pid).unwrap().is_empty());
    }

    #[test]
    fn required_names_enforced() {
        let conn = open_memory_database().unwrap();
        let pid = seed_patient(&conn);
        let err = insert_chronic_condition(
            &conn,
            &ChronicCondition {
                id: 0,
                id_paciente: pid,
                nombre_enfermedad: "".into(),
                observacion: None,
                tratamiento_actual: None,
                anio_diagnostico: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::EmptyField(_)));
    }

    #[test]
    fn delete_removes_single_row() {
        let conn = open_memory_database().unwrap();
        let pid = seed_patient(&conn);
        let id = insert_prior_surgery(
            &conn,
            &PriorSurgery {
                id: 0,
                id_paciente: pid,
                nombre: "Apendicectomía".into(),
                fecha: Some("2019-03-02".into()),
                observacion: None,
            },
        )
        .unwrap();
        delete_prior_surgery(&conn, id).unwrap();
        assert!(list_prior_surgeries(&conn, pid).unwrap().is_empty());
        assert!(delete_prior_surgery(&conn, id).is_err());
    }
}
