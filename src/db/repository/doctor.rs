use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Doctor, DoctorStatus};

use super::require_non_empty;

const DOCTOR_COLUMNS: &str =
    "id_medico, nombre, apellidos, duracion_cita, telefono, rut, estado, correo, especialidad";

pub fn insert_doctor(conn: &Connection, d: &Doctor) -> Result<i64, DatabaseError> {
    require_non_empty(&d.nombre, "nombre")?;
    require_non_empty(&d.especialidad, "especialidad")?;
    conn.execute(
        "INSERT INTO medico (nombre, apellidos, duracion_cita, telefono, rut, estado, correo, especialidad)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            d.nombre,
            d.apellidos,
            d.duracion_cita,
            d.telefono,
            d.rut,
            d.estado.map(|e| e.as_str()),
            d.correo,
            d.especialidad,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_doctor(conn: &Connection, id: i64) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {DOCTOR_COLUMNS} FROM medico WHERE id_medico = ?1"),
        params![id],
        row_to_doctor,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {DOCTOR_COLUMNS} FROM medico ORDER BY nombre"))?;
    let rows = stmt.query_map([], row_to_doctor)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn update_doctor(conn: &Connection, d: &Doctor) -> Result<(), DatabaseError> {
    require_non_empty(&d.nombre, "nombre")?;
    require_non_empty(&d.especialidad, "especialidad")?;
    let affected = conn.execute(
        "UPDATE medico SET nombre = ?1, apellidos = ?2, duracion_cita = ?3, telefono = ?4,
             rut = ?5, estado = ?6, correo = ?7, especialidad = ?8
         WHERE id_medico = ?9",
        params![
            d.nombre,
            d.apellidos,
            d.duracion_cita,
            d.telefono,
            d.rut,
            d.estado.map(|e| e.as_str()),
            d.correo,
            d.especialidad,
            d.id,
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "medico".into(),
            id: d.id,
        });
    }
    Ok(())
}

pub fn delete_doctor(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM medico WHERE id_medico = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "medico".into(),
            id,
        });
    }
    Ok(())
}

fn row_to_doctor(row: &rusqlite::Row) -> Result<Doctor, rusqlite::Error> {
    let estado: Option<String> = row.get(6)?;
    Ok(Doctor {
        id: row.get(0)?,
        nombre: row.get(1)?,
        apellidos: row.get(2)?,
        duracion_cita: row.get(3)?,
        telefono: row.get(4)?,
        rut: row.get(5)?,
        estado: estado.and_then(|e| DoctorStatus::from_str(&e).ok()),
        correo: row.get(7)?,
        especialidad: row.get(8)?,
    })
}
