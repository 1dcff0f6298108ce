use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{VisitRecord, VitalSigns};

use super::require_non_empty;

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Joined display row for the visit export: ficha, optional vitals,
/// patient display fields.
#[derive(Debug, Clone)]
pub struct VisitDetail {
    pub visit: VisitRecord,
    pub vitals: Option<VitalSigns>,
    pub rut_paciente: Option<String>,
    pub nombre_paciente: String,
}

pub fn insert_visit(conn: &Connection, v: &VisitRecord) -> Result<i64, DatabaseError> {
    require_non_empty(&v.motivo_consulta, "motivo_consulta")?;
    conn.execute(
        "INSERT INTO ficha_medica (id_paciente, fecha_hora, motivo_consulta, anamnesis, observaciones)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            v.id_paciente,
            v.fecha_hora.format(DATETIME_FMT).to_string(),
            v.motivo_consulta,
            v.anamnesis,
            v.observaciones,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_visit(conn: &Connection, id: i64) -> Result<Option<VisitRecord>, DatabaseError> {
    conn.query_row(
        "SELECT id_ficha, id_paciente, fecha_hora, motivo_consulta, anamnesis, observaciones
         FROM ficha_medica WHERE id_ficha = ?1",
        params![id],
        row_to_visit,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Visits of one patient, most recent first.
pub fn list_visits_for_patient(
    conn: &Connection,
    id_paciente: i64,
) -> Result<Vec<VisitRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id_ficha, id_paciente, fecha_hora, motivo_consulta, anamnesis, observaciones
         FROM ficha_medica
         WHERE id_paciente = ?1
         ORDER BY datetime(fecha_hora) DESC",
    )?;
    let rows = stmt.query_map(params![id_paciente], row_to_visit)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// All visits joined with vitals and patient display fields, most recent
/// first — the export projection.
pub fn list_visit_details(conn: &Connection) -> Result<Vec<VisitDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT F.id_ficha, F.id_paciente, F.fecha_hora, F.motivo_consulta, F.anamnesis,
                F.observaciones,
                SV.id_signos, SV.presion_arterial, SV.temperatura, SV.frecuencia_cardiaca, SV.peso,
                P.rut, P.nombre
         FROM ficha_medica F
         JOIN paciente P ON P.id_paciente = F.id_paciente
         LEFT JOIN signos_vitales SV ON SV.id_ficha = F.id_ficha
         ORDER BY datetime(F.fecha_hora) DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        let visit = row_to_visit(row)?;
        let id_signos: Option<i64> = row.get(6)?;
        let vitals = id_signos.map(|sid| {
            Ok::<_, rusqlite::Error>(VitalSigns {
                id: sid,
                id_ficha: visit.id,
                presion_arterial: row.get(7)?,
                temperatura: row.get(8)?,
                frecuencia_cardiaca: row.get(9)?,
                peso: row.get(10)?,
            })
        });
        Ok(VisitDetail {
            vitals: vitals.transpose()?,
            rut_paciente: row.get(11)?,
            nombre_paciente: row.get(12)?,
            visit,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Natural keys (id_paciente, fecha_hora) of every stored visit.
pub fn list_visit_keys(conn: &Connection) -> Result<Vec<(i64, String)>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id_paciente, fecha_hora FROM ficha_medica")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn update_visit(conn: &Connection, v: &VisitRecord) -> Result<(), DatabaseError> {
    require_non_empty(&v.motivo_consulta, "motivo_consulta")?;
    let affected = conn.execute(
        "UPDATE ficha_medica SET fecha_hora = ?1, motivo_consulta = ?2, anamnesis = ?3,
             observaciones = ?4
         WHERE id_ficha = ?5",
        params![
            v.fecha_hora.format(DATETIME_FMT).to_string(),
            v.motivo_consulta,
            v.anamnesis,
            v.observaciones,
            v.id,
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "ficha_medica".into(),
            id: v.id,
        });
    }
    Ok(())
}

pub fn delete_visit(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM ficha_medica WHERE id_ficha = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "ficha_medica".into(),
            id,
        });
    }
    Ok(())
}

/// Store the vitals snapshot for a visit. Empty snapshots are never written.
pub fn insert_vital_signs(conn: &Connection, vs: &VitalSigns) -> Result<i64, DatabaseError> {
    if vs.is_empty() {
        return Err(DatabaseError::EmptyField("signos_vitales"));
    }
    conn.execute(
        "INSERT INTO signos_vitales (id_ficha, presion_arterial, temperatura, frecuencia_cardiaca, peso)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            vs.id_ficha,
            vs.presion_arterial,
            vs.temperatura,
            vs.frecuencia_cardiaca,
            vs.peso,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_vital_signs_for_visit(
    conn: &Connection,
    id_ficha: i64,
) -> Result<Option<VitalSigns>, DatabaseError> {
    conn.query_row(
        "SELECT id_signos, id_ficha, presion_arterial, temperatura, frecuencia_cardiaca, peso
         FROM signos_vitales WHERE id_ficha = ?1",
        params![id_ficha],
        |row| {
            Ok(VitalSigns {
                id: row.get(0)?,
                id_ficha: row.get(1)?,
                presion_arterial: row.get(2)?,
                temperatura: row.get(3)?,
                frecuencia_cardiaca: row.get(4)?,
                peso: row.get(5)?,
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Replace a visit's vitals: delete whatever exists, insert the new
/// snapshot unless it is empty.
pub fn upsert_vital_signs(conn: &Connection, vs: &VitalSigns) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM signos_vitales WHERE id_ficha = ?1",
        params![vs.id_ficha],
    )?;
    if !vs.is_empty() {
        insert_vital_signs(conn, vs)?;
    }
    Ok(())
}

fn row_to_visit(row: &rusqlite::Row) -> Result<VisitRecord, rusqlite::Error> {
    let fecha_hora: String = row.get(2)?;
    Ok(VisitRecord {
        id: row.get(0)?,
        id_paciente: row.get(1)?,
        fecha_hora: NaiveDateTime::parse_from_str(&fecha_hora, DATETIME_FMT)
            .or_else(|_| NaiveDateTime::parse_from_str(&fecha_hora, "%Y-%m-%d %H:%M"))
            .unwrap_or_default(),
        motivo_consulta: row.get(3)?,
        anamnesis: row.get(4)?,
        observaciones: row.get(5)?,
    })
}
