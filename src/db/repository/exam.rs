use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{ExamRequest, ExamResult};

use super::require_non_empty;

pub fn insert_exam_request(conn: &Connection, e: &ExamRequest) -> Result<i64, DatabaseError> {
    require_non_empty(&e.tipo_examen, "tipo_examen")?;
    conn.execute(
        "INSERT INTO solicitud_examen (id_ficha, tipo_examen, fecha_solicitud, observaciones, estado)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![e.id_ficha, e.tipo_examen, e.fecha_solicitud, e.observaciones, e.estado],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_exam_requests_for_visit(
    conn: &Connection,
    id_ficha: i64,
) -> Result<Vec<ExamRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, id_ficha, tipo_examen, fecha_solicitud, observaciones, estado
         FROM solicitud_examen WHERE id_ficha = ?1 ORDER BY fecha_solicitud DESC",
    )?;
    let rows = stmt.query_map(params![id_ficha], row_to_exam_request)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// All requests of one patient across their visits, newest first.
pub fn list_exam_requests_for_patient(
    conn: &Connection,
    id_paciente: i64,
) -> Result<Vec<ExamRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT SE.id, SE.id_ficha, SE.tipo_examen, SE.fecha_solicitud, SE.observaciones, SE.estado
         FROM solicitud_examen SE
         JOIN ficha_medica F ON F.id_ficha = SE.id_ficha
         WHERE F.id_paciente = ?1
         ORDER BY SE.fecha_solicitud DESC",
    )?;
    let rows = stmt.query_map(params![id_paciente], row_to_exam_request)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_exam_request(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM solicitud_examen WHERE id = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "solicitud_examen".into(),
            id,
        });
    }
    Ok(())
}

pub fn insert_exam_result(conn: &Connection, r: &ExamResult) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO resultado_examen (id_solicitud, fecha_resultado, archivo_adjunto, resultado_texto)
         VALUES (?1, ?2, ?3, ?4)",
        params![r.id_solicitud, r.fecha_resultado, r.archivo_adjunto, r.resultado_texto],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_exam_result_for_request(
    conn: &Connection,
    id_solicitud: i64,
) -> Result<Option<ExamResult>, DatabaseError> {
    conn.query_row(
        "SELECT id, id_solicitud, fecha_resultado, archivo_adjunto, resultado_texto
         FROM resultado_examen WHERE id_solicitud = ?1",
        params![id_solicitud],
        |row| {
            Ok(ExamResult {
                id: row.get(0)?,
                id_solicitud: row.get(1)?,
                fecha_resultado: row.get(2)?,
                archivo_adjunto: row.get(3)?,
                resultado_texto: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn delete_exam_result(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM resultado_examen WHERE id = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "resultado_examen".into(),
            id,
        });
    }
    Ok(())
}

fn row_to_exam_request(row: &rusqlite::Row) -> Result<ExamRequest, rusqlite::Error> {
    Ok(ExamRequest {
        id: row.get(0)?,
        id_ficha: row.get(1)?,
        tipo_examen: row.get(2)?,
        fecha_solicitud: row.get(3)?,
        observaciones: row.get(4)?,
        estado: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_patient, insert_visit};
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Patient, VisitRecord};
    use chrono::NaiveDateTime;

    fn seed_visit(conn: &Connection) -> (i64, i64) {
        let pid = insert_patient(
            conn,
            &Patient {
                rut: Some("12345678-5".into()),
                nombre: "Ana Díaz".into(),
                ..Patient::default()
            },
        )
        .unwrap();
        let fid = insert_visit(
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
        .unwrap();
        (pid, fid)
    }

    #[test]
    fn request_and_result_flow() {
        let conn = open_memory_database().unwrap();
        let (pid, fid) = seed_visit(&conn);

        let req_id = insert_exam_request(
            &conn,
            &ExamRequest {
                id: 0,
                id_ficha: fid,
                tipo_examen: "Hemograma".into(),
                fecha_solicitud: Some("2025-11-20".into()),
                observaciones: None,
                estado: Some("Pendiente".into()),
            },
        )
        .unwrap();

        insert_exam_result(
            &conn,
            &ExamResult {
                id: 0,
                id_solicitud: req_id,
                fecha_resultado: Some("2025-11-25".into()),
                archivo_adjunto: Some("hemograma.pdf".into()),
                resultado_texto: Some("Dentro de rangos normales".into()),
            },
        )
        .unwrap();

        let result = get_exam_result_for_request(&conn, req_id).unwrap().unwrap();
        assert_eq!(result.archivo_adjunto.as_deref(), Some("hemograma.pdf"));
        assert_eq!(list_exam_requests_for_patient(&conn, pid).unwrap().len(), 1);
    }

    #[test]
    fn empty_exam_type_rejected() {
        let conn = open_memory_database().unwrap();
        let (_, fid) = seed_visit(&conn);
        let err = insert_exam_request(
            &conn,
            &ExamRequest {
                id: 0,
                id_ficha: fid,
                tipo_examen: "".into(),
                fecha_solicitud: None,
                observaciones: None,
                estado: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::EmptyField("tipo_examen")));
    }

    #[test]
    fn deleting_request_cascades_result() {
        let conn = open_memory_database().unwrap();
        let (_, fid) = seed_visit(&conn);
        let req_id = insert_exam_request(
            &conn,
            &ExamRequest {
                id: 0,
                id_ficha: fid,
                tipo_examen: "Radiografía".into(),
                fecha_solicitud: None,
                observaciones: None,
                estado: None,
            },
        )
        .unwrap();
        insert_exam_result(
            &conn,
            &ExamResult {
                id: 0,
                id_solicitud: req_id,
                fecha_resultado: None,
                archivo_adjunto: None,
                resultado_texto: Some("Sin hallazgos".into()),
            },
        )
        .unwrap();

        delete_exam_request(&conn, req_id).unwrap();
        assert!(get_exam_result_for_request(&conn, req_id).unwrap().is_none());
    }
}
