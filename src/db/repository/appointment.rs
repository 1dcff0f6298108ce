use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus};

/// Joined display row for listings and the appointments export.
#[derive(Debug, Clone)]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub rut_paciente: Option<String>,
    pub nombre_paciente: String,
    pub nombre_medico: String,
    pub especialidad_medico: String,
}

/// Book a slot. Same-slot double bookings are allowed; only the foreign
/// keys are checked by the store.
pub fn insert_appointment(conn: &Connection, a: &Appointment) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO cita (fecha, hora, estado, id_paciente, id_medico)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            a.fecha.format("%Y-%m-%d").to_string(),
            a.hora.format("%H:%M:%S").to_string(),
            a.estado.as_str(),
            a.id_paciente,
            a.id_medico,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    conn.query_row(
        "SELECT id_cita, fecha, hora, estado, id_paciente, id_medico FROM cita WHERE id_cita = ?1",
        params![id],
        row_to_appointment,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Appointments with patient and doctor display fields, newest first.
pub fn list_appointment_details(
    conn: &Connection,
) -> Result<Vec<AppointmentDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT C.id_cita, C.fecha, C.hora, C.estado, C.id_paciente, C.id_medico,
                P.rut, P.nombre, M.nombre, M.especialidad
         FROM cita C
         JOIN paciente P ON P.id_paciente = C.id_paciente
         JOIN medico   M ON M.id_medico   = C.id_medico
         ORDER BY C.fecha DESC, C.hora DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AppointmentDetail {
            appointment: row_to_appointment(row)?,
            rut_paciente: row.get(6)?,
            nombre_paciente: row.get(7)?,
            nombre_medico: row.get(8)?,
            especialidad_medico: row.get(9)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Natural keys (fecha, hora, id_paciente, id_medico) of every stored
/// appointment.
pub fn list_appointment_keys(
    conn: &Connection,
) -> Result<Vec<(String, String, i64, i64)>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT fecha, hora, id_paciente, id_medico FROM cita")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn set_appointment_status(
    conn: &Connection,
    id: i64,
    estado: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE cita SET estado = ?1 WHERE id_cita = ?2",
        params![estado.as_str(), id],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "cita".into(),
            id,
        });
    }
    Ok(())
}

pub fn delete_appointment(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM cita WHERE id_cita = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "cita".into(),
            id,
        });
    }
    Ok(())
}

fn row_to_appointment(row: &rusqlite::Row) -> Result<Appointment, rusqlite::Error> {
    let fecha: String = row.get(1)?;
    let hora: String = row.get(2)?;
    let estado: String = row.get(3)?;
    Ok(Appointment {
        id: row.get(0)?,
        fecha: NaiveDate::parse_from_str(&fecha, "%Y-%m-%d").unwrap_or_default(),
        hora: NaiveTime::parse_from_str(&hora, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&hora, "%H:%M"))
            .unwrap_or_default(),
        estado: AppointmentStatus::from_str(&estado).unwrap_or(AppointmentStatus::Scheduled),
        id_paciente: row.get(4)?,
        id_medico: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_doctor, insert_patient};
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Doctor, DoctorStatus, Patient};

    fn seed(conn: &Connection) -> (i64, i64) {
        let pid = insert_patient(
            conn,
            &Patient {
                rut: Some("12345678-5".into()),
                nombre: "Ana Díaz".into(),
                ..Patient::default()
            },
        )
        .unwrap();
        let mid = insert_doctor(
            conn,
            &Doctor {
                id: 0,
                nombre: "Juan".into(),
                apellidos: Some("Pérez".into()),
                duracion_cita: None,
                telefono: None,
                rut: None,
                estado: Some(DoctorStatus::Active),
                correo: None,
                especialidad: "Cirugía General".into(),
            },
        )
        .unwrap();
        (pid, mid)
    }

    fn make_appointment(pid: i64, mid: i64) -> Appointment {
        Appointment {
            id: 0,
            fecha: NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
            hora: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            estado: AppointmentStatus::Scheduled,
            id_paciente: pid,
            id_medico: mid,
        }
    }

    #[test]
    fn insert_and_list_with_display_fields() {
        let conn = open_memory_database().unwrap();
        let (pid, mid) = seed(&conn);
        insert_appointment(&conn, &make_appointment(pid, mid)).unwrap();

        let all = list_appointment_details(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].nombre_paciente, "Ana Díaz");
        assert_eq!(all[0].nombre_medico, "Juan");
        assert_eq!(all[0].especialidad_medico, "Cirugía General");
    }

    #[test]
    fn same_slot_twice_is_allowed() {
        let conn = open_memory_database().unwrap();
        let (pid, mid) = seed(&conn);
        insert_appointment(&conn, &make_appointment(pid, mid)).unwrap();
        insert_appointment(&conn, &make_appointment(pid, mid)).unwrap();
        assert_eq!(list_appointment_details(&conn).unwrap().len(), 2);
    }

    #[test]
    fn unknown_patient_violates_foreign_key() {
        let conn = open_memory_database().unwrap();
        let (_, mid) = seed(&conn);
        let mut a = make_appointment(999, mid);
        a.id_paciente = 999;
        assert!(insert_appointment(&conn, &a).is_err());
    }

    #[test]
    fn status_update_round_trips() {
        let conn = open_memory_database().unwrap();
        let (pid, mid) = seed(&conn);
        let id = insert_appointment(&conn, &make_appointment(pid, mid)).unwrap();
        set_appointment_status(&conn, id, AppointmentStatus::Completed).unwrap();
        let a = get_appointment(&conn, id).unwrap().unwrap();
        assert_eq!(a.estado, AppointmentStatus::Completed);
    }

    #[test]
    fn deleting_patient_cascades_appointments() {
        let conn = open_memory_database().unwrap();
        let (pid, mid) = seed(&conn);
        insert_appointment(&conn, &make_appointment(pid, mid)).unwrap();
        crate::db::repository::delete_patient(&conn, pid).unwrap();
        assert!(list_appointment_details(&conn).unwrap().is_empty());
    }
}
