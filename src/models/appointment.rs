use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// A booked slot. Nothing prevents two appointments on the same slot; the
/// clinic books over-slot on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub estado: AppointmentStatus,
    pub id_paciente: i64,
    pub id_medico: i64,
}
