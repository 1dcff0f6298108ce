use serde::{Deserialize, Serialize};

use super::enums::DoctorStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub nombre: String,
    pub apellidos: Option<String>,
    /// Appointment slot length, free text as captured ("30", "45 min", …)
    pub duracion_cita: Option<String>,
    pub telefono: Option<String>,
    pub rut: Option<String>,
    pub estado: Option<DoctorStatus>,
    pub correo: Option<String>,
    pub especialidad: String,
}
