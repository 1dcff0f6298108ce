use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered patient. `rut` is the Chilean national ID and is unique in
/// the store when present. `alergias` / `enfermedades_previas` are the old
/// free-text fields kept for databases that predate the per-item history
/// tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub rut: Option<String>,
    pub nombre: String,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub correo: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub alergias: Option<String>,
    pub enfermedades_previas: Option<String>,
    pub nacionalidad: Option<String>,
    pub sexo: Option<String>,
    pub estado_civil: Option<String>,
    pub tipo_paciente: Option<String>,
    pub tipo_sangre: Option<String>,
    pub prevision: Option<String>,
}
