use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One clinical encounter ("ficha"): chief complaint plus free-text
/// anamnesis and observations, owned by exactly one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: i64,
    pub id_paciente: i64,
    pub fecha_hora: NaiveDateTime,
    pub motivo_consulta: String,
    pub anamnesis: Option<String>,
    pub observaciones: Option<String>,
}

/// Vital signs snapshot for a visit; zero or one per ficha. Values are kept
/// loosely typed, exactly as captured at the desk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitalSigns {
    pub id: i64,
    pub id_ficha: i64,
    pub presion_arterial: Option<String>,
    pub temperatura: Option<f64>,
    pub frecuencia_cardiaca: Option<i64>,
    pub peso: Option<f64>,
}

impl VitalSigns {
    /// True when no field carries a value; such snapshots are never stored.
    pub fn is_empty(&self) -> bool {
        self.presion_arterial.is_none()
            && self.temperatura.is_none()
            && self.frecuencia_cardiaca.is_none()
            && self.peso.is_none()
    }
}
