use serde::{Deserialize, Serialize};

/// One prescription line of a visit. `estado` is free text
/// (Pendiente / Dispensada / Cancelada, …) — no workflow is enforced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub id_ficha: i64,
    pub medicamento: Option<String>,
    pub dosis: Option<String>,
    pub frecuencia: Option<String>,
    pub duracion: Option<String>,
    pub via_administracion: Option<String>,
    pub fecha_emision: Option<String>,
    pub observaciones: Option<String>,
    pub estado: Option<String>,
}
