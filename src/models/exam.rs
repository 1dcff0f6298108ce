use serde::{Deserialize, Serialize};

/// An exam requested during a visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRequest {
    pub id: i64,
    pub id_ficha: i64,
    pub tipo_examen: String,
    pub fecha_solicitud: Option<String>,
    pub observaciones: Option<String>,
    pub estado: Option<String>,
}

/// Result attached to an exam request: free text plus an attachment
/// reference (a filename or path, not managed by the store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: i64,
    pub id_solicitud: i64,
    pub fecha_resultado: Option<String>,
    pub archivo_adjunto: Option<String>,
    pub resultado_texto: Option<String>,
}
