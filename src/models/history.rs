//! Patient background tables: independent child rows keyed by patient id,
//! with no cross-references between them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChronicCondition {
    pub id: i64,
    pub id_paciente: i64,
    pub nombre_enfermedad: String,
    pub observacion: Option<String>,
    pub tratamiento_actual: Option<String>,
    pub anio_diagnostico: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorSurgery {
    pub id: i64,
    pub id_paciente: i64,
    pub nombre: String,
    pub fecha: Option<String>,
    pub observacion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredAllergy {
    pub id: i64,
    pub id_paciente: i64,
    pub sustancia: String,
    pub reaccion: Option<String>,
    pub gravedad: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentMedication {
    pub id: i64,
    pub id_paciente: i64,
    pub nombre: String,
    pub dosis: Option<String>,
    pub frecuencia: Option<String>,
    pub via: Option<String>,
    pub indicaciones: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientHabit {
    pub id: i64,
    pub id_paciente: i64,
    pub tipo: String,
    pub descripcion: Option<String>,
    pub frecuencia: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorTreatment {
    pub id: i64,
    pub id_paciente: i64,
    pub nombre: String,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub resultado: Option<String>,
}
