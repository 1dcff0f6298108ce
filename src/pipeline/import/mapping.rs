//! Declarative CSV-to-table mappings, one per importable entity.
//!
//! Exports from earlier versions of the system used inconsistent header
//! casing (`Rut` vs `rut`, `FechaHora` vs `fecha_hora`) and one known
//! misspelling (`Anamesis`). Each field lists the canonical column plus
//! every historical header that should land in it, so the reconciliation
//! routine stays generic.

use std::fmt;
use std::str::FromStr;

use super::normalize;

/// Cell normalizer: `None` means the cell becomes SQL NULL.
pub type Normalizer = fn(&str) -> Option<String>;

/// One CSV field and the table column it feeds.
pub struct FieldMapping {
    /// Column name in the live schema.
    pub canonical: &'static str,
    /// Historical CSV headers that mean this column, beyond the canonical
    /// name itself.
    pub aliases: &'static [&'static str],
    pub normalizer: Normalizer,
    /// Rows with this field empty after normalization are skipped.
    pub required: bool,
}

impl FieldMapping {
    pub fn matches(&self, header: &str) -> bool {
        let header = header.trim();
        header.eq_ignore_ascii_case(self.canonical)
            || self.aliases.iter().any(|a| header.eq_ignore_ascii_case(a))
    }
}

/// Everything the generic import routine needs to know about one entity.
pub struct EntityMapping {
    pub table: &'static str,
    /// AUTOINCREMENT key: silently dropped when present in the CSV.
    pub id_column: &'static str,
    pub fields: &'static [FieldMapping],
    /// Extra fields that feed a companion table (vitals alongside visits)
    /// rather than the entity table itself.
    pub companion_fields: &'static [FieldMapping],
    /// Columns forming the duplicate-detection key, canonical names.
    pub natural_key: &'static [&'static str],
}

const fn field(canonical: &'static str, aliases: &'static [&'static str]) -> FieldMapping {
    FieldMapping {
        canonical,
        aliases,
        normalizer: normalize::clean_text,
        required: false,
    }
}

const fn required(mut f: FieldMapping) -> FieldMapping {
    f.required = true;
    f
}

const fn with(mut f: FieldMapping, normalizer: Normalizer) -> FieldMapping {
    f.normalizer = normalizer;
    f
}

static PATIENT_FIELDS: [FieldMapping; 14] = [
    required(field("rut", &["Rut", "Rut_Paciente"])),
    field("nombre", &[]),
    with(field("fecha_nacimiento", &[]), normalize::normalize_date),
    field("correo", &["Correo_Electronico", "correo_electronico", "email"]),
    with(field("telefono", &["Telefono"]), normalize::normalize_phone),
    field("direccion", &[]),
    field("alergias", &[]),
    field("enfermedades_previas", &[]),
    field("nacionalidad", &[]),
    field("sexo", &[]),
    field("estado_civil", &[]),
    with(field("tipo_paciente", &[]), normalize::normalize_patient_kind),
    field("tipo_sangre", &[]),
    with(field("prevision", &["Prevision"]), normalize::normalize_insurance),
];

static DOCTOR_FIELDS: [FieldMapping; 8] = [
    required(field("nombre", &[])),
    field("apellidos", &["Apellidos"]),
    with(
        field("duracion_cita", &["Duracion_de_cita", "duracion_de_cita"]),
        normalize::normalize_integer,
    ),
    with(field("telefono", &["Telefono"]), normalize::normalize_phone),
    required(field("rut", &["Rut"])),
    with(field("estado", &["Estado"]), normalize::normalize_doctor_status),
    field("correo", &["Correo_Electronico", "correo_electronico"]),
    field("especialidad", &["Especialidad"]),
];

static APPOINTMENT_FIELDS: [FieldMapping; 5] = [
    required(with(field("fecha", &["Fecha"]), normalize::normalize_date)),
    required(with(field("hora", &["Hora"]), normalize::normalize_time)),
    with(
        field("estado", &["Estado"]),
        normalize::normalize_appointment_status,
    ),
    required(with(field("id_paciente", &[]), normalize::normalize_integer)),
    required(with(field("id_medico", &[]), normalize::normalize_integer)),
];

static VISIT_FIELDS: [FieldMapping; 5] = [
    required(with(
        field("id_paciente", &["ID_paciente", "paciente_id"]),
        normalize::normalize_integer,
    )),
    required(with(
        field("fecha_hora", &["FechaHora", "fecha"]),
        normalize::normalize_datetime,
    )),
    required(field("motivo_consulta", &["Motivo_consulta", "motivo"])),
    required(field("anamnesis", &["Anamnesis", "Anamesis"])),
    required(field("observaciones", &["Observaciones"])),
];

static VITALS_FIELDS: [FieldMapping; 4] = [
    field("presion_arterial", &["Presion_arterial"]),
    with(field("temperatura", &["Temperatura"]), normalize::normalize_decimal),
    with(
        field("frecuencia_cardiaca", &["Frecuencia_cardiaca"]),
        normalize::normalize_integer,
    ),
    with(field("peso", &["Peso"]), normalize::normalize_decimal),
];

static PATIENT_MAPPING: EntityMapping = EntityMapping {
    table: "paciente",
    id_column: "id_paciente",
    fields: &PATIENT_FIELDS,
    companion_fields: &[],
    natural_key: &["rut"],
};

static DOCTOR_MAPPING: EntityMapping = EntityMapping {
    table: "medico",
    id_column: "id_medico",
    fields: &DOCTOR_FIELDS,
    companion_fields: &[],
    natural_key: &["rut"],
};

static APPOINTMENT_MAPPING: EntityMapping = EntityMapping {
    table: "cita",
    id_column: "id_cita",
    fields: &APPOINTMENT_FIELDS,
    companion_fields: &[],
    natural_key: &["fecha", "hora", "id_paciente", "id_medico"],
};

static VISIT_MAPPING: EntityMapping = EntityMapping {
    table: "ficha_medica",
    id_column: "id_ficha",
    fields: &VISIT_FIELDS,
    companion_fields: &VITALS_FIELDS,
    natural_key: &["id_paciente", "fecha_hora"],
};

/// The four entities the CSV pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportEntity {
    Patient,
    Doctor,
    Appointment,
    Visit,
}

impl ImportEntity {
    pub fn mapping(&self) -> &'static EntityMapping {
        match self {
            Self::Patient => &PATIENT_MAPPING,
            Self::Doctor => &DOCTOR_MAPPING,
            Self::Appointment => &APPOINTMENT_MAPPING,
            Self::Visit => &VISIT_MAPPING,
        }
    }

    /// Human-friendly hint for error messages when no header matched.
    pub fn expected_headers(&self) -> String {
        self.mapping()
            .fields
            .iter()
            .map(|f| f.canonical)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ImportEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Patient => "pacientes",
            Self::Doctor => "medicos",
            Self::Appointment => "citas",
            Self::Visit => "fichas",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ImportEntity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pacientes" | "paciente" | "patients" => Ok(Self::Patient),
            "medicos" | "medico" | "doctors" => Ok(Self::Doctor),
            "citas" | "cita" | "appointments" => Ok(Self::Appointment),
            "fichas" | "ficha" | "visits" => Ok(Self::Visit),
            other => Err(format!(
                "unknown entity '{other}' (expected pacientes, medicos, citas or fichas)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn historical_patient_headers_match() {
        let rut = &PATIENT_FIELDS[0];
        assert!(rut.matches("rut"));
        assert!(rut.matches("Rut_Paciente"));
        assert!(rut.matches("RUT"));
        assert!(!rut.matches("rut_medico"));
    }

    #[test]
    fn misspelled_anamnesis_header_matches() {
        let anam = VISIT_FIELDS
            .iter()
            .find(|f| f.canonical == "anamnesis")
            .unwrap();
        assert!(anam.matches("Anamesis"));
        assert!(anam.matches("Anamnesis"));
    }

    #[test]
    fn visit_requires_all_clinical_fields() {
        let required: Vec<_> = VISIT_FIELDS
            .iter()
            .filter(|f| f.required)
            .map(|f| f.canonical)
            .collect();
        assert_eq!(
            required,
            vec![
                "id_paciente",
                "fecha_hora",
                "motivo_consulta",
                "anamnesis",
                "observaciones"
            ]
        );
    }

    #[test]
    fn entity_names_parse() {
        assert_eq!("Pacientes".parse::<ImportEntity>().unwrap(), ImportEntity::Patient);
        assert_eq!("fichas".parse::<ImportEntity>().unwrap(), ImportEntity::Visit);
        assert!("bodega".parse::<ImportEntity>().is_err());
    }

    #[test]
    fn natural_keys_are_subsets_of_fields() {
        for entity in [
            ImportEntity::Patient,
            ImportEntity::Doctor,
            ImportEntity::Appointment,
            ImportEntity::Visit,
        ] {
            let m = entity.mapping();
            for key in m.natural_key {
                assert!(
                    m.fields.iter().any(|f| f.canonical == *key),
                    "{key} missing from {}",
                    m.table
                );
            }
        }
    }
}
