use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string forms are the values stored in the database and written to
/// CSV exports, so they stay in the clinic's own wording.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Scheduled => "Agendada",
    Completed => "Realizada",
    Cancelled => "Cancelada",
});

str_enum!(DoctorStatus {
    Active => "Activo",
    Inactive => "Inactivo",
});

str_enum!(PatientKind {
    Outpatient => "Ambulatorio",
    Emergency => "Urgencias",
    Inpatient => "Hospitalizado",
});

str_enum!(InsuranceKind {
    Fonasa => "Fonasa",
    Isapre => "Isapre",
});
