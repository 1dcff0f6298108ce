//! Field normalizers for imported cells. Spreadsheet data is messy on a few
//! well-known axes: day-first dates, pandas artifacts ("nan", "NaT"), typo'd
//! category values, numbers with units glued on. Each normalizer returns
//! `None` for a value it cannot make sense of; only the row-level required
//! check decides whether that kills the row.

/// Placeholder strings that mean "no value" in spreadsheet exports.
fn is_null_marker(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "" | "nan" | "nat" | "none" | "null"
    )
}

/// Trim and null out placeholder markers.
pub fn clean_text(s: &str) -> Option<String> {
    let t = s.trim();
    if is_null_marker(t) {
        None
    } else {
        Some(t.to_string())
    }
}

/// Parse a date permissively (day-first when ambiguous) to ISO `YYYY-MM-DD`.
pub fn normalize_date(s: &str) -> Option<String> {
    let t = clean_text(s)?;
    const FORMATS: [&str; 6] = [
        "%Y-%m-%d",
        "%d-%m-%Y",
        "%d/%m/%Y",
        "%Y/%m/%d",
        "%d.%m.%Y",
        "%d-%m-%y",
    ];
    for fmt in FORMATS {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(&t, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Parse a timestamp permissively to `YYYY-MM-DD HH:MM:SS`. A bare date is
/// taken as midnight.
pub fn normalize_datetime(s: &str) -> Option<String> {
    let t = clean_text(s)?;
    const FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%d-%m-%Y %H:%M",
        "%d/%m/%Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(&t, fmt) {
            return Some(dt.format("%Y-%m-%d %H:%M:%S").to_string());
        }
    }
    normalize_date(&t).map(|d| format!("{d} 00:00:00"))
}

/// Parse a clock time to `HH:MM:SS`.
pub fn normalize_time(s: &str) -> Option<String> {
    let t = clean_text(s)?;
    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(tm) = chrono::NaiveTime::parse_from_str(&t, fmt) {
            return Some(tm.format("%H:%M:%S").to_string());
        }
    }
    None
}

/// Phones keep their leading '+' and digits; spacing and punctuation noise
/// is dropped.
pub fn normalize_phone(s: &str) -> Option<String> {
    let t = clean_text(s)?;
    let cleaned: String = t
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Insurance kind with the typo corrections seen in real files. Anything
/// unrecognized becomes NULL rather than failing the row.
pub fn normalize_insurance(s: &str) -> Option<String> {
    let t = clean_text(s)?.to_uppercase().replace(' ', "");
    match t.as_str() {
        "FONASA" | "FONAS" => Some("Fonasa".to_string()),
        "ISAPRE" | "ISAPRES" => Some("Isapre".to_string()),
        _ => None,
    }
}

/// Patient classification; unrecognized values become NULL so the CHECK
/// constraint never sees them.
pub fn normalize_patient_kind(s: &str) -> Option<String> {
    let t = clean_text(s)?;
    for kind in ["Ambulatorio", "Urgencias", "Hospitalizado"] {
        if t.eq_ignore_ascii_case(kind) {
            return Some(kind.to_string());
        }
    }
    None
}

/// Appointment status; empty or unrecognized values fall back to the
/// booking default.
pub fn normalize_appointment_status(s: &str) -> Option<String> {
    let t = clean_text(s).unwrap_or_default();
    for estado in ["Agendada", "Realizada", "Cancelada"] {
        if t.eq_ignore_ascii_case(estado) {
            return Some(estado.to_string());
        }
    }
    Some("Agendada".to_string())
}

/// Doctor status; unrecognized values become NULL.
pub fn normalize_doctor_status(s: &str) -> Option<String> {
    let t = clean_text(s)?;
    for estado in ["Activo", "Inactivo"] {
        if t.eq_ignore_ascii_case(estado) {
            return Some(estado.to_string());
        }
    }
    None
}

/// A decimal measurement with possible units glued on ("36,8 °C", "70kg").
pub fn normalize_decimal(s: &str) -> Option<String> {
    let t = clean_text(s)?;
    let kept: String = t
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect::<String>()
        .replace(',', ".");
    kept.parse::<f64>().ok().map(|v| v.to_string())
}

/// An integer field (heart rate, row references).
pub fn normalize_integer(s: &str) -> Option<String> {
    let t = clean_text(s)?;
    let kept: String = t.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect();
    kept.parse::<i64>().ok().map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_parse_day_first() {
        assert_eq!(normalize_date("20/11/2025").as_deref(), Some("2025-11-20"));
        assert_eq!(normalize_date("20-11-2025").as_deref(), Some("2025-11-20"));
        assert_eq!(normalize_date("2025-11-20").as_deref(), Some("2025-11-20"));
    }

    #[test]
    fn invalid_date_is_none() {
        assert_eq!(normalize_date("mañana"), None);
        assert_eq!(normalize_date("31/02/2025"), None);
    }

    #[test]
    fn pandas_markers_are_null() {
        assert_eq!(clean_text("nan"), None);
        assert_eq!(clean_text("NaT"), None);
        assert_eq!(clean_text("None"), None);
        assert_eq!(clean_text("  "), None);
        assert_eq!(clean_text(" x ").as_deref(), Some("x"));
    }

    #[test]
    fn datetime_accepts_bare_date() {
        assert_eq!(
            normalize_datetime("2025-11-20").as_deref(),
            Some("2025-11-20 00:00:00")
        );
        assert_eq!(
            normalize_datetime("2025-11-20 10:30").as_deref(),
            Some("2025-11-20 10:30:00")
        );
    }

    #[test]
    fn time_gets_seconds() {
        assert_eq!(normalize_time("10:00").as_deref(), Some("10:00:00"));
        assert_eq!(normalize_time("10:00:30").as_deref(), Some("10:00:30"));
        assert_eq!(normalize_time("25:00"), None);
    }

    #[test]
    fn insurance_typos_corrected() {
        assert_eq!(normalize_insurance("FONAS").as_deref(), Some("Fonasa"));
        assert_eq!(normalize_insurance(" fonasa ").as_deref(), Some("Fonasa"));
        assert_eq!(normalize_insurance("ISAPRES").as_deref(), Some("Isapre"));
        assert_eq!(normalize_insurance("IS APRE").as_deref(), Some("Isapre"));
        assert_eq!(normalize_insurance("Particular"), None);
    }

    #[test]
    fn decimal_strips_units() {
        assert_eq!(normalize_decimal("36,8 °C").as_deref(), Some("36.8"));
        assert_eq!(normalize_decimal("70kg").as_deref(), Some("70"));
        assert_eq!(normalize_decimal("alta"), None);
    }

    #[test]
    fn integer_strips_noise() {
        assert_eq!(normalize_integer("72 lpm").as_deref(), Some("72"));
        assert_eq!(normalize_integer(""), None);
    }

    #[test]
    fn phone_keeps_digits_and_plus() {
        assert_eq!(
            normalize_phone("+56 9 1234 5678").as_deref(),
            Some("+56912345678")
        );
        assert_eq!(normalize_phone("nan"), None);
    }

    #[test]
    fn appointment_status_defaults_to_scheduled() {
        assert_eq!(
            normalize_appointment_status("realizada").as_deref(),
            Some("Realizada")
        );
        assert_eq!(
            normalize_appointment_status("").as_deref(),
            Some("Agendada")
        );
        assert_eq!(
            normalize_appointment_status("???").as_deref(),
            Some("Agendada")
        );
    }
}
