//! Schema introspection and drift tolerance.
//!
//! Installations that predate version tracking carry tables with older
//! column spellings (`Rut_Paciente`, `Correo_Electronico`, `Anamesis`, …).
//! The versioned migrations never touch those; instead `ColumnResolver`
//! maps logical field names onto whatever columns actually exist, and
//! `upgrade_legacy_schema` brings such databases up to the versioned
//! baseline through guarded, additive ALTERs only.

use std::collections::HashMap;

use rusqlite::Connection;

use super::DatabaseError;

/// Actual column names of a table, in declaration order. Empty for a table
/// that does not exist.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let rows = stmt.query_map([table], |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Case-insensitive column existence check (SQLite identifiers are
/// case-insensitive, CSV headers and legacy schemas disagree on case).
pub fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    let cols = table_columns(conn, table)?;
    Ok(cols.iter().any(|c| c.eq_ignore_ascii_case(column)))
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, DatabaseError> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1 COLLATE NOCASE",
        [table],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

/// Add a column only if it is missing. A failure here is a real DDL error,
/// never "already exists", so it is reported instead of swallowed.
pub fn ensure_column(
    conn: &Connection,
    table: &str,
    column: &str,
    decl: &str,
) -> Result<(), DatabaseError> {
    if has_column(conn, table, column)? {
        return Ok(());
    }
    tracing::info!(table, column, "Adding missing column");
    conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl};"))
        .map_err(|e| DatabaseError::MigrationFailed {
            version: 0,
            reason: format!("ALTER TABLE {table} ADD COLUMN {column}: {e}"),
        })
}

/// A database created before version tracking: clinic tables exist but
/// there is no `schema_version` bookkeeping yet.
pub fn is_legacy_database(conn: &Connection) -> Result<bool, DatabaseError> {
    Ok(!table_exists(conn, "schema_version")?
        && (table_exists(conn, "paciente")? || table_exists(conn, "ficha_medica")?))
}

/// Bring a pre-versioning database up to the versioned baseline without
/// touching existing data: create whatever tables are missing, then add the
/// later-shipped columns one guarded ALTER at a time, and record the
/// versions those steps correspond to.
pub fn upgrade_legacy_schema(conn: &Connection) -> Result<(), DatabaseError> {
    tracing::info!("Upgrading pre-versioning database");

    // Baseline DDL is entirely IF NOT EXISTS; existing tables are untouched.
    conn.execute_batch(include_str!("../../resources/migrations/001_initial.sql"))
        .map_err(|e| DatabaseError::MigrationFailed {
            version: 1,
            reason: e.to_string(),
        })?;

    for (column, decl) in [
        ("fecha_nacimiento", "TEXT"),
        ("correo", "TEXT"),
        ("telefono", "TEXT"),
        ("direccion", "TEXT"),
        ("alergias", "TEXT"),
        ("enfermedades_previas", "TEXT"),
        ("nacionalidad", "TEXT"),
        ("sexo", "TEXT"),
        ("estado_civil", "TEXT"),
        (
            "tipo_paciente",
            "TEXT CHECK (tipo_paciente IN ('Ambulatorio', 'Urgencias', 'Hospitalizado'))",
        ),
        ("tipo_sangre", "TEXT"),
        ("prevision", "TEXT CHECK (prevision IN ('Fonasa', 'Isapre'))"),
    ] {
        ensure_column(conn, "paciente", column, decl)?;
    }

    // The ficha table went through the same incremental growth.
    for column in ["fecha_hora", "motivo_consulta", "observaciones"] {
        ensure_column(conn, "ficha_medica", column, "TEXT")?;
    }
    if !has_column(conn, "ficha_medica", "anamnesis")?
        && !has_column(conn, "ficha_medica", "anamesis")?
    {
        ensure_column(conn, "ficha_medica", "anamnesis", "TEXT")?;
    }

    conn.execute("INSERT INTO schema_version (version) VALUES (2)", [])?;
    Ok(())
}

/// Ordered historical candidates for each logical field of a table. The
/// first spelling that exists in the live schema wins.
fn candidates(table: &str) -> HashMap<&'static str, Vec<&'static str>> {
    let mut map: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    match table {
        "paciente" => {
            map.insert("rut", vec!["rut", "Rut_Paciente"]);
            map.insert("nombre", vec!["nombre", "Nombre"]);
            map.insert("apellido", vec!["Apellido"]);
            map.insert("fecha_nacimiento", vec!["fecha_nacimiento", "Fecha_Nacimiento"]);
            map.insert("correo", vec!["correo", "Correo"]);
            map.insert("telefono", vec!["telefono", "Telefono"]);
            map.insert("direccion", vec!["direccion", "Dirección"]);
            map.insert("alergias", vec!["alergias"]);
            map.insert("enfermedades_previas", vec!["enfermedades_previas"]);
            map.insert("nacionalidad", vec!["nacionalidad"]);
            map.insert("sexo", vec!["sexo"]);
            map.insert("estado_civil", vec!["estado_civil"]);
            map.insert("tipo_paciente", vec!["tipo_paciente"]);
            map.insert("tipo_sangre", vec!["tipo_sangre"]);
            map.insert("prevision", vec!["prevision"]);
        }
        "medico" => {
            map.insert("nombre", vec!["nombre"]);
            map.insert("apellidos", vec!["apellidos", "Apellidos"]);
            map.insert("duracion_cita", vec!["duracion_cita", "Duracion_de_cita"]);
            map.insert("telefono", vec!["telefono", "Telefono"]);
            map.insert("rut", vec!["rut", "Rut"]);
            map.insert("estado", vec!["estado", "Estado"]);
            map.insert("correo", vec!["correo", "Correo_Electronico"]);
            map.insert("especialidad", vec!["especialidad"]);
        }
        "ficha_medica" => {
            map.insert("id_paciente", vec!["id_paciente", "ID_paciente"]);
            map.insert("fecha_hora", vec!["fecha_hora", "FechaHora"]);
            map.insert("motivo_consulta", vec!["motivo_consulta", "Motivo_consulta"]);
            map.insert("anamnesis", vec!["anamnesis", "Anamnesis", "Anamesis"]);
            map.insert("observaciones", vec!["observaciones", "Observaciones"]);
        }
        "cita" => {
            map.insert("fecha", vec!["fecha"]);
            map.insert("hora", vec!["hora"]);
            map.insert("estado", vec!["estado"]);
            map.insert("id_paciente", vec!["id_paciente"]);
            map.insert("id_medico", vec!["id_medico"]);
        }
        _ => {}
    }
    map
}

/// Maps logical field names to the actual column names of one table.
///
/// Safe to build before any migration has run: a logical field whose
/// candidates are all absent simply resolves to `None`, and the caller
/// treats it as unavailable under this schema version.
pub struct ColumnResolver {
    resolved: HashMap<&'static str, Option<String>>,
}

impl ColumnResolver {
    pub fn for_table(conn: &Connection, table: &str) -> Result<Self, DatabaseError> {
        let live = table_columns(conn, table)?;
        let mut resolved = HashMap::new();
        for (logical, options) in candidates(table) {
            let found = options.iter().find_map(|cand| {
                live.iter()
                    .find(|c| c.eq_ignore_ascii_case(cand))
                    .map(|c| c.to_string())
            });
            resolved.insert(logical, found);
        }
        Ok(Self { resolved })
    }

    /// Actual column for a logical field, or `None` when no historical
    /// candidate exists in the live table.
    pub fn column(&self, logical: &str) -> Option<&str> {
        self.resolved.get(logical).and_then(|c| c.as_deref())
    }

    pub fn is_available(&self, logical: &str) -> bool {
        self.column(logical).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn resolver_prefers_current_names() {
        let conn = open_memory_database().unwrap();
        let resolver = ColumnResolver::for_table(&conn, "paciente").unwrap();
        assert_eq!(resolver.column("rut"), Some("rut"));
        assert_eq!(resolver.column("nombre"), Some("nombre"));
        assert_eq!(resolver.column("prevision"), Some("prevision"));
    }

    #[test]
    fn resolver_falls_back_to_legacy_names() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE medico (
                 id_medico INTEGER PRIMARY KEY,
                 nombre TEXT,
                 Apellidos TEXT,
                 Duracion_de_cita TEXT,
                 Correo_Electronico TEXT,
                 especialidad TEXT
             );",
        )
        .unwrap();

        let resolver = ColumnResolver::for_table(&conn, "medico").unwrap();
        assert_eq!(resolver.column("apellidos"), Some("Apellidos"));
        assert_eq!(resolver.column("duracion_cita"), Some("Duracion_de_cita"));
        assert_eq!(resolver.column("correo"), Some("Correo_Electronico"));
        // No candidate exists at all
        assert_eq!(resolver.column("telefono"), None);
        assert!(!resolver.is_available("telefono"));
    }

    #[test]
    fn resolver_on_missing_table_resolves_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        let resolver = ColumnResolver::for_table(&conn, "paciente").unwrap();
        assert_eq!(resolver.column("rut"), None);
        assert_eq!(resolver.column("nombre"), None);
    }

    #[test]
    fn resolver_handles_misspelled_anamnesis() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE ficha_medica (
                 id_ficha INTEGER PRIMARY KEY,
                 id_paciente INTEGER,
                 fecha_hora TEXT,
                 motivo_consulta TEXT,
                 Anamesis TEXT
             );",
        )
        .unwrap();
        let resolver = ColumnResolver::for_table(&conn, "ficha_medica").unwrap();
        assert_eq!(resolver.column("anamnesis"), Some("Anamesis"));
    }

    #[test]
    fn ensure_column_is_idempotent() {
        let conn = open_memory_database().unwrap();
        ensure_column(&conn, "medico", "notas_internas", "TEXT").unwrap();
        ensure_column(&conn, "medico", "notas_internas", "TEXT").unwrap();
        assert!(has_column(&conn, "medico", "notas_internas").unwrap());
    }

    #[test]
    fn has_column_is_case_insensitive() {
        let conn = open_memory_database().unwrap();
        assert!(has_column(&conn, "paciente", "RUT").unwrap());
        assert!(!has_column(&conn, "paciente", "no_such_column").unwrap());
    }

    #[test]
    fn fresh_database_is_not_legacy() {
        let conn = open_memory_database().unwrap();
        assert!(!is_legacy_database(&conn).unwrap());
    }
}
