//! Reference data previously baked into the capture forms (specialty list,
//! blood types, …), now seeded by migration and read here.

use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// Values of one reference category, in their configured order.
pub fn list_reference_values(
    conn: &Connection,
    categoria: &str,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT valor FROM referencia WHERE categoria = ?1 ORDER BY orden, valor",
    )?;
    let rows = stmt.query_map(params![categoria], |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn reference_categories(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT categoria FROM referencia ORDER BY categoria")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn specialties_seeded_in_order() {
        let conn = open_memory_database().unwrap();
        let specialties = list_reference_values(&conn, "especialidad").unwrap();
        assert_eq!(specialties.len(), 12);
        assert_eq!(specialties[0], "Cirugía General");
    }

    #[test]
    fn blood_types_present() {
        let conn = open_memory_database().unwrap();
        let types = list_reference_values(&conn, "tipo_sangre").unwrap();
        assert!(types.contains(&"O+".to_string()));
        assert!(types.contains(&"AB-".to_string()));
    }

    #[test]
    fn unknown_category_is_empty() {
        let conn = open_memory_database().unwrap();
        assert!(list_reference_values(&conn, "no_such").unwrap().is_empty());
    }
}
