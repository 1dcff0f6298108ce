//! Generic CSV-to-table reconciliation.
//!
//! One routine serves all four entities. The per-entity knowledge lives in
//! `EntityMapping`; what happens here is the same every time: match headers
//! against the mapping and the live schema, normalize cells, drop rows that
//! miss required fields, deduplicate within the file (last occurrence wins)
//! and against the store, then insert what remains in one transaction.

use std::collections::{HashMap, HashSet};

use rusqlite::{params_from_iter, Connection};

use super::decode::{decode_text, parse_table};
use super::mapping::{FieldMapping, ImportEntity};
use super::{ImportError, ImportReport};
use crate::db::schema::{table_columns, ColumnResolver};

/// One CSV column that survived header reconciliation.
struct PlannedColumn {
    /// Position in the parsed rows.
    index: usize,
    field: &'static FieldMapping,
    /// Actual column name in the live schema (may be a legacy spelling).
    db_column: String,
    /// Feeds the vitals companion table instead of the entity table.
    companion: bool,
}

/// Import one uploaded CSV file into the store.
///
/// Headers the mapping does not know, and known headers whose column is
/// absent from the live schema, are reported in `ignored_columns` and
/// otherwise dropped. The entity's AUTOINCREMENT id is never inserted.
pub fn import_csv(
    conn: &mut Connection,
    entity: ImportEntity,
    raw: &[u8],
) -> Result<ImportReport, ImportError> {
    if raw.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ImportError::EmptyFile);
    }

    let text = decode_text(raw);
    let table = parse_table(&text)?;
    let mapping = entity.mapping();

    let resolver = ColumnResolver::for_table(conn, mapping.table)?;
    let companion_live = if mapping.companion_fields.is_empty() {
        Vec::new()
    } else {
        table_columns(conn, "signos_vitales")?
    };

    let mut plan: Vec<PlannedColumn> = Vec::new();
    let mut ignored: Vec<String> = Vec::new();
    let mut seen: HashSet<&'static str> = HashSet::new();
    for (index, header) in table.headers.iter().enumerate() {
        // AUTOINCREMENT key from an export; dropped without comment.
        if header.trim().eq_ignore_ascii_case(mapping.id_column) {
            continue;
        }

        if let Some(field) = mapping.fields.iter().find(|f| f.matches(header)) {
            if !seen.insert(field.canonical) {
                ignored.push(header.clone());
                continue;
            }
            match resolver.column(field.canonical) {
                Some(col) => plan.push(PlannedColumn {
                    index,
                    field,
                    db_column: col.to_string(),
                    companion: false,
                }),
                None => ignored.push(header.clone()),
            }
            continue;
        }

        if let Some(field) = mapping.companion_fields.iter().find(|f| f.matches(header)) {
            if !seen.insert(field.canonical) {
                ignored.push(header.clone());
                continue;
            }
            match companion_live
                .iter()
                .find(|c| c.eq_ignore_ascii_case(field.canonical))
            {
                Some(col) => plan.push(PlannedColumn {
                    index,
                    field,
                    db_column: col.clone(),
                    companion: true,
                }),
                None => ignored.push(header.clone()),
            }
            continue;
        }

        ignored.push(header.clone());
    }

    if !plan.iter().any(|p| !p.companion) {
        return Err(ImportError::NoUsableColumns {
            entity: entity.to_string(),
            expected: entity.expected_headers(),
        });
    }

    let missing: Vec<&str> = mapping
        .fields
        .iter()
        .filter(|f| f.required)
        .filter(|f| !plan.iter().any(|p| !p.companion && p.field.canonical == f.canonical))
        .map(|f| f.canonical)
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingRequiredColumns(missing.join(", ")));
    }

    if !ignored.is_empty() {
        tracing::info!(columns = ?ignored, "Ignoring CSV columns with no matching table column");
    }

    let mut report = ImportReport {
        ignored_columns: ignored,
        ..Default::default()
    };

    // Normalize every kept cell; a row missing any required field is skipped.
    let mut prepared: Vec<Vec<Option<String>>> = Vec::new();
    for row in &table.rows {
        let values: Vec<Option<String>> = plan
            .iter()
            .map(|p| (p.field.normalizer)(&row[p.index]))
            .collect();
        if values.iter().all(Option::is_none) {
            report.skipped_empty += 1;
            continue;
        }
        let complete = plan
            .iter()
            .zip(&values)
            .all(|(p, v)| p.companion || !p.field.required || v.is_some());
        if !complete {
            report.skipped_missing_required += 1;
            continue;
        }
        prepared.push(values);
    }

    // In-file dedup on the natural key, last occurrence wins.
    let natural_key_of = |values: &[Option<String>]| -> String {
        mapping
            .natural_key
            .iter()
            .map(|key| {
                plan.iter()
                    .zip(values)
                    .find(|(p, _)| !p.companion && p.field.canonical == *key)
                    .and_then(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join("|")
    };

    let mut last_occurrence: HashMap<String, usize> = HashMap::new();
    for (i, values) in prepared.iter().enumerate() {
        if last_occurrence.insert(natural_key_of(values), i).is_some() {
            report.skipped_duplicate_in_file += 1;
        }
    }
    let kept: HashSet<usize> = last_occurrence.into_values().collect();

    // Natural keys already in the store, in the same normalized text form.
    let existing = existing_keys(conn, mapping.table, mapping.natural_key, &resolver)?;

    let entity_columns: Vec<usize> = (0..plan.len()).filter(|&i| !plan[i].companion).collect();
    let companion_columns: Vec<usize> = (0..plan.len()).filter(|&i| plan[i].companion).collect();

    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        mapping.table,
        entity_columns
            .iter()
            .map(|&i| plan[i].db_column.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        vec!["?"; entity_columns.len()].join(", "),
    );
    let companion_sql = (!companion_columns.is_empty()).then(|| {
        format!(
            "INSERT INTO signos_vitales (id_ficha, {}) VALUES (?{})",
            companion_columns
                .iter()
                .map(|&i| plan[i].db_column.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            ", ?".repeat(companion_columns.len()),
        )
    });

    let tx = conn.transaction().map_err(crate::db::DatabaseError::from)?;
    {
        let mut insert = tx.prepare(&insert_sql).map_err(crate::db::DatabaseError::from)?;
        for (i, values) in prepared.iter().enumerate() {
            if !kept.contains(&i) {
                continue;
            }
            if existing.contains(&natural_key_of(values)) {
                report.skipped_existing += 1;
                continue;
            }

            insert
                .execute(params_from_iter(
                    entity_columns.iter().map(|&c| values[c].as_deref()),
                ))
                .map_err(crate::db::DatabaseError::from)?;
            report.imported += 1;

            if let Some(sql) = &companion_sql {
                let vitals: Vec<Option<&str>> =
                    companion_columns.iter().map(|&c| values[c].as_deref()).collect();
                if vitals.iter().any(Option::is_some) {
                    let visit_id = tx.last_insert_rowid();
                    tx.execute(
                        sql,
                        params_from_iter(
                            std::iter::once(Some(visit_id.to_string()))
                                .chain(vitals.iter().map(|v| v.map(str::to_string))),
                        ),
                    )
                    .map_err(crate::db::DatabaseError::from)?;
                    report.vitals_inserted += 1;
                }
            }
        }
    }
    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(
        entity = %entity,
        imported = report.imported,
        skipped_empty = report.skipped_empty,
        skipped_missing_required = report.skipped_missing_required,
        skipped_duplicate_in_file = report.skipped_duplicate_in_file,
        skipped_existing = report.skipped_existing,
        "CSV import finished"
    );
    Ok(report)
}

/// Natural keys already present in the store, joined with '|' in the same
/// form `natural_key_of` produces. Integer columns are cast to text so they
/// compare equal to the normalized CSV values.
fn existing_keys(
    conn: &Connection,
    table: &str,
    natural_key: &[&str],
    resolver: &ColumnResolver,
) -> Result<HashSet<String>, ImportError> {
    let columns: Option<Vec<&str>> = natural_key.iter().map(|k| resolver.column(k)).collect();
    let Some(columns) = columns else {
        // Key column missing from a legacy table: nothing to compare against.
        return Ok(HashSet::new());
    };

    let select = format!(
        "SELECT {} FROM {table}",
        columns
            .iter()
            .map(|c| format!("CAST({c} AS TEXT)"))
            .collect::<Vec<_>>()
            .join(", "),
    );
    let width = columns.len();
    let mut stmt = conn.prepare(&select).map_err(crate::db::DatabaseError::from)?;
    let rows = stmt
        .query_map([], |row| {
            let mut parts = Vec::with_capacity(width);
            for i in 0..width {
                parts.push(row.get::<_, Option<String>>(i)?.unwrap_or_default());
            }
            Ok(parts.join("|"))
        })
        .map_err(crate::db::DatabaseError::from)?;

    let mut keys = HashSet::new();
    for key in rows {
        keys.insert(key.map_err(crate::db::DatabaseError::from)?);
    }
    Ok(keys)
}
