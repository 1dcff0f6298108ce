//! Local clinic records store: patients, doctors, appointments, clinical
//! visit records ("fichas"), exams and prescriptions on SQLite, plus a CSV
//! reconciliation pipeline that merges loosely-structured spreadsheet
//! exports back into the schema.

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod validation;
