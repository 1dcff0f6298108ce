//! CSV exports, mirror images of what the import pipeline accepts.
//!
//! Every export leads with the row id so a re-import can recognize and drop
//! it, and appointment/visit exports carry the joined patient and doctor
//! display columns people expect to see in a spreadsheet.

use std::io::Write;

use rusqlite::Connection;
use thiserror::Error;

use crate::db::repository::{
    list_appointment_details, list_doctors, list_patients, list_visit_details,
};
use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

fn opt(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("")
}

/// All patients, ordered by name.
pub fn export_patients<W: Write>(conn: &Connection, out: W) -> Result<(), ExportError> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record([
        "id_paciente",
        "rut",
        "nombre",
        "fecha_nacimiento",
        "correo",
        "telefono",
        "direccion",
        "nacionalidad",
        "sexo",
        "estado_civil",
        "tipo_paciente",
        "tipo_sangre",
        "prevision",
    ])?;
    for p in list_patients(conn)? {
        let id = p.id.to_string();
        let nacimiento = p
            .fecha_nacimiento
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        w.write_record([
            id.as_str(),
            opt(&p.rut),
            p.nombre.as_str(),
            nacimiento.as_str(),
            opt(&p.correo),
            opt(&p.telefono),
            opt(&p.direccion),
            opt(&p.nacionalidad),
            opt(&p.sexo),
            opt(&p.estado_civil),
            opt(&p.tipo_paciente),
            opt(&p.tipo_sangre),
            opt(&p.prevision),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// All doctors, ordered by name.
pub fn export_doctors<W: Write>(conn: &Connection, out: W) -> Result<(), ExportError> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record([
        "id_medico",
        "nombre",
        "apellidos",
        "duracion_cita",
        "telefono",
        "rut",
        "estado",
        "correo",
        "especialidad",
    ])?;
    for d in list_doctors(conn)? {
        let id = d.id.to_string();
        let estado = d.estado.map(|e| e.as_str()).unwrap_or_default();
        w.write_record([
            id.as_str(),
            d.nombre.as_str(),
            opt(&d.apellidos),
            opt(&d.duracion_cita),
            opt(&d.telefono),
            opt(&d.rut),
            estado,
            opt(&d.correo),
            d.especialidad.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// All appointments with patient and doctor display columns, newest first.
pub fn export_appointments<W: Write>(conn: &Connection, out: W) -> Result<(), ExportError> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record([
        "id_cita",
        "fecha",
        "hora",
        "estado",
        "id_paciente",
        "id_medico",
        "rut_paciente",
        "nombre_paciente",
        "nombre_medico",
        "especialidad_medico",
    ])?;
    for d in list_appointment_details(conn)? {
        let a = &d.appointment;
        let id = a.id.to_string();
        let fecha = a.fecha.format("%Y-%m-%d").to_string();
        let hora = a.hora.format("%H:%M:%S").to_string();
        let id_paciente = a.id_paciente.to_string();
        let id_medico = a.id_medico.to_string();
        w.write_record([
            id.as_str(),
            fecha.as_str(),
            hora.as_str(),
            a.estado.as_str(),
            id_paciente.as_str(),
            id_medico.as_str(),
            opt(&d.rut_paciente),
            d.nombre_paciente.as_str(),
            d.nombre_medico.as_str(),
            d.especialidad_medico.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// All visit records with their vitals snapshot (when one exists) and
/// patient display columns, newest first.
pub fn export_visits<W: Write>(conn: &Connection, out: W) -> Result<(), ExportError> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record([
        "id_ficha",
        "fecha_hora",
        "motivo_consulta",
        "anamnesis",
        "observaciones",
        "presion_arterial",
        "temperatura",
        "frecuencia_cardiaca",
        "peso",
        "id_paciente",
        "rut_paciente",
        "nombre_paciente",
    ])?;
    for d in list_visit_details(conn)? {
        let v = &d.visit;
        let (presion, temperatura, frecuencia, peso) = match &d.vitals {
            Some(vs) => (
                vs.presion_arterial.clone().unwrap_or_default(),
                vs.temperatura.map(|t| t.to_string()).unwrap_or_default(),
                vs.frecuencia_cardiaca.map(|f| f.to_string()).unwrap_or_default(),
                vs.peso.map(|p| p.to_string()).unwrap_or_default(),
            ),
            None => Default::default(),
        };
        let id = v.id.to_string();
        let fecha_hora = v.fecha_hora.format("%Y-%m-%d %H:%M:%S").to_string();
        let id_paciente = v.id_paciente.to_string();
        w.write_record([
            id.as_str(),
            fecha_hora.as_str(),
            v.motivo_consulta.as_str(),
            opt(&v.anamnesis),
            opt(&v.observaciones),
            presion.as_str(),
            temperatura.as_str(),
            frecuencia.as_str(),
            peso.as_str(),
            id_paciente.as_str(),
            opt(&d.rut_paciente),
            d.nombre_paciente.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
