use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clinica::config;
use clinica::db::repository;
use clinica::db::sqlite::{count_tables, get_current_version, open_database};
use clinica::pipeline::export::{
    export_appointments, export_doctors, export_patients, export_visits,
};
use clinica::pipeline::import::{import_csv, ImportEntity, ImportReport};

#[derive(Parser)]
#[command(name = "clinica", version, about = "Local clinic records store")]
struct Cli {
    /// Database file (defaults to $CLINICA_DB or ~/Clinica/base.db)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or migrate the database, then report its version
    Init,
    /// Import a CSV file (pacientes, medicos, citas or fichas)
    Import {
        entity: ImportEntity,
        file: PathBuf,
        /// Print the import report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export one entity to a CSV file
    Export { entity: ImportEntity, file: PathBuf },
    /// Row counts per entity
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let path = config::database_path(cli.db.as_deref());
    let mut conn = open_database(&path)
        .with_context(|| format!("opening database at {}", path.display()))?;

    match cli.command {
        Command::Init => {
            let version = get_current_version(&conn);
            println!("Database ready at {} (schema version {version})", path.display());
        }
        Command::Import { entity, file, json } => {
            let mut raw = Vec::new();
            File::open(&file)
                .and_then(|mut f| f.read_to_end(&mut raw))
                .with_context(|| format!("reading {}", file.display()))?;
            let report = import_csv(&mut conn, entity, &raw)
                .with_context(|| format!("importing {entity} from {}", file.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Export { entity, file } => {
            let out = File::create(&file)
                .with_context(|| format!("creating {}", file.display()))?;
            match entity {
                ImportEntity::Patient => export_patients(&conn, out)?,
                ImportEntity::Doctor => export_doctors(&conn, out)?,
                ImportEntity::Appointment => export_appointments(&conn, out)?,
                ImportEntity::Visit => export_visits(&conn, out)?,
            }
            println!("Exported {entity} to {}", file.display());
        }
        Command::Stats => {
            let patients = repository::list_patients(&conn)?.len();
            let doctors = repository::list_doctors(&conn)?.len();
            let appointments = repository::list_appointment_keys(&conn)?.len();
            let visits = repository::list_visit_keys(&conn)?.len();
            println!("pacientes: {patients}");
            println!("medicos: {doctors}");
            println!("citas: {appointments}");
            println!("fichas: {visits}");
            println!("tablas: {}", count_tables(&conn)?);
        }
    }

    Ok(())
}

fn print_report(report: &ImportReport) {
    println!("imported: {}", report.imported);
    println!("skipped (nothing to import): {}", report.skipped_empty);
    println!("skipped (missing required fields): {}", report.skipped_missing_required);
    println!("skipped (duplicate in file): {}", report.skipped_duplicate_in_file);
    println!("skipped (already in store): {}", report.skipped_existing);
    if report.vitals_inserted > 0 {
        println!("vitals recorded: {}", report.vitals_inserted);
    }
    if !report.ignored_columns.is_empty() {
        println!("ignored columns: {}", report.ignored_columns.join(", "));
    }
}
