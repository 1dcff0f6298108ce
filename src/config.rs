use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Clinica";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "CLINICA_DB";

/// Get the application data directory (~/Clinica/ on all platforms,
/// user-visible on purpose)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Clinica")
}

/// Resolve the database path: explicit argument, then env var, then the
/// default under the app data directory.
pub fn database_path(cli_override: Option<&str>) -> PathBuf {
    if let Some(p) = cli_override {
        return PathBuf::from(p);
    }
    if let Ok(p) = std::env::var(DB_PATH_ENV) {
        if !p.is_empty() {
            return PathBuf::from(p);
        }
    }
    app_data_dir().join("base.db")
}
