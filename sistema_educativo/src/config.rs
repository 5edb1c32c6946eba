use std::env;
use std::path::PathBuf;

use crate::error::{EducativoError, Result};

const DEFAULT_DB_PATH: &str = "data/sistema_educativo.db";

/// Configuración leída del entorno (y de `.env` si existe).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        Ok(Self {
            db_path: db_path_from_env()?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// SISTEMA_EDUCATIVO_DB_PATH tiene prioridad sobre SISTEMA_EDUCATIVO_DB_URL.
fn db_path_from_env() -> Result<PathBuf> {
    if let Ok(p) = env::var("SISTEMA_EDUCATIVO_DB_PATH") {
        return Ok(PathBuf::from(p));
    }
    match env::var("SISTEMA_EDUCATIVO_DB_URL") {
        Ok(url) => path_from_url(&url),
        Err(_) => Ok(PathBuf::from(DEFAULT_DB_PATH)),
    }
}

/// Acepta `sqlite://ruta`, `file://ruta` o una ruta sin esquema.
pub fn path_from_url(url: &str) -> Result<PathBuf> {
    if let Some(rest) = url.strip_prefix("sqlite://") {
        Ok(PathBuf::from(rest))
    } else if let Some(rest) = url.strip_prefix("file://") {
        Ok(PathBuf::from(rest))
    } else if url.contains("://") {
        Err(EducativoError::Configuracion(format!(
            "SISTEMA_EDUCATIVO_DB_URL uses unsupported scheme: {}",
            url
        )))
    } else {
        Ok(PathBuf::from(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_sqlite_and_file_schemes() {
        assert_eq!(path_from_url("sqlite://data/x.db").unwrap(), PathBuf::from("data/x.db"));
        assert_eq!(path_from_url("file:///tmp/x.db").unwrap(), PathBuf::from("/tmp/x.db"));
        assert_eq!(path_from_url("x.db").unwrap(), PathBuf::from("x.db"));
    }

    #[test]
    fn rejects_remote_urls() {
        let err = path_from_url("mysql://localhost:3307/educativo").unwrap_err();
        assert!(matches!(err, EducativoError::Configuracion(_)));
    }
}
