use thiserror::Error;

/// Errores del dominio de clientes de Banco Peluche.
#[derive(Error, Debug)]
pub enum ClienteError {
    /// Uno o más campos del formulario no pasaron la validación.
    #[error("datos inválidos: {}", .0.join("; "))]
    Validacion(Vec<String>),

    #[error("el campo \"{campo}\" no puede ser negativo")]
    MontoNegativo { campo: &'static str },

    #[error("el campo \"{campo}\" supera el monto máximo permitido")]
    MontoExcedido { campo: &'static str },

    #[error("cliente no encontrado: {0}")]
    NoEncontrado(i64),

    #[error("configuración inválida: {0}")]
    Configuracion(String),

    #[error("error de base de datos: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClienteError {
    /// `true` para errores que el llamador debe reportar como petición inválida.
    pub fn es_validacion(&self) -> bool {
        matches!(
            self,
            ClienteError::Validacion(_) | ClienteError::MontoNegativo { .. } | ClienteError::MontoExcedido { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ClienteError>;
