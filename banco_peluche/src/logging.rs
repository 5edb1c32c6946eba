//! Inicialización de `tracing`. `RUST_LOG` tiene prioridad sobre el nivel
//! configurado (`LOG_LEVEL`); si no existe o no es válido se usa `level`.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Instala el subscriber global en stderr. Solo la primera llamada tiene
/// efecto; stdout queda reservado para el JSON de la CLI.
pub fn init(level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_repetido_no_falla() {
        init("debug");
        init("nivel-invalido");
        tracing::info!("subscriber activo");
    }
}
