// Biblioteca raíz del crate `banco_peluche`.
// El cálculo (`calculo`) es puro; `store` y `service` son los colaboradores
// que leen los montos y guardan el resultado.
pub mod calculo;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;
pub mod store;
pub mod validacion;

pub use calculo::{calcular_cliente, DatosFinancieros, ResultadoCliente};
pub use error::{ClienteError, Result};
pub use service::ServicioClientes;
pub use store::{RepositorioClientes, SqliteClientes};
