// Biblioteca raíz del crate `sistema_educativo`.
pub mod calculo;
pub mod config;
pub mod error;
pub mod libreta;
pub mod logging;
pub mod models;
pub mod reportes;
pub mod service;
pub mod store;

pub use calculo::{calcular_aporte, nota_parcial, promedio_semestre, EstadoAcademico, ResumenSemestre};
pub use error::{EducativoError, Result};
pub use libreta::LibretaNotas;
pub use service::ServicioAcademico;
pub use store::{RegistroAcademico, SqliteRegistro};
