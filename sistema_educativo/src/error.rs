use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Parcial, TipoEvaluacion};

/// Errores del sistema educativo. Ninguno es transitorio: se reportan al
/// llamador tal cual, sin reintentos.
#[derive(Error, Debug)]
pub enum EducativoError {
    #[error("El parcial debe ser 1, 2 o 3 (recibido {0})")]
    ParcialInvalido(i64),

    #[error("La calificación debe estar entre 0 y 20 (recibido {0})")]
    CalificacionFueraDeRango(Decimal),

    #[error("El porcentaje debe estar entre 0 y 100 (recibido {0})")]
    PorcentajeFueraDeRango(Decimal),

    #[error("Tipo de evaluación inválido: {0}. Debe ser: examen, tarea, proyecto o participacion")]
    TipoEvaluacionInvalido(String),

    #[error("datos inválidos: {}", .0.join("; "))]
    Validacion(Vec<String>),

    #[error("Ya existe una evaluación de tipo {tipo} para el parcial {parcial}")]
    EvaluacionDuplicada { parcial: Parcial, tipo: TipoEvaluacion },

    #[error("No hay notas registradas para el parcial {parcial} de la matrícula {matricula_id}")]
    SinNotas { matricula_id: i64, parcial: Parcial },

    #[error("Matrícula no encontrada: {0}")]
    MatriculaNoEncontrada(i64),

    #[error("Estudiante no encontrado: {0}")]
    EstudianteNoEncontrado(i64),

    #[error("Curso no encontrado: {0}")]
    CursoNoEncontrado(i64),

    #[error("Nota no encontrada: {0}")]
    NotaNoEncontrada(i64),

    #[error("No hay matrículas para el estudiante {0}")]
    SinMatriculas(i64),

    #[error("El estudiante {estudiante_id} ya está matriculado en el curso {curso_id}")]
    MatriculaDuplicada { estudiante_id: i64, curso_id: i64 },

    #[error("No hay cupo disponible en el curso {0}")]
    CupoAgotado(i64),

    #[error("No se puede eliminar la matrícula {0}: tiene notas registradas")]
    MatriculaConNotas(i64),

    #[error("Ya existe un estudiante con la cédula {0}")]
    CedulaDuplicada(String),

    #[error("Ya existe un curso con el NRC {0}")]
    NrcDuplicado(String),

    #[error("configuración inválida: {0}")]
    Configuracion(String),

    #[error("error de base de datos: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EducativoError {
    /// Argumento inválido: se rechaza antes de calcular o persistir.
    pub fn es_validacion(&self) -> bool {
        matches!(
            self,
            EducativoError::ParcialInvalido(_)
                | EducativoError::CalificacionFueraDeRango(_)
                | EducativoError::PorcentajeFueraDeRango(_)
                | EducativoError::TipoEvaluacionInvalido(_)
                | EducativoError::Validacion(_)
        )
    }

    /// Choca con datos ya registrados: duplicados, cupo agotado o una
    /// matrícula que todavía tiene notas.
    pub fn es_conflicto(&self) -> bool {
        matches!(
            self,
            EducativoError::EvaluacionDuplicada { .. }
                | EducativoError::MatriculaDuplicada { .. }
                | EducativoError::CupoAgotado(_)
                | EducativoError::MatriculaConNotas(_)
                | EducativoError::CedulaDuplicada(_)
                | EducativoError::NrcDuplicado(_)
        )
    }

    /// Datos faltantes, del estilo "no encontrado".
    pub fn es_no_encontrado(&self) -> bool {
        matches!(
            self,
            EducativoError::SinNotas { .. }
                | EducativoError::MatriculaNoEncontrada(_)
                | EducativoError::EstudianteNoEncontrado(_)
                | EducativoError::CursoNoEncontrado(_)
                | EducativoError::NotaNoEncontrada(_)
                | EducativoError::SinMatriculas(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EducativoError>;
