// Salidas de las consultas académicas y de matrícula.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculo::{EstadoAcademico, ResumenSemestre};
use crate::models::{Nota, Parcial};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotaParcial {
    pub matricula_id: i64,
    pub parcial: Parcial,
    pub nota_parcial: Decimal,
    pub nota_maxima: Decimal,
    pub detalles: Vec<Nota>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromedioMatricula {
    pub matricula_id: i64,
    #[serde(flatten)]
    pub resumen: ResumenSemestre,
}

/// Situación del estudiante en un curso.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadoCurso {
    pub matricula_id: i64,
    pub curso_id: i64,
    pub asignatura: String,
    #[serde(flatten)]
    pub resumen: ResumenSemestre,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadoAcademicoEstudiante {
    pub estudiante_id: i64,
    pub estado: Vec<EstadoCurso>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenAprobacion {
    pub aprobadas: u32,
    pub reprobadas: u32,
    pub total: u32,
    /// Porcentaje con dos decimales; 0 cuando no hay matrículas.
    pub porcentaje_aprobacion: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetalleCurso {
    pub curso: String,
    pub promedio: Decimal,
    pub promedio_maximo: Decimal,
    pub estado: EstadoAcademico,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporteAcademico {
    pub estudiante: String,
    pub cedula: String,
    pub resumen_semestre: ResumenAprobacion,
    pub detalle: Vec<DetalleCurso>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CupoDisponible {
    pub cupo_disponible: i64,
    pub cupo_total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenMatriculas {
    pub curso_id: i64,
    pub nombre_curso: String,
    pub cupo_total: i64,
    pub matriculados: i64,
    pub disponibles: i64,
    pub porcentaje_ocupacion: Decimal,
}
