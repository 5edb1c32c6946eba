// Estructuras de datos principales

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculo::ESCALA_MAXIMA;
use crate::error::{EducativoError, Result};

/// Periodo de evaluación dentro del semestre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Parcial {
    Primero,
    Segundo,
    Tercero,
}

impl Parcial {
    pub const TODOS: [Parcial; 3] = [Parcial::Primero, Parcial::Segundo, Parcial::Tercero];

    pub fn numero(self) -> u8 {
        self.indice() as u8 + 1
    }

    pub(crate) fn indice(self) -> usize {
        match self {
            Parcial::Primero => 0,
            Parcial::Segundo => 1,
            Parcial::Tercero => 2,
        }
    }

    pub fn from_numero(n: i64) -> Result<Self> {
        match n {
            1 => Ok(Parcial::Primero),
            2 => Ok(Parcial::Segundo),
            3 => Ok(Parcial::Tercero),
            otro => Err(EducativoError::ParcialInvalido(otro)),
        }
    }
}

impl TryFrom<u8> for Parcial {
    type Error = EducativoError;

    fn try_from(n: u8) -> Result<Self> {
        Parcial::from_numero(i64::from(n))
    }
}

impl From<Parcial> for u8 {
    fn from(p: Parcial) -> u8 {
        p.numero()
    }
}

impl fmt::Display for Parcial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.numero())
    }
}

/// Los cuatro tipos de evaluación; cada parcial admite uno de cada tipo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoEvaluacion {
    Examen,
    Tarea,
    Proyecto,
    Participacion,
}

impl TipoEvaluacion {
    pub const TODOS: [TipoEvaluacion; 4] = [
        TipoEvaluacion::Examen,
        TipoEvaluacion::Tarea,
        TipoEvaluacion::Proyecto,
        TipoEvaluacion::Participacion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TipoEvaluacion::Examen => "examen",
            TipoEvaluacion::Tarea => "tarea",
            TipoEvaluacion::Proyecto => "proyecto",
            TipoEvaluacion::Participacion => "participacion",
        }
    }

    pub(crate) fn indice(self) -> usize {
        match self {
            TipoEvaluacion::Examen => 0,
            TipoEvaluacion::Tarea => 1,
            TipoEvaluacion::Proyecto => 2,
            TipoEvaluacion::Participacion => 3,
        }
    }
}

impl FromStr for TipoEvaluacion {
    type Err = EducativoError;

    fn from_str(s: &str) -> Result<Self> {
        TipoEvaluacion::TODOS
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| EducativoError::TipoEvaluacionInvalido(s.to_string()))
    }
}

impl fmt::Display for TipoEvaluacion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calificación en escala 0-20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Calificacion(Decimal);

impl Calificacion {
    pub fn new(valor: Decimal) -> Result<Self> {
        if valor < Decimal::ZERO || valor > ESCALA_MAXIMA {
            return Err(EducativoError::CalificacionFueraDeRango(valor));
        }
        Ok(Self(valor))
    }

    pub fn valor(self) -> Decimal {
        self.0
    }
}

/// Peso de una evaluación dentro de su parcial, 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Porcentaje(Decimal);

impl Porcentaje {
    pub fn new(valor: Decimal) -> Result<Self> {
        if valor < Decimal::ZERO || valor > dec!(100) {
            return Err(EducativoError::PorcentajeFueraDeRango(valor));
        }
        Ok(Self(valor))
    }

    pub fn valor(self) -> Decimal {
        self.0
    }
}

/// Una calificación registrada. `aporte` siempre se deriva de la
/// calificación y el porcentaje; nunca se edita por separado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Nota {
    pub id: i64,
    pub matricula_id: i64,
    pub docente_id: i64,
    pub parcial: Parcial,
    pub tipo_evaluacion: TipoEvaluacion,
    pub calificacion: Calificacion,
    pub porcentaje: Porcentaje,
    pub aporte: Decimal,
    pub observaciones: Option<String>,
    pub fecha_evaluacion: NaiveDate,
}

/// Nota ya validada, lista para guardarse. El aporte viene calculado.
#[derive(Debug, Clone, PartialEq)]
pub struct NotaValidada {
    pub matricula_id: i64,
    pub docente_id: i64,
    pub parcial: Parcial,
    pub tipo_evaluacion: TipoEvaluacion,
    pub calificacion: Calificacion,
    pub porcentaje: Porcentaje,
    pub aporte: Decimal,
    pub observaciones: Option<String>,
    pub fecha_evaluacion: NaiveDate,
}

impl From<&Nota> for NotaValidada {
    fn from(n: &Nota) -> Self {
        Self {
            matricula_id: n.matricula_id,
            docente_id: n.docente_id,
            parcial: n.parcial,
            tipo_evaluacion: n.tipo_evaluacion,
            calificacion: n.calificacion,
            porcentaje: n.porcentaje,
            aporte: n.aporte,
            observaciones: n.observaciones.clone(),
            fecha_evaluacion: n.fecha_evaluacion,
        }
    }
}

/// Alta de una nota con los valores crudos; el servicio los valida.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevaNota {
    pub matricula_id: i64,
    pub docente_id: i64,
    pub parcial: i64,
    pub tipo_evaluacion: String,
    pub calificacion: Decimal,
    pub porcentaje: Decimal,
    pub fecha_evaluacion: NaiveDate,
    #[serde(default)]
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CambiosNota {
    pub calificacion: Option<Decimal>,
    pub tipo_evaluacion: Option<String>,
    pub porcentaje: Option<Decimal>,
    pub fecha_evaluacion: Option<NaiveDate>,
    pub observaciones: Option<String>,
}

impl CambiosNota {
    pub fn is_empty(&self) -> bool {
        self.calificacion.is_none()
            && self.tipo_evaluacion.is_none()
            && self.porcentaje.is_none()
            && self.fecha_evaluacion.is_none()
            && self.observaciones.is_none()
    }
}

/// Filtros opcionales para listar notas.
#[derive(Debug, Clone, Default)]
pub struct FiltroNotas {
    pub matricula_id: Option<i64>,
    pub parcial: Option<Parcial>,
    pub tipo_evaluacion: Option<TipoEvaluacion>,
    pub docente_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoEstudiante {
    Activo,
    Inactivo,
}

impl EstadoEstudiante {
    pub fn as_str(self) -> &'static str {
        match self {
            EstadoEstudiante::Activo => "activo",
            EstadoEstudiante::Inactivo => "inactivo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estudiante {
    pub id: i64,
    pub nombre: String,
    pub cedula: String,
    pub estado: EstadoEstudiante,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevoEstudiante {
    pub nombre: String,
    pub cedula: String,
    #[serde(default = "estado_activo")]
    pub estado: EstadoEstudiante,
}

fn estado_activo() -> EstadoEstudiante {
    EstadoEstudiante::Activo
}

/// Oferta de una asignatura en un periodo, con cupo limitado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Curso {
    pub id: i64,
    pub nombre_asignatura: String,
    pub nrc: String,
    pub periodo_academico: String,
    pub cupo_maximo: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevoCurso {
    pub nombre_asignatura: String,
    pub nrc: String,
    pub periodo_academico: String,
    pub cupo_maximo: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoMatricula {
    Activa,
    Inactiva,
}

impl EstadoMatricula {
    pub fn as_str(self) -> &'static str {
        match self {
            EstadoMatricula::Activa => "activa",
            EstadoMatricula::Inactiva => "inactiva",
        }
    }
}

impl FromStr for EstadoMatricula {
    type Err = EducativoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "activa" => Ok(EstadoMatricula::Activa),
            "inactiva" => Ok(EstadoMatricula::Inactiva),
            otro => Err(EducativoError::Validacion(vec![format!(
                "Estado de matrícula inválido: {}. Debe ser: activa o inactiva",
                otro
            )])),
        }
    }
}

/// Relación estudiante × curso.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Matricula {
    pub id: i64,
    pub estudiante_id: i64,
    pub curso_id: i64,
    pub estado: EstadoMatricula,
    pub fecha_matricula: NaiveDate,
}

/// Cambios parciales de una matrícula. Cambiar de curso vuelve a validar
/// el cupo del curso destino.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CambiosMatricula {
    pub curso_id: Option<i64>,
    pub fecha_matricula: Option<NaiveDate>,
    pub estado: Option<EstadoMatricula>,
}

impl CambiosMatricula {
    pub fn is_empty(&self) -> bool {
        self.curso_id.is_none() && self.fecha_matricula.is_none() && self.estado.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parcial_fuera_de_rango() {
        assert_eq!(Parcial::from_numero(2).unwrap(), Parcial::Segundo);
        assert!(matches!(Parcial::from_numero(0), Err(EducativoError::ParcialInvalido(0))));
        assert!(matches!(Parcial::try_from(4u8), Err(EducativoError::ParcialInvalido(4))));
    }

    #[test]
    fn parcial_se_serializa_como_numero() {
        assert_eq!(serde_json::to_string(&Parcial::Tercero).unwrap(), "3");
        let p: Parcial = serde_json::from_str("1").unwrap();
        assert_eq!(p, Parcial::Primero);
        assert!(serde_json::from_str::<Parcial>("5").is_err());
    }

    #[test]
    fn tipo_evaluacion_desde_texto() {
        assert_eq!("tarea".parse::<TipoEvaluacion>().unwrap(), TipoEvaluacion::Tarea);
        assert_eq!(" participacion ".parse::<TipoEvaluacion>().unwrap(), TipoEvaluacion::Participacion);
        assert!("quiz".parse::<TipoEvaluacion>().is_err());
    }

    #[test]
    fn estado_de_matricula_desde_texto() {
        assert_eq!("inactiva".parse::<EstadoMatricula>().unwrap(), EstadoMatricula::Inactiva);
        assert!("suspendida".parse::<EstadoMatricula>().unwrap_err().es_validacion());
    }

    #[test]
    fn rangos_de_calificacion_y_porcentaje() {
        assert!(Calificacion::new(dec!(0)).is_ok());
        assert!(Calificacion::new(dec!(20)).is_ok());
        assert!(Calificacion::new(dec!(20.01)).is_err());
        assert!(Calificacion::new(dec!(-1)).is_err());
        assert!(Porcentaje::new(dec!(100)).is_ok());
        assert!(Porcentaje::new(dec!(100.5)).is_err());
    }
}
