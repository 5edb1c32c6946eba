// Agregación de calificaciones: aporte por evaluación, nota por parcial y
// promedio del semestre. Funciones puras, sin IO ni estado compartido.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::{EducativoError, Result};
use crate::models::{Calificacion, Parcial, Porcentaje};

/// Escala de cada calificación individual.
pub const ESCALA_MAXIMA: Decimal = dec!(20);
/// Tope de la nota de un parcial.
pub const PUNTAJE_PARCIAL: Decimal = dec!(14);
/// Máximo del semestre (3 × 14).
pub const PUNTAJE_MAXIMO_SEMESTRE: Decimal = dec!(42);
/// Puntaje mínimo para aprobar el semestre.
pub const PUNTAJE_MINIMO_APROBACION: Decimal = dec!(28);

/// Redondeo a dos decimales, mitad hacia afuera.
pub fn redondear(valor: Decimal) -> Decimal {
    valor.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Aporte de una evaluación a su parcial: `calificación × porcentaje / 100`.
pub fn calcular_aporte(calificacion: Calificacion, porcentaje: Porcentaje) -> Decimal {
    redondear(calificacion.valor() * porcentaje.valor() / dec!(100))
}

/// Suma los aportes de un parcial y la limita a [`PUNTAJE_PARCIAL`].
pub fn nota_parcial<I>(aportes: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    aportes.into_iter().sum::<Decimal>().min(PUNTAJE_PARCIAL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoAcademico {
    Aprobado,
    Reprobado,
}

impl EstadoAcademico {
    pub fn desde_promedio(promedio: Decimal) -> Self {
        if promedio >= PUNTAJE_MINIMO_APROBACION {
            EstadoAcademico::Aprobado
        } else {
            EstadoAcademico::Reprobado
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parciales {
    pub parcial1: Decimal,
    pub parcial2: Decimal,
    pub parcial3: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenSemestre {
    pub parciales: Parciales,
    pub promedio_semestre: Decimal,
    pub promedio_maximo: Decimal,
    pub estado: EstadoAcademico,
    /// La suma de los dos primeros parciales queda por debajo de 28.
    pub reprobado_anticipado: bool,
}

/// Valida notas de parcial sueltas (sin libreta detrás): no pueden ser
/// negativas. Reúne un mensaje por cada parcial inválido.
pub fn validar_notas_parciales(notas: [Decimal; 3]) -> Result<[Decimal; 3]> {
    let errores: Vec<String> = Parcial::TODOS
        .into_iter()
        .zip(notas)
        .filter(|(_, n)| *n < Decimal::ZERO)
        .map(|(p, n)| format!("La nota del parcial {} no puede ser negativa (recibido {})", p, n))
        .collect();
    if !errores.is_empty() {
        return Err(EducativoError::Validacion(errores));
    }
    Ok(notas)
}

/// Combina las notas de los tres parciales. Cada una se limita de nuevo a
/// [`PUNTAJE_PARCIAL`], así que el promedio nunca supera 42.
pub fn promedio_semestre(notas: [Decimal; 3]) -> ResumenSemestre {
    let [p1, p2, p3] = notas.map(|n| n.min(PUNTAJE_PARCIAL));
    let promedio = p1 + p2 + p3;

    ResumenSemestre {
        parciales: Parciales { parcial1: p1, parcial2: p2, parcial3: p3 },
        promedio_semestre: promedio,
        promedio_maximo: PUNTAJE_MAXIMO_SEMESTRE,
        estado: EstadoAcademico::desde_promedio(promedio),
        reprobado_anticipado: p1 + p2 < PUNTAJE_MINIMO_APROBACION,
    }
}
