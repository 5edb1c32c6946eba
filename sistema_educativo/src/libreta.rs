// Libreta de notas de una matrícula: tabla fija 3 × 4 indexada por
// (parcial, tipo de evaluación). La forma de la tabla garantiza que haya a lo
// sumo una evaluación de cada tipo por parcial y como mucho 12 en total.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculo::{calcular_aporte, nota_parcial, promedio_semestre, ResumenSemestre};
use crate::error::{EducativoError, Result};
use crate::models::{Calificacion, Nota, Parcial, Porcentaje, TipoEvaluacion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluacion {
    pub calificacion: Calificacion,
    pub porcentaje: Porcentaje,
    pub aporte: Decimal,
}

impl Evaluacion {
    pub fn new(calificacion: Calificacion, porcentaje: Porcentaje) -> Self {
        Self { calificacion, porcentaje, aporte: calcular_aporte(calificacion, porcentaje) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibretaNotas {
    celdas: [[Option<Evaluacion>; 4]; 3],
}

impl LibretaNotas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arma la libreta a partir de las notas guardadas de una matrícula.
    /// Usa el aporte almacenado de cada nota.
    pub fn from_notas<'a, I>(notas: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Nota>,
    {
        let mut libreta = Self::new();
        for n in notas {
            libreta.insertar(
                n.parcial,
                n.tipo_evaluacion,
                Evaluacion { calificacion: n.calificacion, porcentaje: n.porcentaje, aporte: n.aporte },
            )?;
        }
        Ok(libreta)
    }

    /// Falla si ya hay una evaluación del mismo tipo en ese parcial.
    pub fn insertar(&mut self, parcial: Parcial, tipo: TipoEvaluacion, eval: Evaluacion) -> Result<()> {
        let celda = &mut self.celdas[parcial.indice()][tipo.indice()];
        if celda.is_some() {
            return Err(EducativoError::EvaluacionDuplicada { parcial, tipo });
        }
        *celda = Some(eval);
        Ok(())
    }

    pub fn get(&self, parcial: Parcial, tipo: TipoEvaluacion) -> Option<&Evaluacion> {
        self.celdas[parcial.indice()][tipo.indice()].as_ref()
    }

    pub fn evaluaciones(&self, parcial: Parcial) -> impl Iterator<Item = (TipoEvaluacion, &Evaluacion)> + '_ {
        TipoEvaluacion::TODOS
            .into_iter()
            .filter_map(move |t| self.get(parcial, t).map(|e| (t, e)))
    }

    pub fn cantidad(&self, parcial: Parcial) -> usize {
        self.evaluaciones(parcial).count()
    }

    pub fn len(&self) -> usize {
        Parcial::TODOS.into_iter().map(|p| self.cantidad(p)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nota del parcial, limitada a 14. Un parcial sin evaluaciones vale 0.
    pub fn nota_parcial(&self, parcial: Parcial) -> Decimal {
        nota_parcial(self.evaluaciones(parcial).map(|(_, e)| e.aporte))
    }

    /// Igual que [`Self::nota_parcial`] pero exige al menos una evaluación.
    pub fn nota_parcial_registrada(&self, matricula_id: i64, parcial: Parcial) -> Result<Decimal> {
        if self.cantidad(parcial) == 0 {
            return Err(EducativoError::SinNotas { matricula_id, parcial });
        }
        Ok(self.nota_parcial(parcial))
    }

    pub fn resumen(&self) -> ResumenSemestre {
        promedio_semestre(Parcial::TODOS.map(|p| self.nota_parcial(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculo::EstadoAcademico;
    use rust_decimal_macros::dec;

    fn eval(c: Decimal, p: Decimal) -> Evaluacion {
        Evaluacion::new(Calificacion::new(c).unwrap(), Porcentaje::new(p).unwrap())
    }

    fn parcial_completo(libreta: &mut LibretaNotas, parcial: Parcial, c: Decimal) {
        for tipo in TipoEvaluacion::TODOS {
            libreta.insertar(parcial, tipo, eval(c, dec!(25))).unwrap();
        }
    }

    #[test]
    fn ejemplo_de_parcial_excedido() {
        let mut l = LibretaNotas::new();
        l.insertar(Parcial::Primero, TipoEvaluacion::Examen, eval(dec!(18), dec!(40))).unwrap();
        l.insertar(Parcial::Primero, TipoEvaluacion::Tarea, eval(dec!(15), dec!(20))).unwrap();
        l.insertar(Parcial::Primero, TipoEvaluacion::Proyecto, eval(dec!(12), dec!(20))).unwrap();
        l.insertar(Parcial::Primero, TipoEvaluacion::Participacion, eval(dec!(20), dec!(20))).unwrap();

        let aportes: Vec<Decimal> = l.evaluaciones(Parcial::Primero).map(|(_, e)| e.aporte).collect();
        assert_eq!(aportes, vec![dec!(7.2), dec!(3.0), dec!(2.4), dec!(4.0)]);
        assert_eq!(l.nota_parcial(Parcial::Primero), dec!(14));
    }

    #[test]
    fn rechaza_tipo_repetido_en_el_mismo_parcial() {
        let mut l = LibretaNotas::new();
        l.insertar(Parcial::Segundo, TipoEvaluacion::Tarea, eval(dec!(10), dec!(20))).unwrap();
        let err = l.insertar(Parcial::Segundo, TipoEvaluacion::Tarea, eval(dec!(12), dec!(20))).unwrap_err();
        assert!(matches!(
            err,
            EducativoError::EvaluacionDuplicada { parcial: Parcial::Segundo, tipo: TipoEvaluacion::Tarea }
        ));
        // el mismo tipo en otro parcial sí se permite
        l.insertar(Parcial::Tercero, TipoEvaluacion::Tarea, eval(dec!(12), dec!(20))).unwrap();
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn parcial_sin_notas() {
        let l = LibretaNotas::new();
        assert!(l.is_empty());
        assert_eq!(l.nota_parcial(Parcial::Primero), Decimal::ZERO);
        let err = l.nota_parcial_registrada(7, Parcial::Primero).unwrap_err();
        assert!(matches!(err, EducativoError::SinNotas { matricula_id: 7, parcial: Parcial::Primero }));
    }

    #[test]
    fn resumen_con_tercer_parcial_pendiente() {
        let mut l = LibretaNotas::new();
        // 4 × (20 × 25 / 100) = 20 -> 14 por parcial
        parcial_completo(&mut l, Parcial::Primero, dec!(20));
        parcial_completo(&mut l, Parcial::Segundo, dec!(20));
        let r = l.resumen();
        assert_eq!(r.promedio_semestre, dec!(28));
        assert_eq!(r.estado, EstadoAcademico::Aprobado);
        assert!(!r.reprobado_anticipado);
        assert_eq!(l.len(), 8);
    }

    #[test]
    fn libreta_llena() {
        let mut l = LibretaNotas::new();
        for p in Parcial::TODOS {
            parcial_completo(&mut l, p, dec!(10));
        }
        assert_eq!(l.len(), 12);
        // 4 × 2.5 = 10 por parcial
        assert_eq!(l.resumen().promedio_semestre, dec!(30));
    }
}
