use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};

use crate::calculo::{calcular_aporte, redondear, EstadoAcademico, PUNTAJE_MAXIMO_SEMESTRE, PUNTAJE_PARCIAL};
use crate::error::{EducativoError, Result};
use crate::libreta::{Evaluacion, LibretaNotas};
use crate::models::{
    CambiosMatricula, CambiosNota, Calificacion, Curso, EstadoEstudiante, Estudiante, FiltroNotas, Matricula, Nota, NotaValidada,
    NuevaNota, NuevoCurso, NuevoEstudiante, Parcial, Porcentaje, TipoEvaluacion,
};
use crate::reportes::{
    CupoDisponible, DetalleCurso, EstadoAcademicoEstudiante, EstadoCurso, NotaParcial, PromedioMatricula,
    ReporteAcademico, ResumenAprobacion, ResumenMatriculas,
};
use crate::store::RegistroAcademico;

fn es_cedula_valida(cedula: &str) -> bool {
    cedula.len() == 10 && cedula.chars().all(|c| c.is_ascii_digit())
}

fn porcentaje(parte: i64, total: i64) -> Decimal {
    if total <= 0 {
        return Decimal::ZERO;
    }
    redondear(Decimal::from(parte) * dec!(100) / Decimal::from(total))
}

/// Operaciones académicas sobre un [`RegistroAcademico`]. Igual que en el
/// banco, leer-calcular-guardar no se serializa contra otros escritores.
pub struct ServicioAcademico<R> {
    registro: R,
}

impl<R: RegistroAcademico> ServicioAcademico<R> {
    pub fn new(registro: R) -> Self {
        Self { registro }
    }

    // --- Estudiantes y cursos ---

    pub fn registrar_estudiante(&self, nuevo: &NuevoEstudiante) -> Result<Estudiante> {
        let mut errores = Vec::new();
        if nuevo.nombre.trim().is_empty() {
            errores.push("El nombre es obligatorio".to_string());
        }
        if !es_cedula_valida(&nuevo.cedula) {
            errores.push("La cédula debe tener 10 dígitos".to_string());
        }
        if !errores.is_empty() {
            return Err(EducativoError::Validacion(errores));
        }

        if self.registro.buscar_estudiante_por_cedula(&nuevo.cedula)?.is_some() {
            return Err(EducativoError::CedulaDuplicada(nuevo.cedula.clone()));
        }

        let limpio = NuevoEstudiante { nombre: nuevo.nombre.trim().to_string(), ..nuevo.clone() };
        let estudiante = self.registro.insertar_estudiante(&limpio)?;
        info!(id = estudiante.id, "estudiante registrado");
        Ok(estudiante)
    }

    pub fn registrar_curso(&self, nuevo: &NuevoCurso) -> Result<Curso> {
        let mut errores = Vec::new();
        if nuevo.nombre_asignatura.trim().is_empty() {
            errores.push("El nombre de la asignatura es obligatorio".to_string());
        }
        if nuevo.nrc.trim().is_empty() {
            errores.push("El NRC es obligatorio".to_string());
        }
        if nuevo.periodo_academico.trim().is_empty() {
            errores.push("El periodo académico es obligatorio".to_string());
        }
        if nuevo.cupo_maximo <= 0 {
            errores.push("El cupo máximo debe ser mayor que 0".to_string());
        }
        if !errores.is_empty() {
            return Err(EducativoError::Validacion(errores));
        }

        if self.registro.buscar_curso_por_nrc(&nuevo.nrc)?.is_some() {
            return Err(EducativoError::NrcDuplicado(nuevo.nrc.clone()));
        }

        let curso = self.registro.insertar_curso(nuevo)?;
        info!(id = curso.id, nrc = %curso.nrc, "curso registrado");
        Ok(curso)
    }

    fn estudiante(&self, id: i64) -> Result<Estudiante> {
        self.registro.obtener_estudiante(id)?.ok_or(EducativoError::EstudianteNoEncontrado(id))
    }

    fn curso(&self, id: i64) -> Result<Curso> {
        self.registro.obtener_curso(id)?.ok_or(EducativoError::CursoNoEncontrado(id))
    }

    fn matricula(&self, id: i64) -> Result<Matricula> {
        self.registro.obtener_matricula(id)?.ok_or(EducativoError::MatriculaNoEncontrada(id))
    }

    // --- Matrículas ---

    /// `excluir` no cuenta esa matrícula contra el cupo, para mover una
    /// matrícula que ya ocupa lugar en el curso.
    pub fn validar_cupo_disponible(&self, curso_id: i64, excluir: Option<i64>) -> Result<CupoDisponible> {
        let curso = self.curso(curso_id)?;
        let actuales = self.registro.contar_matriculas(curso_id, excluir)?;
        if actuales >= curso.cupo_maximo {
            return Err(EducativoError::CupoAgotado(curso_id));
        }
        Ok(CupoDisponible { cupo_disponible: curso.cupo_maximo - actuales, cupo_total: curso.cupo_maximo })
    }

    pub fn matricular(&self, estudiante_id: i64, curso_id: i64) -> Result<Matricula> {
        let estudiante = self.estudiante(estudiante_id)?;
        if estudiante.estado == EstadoEstudiante::Inactivo {
            return Err(EducativoError::Validacion(vec![format!(
                "El estudiante {} está inactivo",
                estudiante_id
            )]));
        }
        self.curso(curso_id)?;
        if self.registro.buscar_matricula(estudiante_id, curso_id)?.is_some() {
            return Err(EducativoError::MatriculaDuplicada { estudiante_id, curso_id });
        }
        self.validar_cupo_disponible(curso_id, None)
            .inspect_err(|e| warn!(estudiante_id, curso_id, "matrícula rechazada: {}", e))?;

        let matricula = self.registro.insertar_matricula(estudiante_id, curso_id, Utc::now().date_naive())?;
        info!(id = matricula.id, estudiante_id, curso_id, "matrícula creada");
        Ok(matricula)
    }

    pub fn obtener_matricula(&self, id: i64) -> Result<Matricula> {
        self.matricula(id)
    }

    pub fn actualizar_matricula(&self, id: i64, cambios: &CambiosMatricula) -> Result<Matricula> {
        if cambios.is_empty() {
            return Err(EducativoError::Validacion(vec!["Ingresar datos para actualizar".to_string()]));
        }
        let mut matricula = self.matricula(id)?;

        if let Some(curso_id) = cambios.curso_id.filter(|c| *c != matricula.curso_id) {
            self.curso(curso_id)?;
            let estudiante_id = matricula.estudiante_id;
            if self.registro.buscar_matricula(estudiante_id, curso_id)?.is_some() {
                return Err(EducativoError::MatriculaDuplicada { estudiante_id, curso_id });
            }
            self.validar_cupo_disponible(curso_id, Some(id))
                .inspect_err(|e| warn!(id, curso_id, "cambio de curso rechazado: {}", e))?;
            matricula.curso_id = curso_id;
        }
        if let Some(fecha) = cambios.fecha_matricula {
            matricula.fecha_matricula = fecha;
        }
        if let Some(estado) = cambios.estado {
            matricula.estado = estado;
        }

        let guardada = self
            .registro
            .actualizar_matricula(&matricula)?
            .ok_or(EducativoError::MatriculaNoEncontrada(id))?;
        info!(id, curso_id = guardada.curso_id, estado = guardada.estado.as_str(), "matrícula actualizada");
        Ok(guardada)
    }

    /// Solo se borran matrículas sin notas.
    pub fn eliminar_matricula(&self, id: i64) -> Result<()> {
        self.matricula(id)?;
        let filtro = FiltroNotas { matricula_id: Some(id), ..FiltroNotas::default() };
        if !self.registro.listar_notas(&filtro)?.is_empty() {
            return Err(EducativoError::MatriculaConNotas(id));
        }
        if !self.registro.eliminar_matricula(id)? {
            return Err(EducativoError::MatriculaNoEncontrada(id));
        }
        info!(id, "matrícula eliminada");
        Ok(())
    }

    pub fn resumen_matriculas(&self, curso_id: i64) -> Result<ResumenMatriculas> {
        let curso = self.curso(curso_id)?;
        let matriculados = self.registro.contar_matriculas(curso_id, None)?;
        Ok(ResumenMatriculas {
            curso_id,
            nombre_curso: curso.nombre_asignatura,
            cupo_total: curso.cupo_maximo,
            matriculados,
            disponibles: curso.cupo_maximo - matriculados,
            porcentaje_ocupacion: porcentaje(matriculados, curso.cupo_maximo),
        })
    }

    // --- Notas ---

    fn libreta(&self, matricula_id: i64, excluir: Option<i64>) -> Result<LibretaNotas> {
        let filtro = FiltroNotas { matricula_id: Some(matricula_id), ..FiltroNotas::default() };
        let notas = self.registro.listar_notas(&filtro)?;
        LibretaNotas::from_notas(notas.iter().filter(|n| Some(n.id) != excluir))
    }

    pub fn registrar_nota(&self, nueva: &NuevaNota) -> Result<Nota> {
        let parcial = Parcial::from_numero(nueva.parcial)?;
        let tipo = nueva.tipo_evaluacion.parse::<TipoEvaluacion>()?;
        let calificacion = Calificacion::new(nueva.calificacion)?;
        let porcentaje = Porcentaje::new(nueva.porcentaje)?;
        self.matricula(nueva.matricula_id)?;

        let evaluacion = Evaluacion::new(calificacion, porcentaje);
        self.libreta(nueva.matricula_id, None)?
            .insertar(parcial, tipo, evaluacion)
            .inspect_err(|e| warn!(matricula_id = nueva.matricula_id, "nota rechazada: {}", e))?;

        let nota = self.registro.insertar_nota(&NotaValidada {
            matricula_id: nueva.matricula_id,
            docente_id: nueva.docente_id,
            parcial,
            tipo_evaluacion: tipo,
            calificacion,
            porcentaje,
            aporte: evaluacion.aporte,
            observaciones: nueva.observaciones.clone(),
            fecha_evaluacion: nueva.fecha_evaluacion,
        })?;
        info!(id = nota.id, matricula_id = nota.matricula_id, parcial = %parcial, tipo = %tipo, "nota registrada");
        Ok(nota)
    }

    pub fn obtener_nota(&self, id: i64) -> Result<Nota> {
        self.registro.obtener_nota(id)?.ok_or(EducativoError::NotaNoEncontrada(id))
    }

    pub fn listar_notas(&self, filtro: &FiltroNotas) -> Result<Vec<Nota>> {
        self.registro.listar_notas(filtro)
    }

    /// Cambios parciales. El aporte se vuelve a derivar de la calificación y
    /// el porcentaje resultantes.
    pub fn actualizar_nota(&self, id: i64, cambios: &CambiosNota) -> Result<Nota> {
        if cambios.is_empty() {
            return Err(EducativoError::Validacion(vec!["No hay campos para actualizar".to_string()]));
        }
        let actual = self.obtener_nota(id)?;
        let mut nota = NotaValidada::from(&actual);

        if let Some(c) = cambios.calificacion {
            nota.calificacion = Calificacion::new(c)?;
        }
        if let Some(p) = cambios.porcentaje {
            nota.porcentaje = Porcentaje::new(p)?;
        }
        if let Some(t) = &cambios.tipo_evaluacion {
            nota.tipo_evaluacion = t.parse()?;
        }
        if let Some(f) = cambios.fecha_evaluacion {
            nota.fecha_evaluacion = f;
        }
        if let Some(o) = &cambios.observaciones {
            nota.observaciones = Some(o.clone());
        }

        let evaluacion = Evaluacion::new(nota.calificacion, nota.porcentaje);
        nota.aporte = evaluacion.aporte;
        if nota.tipo_evaluacion != actual.tipo_evaluacion {
            self.libreta(actual.matricula_id, Some(id))?
                .insertar(nota.parcial, nota.tipo_evaluacion, evaluacion)
                .inspect_err(|e| warn!(id, "cambio de tipo rechazado: {}", e))?;
        }

        let nota = self.registro.actualizar_nota(id, &nota)?.ok_or(EducativoError::NotaNoEncontrada(id))?;
        info!(id, aporte = %nota.aporte, "nota actualizada");
        Ok(nota)
    }

    pub fn eliminar_nota(&self, id: i64) -> Result<()> {
        if !self.registro.eliminar_nota(id)? {
            return Err(EducativoError::NotaNoEncontrada(id));
        }
        info!(id, "nota eliminada");
        Ok(())
    }

    // --- Cálculos ---

    /// Falla con `SinNotas` si el parcial no tiene evaluaciones.
    pub fn calcular_nota_parcial(&self, matricula_id: i64, parcial: i64) -> Result<NotaParcial> {
        let parcial = Parcial::from_numero(parcial)?;
        self.matricula(matricula_id)?;

        let filtro = FiltroNotas { matricula_id: Some(matricula_id), parcial: Some(parcial), ..FiltroNotas::default() };
        let detalles = self.registro.listar_notas(&filtro)?;
        let nota_parcial = LibretaNotas::from_notas(&detalles)?.nota_parcial_registrada(matricula_id, parcial)?;
        debug!(matricula_id, parcial = %parcial, nota = %nota_parcial, "nota de parcial");

        Ok(NotaParcial { matricula_id, parcial, nota_parcial, nota_maxima: PUNTAJE_PARCIAL, detalles })
    }

    /// Los parciales sin notas cuentan como 0.
    pub fn calcular_promedio_semestre(&self, matricula_id: i64) -> Result<PromedioMatricula> {
        self.matricula(matricula_id)?;
        let resumen = self.libreta(matricula_id, None)?.resumen();
        debug!(matricula_id, promedio = %resumen.promedio_semestre, "promedio del semestre");
        Ok(PromedioMatricula { matricula_id, resumen })
    }

    pub fn estado_academico(&self, estudiante_id: i64, curso_id: Option<i64>) -> Result<EstadoAcademicoEstudiante> {
        let matriculas = self.registro.listar_matriculas(estudiante_id, curso_id)?;
        if matriculas.is_empty() {
            return Err(EducativoError::SinMatriculas(estudiante_id));
        }

        let mut estado = Vec::with_capacity(matriculas.len());
        for m in &matriculas {
            let asignatura = self.registro.obtener_curso(m.curso_id)?.map(|c| c.nombre_asignatura).unwrap_or_default();
            estado.push(EstadoCurso {
                matricula_id: m.id,
                curso_id: m.curso_id,
                asignatura,
                resumen: self.libreta(m.id, None)?.resumen(),
            });
        }
        Ok(EstadoAcademicoEstudiante { estudiante_id, estado })
    }

    /// Los estudiantes inactivos se tratan como inexistentes.
    pub fn reporte_academico(&self, estudiante_id: i64) -> Result<ReporteAcademico> {
        let estudiante = match self.registro.obtener_estudiante(estudiante_id)? {
            Some(e) if e.estado == EstadoEstudiante::Activo => e,
            _ => return Err(EducativoError::EstudianteNoEncontrado(estudiante_id)),
        };

        let matriculas = self.registro.listar_matriculas(estudiante_id, None)?;
        let (mut aprobadas, mut reprobadas) = (0u32, 0u32);
        let mut detalle = Vec::with_capacity(matriculas.len());
        for m in &matriculas {
            let resumen = self.libreta(m.id, None)?.resumen();
            match resumen.estado {
                EstadoAcademico::Aprobado => aprobadas += 1,
                EstadoAcademico::Reprobado => reprobadas += 1,
            }
            let curso = self
                .registro
                .obtener_curso(m.curso_id)?
                .map(|c| if c.nombre_asignatura.is_empty() { c.nrc } else { c.nombre_asignatura })
                .unwrap_or_default();
            detalle.push(DetalleCurso {
                curso,
                promedio: resumen.promedio_semestre,
                promedio_maximo: PUNTAJE_MAXIMO_SEMESTRE,
                estado: resumen.estado,
            });
        }

        let total = aprobadas + reprobadas;
        Ok(ReporteAcademico {
            estudiante: estudiante.nombre,
            cedula: estudiante.cedula,
            resumen_semestre: ResumenAprobacion {
                aprobadas,
                reprobadas,
                total,
                porcentaje_aprobacion: porcentaje(i64::from(aprobadas), i64::from(total)),
            },
            detalle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cedula_de_diez_digitos() {
        assert!(es_cedula_valida("1712345678"));
        assert!(!es_cedula_valida("171234567"));
        assert!(!es_cedula_valida("17123456ab"));
    }

    #[test]
    fn porcentaje_con_dos_decimales() {
        assert_eq!(porcentaje(1, 3), dec!(33.33));
        assert_eq!(porcentaje(2, 3), dec!(66.67));
        assert_eq!(porcentaje(5, 0), Decimal::ZERO);
    }
}
