use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::error::{EducativoError, Result};
use crate::models::{
    Calificacion, Curso, EstadoEstudiante, EstadoMatricula, Estudiante, FiltroNotas, Matricula, Nota,
    NotaValidada, NuevoCurso, NuevoEstudiante, Parcial, Porcentaje, TipoEvaluacion,
};

/// Colaborador de persistencia del sistema educativo: estudiantes, cursos,
/// matrículas y notas.
pub trait RegistroAcademico {
    fn insertar_estudiante(&self, nuevo: &NuevoEstudiante) -> Result<Estudiante>;
    fn obtener_estudiante(&self, id: i64) -> Result<Option<Estudiante>>;
    fn buscar_estudiante_por_cedula(&self, cedula: &str) -> Result<Option<Estudiante>>;

    fn insertar_curso(&self, nuevo: &NuevoCurso) -> Result<Curso>;
    fn obtener_curso(&self, id: i64) -> Result<Option<Curso>>;
    fn buscar_curso_por_nrc(&self, nrc: &str) -> Result<Option<Curso>>;

    fn insertar_matricula(&self, estudiante_id: i64, curso_id: i64, fecha: NaiveDate) -> Result<Matricula>;
    fn obtener_matricula(&self, id: i64) -> Result<Option<Matricula>>;
    fn buscar_matricula(&self, estudiante_id: i64, curso_id: i64) -> Result<Option<Matricula>>;
    fn listar_matriculas(&self, estudiante_id: i64, curso_id: Option<i64>) -> Result<Vec<Matricula>>;
    /// `excluir` deja fuera una matrícula del conteo (la que se está moviendo).
    fn contar_matriculas(&self, curso_id: i64, excluir: Option<i64>) -> Result<i64>;
    /// Sobrescribe curso, estado y fecha.
    fn actualizar_matricula(&self, matricula: &Matricula) -> Result<Option<Matricula>>;
    fn eliminar_matricula(&self, id: i64) -> Result<bool>;

    fn insertar_nota(&self, nota: &NotaValidada) -> Result<Nota>;
    fn obtener_nota(&self, id: i64) -> Result<Option<Nota>>;
    fn actualizar_nota(&self, id: i64, nota: &NotaValidada) -> Result<Option<Nota>>;
    fn eliminar_nota(&self, id: i64) -> Result<bool>;
    /// Ordenadas por matrícula, parcial y tipo de evaluación.
    fn listar_notas(&self, filtro: &FiltroNotas) -> Result<Vec<Nota>>;
}

const COLUMNAS_NOTA: &str = "id, matricula_id, docente_id, parcial, tipo_evaluacion,
    calificacion, porcentaje, aporte, observaciones, fecha_evaluacion";

const ESQUEMA: &str = "
    CREATE TABLE IF NOT EXISTS estudiantes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nombre TEXT NOT NULL,
        cedula TEXT NOT NULL UNIQUE,
        estado TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS cursos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nombre_asignatura TEXT NOT NULL,
        nrc TEXT NOT NULL UNIQUE,
        periodo_academico TEXT NOT NULL,
        cupo_maximo INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS matriculas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        estudiante_id INTEGER NOT NULL REFERENCES estudiantes(id),
        curso_id INTEGER NOT NULL REFERENCES cursos(id),
        estado TEXT NOT NULL,
        fecha_matricula TEXT NOT NULL,
        UNIQUE (estudiante_id, curso_id)
    );
    CREATE TABLE IF NOT EXISTS notas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        matricula_id INTEGER NOT NULL REFERENCES matriculas(id),
        docente_id INTEGER NOT NULL,
        parcial INTEGER NOT NULL CHECK (parcial IN (1, 2, 3)),
        tipo_evaluacion TEXT NOT NULL,
        calificacion TEXT NOT NULL,
        porcentaje TEXT NOT NULL,
        aporte TEXT NOT NULL,
        observaciones TEXT,
        fecha_evaluacion TEXT NOT NULL,
        UNIQUE (matricula_id, parcial, tipo_evaluacion)
    );
";

/// Registro académico sobre SQLite. Las cantidades decimales se guardan
/// como TEXT.
pub struct SqliteRegistro {
    conn: Connection,
}

impl SqliteRegistro {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(ESQUEMA)?;
        Ok(Self { conn })
    }
}

fn conversion<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    Decimal::from_str(&s).map_err(|e| conversion(idx, e))
}

fn fecha_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    s.parse::<NaiveDate>().map_err(|e| conversion(idx, e))
}

fn estudiante_from_row(row: &Row<'_>) -> rusqlite::Result<Estudiante> {
    let estado: String = row.get(3)?;
    Ok(Estudiante {
        id: row.get(0)?,
        nombre: row.get(1)?,
        cedula: row.get(2)?,
        estado: if estado == EstadoEstudiante::Inactivo.as_str() {
            EstadoEstudiante::Inactivo
        } else {
            EstadoEstudiante::Activo
        },
    })
}

fn curso_from_row(row: &Row<'_>) -> rusqlite::Result<Curso> {
    Ok(Curso {
        id: row.get(0)?,
        nombre_asignatura: row.get(1)?,
        nrc: row.get(2)?,
        periodo_academico: row.get(3)?,
        cupo_maximo: row.get(4)?,
    })
}

fn matricula_from_row(row: &Row<'_>) -> rusqlite::Result<Matricula> {
    let estado: String = row.get(3)?;
    Ok(Matricula {
        id: row.get(0)?,
        estudiante_id: row.get(1)?,
        curso_id: row.get(2)?,
        estado: if estado == EstadoMatricula::Inactiva.as_str() {
            EstadoMatricula::Inactiva
        } else {
            EstadoMatricula::Activa
        },
        fecha_matricula: fecha_at(row, 4)?,
    })
}

fn nota_from_row(row: &Row<'_>) -> rusqlite::Result<Nota> {
    let parcial = Parcial::from_numero(row.get(3)?).map_err(|e| conversion(3, e))?;
    let tipo: String = row.get(4)?;
    let tipo_evaluacion = TipoEvaluacion::from_str(&tipo).map_err(|e| conversion(4, e))?;
    let calificacion = Calificacion::new(decimal_at(row, 5)?).map_err(|e| conversion(5, e))?;
    let porcentaje = Porcentaje::new(decimal_at(row, 6)?).map_err(|e| conversion(6, e))?;

    Ok(Nota {
        id: row.get(0)?,
        matricula_id: row.get(1)?,
        docente_id: row.get(2)?,
        parcial,
        tipo_evaluacion,
        calificacion,
        porcentaje,
        aporte: decimal_at(row, 7)?,
        observaciones: row.get(8)?,
        fecha_evaluacion: fecha_at(row, 9)?,
    })
}

impl RegistroAcademico for SqliteRegistro {
    fn insertar_estudiante(&self, e: &NuevoEstudiante) -> Result<Estudiante> {
        self.conn.execute(
            "INSERT INTO estudiantes (nombre, cedula, estado) VALUES (?1, ?2, ?3)",
            params![e.nombre, e.cedula, e.estado.as_str()],
        )?;
        let id = self.conn.last_insert_rowid();
        self.obtener_estudiante(id)?.ok_or(EducativoError::EstudianteNoEncontrado(id))
    }

    fn obtener_estudiante(&self, id: i64) -> Result<Option<Estudiante>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, nombre, cedula, estado FROM estudiantes WHERE id = ?1",
                params![id],
                estudiante_from_row,
            )
            .optional()?)
    }

    fn buscar_estudiante_por_cedula(&self, cedula: &str) -> Result<Option<Estudiante>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, nombre, cedula, estado FROM estudiantes WHERE cedula = ?1",
                params![cedula],
                estudiante_from_row,
            )
            .optional()?)
    }

    fn insertar_curso(&self, c: &NuevoCurso) -> Result<Curso> {
        self.conn.execute(
            "INSERT INTO cursos (nombre_asignatura, nrc, periodo_academico, cupo_maximo)
             VALUES (?1, ?2, ?3, ?4)",
            params![c.nombre_asignatura, c.nrc, c.periodo_academico, c.cupo_maximo],
        )?;
        let id = self.conn.last_insert_rowid();
        self.obtener_curso(id)?.ok_or(EducativoError::CursoNoEncontrado(id))
    }

    fn obtener_curso(&self, id: i64) -> Result<Option<Curso>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, nombre_asignatura, nrc, periodo_academico, cupo_maximo FROM cursos WHERE id = ?1",
                params![id],
                curso_from_row,
            )
            .optional()?)
    }

    fn buscar_curso_por_nrc(&self, nrc: &str) -> Result<Option<Curso>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, nombre_asignatura, nrc, periodo_academico, cupo_maximo FROM cursos WHERE nrc = ?1",
                params![nrc],
                curso_from_row,
            )
            .optional()?)
    }

    fn insertar_matricula(&self, estudiante_id: i64, curso_id: i64, fecha: NaiveDate) -> Result<Matricula> {
        self.conn.execute(
            "INSERT INTO matriculas (estudiante_id, curso_id, estado, fecha_matricula)
             VALUES (?1, ?2, ?3, ?4)",
            params![estudiante_id, curso_id, EstadoMatricula::Activa.as_str(), fecha.to_string()],
        )?;
        let id = self.conn.last_insert_rowid();
        self.obtener_matricula(id)?.ok_or(EducativoError::MatriculaNoEncontrada(id))
    }

    fn obtener_matricula(&self, id: i64) -> Result<Option<Matricula>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, estudiante_id, curso_id, estado, fecha_matricula FROM matriculas WHERE id = ?1",
                params![id],
                matricula_from_row,
            )
            .optional()?)
    }

    fn buscar_matricula(&self, estudiante_id: i64, curso_id: i64) -> Result<Option<Matricula>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, estudiante_id, curso_id, estado, fecha_matricula FROM matriculas
                 WHERE estudiante_id = ?1 AND curso_id = ?2",
                params![estudiante_id, curso_id],
                matricula_from_row,
            )
            .optional()?)
    }

    fn listar_matriculas(&self, estudiante_id: i64, curso_id: Option<i64>) -> Result<Vec<Matricula>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, estudiante_id, curso_id, estado, fecha_matricula FROM matriculas
             WHERE estudiante_id = ?1 AND (?2 IS NULL OR curso_id = ?2)
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![estudiante_id, curso_id], matricula_from_row)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn contar_matriculas(&self, curso_id: i64, excluir: Option<i64>) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM matriculas WHERE curso_id = ?1 AND (?2 IS NULL OR id <> ?2)",
            params![curso_id, excluir],
            |row| row.get(0),
        )?)
    }

    fn actualizar_matricula(&self, m: &Matricula) -> Result<Option<Matricula>> {
        let changed = self.conn.execute(
            "UPDATE matriculas SET curso_id = ?1, estado = ?2, fecha_matricula = ?3 WHERE id = ?4",
            params![m.curso_id, m.estado.as_str(), m.fecha_matricula.to_string(), m.id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.obtener_matricula(m.id)
    }

    fn eliminar_matricula(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM matriculas WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn insertar_nota(&self, n: &NotaValidada) -> Result<Nota> {
        self.conn.execute(
            "INSERT INTO notas (
                matricula_id, docente_id, parcial, tipo_evaluacion,
                calificacion, porcentaje, aporte, observaciones, fecha_evaluacion
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                n.matricula_id,
                n.docente_id,
                n.parcial.numero(),
                n.tipo_evaluacion.as_str(),
                n.calificacion.valor().to_string(),
                n.porcentaje.valor().to_string(),
                n.aporte.to_string(),
                n.observaciones,
                n.fecha_evaluacion.to_string(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.obtener_nota(id)?.ok_or(EducativoError::NotaNoEncontrada(id))
    }

    fn obtener_nota(&self, id: i64) -> Result<Option<Nota>> {
        let sql = format!("SELECT {} FROM notas WHERE id = ?1", COLUMNAS_NOTA);
        Ok(self.conn.query_row(&sql, params![id], nota_from_row).optional()?)
    }

    fn actualizar_nota(&self, id: i64, n: &NotaValidada) -> Result<Option<Nota>> {
        let changed = self.conn.execute(
            "UPDATE notas SET
                tipo_evaluacion = ?1, calificacion = ?2, porcentaje = ?3, aporte = ?4,
                observaciones = ?5, fecha_evaluacion = ?6
            WHERE id = ?7",
            params![
                n.tipo_evaluacion.as_str(),
                n.calificacion.valor().to_string(),
                n.porcentaje.valor().to_string(),
                n.aporte.to_string(),
                n.observaciones,
                n.fecha_evaluacion.to_string(),
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.obtener_nota(id)
    }

    fn eliminar_nota(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM notas WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn listar_notas(&self, filtro: &FiltroNotas) -> Result<Vec<Nota>> {
        let mut condiciones = Vec::new();
        let mut valores: Vec<Value> = Vec::new();
        if let Some(m) = filtro.matricula_id {
            valores.push(Value::Integer(m));
            condiciones.push(format!("matricula_id = ?{}", valores.len()));
        }
        if let Some(p) = filtro.parcial {
            valores.push(Value::Integer(i64::from(p.numero())));
            condiciones.push(format!("parcial = ?{}", valores.len()));
        }
        if let Some(t) = filtro.tipo_evaluacion {
            valores.push(Value::Text(t.as_str().to_string()));
            condiciones.push(format!("tipo_evaluacion = ?{}", valores.len()));
        }
        if let Some(d) = filtro.docente_id {
            valores.push(Value::Integer(d));
            condiciones.push(format!("docente_id = ?{}", valores.len()));
        }

        let filtro_sql = if condiciones.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", condiciones.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM notas {} ORDER BY matricula_id, parcial, tipo_evaluacion, id",
            COLUMNAS_NOTA, filtro_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(valores.iter()), nota_from_row)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
