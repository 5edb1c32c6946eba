use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::calculo::{DatosFinancieros, ResultadoCliente};
use crate::error::{ClienteError, Result};
use crate::models::{Cliente, ClienteValidado};

/// Colaborador de persistencia: lee los montos de un cliente y sobrescribe
/// los campos derivados después del cálculo.
pub trait RepositorioClientes {
    fn insertar(&self, cliente: &ClienteValidado) -> Result<Cliente>;
    fn obtener(&self, id: i64) -> Result<Option<Cliente>>;
    /// Más recientes primero.
    fn listar(&self) -> Result<Vec<Cliente>>;
    /// `false` incluye a los clientes que nunca se calcularon.
    fn listar_por_morosidad(&self, moroso: bool) -> Result<Vec<Cliente>>;
    fn actualizar(&self, id: i64, cliente: &ClienteValidado) -> Result<Option<Cliente>>;
    fn eliminar(&self, id: i64) -> Result<bool>;
    fn guardar_resultado(&self, id: i64, resultado: &ResultadoCliente) -> Result<Option<Cliente>>;
    fn contar(&self) -> Result<i64>;
    fn contar_morosos(&self) -> Result<i64>;
}

const COLUMNAS: &str = "id, nombre, email, telefono, direccion,
    saldo_anterior, monto_compras, pago_realizado,
    saldo_base, pago_minimo_base, interes, multa, saldo_actual, pago_minimo, pago_no_intereses,
    es_moroso, creado_en, actualizado_en,
    calculo_saldo_anterior, calculo_monto_compras, calculo_pago_realizado";

/// Repositorio de clientes sobre SQLite. Los montos se guardan como TEXT
/// para no perder precisión decimal. Las columnas `calculo_*` guardan los
/// montos con los que se hizo el último cálculo, así el resultado guardado
/// sigue siendo coherente aunque después se editen los montos del cliente.
pub struct SqliteClientes {
    conn: Connection,
}

impl SqliteClientes {
    /// Abre (o crea) la base en `path`, creando el directorio si hace falta.
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
        conn.execute(
            "CREATE TABLE IF NOT EXISTS clientes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                email TEXT NOT NULL,
                telefono TEXT NOT NULL,
                direccion TEXT NOT NULL,
                saldo_anterior TEXT NOT NULL,
                monto_compras TEXT NOT NULL,
                pago_realizado TEXT NOT NULL,
                saldo_base TEXT,
                pago_minimo_base TEXT,
                interes TEXT,
                multa TEXT,
                saldo_actual TEXT,
                pago_minimo TEXT,
                pago_no_intereses TEXT,
                es_moroso INTEGER,
                creado_en TEXT NOT NULL,
                actualizado_en TEXT NOT NULL,
                calculo_saldo_anterior TEXT,
                calculo_monto_compras TEXT,
                calculo_pago_realizado TEXT
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    fn query_clientes(&self, sql: &str) -> Result<Vec<Cliente>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], cliente_from_row)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

// Ancho fijo para que el orden lexicográfico coincida con el cronológico.
fn ahora() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    Decimal::from_str(&s).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn decimal_opt_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(s) => Decimal::from_str(&s)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

fn fecha_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    s.parse::<DateTime<Utc>>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn cliente_from_row(row: &Row<'_>) -> rusqlite::Result<Cliente> {
    let saldo_anterior = decimal_at(row, 5)?;
    let monto_compras = decimal_at(row, 6)?;
    let pago_realizado = decimal_at(row, 7)?;
    let datos = DatosFinancieros::new(saldo_anterior, monto_compras, pago_realizado)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    let es_moroso: Option<bool> = row.get(15)?;
    let entradas = (decimal_opt_at(row, 18)?, decimal_opt_at(row, 19)?, decimal_opt_at(row, 20)?);
    let derivados = (
        decimal_opt_at(row, 8)?,
        decimal_opt_at(row, 9)?,
        decimal_opt_at(row, 10)?,
        decimal_opt_at(row, 11)?,
        decimal_opt_at(row, 12)?,
        decimal_opt_at(row, 13)?,
        decimal_opt_at(row, 14)?,
    );
    let resultado = match (entradas, derivados, es_moroso) {
        (
            (Some(calc_anterior), Some(calc_compras), Some(calc_pago)),
            (
                Some(saldo_base),
                Some(pago_minimo_base),
                Some(interes),
                Some(multa),
                Some(saldo_actual),
                Some(pago_minimo),
                Some(pago_no_intereses),
            ),
            Some(moroso),
        ) => Some(ResultadoCliente {
            saldo_anterior: calc_anterior,
            monto_compras: calc_compras,
            pago_realizado: calc_pago,
            saldo_base,
            pago_minimo_base,
            es_moroso: moroso,
            interes,
            multa,
            saldo_actual,
            pago_minimo,
            pago_no_intereses,
        }),
        _ => None,
    };

    Ok(Cliente {
        id: row.get(0)?,
        nombre: row.get(1)?,
        email: row.get(2)?,
        telefono: row.get(3)?,
        direccion: row.get(4)?,
        datos,
        resultado,
        es_moroso,
        creado_en: fecha_at(row, 16)?,
        actualizado_en: fecha_at(row, 17)?,
    })
}

impl RepositorioClientes for SqliteClientes {
    fn insertar(&self, c: &ClienteValidado) -> Result<Cliente> {
        let ts = ahora();
        self.conn.execute(
            "INSERT INTO clientes (
                nombre, email, telefono, direccion,
                saldo_anterior, monto_compras, pago_realizado,
                creado_en, actualizado_en
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                c.nombre,
                c.email,
                c.telefono,
                c.direccion,
                c.datos.saldo_anterior().to_string(),
                c.datos.monto_compras().to_string(),
                c.datos.pago_realizado().to_string(),
                ts,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.obtener(id)?.ok_or(ClienteError::NoEncontrado(id))
    }

    fn obtener(&self, id: i64) -> Result<Option<Cliente>> {
        let sql = format!("SELECT {} FROM clientes WHERE id = ?1", COLUMNAS);
        Ok(self.conn.query_row(&sql, params![id], cliente_from_row).optional()?)
    }

    fn listar(&self) -> Result<Vec<Cliente>> {
        let sql = format!("SELECT {} FROM clientes ORDER BY creado_en DESC, id DESC", COLUMNAS);
        self.query_clientes(&sql)
    }

    fn listar_por_morosidad(&self, moroso: bool) -> Result<Vec<Cliente>> {
        let filtro = if moroso { "es_moroso = 1" } else { "(es_moroso = 0 OR es_moroso IS NULL)" };
        let sql = format!(
            "SELECT {} FROM clientes WHERE {} ORDER BY creado_en DESC, id DESC",
            COLUMNAS, filtro
        );
        self.query_clientes(&sql)
    }

    fn actualizar(&self, id: i64, c: &ClienteValidado) -> Result<Option<Cliente>> {
        let changed = self.conn.execute(
            "UPDATE clientes SET
                nombre = ?1, email = ?2, telefono = ?3, direccion = ?4,
                saldo_anterior = ?5, monto_compras = ?6, pago_realizado = ?7,
                actualizado_en = ?8
            WHERE id = ?9",
            params![
                c.nombre,
                c.email,
                c.telefono,
                c.direccion,
                c.datos.saldo_anterior().to_string(),
                c.datos.monto_compras().to_string(),
                c.datos.pago_realizado().to_string(),
                ahora(),
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.obtener(id)
    }

    fn eliminar(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM clientes WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn guardar_resultado(&self, id: i64, r: &ResultadoCliente) -> Result<Option<Cliente>> {
        let changed = self.conn.execute(
            "UPDATE clientes SET
                saldo_base = ?1, pago_minimo_base = ?2, interes = ?3, multa = ?4,
                saldo_actual = ?5, pago_minimo = ?6, pago_no_intereses = ?7,
                es_moroso = ?8, actualizado_en = ?9,
                calculo_saldo_anterior = ?10, calculo_monto_compras = ?11, calculo_pago_realizado = ?12
            WHERE id = ?13",
            params![
                r.saldo_base.to_string(),
                r.pago_minimo_base.to_string(),
                r.interes.to_string(),
                r.multa.to_string(),
                r.saldo_actual.to_string(),
                r.pago_minimo.to_string(),
                r.pago_no_intereses.to_string(),
                r.es_moroso,
                ahora(),
                r.saldo_anterior.to_string(),
                r.monto_compras.to_string(),
                r.pago_realizado.to_string(),
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.obtener(id)
    }

    fn contar(&self) -> Result<i64> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM clientes", [], |row| row.get(0))?)
    }

    fn contar_morosos(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM clientes WHERE es_moroso = 1", [], |row| row.get(0))?)
    }
}
