// Estructuras de datos de clientes

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculo::{DatosFinancieros, ResultadoCliente};

/// Cliente tal como se guarda en el repositorio.
///
/// `resultado` y `es_moroso` solo los escribe la operación de cálculo y
/// sobrescriben cualquier valor anterior. Un cliente recién creado no tiene
/// cálculo y por eso `es_moroso` es `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
    pub direccion: String,
    #[serde(flatten)]
    pub datos: DatosFinancieros,
    pub resultado: Option<ResultadoCliente>,
    pub es_moroso: Option<bool>,
    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}

/// Formulario de alta. Todos los campos son opcionales para poder reportar
/// cada ausencia como un error de validación.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevoCliente {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub saldo_anterior: Option<Decimal>,
    pub monto_compras: Option<Decimal>,
    pub pago_realizado: Option<Decimal>,
}

/// Cambios parciales: solo se tocan los campos presentes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CambiosCliente {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub saldo_anterior: Option<Decimal>,
    pub monto_compras: Option<Decimal>,
    pub pago_realizado: Option<Decimal>,
}

/// Datos de cliente que ya pasaron la validación y pueden persistirse.
#[derive(Debug, Clone, PartialEq)]
pub struct ClienteValidado {
    pub nombre: String,
    pub email: String,
    pub telefono: String,
    pub direccion: String,
    pub datos: DatosFinancieros,
}

impl From<&Cliente> for ClienteValidado {
    fn from(c: &Cliente) -> Self {
        Self {
            nombre: c.nombre.clone(),
            email: c.email.clone(),
            telefono: c.telefono.clone(),
            direccion: c.direccion.clone(),
            datos: c.datos,
        }
    }
}

/// Conteo de clientes por morosidad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estadisticas {
    pub total: i64,
    pub morosos: i64,
    pub no_morosos: i64,
}

/// Respuesta de la operación de cálculo: el resultado y el cliente ya
/// actualizado.
#[derive(Debug, Clone, Serialize)]
pub struct Calculo {
    pub resultado: ResultadoCliente,
    pub cliente: Cliente,
}
