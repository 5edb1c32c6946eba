// Cálculo de saldo, interés, multa y pagos de un cliente.
//
// Es una función pura: no hace IO, no lee el reloj y no comparte estado,
// por lo que puede llamarse desde cualquier hilo. La validación de los montos
// ocurre antes, al construir `DatosFinancieros`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{ClienteError, Result};

/// Porcentaje del saldo que se exige como pago mínimo.
pub const TASA_PAGO_MINIMO: Decimal = dec!(0.15);
/// Interés aplicado sobre el saldo base cuando el cliente es moroso.
pub const TASA_INTERES_MORA: Decimal = dec!(0.12);
/// Multa fija por morosidad.
pub const MULTA_MOROSIDAD: Decimal = dec!(200);
/// Porcentaje del saldo actual que se puede pagar sin generar intereses.
pub const TASA_PAGO_NO_INTERESES: Decimal = dec!(0.85);
/// Tope de cada monto de entrada (10^15). Con este tope las sumas y los
/// productos del cálculo nunca desbordan `Decimal`.
pub const MONTO_MAXIMO: Decimal = dec!(1000000000000000);

/// Los tres montos de entrada de un cliente, en `[0, MONTO_MAXIMO]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatosFinancieros {
    saldo_anterior: Decimal,
    monto_compras: Decimal,
    pago_realizado: Decimal,
}

impl DatosFinancieros {
    pub fn new(saldo_anterior: Decimal, monto_compras: Decimal, pago_realizado: Decimal) -> Result<Self> {
        for (campo, valor) in [
            ("saldoAnterior", saldo_anterior),
            ("montoCompras", monto_compras),
            ("pagoRealizado", pago_realizado),
        ] {
            if valor < Decimal::ZERO {
                return Err(ClienteError::MontoNegativo { campo });
            }
            if valor > MONTO_MAXIMO {
                return Err(ClienteError::MontoExcedido { campo });
            }
        }
        Ok(Self { saldo_anterior, monto_compras, pago_realizado })
    }

    pub fn saldo_anterior(&self) -> Decimal {
        self.saldo_anterior
    }

    pub fn monto_compras(&self) -> Decimal {
        self.monto_compras
    }

    pub fn pago_realizado(&self) -> Decimal {
        self.pago_realizado
    }
}

/// Resultado completo del cálculo. Inmutable: se recalcula, nunca se edita.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoCliente {
    pub saldo_anterior: Decimal,
    pub monto_compras: Decimal,
    pub pago_realizado: Decimal,
    pub saldo_base: Decimal,
    pub pago_minimo_base: Decimal,
    pub es_moroso: bool,
    pub interes: Decimal,
    pub multa: Decimal,
    pub saldo_actual: Decimal,
    pub pago_minimo: Decimal,
    pub pago_no_intereses: Decimal,
}

/// Calcula los valores derivados de un cliente en la secuencia fija:
/// saldo base, pago mínimo base, morosidad, interés y multa, saldo actual,
/// pago mínimo y pago sin intereses.
///
/// La morosidad usa comparación estricta: pagar exactamente el pago mínimo
/// base no convierte al cliente en moroso.
pub fn calcular_cliente(datos: &DatosFinancieros) -> ResultadoCliente {
    let saldo_base = datos.saldo_anterior + datos.monto_compras - datos.pago_realizado;
    let pago_minimo_base = TASA_PAGO_MINIMO * saldo_base;
    let es_moroso = datos.pago_realizado < pago_minimo_base;

    let (interes, multa) = if es_moroso {
        (TASA_INTERES_MORA * saldo_base, MULTA_MOROSIDAD)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let saldo_actual = saldo_base + interes + multa;

    ResultadoCliente {
        saldo_anterior: datos.saldo_anterior,
        monto_compras: datos.monto_compras,
        pago_realizado: datos.pago_realizado,
        saldo_base,
        pago_minimo_base,
        es_moroso,
        interes,
        multa,
        saldo_actual,
        pago_minimo: TASA_PAGO_MINIMO * saldo_actual,
        pago_no_intereses: TASA_PAGO_NO_INTERESES * saldo_actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datos(a: Decimal, b: Decimal, c: Decimal) -> DatosFinancieros {
        DatosFinancieros::new(a, b, c).unwrap()
    }

    #[test]
    fn cliente_moroso() {
        let r = calcular_cliente(&datos(dec!(1000), dec!(500), dec!(100)));
        assert_eq!(r.saldo_base, dec!(1400));
        assert_eq!(r.pago_minimo_base, dec!(210));
        assert!(r.es_moroso);
        assert_eq!(r.interes, dec!(168));
        assert_eq!(r.multa, dec!(200));
        assert_eq!(r.saldo_actual, dec!(1768));
        assert_eq!(r.pago_minimo, dec!(265.2));
        assert_eq!(r.pago_no_intereses, dec!(1502.8));
    }

    #[test]
    fn cliente_al_dia_con_saldo_cero() {
        let r = calcular_cliente(&datos(dec!(1000), dec!(0), dec!(1000)));
        assert_eq!(r.saldo_base, Decimal::ZERO);
        assert_eq!(r.pago_minimo_base, Decimal::ZERO);
        assert!(!r.es_moroso);
        assert_eq!(r.interes, Decimal::ZERO);
        assert_eq!(r.multa, Decimal::ZERO);
        assert_eq!(r.saldo_actual, Decimal::ZERO);
    }

    #[test]
    fn pago_igual_al_minimo_no_es_moroso() {
        // 1150 - 150 = 1000, mínimo base = 150, pago = 150
        let r = calcular_cliente(&datos(dec!(1150), dec!(0), dec!(150)));
        assert_eq!(r.saldo_base, dec!(1000));
        assert_eq!(r.pago_minimo_base, dec!(150));
        assert!(!r.es_moroso);
        assert_eq!(r.saldo_actual, dec!(1000));
        assert_eq!(r.pago_minimo, dec!(150));
        assert_eq!(r.pago_no_intereses, dec!(850));
    }

    #[test]
    fn pago_mayor_que_la_deuda_deja_saldo_negativo_sin_mora() {
        let r = calcular_cliente(&datos(dec!(100), dec!(0), dec!(300)));
        assert_eq!(r.saldo_base, dec!(-200));
        assert!(!r.es_moroso);
        assert_eq!(r.saldo_actual, dec!(-200));
    }

    #[test]
    fn rechaza_montos_negativos() {
        let err = DatosFinancieros::new(dec!(10), dec!(-1), dec!(0)).unwrap_err();
        assert!(matches!(err, ClienteError::MontoNegativo { campo: "montoCompras" }));
        assert!(DatosFinancieros::new(dec!(-0.01), dec!(0), dec!(0)).is_err());
    }

    #[test]
    fn rechaza_montos_sobre_el_tope() {
        let err = DatosFinancieros::new(Decimal::MAX, Decimal::MAX, dec!(0)).unwrap_err();
        assert!(matches!(err, ClienteError::MontoExcedido { campo: "saldoAnterior" }));
        assert!(err.es_validacion());
        let err = DatosFinancieros::new(dec!(0), dec!(0), MONTO_MAXIMO + dec!(0.01)).unwrap_err();
        assert!(matches!(err, ClienteError::MontoExcedido { campo: "pagoRealizado" }));
    }

    #[test]
    fn montos_en_el_tope_no_desbordan() {
        let r = calcular_cliente(&datos(MONTO_MAXIMO, MONTO_MAXIMO, dec!(0)));
        assert!(r.es_moroso);
        assert_eq!(r.saldo_base, dec!(2000000000000000));
        assert_eq!(r.saldo_actual, r.saldo_base + r.interes + r.multa);
    }

    #[test]
    fn resultado_se_serializa_en_camel_case() {
        let r = calcular_cliente(&datos(dec!(1000), dec!(500), dec!(100)));
        let v = serde_json::to_value(r).unwrap();
        assert_eq!(v["esMoroso"], serde_json::json!(true));
        assert!(v.get("pagoNoIntereses").is_some());
        assert!(v.get("saldoBase").is_some());
    }
}
