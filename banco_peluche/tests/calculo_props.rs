use banco_peluche::calculo::{MULTA_MOROSIDAD, TASA_PAGO_MINIMO};
use banco_peluche::{calcular_cliente, DatosFinancieros};
use proptest::prelude::*;
use rust_decimal::Decimal;

// montos en centavos, hasta 10 millones
fn monto() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000).prop_map(|c| Decimal::new(c, 2))
}

proptest! {
    #[test]
    fn saldo_actual_es_base_mas_interes_y_multa(a in monto(), b in monto(), c in monto()) {
        let r = calcular_cliente(&DatosFinancieros::new(a, b, c).unwrap());
        prop_assert_eq!(r.saldo_actual, r.saldo_base + r.interes + r.multa);
        prop_assert_eq!(r.pago_minimo_base, TASA_PAGO_MINIMO * r.saldo_base);
    }

    #[test]
    fn sin_mora_no_hay_interes_ni_multa(a in monto(), b in monto(), c in monto()) {
        let r = calcular_cliente(&DatosFinancieros::new(a, b, c).unwrap());
        if c >= r.pago_minimo_base {
            prop_assert!(!r.es_moroso);
            prop_assert_eq!(r.interes, Decimal::ZERO);
            prop_assert_eq!(r.multa, Decimal::ZERO);
        } else {
            prop_assert!(r.es_moroso);
            prop_assert_eq!(r.multa, MULTA_MOROSIDAD);
        }
    }

    #[test]
    fn calcular_es_idempotente(a in monto(), b in monto(), c in monto()) {
        let datos = DatosFinancieros::new(a, b, c).unwrap();
        prop_assert_eq!(calcular_cliente(&datos), calcular_cliente(&datos));
    }

    #[test]
    fn pagos_suman_el_saldo_actual(a in monto(), b in monto(), c in monto()) {
        let r = calcular_cliente(&DatosFinancieros::new(a, b, c).unwrap());
        prop_assert_eq!(r.pago_minimo + r.pago_no_intereses, r.saldo_actual);
    }
}
