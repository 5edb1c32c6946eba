use banco_peluche::models::{CambiosCliente, NuevoCliente};
use banco_peluche::{ClienteError, ServicioClientes, SqliteClientes};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn servicio() -> ServicioClientes<SqliteClientes> {
    ServicioClientes::new(SqliteClientes::open_in_memory().expect("sqlite en memoria"))
}

fn nuevo(nombre: &str, saldo: Decimal, compras: Decimal, pago: Decimal) -> NuevoCliente {
    NuevoCliente {
        nombre: Some(nombre.to_string()),
        email: Some(format!("{}@peluche.com", nombre.to_lowercase())),
        telefono: Some("0991234567".to_string()),
        direccion: Some("Quito".to_string()),
        saldo_anterior: Some(saldo),
        monto_compras: Some(compras),
        pago_realizado: Some(pago),
    }
}

#[test]
fn crear_y_obtener_cliente() {
    let s = servicio();
    let creado = s.crear_cliente(&nuevo("Ana", dec!(1000), dec!(500), dec!(100))).unwrap();
    assert!(creado.resultado.is_none());
    assert_eq!(creado.es_moroso, None);

    let leido = s.obtener_cliente(creado.id).unwrap();
    assert_eq!(leido, creado);
    assert_eq!(leido.datos.monto_compras(), dec!(500));
}

#[test]
fn crear_con_datos_invalidos_no_persiste() {
    let s = servicio();
    let mut n = nuevo("Ana", dec!(1000), dec!(500), dec!(100));
    n.telefono = Some("123".to_string());
    let err = s.crear_cliente(&n).unwrap_err();
    assert!(err.es_validacion());
    assert!(s.listar_clientes().unwrap().is_empty());
}

#[test]
fn calcular_guarda_el_resultado() {
    let s = servicio();
    let c = s.crear_cliente(&nuevo("Ana", dec!(1000), dec!(500), dec!(100))).unwrap();

    let calc = s.calcular(c.id).unwrap();
    assert!(calc.resultado.es_moroso);
    assert_eq!(calc.resultado.saldo_actual, dec!(1768));
    assert_eq!(calc.cliente.es_moroso, Some(true));

    let guardado = s.obtener_cliente(c.id).unwrap();
    assert_eq!(guardado.resultado, Some(calc.resultado));
}

#[test]
fn recalcular_sobrescribe_el_resultado_anterior() {
    let s = servicio();
    let c = s.crear_cliente(&nuevo("Ana", dec!(1000), dec!(500), dec!(100))).unwrap();
    s.calcular(c.id).unwrap();

    let cambios = CambiosCliente { pago_realizado: Some(dec!(1500)), ..Default::default() };
    let actualizado = s.actualizar_cliente(c.id, &cambios).unwrap();
    // el resultado viejo sigue ahí hasta que se recalcula
    assert_eq!(actualizado.es_moroso, Some(true));

    let calc = s.calcular(c.id).unwrap();
    assert!(!calc.resultado.es_moroso);
    assert_eq!(calc.resultado.saldo_actual, Decimal::ZERO);
    assert_eq!(s.obtener_cliente(c.id).unwrap().es_moroso, Some(false));
}

#[test]
fn resultado_guardado_conserva_los_montos_del_calculo() {
    let s = servicio();
    let c = s.crear_cliente(&nuevo("Ana", dec!(1000), dec!(500), dec!(100))).unwrap();
    let calc = s.calcular(c.id).unwrap();

    let cambios = CambiosCliente { saldo_anterior: Some(dec!(5000)), ..Default::default() };
    let actualizado = s.actualizar_cliente(c.id, &cambios).unwrap();
    assert_eq!(actualizado.datos.saldo_anterior(), dec!(5000));

    let r = actualizado.resultado.unwrap();
    assert_eq!(r, calc.resultado);
    assert_eq!(r.saldo_anterior, dec!(1000));
    assert_eq!(r.saldo_base, r.saldo_anterior + r.monto_compras - r.pago_realizado);

    let r = s.calcular(c.id).unwrap().resultado;
    assert_eq!(r.saldo_anterior, dec!(5000));
    assert_eq!(r.saldo_base, dec!(5400));
}

#[test]
fn montos_sobre_el_tope_se_rechazan_al_crear() {
    let s = servicio();
    let err = s.crear_cliente(&nuevo("Ana", Decimal::MAX, Decimal::MAX, dec!(0))).unwrap_err();
    assert!(matches!(err, ClienteError::MontoExcedido { .. }));
    assert!(err.es_validacion());
    assert!(s.listar_clientes().unwrap().is_empty());
}

#[test]
fn actualizar_rechaza_campos_vacios_y_negativos() {
    let s = servicio();
    let c = s.crear_cliente(&nuevo("Ana", dec!(1000), dec!(0), dec!(0))).unwrap();
    let cambios = CambiosCliente {
        nombre: Some("   ".to_string()),
        monto_compras: Some(dec!(-1)),
        ..Default::default()
    };
    match s.actualizar_cliente(c.id, &cambios).unwrap_err() {
        ClienteError::Validacion(errores) => assert_eq!(errores.len(), 2),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(s.obtener_cliente(c.id).unwrap().nombre, "Ana");
}

#[test]
fn cliente_inexistente() {
    let s = servicio();
    assert!(matches!(s.obtener_cliente(42), Err(ClienteError::NoEncontrado(42))));
    assert!(matches!(s.calcular(42), Err(ClienteError::NoEncontrado(42))));
    assert!(matches!(s.eliminar_cliente(42), Err(ClienteError::NoEncontrado(42))));
    assert!(matches!(
        s.actualizar_cliente(42, &CambiosCliente::default()),
        Err(ClienteError::NoEncontrado(42))
    ));
}

#[test]
fn estadisticas_y_listas_por_morosidad() {
    let s = servicio();
    let moroso = s.crear_cliente(&nuevo("Ana", dec!(1000), dec!(500), dec!(100))).unwrap();
    let al_dia = s.crear_cliente(&nuevo("Luis", dec!(1000), dec!(0), dec!(1000))).unwrap();
    let sin_calculo = s.crear_cliente(&nuevo("Eva", dec!(10), dec!(0), dec!(0))).unwrap();
    s.calcular(moroso.id).unwrap();
    s.calcular(al_dia.id).unwrap();

    let est = s.estadisticas().unwrap();
    assert_eq!(est.total, 3);
    assert_eq!(est.morosos, 1);
    assert_eq!(est.no_morosos, 2);

    let morosos: Vec<i64> = s.morosos().unwrap().iter().map(|c| c.id).collect();
    assert_eq!(morosos, vec![moroso.id]);

    let mut no_morosos: Vec<i64> = s.no_morosos().unwrap().iter().map(|c| c.id).collect();
    no_morosos.sort();
    assert_eq!(no_morosos, vec![al_dia.id, sin_calculo.id]);
}

#[test]
fn listar_devuelve_los_mas_recientes_primero() {
    let s = servicio();
    let a = s.crear_cliente(&nuevo("Ana", dec!(1), dec!(0), dec!(0))).unwrap();
    let b = s.crear_cliente(&nuevo("Luis", dec!(1), dec!(0), dec!(0))).unwrap();
    let ids: Vec<i64> = s.listar_clientes().unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[test]
fn eliminar_cliente() {
    let s = servicio();
    let c = s.crear_cliente(&nuevo("Ana", dec!(1), dec!(0), dec!(0))).unwrap();
    s.eliminar_cliente(c.id).unwrap();
    assert!(s.listar_clientes().unwrap().is_empty());
    assert_eq!(s.estadisticas().unwrap().total, 0);
}

#[test]
fn base_en_disco_sobrevive_reapertura() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("banco.db");

    let id = {
        let s = ServicioClientes::new(SqliteClientes::open(&path).unwrap());
        let c = s.crear_cliente(&nuevo("Ana", dec!(1000), dec!(500), dec!(100))).unwrap();
        s.calcular(c.id).unwrap();
        c.id
    };

    let s = ServicioClientes::new(SqliteClientes::open(&path).unwrap());
    let c = s.obtener_cliente(id).unwrap();
    assert_eq!(c.resultado.map(|r| r.pago_minimo), Some(dec!(265.2)));
}
