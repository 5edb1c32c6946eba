use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::calculo::DatosFinancieros;
use crate::error::{ClienteError, Result};
use crate::models::{CambiosCliente, Cliente, ClienteValidado, NuevoCliente};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^[^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*@([^<>()\[\]\\.,;:\s@"]+\.)+[^<>()\[\]\\.,;:\s@"]{2,}$"#)
        .expect("email regex is valid")
});

pub fn es_email_valido(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// El teléfono puede traer separadores; lo que cuenta son los dígitos.
pub fn es_telefono_valido(telefono: &str) -> bool {
    telefono.chars().filter(|c| c.is_ascii_digit()).count() == 10
}

fn no_vacio(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Valida un alta completa. Acumula todos los errores en vez de cortar en el
/// primero.
pub fn validar_nuevo(nuevo: &NuevoCliente) -> Result<ClienteValidado> {
    let mut errores = Vec::new();

    let nombre = no_vacio(&nuevo.nombre);
    if nombre.is_none() {
        errores.push("El campo \"nombre\" es obligatorio".to_string());
    }

    let email = no_vacio(&nuevo.email);
    match email {
        None => errores.push("El campo \"email\" es obligatorio".to_string()),
        Some(e) if !es_email_valido(e) => errores.push("Formato de email inválido".to_string()),
        _ => {}
    }

    let telefono = no_vacio(&nuevo.telefono);
    match telefono {
        None => errores.push("El campo \"telefono\" es obligatorio".to_string()),
        Some(t) if !es_telefono_valido(t) => {
            errores.push("El campo \"telefono\" debe contener exactamente 10 dígitos".to_string())
        }
        _ => {}
    }

    let direccion = no_vacio(&nuevo.direccion);
    if direccion.is_none() {
        errores.push("El campo \"direccion\" es obligatorio".to_string());
    }

    let montos = [
        ("saldoAnterior", nuevo.saldo_anterior),
        ("montoCompras", nuevo.monto_compras),
        ("pagoRealizado", nuevo.pago_realizado),
    ];
    for (campo, valor) in montos {
        if valor.is_none() {
            errores.push(format!("El campo \"{}\" es obligatorio", campo));
        }
    }
    if montos.iter().any(|(_, v)| v.is_some_and(|v| v < Decimal::ZERO)) {
        errores.push("No se permiten valores negativos en los campos financieros".to_string());
    }

    if !errores.is_empty() {
        return Err(ClienteError::Validacion(errores));
    }

    // sin errores todos los campos están presentes
    let (Some(nombre), Some(email), Some(telefono), Some(direccion)) = (nombre, email, telefono, direccion) else {
        return Err(ClienteError::Validacion(vec!["Datos incompletos".to_string()]));
    };
    let datos = DatosFinancieros::new(
        nuevo.saldo_anterior.unwrap_or_default(),
        nuevo.monto_compras.unwrap_or_default(),
        nuevo.pago_realizado.unwrap_or_default(),
    )?;

    Ok(ClienteValidado {
        nombre: nombre.to_string(),
        email: email.to_string(),
        telefono: telefono.to_string(),
        direccion: direccion.to_string(),
        datos,
    })
}

/// Valida los campos presentes en `cambios` y los aplica sobre `actual`.
pub fn aplicar_cambios(actual: &Cliente, cambios: &CambiosCliente) -> Result<ClienteValidado> {
    let mut errores = Vec::new();
    let mut out = ClienteValidado::from(actual);

    if let Some(nombre) = &cambios.nombre {
        if nombre.trim().is_empty() {
            errores.push("El campo \"nombre\" no puede quedar vacío".to_string());
        } else {
            out.nombre = nombre.trim().to_string();
        }
    }

    if let Some(email) = &cambios.email {
        if email.trim().is_empty() {
            errores.push("El campo \"email\" no puede quedar vacío".to_string());
        } else if !es_email_valido(email) {
            errores.push("Formato de email inválido".to_string());
        } else {
            out.email = email.trim().to_string();
        }
    }

    if let Some(telefono) = &cambios.telefono {
        if telefono.trim().is_empty() {
            errores.push("El campo \"telefono\" no puede quedar vacío".to_string());
        } else if !es_telefono_valido(telefono) {
            errores.push("El campo \"telefono\" debe contener exactamente 10 dígitos".to_string());
        } else {
            out.telefono = telefono.trim().to_string();
        }
    }

    if let Some(direccion) = &cambios.direccion {
        if direccion.trim().is_empty() {
            errores.push("El campo \"direccion\" no puede quedar vacío".to_string());
        } else {
            out.direccion = direccion.trim().to_string();
        }
    }

    for (campo, valor) in [
        ("saldoAnterior", cambios.saldo_anterior),
        ("montoCompras", cambios.monto_compras),
        ("pagoRealizado", cambios.pago_realizado),
    ] {
        if valor.is_some_and(|v| v < Decimal::ZERO) {
            errores.push(format!("{} no puede ser negativo", campo));
        }
    }

    if !errores.is_empty() {
        return Err(ClienteError::Validacion(errores));
    }

    out.datos = DatosFinancieros::new(
        cambios.saldo_anterior.unwrap_or(actual.datos.saldo_anterior()),
        cambios.monto_compras.unwrap_or(actual.datos.monto_compras()),
        cambios.pago_realizado.unwrap_or(actual.datos.pago_realizado()),
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn completo() -> NuevoCliente {
        NuevoCliente {
            nombre: Some("Ana Torres".into()),
            email: Some("ana@peluche.com".into()),
            telefono: Some("099-123-4567".into()),
            direccion: Some("Av. Amazonas 123".into()),
            saldo_anterior: Some(dec!(1000)),
            monto_compras: Some(dec!(500)),
            pago_realizado: Some(dec!(100)),
        }
    }

    #[test]
    fn emails() {
        assert!(es_email_valido("ana@peluche.com"));
        assert!(es_email_valido("ana.torres@mail.peluche.ec"));
        assert!(!es_email_valido("ana@peluche"));
        assert!(!es_email_valido("ana peluche@x.com"));
        assert!(!es_email_valido("@peluche.com"));
    }

    #[test]
    fn telefonos() {
        assert!(es_telefono_valido("0991234567"));
        assert!(es_telefono_valido("(099) 123-4567"));
        assert!(!es_telefono_valido("099123456"));
        assert!(!es_telefono_valido("09912345678"));
    }

    #[test]
    fn alta_valida_recorta_espacios() {
        let mut n = completo();
        n.nombre = Some("  Ana Torres ".into());
        let v = validar_nuevo(&n).unwrap();
        assert_eq!(v.nombre, "Ana Torres");
        assert_eq!(v.datos.pago_realizado(), dec!(100));
    }

    #[test]
    fn alta_vacia_reporta_todos_los_campos() {
        let err = validar_nuevo(&NuevoCliente::default()).unwrap_err();
        match err {
            ClienteError::Validacion(errores) => {
                assert_eq!(errores.len(), 7);
                assert!(errores.iter().any(|e| e.contains("saldoAnterior")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn alta_con_monto_negativo() {
        let mut n = completo();
        n.monto_compras = Some(dec!(-5));
        let err = validar_nuevo(&n).unwrap_err();
        assert!(err.es_validacion());
        assert!(err.to_string().contains("negativos"));
    }
}
