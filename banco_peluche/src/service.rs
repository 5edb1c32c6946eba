use tracing::{debug, info, warn};

use crate::calculo::calcular_cliente;
use crate::error::{ClienteError, Result};
use crate::models::{CambiosCliente, Calculo, Cliente, Estadisticas, NuevoCliente};
use crate::store::RepositorioClientes;
use crate::validacion::{aplicar_cambios, validar_nuevo};

/// Operaciones sobre clientes. No guarda estado propio: todo vive en el
/// repositorio. El ciclo leer-calcular-guardar no se serializa contra otros
/// escritores.
pub struct ServicioClientes<R> {
    repo: R,
}

impl<R: RepositorioClientes> ServicioClientes<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn crear_cliente(&self, nuevo: &NuevoCliente) -> Result<Cliente> {
        let validado = validar_nuevo(nuevo).inspect_err(|e| warn!("alta rechazada: {}", e))?;
        let cliente = self.repo.insertar(&validado)?;
        info!(id = cliente.id, "cliente creado");
        Ok(cliente)
    }

    pub fn obtener_cliente(&self, id: i64) -> Result<Cliente> {
        self.repo.obtener(id)?.ok_or(ClienteError::NoEncontrado(id))
    }

    pub fn listar_clientes(&self) -> Result<Vec<Cliente>> {
        self.repo.listar()
    }

    /// Aplica cambios parciales. Los campos derivados no se tocan: quedan
    /// como estaban hasta el próximo cálculo.
    pub fn actualizar_cliente(&self, id: i64, cambios: &CambiosCliente) -> Result<Cliente> {
        let actual = self.obtener_cliente(id)?;
        let validado = aplicar_cambios(&actual, cambios).inspect_err(|e| warn!(id, "cambios rechazados: {}", e))?;
        let cliente = self.repo.actualizar(id, &validado)?.ok_or(ClienteError::NoEncontrado(id))?;
        info!(id, "cliente actualizado");
        Ok(cliente)
    }

    pub fn eliminar_cliente(&self, id: i64) -> Result<()> {
        if !self.repo.eliminar(id)? {
            return Err(ClienteError::NoEncontrado(id));
        }
        info!(id, "cliente eliminado");
        Ok(())
    }

    /// Lee los montos del cliente, calcula y sobrescribe los campos derivados.
    pub fn calcular(&self, id: i64) -> Result<Calculo> {
        let cliente = self.obtener_cliente(id)?;
        let resultado = calcular_cliente(&cliente.datos);
        debug!(id, es_moroso = resultado.es_moroso, saldo_actual = %resultado.saldo_actual, "cálculo realizado");

        let cliente = self
            .repo
            .guardar_resultado(id, &resultado)?
            .ok_or(ClienteError::NoEncontrado(id))?;
        info!(id, es_moroso = resultado.es_moroso, "resultado guardado");
        Ok(Calculo { resultado, cliente })
    }

    pub fn estadisticas(&self) -> Result<Estadisticas> {
        let total = self.repo.contar()?;
        let morosos = self.repo.contar_morosos()?;
        Ok(Estadisticas { total, morosos, no_morosos: total - morosos })
    }

    pub fn morosos(&self) -> Result<Vec<Cliente>> {
        self.repo.listar_por_morosidad(true)
    }

    /// Incluye a los clientes que todavía no tienen cálculo.
    pub fn no_morosos(&self) -> Result<Vec<Cliente>> {
        self.repo.listar_por_morosidad(false)
    }
}
