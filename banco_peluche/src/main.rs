// --- Banco Peluche - CLI de clientes y cálculo de saldos ---

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::error;

use banco_peluche::config::Config;
use banco_peluche::models::{CambiosCliente, NuevoCliente};
use banco_peluche::{calcular_cliente, logging, DatosFinancieros, ServicioClientes, SqliteClientes};

#[derive(Parser)]
#[command(name = "banco-peluche", version, about = "Clientes y cálculo de saldos de Banco Peluche")]
struct Cli {
    /// Ruta de la base SQLite (si falta, BANCO_PELUCHE_DB_URL o data/banco_peluche.db)
    #[arg(long, global = true, env = "BANCO_PELUCHE_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calcula sin tocar la base de datos
    Simular {
        #[arg(long)]
        saldo_anterior: Decimal,
        #[arg(long)]
        monto_compras: Decimal,
        #[arg(long)]
        pago_realizado: Decimal,
    },
    Crear(CamposCliente),
    Listar,
    Obtener { id: i64 },
    Actualizar {
        id: i64,
        #[command(flatten)]
        campos: CamposCliente,
    },
    Eliminar { id: i64 },
    /// Calcula y guarda el resultado del cliente
    Calcular { id: i64 },
    Estadisticas,
    Morosos,
    NoMorosos,
}

#[derive(Args)]
struct CamposCliente {
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    telefono: Option<String>,
    #[arg(long)]
    direccion: Option<String>,
    #[arg(long)]
    saldo_anterior: Option<Decimal>,
    #[arg(long)]
    monto_compras: Option<Decimal>,
    #[arg(long)]
    pago_realizado: Option<Decimal>,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Simular { saldo_anterior, monto_compras, pago_realizado } = cli.command {
        let datos = DatosFinancieros::new(saldo_anterior, monto_compras, pago_realizado)?;
        return print_json(&calcular_cliente(&datos));
    }

    let db_path = cli.db.unwrap_or(config.db_path);
    let servicio = ServicioClientes::new(SqliteClientes::open(&db_path)?);

    match cli.command {
        Command::Simular { .. } => Ok(()),
        Command::Crear(c) => {
            let nuevo = NuevoCliente {
                nombre: c.nombre,
                email: c.email,
                telefono: c.telefono,
                direccion: c.direccion,
                saldo_anterior: c.saldo_anterior,
                monto_compras: c.monto_compras,
                pago_realizado: c.pago_realizado,
            };
            print_json(&servicio.crear_cliente(&nuevo)?)
        }
        Command::Listar => print_json(&servicio.listar_clientes()?),
        Command::Obtener { id } => print_json(&servicio.obtener_cliente(id)?),
        Command::Actualizar { id, campos: c } => {
            let cambios = CambiosCliente {
                nombre: c.nombre,
                email: c.email,
                telefono: c.telefono,
                direccion: c.direccion,
                saldo_anterior: c.saldo_anterior,
                monto_compras: c.monto_compras,
                pago_realizado: c.pago_realizado,
            };
            print_json(&servicio.actualizar_cliente(id, &cambios)?)
        }
        Command::Eliminar { id } => {
            servicio.eliminar_cliente(id)?;
            print_json(&serde_json::json!({"message": "Cliente eliminado correctamente"}))
        }
        Command::Calcular { id } => print_json(&servicio.calcular(id)?),
        Command::Estadisticas => print_json(&servicio.estadisticas()?),
        Command::Morosos => print_json(&servicio.morosos()?),
        Command::NoMorosos => print_json(&servicio.no_morosos()?),
    }
}

fn main() -> ExitCode {
    // carga `.env` antes de que clap lea las variables de entorno
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let cli = Cli::parse();
    logging::init(&config.log_level);

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn db_se_lee_de_la_variable_de_entorno() {
        let cmd = Cli::command();
        let db = cmd.get_arguments().find(|a| a.get_id() == "db").unwrap();
        assert_eq!(db.get_env().and_then(|v| v.to_str()), Some("BANCO_PELUCHE_DB_PATH"));
    }

    #[test]
    fn db_explicito_en_cualquier_subcomando() {
        let cli = Cli::try_parse_from(["banco-peluche", "calcular", "3", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Command::Calcular { id: 3 }));
    }
}
