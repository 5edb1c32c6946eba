// --- Sistema Educativo - CLI de notas y matrículas ---

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::error;

use sistema_educativo::config::Config;
use sistema_educativo::models::{
    CambiosMatricula, CambiosNota, EstadoEstudiante, FiltroNotas, NuevaNota, NuevoCurso, NuevoEstudiante, Parcial,
};
use sistema_educativo::calculo::validar_notas_parciales;
use sistema_educativo::{logging, promedio_semestre, ServicioAcademico, SqliteRegistro};

#[derive(Parser)]
#[command(name = "sistema-educativo", version, about = "Notas, promedios y matrículas")]
struct Cli {
    /// Ruta de la base SQLite (si falta, SISTEMA_EDUCATIVO_DB_URL o data/sistema_educativo.db)
    #[arg(long, global = true, env = "SISTEMA_EDUCATIVO_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Promedio del semestre a partir de tres notas de parcial, sin base de datos
    Simular { parcial1: Decimal, parcial2: Decimal, parcial3: Decimal },
    RegistrarEstudiante {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        cedula: String,
    },
    RegistrarCurso {
        #[arg(long)]
        asignatura: String,
        #[arg(long)]
        nrc: String,
        #[arg(long)]
        periodo: String,
        #[arg(long)]
        cupo: i64,
    },
    Matricular {
        #[arg(long)]
        estudiante: i64,
        #[arg(long)]
        curso: i64,
    },
    ObtenerMatricula { id: i64 },
    /// Cambia curso, fecha o estado de una matrícula
    ActualizarMatricula {
        id: i64,
        #[arg(long)]
        curso: Option<i64>,
        #[arg(long)]
        fecha: Option<NaiveDate>,
        /// activa | inactiva
        #[arg(long)]
        estado: Option<String>,
    },
    /// Falla si la matrícula tiene notas
    EliminarMatricula { id: i64 },
    Cupo {
        curso: i64,
        /// Matrícula que no cuenta contra el cupo
        #[arg(long)]
        excluir: Option<i64>,
    },
    ResumenMatriculas { curso: i64 },
    RegistrarNota {
        #[arg(long)]
        matricula: i64,
        #[arg(long)]
        docente: i64,
        #[arg(long)]
        parcial: i64,
        #[arg(long)]
        tipo: String,
        #[arg(long)]
        calificacion: Decimal,
        #[arg(long)]
        porcentaje: Decimal,
        /// Por defecto, la fecha de hoy
        #[arg(long)]
        fecha: Option<NaiveDate>,
        #[arg(long)]
        observaciones: Option<String>,
    },
    ActualizarNota {
        id: i64,
        #[arg(long)]
        calificacion: Option<Decimal>,
        #[arg(long)]
        tipo: Option<String>,
        #[arg(long)]
        porcentaje: Option<Decimal>,
        #[arg(long)]
        fecha: Option<NaiveDate>,
        #[arg(long)]
        observaciones: Option<String>,
    },
    ObtenerNota { id: i64 },
    EliminarNota { id: i64 },
    ListarNotas {
        #[arg(long)]
        matricula: Option<i64>,
        #[arg(long)]
        parcial: Option<i64>,
        #[arg(long)]
        tipo: Option<String>,
        #[arg(long)]
        docente: Option<i64>,
    },
    NotaParcial { matricula: i64, parcial: i64 },
    Promedio { matricula: i64 },
    Estado {
        estudiante: i64,
        #[arg(long)]
        curso: Option<i64>,
    },
    Reporte { estudiante: i64 },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Simular { parcial1, parcial2, parcial3 } = cli.command {
        let notas = validar_notas_parciales([parcial1, parcial2, parcial3])?;
        return print_json(&promedio_semestre(notas));
    }

    let db_path = cli.db.unwrap_or(config.db_path);
    let servicio = ServicioAcademico::new(SqliteRegistro::open(&db_path)?);

    match cli.command {
        Command::Simular { .. } => Ok(()),
        Command::RegistrarEstudiante { nombre, cedula } => print_json(&servicio.registrar_estudiante(
            &NuevoEstudiante { nombre, cedula, estado: EstadoEstudiante::Activo },
        )?),
        Command::RegistrarCurso { asignatura, nrc, periodo, cupo } => print_json(&servicio.registrar_curso(
            &NuevoCurso { nombre_asignatura: asignatura, nrc, periodo_academico: periodo, cupo_maximo: cupo },
        )?),
        Command::Matricular { estudiante, curso } => print_json(&servicio.matricular(estudiante, curso)?),
        Command::ObtenerMatricula { id } => print_json(&servicio.obtener_matricula(id)?),
        Command::ActualizarMatricula { id, curso, fecha, estado } => {
            let cambios = CambiosMatricula {
                curso_id: curso,
                fecha_matricula: fecha,
                estado: estado.map(|e| e.parse()).transpose()?,
            };
            print_json(&servicio.actualizar_matricula(id, &cambios)?)
        }
        Command::EliminarMatricula { id } => {
            servicio.eliminar_matricula(id)?;
            print_json(&serde_json::json!({"message": "Matrícula eliminada correctamente"}))
        }
        Command::Cupo { curso, excluir } => print_json(&servicio.validar_cupo_disponible(curso, excluir)?),
        Command::ResumenMatriculas { curso } => print_json(&servicio.resumen_matriculas(curso)?),
        Command::RegistrarNota { matricula, docente, parcial, tipo, calificacion, porcentaje, fecha, observaciones } => {
            let nueva = NuevaNota {
                matricula_id: matricula,
                docente_id: docente,
                parcial,
                tipo_evaluacion: tipo,
                calificacion,
                porcentaje,
                fecha_evaluacion: fecha.unwrap_or_else(|| Utc::now().date_naive()),
                observaciones,
            };
            print_json(&servicio.registrar_nota(&nueva)?)
        }
        Command::ActualizarNota { id, calificacion, tipo, porcentaje, fecha, observaciones } => {
            let cambios = CambiosNota {
                calificacion,
                tipo_evaluacion: tipo,
                porcentaje,
                fecha_evaluacion: fecha,
                observaciones,
            };
            print_json(&servicio.actualizar_nota(id, &cambios)?)
        }
        Command::ObtenerNota { id } => print_json(&servicio.obtener_nota(id)?),
        Command::EliminarNota { id } => {
            servicio.eliminar_nota(id)?;
            print_json(&serde_json::json!({"message": "Nota eliminada correctamente"}))
        }
        Command::ListarNotas { matricula, parcial, tipo, docente } => {
            let filtro = FiltroNotas {
                matricula_id: matricula,
                parcial: parcial.map(Parcial::from_numero).transpose()?,
                tipo_evaluacion: tipo.map(|t| t.parse()).transpose()?,
                docente_id: docente,
            };
            print_json(&servicio.listar_notas(&filtro)?)
        }
        Command::NotaParcial { matricula, parcial } => print_json(&servicio.calcular_nota_parcial(matricula, parcial)?),
        Command::Promedio { matricula } => print_json(&servicio.calcular_promedio_semestre(matricula)?),
        Command::Estado { estudiante, curso } => print_json(&servicio.estado_academico(estudiante, curso)?),
        Command::Reporte { estudiante } => print_json(&servicio.reporte_academico(estudiante)?),
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

    if let Err(e) = run(cli, config) {
        error!("{}", e);
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn db_se_lee_de_la_variable_de_entorno() {
        let cmd = Cli::command();
        let db = cmd.get_arguments().find(|a| a.get_id() == "db").unwrap();
        assert_eq!(db.get_env().and_then(|v| v.to_str()), Some("SISTEMA_EDUCATIVO_DB_PATH"));
    }

    #[test]
    fn actualizar_matricula_acepta_curso_y_estado() {
        let cli = Cli::try_parse_from([
            "sistema-educativo",
            "actualizar-matricula",
            "4",
            "--curso",
            "2",
            "--estado",
            "inactiva",
        ])
        .unwrap();
        match cli.command {
            Command::ActualizarMatricula { id, curso, estado, fecha } => {
                assert_eq!((id, curso, fecha), (4, Some(2), None));
                assert_eq!(estado.as_deref(), Some("inactiva"));
            }
            _ => panic!("subcomando inesperado"),
        }
    }
}
