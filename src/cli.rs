//! Interface de linha de comando do os-workflow baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (steps, status, save,
//! demo) e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::workflow::{OsType, StepId};

/// os-workflow: fluxo de etapas das ordens de serviço.
#[derive(Debug, Parser)]
#[command(name = "os-workflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./os-workflow.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Tipo de OS aceito pela CLI, mapeado para [`OsType`] internamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TipoArg {
    /// Obras e manutenção.
    Obras,
    /// Laudo técnico.
    Laudo,
    /// Assessoria técnica.
    Assessoria,
}

impl From<TipoArg> for OsType {
    fn from(arg: TipoArg) -> Self {
        match arg {
            TipoArg::Obras => OsType::Obras,
            TipoArg::Laudo => OsType::Laudo,
            TipoArg::Assessoria => OsType::Assessoria,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista as etapas de um tipo de OS.
    Steps {
        #[arg(long, value_enum)]
        tipo: TipoArg,
    },

    /// Mostra o andamento das etapas de uma ordem de serviço.
    Status {
        /// Identificador da ordem de serviço.
        os_id: Uuid,

        #[arg(long, value_enum)]
        tipo: TipoArg,
    },

    /// Salva os dados de uma etapa a partir de um arquivo JSON.
    Save {
        /// Identificador da ordem de serviço.
        os_id: Uuid,

        #[arg(long, value_enum)]
        tipo: TipoArg,

        /// Etapa (1-based) a salvar.
        #[arg(long)]
        step: StepId,

        /// Arquivo JSON com os dados da etapa.
        #[arg(long)]
        data: PathBuf,

        /// Salva como rascunho em vez de concluir a etapa.
        #[arg(long, default_value_t = false)]
        draft: bool,
    },

    /// Executa a demonstração embutida do fluxo, em memória.
    Demo {
        #[arg(long, value_enum, default_value = "obras")]
        tipo: TipoArg,
    },
}
