//! Motor do assistente de etapas das ordens de serviço (OS).
//!
//! Cada tipo de OS define um registro estático de etapas; o [`workflow`]
//! controla a etapa atual, os dados de cada formulário, a navegação
//! histórica e quais etapas contam como concluídas. A persistência fica no
//! serviço remoto de [`etapas`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod etapas;
pub mod logging;
pub mod notify;
pub mod session;
pub mod ui;
pub mod workflow;

pub use error::WorkflowError;
