//! Acesso ao serviço remoto de etapas.
//!
//! O motor de fluxo trata o backend como um armazenamento opaco de
//! documentos indexado por `(os_id, ordem)`. O trait [`EtapaStore`] é a
//! costura: [`EtapasClient`] fala HTTP, [`MemoryEtapaStore`] guarda tudo
//! em memória para demonstrações e testes.

pub mod client;
pub mod error;
pub mod memory;
pub mod types;

pub use client::EtapasClient;
pub use error::EtapasError;
pub use memory::MemoryEtapaStore;
pub use types::{AtualizacaoEtapa, Etapa, EtapaStatus, NovaEtapa};

use uuid::Uuid;

/// Operações consumidas do serviço de etapas.
#[allow(async_fn_in_trait)]
pub trait EtapaStore {
    /// Lista todas as etapas persistidas de uma ordem de serviço.
    async fn list_etapas(&self, os_id: Uuid) -> Result<Vec<Etapa>, EtapasError>;

    /// Cria uma etapa para a ordem de serviço.
    async fn create_etapa(&self, os_id: Uuid, nova: &NovaEtapa) -> Result<Etapa, EtapasError>;

    /// Atualiza dados, status e data de conclusão de uma etapa existente.
    async fn update_etapa(
        &self,
        etapa_id: Uuid,
        update: &AtualizacaoEtapa,
    ) -> Result<Etapa, EtapasError>;
}
