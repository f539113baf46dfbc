//! Armazenamento de etapas em memória.
//!
//! Usado pelo comando `demo` e pelos testes. Também conta as atualizações
//! recebidas, para verificar que nenhuma chamada remota aconteceu.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use uuid::Uuid;

use super::EtapaStore;
use super::error::EtapasError;
use super::types::{AtualizacaoEtapa, Etapa, EtapaStatus, NovaEtapa};
use crate::workflow::StepRegistry;

#[derive(Debug, Default)]
pub struct MemoryEtapaStore {
    etapas: Mutex<HashMap<Uuid, Vec<Etapa>>>,
    update_calls: AtomicUsize,
}

impl MemoryEtapaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria uma etapa pendente para cada passo do registro, como o backend
    /// faz ao abrir uma ordem de serviço.
    pub async fn provision(
        &self,
        os_id: Uuid,
        registry: &StepRegistry,
    ) -> Result<Vec<Etapa>, EtapasError> {
        let mut created = Vec::with_capacity(registry.len());
        for step in registry.steps() {
            let nova = NovaEtapa {
                ordem: step.id,
                nome_etapa: step.title.to_string(),
                status: EtapaStatus::Pendente,
                dados_etapa: None,
            };
            created.push(self.create_etapa(os_id, &nova).await?);
        }
        Ok(created)
    }

    /// Número de chamadas a `update_etapa` recebidas até agora.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

impl EtapaStore for MemoryEtapaStore {
    async fn list_etapas(&self, os_id: Uuid) -> Result<Vec<Etapa>, EtapasError> {
        let etapas = self.etapas.lock().await;
        let mut list = etapas.get(&os_id).cloned().unwrap_or_default();
        list.sort_by_key(|e| e.ordem);
        Ok(list)
    }

    async fn create_etapa(&self, os_id: Uuid, nova: &NovaEtapa) -> Result<Etapa, EtapasError> {
        let etapa = Etapa {
            id: Uuid::new_v4(),
            os_id: Some(os_id),
            ordem: nova.ordem,
            nome_etapa: Some(nova.nome_etapa.clone()),
            status: nova.status,
            dados_etapa: nova.dados_etapa.clone(),
            data_conclusao: None,
        };
        self.etapas
            .lock()
            .await
            .entry(os_id)
            .or_default()
            .push(etapa.clone());
        Ok(etapa)
    }

    async fn update_etapa(
        &self,
        etapa_id: Uuid,
        update: &AtualizacaoEtapa,
    ) -> Result<Etapa, EtapasError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut etapas = self.etapas.lock().await;
        let etapa = etapas
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|e| e.id == etapa_id)
            .ok_or_else(|| EtapasError::NotFound(format!("etapa {etapa_id}")))?;

        etapa.dados_etapa = Some(update.dados_etapa.clone());
        etapa.status = update.status;
        if update.data_conclusao.is_some() {
            etapa.data_conclusao = update.data_conclusao;
        }
        Ok(etapa.clone())
    }
}
