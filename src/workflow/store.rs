use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use super::data::StepData;
use super::registry::{StepId, StepRegistry};
use crate::error::WorkflowError;
use crate::etapas::{AtualizacaoEtapa, Etapa, EtapaStore, EtapasError};
use crate::notify::Notifier;

/// Per-step form data and cached etapas of the work order being edited.
pub struct WorkflowStore<S> {
    remote: S,
    registry: StepRegistry,
    notifier: Arc<dyn Notifier>,
    os_id: Option<Uuid>,
    etapas: Vec<Etapa>,
    form_data: BTreeMap<StepId, StepData>,
}

impl<S: EtapaStore> WorkflowStore<S> {
    pub fn new(remote: S, registry: StepRegistry, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            remote,
            registry,
            notifier,
            os_id: None,
            etapas: Vec::new(),
            form_data: BTreeMap::new(),
        }
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn os_id(&self) -> Option<Uuid> {
        self.os_id
    }

    pub fn etapas(&self) -> &[Etapa] {
        &self.etapas
    }

    pub fn form_data(&self) -> &BTreeMap<StepId, StepData> {
        &self.form_data
    }

    /// Binds the store to a work order.
    ///
    /// A different id drops every piece of in-memory data before fetching, so
    /// nothing leaks from one order into another. The same id is a no-op.
    /// A failed fetch leaves the store unbound so the bind can be retried.
    pub async fn bind_order(&mut self, os_id: Option<Uuid>) -> Result<(), EtapasError> {
        if self.os_id == os_id {
            return Ok(());
        }
        self.form_data.clear();
        self.etapas.clear();
        self.os_id = os_id;
        if let Err(e) = self.refresh().await {
            self.os_id = None;
            return Err(e);
        }
        Ok(())
    }

    /// Re-fetches the etapas of the bound order and rebuilds the form data from them.
    pub async fn refresh(&mut self) -> Result<(), EtapasError> {
        let Some(os_id) = self.os_id else {
            return Ok(());
        };
        let etapas = self.remote.list_etapas(os_id).await?;
        tracing::debug!(%os_id, count = etapas.len(), "fetched etapas");
        self.hydrate(etapas);
        Ok(())
    }

    fn hydrate(&mut self, etapas: Vec<Etapa>) {
        let mut form_data = BTreeMap::new();
        for etapa in &etapas {
            let Some(dados) = &etapa.dados_etapa else {
                continue;
            };
            let Some(form) = self.registry.form_of(etapa.ordem) else {
                tracing::warn!(ordem = etapa.ordem, "etapa outside of the step registry, ignoring");
                continue;
            };
            match StepData::decode(form, dados.clone()) {
                Ok(data) => {
                    form_data.insert(etapa.ordem, data);
                }
                Err(e) => {
                    tracing::warn!(ordem = etapa.ordem, error = %e, "could not decode dados_etapa");
                }
            }
        }
        self.form_data = form_data;
        self.etapas = etapas;
    }

    /// Replaces the data of `step` wholesale. No merge with what was there.
    pub fn set_step_data(&mut self, step: StepId, data: StepData) -> Result<(), WorkflowError> {
        let expected = self
            .registry
            .form_of(step)
            .ok_or(WorkflowError::UnknownStep(step))?;
        if data.form() != expected {
            return Err(WorkflowError::FormMismatch {
                step,
                expected,
                found: data.form(),
            });
        }
        self.form_data.insert(step, data);
        Ok(())
    }

    /// Stored data when present and non-empty, the form's default otherwise.
    /// `None` only for steps outside the registry.
    pub fn get_step_data(&self, step: StepId) -> Option<Cow<'_, StepData>> {
        match self.form_data.get(&step) {
            Some(data) if !data.is_empty() => Some(Cow::Borrowed(data)),
            _ => self.registry.default_data(step).map(Cow::Owned),
        }
    }

    /// Persists one step. Returns `false` without touching the remote store when
    /// no order is bound or the order has no etapa for `step`.
    ///
    /// `explicit_data`, when given, is what gets saved (and kept in memory on
    /// success) instead of the stored data.
    pub async fn save_step(
        &mut self,
        step: StepId,
        is_draft: bool,
        explicit_data: Option<StepData>,
    ) -> bool {
        let Some(os_id) = self.os_id else {
            tracing::warn!(step, "no work order bound, cannot save step");
            self.notifier
                .error("Crie a ordem de serviço antes de salvar as etapas");
            return false;
        };

        let Some(etapa_id) = self
            .etapas
            .iter()
            .find(|e| e.ordem == step)
            .map(|e| e.id)
        else {
            tracing::warn!(%os_id, step, "no etapa provisioned for step");
            self.notifier
                .error(format!("Etapa {step} não encontrada para esta ordem de serviço"));
            return false;
        };

        if let Some(data) = &explicit_data {
            if let Some(expected) = self.registry.form_of(step) {
                if data.form() != expected {
                    tracing::error!(step, %expected, found = %data.form(), "form mismatch on save");
                    self.notifier.error(format!("Dados inválidos para a etapa {step}"));
                    return false;
                }
            }
        }

        let payload = match &explicit_data {
            Some(data) => data.to_value(),
            None => match self.get_step_data(step) {
                Some(data) => data.to_value(),
                None => Ok(serde_json::Value::Object(Default::default())),
            },
        };
        let payload = match payload {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(step, error = %e, "could not encode step data");
                self.notifier.error(format!("Erro ao salvar a etapa {step}"));
                return false;
            }
        };

        let update = AtualizacaoEtapa::for_save(payload, is_draft);
        match self.remote.update_etapa(etapa_id, &update).await {
            Ok(updated) => {
                if let Some(cached) = self.etapas.iter_mut().find(|e| e.id == etapa_id) {
                    *cached = updated;
                }
                if let Some(data) = explicit_data {
                    self.form_data.insert(step, data);
                }
                tracing::info!(%os_id, step, is_draft, "step saved");
                if is_draft {
                    self.notifier.success("Rascunho salvo");
                } else {
                    self.notifier.success(format!("Etapa {step} concluída"));
                }
                true
            }
            Err(e) => {
                tracing::error!(%os_id, step, error = %e, "failed to save step");
                self.notifier
                    .error(format!("Erro ao salvar a etapa {step}: {e}"));
                false
            }
        }
    }

    /// Steps the backend already marks as `concluida` or `aprovada`, ascending.
    pub fn completed_steps_from_backend(&self) -> Vec<StepId> {
        let mut steps: Vec<StepId> = self
            .etapas
            .iter()
            .filter(|e| e.status.is_done())
            .map(|e| e.ordem)
            .collect();
        steps.sort_unstable();
        steps.dedup();
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::etapas::{EtapaStatus, MemoryEtapaStore, NovaEtapa};
    use crate::notify::{NotificationLevel, RecordingNotifier};
    use crate::workflow::data::{FollowUpData, LeadData, StepForm};
    use crate::workflow::registry::StepDefinition;
    use serde_json::json;

    fn registry() -> StepRegistry {
        StepRegistry::new(vec![
            StepDefinition::new(1, "Identifique o Lead", "Lead", "Comercial", StepForm::Lead),
            StepDefinition::new(2, "Follow-up 1", "Follow-up", "Comercial", StepForm::FollowUp),
            StepDefinition::new(3, "Follow-up 2", "Follow-up 2", "Comercial", StepForm::FollowUp),
        ])
        .unwrap()
    }

    fn lead(id: &str) -> StepData {
        StepData::Lead(LeadData {
            lead_id: Some(id.into()),
            ..Default::default()
        })
    }

    fn store_with(remote: MemoryEtapaStore) -> (WorkflowStore<MemoryEtapaStore>, Arc<RecordingNotifier>) {
        let recorder = Arc::new(RecordingNotifier::new());
        (WorkflowStore::new(remote, registry(), recorder.clone()), recorder)
    }

    async fn provisioned() -> (MemoryEtapaStore, Uuid) {
        let remote = MemoryEtapaStore::new();
        let os_id = Uuid::new_v4();
        remote.provision(os_id, &registry()).await.unwrap();
        (remote, os_id)
    }

    /// Remote store whose calls always fail.
    struct FailingStore;

    impl EtapaStore for FailingStore {
        async fn list_etapas(&self, _os_id: Uuid) -> Result<Vec<Etapa>, EtapasError> {
            Err(EtapasError::Api {
                status: 500,
                message: "mock error".into(),
            })
        }

        async fn create_etapa(&self, _os_id: Uuid, _nova: &NovaEtapa) -> Result<Etapa, EtapasError> {
            Err(EtapasError::Api {
                status: 500,
                message: "mock error".into(),
            })
        }

        async fn update_etapa(
            &self,
            _etapa_id: Uuid,
            _update: &AtualizacaoEtapa,
        ) -> Result<Etapa, EtapasError> {
            Err(EtapasError::Api {
                status: 500,
                message: "mock error".into(),
            })
        }
    }

    #[test]
    fn get_step_data_defaults_when_absent() {
        let (store, _) = store_with(MemoryEtapaStore::new());
        let data = store.get_step_data(1).unwrap();
        assert!(matches!(data, Cow::Owned(_)));
        assert_eq!(*data, StepData::default_for(StepForm::Lead));
        assert!(store.get_step_data(9).is_none());
    }

    #[test]
    fn get_step_data_defaults_when_empty() {
        let (mut store, _) = store_with(MemoryEtapaStore::new());
        store
            .set_step_data(1, StepData::default_for(StepForm::Lead))
            .unwrap();
        assert!(matches!(store.get_step_data(1).unwrap(), Cow::Owned(_)));
    }

    #[test]
    fn set_then_get_returns_same_value() {
        let (mut store, _) = store_with(MemoryEtapaStore::new());
        store.set_step_data(1, lead("x")).unwrap();

        let data = store.get_step_data(1).unwrap();
        let Cow::Borrowed(stored) = data else {
            panic!("expected borrowed data");
        };
        assert!(std::ptr::eq(stored, &store.form_data()[&1]));
        assert_eq!(*stored, lead("x"));
    }

    #[test]
    fn set_step_data_replaces_without_merge() {
        let (mut store, _) = store_with(MemoryEtapaStore::new());
        store
            .set_step_data(
                1,
                StepData::Lead(LeadData {
                    lead_id: Some("x".into()),
                    nome: "Condomínio Aurora".into(),
                    ..Default::default()
                }),
            )
            .unwrap();
        store.set_step_data(1, lead("y")).unwrap();

        assert_eq!(*store.get_step_data(1).unwrap(), lead("y"));
    }

    #[test]
    fn set_step_data_rejects_wrong_form() {
        let (mut store, _) = store_with(MemoryEtapaStore::new());
        let err = store
            .set_step_data(2, lead("x"))
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::FormMismatch {
                step: 2,
                expected: StepForm::FollowUp,
                found: StepForm::Lead
            }
        ));
        let err = store.set_step_data(7, lead("x")).unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownStep(7)));
    }

    #[tokio::test]
    async fn save_without_order_returns_false_and_skips_remote() {
        let (mut store, recorder) = store_with(MemoryEtapaStore::new());
        store.set_step_data(1, lead("x")).unwrap();

        assert!(!store.save_step(1, false, None).await);
        assert!(!store.save_step(1, true, Some(lead("y"))).await);
        assert_eq!(store.remote().update_calls(), 0);
        assert_eq!(recorder.count(NotificationLevel::Error), 2);
    }

    #[tokio::test]
    async fn save_without_provisioned_etapa_fails() {
        let remote = MemoryEtapaStore::new();
        let os_id = Uuid::new_v4();
        remote
            .create_etapa(
                os_id,
                &NovaEtapa {
                    ordem: 1,
                    nome_etapa: "Identifique o Lead".into(),
                    status: EtapaStatus::Pendente,
                    dados_etapa: None,
                },
            )
            .await
            .unwrap();
        let (mut store, _) = store_with(remote);
        store.bind_order(Some(os_id)).await.unwrap();

        assert!(!store.save_step(2, false, None).await);
        assert_eq!(store.remote().update_calls(), 0);
    }

    #[tokio::test]
    async fn save_pushes_data_and_status() {
        let (remote, os_id) = provisioned().await;
        let (mut store, recorder) = store_with(remote);
        store.bind_order(Some(os_id)).await.unwrap();
        store.set_step_data(1, lead("x")).unwrap();

        assert!(store.save_step(1, false, None).await);

        let persisted = store.remote().list_etapas(os_id).await.unwrap();
        let etapa = persisted.iter().find(|e| e.ordem == 1).unwrap();
        assert_eq!(etapa.status, EtapaStatus::Concluida);
        assert_eq!(etapa.dados_etapa.as_ref().unwrap()["leadId"], json!("x"));
        assert!(etapa.data_conclusao.is_some());
        assert_eq!(store.completed_steps_from_backend(), vec![1]);
        assert_eq!(recorder.count(NotificationLevel::Success), 1);
    }

    #[tokio::test]
    async fn draft_save_uses_rascunho() {
        let (remote, os_id) = provisioned().await;
        let (mut store, _) = store_with(remote);
        store.bind_order(Some(os_id)).await.unwrap();

        assert!(store.save_step(2, true, None).await);

        let etapa = store.etapas().iter().find(|e| e.ordem == 2).unwrap();
        assert_eq!(etapa.status, EtapaStatus::Rascunho);
        assert!(etapa.data_conclusao.is_none());
        assert!(store.completed_steps_from_backend().is_empty());
    }

    #[tokio::test]
    async fn explicit_data_is_saved_and_kept() {
        let (remote, os_id) = provisioned().await;
        let (mut store, _) = store_with(remote);
        store.bind_order(Some(os_id)).await.unwrap();
        store.set_step_data(1, lead("antigo")).unwrap();

        assert!(store.save_step(1, false, Some(lead("novo"))).await);

        assert_eq!(*store.get_step_data(1).unwrap(), lead("novo"));
        let etapa = store.etapas().iter().find(|e| e.ordem == 1).unwrap();
        assert_eq!(etapa.dados_etapa.as_ref().unwrap()["leadId"], json!("novo"));
    }

    #[tokio::test]
    async fn explicit_data_of_wrong_form_is_refused() {
        let (remote, os_id) = provisioned().await;
        let (mut store, _) = store_with(remote);
        store.bind_order(Some(os_id)).await.unwrap();

        assert!(!store.save_step(2, false, Some(lead("x"))).await);
        assert_eq!(store.remote().update_calls(), 0);
    }

    #[tokio::test]
    async fn bind_rebuilds_form_data_from_etapas() {
        let (remote, os_id) = provisioned().await;
        let etapas = remote.list_etapas(os_id).await.unwrap();
        let second = etapas.iter().find(|e| e.ordem == 2).unwrap();
        remote
            .update_etapa(
                second.id,
                &AtualizacaoEtapa::for_save(json!({"anotacoes": "Ligar segunda"}), true),
            )
            .await
            .unwrap();

        let (mut store, _) = store_with(remote);
        store.bind_order(Some(os_id)).await.unwrap();

        assert_eq!(store.form_data().len(), 1);
        assert_eq!(
            *store.get_step_data(2).unwrap(),
            StepData::FollowUp(FollowUpData {
                anotacoes: "Ligar segunda".into(),
                ..Default::default()
            })
        );
    }

    #[tokio::test]
    async fn switching_order_clears_previous_data() {
        let (remote, first) = provisioned().await;
        let second = Uuid::new_v4();
        remote.provision(second, &registry()).await.unwrap();

        let (mut store, _) = store_with(remote);
        store.bind_order(Some(first)).await.unwrap();
        store.set_step_data(1, lead("x")).unwrap();

        store.bind_order(Some(second)).await.unwrap();
        assert!(store.form_data().is_empty());
        assert_eq!(store.os_id(), Some(second));
        assert!(store.etapas().iter().all(|e| e.os_id == Some(second)));

        store.bind_order(None).await.unwrap();
        assert!(store.etapas().is_empty());
    }

    #[tokio::test]
    async fn rebinding_same_order_keeps_edits() {
        let (remote, os_id) = provisioned().await;
        let (mut store, _) = store_with(remote);
        store.bind_order(Some(os_id)).await.unwrap();
        store.set_step_data(1, lead("x")).unwrap();

        store.bind_order(Some(os_id)).await.unwrap();
        assert_eq!(*store.get_step_data(1).unwrap(), lead("x"));
    }

    #[tokio::test]
    async fn undecodable_and_unknown_etapas_are_skipped() {
        let remote = MemoryEtapaStore::new();
        let os_id = Uuid::new_v4();
        for (ordem, dados) in [
            (1, json!({"leadId": 12})),
            (3, json!({"anotacoes": "ok"})),
            (8, json!({"anotacoes": "fora do registro"})),
        ] {
            remote
                .create_etapa(
                    os_id,
                    &NovaEtapa {
                        ordem,
                        nome_etapa: format!("Etapa {ordem}"),
                        status: EtapaStatus::Rascunho,
                        dados_etapa: Some(dados),
                    },
                )
                .await
                .unwrap();
        }

        let (mut store, _) = store_with(remote);
        store.bind_order(Some(os_id)).await.unwrap();

        assert_eq!(store.form_data().keys().copied().collect::<Vec<_>>(), vec![3]);
        assert_eq!(store.etapas().len(), 3);
    }

    #[tokio::test]
    async fn remote_failure_leaves_state_unchanged() {
        let recorder = Arc::new(RecordingNotifier::new());
        let mut store = WorkflowStore::new(FailingStore, registry(), recorder.clone());

        let err = store.bind_order(Some(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, EtapasError::Api { status: 500, .. }));
        assert!(store.etapas().is_empty());
        assert!(store.form_data().is_empty());
        assert!(store.os_id().is_none());
    }

    /// Remote store whose first listing fails and later ones succeed.
    struct FlakyStore {
        inner: MemoryEtapaStore,
        failed: AtomicBool,
    }

    impl EtapaStore for FlakyStore {
        async fn list_etapas(&self, os_id: Uuid) -> Result<Vec<Etapa>, EtapasError> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(EtapasError::Api {
                    status: 503,
                    message: "indisponível".into(),
                });
            }
            self.inner.list_etapas(os_id).await
        }

        async fn create_etapa(&self, os_id: Uuid, nova: &NovaEtapa) -> Result<Etapa, EtapasError> {
            self.inner.create_etapa(os_id, nova).await
        }

        async fn update_etapa(
            &self,
            etapa_id: Uuid,
            update: &AtualizacaoEtapa,
        ) -> Result<Etapa, EtapasError> {
            self.inner.update_etapa(etapa_id, update).await
        }
    }

    #[tokio::test]
    async fn failed_bind_can_be_retried() {
        let (inner, os_id) = provisioned().await;
        let remote = FlakyStore {
            inner,
            failed: AtomicBool::new(false),
        };
        let recorder = Arc::new(RecordingNotifier::new());
        let mut store = WorkflowStore::new(remote, registry(), recorder.clone());

        assert!(store.bind_order(Some(os_id)).await.is_err());
        assert!(store.os_id().is_none());

        store.bind_order(Some(os_id)).await.unwrap();
        assert_eq!(store.os_id(), Some(os_id));
        assert_eq!(store.etapas().len(), 3);

        store.set_step_data(1, lead("x")).unwrap();
        assert!(store.save_step(1, false, None).await);
        assert_eq!(store.completed_steps_from_backend(), vec![1]);
    }

    #[tokio::test]
    async fn update_failure_returns_false_and_keeps_data() {
        let (remote, os_id) = provisioned().await;
        let etapas = remote.list_etapas(os_id).await.unwrap();

        let recorder = Arc::new(RecordingNotifier::new());
        let mut store = WorkflowStore::new(FailingStore, registry(), recorder.clone());
        store.os_id = Some(os_id);
        store.hydrate(etapas);
        store.set_step_data(1, lead("x")).unwrap();

        assert!(!store.save_step(1, false, Some(lead("y"))).await);
        assert_eq!(*store.get_step_data(1).unwrap(), lead("x"));
        assert!(store.completed_steps_from_backend().is_empty());
        assert_eq!(recorder.count(NotificationLevel::Error), 1);
    }
}
