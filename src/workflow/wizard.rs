use std::borrow::Cow;
use std::sync::Arc;

use uuid::Uuid;

use super::completion::CompletionRules;
use super::data::StepData;
use super::flows::OsType;
use super::navigation::{NavigationOutcome, Navigator};
use super::registry::{StepDefinition, StepId, StepRegistry, StepStatus};
use super::store::WorkflowStore;
use crate::error::WorkflowError;
use crate::etapas::EtapaStore;
use crate::notify::Notifier;

/// One entry of the stepper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub definition: StepDefinition,
    pub status: StepStatus,
}

/// The wizard of one work order: store, navigation and completion rules wired together.
pub struct Workflow<S> {
    store: WorkflowStore<S>,
    navigator: Navigator,
    rules: CompletionRules,
    notifier: Arc<dyn Notifier>,
}

impl<S: EtapaStore> Workflow<S> {
    /// Wizard of a built-in OS type, starting at step 1.
    pub fn new(os_type: OsType, remote: S, notifier: Arc<dyn Notifier>) -> Result<Self, WorkflowError> {
        let registry = os_type.registry();
        let rules = os_type.completion_rules(&registry)?;
        Ok(Self::with_parts(registry, rules, remote, notifier, 1))
    }

    pub fn with_parts(
        registry: StepRegistry,
        rules: CompletionRules,
        remote: S,
        notifier: Arc<dyn Notifier>,
        initial_step: StepId,
    ) -> Self {
        let navigator = Navigator::new(registry.total_steps(), initial_step, notifier.clone());
        Self {
            store: WorkflowStore::new(remote, registry, notifier.clone()),
            navigator,
            rules,
            notifier,
        }
    }

    pub fn store(&self) -> &WorkflowStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WorkflowStore<S> {
        &mut self.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn rules(&self) -> &CompletionRules {
        &self.rules
    }

    pub fn registry(&self) -> &StepRegistry {
        self.store.registry()
    }

    pub fn current_step(&self) -> StepId {
        self.navigator.current_step()
    }

    /// Steps viewed through historical navigation cannot be edited.
    pub fn is_read_only(&self) -> bool {
        self.navigator.is_historical()
    }

    /// Binds the wizard to a work order. Fetch failures are reported to the
    /// user and leave the wizard unbound from remote data.
    pub async fn bind_order(&mut self, os_id: Option<Uuid>) -> bool {
        match self.store.bind_order(os_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to load etapas");
                self.notifier
                    .error(format!("Erro ao carregar as etapas da ordem de serviço: {e}"));
                false
            }
        }
    }

    /// Moves to the first step that is not complete (the last step when all
    /// are) and returns it.
    pub fn resume(&mut self) -> StepId {
        let completed = self.completed_steps();
        let total = self.registry().total_steps();
        let step = (1..=total)
            .find(|step| !completed.contains(step))
            .unwrap_or(total);
        self.navigator.reset(step);
        step
    }

    pub fn current_data(&self) -> Cow<'_, StepData> {
        let step = self.current_step();
        self.store
            .get_step_data(step)
            .unwrap_or_else(|| Cow::Owned(StepData::default_for(self.current_definition().form)))
    }

    fn current_definition(&self) -> &StepDefinition {
        // The navigator keeps the current step inside 1..=total.
        &self.registry().steps()[(self.current_step() - 1) as usize]
    }

    /// Replaces the data of the current step. Returns `Ok(false)` when the edit
    /// was refused (read-only view, rejected attachment).
    pub fn update_current_data(&mut self, data: StepData) -> Result<bool, WorkflowError> {
        if self.is_read_only() {
            self.warn_read_only();
            return Ok(false);
        }

        if let (Some(template), StepData::Anexo(anexo)) = (self.current_definition().anexo, &data) {
            if let Some(arquivo) = &anexo.arquivo {
                if !template.accepts(&arquivo.nome) {
                    self.notifier.warning(format!(
                        "{}: formato não aceito (use {})",
                        template.label,
                        template.extensions.join(", ")
                    ));
                    return Ok(false);
                }
            }
        }

        let step = self.current_step();
        self.store.set_step_data(step, data)?;
        Ok(true)
    }

    /// Validates and saves the current step, then advances. While viewing
    /// history nothing is saved.
    pub async fn next_step(&mut self) -> NavigationOutcome {
        let read_only = self.navigator.is_historical();
        let store = &mut self.store;
        let rules = &self.rules;
        let notifier = &self.notifier;

        self.navigator
            .handle_next_step(|step| async move {
                if read_only {
                    return true;
                }
                let valid = store
                    .get_step_data(step)
                    .and_then(|data| rules.is_satisfied(step, &data))
                    .unwrap_or(true);
                if !valid {
                    notifier.warning("Preencha os campos obrigatórios antes de avançar");
                    return false;
                }
                store.save_step(step, false, None).await
            })
            .await
    }

    /// Saves the current step as a draft without moving.
    pub async fn save_draft(&mut self) -> bool {
        if self.is_read_only() {
            self.warn_read_only();
            return false;
        }
        let step = self.current_step();
        self.store.save_step(step, true, None).await
    }

    fn warn_read_only(&self) {
        self.notifier
            .warning("Etapa em modo de visualização. Volte para a etapa atual para editar.");
    }

    pub fn prev_step(&mut self) -> NavigationOutcome {
        self.navigator.handle_prev_step()
    }

    pub fn click_step(&mut self, step: StepId) -> NavigationOutcome {
        self.navigator.handle_step_click(step)
    }

    pub fn return_to_active(&mut self) -> NavigationOutcome {
        self.navigator.handle_return_to_active()
    }

    pub fn completed_steps(&self) -> Vec<StepId> {
        let backend = self.store.completed_steps_from_backend();
        self.rules
            .evaluate(&backend, |step| self.store.get_step_data(step))
    }

    pub fn stepper(&self) -> Vec<StepView> {
        let completed = self.completed_steps();
        let current = self.current_step();
        self.registry()
            .steps()
            .iter()
            .map(|definition| {
                let derived = if completed.contains(&definition.id) {
                    StepStatus::Completed
                } else if definition.id == current {
                    StepStatus::Active
                } else {
                    StepStatus::Pending
                };
                StepView {
                    definition: definition.clone(),
                    status: definition.status.unwrap_or(derived),
                }
            })
            .collect()
    }
}
