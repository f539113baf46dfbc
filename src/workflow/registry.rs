use serde::{Deserialize, Serialize};

use super::data::{StepData, StepForm};
use crate::error::WorkflowError;

/// 1-based position of a step inside its OS type.
pub type StepId = u32;

/// How a step is drawn in the stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Active => write!(f, "active"),
            StepStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Copy strings for the shared single-file attachment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnexoTemplate {
    pub label: &'static str,
    /// Accepted file extensions, lowercase, without the dot.
    pub extensions: &'static [&'static str],
}

impl AnexoTemplate {
    pub fn accepts(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .map(|(_, ext)| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

/// Static metadata of one wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub id: StepId,
    pub title: &'static str,
    pub short: &'static str,
    pub responsible: &'static str,
    /// Fixed status, overriding the derived one in the stepper.
    pub status: Option<StepStatus>,
    pub form: StepForm,
    pub anexo: Option<AnexoTemplate>,
}

impl StepDefinition {
    pub const fn new(
        id: StepId,
        title: &'static str,
        short: &'static str,
        responsible: &'static str,
        form: StepForm,
    ) -> Self {
        Self {
            id,
            title,
            short,
            responsible,
            status: None,
            form,
            anexo: None,
        }
    }

    /// A step rendered by the attachment form with the given copy.
    pub const fn attachment(
        id: StepId,
        title: &'static str,
        short: &'static str,
        responsible: &'static str,
        template: AnexoTemplate,
    ) -> Self {
        Self {
            id,
            title,
            short,
            responsible,
            status: None,
            form: StepForm::Anexo,
            anexo: Some(template),
        }
    }
}

/// Ordered step definitions of one OS type. Ids are always `1..=len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    steps: Vec<StepDefinition>,
}

impl StepRegistry {
    /// Builds a registry, rejecting empty lists and ids that are not `1, 2, ..., N` in order.
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self, WorkflowError> {
        if steps.is_empty() {
            return Err(WorkflowError::EmptyRegistry);
        }
        for (index, step) in steps.iter().enumerate() {
            let expected = index as StepId + 1;
            if step.id != expected {
                return Err(WorkflowError::NonContiguousStep {
                    expected,
                    found: step.id,
                });
            }
        }
        Ok(Self { steps })
    }

    /// Built-in definitions, whose ids are covered by tests instead of checked here.
    pub(crate) fn from_static(steps: &'static [StepDefinition]) -> Self {
        Self {
            steps: steps.to_vec(),
        }
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn total_steps(&self) -> StepId {
        self.steps.len() as StepId
    }

    pub fn get(&self, id: StepId) -> Option<&StepDefinition> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.steps.get(index)
    }

    pub fn contains(&self, id: StepId) -> bool {
        self.get(id).is_some()
    }

    pub fn form_of(&self, id: StepId) -> Option<StepForm> {
        self.get(id).map(|s| s.form)
    }

    pub fn default_data(&self, id: StepId) -> Option<StepData> {
        self.form_of(id).map(StepData::default_for)
    }
}
