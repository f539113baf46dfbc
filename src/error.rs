use thiserror::Error;

use crate::workflow::{StepForm, StepId};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Step registry is empty")]
    EmptyRegistry,

    #[error("Step ids must be contiguous from 1: expected {expected}, found {found}")]
    NonContiguousStep { expected: StepId, found: StepId },

    #[error("Unknown step: {0}")]
    UnknownStep(StepId),

    #[error("Duplicate completion rule for step {0}")]
    DuplicateRule(StepId),

    #[error("Step {step} expects {expected} data, got {found}")]
    FormMismatch {
        step: StepId,
        expected: StepForm,
        found: StepForm,
    },

    #[error("Unknown OS type: {0}")]
    UnknownOsType(String),
}
