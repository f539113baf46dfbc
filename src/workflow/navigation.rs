use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::registry::StepId;
use crate::notify::Notifier;

/// Whether the user is on their real position or looking back at an earlier step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationMode {
    Linear,
    /// `last_active` is the real position; always different from the viewed step.
    Historical { last_active: StepId },
}

/// What a navigation intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Moved { from: StepId, to: StepId },
    EnteredHistorical { last_active: StepId, to: StepId },
    ReturnedToActive(StepId),
    /// The target is not reachable yet.
    Blocked(StepId),
    Unchanged,
}

/// Turns click / next / previous intents into position changes.
pub struct Navigator {
    current: StepId,
    mode: NavigationMode,
    total: StepId,
    notifier: Arc<dyn Notifier>,
}

impl Navigator {
    /// `initial_step` is clamped into `1..=total_steps`.
    pub fn new(total_steps: StepId, initial_step: StepId, notifier: Arc<dyn Notifier>) -> Self {
        let total = total_steps.max(1);
        Self {
            current: initial_step.clamp(1, total),
            mode: NavigationMode::Linear,
            total,
            notifier,
        }
    }

    pub fn current_step(&self) -> StepId {
        self.current
    }

    pub fn total_steps(&self) -> StepId {
        self.total
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn is_historical(&self) -> bool {
        matches!(self.mode, NavigationMode::Historical { .. })
    }

    pub fn last_active_step(&self) -> Option<StepId> {
        match self.mode {
            NavigationMode::Historical { last_active } => Some(last_active),
            NavigationMode::Linear => None,
        }
    }

    /// Reachable steps: anything up to the current step, or up to the real
    /// position while looking back.
    pub fn is_accessible(&self, step: StepId) -> bool {
        if step < 1 || step > self.total {
            return false;
        }
        step <= self.current || self.last_active_step().is_some_and(|last| step <= last)
    }

    /// Puts the wizard back in linear mode at `step` (clamped), e.g. when
    /// resuming a work order at its first unfinished step.
    pub fn reset(&mut self, step: StepId) {
        self.current = step.clamp(1, self.total);
        self.mode = NavigationMode::Linear;
    }

    pub fn handle_step_click(&mut self, step: StepId) -> NavigationOutcome {
        if !self.is_accessible(step) {
            self.notifier
                .warning(format!("Conclua as etapas anteriores antes de acessar a etapa {step}"));
            return NavigationOutcome::Blocked(step);
        }

        match self.mode {
            NavigationMode::Historical { last_active } if step == last_active => {
                self.handle_return_to_active()
            }
            _ if step == self.current => NavigationOutcome::Unchanged,
            NavigationMode::Linear if step < self.current => {
                let last_active = self.current;
                self.mode = NavigationMode::Historical { last_active };
                self.current = step;
                tracing::debug!(step, last_active, "entered historical navigation");
                self.notifier.info(format!(
                    "Visualizando a etapa {step}. Volte para a etapa {last_active} para continuar."
                ));
                NavigationOutcome::EnteredHistorical {
                    last_active,
                    to: step,
                }
            }
            _ => {
                let from = self.current;
                self.current = step;
                NavigationOutcome::Moved { from, to: step }
            }
        }
    }

    /// Saves through `on_save` and advances only when it reports success.
    pub async fn handle_next_step<F, Fut>(&mut self, on_save: F) -> NavigationOutcome
    where
        F: FnOnce(StepId) -> Fut,
        Fut: Future<Output = bool>,
    {
        let from = self.current;
        if !on_save(from).await {
            tracing::debug!(step = from, "save failed, staying on step");
            return NavigationOutcome::Unchanged;
        }
        if from >= self.total {
            return NavigationOutcome::Unchanged;
        }

        self.current = from + 1;
        match self.mode {
            NavigationMode::Historical { last_active } if self.current == last_active => {
                self.mode = NavigationMode::Linear;
                NavigationOutcome::ReturnedToActive(last_active)
            }
            _ => NavigationOutcome::Moved {
                from,
                to: self.current,
            },
        }
    }

    pub fn handle_prev_step(&mut self) -> NavigationOutcome {
        if self.current <= 1 {
            return NavigationOutcome::Unchanged;
        }
        let from = self.current;
        self.current -= 1;
        NavigationOutcome::Moved {
            from,
            to: self.current,
        }
    }

    /// Leaves historical mode. No-op when not in it.
    pub fn handle_return_to_active(&mut self) -> NavigationOutcome {
        let NavigationMode::Historical { last_active } = self.mode else {
            return NavigationOutcome::Unchanged;
        };
        self.mode = NavigationMode::Linear;
        self.current = last_active;
        tracing::debug!(step = last_active, "returned to active step");
        self.notifier
            .info(format!("Voltando para a etapa atual ({last_active})"));
        NavigationOutcome::ReturnedToActive(last_active)
    }
}
