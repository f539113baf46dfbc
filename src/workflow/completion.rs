use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use super::data::StepData;
use super::registry::{StepId, StepRegistry};
use crate::error::WorkflowError;

/// Pure predicate over one step's data.
pub type Predicate = Box<dyn Fn(&StepData) -> bool + Send + Sync>;

/// Pairs a step with its predicate.
pub fn rule<F>(step: StepId, predicate: F) -> (StepId, Predicate)
where
    F: Fn(&StepData) -> bool + Send + Sync + 'static,
{
    (step, Box::new(predicate))
}

/// Ordered `(step, predicate)` pairs, checked against a registry when built.
pub struct CompletionRules {
    rules: Vec<(StepId, Predicate)>,
}

impl fmt::Debug for CompletionRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRules")
            .field("steps", &self.step_ids())
            .finish()
    }
}

impl CompletionRules {
    /// Rejects rules for steps the registry does not define and repeated step ids.
    pub fn new(
        registry: &StepRegistry,
        rules: Vec<(StepId, Predicate)>,
    ) -> Result<Self, WorkflowError> {
        let mut seen = HashSet::new();
        for (step, _) in &rules {
            if !registry.contains(*step) {
                return Err(WorkflowError::UnknownStep(*step));
            }
            if !seen.insert(*step) {
                return Err(WorkflowError::DuplicateRule(*step));
            }
        }
        Ok(Self { rules })
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn step_ids(&self) -> Vec<StepId> {
        self.rules.iter().map(|(step, _)| *step).collect()
    }

    /// `None` when the step has no rule.
    pub fn is_satisfied(&self, step: StepId, data: &StepData) -> Option<bool> {
        self.rules
            .iter()
            .find(|(id, _)| *id == step)
            .map(|(_, rule)| rule(data))
    }

    /// Steps considered complete.
    ///
    /// A non-empty `backend_completed` list is authoritative and returned as is.
    /// Otherwise each rule runs against `data_for(step)`, in rule order; there is
    /// no cross-step checking, so a later step may complete before an earlier one.
    /// Steps for which `data_for` has nothing are skipped.
    pub fn evaluate<'a, F>(&self, backend_completed: &[StepId], data_for: F) -> Vec<StepId>
    where
        F: Fn(StepId) -> Option<Cow<'a, StepData>>,
    {
        if !backend_completed.is_empty() {
            return backend_completed.to_vec();
        }

        self.rules
            .iter()
            .filter(|(step, rule)| data_for(*step).is_some_and(|data| rule(&*data)))
            .map(|(step, _)| *step)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::data::{LeadData, StepForm};
    use crate::workflow::registry::StepDefinition;
    use std::collections::HashMap;

    fn registry() -> StepRegistry {
        StepRegistry::new(vec![
            StepDefinition::new(1, "Identifique o Lead", "Lead", "Comercial", StepForm::Lead),
            StepDefinition::new(2, "Follow-up", "Follow-up", "Comercial", StepForm::FollowUp),
            StepDefinition::new(3, "Follow-up 2", "Follow-up 2", "Comercial", StepForm::FollowUp),
        ])
        .unwrap()
    }

    fn has_lead(data: &StepData) -> bool {
        matches!(data, StepData::Lead(lead) if lead.lead_id.is_some())
    }

    fn has_notes(data: &StepData) -> bool {
        matches!(data, StepData::FollowUp(f) if !f.anotacoes.trim().is_empty())
    }

    fn lookup<'a>(
        registry: &'a StepRegistry,
        data: &'a HashMap<StepId, StepData>,
    ) -> impl Fn(StepId) -> Option<Cow<'a, StepData>> {
        move |step| match data.get(&step) {
            Some(d) => Some(Cow::Borrowed(d)),
            None => registry.default_data(step).map(Cow::Owned),
        }
    }

    #[test]
    fn rule_for_unknown_step_is_rejected() {
        let err = CompletionRules::new(&registry(), vec![rule(7, has_lead)]).unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownStep(7)));
    }

    #[test]
    fn duplicate_rule_is_rejected() {
        let err = CompletionRules::new(
            &registry(),
            vec![rule(1, has_lead), rule(1, has_lead)],
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateRule(1)));
    }

    #[test]
    fn local_rules_apply_when_backend_list_is_empty() {
        let registry = registry();
        let rules = CompletionRules::new(&registry, vec![rule(1, has_lead)]).unwrap();
        let mut data = HashMap::new();
        data.insert(
            1,
            StepData::Lead(LeadData {
                lead_id: Some("x".into()),
                ..Default::default()
            }),
        );

        assert_eq!(rules.evaluate(&[], lookup(&registry, &data)), vec![1]);
    }

    #[test]
    fn backend_list_overrides_local_rules() {
        let registry = registry();
        let rules = CompletionRules::new(&registry, vec![rule(1, has_lead)]).unwrap();
        let mut data = HashMap::new();
        data.insert(
            1,
            StepData::Lead(LeadData {
                lead_id: Some("x".into()),
                ..Default::default()
            }),
        );

        assert_eq!(rules.evaluate(&[2, 3], lookup(&registry, &data)), vec![2, 3]);
    }

    #[test]
    fn absent_data_uses_defaults() {
        let registry = registry();
        let rules = CompletionRules::new(
            &registry,
            vec![rule(1, has_lead), rule(2, |_: &StepData| true)],
        )
        .unwrap();
        let data = HashMap::new();

        assert_eq!(rules.evaluate(&[], lookup(&registry, &data)), vec![2]);
    }

    #[test]
    fn later_step_can_complete_before_earlier_one() {
        let registry = registry();
        let rules = CompletionRules::new(
            &registry,
            vec![rule(2, has_notes), rule(3, has_notes)],
        )
        .unwrap();
        let mut data = HashMap::new();
        data.insert(
            3,
            StepData::FollowUp(crate::workflow::data::FollowUpData {
                anotacoes: "Visita feita".into(),
                ..Default::default()
            }),
        );

        assert_eq!(rules.evaluate(&[], lookup(&registry, &data)), vec![3]);
    }

    #[test]
    fn is_satisfied_reports_missing_rule() {
        let registry = registry();
        let rules = CompletionRules::new(&registry, vec![rule(1, has_lead)]).unwrap();
        let empty = StepData::default_for(StepForm::Lead);
        assert_eq!(rules.is_satisfied(1, &empty), Some(false));
        assert_eq!(rules.is_satisfied(2, &empty), None);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.step_ids(), vec![1]);
    }
}
