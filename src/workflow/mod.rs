//! Wizard engine for work-order steps: registry, typed data, store,
//! completion rules and navigation.

mod completion;
mod data;
mod flows;
mod navigation;
mod registry;
mod store;
mod wizard;

pub use completion::{CompletionRules, Predicate, rule};
pub use data::{
    AgendamentoData, AnexoData, ArquivoAnexo, AssinaturaData, DocumentoData, FollowUpData,
    ItemEscopo, LeadData, MemorialData, PrecificacaoData, StepData, StepForm, TipoOsData,
};
pub use flows::OsType;
pub use navigation::{NavigationMode, NavigationOutcome, Navigator};
pub use registry::{AnexoTemplate, StepDefinition, StepId, StepRegistry, StepStatus};
pub use store::WorkflowStore;
pub use wizard::{StepView, Workflow};
