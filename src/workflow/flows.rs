//! Step registries and completion rules of the built-in OS types.

use std::fmt;
use std::str::FromStr;

use super::completion::{CompletionRules, rule};
use super::data::{StepData, StepForm};
use super::registry::{AnexoTemplate, StepDefinition, StepRegistry};
use crate::error::WorkflowError;

const COMERCIAL: &str = "Comercial";
const TECNICO: &str = "Técnico";
const ADMINISTRATIVO: &str = "Administrativo";
const FINANCEIRO: &str = "Financeiro";

const CONTRATO_MINUTA: AnexoTemplate = AnexoTemplate {
    label: "Minuta do contrato",
    extensions: &["pdf", "docx"],
};
const ART: AnexoTemplate = AnexoTemplate {
    label: "ART (Anotação de Responsabilidade Técnica)",
    extensions: &["pdf"],
};
const COMPROVANTE: AnexoTemplate = AnexoTemplate {
    label: "Comprovante de pagamento",
    extensions: &["pdf", "png", "jpg", "jpeg"],
};
const RELATORIO_FOTOGRAFICO: AnexoTemplate = AnexoTemplate {
    label: "Relatório fotográfico",
    extensions: &["pdf", "png", "jpg", "jpeg"],
};
const LAUDO_ASSINADO: AnexoTemplate = AnexoTemplate {
    label: "Laudo assinado",
    extensions: &["pdf"],
};
const PLANO_ASSESSORIA: AnexoTemplate = AnexoTemplate {
    label: "Plano de assessoria",
    extensions: &["pdf", "docx"],
};

const OBRAS_STEPS: &[StepDefinition] = &[
    StepDefinition::new(1, "Identifique o Lead", "Lead", COMERCIAL, StepForm::Lead),
    StepDefinition::new(2, "Selecione o Tipo de OS", "Tipo de OS", COMERCIAL, StepForm::TipoOs),
    StepDefinition::new(3, "Follow-up 1 (Entreviste o Lead)", "Follow-up 1", COMERCIAL, StepForm::FollowUp),
    StepDefinition::new(4, "Agende a Visita Técnica", "Agendar Visita", COMERCIAL, StepForm::Agendamento),
    StepDefinition::new(5, "Realize a Visita Técnica", "Visita", TECNICO, StepForm::FollowUp),
    StepDefinition::new(6, "Follow-up 2 (Memorial de Escopo)", "Memorial", TECNICO, StepForm::Memorial),
    StepDefinition::new(7, "Precificação", "Precificação", COMERCIAL, StepForm::Precificacao),
    StepDefinition::new(8, "Gere a Proposta Comercial", "Proposta", COMERCIAL, StepForm::Documento),
    StepDefinition::new(9, "Agende a Apresentação", "Agendar Apresentação", COMERCIAL, StepForm::Agendamento),
    StepDefinition::new(10, "Realize a Apresentação", "Apresentação", COMERCIAL, StepForm::FollowUp),
    StepDefinition::new(11, "Follow-up 3 (Retorno do Cliente)", "Follow-up 3", COMERCIAL, StepForm::FollowUp),
    StepDefinition::attachment(12, "Anexe a Minuta do Contrato", "Minuta", ADMINISTRATIVO, CONTRATO_MINUTA),
    StepDefinition::attachment(13, "Anexe a ART", "ART", TECNICO, ART),
    StepDefinition::new(14, "Contrato Assinado", "Assinatura", ADMINISTRATIVO, StepForm::Assinatura),
    StepDefinition::attachment(15, "Anexe o Comprovante de Pagamento", "Pagamento", FINANCEIRO, COMPROVANTE),
];

const LAUDO_STEPS: &[StepDefinition] = &[
    StepDefinition::new(1, "Identifique o Lead", "Lead", COMERCIAL, StepForm::Lead),
    StepDefinition::new(2, "Selecione o Tipo de OS", "Tipo de OS", COMERCIAL, StepForm::TipoOs),
    StepDefinition::new(3, "Agende a Vistoria", "Agendar Vistoria", COMERCIAL, StepForm::Agendamento),
    StepDefinition::new(4, "Realize a Vistoria", "Vistoria", TECNICO, StepForm::FollowUp),
    StepDefinition::attachment(5, "Anexe o Relatório Fotográfico", "Fotos", TECNICO, RELATORIO_FOTOGRAFICO),
    StepDefinition::new(6, "Precificação", "Precificação", COMERCIAL, StepForm::Precificacao),
    StepDefinition::new(7, "Gere o Laudo Técnico", "Laudo", TECNICO, StepForm::Documento),
    StepDefinition::attachment(8, "Anexe o Laudo Assinado", "Laudo Assinado", TECNICO, LAUDO_ASSINADO),
];

const ASSESSORIA_STEPS: &[StepDefinition] = &[
    StepDefinition::new(1, "Identifique o Lead", "Lead", COMERCIAL, StepForm::Lead),
    StepDefinition::new(2, "Selecione o Tipo de OS", "Tipo de OS", COMERCIAL, StepForm::TipoOs),
    StepDefinition::new(3, "Follow-up 1 (Entreviste o Lead)", "Follow-up 1", COMERCIAL, StepForm::FollowUp),
    StepDefinition::new(4, "Memorial de Escopo", "Memorial", TECNICO, StepForm::Memorial),
    StepDefinition::new(5, "Precificação", "Precificação", COMERCIAL, StepForm::Precificacao),
    StepDefinition::new(6, "Gere a Proposta Comercial", "Proposta", COMERCIAL, StepForm::Documento),
    StepDefinition::new(7, "Agende a Reunião de Alinhamento", "Reunião", COMERCIAL, StepForm::Agendamento),
    StepDefinition::new(8, "Gere o Contrato", "Contrato", ADMINISTRATIVO, StepForm::Documento),
    StepDefinition::new(9, "Contrato Assinado", "Assinatura", ADMINISTRATIVO, StepForm::Assinatura),
    StepDefinition::attachment(10, "Anexe o Plano de Assessoria", "Plano", TECNICO, PLANO_ASSESSORIA),
];

/// Work order types with a built-in wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsType {
    /// Works and maintenance (OS 1 to 4).
    Obras,
    /// Technical reports.
    Laudo,
    /// Consulting.
    Assessoria,
}

impl OsType {
    pub fn all() -> &'static [OsType] {
        &[OsType::Obras, OsType::Laudo, OsType::Assessoria]
    }

    pub fn label(self) -> &'static str {
        match self {
            OsType::Obras => "Obras e Manutenção",
            OsType::Laudo => "Laudo Técnico",
            OsType::Assessoria => "Assessoria Técnica",
        }
    }

    fn definitions(self) -> &'static [StepDefinition] {
        match self {
            OsType::Obras => OBRAS_STEPS,
            OsType::Laudo => LAUDO_STEPS,
            OsType::Assessoria => ASSESSORIA_STEPS,
        }
    }

    pub fn registry(self) -> StepRegistry {
        StepRegistry::from_static(self.definitions())
    }

    /// Rules for every step whose form has a required field. Follow-ups after
    /// the presentation are optional and have none.
    pub fn completion_rules(self, registry: &StepRegistry) -> Result<CompletionRules, WorkflowError> {
        let rules = registry
            .steps()
            .iter()
            .filter(|step| !(self == OsType::Obras && step.id == 11))
            .map(|step| match step.form {
                StepForm::Lead => rule(step.id, lead_identified),
                StepForm::TipoOs => rule(step.id, tipo_selected),
                StepForm::FollowUp => rule(step.id, notes_written),
                StepForm::Memorial => rule(step.id, scope_described),
                StepForm::Precificacao => rule(step.id, priced),
                StepForm::Agendamento => rule(step.id, scheduled),
                StepForm::Documento => rule(step.id, document_generated),
                StepForm::Anexo => rule(step.id, file_attached),
                StepForm::Assinatura => rule(step.id, contract_signed),
            })
            .collect();
        CompletionRules::new(registry, rules)
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsType::Obras => write!(f, "obras"),
            OsType::Laudo => write!(f, "laudo"),
            OsType::Assessoria => write!(f, "assessoria"),
        }
    }
}

impl FromStr for OsType {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "obras" => Ok(OsType::Obras),
            "laudo" => Ok(OsType::Laudo),
            "assessoria" => Ok(OsType::Assessoria),
            other => Err(WorkflowError::UnknownOsType(other.to_string())),
        }
    }
}

fn lead_identified(data: &StepData) -> bool {
    matches!(data, StepData::Lead(d) if d.lead_id.as_deref().is_some_and(|id| !id.is_empty()))
}

fn tipo_selected(data: &StepData) -> bool {
    matches!(data, StepData::TipoOs(d) if d.tipo_os.is_some())
}

fn notes_written(data: &StepData) -> bool {
    matches!(data, StepData::FollowUp(d) if !d.anotacoes.trim().is_empty())
}

fn scope_described(data: &StepData) -> bool {
    matches!(data, StepData::Memorial(d) if !d.objetivo.trim().is_empty() && !d.itens.is_empty())
}

fn priced(data: &StepData) -> bool {
    matches!(data, StepData::Precificacao(d) if d.valor_total() > 0.0)
}

fn scheduled(data: &StepData) -> bool {
    matches!(data, StepData::Agendamento(d) if d.data.is_some() && d.horario.is_some())
}

fn document_generated(data: &StepData) -> bool {
    matches!(data, StepData::Documento(d) if d.documento_url.is_some())
}

fn file_attached(data: &StepData) -> bool {
    matches!(data, StepData::Anexo(d) if d.arquivo.is_some())
}

fn contract_signed(data: &StepData) -> bool {
    matches!(data, StepData::Assinatura(d) if d.contrato_assinado && d.data_assinatura.is_some())
}
