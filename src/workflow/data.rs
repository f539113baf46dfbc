//! Typed form data for each kind of step.
//!
//! Every step edits exactly one record type. The records serialize to the
//! camelCase JSON objects stored in `dados_etapa`; missing fields fall back
//! to the record's default, so a partially filled draft always decodes.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The form a step renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepForm {
    Lead,
    TipoOs,
    FollowUp,
    Memorial,
    Precificacao,
    Agendamento,
    Documento,
    Anexo,
    Assinatura,
}

impl fmt::Display for StepForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepForm::Lead => "lead",
            StepForm::TipoOs => "tipo_os",
            StepForm::FollowUp => "follow_up",
            StepForm::Memorial => "memorial",
            StepForm::Precificacao => "precificacao",
            StepForm::Agendamento => "agendamento",
            StepForm::Documento => "documento",
            StepForm::Anexo => "anexo",
            StepForm::Assinatura => "assinatura",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeadData {
    pub lead_id: Option<String>,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub endereco: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TipoOsData {
    pub tipo_os: Option<String>,
    pub descricao: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FollowUpData {
    pub anotacoes: String,
    pub proximo_contato: Option<NaiveDate>,
    pub interessado: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemEscopo {
    pub descricao: String,
    pub quantidade: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemorialData {
    pub objetivo: String,
    pub itens: Vec<ItemEscopo>,
    pub prazo_dias: Option<u32>,
}

/// Pricing inputs. Totals are derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrecificacaoData {
    pub custo_materiais: f64,
    pub custo_mao_de_obra: f64,
    /// Percentage, e.g. `15.0` for 15%.
    pub percentual_lucro: f64,
    pub percentual_imposto: f64,
    pub desconto: f64,
}

impl PrecificacaoData {
    pub fn subtotal(&self) -> f64 {
        self.custo_materiais + self.custo_mao_de_obra
    }

    /// Subtotal with margin and taxes applied, minus the discount. Never negative.
    pub fn valor_total(&self) -> f64 {
        let com_lucro = self.subtotal() * (1.0 + self.percentual_lucro / 100.0);
        let com_imposto = com_lucro * (1.0 + self.percentual_imposto / 100.0);
        (com_imposto - self.desconto).max(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgendamentoData {
    pub data: Option<NaiveDate>,
    pub horario: Option<NaiveTime>,
    pub local: String,
    pub responsavel: String,
}

/// A generated document (proposal, contract, report). Generation itself
/// happens in the document service; only its result is kept here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentoData {
    pub documento_url: Option<String>,
    pub gerado_em: Option<DateTime<Utc>>,
    pub enviado_ao_cliente: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArquivoAnexo {
    pub nome: String,
    pub url: String,
    pub tamanho_bytes: u64,
}

/// Data of the shared single-file attachment form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnexoData {
    pub arquivo: Option<ArquivoAnexo>,
    pub observacoes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssinaturaData {
    pub contrato_assinado: bool,
    pub data_assinatura: Option<NaiveDate>,
    pub signatario: String,
}

/// Form data of one step, tagged by form.
#[derive(Debug, Clone, PartialEq)]
pub enum StepData {
    Lead(LeadData),
    TipoOs(TipoOsData),
    FollowUp(FollowUpData),
    Memorial(MemorialData),
    Precificacao(PrecificacaoData),
    Agendamento(AgendamentoData),
    Documento(DocumentoData),
    Anexo(AnexoData),
    Assinatura(AssinaturaData),
}

impl StepData {
    pub fn form(&self) -> StepForm {
        match self {
            StepData::Lead(_) => StepForm::Lead,
            StepData::TipoOs(_) => StepForm::TipoOs,
            StepData::FollowUp(_) => StepForm::FollowUp,
            StepData::Memorial(_) => StepForm::Memorial,
            StepData::Precificacao(_) => StepForm::Precificacao,
            StepData::Agendamento(_) => StepForm::Agendamento,
            StepData::Documento(_) => StepForm::Documento,
            StepData::Anexo(_) => StepForm::Anexo,
            StepData::Assinatura(_) => StepForm::Assinatura,
        }
    }

    /// Schema default rendered by a form that has no data yet.
    pub fn default_for(form: StepForm) -> Self {
        match form {
            StepForm::Lead => StepData::Lead(LeadData::default()),
            StepForm::TipoOs => StepData::TipoOs(TipoOsData::default()),
            StepForm::FollowUp => StepData::FollowUp(FollowUpData::default()),
            StepForm::Memorial => StepData::Memorial(MemorialData::default()),
            StepForm::Precificacao => StepData::Precificacao(PrecificacaoData::default()),
            StepForm::Agendamento => StepData::Agendamento(AgendamentoData::default()),
            StepForm::Documento => StepData::Documento(DocumentoData::default()),
            StepForm::Anexo => StepData::Anexo(AnexoData::default()),
            StepForm::Assinatura => StepData::Assinatura(AssinaturaData::default()),
        }
    }

    /// Decodes a `dados_etapa` object as the given form. `null` decodes to the default.
    pub fn decode(form: StepForm, value: Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default_for(form));
        }
        let data = match form {
            StepForm::Lead => StepData::Lead(serde_json::from_value(value)?),
            StepForm::TipoOs => StepData::TipoOs(serde_json::from_value(value)?),
            StepForm::FollowUp => StepData::FollowUp(serde_json::from_value(value)?),
            StepForm::Memorial => StepData::Memorial(serde_json::from_value(value)?),
            StepForm::Precificacao => StepData::Precificacao(serde_json::from_value(value)?),
            StepForm::Agendamento => StepData::Agendamento(serde_json::from_value(value)?),
            StepForm::Documento => StepData::Documento(serde_json::from_value(value)?),
            StepForm::Anexo => StepData::Anexo(serde_json::from_value(value)?),
            StepForm::Assinatura => StepData::Assinatura(serde_json::from_value(value)?),
        };
        Ok(data)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            StepData::Lead(d) => serde_json::to_value(d),
            StepData::TipoOs(d) => serde_json::to_value(d),
            StepData::FollowUp(d) => serde_json::to_value(d),
            StepData::Memorial(d) => serde_json::to_value(d),
            StepData::Precificacao(d) => serde_json::to_value(d),
            StepData::Agendamento(d) => serde_json::to_value(d),
            StepData::Documento(d) => serde_json::to_value(d),
            StepData::Anexo(d) => serde_json::to_value(d),
            StepData::Assinatura(d) => serde_json::to_value(d),
        }
    }

    /// True when nothing differs from the schema default.
    pub fn is_empty(&self) -> bool {
        *self == Self::default_for(self.form())
    }
}
