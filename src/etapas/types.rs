//! Tipos de dados trocados com o serviço remoto de etapas.
//!
//! Todas as structs derivam `Serialize` e `Deserialize` conforme o formato
//! JSON do backend (campos em snake_case, status em minúsculas).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::workflow::StepId;

/// Status persistido de uma etapa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EtapaStatus {
    Pendente,
    Rascunho,
    Concluida,
    Aprovada,
}

impl EtapaStatus {
    /// Status enviado ao salvar: rascunho ou concluída.
    pub fn for_save(is_draft: bool) -> Self {
        if is_draft {
            EtapaStatus::Rascunho
        } else {
            EtapaStatus::Concluida
        }
    }

    /// `true` para etapas que o backend considera finalizadas.
    pub fn is_done(self) -> bool {
        matches!(self, EtapaStatus::Concluida | EtapaStatus::Aprovada)
    }
}

impl std::fmt::Display for EtapaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EtapaStatus::Pendente => write!(f, "pendente"),
            EtapaStatus::Rascunho => write!(f, "rascunho"),
            EtapaStatus::Concluida => write!(f, "concluida"),
            EtapaStatus::Aprovada => write!(f, "aprovada"),
        }
    }
}

/// Uma etapa persistida de uma ordem de serviço.
///
/// O campo `ordem` corresponde ao id do passo no registro do tipo de OS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Etapa {
    /// Identificador da etapa, gerado pelo backend.
    pub id: Uuid,
    /// Ordem de serviço dona desta etapa.
    #[serde(default)]
    pub os_id: Option<Uuid>,
    /// Posição da etapa no fluxo (1-based).
    pub ordem: StepId,
    /// Nome exibido da etapa.
    #[serde(default)]
    pub nome_etapa: Option<String>,
    pub status: EtapaStatus,
    /// Dados do formulário. `None` quando a etapa nunca foi editada.
    #[serde(default)]
    pub dados_etapa: Option<Value>,
    #[serde(default)]
    pub data_conclusao: Option<DateTime<Utc>>,
}

/// Corpo do `POST` que cria uma etapa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaEtapa {
    pub ordem: StepId,
    pub nome_etapa: String,
    pub status: EtapaStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dados_etapa: Option<Value>,
}

/// Corpo do `PATCH` que atualiza uma etapa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtualizacaoEtapa {
    pub dados_etapa: Value,
    pub status: EtapaStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_conclusao: Option<DateTime<Utc>>,
}

impl AtualizacaoEtapa {
    /// Monta a atualização de um salvamento; conclusões recebem `data_conclusao`.
    pub fn for_save(dados_etapa: Value, is_draft: bool) -> Self {
        Self {
            dados_etapa,
            status: EtapaStatus::for_save(is_draft),
            data_conclusao: if is_draft { None } else { Some(Utc::now()) },
        }
    }
}
