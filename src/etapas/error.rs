//! Tipos de erro para o cliente da API de etapas.
//!
//! Define [`EtapasError`] com variantes para recurso inexistente, erros da
//! API, falhas de rede e payloads inválidos.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com o serviço remoto de etapas.
///
/// - [`NotFound`](EtapasError::NotFound): o servidor retornou HTTP 404
/// - [`Api`](EtapasError::Api): qualquer outro erro HTTP (4xx/5xx)
/// - [`Network`](EtapasError::Network): falha na camada de rede
/// - [`Decode`](EtapasError::Decode): corpo de resposta ou `dados_etapa` inválido
#[derive(Debug, Error)]
pub enum EtapasError {
    /// Ordem de serviço ou etapa inexistente no backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// Erro retornado pela API (ex.: 401 token inválido, 500 erro interno).
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON que não corresponde ao formulário esperado.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
