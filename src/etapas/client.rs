use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::EtapaStore;
use super::error::EtapasError;
use super::types::{AtualizacaoEtapa, Etapa, NovaEtapa};
use crate::session::Session;

/// HTTP client for the etapas REST API.
pub struct EtapasClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl EtapasClient {
    pub fn new(
        base_url: impl Into<String>,
        session: Session,
        timeout: Duration,
    ) -> Result<Self, EtapasError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        if self.session.is_authenticated() {
            req.bearer_auth(&self.session.token)
        } else {
            req
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, EtapasError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(EtapasError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(EtapasError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Decoded here, not via `Response::json`, so a malformed body stays a
        // `Decode` error instead of a `Network` one.
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl EtapaStore for EtapasClient {
    async fn list_etapas(&self, os_id: Uuid) -> Result<Vec<Etapa>, EtapasError> {
        let response = self
            .authorize(self.client.get(self.url(&format!("ordens-servico/{os_id}/etapas"))))
            .send()
            .await?;
        Self::parse(response, &format!("ordem de serviço {os_id}")).await
    }

    async fn create_etapa(&self, os_id: Uuid, nova: &NovaEtapa) -> Result<Etapa, EtapasError> {
        let response = self
            .authorize(self.client.post(self.url(&format!("ordens-servico/{os_id}/etapas"))))
            .json(nova)
            .send()
            .await?;
        Self::parse(response, &format!("ordem de serviço {os_id}")).await
    }

    async fn update_etapa(
        &self,
        etapa_id: Uuid,
        update: &AtualizacaoEtapa,
    ) -> Result<Etapa, EtapasError> {
        let response = self
            .authorize(self.client.patch(self.url(&format!("etapas/{etapa_id}"))))
            .json(update)
            .send()
            .await?;
        Self::parse(response, &format!("etapa {etapa_id}")).await
    }
}
