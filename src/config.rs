//! Configuração do os-workflow carregada a partir de `os-workflow.toml`.
//!
//! A struct [`WorkflowConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `OS_WORKFLOW_API_URL` e `OS_WORKFLOW_API_TOKEN`
//! têm precedência sobre o arquivo.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::session::Session;

/// Nome do arquivo procurado no diretório atual.
pub const CONFIG_FILE: &str = "os-workflow.toml";

/// Configuração de nível superior carregada de `os-workflow.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// URL base da API de etapas.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token bearer enviado ao backend.
    #[serde(default)]
    pub api_token: String,

    /// Usuário que opera o fluxo, usado apenas em logs.
    #[serde(default)]
    pub usuario: Option<String>,

    /// Tempo máximo de cada requisição, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Nível de log quando `RUST_LOG` não está definido.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Valor padrão da URL da API: backend local.
fn default_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

// Valor padrão do timeout: 30s.
fn default_request_timeout_secs() -> u64 {
    30
}

// Valor padrão do nível de log: "info".
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: String::new(),
            usuario: None,
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl WorkflowConfig {
    /// Carrega a configuração de `os-workflow.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Carrega a configuração do caminho informado, aplicando as variáveis de ambiente.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<WorkflowConfig>(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        // Variáveis de ambiente têm precedência sobre o arquivo de configuração.
        if let Ok(url) = std::env::var("OS_WORKFLOW_API_URL") {
            if !url.is_empty() {
                config.api_url = url;
            }
        }
        if let Ok(token) = std::env::var("OS_WORKFLOW_API_TOKEN") {
            if !token.is_empty() {
                config.api_token = token;
            }
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session(&self) -> Session {
        Session::new(self.api_token.clone(), self.usuario.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = WorkflowConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.log_level, "info");
        assert!(config.api_token.is_empty());
        assert!(!config.session().is_authenticated());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_token = "tok-123"
            request_timeout_secs = 5
        "#;
        let config: WorkflowConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_token, "tok-123");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "usuario = \"ana\"\nlog_level = \"debug\"").unwrap();

        let config = WorkflowConfig::load_from(file.path()).unwrap();
        assert_eq!(config.usuario.as_deref(), Some("ana"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = \"trinta\"").unwrap();

        assert!(WorkflowConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkflowConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
    }
}
