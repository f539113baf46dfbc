//! Contexto de autenticação injetado nos clientes remotos.

/// Sessão do usuário que opera o fluxo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Token bearer enviado ao backend. Vazio quando anônimo.
    pub token: String,
    /// Identificação do usuário, usada apenas em logs.
    pub usuario: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, usuario: Option<String>) -> Self {
        Self {
            token: token.into(),
            usuario,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}
