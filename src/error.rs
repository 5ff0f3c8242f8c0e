use thiserror::Error;

/// Failure taxonomy for the chat relay.
///
/// `Display` is the message that goes on the wire; variant payloads hold
/// server-side detail that is only ever logged.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Empty or missing user message, rejected before any upstream call.
    #[error("Mensagem é obrigatória")]
    InvalidRequest,

    /// Upstream credential missing or blank at startup.
    #[error("Configuração da API não encontrada")]
    Configuration(String),

    /// Non-success status from the completion API, carrying its own error
    /// message when the body supplied one.
    #[error("{0}")]
    Upstream(String),

    /// Transport failures, malformed payloads, missing response fields.
    #[error("Erro interno no servidor")]
    Internal(String),
}
