//! Error taxonomy for calls against the Tarefas API.
//!
//! HTTP failures are mapped exactly once, at the service boundary, into a
//! variant carrying the message shown to the user. Which message depends on
//! the call site (login, task/user listing, user creation), so mapping takes
//! an [`ErrorContext`].

use reqwest::StatusCode;
use serde::Deserialize;
use tarefas_core::{TaskRuleViolation, ValidationErrors};
use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Login rejected (400/401 on the auth endpoint)
    #[error("{0}")]
    InvalidCredentials(String),

    /// Duplicate email or username
    #[error("{0}")]
    Conflict(String),

    /// 400 outside of login
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Server(String),

    /// No response at all
    #[error("{0}")]
    Network(String),

    /// Any other non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Done tasks are immutable; rejected before any request is sent
    #[error("{0}")]
    CompletedTask(String),

    /// Form validation failed before any request is sent
    #[error("{0}")]
    InvalidInput(ValidationErrors),

    #[error("Resposta inválida do servidor: {0}")]
    Json(String),

    #[error("Falha ao gravar a sessão: {0}")]
    Storage(String),
}

/// Which call produced the failure; selects the message table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Login,
    Tasks,
    UserCreation,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

fn generic(status: StatusCode) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        message: format!(
            "Erro {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        ),
    }
}

impl ApiError {
    pub fn from_status(ctx: ErrorContext, status: StatusCode, body: &str) -> Self {
        match ctx {
            ErrorContext::Login => {
                let msg = |fallback: &str| server_message(body).unwrap_or_else(|| fallback.to_string());
                match status.as_u16() {
                    400 => ApiError::InvalidCredentials(msg("Usuário ou senha inválidos")),
                    401 => ApiError::InvalidCredentials(msg("Credenciais inválidas ou token expirado")),
                    403 => ApiError::Forbidden(msg("Acesso negado")),
                    404 => ApiError::NotFound(msg("Recurso não encontrado")),
                    500 => ApiError::Server(msg("Erro interno do servidor")),
                    _ => match server_message(body) {
                        Some(m) => ApiError::Status {
                            status: status.as_u16(),
                            message: m,
                        },
                        None => generic(status),
                    },
                }
            }
            ErrorContext::Tasks => match status.as_u16() {
                400 => ApiError::Validation("Dados inválidos fornecidos".to_string()),
                401 => ApiError::Unauthorized("Não autorizado - Token inválido ou expirado".to_string()),
                403 => ApiError::Forbidden("Acesso negado".to_string()),
                404 => ApiError::NotFound("Tarefa não encontrada".to_string()),
                500 => ApiError::Server("Erro interno do servidor".to_string()),
                _ => generic(status),
            },
            ErrorContext::UserCreation => match status.as_u16() {
                400 => ApiError::Validation(
                    "Dados inválidos. Verifique as informações fornecidas.".to_string(),
                ),
                409 => ApiError::Conflict("Email ou nome de usuário já existem.".to_string()),
                500 => ApiError::Server(
                    "Erro interno do servidor. Tente novamente mais tarde.".to_string(),
                ),
                s => ApiError::Status {
                    status: s,
                    message: "Erro ao criar usuário. Tente novamente.".to_string(),
                },
            },
        }
    }

    pub fn from_transport(err: &TransportError) -> Self {
        ApiError::Network(format!("Erro: {err}"))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

impl From<TaskRuleViolation> for ApiError {
    fn from(v: TaskRuleViolation) -> Self {
        ApiError::CompletedTask(v.message().to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        ApiError::InvalidInput(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Json(e.to_string())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_messages_prefer_server_text() {
        let e = ApiError::from_status(ErrorContext::Login, StatusCode::UNAUTHORIZED, "");
        assert_eq!(e, ApiError::InvalidCredentials("Credenciais inválidas ou token expirado".into()));

        let e = ApiError::from_status(
            ErrorContext::Login,
            StatusCode::BAD_REQUEST,
            r#"{"message":"Usuário bloqueado"}"#,
        );
        assert_eq!(e.to_string(), "Usuário bloqueado");
    }

    #[test]
    fn task_table() {
        let cases = [
            (400, "Dados inválidos fornecidos"),
            (401, "Não autorizado - Token inválido ou expirado"),
            (403, "Acesso negado"),
            (404, "Tarefa não encontrada"),
            (500, "Erro interno do servidor"),
            (418, "Erro 418: I'm a teapot"),
        ];
        for (code, msg) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            let e = ApiError::from_status(ErrorContext::Tasks, status, r#"{"message":"ignored"}"#);
            assert_eq!(e.to_string(), msg, "status {code}");
        }
        assert!(ApiError::from_status(ErrorContext::Tasks, StatusCode::UNAUTHORIZED, "").is_unauthorized());
    }

    #[test]
    fn user_creation_table() {
        let e = ApiError::from_status(ErrorContext::UserCreation, StatusCode::CONFLICT, "");
        assert_eq!(e, ApiError::Conflict("Email ou nome de usuário já existem.".into()));
        let e = ApiError::from_status(ErrorContext::UserCreation, StatusCode::BAD_GATEWAY, "");
        assert_eq!(e.to_string(), "Erro ao criar usuário. Tente novamente.");
    }

    #[test]
    fn transport_errors_are_network() {
        let e = ApiError::from_transport(&TransportError("connection refused".into()));
        assert_eq!(e.to_string(), "Erro: connection refused");
    }

    #[test]
    fn rule_violation_converts() {
        let v = TaskRuleViolation {
            task_id: 1,
            action: tarefas_core::TaskAction::Delete,
        };
        let e: ApiError = v.into();
        assert_eq!(e.to_string(), "Tarefas concluídas não podem ser excluídas.");
    }
}
