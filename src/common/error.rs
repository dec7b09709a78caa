use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // ---
    // Erros do livro de movimentações
    // ---
    #[error("Quantidade inválida")]
    InvalidQuantity,

    #[error("Estoque insuficiente")]
    InsufficientStock,

    #[error("O estorno deixaria o estoque negativo")]
    WouldGoNegative,

    #[error("Tipo de movimentação inválido para esta operação")]
    InvalidMovementType,

    #[error("Item não encontrado")]
    ItemNotFound,

    #[error("Movimentação não encontrada")]
    MovementNotFound,

    #[error("Categoria já existe")]
    CategoryAlreadyExists,

    #[error("Categoria não encontrada")]
    CategoryNotFound,

    // ---
    // Erros de autenticação e acesso
    // ---
    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Acesso negado")]
    Forbidden,

    // ---
    // Erros de infraestrutura
    // ---
    #[error("Tempo de resposta esgotado")]
    Timeout,

    #[error("Falha de comunicação com o servidor: {0}")]
    NetworkFailure(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O cliente HTTP legado só distingue duas falhas: estourou o tempo ou não chegou lá.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout
        } else {
            AppError::NetworkFailure(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidQuantity => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "A quantidade informada é inválida.",
            ),
            AppError::InsufficientStock => (StatusCode::CONFLICT, "Estoque insuficiente."),
            AppError::WouldGoNegative => (
                StatusCode::CONFLICT,
                "Não é possível estornar esta movimentação agora.",
            ),
            AppError::InvalidMovementType => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Tipo de movimentação inválido para esta operação.",
            ),
            AppError::ItemNotFound => (StatusCode::NOT_FOUND, "Item não encontrado."),
            AppError::MovementNotFound => {
                (StatusCode::NOT_FOUND, "Movimentação não encontrada.")
            }
            AppError::CategoryAlreadyExists => (
                StatusCode::CONFLICT,
                "Já existe uma categoria com este nome neste setor.",
            ),
            AppError::CategoryNotFound => (StatusCode::NOT_FOUND, "Categoria não encontrada."),

            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.")
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado."),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Você não tem permissão para realizar esta ação.",
            ),

            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "O servidor demorou demais para responder. Tente novamente.",
            ),
            AppError::NetworkFailure(_) => (
                StatusCode::BAD_GATEWAY,
                "Não foi possível se comunicar com o servidor de dados.",
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_map_to_client_facing_statuses() {
        let cases = [
            (AppError::InvalidQuantity, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::InsufficientStock, StatusCode::CONFLICT),
            (AppError::WouldGoNegative, StatusCode::CONFLICT),
            (AppError::ItemNotFound, StatusCode::NOT_FOUND),
            (AppError::MovementNotFound, StatusCode::NOT_FOUND),
            (AppError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (
                AppError::NetworkFailure("conexão recusada".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
