// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Papel fixo do usuário. Não há tabela de permissões: a matriz de
// capacidades é pequena e estável (ver middleware::rbac).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Funcionario,
    Admin,
    Dono,
}

impl Role {
    /// Estorno desfaz auditoria; fica restrito a quem gerencia o estoque.
    pub fn can_cancel_movements(self) -> bool {
        matches!(self, Role::Admin | Role::Dono)
    }

    /// Criação/edição/exclusão de itens e categorias.
    pub fn can_manage_catalog(self) -> bool {
        matches!(self, Role::Admin | Role::Dono)
    }

    /// Gestão de usuários e identidade visual.
    pub fn is_owner(self) -> bool {
        matches!(self, Role::Dono)
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_matrix_per_role() {
        assert!(!Role::Funcionario.can_cancel_movements());
        assert!(!Role::Funcionario.can_manage_catalog());
        assert!(!Role::Funcionario.is_owner());

        assert!(Role::Admin.can_cancel_movements());
        assert!(Role::Admin.can_manage_catalog());
        assert!(!Role::Admin.is_owner());

        assert!(Role::Dono.can_cancel_movements());
        assert!(Role::Dono.can_manage_catalog());
        assert!(Role::Dono.is_owner());
    }
}
