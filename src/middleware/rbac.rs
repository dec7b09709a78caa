// src/middleware/rbac.rs
//
// A checagem de papel acontece na borda, como extractor, antes do handler
// rodar; a aritmética do estoque nunca olha para papéis.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::AppError,
    models::auth::{Role, User},
};

/// 1. O Trait que define o que é uma capacidade exigível
pub trait Capability: Send + Sync + 'static {
    fn allowed(role: Role) -> bool;
}

/// 2. O Extractor (Guardião)
pub struct RequireCapability<T>(PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: Capability,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // O auth_guard já rodou e deixou o usuário nos extensions.
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if !T::allowed(user.role) {
            return Err(AppError::Forbidden);
        }

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS CAPACIDADES (TIPOS)
// ---

/// Estornar movimentações mexe no histórico; funcionário não pode.
pub struct CanCancelMovements;
impl Capability for CanCancelMovements {
    fn allowed(role: Role) -> bool {
        role.can_cancel_movements()
    }
}

/// Criar/editar/excluir itens e categorias.
pub struct CanManageCatalog;
impl Capability for CanManageCatalog {
    fn allowed(role: Role) -> bool {
        role.can_manage_catalog()
    }
}

/// Gestão de usuários e identidade visual: só o dono.
pub struct OwnerOnly;
impl Capability for OwnerOnly {
    fn allowed(role: Role) -> bool {
        role.is_owner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employees_cannot_cancel_or_manage() {
        assert!(!CanCancelMovements::allowed(Role::Funcionario));
        assert!(!CanManageCatalog::allowed(Role::Funcionario));
        assert!(!OwnerOnly::allowed(Role::Funcionario));
    }

    #[test]
    fn admins_manage_stock_but_not_users() {
        assert!(CanCancelMovements::allowed(Role::Admin));
        assert!(CanManageCatalog::allowed(Role::Admin));
        assert!(!OwnerOnly::allowed(Role::Admin));
    }

    #[test]
    fn the_owner_can_do_everything() {
        assert!(CanCancelMovements::allowed(Role::Dono));
        assert!(CanManageCatalog::allowed(Role::Dono));
        assert!(OwnerOnly::allowed(Role::Dono));
    }
}
