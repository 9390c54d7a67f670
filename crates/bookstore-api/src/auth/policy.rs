//! 역할 기반 접근 정책.
//!
//! [`AuthenticatedUser`]는 Access Token 검증과 사용자 조회를 모두 통과해야만
//! 생성되므로, 역할 검사는 인증된 요청에서만 수행됩니다.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use bookstore_core::{Role, User};

use super::guard::AccessToken;
use super::{AuthError, TokenClaims};
use crate::error::ApiError;
use crate::state::AppState;

/// 도서 엔드포인트에 접근 가능한 역할.
pub const BOOK_ROLES: &[Role] = &[Role::Admin, Role::User];

/// 인증된 사용자.
///
/// 외부에서 직접 생성할 수 없으며 추출기를 통해서만 얻을 수 있습니다.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user: User,
    claims: TokenClaims,
}

impl AuthenticatedUser {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AccessToken(claims) = AccessToken::from_request_parts(parts, state).await?;

        // 토큰 발급 후 삭제된 사용자
        let Some(user) = state.identity.find_by_email(&claims.user.email).await? else {
            debug!(email = %claims.user.email, "Token subject no longer exists");
            return Err(AuthError::InvalidToken.into());
        };

        Ok(AuthenticatedUser { user, claims })
    }
}

/// 사용자의 역할이 `allowed`에 포함되는지 확인합니다.
pub fn require_role(user: &AuthenticatedUser, allowed: &[Role]) -> Result<(), AuthError> {
    if user.user.has_role_in(allowed) {
        Ok(())
    } else {
        debug!(uid = %user.user.uid, role = %user.user.role, "Insufficient role");
        Err(AuthError::Forbidden)
    }
}

/// 도서 역할 검사를 통과한 사용자 추출기.
#[derive(Debug, Clone)]
pub struct BookAccess(pub AuthenticatedUser);

impl FromRequestParts<Arc<AppState>> for BookAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        require_role(&user, BOOK_ROLES)?;
        Ok(BookAccess(user))
    }
}
