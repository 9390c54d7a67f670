//! 사용자 식별 서비스.
//!
//! 가입(비밀번호 해싱 포함)과 로그인 자격 증명 확인을 담당합니다.
//! 토큰 발급은 라우트 계층에서 [`TokenCodec`](crate::auth::TokenCodec)으로 수행합니다.

use std::sync::Arc;

use tracing::{debug, info};

use bookstore_core::{NewUser, User};

use crate::auth::{hash_password, verify_password, AuthError, PasswordError};
use crate::error::ApiError;
use crate::repository::{StoreError, StoreResult, UserStore};

/// 식별 서비스 에러.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("이미 존재하는 사용자입니다: {0}")]
    AlreadyExists(String),

    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::AlreadyExists(_) => ApiError::Conflict,
            IdentityError::InvalidCredentials => ApiError::Auth(AuthError::InvalidCredentials),
            IdentityError::Password(e) => e.into(),
            IdentityError::Store(e) => e.into(),
        }
    }
}

/// 가입 입력 (검증 완료, 평문 비밀번호).
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// 사용자 식별 서비스.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    pub async fn exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// 새 사용자 등록.
    ///
    /// 이메일 사전 확인과 저장소의 고유 제약 조건 모두에서 중복을 거부합니다.
    pub async fn register(&self, registration: Registration) -> Result<User, IdentityError> {
        if self.exists(&registration.email).await? {
            debug!(email = %registration.email, "Signup rejected, email already registered");
            return Err(IdentityError::AlreadyExists(registration.email));
        }

        let new_user = NewUser {
            password_hash: hash_password(&registration.password)?,
            username: registration.username,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
        };

        let user = match self.users.insert(new_user).await {
            Ok(user) => user,
            Err(StoreError::Duplicate(detail)) => {
                return Err(IdentityError::AlreadyExists(detail));
            }
            Err(e) => return Err(e.into()),
        };

        info!(uid = %user.uid, username = %user.username, "User registered");
        Ok(user)
    }

    /// 이메일/비밀번호 확인.
    ///
    /// 사용자 없음과 비밀번호 불일치는 같은 에러로 보고됩니다.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let Some(user) = self.find_by_email(email).await? else {
            debug!(email, "Login failed, unknown email");
            return Err(IdentityError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            debug!(uid = %user.uid, "Login failed, password mismatch");
            return Err(IdentityError::InvalidCredentials);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryUserStore;
    use bookstore_core::Role;

    fn service() -> IdentityService {
        IdentityService::new(Arc::new(MemoryUserStore::new()))
    }

    fn registration(email: &str) -> Registration {
        Registration {
            username: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let identity = service();
        let user = identity.register(registration("grace@example.com")).await.unwrap();

        assert_ne!(user.password_hash, "secret123");
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_eq!(user.role, Role::User);
        assert!(identity.exists("grace@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let identity = service();
        identity.register(registration("grace@example.com")).await.unwrap();

        let mut again = registration("grace@example.com");
        again.username = "someone-else".to_string();

        let err = identity.register(again).await.unwrap_err();
        assert!(matches!(err, IdentityError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_from_store() {
        let identity = service();
        identity.register(registration("grace@example.com")).await.unwrap();

        let mut other = registration("hopper@example.com");
        other.username = "grace".to_string();

        let err = identity.register(other).await.unwrap_err();
        assert!(matches!(err, IdentityError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let identity = service();
        let registered = identity.register(registration("grace@example.com")).await.unwrap();

        let user = identity
            .authenticate("grace@example.com", "secret123")
            .await
            .unwrap();
        assert_eq!(user.uid, registered.uid);

        assert!(matches!(
            identity.authenticate("grace@example.com", "wrong-pass").await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            identity.authenticate("nobody@example.com", "secret123").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }
}
