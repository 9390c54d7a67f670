//! 인증 및 권한 부여.
//!
//! JWT 기반 인증 및 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenCodec`]: Access/Refresh Token 발급 및 검증
//! - [`TokenBlocklist`]: 폐기된 토큰 레지스트리 (Redis / 인메모리)
//! - [`AccessToken`], [`RefreshToken`]: Bearer 토큰 검증 추출기
//! - [`AuthenticatedUser`], [`BookAccess`]: 사용자 조회 및 역할 검사 추출기
//! - 비밀번호 해싱/검증 함수
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn list_books(BookAccess(user): BookAccess) -> impl IntoResponse {
//!     format!("Hello, {}!", user.user().username)
//! }
//! ```

mod blocklist;
mod error;
mod guard;
pub(crate) mod jwt;
mod password;
mod policy;

pub use blocklist::{blocklist_key, BlocklistError, MemoryBlocklist, RedisBlocklist, TokenBlocklist};
pub use error::AuthError;
pub use guard::{bearer_token, verify_token, AccessToken, RefreshToken};
pub use jwt::{JwtError, JwtSettings, TokenClaims, TokenCodec, TokenKind, TokenPair, TokenUser};
pub use password::{
    hash_password, validate_password_strength, verify_password, PasswordError, MIN_PASSWORD_LEN,
};
pub use policy::{require_role, AuthenticatedUser, BookAccess, BOOK_ROLES};

pub use bookstore_core::Role;
