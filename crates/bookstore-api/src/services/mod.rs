//! 도메인 서비스 모듈.

pub mod identity;

pub use identity::{IdentityError, IdentityService, Registration};
