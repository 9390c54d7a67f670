//! 공통 에러 타입.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 로드 실패
    #[error("설정 로드 실패: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// 설정 값이 유효하지 않음
    #[error("설정 에러: {0}")]
    Config(String),

    /// 알 수 없는 역할 문자열
    #[error("알 수 없는 역할: {0}")]
    InvalidRole(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;
