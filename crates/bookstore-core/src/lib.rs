//! # Bookstore Core
//!
//! 도서 재고 API의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! - 사용자 / 도서 / 역할 도메인 타입
//! - 설정 관리 (`config` 크레이트 기반)
//! - 로깅 인프라 (`tracing`)
//! - 공통 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::AppConfig;
pub use domain::*;
pub use error::*;
pub use logging::{init_logging, init_logging_from_env, LogConfig, LogFormat};
