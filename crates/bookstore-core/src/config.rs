//! 설정 관리.
//!
//! 기본값 → `config/default.toml`(선택) → 환경 변수 순서로 로드합니다.
//! 프로세스 시작 시 한 번 로드되며 이후 변경되지 않습니다.
//!
//! # 환경 변수
//!
//! - `DATABASE_URL`: PostgreSQL 연결 URL (미설정 시 인메모리 저장소)
//! - `REDIS_URL`: 토큰 블록리스트 저장소 URL (미설정 시 인메모리)
//! - `JWT_SECRET_KEY`: JWT 서명 비밀 키 (필수)
//! - `JWT_ALGORITHM`: 서명 알고리즘 (HS256 | HS384 | HS512)
//! - `ACCESS_TOKEN_EXPIRY_SECS`, `REFRESH_TOKEN_EXPIRY_SECS`: 토큰 수명 (초)

use std::net::SocketAddr;

use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// 기본 Access Token 수명 (1시간).
pub const DEFAULT_ACCESS_TOKEN_EXPIRY_SECS: i64 = 3600;
/// 기본 Refresh Token 수명 (2일).
pub const DEFAULT_REFRESH_TOKEN_EXPIRY_SECS: i64 = 2 * 24 * 3600;

/// 토큰 수명 상한 (10년).
pub const MAX_TOKEN_EXPIRY_SECS: i64 = 10 * 365 * 24 * 3600;

/// 지원하는 JWT 서명 알고리즘 (공유 비밀 키 기반 HMAC만 허용).
pub const SUPPORTED_JWT_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// PostgreSQL 연결 URL
    #[serde(default)]
    pub database_url: Option<String>,
    /// 최대 DB 연결 수
    pub database_max_connections: u32,
    /// 블록리스트 Redis URL
    #[serde(default)]
    pub redis_url: Option<String>,
    /// JWT 서명 비밀 키 (`Debug` 출력 시 가려짐)
    pub jwt_secret_key: SecretString,
    /// JWT 서명 알고리즘
    pub jwt_algorithm: String,
    /// Access Token 수명 (초)
    pub access_token_expiry_secs: i64,
    /// Refresh Token 수명 (초)
    pub refresh_token_expiry_secs: i64,
    /// 로그 형식 (pretty, json, compact)
    pub log_format: String,
    /// 허용 CORS origin 목록 (쉼표 구분)
    #[serde(default)]
    pub cors_origins: Option<String>,
}

impl AppConfig {
    /// 기본값이 채워진 빌더를 반환합니다.
    ///
    /// `jwt_secret_key`는 기본값이 없으므로 소스 중 하나에서 반드시 제공되어야 합니다.
    pub fn builder() -> CoreResult<ConfigBuilder<DefaultState>> {
        let builder = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("database_max_connections", 10)?
            .set_default("jwt_algorithm", "HS256")?
            .set_default("access_token_expiry_secs", DEFAULT_ACCESS_TOKEN_EXPIRY_SECS)?
            .set_default("refresh_token_expiry_secs", DEFAULT_REFRESH_TOKEN_EXPIRY_SECS)?
            .set_default("log_format", "pretty")?;
        Ok(builder)
    }

    /// 완성된 빌더에서 설정을 만들고 검증합니다.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> CoreResult<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load() -> CoreResult<Self> {
        let builder = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::default().try_parsing(true));
        Self::from_builder(builder)
    }

    /// 설정 값 검증.
    pub fn validate(&self) -> CoreResult<()> {
        if self.jwt_secret_key.expose_secret().trim().is_empty() {
            return Err(CoreError::Config("JWT_SECRET_KEY가 비어 있습니다".to_string()));
        }
        if !SUPPORTED_JWT_ALGORITHMS.contains(&self.jwt_algorithm.as_str()) {
            return Err(CoreError::Config(format!(
                "지원하지 않는 JWT 알고리즘: {} (지원: {})",
                self.jwt_algorithm,
                SUPPORTED_JWT_ALGORITHMS.join(", ")
            )));
        }
        if self.access_token_expiry_secs <= 0 || self.refresh_token_expiry_secs <= 0 {
            return Err(CoreError::Config("토큰 수명은 0보다 커야 합니다".to_string()));
        }
        if self.access_token_expiry_secs > MAX_TOKEN_EXPIRY_SECS
            || self.refresh_token_expiry_secs > MAX_TOKEN_EXPIRY_SECS
        {
            return Err(CoreError::Config(format!(
                "토큰 수명은 {}초를 넘을 수 없습니다",
                MAX_TOKEN_EXPIRY_SECS
            )));
        }
        Ok(())
    }

    /// 소켓 주소 반환.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
