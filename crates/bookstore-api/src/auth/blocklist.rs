//! 토큰 블록리스트 (폐기 레지스트리).
//!
//! 폐기된 토큰의 `jti`를 토큰 잔여 수명만큼만 보관합니다.
//! 항목이 없으면 유효한 토큰으로 간주합니다.
//!
//! 저장 키는 반드시 `jti`별로 구분됩니다. 고정 키 하나에 기록하면
//! 토큰 하나를 폐기했을 때 모든 토큰이 폐기된 것처럼 보이게 됩니다.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

/// 블록리스트 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum BlocklistError {
    #[error("블록리스트 저장소 오류: {0}")]
    Store(#[from] redis::RedisError),
}

/// 폐기된 토큰 ID 저장소.
#[async_trait]
pub trait TokenBlocklist: Send + Sync {
    /// 저장소 이름 (로그/헬스 체크용).
    fn backend(&self) -> &'static str;

    /// `jti`를 `ttl` 동안 폐기 상태로 기록합니다. `ttl`이 0이면 기록하지 않습니다.
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), BlocklistError>;

    /// `jti`가 폐기되었는지 확인합니다.
    async fn is_revoked(&self, jti: &str) -> Result<bool, BlocklistError>;

    /// 저장소 연결 상태 확인.
    async fn health_check(&self) -> bool {
        true
    }
}

/// 블록리스트 저장 키.
pub fn blocklist_key(jti: &str) -> String {
    format!("blocklist:jti:{}", jti)
}

// ==================== Redis ====================

/// Redis 기반 블록리스트.
///
/// `SET key "" EX ttl`로 기록하고 `EXISTS`로 조회합니다. 만료는 Redis가 처리합니다.
#[derive(Clone)]
pub struct RedisBlocklist {
    connection: ConnectionManager,
}

impl RedisBlocklist {
    pub async fn connect(url: &str) -> Result<Self, BlocklistError> {
        info!("Connecting to Redis blocklist...");

        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        info!("Redis blocklist connection established");
        Ok(Self { connection })
    }
}

#[async_trait]
impl TokenBlocklist for RedisBlocklist {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), BlocklistError> {
        let ttl_secs = ttl.as_secs();
        if ttl_secs == 0 {
            debug!(jti, "Token already expired, skipping blocklist entry");
            return Ok(());
        }

        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(blocklist_key(jti), "", ttl_secs).await?;
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, BlocklistError> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(blocklist_key(jti)).await?;
        Ok(exists)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        matches!(result.as_deref(), Ok("PONG"))
    }
}

// ==================== In-memory ====================

/// 프로세스 내 블록리스트.
///
/// 테스트 및 `REDIS_URL` 미설정 환경에서 사용합니다. 만료된 항목은 조회/기록 시 정리됩니다.
#[derive(Default)]
pub struct MemoryBlocklist {
    entries: RwLock<HashMap<String, Instant>>,
}

impl MemoryBlocklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// 만료되지 않은 항목 수.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|expires_at| **expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TokenBlocklist for MemoryBlocklist {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), BlocklistError> {
        if ttl.as_secs() == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(blocklist_key(jti), now + ttl);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, BlocklistError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&blocklist_key(jti))
            .is_some_and(|expires_at| *expires_at > Instant::now()))
    }
}
