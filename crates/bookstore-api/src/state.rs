//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::auth::{MemoryBlocklist, TokenBlocklist, TokenCodec};
use crate::repository::{BookStore, MemoryBookStore, MemoryUserStore, PgBookStore, PgUserStore};
use crate::services::IdentityService;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 가입/로그인 및 사용자 조회
    pub identity: IdentityService,

    /// 도서 저장소
    pub books: Arc<dyn BookStore>,

    /// 토큰 발급/검증기
    pub codec: Arc<TokenCodec>,

    /// 폐기된 토큰 레지스트리
    pub blocklist: Arc<dyn TokenBlocklist>,

    /// 데이터베이스 연결 풀 (인메모리 모드에서는 None)
    pub db_pool: Option<PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 모든 저장소를 프로세스 메모리에 두는 상태.
    ///
    /// 테스트와 `DATABASE_URL`/`REDIS_URL`이 없는 로컬 실행에 사용됩니다.
    pub fn in_memory(codec: TokenCodec) -> Self {
        Self {
            identity: IdentityService::new(Arc::new(MemoryUserStore::new())),
            books: Arc::new(MemoryBookStore::new()),
            codec: Arc::new(codec),
            blocklist: Arc::new(MemoryBlocklist::new()),
            db_pool: None,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// PostgreSQL 저장소로 교체.
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.identity = IdentityService::new(Arc::new(PgUserStore::new(pool.clone())));
        self.books = Arc::new(PgBookStore::new(pool.clone()));
        self.db_pool = Some(pool);
        self
    }

    /// 블록리스트 저장소 교체.
    pub fn with_blocklist(mut self, blocklist: Arc<dyn TokenBlocklist>) -> Self {
        self.blocklist = blocklist;
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        if let Some(pool) = &self.db_pool {
            sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
        } else {
            false
        }
    }

    /// 블록리스트 저장소 연결 상태 확인.
    pub async fn is_blocklist_healthy(&self) -> bool {
        self.blocklist.health_check().await
    }
}
