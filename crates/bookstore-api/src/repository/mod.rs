//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리하여 관리합니다.
//! 각 저장소는 트레이트로 정의되며 PostgreSQL 구현과 인메모리 구현을 가집니다.
//! 인메모리 구현은 테스트 및 `DATABASE_URL` 미설정 환경에서 사용됩니다.

pub mod books;
pub mod schema;
pub mod users;

use async_trait::async_trait;
use uuid::Uuid;

use bookstore_core::{Book, BookChanges, NewBook, NewUser, User};

pub use books::{MemoryBookStore, PgBookStore};
pub use schema::init_schema;
pub use users::{MemoryUserStore, PgUserStore};

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 고유 제약 조건 위반
    #[error("중복된 레코드: {0}")]
    Duplicate(String),

    /// 저장된 값을 도메인 타입으로 변환할 수 없음
    #[error("잘못된 레코드: {0}")]
    InvalidRecord(String),

    #[error("데이터베이스 오류: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                // PostgreSQL 고유 제약 조건 위반
                StoreError::Duplicate(db_err.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 사용자 계정 저장소.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// 새 사용자 저장. 이메일 또는 사용자 이름이 중복되면 [`StoreError::Duplicate`].
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
}

/// 도서 저장소.
///
/// 목록 조회는 모두 `created_at` 내림차순(최신순)입니다.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Book>>;

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Book>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Book>>;

    async fn insert(&self, owner: Uuid, book: NewBook) -> StoreResult<Book>;

    /// 부분 수정. 도서가 없으면 `None`.
    async fn update(&self, id: Uuid, changes: &BookChanges) -> StoreResult<Option<Book>>;

    /// 삭제. 삭제된 행이 있으면 `true`.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}
