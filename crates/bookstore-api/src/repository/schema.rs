//! 테이블 스키마 초기화.

use sqlx::PgPool;
use tracing::info;

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        uid UUID PRIMARY KEY,
        username VARCHAR(32) NOT NULL UNIQUE,
        email VARCHAR(40) NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name VARCHAR(21) NOT NULL,
        last_name VARCHAR(21) NOT NULL,
        is_verified BOOLEAN NOT NULL DEFAULT FALSE,
        role VARCHAR(16) NOT NULL DEFAULT 'user',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_BOOKS: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        uid UUID PRIMARY KEY,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        publisher TEXT NOT NULL,
        published_date DATE NOT NULL,
        page_count INTEGER NOT NULL,
        language TEXT NOT NULL,
        user_uid UUID REFERENCES users(uid) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_BOOKS_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_books_user_uid ON books (user_uid, created_at DESC)";

/// 테이블이 없으면 생성합니다.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in [CREATE_USERS, CREATE_BOOKS, CREATE_BOOKS_OWNER_INDEX] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema ready");
    Ok(())
}
