//! Book Repository
//!
//! 도서 CRUD 및 소유자별 조회.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use bookstore_core::{Book, BookChanges, NewBook};

use super::{BookStore, StoreResult};

// ================================================================================================
// PostgreSQL
// ================================================================================================

/// books 테이블 레코드
#[derive(Debug, Clone, FromRow)]
struct BookRow {
    uid: Uuid,
    title: String,
    author: String,
    publisher: String,
    published_date: NaiveDate,
    page_count: i32,
    language: String,
    #[sqlx(default)]
    user_uid: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            uid: row.uid,
            title: row.title,
            author: row.author,
            publisher: row.publisher,
            published_date: row.published_date,
            page_count: row.page_count,
            language: row.language,
            user_uid: row.user_uid,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL 도서 저장소
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>("SELECT * FROM books ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            "SELECT * FROM books WHERE user_uid = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE uid = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Book::from))
    }

    async fn insert(&self, owner: Uuid, book: NewBook) -> StoreResult<Book> {
        let book = book.into_book(Uuid::new_v4(), owner, Utc::now());

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (
                uid, title, author, publisher, published_date, page_count, language,
                user_uid, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(book.uid)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.published_date)
        .bind(book.page_count)
        .bind(&book.language)
        .bind(book.user_uid)
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, id: Uuid, changes: &BookChanges) -> StoreResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE uid = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let mut book = Book::from(current);
        changes.apply_to(&mut book, Utc::now());

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books
            SET title = $2, author = $3, publisher = $4, published_date = $5,
                page_count = $6, language = $7, updated_at = $8
            WHERE uid = $1
            RETURNING *
            "#,
        )
        .bind(book.uid)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.published_date)
        .bind(book.page_count)
        .bind(&book.language)
        .bind(book.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE uid = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ================================================================================================
// In-memory
// ================================================================================================

/// 인메모리 도서 저장소
#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<HashMap<Uuid, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut books: Vec<Book>) -> Vec<Book> {
    books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    books
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let books = self.books.read().await.values().cloned().collect();
        Ok(newest_first(books))
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Book>> {
        let books = self
            .books
            .read()
            .await
            .values()
            .filter(|b| b.user_uid == Some(owner))
            .cloned()
            .collect();
        Ok(newest_first(books))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Book>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn insert(&self, owner: Uuid, book: NewBook) -> StoreResult<Book> {
        let book = book.into_book(Uuid::new_v4(), owner, Utc::now());
        self.books.write().await.insert(book.uid, book.clone());
        Ok(book)
    }

    async fn update(&self, id: Uuid, changes: &BookChanges) -> StoreResult<Option<Book>> {
        let mut books = self.books.write().await;
        let Some(book) = books.get_mut(&id) else {
            return Ok(None);
        };

        changes.apply_to(book, Utc::now());
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.books.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Ursula K. Le Guin".to_string(),
            publisher: "Ace".to_string(),
            published_date: NaiveDate::from_ymd_opt(1969, 3, 1).unwrap(),
            page_count: 286,
            language: "English".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_sets_owner() {
        let store = MemoryBookStore::new();
        let owner = Uuid::new_v4();

        let book = store.insert(owner, new_book("Left Hand")).await.unwrap();
        assert_eq!(book.user_uid, Some(owner));
        assert_eq!(store.get(book.uid).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryBookStore::new();
        let owner = Uuid::new_v4();

        let first = store.insert(owner, new_book("First")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.insert(owner, new_book("Second")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].uid, second.uid);
        assert_eq!(listed[1].uid, first.uid);
    }

    #[tokio::test]
    async fn test_list_by_owner_filters() {
        let store = MemoryBookStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.insert(alice, new_book("A")).await.unwrap();
        store.insert(bob, new_book("B")).await.unwrap();

        let books = store.list_by_owner(alice).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].user_uid, Some(alice));
        assert!(store.list_by_owner(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_partial_and_missing() {
        let store = MemoryBookStore::new();
        let book = store.insert(Uuid::new_v4(), new_book("Old")).await.unwrap();

        let changes = BookChanges {
            title: Some("New".to_string()),
            ..Default::default()
        };
        let updated = store.update(book.uid, &changes).await.unwrap().unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.author, book.author);
        assert_eq!(updated.user_uid, book.user_uid);
        assert!(updated.updated_at >= updated.created_at);

        assert!(store.update(Uuid::new_v4(), &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = MemoryBookStore::new();
        let book = store.insert(Uuid::new_v4(), new_book("Gone")).await.unwrap();

        assert!(store.delete(book.uid).await.unwrap());
        assert!(!store.delete(book.uid).await.unwrap());
        assert!(store.get(book.uid).await.unwrap().is_none());
    }
}
