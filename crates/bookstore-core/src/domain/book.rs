//! 도서 레코드.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 저장된 도서.
///
/// 소유자(`user_uid`)는 생성 시 인증된 호출자로 한 번 설정되며 이후 변경되지 않습니다.
/// 소유자가 없는 기존 레코드를 위해 nullable입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Book {
    pub uid: Uuid,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub language: String,
    /// 소유 사용자 ID
    pub user_uid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 새 도서 입력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub language: String,
}

impl NewBook {
    /// 소유자와 서버 타임스탬프를 채워 `Book`으로 변환.
    pub fn into_book(self, uid: Uuid, owner: Uuid, now: DateTime<Utc>) -> Book {
        Book {
            uid,
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            published_date: self.published_date,
            page_count: self.page_count,
            language: self.language,
            user_uid: Some(owner),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 도서 부분 수정 입력 (PATCH).
///
/// `None` 필드는 기존 값을 유지합니다. 소유자는 수정 대상이 아닙니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct BookChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub page_count: Option<i32>,
    #[serde(default)]
    pub language: Option<String>,
}

impl BookChanges {
    /// 변경 필드가 하나도 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.published_date.is_none()
            && self.page_count.is_none()
            && self.language.is_none()
    }

    /// 변경 사항을 적용하고 `updated_at`을 갱신합니다.
    ///
    /// `updated_at`은 `created_at`보다 이전으로 내려가지 않습니다.
    pub fn apply_to(&self, book: &mut Book, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(publisher) = &self.publisher {
            book.publisher = publisher.clone();
        }
        if let Some(date) = self.published_date {
            book.published_date = date;
        }
        if let Some(pages) = self.page_count {
            book.page_count = pages;
        }
        if let Some(language) = &self.language {
            book.language = language.clone();
        }
        book.updated_at = now.max(book.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn new_book() -> NewBook {
        NewBook {
            title: "The Pragmatic Programmer".to_string(),
            author: "Hunt & Thomas".to_string(),
            publisher: "Addison-Wesley".to_string(),
            published_date: NaiveDate::from_ymd_opt(1999, 10, 20).unwrap(),
            page_count: 352,
            language: "English".to_string(),
        }
    }

    #[test]
    fn test_into_book_sets_owner_and_timestamps() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let book = new_book().into_book(Uuid::new_v4(), owner, now);

        assert_eq!(book.user_uid, Some(owner));
        assert_eq!(book.created_at, now);
        assert_eq!(book.updated_at, now);
    }

    #[test]
    fn test_apply_partial_changes() {
        let now = Utc::now();
        let mut book = new_book().into_book(Uuid::new_v4(), Uuid::new_v4(), now);
        let changes = BookChanges {
            page_count: Some(400),
            language: Some("Korean".to_string()),
            ..Default::default()
        };

        changes.apply_to(&mut book, now + Duration::seconds(5));

        assert_eq!(book.page_count, 400);
        assert_eq!(book.language, "Korean");
        assert_eq!(book.title, "The Pragmatic Programmer");
        assert!(book.updated_at > book.created_at);
    }

    #[test]
    fn test_apply_is_idempotent_on_fields() {
        let now = Utc::now();
        let mut book = new_book().into_book(Uuid::new_v4(), Uuid::new_v4(), now);
        let changes = BookChanges {
            title: Some("Second Edition".to_string()),
            ..Default::default()
        };

        changes.apply_to(&mut book, now);
        let first = book.clone();
        changes.apply_to(&mut book, now);

        assert_eq!(first, book);
    }

    #[test]
    fn test_updated_at_never_precedes_created_at() {
        let now = Utc::now();
        let mut book = new_book().into_book(Uuid::new_v4(), Uuid::new_v4(), now);

        BookChanges::default().apply_to(&mut book, now - Duration::hours(1));

        assert!(book.updated_at >= book.created_at);
    }

    #[test]
    fn test_empty_changes() {
        assert!(BookChanges::default().is_empty());
        let changes: BookChanges = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert!(!changes.is_empty());
    }

    proptest! {
        #[test]
        fn prop_updated_at_never_precedes_created_at(
            offset_secs in -86_400i64..86_400,
            pages in proptest::option::of(1i32..5000),
        ) {
            let created = Utc::now();
            let mut book = new_book().into_book(Uuid::new_v4(), Uuid::new_v4(), created);
            let changes = BookChanges { page_count: pages, ..Default::default() };

            changes.apply_to(&mut book, created + Duration::seconds(offset_secs));

            prop_assert!(book.updated_at >= book.created_at);
            prop_assert_eq!(book.created_at, created);
            prop_assert_eq!(book.page_count, pages.unwrap_or(352));
        }
    }
}
