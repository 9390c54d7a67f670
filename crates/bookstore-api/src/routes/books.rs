//! 도서 관리 endpoint.
//!
//! 모든 엔드포인트는 유효한 Access Token과 `admin` 또는 `user` 역할이 필요합니다.
//!
//! - `GET /books` - 전체 도서 목록 (최신순)
//! - `POST /books` - 도서 등록 (소유자 = 호출자)
//! - `GET /books/{book_uid}` - 도서 조회
//! - `PATCH /books/{book_uid}` - 도서 부분 수정
//! - `DELETE /books/{book_uid}` - 도서 삭제
//! - `GET /user/{user_uid}` - 사용자가 등록한 도서 목록

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use bookstore_core::{Book, BookChanges, NewBook};

use crate::auth::BookAccess;
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 도서 등록 요청.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookCreateRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
    #[validate(length(min = 1))]
    pub publisher: String,
    /// YYYY-MM-DD
    pub published_date: NaiveDate,
    #[validate(range(min = 1))]
    pub page_count: i32,
    #[validate(length(min = 1))]
    pub language: String,
}

impl From<BookCreateRequest> for NewBook {
    fn from(req: BookCreateRequest) -> Self {
        NewBook {
            title: req.title,
            author: req.author,
            publisher: req.publisher,
            published_date: req.published_date,
            page_count: req.page_count,
            language: req.language,
        }
    }
}

/// 도서 부분 수정 요청 (PATCH).
///
/// 전달된 필드에는 등록 요청과 같은 검증 규칙이 적용됩니다.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookUpdateRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub author: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub publisher: Option<String>,
    /// YYYY-MM-DD
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub page_count: Option<i32>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub language: Option<String>,
}

impl From<BookUpdateRequest> for BookChanges {
    fn from(req: BookUpdateRequest) -> Self {
        BookChanges {
            title: req.title,
            author: req.author,
            publisher: req.publisher,
            published_date: req.published_date,
            page_count: req.page_count,
            language: req.language,
        }
    }
}

const BOOK: &str = "도서";

/// 전체 도서 목록.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "도서 목록 (최신순)", body = Vec<Book>),
        (status = 401, description = "인증 실패", body = ApiErrorResponse),
        (status = 403, description = "권한 부족", body = ApiErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    _access: BookAccess,
) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(state.books.list().await?))
}

/// 도서 등록.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookCreateRequest,
    responses(
        (status = 201, description = "등록 완료", body = Book),
        (status = 422, description = "입력 검증 실패", body = ApiErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    BookAccess(caller): BookAccess,
    Json(req): Json<BookCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let owner = caller.user().uid;
    let book = state.books.insert(owner, req.into()).await?;
    info!(book_uid = %book.uid, owner = %owner, "Book created");

    Ok((StatusCode::CREATED, Json(book)))
}

/// 도서 조회.
#[utoipa::path(
    get,
    path = "/api/v1/books/{book_uid}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("book_uid" = Uuid, Path, description = "도서 ID")),
    responses(
        (status = 200, description = "도서 상세", body = Book),
        (status = 404, description = "도서 없음", body = ApiErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    _access: BookAccess,
    Path(book_uid): Path<Uuid>,
) -> ApiResult<Json<Book>> {
    state
        .books
        .get(book_uid)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(BOOK))
}

/// 도서 부분 수정.
///
/// 전달된 필드만 변경되며 소유자는 변경되지 않습니다.
#[utoipa::path(
    patch,
    path = "/api/v1/books/{book_uid}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("book_uid" = Uuid, Path, description = "도서 ID")),
    request_body = BookUpdateRequest,
    responses(
        (status = 200, description = "수정된 도서", body = Book),
        (status = 404, description = "도서 없음", body = ApiErrorResponse),
        (status = 422, description = "입력 검증 실패", body = ApiErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    _access: BookAccess,
    Path(book_uid): Path<Uuid>,
    Json(req): Json<BookUpdateRequest>,
) -> ApiResult<Json<Book>> {
    req.validate()?;

    let changes = BookChanges::from(req);
    let book = state
        .books
        .update(book_uid, &changes)
        .await?
        .ok_or(ApiError::NotFound(BOOK))?;

    Ok(Json(book))
}

/// 도서 삭제.
#[utoipa::path(
    delete,
    path = "/api/v1/books/{book_uid}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("book_uid" = Uuid, Path, description = "도서 ID")),
    responses(
        (status = 204, description = "삭제 완료"),
        (status = 404, description = "도서 없음", body = ApiErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    _access: BookAccess,
    Path(book_uid): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.books.delete(book_uid).await? {
        return Err(ApiError::NotFound(BOOK));
    }

    info!(book_uid = %book_uid, "Book deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// 사용자가 등록한 도서 목록.
///
/// 존재하지 않는 사용자는 빈 목록을 반환합니다.
#[utoipa::path(
    get,
    path = "/api/v1/user/{user_uid}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("user_uid" = Uuid, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "사용자의 도서 목록 (최신순)", body = Vec<Book>)
    )
)]
pub async fn list_user_books(
    State(state): State<Arc<AppState>>,
    _access: BookAccess,
    Path(user_uid): Path<Uuid>,
) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(state.books.list_by_owner(user_uid).await?))
}

/// 도서 라우터 생성.
pub fn books_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{book_uid}",
            get(get_book).patch(update_book).delete(delete_book),
        )
        .route("/user/{user_uid}", get(list_user_books))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BookCreateRequest {
        BookCreateRequest {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            publisher: "Chilton".to_string(),
            published_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
            page_count: 412,
            language: "English".to_string(),
        }
    }

    #[test]
    fn test_book_create_request_validation() {
        assert!(request().validate().is_ok());

        let mut invalid = request();
        invalid.title = String::new();
        invalid.page_count = 0;

        let errors = invalid.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.field_errors().contains_key("page_count"));
    }

    #[test]
    fn test_book_update_request_validates_present_fields() {
        assert!(BookUpdateRequest::default().validate().is_ok());

        let req: BookUpdateRequest =
            serde_json::from_str(r#"{"title": "", "page_count": -5}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.field_errors().contains_key("page_count"));

        let req: BookUpdateRequest = serde_json::from_str(r#"{"page_count": 256}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(BookChanges::from(req).page_count, Some(256));
    }

    #[test]
    fn test_book_create_request_date_format() {
        let json = r#"{
            "title": "Dune", "author": "Frank Herbert", "publisher": "Chilton",
            "published_date": "1965-08-01", "page_count": 412, "language": "English"
        }"#;
        let req: BookCreateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.published_date, NaiveDate::from_ymd_opt(1965, 8, 1).unwrap());

        let bad = json.replace("1965-08-01", "01/08/1965");
        assert!(serde_json::from_str::<BookCreateRequest>(&bad).is_err());
    }
}
