//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/signup`, `/api/v1/login`, `/api/v1/refresh-token`, `/api/v1/logout` - 인증
//! - `/api/v1/books` - 도서 관리
//! - `/api/v1/user/{user_uid}` - 사용자별 도서 목록
//! - `/api-docs/openapi.json` - OpenAPI 문서

pub mod auth;
pub mod books;
pub mod health;

pub use auth::{
    auth_router, LoginRequest, LoginResponse, MessageResponse, RefreshResponse, SignupRequest,
};
pub use books::{books_router, BookCreateRequest, BookUpdateRequest};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};

use axum::{routing::get, Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    let api_v1 = Router::new().merge(auth_router()).merge(books_router());

    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1", api_v1)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}
