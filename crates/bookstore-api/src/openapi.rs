//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성하고
//! `/api-docs/openapi.json` 경로로 제공합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use bookstore_core::{Book, Role, User};

use crate::auth::TokenUser;
use crate::error::ApiErrorResponse;
use crate::routes::{
    BookCreateRequest, BookUpdateRequest, ComponentHealth, ComponentStatus, HealthResponse,
    LoginRequest, LoginResponse, MessageResponse, RefreshResponse, SignupRequest,
};

/// Bookstore API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstore API",
        version = "0.1.0",
        description = r#"
# Bookstore REST API

사용자 계정과 도서 목록을 관리하는 REST API입니다.

## 인증

`/signup`, `/login`을 제외한 API는 JWT Bearer 토큰이 필요합니다.
`Authorization: Bearer <token>` 헤더를 포함하세요.

- Access Token: 도서 API 및 `/logout`
- Refresh Token: `/refresh-token` 전용
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 가입, 로그인, 토큰 관리"),
        (name = "books", description = "도서 - 도서 CRUD")
    ),
    modifiers(&BearerAuth),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Common =====
            ApiErrorResponse,

            // ===== Auth =====
            SignupRequest,
            LoginRequest,
            LoginResponse,
            RefreshResponse,
            MessageResponse,
            TokenUser,
            User,
            Role,

            // ===== Books =====
            Book,
            BookCreateRequest,
            BookUpdateRequest,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::auth::refresh_token,
        crate::routes::auth::logout,

        crate::routes::books::list_books,
        crate::routes::books::create_book,
        crate::routes::books::get_book,
        crate::routes::books::update_book,
        crate::routes::books::delete_book,
        crate::routes::books::list_user_books,
    )
)]
pub struct ApiDoc;

/// `bearer_auth` 보안 스키마 등록.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_valid() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        assert!(json.contains("Bookstore API"));

        assert!(json.contains("/health/ready"));
        assert!(json.contains("/api/v1/login"));
        assert!(json.contains("/api/v1/refresh-token"));
        assert!(json.contains("/api/v1/books/{book_uid}"));
        assert!(json.contains("/api/v1/user/{user_uid}"));
        assert!(json.contains("bearer_auth"));
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(json.contains("HealthResponse"));
        assert!(json.contains("ApiErrorResponse"));
        assert!(json.contains("BookCreateRequest"));
        assert!(json.contains("LoginResponse"));
    }
}
