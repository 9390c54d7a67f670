//! API 에러 및 HTTP 응답 매핑.
//!
//! 각 컴포넌트는 자체 에러 타입을 반환하고, HTTP 상태 코드로의 변환은
//! 이 모듈의 [`ApiError`]에서만 이루어집니다.
//!
//! # 응답 형식
//!
//! ```json
//! {
//!   "code": "NOT_FOUND",
//!   "message": "도서를 찾을 수 없습니다"
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::auth::{AuthError, BlocklistError, JwtError, PasswordError};
use crate::metrics::record_auth_rejection;
use crate::repository::StoreError;

/// API 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_TOKEN", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 상세 정보 (검증 실패 필드 등)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// API 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 입력 검증 실패 (422)
    #[error("입력 값이 올바르지 않습니다")]
    Validation(#[from] validator::ValidationErrors),

    /// 이메일/사용자 이름 중복 (403)
    #[error("이미 존재하는 사용자입니다")]
    Conflict,

    /// 인증/인가 거부 (401/403)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// 만료된 Refresh Token으로 갱신 시도 (400)
    #[error("유효하지 않거나 만료된 토큰입니다")]
    ExpiredToken,

    /// 리소스 없음 (404)
    #[error("{0}을(를) 찾을 수 없습니다")]
    NotFound(&'static str),

    /// 저장소/블록리스트/해싱 등 내부 오류 (500). 상세 내용은 로그에만 남깁니다.
    #[error("내부 서버 오류")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict => StatusCode::FORBIDDEN,
            ApiError::Auth(reason) => reason.status(),
            ApiError::ExpiredToken => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Conflict => "USER_EXISTS",
            ApiError::Auth(reason) => reason.code(),
            ApiError::ExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => ApiError::Conflict,
            other => ApiError::internal(other),
        }
    }
}

impl From<BlocklistError> for ApiError {
    fn from(err: BlocklistError) -> Self {
        ApiError::internal(err)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::internal(err)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            ApiError::Validation(errors) => ApiErrorResponse::new(code, self.to_string())
                .with_details(serde_json::to_value(errors).unwrap_or(Value::Null)),
            ApiError::Auth(reason) => {
                debug!(reason = code, "Request rejected");
                record_auth_rejection(reason.code());
                ApiErrorResponse::new(code, self.to_string())
            }
            ApiError::Internal(source) => {
                error!(error = ?source, "Internal error while handling request");
                ApiErrorResponse::new(code, self.to_string())
            }
            _ => ApiErrorResponse::new(code, self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_auth_error_is_opaque() {
        let response = ApiError::Auth(AuthError::InvalidToken).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["code"], "INVALID_TOKEN");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_source() {
        let response =
            ApiError::internal(anyhow::anyhow!("connection refused: 10.0.0.5:5432")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[test]
    fn test_store_duplicate_maps_to_conflict() {
        let err: ApiError = StoreError::Duplicate("users_email_key".to_string()).into();
        assert!(matches!(err, ApiError::Conflict));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::ExpiredToken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("도서").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Auth(AuthError::Forbidden).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_simple_response_serialization() {
        let json = serde_json::to_string(&ApiErrorResponse::new("NOT_FOUND", "없음")).unwrap();
        assert!(json.contains(r#""code":"NOT_FOUND""#));
        assert!(!json.contains("details"));
    }
}
