//! 인증 endpoint.
//!
//! - `POST /signup` - 가입
//! - `POST /login` - 로그인 (Access + Refresh Token 발급)
//! - `POST /refresh-token` - Access Token 재발급
//! - `POST /logout` - 현재 Access Token 폐기

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use bookstore_core::User;

use crate::auth::{validate_password_strength, AccessToken, RefreshToken, TokenUser};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::metrics::{record_login, record_signup, record_token_revoked};
use crate::services::{IdentityError, Registration};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 가입 요청.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 21))]
    pub first_name: String,
    #[validate(length(min = 1, max = 21))]
    pub last_name: String,
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(email, length(max = 40))]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
}

impl From<SignupRequest> for Registration {
    fn from(req: SignupRequest) -> Self {
        Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// 로그인 요청.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: TokenUser,
}

/// Access Token 재발급 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// 단순 메시지 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== 핸들러 ====================

/// 가입.
///
/// POST /api/v1/signup
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "가입 완료", body = User),
        (status = 403, description = "이메일 또는 사용자 이름 중복", body = ApiErrorResponse),
        (status = 422, description = "입력 검증 실패", body = ApiErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let user = state.identity.register(req.into()).await?;
    record_signup();

    Ok((StatusCode::CREATED, Json(user)))
}

/// 로그인.
///
/// POST /api/v1/login
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 401, description = "잘못된 자격 증명", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = match state.identity.authenticate(&req.email, &req.password).await {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, IdentityError::InvalidCredentials) {
                record_login(false);
            }
            return Err(e.into());
        }
    };

    let token_user = TokenUser::from(&user);
    let pair = state.codec.mint_pair(&token_user)?;
    record_login(true);
    info!(uid = %user.uid, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: token_user,
    }))
}

/// Access Token 재발급.
///
/// 만료된 Refresh Token은 400 `INVALID_OR_EXPIRED_TOKEN`으로 거부됩니다.
///
/// POST /api/v1/refresh-token
#[utoipa::path(
    post,
    path = "/api/v1/refresh-token",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "새 Access Token", body = RefreshResponse),
        (status = 400, description = "만료된 Refresh Token", body = ApiErrorResponse),
        (status = 401, description = "유효하지 않거나 폐기된 토큰", body = ApiErrorResponse),
        (status = 403, description = "Access Token으로 요청", body = ApiErrorResponse)
    )
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    RefreshToken(claims): RefreshToken,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = state.codec.mint(&claims.user, None, false)?;
    Ok(Json(RefreshResponse { access_token }))
}

/// 로그아웃.
///
/// 제시된 Access Token의 `jti`를 남은 수명 동안 폐기합니다.
/// 같은 사용자의 다른 토큰에는 영향을 주지 않습니다.
///
/// POST /api/v1/logout
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "토큰 폐기 완료", body = MessageResponse),
        (status = 401, description = "유효하지 않거나 폐기된 토큰", body = ApiErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    AccessToken(claims): AccessToken,
) -> ApiResult<Json<MessageResponse>> {
    state
        .blocklist
        .revoke(&claims.jti, claims.remaining_lifetime())
        .await?;
    record_token_revoked();
    info!(uid = %claims.user.uid, jti = %claims.jti, "Token revoked on logout");

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
}
