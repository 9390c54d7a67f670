//! Bearer 토큰 검증 추출기.
//!
//! Access/Refresh 두 가지 검증 모두 하나의 파이프라인을 거치며
//! 기대하는 [`TokenKind`]만 다릅니다.
//!
//! 1. `Authorization: Bearer <token>` 헤더 추출
//! 2. 서명/알고리즘/만료 검증 (만료된 Refresh Token은 400)
//! 3. 블록리스트 조회
//! 4. 토큰 종류 확인
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn refresh_handler(RefreshToken(claims): RefreshToken) -> impl IntoResponse {
//!     format!("refresh for {}", claims.user.email)
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use super::{AuthError, JwtError, TokenClaims, TokenKind};
use crate::error::ApiError;
use crate::state::AppState;

/// `Authorization` 헤더에서 Bearer 토큰을 꺼냅니다.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingCredentials)
}

/// 토큰 검증 파이프라인.
///
/// 블록리스트 저장소 장애는 인증 거부가 아닌 내부 오류로 전파됩니다.
pub async fn verify_token(
    state: &AppState,
    token: &str,
    expected: TokenKind,
) -> Result<TokenClaims, ApiError> {
    let claims = state
        .codec
        .decode(token)
        .map_err(|e| decode_rejection(e, expected))?;

    if state.blocklist.is_revoked(&claims.jti).await? {
        debug!(jti = %claims.jti, "Revoked token presented");
        return Err(AuthError::TokenRevoked.into());
    }

    if claims.kind() != expected {
        debug!(
            expected = expected.as_str(),
            actual = claims.kind().as_str(),
            "Token type mismatch"
        );
        return Err(AuthError::WrongTokenType.into());
    }

    Ok(claims)
}

/// 디코딩 실패를 거부 사유로 변환.
///
/// Refresh 경로에서 만료된 토큰은 재로그인이 필요하다는 의미로 400을 반환합니다.
fn decode_rejection(error: JwtError, expected: TokenKind) -> ApiError {
    debug!(error = %error, expected = expected.as_str(), "Token decode failed");
    match (error, expected) {
        (JwtError::Expired, TokenKind::Refresh) => ApiError::ExpiredToken,
        _ => AuthError::InvalidToken.into(),
    }
}

async fn verify_request(
    parts: &Parts,
    state: &AppState,
    expected: TokenKind,
) -> Result<TokenClaims, ApiError> {
    let token = bearer_token(&parts.headers)?;
    verify_token(state, token, expected).await
}

/// 검증된 Access Token.
#[derive(Debug, Clone)]
pub struct AccessToken(pub TokenClaims);

impl FromRequestParts<Arc<AppState>> for AccessToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        verify_request(parts, state, TokenKind::Access)
            .await
            .map(AccessToken)
    }
}

/// 검증된 Refresh Token.
#[derive(Debug, Clone)]
pub struct RefreshToken(pub TokenClaims);

impl FromRequestParts<Arc<AppState>> for RefreshToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        verify_request(parts, state, TokenKind::Refresh)
            .await
            .map(RefreshToken)
    }
}
