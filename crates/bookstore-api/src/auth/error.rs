//! 인증/인가 거부 사유.

use axum::http::StatusCode;

/// 인증/인가 거부 사유.
///
/// 응답 본문에는 사유 코드만 노출되며 토큰 형식 오류, 서명 오류, 만료는 구분되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Authorization 헤더가 없거나 Bearer 형식이 아님
    #[error("인증 토큰이 필요합니다")]
    MissingCredentials,
    /// 디코딩 실패 (서명/알고리즘/만료/형식) 또는 토큰의 사용자가 존재하지 않음
    #[error("유효하지 않거나 만료된 토큰입니다")]
    InvalidToken,
    /// 블록리스트에 등록된 토큰
    #[error("폐기된 토큰입니다")]
    TokenRevoked,
    /// Access 자리에 Refresh Token, 또는 그 반대
    #[error("잘못된 종류의 토큰입니다")]
    WrongTokenType,
    /// 로그인 실패 (사용자 없음과 비밀번호 불일치를 구분하지 않음)
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,
    /// 역할 불충분
    #[error("권한이 부족합니다")]
    Forbidden,
}

impl AuthError {
    /// 기계 판독용 사유 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "MISSING_CREDENTIALS",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenRevoked => "TOKEN_REVOKED",
            AuthError::WrongTokenType => "WRONG_TOKEN_TYPE",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Forbidden => "FORBIDDEN",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::WrongTokenType | AuthError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::MissingCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenRevoked.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::WrongTokenType.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::Forbidden.status(), StatusCode::FORBIDDEN);
    }
}
