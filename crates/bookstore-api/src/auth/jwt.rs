//! JWT 토큰 처리.
//!
//! Access Token과 Refresh Token은 같은 코덱으로 발급/검증되며
//! `refresh` 플래그와 수명으로만 구분됩니다.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use bookstore_core::{AppConfig, User};

/// 토큰에 포함되는 사용자 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenUser {
    pub uid: Uuid,
    pub email: String,
}

impl From<&User> for TokenUser {
    fn from(user: &User) -> Self {
        Self {
            uid: user.uid,
            email: user.email.clone(),
        }
    }
}

/// 토큰 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT 페이로드.
///
/// `{ user: {uid, email}, exp, jti, refresh }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 사용자 정보
    pub user: TokenUser,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 발급마다 고유, 블록리스트 키로 사용
    pub jti: String,
    /// Refresh Token 여부
    pub refresh: bool,
}

impl TokenClaims {
    pub fn kind(&self) -> TokenKind {
        if self.refresh {
            TokenKind::Refresh
        } else {
            TokenKind::Access
        }
    }

    /// 만료 여부.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// 남은 수명. 이미 만료된 경우 0.
    pub fn remaining_lifetime(&self) -> std::time::Duration {
        let remaining = self.exp - Utc::now().timestamp();
        std::time::Duration::from_secs(remaining.max(0) as u64)
    }
}

/// 로그인 시 발급되는 토큰 쌍.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("유효하지 않은 토큰")]
    Invalid,
    #[error("지원하지 않는 서명 알고리즘: {0}")]
    UnsupportedAlgorithm(String),
}

/// 코덱 설정.
pub struct JwtSettings {
    pub secret: SecretString,
    pub algorithm: Algorithm,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl JwtSettings {
    /// 공유 비밀 키 기반 HMAC 알고리즘(HS256/HS384/HS512)만 허용합니다.
    pub fn new(secret: impl Into<String>, algorithm: &str) -> Result<Self, JwtError> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| JwtError::UnsupportedAlgorithm(algorithm.to_string()))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(JwtError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }

        let secret: String = secret.into();
        Ok(Self {
            secret: SecretString::new(secret.into_boxed_str()),
            algorithm,
            access_ttl: Duration::seconds(bookstore_core::config::DEFAULT_ACCESS_TOKEN_EXPIRY_SECS),
            refresh_ttl: Duration::seconds(bookstore_core::config::DEFAULT_REFRESH_TOKEN_EXPIRY_SECS),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, JwtError> {
        let mut settings = Self::new(config.jwt_secret_key.expose_secret(), &config.jwt_algorithm)?;
        settings.access_ttl = Duration::seconds(config.access_token_expiry_secs);
        settings.refresh_ttl = Duration::seconds(config.refresh_token_expiry_secs);
        Ok(settings)
    }
}

/// 서명된 만료 토큰의 발급/검증기.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(settings: JwtSettings) -> Self {
        let secret = settings.secret.expose_secret().as_bytes();

        // 헤더의 alg가 설정된 알고리즘과 다르면 거부 (algorithm confusion 방지)
        let mut validation = Validation::new(settings.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            algorithm: settings.algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// 토큰 발급.
    ///
    /// `lifetime`이 `None`이면 Access Token 기본 수명을 사용합니다.
    pub fn mint(
        &self,
        user: &TokenUser,
        lifetime: Option<Duration>,
        refresh: bool,
    ) -> Result<String, JwtError> {
        self.mint_at(user, lifetime.unwrap_or(self.access_ttl), refresh, Utc::now())
    }

    /// 발급 시각을 지정한 토큰 발급.
    pub(crate) fn mint_at(
        &self,
        user: &TokenUser,
        lifetime: Duration,
        refresh: bool,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = TokenClaims {
            user: user.clone(),
            exp: (issued_at + lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
            refresh,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(JwtError::from)
    }

    /// Access Token + Refresh Token 발급.
    pub fn mint_pair(&self, user: &TokenUser) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.mint(user, None, false)?,
            refresh_token: self.mint(user, Some(self.refresh_ttl), true)?,
        })
    }

    /// 토큰 디코딩 및 검증.
    ///
    /// 서명, 알고리즘, 만료 중 하나라도 실패하면 에러를 반환하며 부분 Claims는 반환하지 않습니다.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, JwtError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    pub(crate) const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    pub(crate) fn test_codec() -> TokenCodec {
        TokenCodec::new(JwtSettings::new(TEST_SECRET, "HS256").unwrap())
    }

    fn user() -> TokenUser {
        TokenUser {
            uid: Uuid::new_v4(),
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn test_mint_and_decode_access_token() {
        let codec = test_codec();
        let user = user();

        let token = codec.mint(&user, None, false).unwrap();
        let claims = codec.decode(&token).unwrap();

        assert_eq!(claims.user, user);
        assert!(!claims.refresh);
        assert_eq!(claims.kind(), TokenKind::Access);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_default_access_lifetime_is_one_hour() {
        let codec = test_codec();
        let token = codec.mint(&user(), None, false).unwrap();
        let claims = codec.decode(&token).unwrap();

        let remaining = claims.exp - Utc::now().timestamp();
        assert!((3595..=3600).contains(&remaining));
    }

    #[test]
    fn test_mint_pair() {
        let codec = test_codec();
        let pair = codec.mint_pair(&user()).unwrap();

        let access = codec.decode(&pair.access_token).unwrap();
        let refresh = codec.decode(&pair.refresh_token).unwrap();

        assert!(!access.refresh);
        assert!(refresh.refresh);
        assert!(refresh.exp > access.exp);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_jti_unique_per_mint() {
        let codec = test_codec();
        let user = user();

        let jtis: HashSet<String> = (0..50)
            .map(|_| {
                let token = codec.mint(&user, None, false).unwrap();
                codec.decode(&token).unwrap().jti
            })
            .collect();

        assert_eq!(jtis.len(), 50);
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = test_codec();
        let user = user();
        let lifetime = Duration::seconds(60);

        // L - ε 경과: 유효
        let issued = Utc::now() - lifetime + Duration::seconds(5);
        let token = codec.mint_at(&user, lifetime, false, issued).unwrap();
        assert!(codec.decode(&token).is_ok());

        // L + ε 경과: 만료
        let issued = Utc::now() - lifetime - Duration::seconds(5);
        let token = codec.mint_at(&user, lifetime, false, issued).unwrap();
        assert!(matches!(codec.decode(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = test_codec().mint(&user(), None, false).unwrap();
        let other = TokenCodec::new(
            JwtSettings::new("another-secret-key-for-testing-minimum-32", "HS256").unwrap(),
        );

        assert!(matches!(other.decode(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let hs512 = TokenCodec::new(JwtSettings::new(TEST_SECRET, "HS512").unwrap());
        let token = hs512.mint(&user(), None, false).unwrap();

        // 같은 비밀 키라도 알고리즘이 다르면 거부
        assert!(matches!(test_codec().decode(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_alg_none_rejected() {
        // {"alg":"none","typ":"JWT"} . {"user":{...},"exp":9999999999,"jti":"x","refresh":false} .
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.\
            eyJ1c2VyIjp7InVpZCI6IjAwMDAwMDAwLTAwMDAtMDAwMC0wMDAwLTAwMDAwMDAwMDAwMCIsImVtYWlsIjoiYUB4LmNvbSJ9LCJleHAiOjk5OTk5OTk5OTksImp0aSI6IngiLCJyZWZyZXNoIjpmYWxzZX0.";

        assert!(test_codec().decode(token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = test_codec();
        assert!(codec.decode("").is_err());
        assert!(codec.decode("invalid.token.here").is_err());
    }

    #[test]
    fn test_asymmetric_algorithm_unsupported() {
        assert!(matches!(
            JwtSettings::new(TEST_SECRET, "RS256"),
            Err(JwtError::UnsupportedAlgorithm(_))
        ));
        assert!(JwtSettings::new(TEST_SECRET, "none").is_err());
    }

    #[test]
    fn test_remaining_lifetime_never_negative() {
        let claims = TokenClaims {
            user: user(),
            exp: Utc::now().timestamp() - 100,
            jti: "expired".to_string(),
            refresh: false,
        };
        assert_eq!(claims.remaining_lifetime(), std::time::Duration::ZERO);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_decode_returns_minted_payload(
            email in "[a-z]{1,12}@[a-z]{1,8}\\.com",
            lifetime_secs in 1i64..(30 * 24 * 3600),
            refresh in any::<bool>(),
        ) {
            let codec = test_codec();
            let user = TokenUser { uid: Uuid::new_v4(), email };

            let token = codec.mint(&user, Some(Duration::seconds(lifetime_secs)), refresh).unwrap();
            let claims = codec.decode(&token).unwrap();

            prop_assert_eq!(claims.user, user);
            prop_assert_eq!(claims.refresh, refresh);
        }
    }
}
