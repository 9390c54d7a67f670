//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 가입 시 요구되는 최소 비밀번호 길이.
pub const MIN_PASSWORD_LEN: usize = 6;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패: {0}")]
    HashingFailed(String),
}

/// 비밀번호 해싱.
///
/// 호출마다 새 솔트를 생성하므로 같은 입력이라도 결과가 달라집니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (예: `$argon2id$v=19$m=19456,t=2,p=1$...`)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 해시 형식이 잘못된 경우에도 에러 대신 `false`를 반환합니다.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// 비밀번호 길이 검증 (`validator` 커스텀 함수).
pub fn validate_password_strength(password: &str) -> Result<(), validator::ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        let mut err = validator::ValidationError::new("password_too_short");
        err.message = Some(format!("비밀번호는 최소 {}자 이상이어야 합니다", MIN_PASSWORD_LEN).into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("secret123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hash1 = hash_password("Password1").unwrap();
        let hash2 = hash_password("Password1").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("Password1", &hash1));
        assert!(verify_password("Password1", &hash2));
    }

    #[test]
    fn test_malformed_hash_is_false_not_error() {
        assert!(!verify_password("password", "not-a-valid-hash"));
        assert!(!verify_password("password", ""));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("abcdef").is_ok());
        assert!(validate_password_strength("abc").is_err());
        assert!(validate_password_strength("").is_err());
        // 바이트가 아닌 문자 수 기준
        assert!(validate_password_strength("비밀번호좋아").is_ok());
    }

    proptest! {
        // Argon2가 느리므로 케이스 수를 줄임
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_verify_accepts_only_original(p in "[ -~]{6,24}", q in "[ -~]{6,24}") {
            let hash = hash_password(&p).unwrap();
            prop_assert!(verify_password(&p, &hash));
            if p != q {
                prop_assert!(!verify_password(&q, &hash));
            }
        }
    }
}
