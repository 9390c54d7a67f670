//! 사용자 계정.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// 저장된 사용자 계정.
///
/// `password_hash`는 외부로 직렬화되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct User {
    /// 사용자 고유 ID
    pub uid: Uuid,
    /// 사용자 이름 (고유)
    pub username: String,
    /// 이메일 (고유)
    pub email: String,
    /// PHC 형식 비밀번호 해시
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// 이메일 인증 여부 (현재 인증 흐름 없음, 항상 false)
    pub is_verified: bool,
    /// 사용자 역할
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 역할이 허용 목록에 포함되는지 확인.
    pub fn has_role_in(&self, allowed: &[Role]) -> bool {
        self.role.is_one_of(allowed)
    }
}

/// 저장 직전의 새 사용자 (비밀번호는 이미 해싱됨).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    /// 서버 측 기본값(역할 `user`, 미인증, 현재 시각)을 채워 `User`로 변환.
    pub fn into_user(self, uid: Uuid, now: DateTime<Utc>) -> User {
        User {
            uid,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            is_verified: false,
            role: Role::default(),
            created_at: now,
            updated_at: now,
        }
    }
}
