//! 사용자 역할.
//!
//! 두 가지 고정 역할만 존재하며, 허용 역할 집합을 빠짐없이 검사할 수 있도록
//! 닫힌 열거형으로 정의합니다.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 사용자 역할.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 일반 사용자 (가입 시 기본값)
    #[default]
    User,
    /// 관리자
    Admin,
}

impl Role {
    /// 모든 역할 목록.
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    /// 저장소에 기록되는 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// 역할이 허용 목록에 포함되는지 확인.
    pub fn is_one_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(CoreError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_default_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");

        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);
    }

    #[test]
    fn test_role_round_trips_through_storage_text() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_is_one_of() {
        assert!(Role::User.is_one_of(&[Role::Admin, Role::User]));
        assert!(!Role::User.is_one_of(&[Role::Admin]));
        assert!(!Role::Admin.is_one_of(&[]));
    }

    proptest! {
        #[test]
        fn prop_role_parse_round_trip(idx in 0usize..2, upper in any::<bool>()) {
            let role = Role::ALL[idx];
            let text = if upper { role.as_str().to_uppercase() } else { role.to_string() };
            prop_assert_eq!(text.parse::<Role>().unwrap(), role);
        }

        #[test]
        fn prop_unknown_role_rejected(s in "[a-z]{1,12}") {
            prop_assume!(s != "user" && s != "admin");
            prop_assert!(s.parse::<Role>().is_err());
        }
    }
}
