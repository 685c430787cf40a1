//! Value Objects
//!
//! 識別子やルーム名など、値そのものが意味を持つドメインの型を定義します。
//! 生成時にバリデーションを行い、不正な値は `DomainError` として拒否します。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// 数値 ID の Value Object を定義するマクロ
///
/// リレーショナル DB の主キーに対応する正の整数のみを受け付ける。
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new id. Only positive values are accepted.
            pub fn new(value: i64) -> Result<Self, DomainError> {
                if value <= 0 {
                    return Err(DomainError::InvalidId {
                        kind: stringify!($name),
                        value,
                    });
                }
                Ok(Self(value))
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = DomainError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Quiz identifier
    QuizId
);
numeric_id!(
    /// User identifier (students and professors share the user table)
    UserId
);
numeric_id!(
    /// Professor identifier, used for the `professor_<id>` room
    ProfessorId
);
numeric_id!(
    /// Class identifier
    ClassId
);
numeric_id!(
    /// Question identifier
    QuestionId
);
numeric_id!(
    /// Answer option identifier
    OptionId
);

/// Opaque identifier of one realtime connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::EmptyField("session_id"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SessionId の生成を担う Factory
pub struct SessionIdFactory;

impl SessionIdFactory {
    /// Generate a new random session id (UUID v4).
    pub fn generate() -> SessionId {
        SessionId(uuid::Uuid::new_v4().to_string())
    }
}

/// Logical broadcast group.
///
/// The wire form is `user_<id>`, `quiz_<id>` or `professor_<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomName {
    User(UserId),
    Quiz(QuizId),
    Professor(ProfessorId),
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomName::User(id) => write!(f, "user_{}", id),
            RoomName::Quiz(id) => write!(f, "quiz_{}", id),
            RoomName::Professor(id) => write!(f, "professor_{}", id),
        }
    }
}

impl FromStr for RoomName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidRoomName(s.to_string());
        let (prefix, raw_id) = s.split_once('_').ok_or_else(invalid)?;
        let id: i64 = raw_id.parse().map_err(|_| invalid())?;

        match prefix {
            "user" => Ok(RoomName::User(UserId::new(id)?)),
            "quiz" => Ok(RoomName::Quiz(QuizId::new(id)?)),
            "professor" => Ok(RoomName::Professor(ProfessorId::new(id)?)),
            _ => Err(invalid()),
        }
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
