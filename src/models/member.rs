use serde::{Deserialize, Serialize};

/// Role granted to a member. Controls every authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum RoleType {
    User,
    Admin,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::User => "USER",
            RoleType::Admin => "ADMIN",
        }
    }
}

/// A registered member as stored in the database. Never serialized to a
/// response body; `MemberResponse` is the outward shape.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub password_hash: String, // bcrypt hash, never the plain password
    pub role: RoleType,
}

/// The authenticated identity for one request, resolved from a validated
/// token and the member row behind its subject. Passed explicitly through
/// call signatures; nothing is resolved from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub role: RoleType,
}

impl From<&Member> for Principal {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            username: member.username.clone(),
            role: member.role,
        }
    }
}
