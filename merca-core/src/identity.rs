use serde::{Deserialize, Serialize};

/// Caller role as established by the session-verification layer.
///
/// `System` is reserved for internal callers (the expiry sweep and the
/// conversion job) and is never minted for an external session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Retailer,
    SalesRep,
    Admin,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Retailer => write!(f, "retailer"),
            Role::SalesRep => write!(f, "sales_rep"),
            Role::Admin => write!(f, "admin"),
            Role::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retailer" => Ok(Role::Retailer),
            "sales_rep" => Ok(Role::SalesRep),
            "admin" => Ok(Role::Admin),
            "system" => Ok(Role::System),
            _ => Err(format!(
                "Invalid role: {}. Use retailer, sales_rep, admin, or system",
                s
            )),
        }
    }
}

impl Role {
    /// Staff roles may act on any company's records.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::SalesRep | Role::Admin | Role::System)
    }
}

/// An already-authenticated caller. The engine trusts this identity; it
/// performs role checks but never re-verifies the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// The internal actor used by batch jobs.
    pub fn system() -> Self {
        Self {
            user_id: "system".to_string(),
            role: Role::System,
        }
    }
}
