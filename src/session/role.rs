use serde::{Deserialize, Serialize};

/// Privilege tier of an operator.
///
/// The upstream speaks raw integers (1, 10, 100); those only exist at the
/// serde boundary. Everything inside the crate compares the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Role {
    Standard,
    Operator,
    Admin,
}

impl Role {
    pub const fn wire_value(self) -> i64 {
        match self {
            Role::Standard => 1,
            Role::Operator => 10,
            Role::Admin => 100,
        }
    }

    /// Upstream profiles are not ours to reject; unknown tiers get the least privilege.
    pub fn from_wire_lossy(value: i64) -> Self {
        Role::try_from(value).unwrap_or(Role::Standard)
    }

    pub fn is_admin(self) -> bool {
        self >= Role::Operator
    }
}

impl TryFrom<i64> for Role {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Standard),
            10 => Ok(Role::Operator),
            100 => Ok(Role::Admin),
            other => Err(format!("unknown role value {other}")),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role.wire_value()
    }
}
