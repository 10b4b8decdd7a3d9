//! Staff Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 员工角色 (封闭枚举)
///
/// 每个角色对应一个广播频道，连接成功后自动加入本角色频道。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Waiter,
    Kitchen,
    Cashier,
    Admin,
}

impl StaffRole {
    /// All roles, in channel order
    pub const ALL: [StaffRole; 4] = [
        StaffRole::Waiter,
        StaffRole::Kitchen,
        StaffRole::Cashier,
        StaffRole::Admin,
    ];

    /// Role channel name
    pub fn channel(&self) -> &'static str {
        match self {
            StaffRole::Waiter => "waiter",
            StaffRole::Kitchen => "kitchen",
            StaffRole::Cashier => "cashier",
            StaffRole::Admin => "admin",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.channel())
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiter" => Ok(StaffRole::Waiter),
            "kitchen" => Ok(StaffRole::Kitchen),
            "cashier" => Ok(StaffRole::Cashier),
            "admin" => Ok(StaffRole::Admin),
            other => Err(format!("Unknown staff role: {}", other)),
        }
    }
}

/// Staff entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub username: String,
    pub role: StaffRole,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in StaffRole::ALL {
            let parsed: StaffRole = role.channel().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("chef".parse::<StaffRole>().is_err());
    }
}
