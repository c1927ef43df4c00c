use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity category of whoever is driving the dashboard.
///
/// The set is closed: anything outside it is rejected when parsed, so downstream
/// code can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Local government unit staff.
    #[serde(rename = "LGU")]
    Lgu,
    #[serde(rename = "BusinessOwner")]
    BusinessOwner,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}' (expected LGU or BusinessOwner)")]
pub struct RoleParseError(pub String);

impl Role {
    pub const ALL: [Role; 2] = [Role::Lgu, Role::BusinessOwner];

    /// Literal used on the wire and in persisted storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Lgu => "LGU",
            Role::BusinessOwner => "BusinessOwner",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(t))
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_literals() {
        assert_eq!("LGU".parse::<Role>().unwrap(), Role::Lgu);
        assert_eq!("BusinessOwner".parse::<Role>().unwrap(), Role::BusinessOwner);
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(" lgu ".parse::<Role>().unwrap(), Role::Lgu);
        assert_eq!("businessowner".parse::<Role>().unwrap(), Role::BusinessOwner);
    }

    #[test]
    fn rejects_values_outside_the_set() {
        for bad in ["", "Admin", "LGU2", "Business Owner"] {
            let err = bad.parse::<Role>().unwrap_err();
            assert_eq!(err.0, bad);
        }
    }

    #[test]
    fn serde_uses_wire_literals() {
        assert_eq!(serde_json::to_string(&Role::Lgu).unwrap(), "\"LGU\"");
        let r: Role = serde_json::from_str("\"BusinessOwner\"").unwrap();
        assert_eq!(r, Role::BusinessOwner);
        assert_eq!(Role::BusinessOwner.to_string(), "BusinessOwner");
    }
}
