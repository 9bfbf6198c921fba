//! Query operation kinds seen by the rewriter.
//!
//! The host pipeline tags every intercepted call with an operation name such
//! as `"create"` or `"findMany"`. Only the write kinds listed here carry
//! payloads that may need identifiers; everything else is collected under
//! [`Operation::Other`] and passes through untouched.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operation kind of an intercepted query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Create,
    CreateMany,
    Update,
    UpdateMany,
    Upsert,
    /// Any operation the rewriter does not touch (`findMany`, `delete`, ...).
    #[serde(untagged)]
    Other(String),
}

impl Operation {
    /// Wire name of the operation as used by the host.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::CreateMany => "createMany",
            Self::Update => "update",
            Self::UpdateMany => "updateMany",
            Self::Upsert => "upsert",
            Self::Other(name) => name,
        }
    }

    /// Whether payloads written under this operation are inserts and
    /// therefore receive generated identifiers.
    #[must_use]
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Create | Self::CreateMany)
    }

    /// Whether the top-level dispatch rewrites arguments for this operation.
    #[must_use]
    pub fn is_rewritten(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl FromStr for Operation {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "create" => Self::Create,
            "createMany" => Self::CreateMany,
            "update" => Self::Update,
            "updateMany" => Self::UpdateMany,
            "upsert" => Self::Upsert,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<&str> for Operation {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(op) => op,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_write_operations() {
        assert_eq!(Operation::from("create"), Operation::Create);
        assert_eq!(Operation::from("createMany"), Operation::CreateMany);
        assert_eq!(Operation::from("update"), Operation::Update);
        assert_eq!(Operation::from("updateMany"), Operation::UpdateMany);
        assert_eq!(Operation::from("upsert"), Operation::Upsert);
    }

    #[test]
    fn unknown_names_become_other() {
        let op = Operation::from("findMany");
        assert_eq!(op, Operation::Other("findMany".to_string()));
        assert!(!op.is_rewritten());
        assert!(!op.is_insert());
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert_eq!(Operation::from("Create"), Operation::Other("Create".to_string()));
    }

    #[test]
    fn only_create_kinds_are_inserts() {
        assert!(Operation::Create.is_insert());
        assert!(Operation::CreateMany.is_insert());
        assert!(!Operation::Update.is_insert());
        assert!(!Operation::UpdateMany.is_insert());
        assert!(!Operation::Upsert.is_insert());
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(Operation::CreateMany.to_string(), "createMany");
        assert_eq!(Operation::Other("deleteMany".into()).to_string(), "deleteMany");
    }

    #[test]
    fn serde_uses_host_names() {
        let json = serde_json::to_string(&Operation::UpdateMany).expect("serialize");
        assert_eq!(json, "\"updateMany\"");

        let op: Operation = serde_json::from_str("\"upsert\"").expect("deserialize");
        assert_eq!(op, Operation::Upsert);

        let op: Operation = serde_json::from_str("\"aggregate\"").expect("deserialize");
        assert_eq!(op, Operation::Other("aggregate".to_string()));
    }
}
