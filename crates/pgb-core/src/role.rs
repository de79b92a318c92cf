//! Migration roles and their ledger codes.
//!
//! Every discovered unit belongs to exactly one role. The role decides
//! history gating, bucket ordering inside a batch, and the single-char
//! code stored in the ledger's `type` column.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Functional category of a migration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Runs at the start of every forward batch
    Before,
    /// Content-addressed unit applied before versioned units
    RepeatableBefore,
    /// Versioned forward unit, applied at most once per version
    Up,
    /// Content-addressed unit re-applied whenever its hash changes
    Repeatable,
    /// Runs at the end of every forward batch
    After,
    /// Versioned rollback unit, paired with an applied Up record
    Down,
    /// Runs outside the batch transaction, after a successful batch
    Finalize,
}

/// All roles, in classifier prefix-matching priority order
pub const PREFIX_PRIORITY: [Role; 7] = [
    Role::Up,
    Role::Down,
    Role::Repeatable,
    Role::RepeatableBefore,
    Role::Before,
    Role::After,
    Role::Finalize,
];

impl Role {
    /// Single-char code stored in the ledger's `type` column
    pub fn code(&self) -> char {
        match self {
            Role::Before => 'B',
            Role::RepeatableBefore => 'P',
            Role::Up => 'U',
            Role::Repeatable => 'R',
            Role::After => 'A',
            Role::Down => 'D',
            Role::Finalize => 'F',
        }
    }

    /// Parse a ledger code back into a role
    pub fn from_code(code: char) -> Option<Role> {
        match code {
            'B' => Some(Role::Before),
            'P' => Some(Role::RepeatableBefore),
            'U' => Some(Role::Up),
            'R' => Some(Role::Repeatable),
            'A' => Some(Role::After),
            'D' => Some(Role::Down),
            'F' => Some(Role::Finalize),
            _ => None,
        }
    }

    /// Human-readable label used in script headers and listings
    pub fn label(&self) -> &'static str {
        match self {
            Role::Before => "BEFORE MIGRATIONS",
            Role::RepeatableBefore => "REPEATABLE BEFORE VERSION UP",
            Role::Up => "VERSION UP",
            Role::Repeatable => "REPEATABLE",
            Role::After => "AFTER MIGRATIONS",
            Role::Down => "VERSION DOWN",
            Role::Finalize => "FINALIZE",
        }
    }

    /// Ledger rank-recompute priority (unknown codes rank 6)
    pub fn rank(&self) -> u8 {
        match self {
            Role::Before => 1,
            Role::RepeatableBefore => 2,
            Role::Up => 3,
            Role::Repeatable => 4,
            Role::After => 5,
            Role::Down | Role::Finalize => 6,
        }
    }

    /// Roles that carry an extracted version
    pub fn is_versioned(&self) -> bool {
        matches!(self, Role::Up | Role::Down)
    }

    /// Roles gated by content hash rather than version
    pub fn is_repeatable_family(&self) -> bool {
        matches!(self, Role::Repeatable | Role::RepeatableBefore)
    }

    /// Roles that run on every invocation regardless of history
    pub fn always_runs(&self) -> bool {
        matches!(self, Role::Before | Role::After | Role::Finalize)
    }

    /// All role codes, for the ledger check constraint
    pub fn all_codes() -> Vec<char> {
        PREFIX_PRIORITY.iter().map(|r| r.code()).collect()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code().to_string())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Role::from_code(c).ok_or_else(|| D::Error::custom(format!("unknown role code '{c}'")))
            }
            _ => Err(D::Error::custom(format!("role code must be one char, got '{s}'"))),
        }
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
