//! Strongly-typed ID wrappers
//!
//! Backup and resource ids are both plain integers on the wire; the newtypes
//! keep them from being swapped at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate integer ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Get the underlying integer
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            /// Accepts `42` as well as the prefixed form, e.g. `bkp-42`
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(BackupId, "bkp-");
define_id!(ResourceId, "res-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(BackupId::new(7).to_string(), "7");
        assert_eq!(ResourceId::new(42).to_string(), "42");
    }

    #[test]
    fn test_id_parse() {
        assert_eq!("42".parse::<ResourceId>().unwrap(), ResourceId::new(42));
        assert_eq!("res-42".parse::<ResourceId>().unwrap(), ResourceId::new(42));
        assert_eq!("bkp-3".parse::<BackupId>().unwrap(), BackupId::new(3));
        assert!("abc".parse::<BackupId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_integer() {
        let json = serde_json::to_string(&BackupId::new(12)).unwrap();
        assert_eq!(json, "12");
        let back: BackupId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BackupId::new(12));
    }
}
