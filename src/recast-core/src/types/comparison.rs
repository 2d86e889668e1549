//! String comparison modes.

use serde::{Deserialize, Serialize};

/// How two strings are compared for equality.
///
/// Both modes are locale independent: they compare Unicode scalar values,
/// optionally after simple uppercase mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringComparison {
    /// Exact comparison of scalar values.
    Ordinal,
    /// Scalar-by-scalar comparison after simple uppercase mapping. Strings of
    /// different lengths never compare equal.
    OrdinalIgnoreCase,
}

impl StringComparison {
    /// Compare two strings under this mode.
    pub fn equals(self, left: &str, right: &str) -> bool {
        match self {
            Self::Ordinal => left == right,
            Self::OrdinalIgnoreCase => {
                left.chars().count() == right.chars().count()
                    && left
                        .chars()
                        .zip(right.chars())
                        .all(|(l, r)| l == r || simple_uppercase(l) == simple_uppercase(r))
            }
        }
    }

    /// Name used when displaying a comparison call.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ordinal => "Ordinal",
            Self::OrdinalIgnoreCase => "OrdinalIgnoreCase",
        }
    }
}

/// Uppercase `c` when it maps to exactly one scalar value, otherwise keep it.
fn simple_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(mapped), None) => mapped,
        _ => c,
    }
}

impl std::fmt::Display for StringComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
