use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                $name(id)
            }
        }

        // Hash and Eq agree with `str`, Ord does not: look ids up by `&str`
        // in hash maps only, ordered maps must be queried with the id type.
        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                natural_cmp(&self.0, &other.0)
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
    };
}

string_id!(NodeId);
string_id!(LinkId);

/// Splits `h12` into `("h", Some(12))`. Ids without a trailing number,
/// or with one too large for `u64`, yield `None`.
pub fn split_numbered(id: &str) -> (&str, Option<u64>) {
    let cut = id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (prefix, digits) = id.split_at(cut);
    (prefix, digits.parse().ok())
}

/// Prefix first, then the numeric suffix as a number, then the raw text,
/// so `h2 < h10 < s1` and distinct strings never compare equal.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (pa, na) = split_numbered(a);
    let (pb, nb) = split_numbered(b);
    pa.cmp(pb)
        .then_with(|| na.cmp(&nb))
        .then_with(|| a.cmp(b))
}

/// Lowest `prefix<n>`, `n >= 1`, for which `taken` answers false.
pub fn lowest_free(prefix: &str, mut taken: impl FnMut(&str) -> bool) -> String {
    (1u64..)
        .map(|n| format!("{}{}", prefix, n))
        .find(|id| !taken(id))
        .unwrap_or_else(|| unreachable!("u64 ids exhausted"))
}
