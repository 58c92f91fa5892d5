//! Cache key derivation.
//!
//! A key is the intrinsic attributes sorted lexicographically and joined with
//! [`KEY_SEPARATOR`]. Sorting makes the key order-insensitive, so
//! `["red", "BMW"]` and `["BMW", "red"]` share one key.

use itertools::Itertools;
use std::borrow::Borrow;
use std::fmt;

pub const KEY_SEPARATOR: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive<S: AsRef<str>>(attributes: &[S]) -> Self {
        let joined = attributes
            .iter()
            .map(<S as AsRef<str>>::as_ref)
            .sorted()
            .join(KEY_SEPARATOR);
        CacheKey(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
