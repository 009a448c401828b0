use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-hex-char dataset fingerprint (spec §3). The hashing itself lives in
/// `chakra-integrity` (it needs `sha2`); this is just the typed wrapper so
/// every crate that carries a fingerprint around (engine results, run
/// summaries) shares one type instead of a bare `String`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DataFingerprint(pub String);

impl DataFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
