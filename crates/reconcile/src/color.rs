//! Deterministic label colour derivation.

use sha2::{Digest, Sha256};

/// Derives the colour for a product label from its API shortname.
///
/// The colour is the first 6 hex characters of the SHA-256 digest of the
/// shortname, lowercase. Identical input yields identical output across
/// processes and runs, which keeps a recomputed desired label equal to one an
/// earlier run already applied. Distinct shortnames may collide; no
/// uniqueness is promised or needed.
pub fn assign(shortname: &str) -> String {
    let digest = Sha256::digest(shortname.as_bytes());
    hex::encode(&digest[..3])
}
