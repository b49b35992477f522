// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document integrity: SHA-256 fingerprints for uploaded documents and
// rendered reports.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of `data`.
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Leading 16 hex digits of a digest, as printed on a report seal.
pub fn short_fingerprint(hex_digest: &str) -> &str {
    hex_digest.get(..16).unwrap_or(hex_digest)
}

/// Whether `data` still hashes to `expected_hex` (either case).
pub fn matches_hash(data: &[u8], expected_hex: &str) -> bool {
    hash_bytes(data).eq_ignore_ascii_case(expected_hex)
}
