//! Content-addressed digests for drift detection
//!
//! Digests are a stable, non-cryptographic fingerprint of a step's raw
//! payload bytes. They are persisted in the resource status and compared on
//! the next reconciliation to decide which steps need re-execution.

use crate::step::Step;
use std::io::Cursor;

/// Compute the hex-encoded 64-bit digest of a byte slice.
///
/// Empty input digests to the empty string, which never equals a real
/// digest. The hash is the low 64 bits of murmur3 x64_128 with seed 0 and
/// carries no machine-local salt, so identical bytes produce identical
/// digests across restarts.
pub fn digest(data: &[u8]) -> String {
    if data.is_empty() {
        return String::new();
    }

    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3::murmur3_x64_128(&mut Cursor::new(data), 0).unwrap_or(0);
    format!("{:x}", hash as u64)
}

/// Fold the per-step digests of `steps` into a single fingerprint.
///
/// The fold runs in step order, so reordering steps changes the aggregate.
/// An empty step list (or one whose steps all have empty payloads) yields
/// the empty string.
pub fn aggregate_digest(steps: &[Step]) -> String {
    let mut buf = Vec::new();
    for step in steps {
        buf.extend_from_slice(step.digest().as_bytes());
    }
    digest(&buf)
}
