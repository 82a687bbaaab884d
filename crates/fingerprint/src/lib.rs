//! # Fingerprint
//!
//! Reproducibility fingerprints for a run: one over the whole configuration,
//! one over the calibration payload. Both are FNV-1a 64-bit digests rendered
//! as 16 lowercase hex digits and written into every event log header.
//!
//! Not cryptographic. The only guarantees are stability across runs and
//! platforms, and sensitivity to every hashed field.

mod fnv;
mod hash;

pub use fnv::{to_hex, Fnv1a64};
pub use hash::{compute_calibration_hash, compute_config_hash};
