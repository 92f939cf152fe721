//! Structured logging for the sealer.
//!
//! # Telemetry invariants
//!
//! - **No secret material** (keys, salts, plaintext field values, envelopes)
//!   may appear in any log field. Log field paths and counts instead.
//! - `LOG_LEVEL` (default: `info`) sets the level for the sealer and the field
//!   cipher; dependencies log at `warn`. `RUST_LOG` overrides it when set.

pub mod init;

pub use init::init;
