//! Image intake pipeline components.
//!
//! Each path in a batch moves through these stages in order:
//! - **validate**: existence and MIME checks
//! - **hash**: content hashing for duplicate detection
//! - **compress**: downscale to the pixel budget and re-encode as JPEG
//! - **describe**: one time-bounded vision model call
//!
//! `storage` abstracts where bytes come from, `state` accumulates one batch,
//! and `intake` drives the whole thing.

pub mod compress;
pub mod describe;
pub mod hash;
pub mod intake;
pub mod state;
pub mod storage;
pub mod validate;

// Re-exports for convenient access
pub use compress::{ImageCodec, JpegCodec};
pub use describe::Describer;
pub use hash::Hasher;
pub use intake::VisionIntake;
pub use state::ProcessingState;
pub use storage::{LocalStorage, Storage};
pub use validate::Validator;
