//! Re-evaluation over captured answers.
//!
//! When the scoring calibration changes, historical runs are rescored from
//! the answers already on disk — no answer engine is ever queried again.
//! This crate owns the storage seam ([`RunStore`]) and the driver that walks
//! a run: score every captured answer, replace every stored score, then
//! replace the run aggregate, strictly in that order.

pub mod driver;
pub mod store;

pub use driver::{ReevalDriver, ReevalError, ReevalReport};
pub use store::{JsonRunStore, MemoryRunStore, RunSnapshot, RunStore, StoreError, StoredScore};
