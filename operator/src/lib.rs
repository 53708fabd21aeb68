//! Coordinator state engine for MACI style voting rounds with key
//! deactivation. The engine ingests sign ups and encrypted message logs,
//! applies them to quinary merkle trees and emits the per batch circuit
//! inputs a prover needs.


pub mod crypto;
pub mod error;
pub mod hash;
pub mod maci;
pub mod tree;
pub mod types;

pub use error::{MaciError, Result};
pub use maci::{Maci, MaciConfig, MaciProvider, MaciState};
