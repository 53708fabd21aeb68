//! Crate specific errors
use crate::hash::PoseidonError;
use crate::maci::MaciState;

/// Error types related to the quinary merkle trees.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum TreeError
{
    /// The leaf index does not address a leaf of the tree.
    #[error("Leaf index {index} is out of range for a tree of {capacity} leaves")]
    LeafIndexOutOfRange { index: u64, capacity: u64 },

    /// The requested depth cannot be held in memory.
    #[error("Tree depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: u8, max: u8 },

    /// The hash function did not succeed.
    #[error("Hashing a tree node failed: {0}")]
    HashFailed(#[from] PoseidonError),
}

/// Errors of the Poseidon duplex cipher.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CipherError
{
    /// The ciphertext does not have the length implied by the plaintext length.
    #[error("Ciphertext of {actual} words cannot hold a plaintext of {length} words")]
    InvalidLength { length: usize, actual: usize },

    /// Nonces are limited to 128 bits.
    #[error("Nonce must be smaller than 2^128")]
    InvalidNonce,

    /// The decrypted padding words are not zero.
    #[error("Decrypted padding is not zero")]
    NonZeroPadding,

    /// The trailing authentication word does not match.
    #[error("Ciphertext authentication failed")]
    AuthenticationFailed,

    /// The permutation could not be applied.
    #[error("Poseidon permutation failed: {0}")]
    Permutation(#[from] PoseidonError),
}

/// Errors which abort an engine operation. Rejected commands are not errors,
/// see [`crate::maci::CommandError`].
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MaciError
{
    /// The operation is not permitted in the current lifecycle state.
    #[error("Operation requires the {expected:?} period but the round is in {actual:?}")]
    Lifecycle { expected: MaciState, actual: MaciState },

    /// There is no unprocessed entry left for a batch.
    #[error("No unprocessed {0} left")]
    EmptyBatch(&'static str),

    /// The round configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The log has no room left in the tree that commits to it.
    #[error("The {log} log is full at {capacity} entries")]
    LogFull { log: &'static str, capacity: u64 },

    /// The message is malformed.
    #[error("Malformed message: {0}")]
    InvalidMessage(String),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Hash function error: {0}")]
    Hash(#[from] PoseidonError),

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

pub type Result<T> = core::result::Result<T, MaciError>;
