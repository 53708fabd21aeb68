use ark_bn254::Fr;
use ark_ff::Zero;

use crate::crypto::Point;
use crate::hash::{hash2, hash5, poseidon, PoseidonError};

/// The number of words of a message ciphertext carrying a command.
pub const MESSAGE_LENGTH: usize = 7;

/// The longest ciphertext accepted into a log.
pub const MAX_MESSAGE_LENGTH: usize = 9;

/// An entry of a hash chained message log.
#[derive(Clone, Debug, PartialEq)]
pub struct Message
{
    /// The encrypted command.
    pub ciphertext: Vec<Fr>,

    /// The ephemeral key the ciphertext was encrypted with.
    pub enc_pub_key: Point,

    /// The hash of the preceding message, zero for the first.
    pub prev_hash: Fr,

    /// The chain value after this message.
    pub hash: Fr,
}

impl Message
{
    pub fn new(ciphertext: Vec<Fr>, enc_pub_key: Point, prev_hash: Fr) -> Result<Self, PoseidonError>
    {
        let hash = hash_message_and_enc_pub_key(&ciphertext, &enc_pub_key, &prev_hash)?;
        Ok(Message { ciphertext, enc_pub_key, prev_hash, hash })
    }

    /// The message used to pad a batch.
    pub fn empty() -> Self
    {
        Message {
            ciphertext: vec![Fr::zero(); MESSAGE_LENGTH],
            enc_pub_key: Point::default(),
            prev_hash: Fr::zero(),
            hash: Fr::zero(),
        }
    }
}

/// `H2(H5(ciphertext[0..5]), H(ciphertext[5..], enc_pub_key, prev_hash))`.
pub fn hash_message_and_enc_pub_key(
    ciphertext: &[Fr],
    enc_pub_key: &Point,
    prev_hash: &Fr
) -> Result<Fr, PoseidonError>
{
    if ciphertext.len() < 5
    {
        return Err(PoseidonError::InvalidNumberOfInputs {
            inputs: ciphertext.len(),
            max_limit: MAX_MESSAGE_LENGTH,
            width: MESSAGE_LENGTH,
        });
    }

    let left = hash5([ciphertext[0], ciphertext[1], ciphertext[2], ciphertext[3], ciphertext[4]])?;

    let mut inputs = ciphertext[5..].to_vec();
    inputs.extend_from_slice(&[enc_pub_key.x, enc_pub_key.y, *prev_hash]);
    let right = poseidon(&inputs)?;

    hash2([left, right])
}
