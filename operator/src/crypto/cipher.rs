//! Poseidon duplex encryption of message plaintexts under an ECDH key.
use ark_bn254::Fr;
use ark_ff::Zero;
use num_bigint::BigUint;
use num_traits::One;

use crate::crypto::babyjub::Point;
use crate::error::CipherError;
use crate::hash::Poseidon;
use crate::types::biguint_to_fr;

/// The width of the duplex state: one capacity lane and a rate of three.
const STATE_WIDTH: usize = 4;

/// The number of message words absorbed per permutation.
const RATE: usize = 3;

/// The ciphertext length for a plaintext of `length` words.
pub fn ciphertext_length(length: usize) -> usize
{
    length.div_ceil(RATE) * RATE + 1
}

fn initial_state(key: &Point, nonce: &BigUint, length: usize) -> Result<[Fr; STATE_WIDTH], CipherError>
{
    let two_128 = BigUint::one() << 128u32;
    if *nonce >= two_128 { Err(CipherError::InvalidNonce)? }

    let domain = biguint_to_fr(&(nonce + BigUint::from(length) * two_128));
    Ok([Fr::zero(), key.x, key.y, domain])
}

/// Encrypts `plaintext` under the shared `key` and `nonce`.
pub fn encrypt(plaintext: &[Fr], key: &Point, nonce: &BigUint) -> Result<Vec<Fr>, CipherError>
{
    let permutation = Poseidon::circom(STATE_WIDTH)?;
    let mut state = initial_state(key, nonce, plaintext.len())?.to_vec();

    let mut message = plaintext.to_vec();
    while message.len() % RATE > 0 { message.push(Fr::zero()); }

    let mut ciphertext = Vec::with_capacity(ciphertext_length(plaintext.len()));
    for block in message.chunks(RATE)
    {
        state = permutation.permute(&state)?;
        for (lane, word) in block.iter().enumerate()
        {
            state[lane + 1] += word;
            ciphertext.push(state[lane + 1]);
        }
    }

    state = permutation.permute(&state)?;
    ciphertext.push(state[1]);

    Ok(ciphertext)
}

/// Decrypts a ciphertext of a `length` word plaintext, checking the zero
/// padding and the trailing authentication word.
pub fn decrypt(ciphertext: &[Fr], key: &Point, nonce: &BigUint, length: usize) -> Result<Vec<Fr>, CipherError>
{
    if ciphertext.len() != ciphertext_length(length)
    {
        Err(CipherError::InvalidLength { length, actual: ciphertext.len() })?
    }

    let permutation = Poseidon::circom(STATE_WIDTH)?;
    let mut state = initial_state(key, nonce, length)?.to_vec();

    let blocks = ciphertext.len() / RATE;
    let mut message = Vec::with_capacity(blocks * RATE);
    for block in ciphertext[..blocks * RATE].chunks(RATE)
    {
        state = permutation.permute(&state)?;
        for (lane, word) in block.iter().enumerate()
        {
            message.push(*word - state[lane + 1]);
            state[lane + 1] = *word;
        }
    }

    if message[length..].iter().any(|word| !word.is_zero())
    {
        Err(CipherError::NonZeroPadding)?
    }

    state = permutation.permute(&state)?;
    if ciphertext[blocks * RATE] != state[1]
    {
        Err(CipherError::AuthenticationFailed)?
    }

    message.truncate(length);
    Ok(message)
}
