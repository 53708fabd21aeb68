pub mod poseidon;

pub use poseidon::{Poseidon, PoseidonError, PoseidonHasher, HASH_LEN};

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use sha2::{Digest, Sha256};

/// Circom compatible Poseidon hash of an arbitrary (1..=12) number of inputs.
pub fn poseidon(inputs: &[Fr]) -> Result<Fr, PoseidonError>
{
    Poseidon::with_arity(inputs.len())?.hash(inputs)
}

pub fn hash2(inputs: [Fr; 2]) -> Result<Fr, PoseidonError>
{
    poseidon(&inputs)
}

pub fn hash3(inputs: [Fr; 3]) -> Result<Fr, PoseidonError>
{
    poseidon(&inputs)
}

pub fn hash4(inputs: [Fr; 4]) -> Result<Fr, PoseidonError>
{
    poseidon(&inputs)
}

pub fn hash5(inputs: [Fr; 5]) -> Result<Fr, PoseidonError>
{
    poseidon(&inputs)
}

/// Binds an ordered list of public values into the single public input a
/// circuit checks: every value is laid out as a 32-byte big-endian word, the
/// concatenation is digested with SHA-256 and the digest is reduced into the
/// scalar field.
pub fn sha256_input_hash(values: &[Fr]) -> Fr
{
    let mut hasher = Sha256::new();
    for value in values
    {
        hasher.update(to_bytes32_be(value));
    }
    Fr::from_be_bytes_mod_order(&hasher.finalize())
}

/// The canonical 32-byte big-endian encoding of a field element.
pub fn to_bytes32_be(value: &Fr) -> [u8; HASH_LEN]
{
    let bytes = value.into_bigint().to_bytes_be();
    let mut word = [0u8; HASH_LEN];
    word[HASH_LEN - bytes.len()..].copy_from_slice(&bytes);
    word
}
