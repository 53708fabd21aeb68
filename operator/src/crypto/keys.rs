use ark_bn254::Fr;
use ark_ff::{BigInteger, MontFp, PrimeField, Zero};
use blake_hash::{Blake512, Digest};
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};

use crate::crypto::babyjub::{Point, BASE8, SUB_ORDER};
use crate::hash::{hash2, hash3, to_bytes32_be, PoseidonError};
use crate::types::{biguint_to_fr, fr_to_biguint};

/// `2^256 mod p`: 256-bit samples below this value are rejected so that the
/// reduction into the field is uniform.
pub const RANDOM_KEY_BIAS_FLOOR: Fr = MontFp!("6350874878119819312338956282401532410528162663560392320966563075034087161851");

/// A private/public keypair of a coordinator or participant.
#[derive(Clone, Debug, PartialEq)]
pub struct Keypair
{
    /// The raw private scalar.
    pub priv_key: Fr,

    /// The public key, `formatted_priv_key · BASE8`.
    pub pub_key: Point,

    /// The private key in the form the curve expects for ECDH and signing.
    pub formatted_priv_key: BigUint,
}

impl Keypair
{
    pub fn from_private(priv_key: Fr) -> Self
    {
        let formatted_priv_key = format_priv_key_for_babyjub(&priv_key);
        let pub_key = BASE8.mul(&formatted_priv_key);
        Keypair { priv_key, pub_key, formatted_priv_key }
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self
    {
        Self::from_private(gen_random_key(rng))
    }

    /// The hash of the public key which every circuit input hash binds.
    pub fn pub_key_hash(&self) -> Result<Fr, PoseidonError>
    {
        hash2(self.pub_key.as_array())
    }

    /// The ECDH point shared with the holder of `pub_key`.
    pub fn shared_key(&self, pub_key: &Point) -> Point
    {
        gen_ecdh_shared_key(&self.formatted_priv_key, pub_key)
    }
}

/// Derives a keypair from `priv_key`, or from a fresh random scalar.
pub fn gen_keypair<R: RngCore + CryptoRng>(priv_key: Option<Fr>, rng: &mut R) -> Keypair
{
    match priv_key
    {
        Some(priv_key) => Keypair::from_private(priv_key),
        None => Keypair::random(rng),
    }
}

/// A uniformly distributed field element, sampled without modulo bias.
pub fn gen_random_key<R: RngCore + CryptoRng>(rng: &mut R) -> Fr
{
    let floor = fr_to_biguint(&RANDOM_KEY_BIAS_FLOOR);
    let mut bytes = [0u8; 32];

    loop
    {
        rng.fill_bytes(&mut bytes);
        let sample = BigUint::from_bytes_be(&bytes);
        if sample >= floor { return Fr::from_be_bytes_mod_order(&bytes); }
    }
}

/// A deterministic pseudo-random scalar below the subgroup order, derived
/// from `seed` for the given domain `tag` and `index`.
pub fn gen_static_random_key(seed: &Fr, tag: u64, index: u64) -> Result<Fr, PoseidonError>
{
    let tag = Fr::from(tag);
    let index = Fr::from(index);

    let mut key = hash3([*seed, tag, index])?;
    while key >= SUB_ORDER
    {
        key = hash3([key, tag, index])?;
    }

    Ok(key)
}

/// The BLAKE-512 digest of the 32-byte big-endian private key, split into the
/// pruned scalar half and the nonce prefix half.
pub(crate) fn priv_key_digest(priv_key: &Fr) -> ([u8; 32], [u8; 32])
{
    let digest = Blake512::digest(&to_bytes32_be(priv_key));

    let mut scalar = [0u8; 32];
    let mut prefix = [0u8; 32];
    scalar.copy_from_slice(&digest[..32]);
    prefix.copy_from_slice(&digest[32..]);

    scalar[0] &= 0xF8;
    scalar[31] &= 0x7F;
    scalar[31] |= 0x40;

    (scalar, prefix)
}

/// Hash, prune and shift the raw private key into the scalar used with `BASE8`.
pub fn format_priv_key_for_babyjub(priv_key: &Fr) -> BigUint
{
    let (scalar, _) = priv_key_digest(priv_key);
    BigUint::from_bytes_le(&scalar) >> 3u32
}

/// `formatted_priv_key · pub_key`, or the identity if the shared point has a
/// zero x-coordinate.
pub fn gen_ecdh_shared_key(formatted_priv_key: &BigUint, pub_key: &Point) -> Point
{
    let shared = pub_key.mul(formatted_priv_key);
    if shared.x.is_zero() { return Point::identity(); }
    shared
}

/// Little-endian bytes of a field element, as fed into the signing nonce.
pub(crate) fn to_bytes32_le(value: &Fr) -> [u8; 32]
{
    let bytes = value.into_bigint().to_bytes_le();
    let mut word = [0u8; 32];
    word[..bytes.len()].copy_from_slice(&bytes);
    word
}

/// Reduces a little-endian digest modulo `order`.
pub(crate) fn digest_to_scalar(digest: &[u8], order: &BigUint) -> BigUint
{
    BigUint::from_bytes_le(digest) % order
}

pub(crate) fn scalar_to_fr(scalar: &BigUint) -> Fr
{
    biguint_to_fr(scalar)
}
