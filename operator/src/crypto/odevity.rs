//! ElGamal encryption over Baby Jubjub with the plaintext carried in the
//! x-coordinate of a point. Only the parity of a decryption is meaningful to
//! the engine: an odd value marks a deactivated key.
use ark_bn254::Fr;
use ark_ff::Zero;
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};

use crate::crypto::babyjub::{Point, BASE8};
use crate::crypto::keys::{gen_static_random_key, Keypair};
use crate::hash::PoseidonError;
use crate::types::{fr_to_biguint, is_odd};

/// Domain tag separating odevity encodings from other static keys.
pub const ODEVITY_TAG: u64 = 20041;

/// A value represented as a curve point and the offset from its x-coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedMessage
{
    /// A random curve point.
    pub point: Point,

    /// `point.x - value`.
    pub x_increment: Fr,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ciphertext
{
    /// `r · BASE8`.
    pub c1: Point,

    /// `encoded + r · pub_key`.
    pub c2: Point,

    /// The offset of the encoded point.
    pub x_increment: Fr,
}

impl Ciphertext
{
    /// A ciphertext from its four public coordinates, as stored in a state leaf.
    pub fn from_coordinates(coordinates: [Fr; 4]) -> Self
    {
        Ciphertext {
            c1: Point::new(coordinates[0], coordinates[1]),
            c2: Point::new(coordinates[2], coordinates[3]),
            x_increment: Fr::zero(),
        }
    }

    pub fn coordinates(&self) -> [Fr; 4]
    {
        [self.c1.x, self.c1.y, self.c2.x, self.c2.y]
    }
}

pub fn encode_to_message(value: &Fr, random_key: &Keypair) -> EncodedMessage
{
    EncodedMessage {
        point: random_key.pub_key,
        x_increment: random_key.pub_key.x - value,
    }
}

pub fn decode_message(encoded: &EncodedMessage) -> Fr
{
    encoded.point.x - encoded.x_increment
}

fn encrypt_point(point: &Point, x_increment: Fr, pub_key: &Point, r: &BigUint) -> Ciphertext
{
    Ciphertext {
        c1: BASE8.mul(r),
        c2: point.add(&pub_key.mul(r)),
        x_increment,
    }
}

/// Encrypts `plaintext` to `pub_key` with randomness `r`, encoding it through
/// a freshly sampled keypair.
pub fn encrypt<R: RngCore + CryptoRng>(
    plaintext: &Fr,
    pub_key: &Point,
    r: &BigUint,
    rng: &mut R
) -> Ciphertext
{
    let encoded = encode_to_message(plaintext, &Keypair::random(rng));
    encrypt_point(&encoded.point, encoded.x_increment, pub_key, r)
}

pub fn decrypt(formatted_priv_key: &BigUint, ciphertext: &Ciphertext) -> Fr
{
    let shared = ciphertext.c1.mul(formatted_priv_key);
    let point = shared.negate().add(&ciphertext.c2);

    decode_message(&EncodedMessage { point, x_increment: ciphertext.x_increment })
}

/// Encrypts a point whose x-coordinate has the requested parity. The point
/// is chosen deterministically from `r`, so the ciphertext is a pure
/// function of its arguments.
pub fn encrypt_odevity(is_odd_value: bool, pub_key: &Point, r: &Fr) -> Result<Ciphertext, PoseidonError>
{
    let mut index = 0u64;
    let point = loop
    {
        let candidate = Keypair::from_private(gen_static_random_key(r, ODEVITY_TAG, index)?).pub_key;
        if is_odd(&candidate.x) == is_odd_value { break candidate; }
        index += 1;
    };

    Ok(encrypt_point(&point, Fr::zero(), pub_key, &fr_to_biguint(r)))
}

/// Whether the decryption of `ciphertext` is odd.
pub fn decrypt_odevity(formatted_priv_key: &BigUint, ciphertext: &Ciphertext) -> bool
{
    is_odd(&decrypt(formatted_priv_key, ciphertext))
}

/// Re-randomizes a ciphertext without changing its plaintext.
pub fn rerandomize(pub_key: &Point, ciphertext: &Ciphertext, r: &BigUint) -> Ciphertext
{
    Ciphertext {
        c1: ciphertext.c1.add(&BASE8.mul(r)),
        c2: ciphertext.c2.add(&pub_key.mul(r)),
        x_increment: ciphertext.x_increment,
    }
}
