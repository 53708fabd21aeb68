use ark_bn254::Fr;
use blake_hash::{Blake512, Digest};
use num_bigint::BigUint;

use crate::crypto::babyjub::{sub_order, Point, BASE8, SUB_ORDER};
use crate::crypto::keys::{digest_to_scalar, priv_key_digest, scalar_to_fr, to_bytes32_le};
use crate::hash::{hash5, PoseidonError};
use crate::types::fr_to_biguint;

/// An EdDSA-Poseidon signature over Baby Jubjub.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signature
{
    /// The commitment point `r · BASE8`.
    pub r8: Point,

    /// The response scalar, below the subgroup order.
    pub s: Fr,
}

/// Signs `msg` with the raw private key `priv_key`.
pub fn sign(priv_key: &Fr, msg: &Fr) -> Result<Signature, PoseidonError>
{
    let order = sub_order();
    let (scalar, prefix) = priv_key_digest(priv_key);
    let s = BigUint::from_bytes_le(&scalar);
    let pub_key = BASE8.mul(&(&s >> 3u32));

    let mut hasher = Blake512::new();
    hasher.update(&prefix);
    hasher.update(&to_bytes32_le(msg));
    let r = digest_to_scalar(&hasher.finalize(), &order);

    let r8 = BASE8.mul(&r);
    let hm = fr_to_biguint(&hash5([r8.x, r8.y, pub_key.x, pub_key.y, *msg])?);
    let response = (r + hm * s) % &order;

    Ok(Signature { r8, s: scalar_to_fr(&response) })
}

/// Checks `S · BASE8 == R8 + (8 · hm) · A` where
/// `hm = H(R8.x, R8.y, A.x, A.y, msg)`.
pub fn verify(msg: &Fr, signature: &Signature, pub_key: &Point) -> bool
{
    if !signature.r8.in_curve() || !pub_key.in_curve() { return false; }

    if signature.s >= SUB_ORDER { return false; }
    let s = fr_to_biguint(&signature.s);

    let Ok(hm) = hash5([signature.r8.x, signature.r8.y, pub_key.x, pub_key.y, *msg]) else { return false };

    let left = BASE8.mul(&s);
    let right = signature.r8.add(&pub_key.mul(&(fr_to_biguint(&hm) * 8u32)));

    left == right
}
