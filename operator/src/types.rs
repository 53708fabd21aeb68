use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// The sibling values at each level of a quinary path, leaf level first.
pub type PathElements = Vec<[Fr; 4]>;

/// The ten field elements a circuit sees for a single state leaf:
/// `[pub_key.x, pub_key.y, balance, vote_root, nonce, d1.x, d1.y, d2.x, d2.y, 0]`.
pub type StateLeafValues = [Fr; 10];

/// The leaf index of a participant in the state tree.
pub type StateIndex = u64;

/// The index of an outcome in the vote option tree.
pub type VoteOptionIndex = u64;

pub fn fr_to_biguint(value: &Fr) -> BigUint
{
    BigUint::from_bytes_le(&value.into_bigint().to_bytes_le())
}

pub fn biguint_to_fr(value: &BigUint) -> Fr
{
    Fr::from_le_bytes_mod_order(&value.to_bytes_le())
}

/// Whether the canonical integer representative of `value` is odd.
pub fn is_odd(value: &Fr) -> bool
{
    value.into_bigint().is_odd()
}

/// Serialization of field elements as decimal strings, the shape circom
/// input files expect.
pub mod decimal
{
    use super::*;

    pub trait DecimalFields
    {
        fn serialize_decimal<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>;
    }

    struct AsDecimal<'a, T: ?Sized>(&'a T);

    impl<'a, T: DecimalFields + ?Sized> Serialize for AsDecimal<'a, T>
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
        {
            self.0.serialize_decimal(serializer)
        }
    }

    impl DecimalFields for Fr
    {
        fn serialize_decimal<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
        {
            serializer.serialize_str(&fr_to_biguint(self).to_string())
        }
    }

    impl DecimalFields for BigUint
    {
        fn serialize_decimal<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<T: DecimalFields> DecimalFields for [T]
    {
        fn serialize_decimal<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
        {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for element in self
            {
                seq.serialize_element(&AsDecimal(element))?;
            }
            seq.end()
        }
    }

    impl<T: DecimalFields, const N: usize> DecimalFields for [T; N]
    {
        fn serialize_decimal<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
        {
            self.as_slice().serialize_decimal(serializer)
        }
    }

    impl<T: DecimalFields> DecimalFields for Vec<T>
    {
        fn serialize_decimal<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
        {
            self.as_slice().serialize_decimal(serializer)
        }
    }

    /// For use with `#[serde(serialize_with = "decimal::serialize")]`.
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: DecimalFields + ?Sized,
        S: Serializer,
    {
        value.serialize_decimal(serializer)
    }
}
