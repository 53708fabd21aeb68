use ark_bn254::Fr;
use ark_ff::{Field, MontFp, One, Zero};
use num_bigint::BigUint;

use crate::types::fr_to_biguint;

/// Twisted Edwards coefficient `a` of Baby Jubjub.
pub const A: Fr = MontFp!("168700");

/// Twisted Edwards coefficient `d` of Baby Jubjub.
pub const D: Fr = MontFp!("168696");

/// Generator of the prime order subgroup.
pub const BASE8: Point = Point {
    x: MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553"),
    y: MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203"),
};

/// Order of the subgroup generated by `BASE8`.
pub const SUB_ORDER: Fr = MontFp!("2736030358979909402780800718157159386076813972158567259200215660948447373041");

/// `SUB_ORDER` as an integer, for reductions of scalars wider than the field.
pub fn sub_order() -> BigUint
{
    fr_to_biguint(&SUB_ORDER)
}

/// An affine point on Baby Jubjub. The all-zero point is used as the public
/// key of an empty state leaf; it is not on the curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point
{
    /// The x-coordinate.
    pub x: Fr,

    /// The y-coordinate.
    pub y: Fr,
}

impl Point
{
    pub const fn new(x: Fr, y: Fr) -> Self
    {
        Point { x, y }
    }

    /// The neutral element `(0, 1)`.
    pub fn identity() -> Self
    {
        Point { x: Fr::zero(), y: Fr::one() }
    }

    pub fn as_array(&self) -> [Fr; 2]
    {
        [self.x, self.y]
    }

    /// Point addition on the twisted Edwards curve.
    pub fn add(&self, other: &Point) -> Point
    {
        let beta = self.x * other.y;
        let gamma = self.y * other.x;
        let delta = (self.y - A * self.x) * (other.x + other.y);
        let tau = beta * gamma;
        let d_tau = D * tau;

        let x = (beta + gamma) * inverse_or_zero(Fr::one() + d_tau);
        let y = (delta + A * beta - gamma) * inverse_or_zero(Fr::one() - d_tau);

        Point { x, y }
    }

    /// Double-and-add, least significant bit first. The scalar is not
    /// reduced, so multiples of the cofactor carry through.
    pub fn mul(&self, scalar: &BigUint) -> Point
    {
        let mut result = Point::identity();
        let mut exp = *self;

        for bit in 0..scalar.bits()
        {
            if scalar.bit(bit) { result = result.add(&exp); }
            exp = exp.add(&exp);
        }

        result
    }

    pub fn mul_fr(&self, scalar: &Fr) -> Point
    {
        self.mul(&fr_to_biguint(scalar))
    }

    /// The point with its x-coordinate negated.
    pub fn negate(&self) -> Point
    {
        Point { x: -self.x, y: self.y }
    }

    /// Whether `a·x² + y² = 1 + d·x²·y²`.
    pub fn in_curve(&self) -> bool
    {
        let x2 = self.x.square();
        let y2 = self.y.square();
        A * x2 + y2 == Fr::one() + D * x2 * y2
    }
}

fn inverse_or_zero(value: Fr) -> Fr
{
    value.inverse().unwrap_or_else(Fr::zero)
}
