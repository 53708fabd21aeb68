use ark_bn254::Fr;
use ark_ff::{Field, Zero};
use light_poseidon::parameters::bn254_x5::get_poseidon_parameters;
use light_poseidon::PoseidonParameters;

pub use light_poseidon::PoseidonError;

/// The length of a big-endian encoded field element.
pub const HASH_LEN: usize = 32;

/// The widest state of the circom parameter set.
pub const MAX_X5_LEN: usize = 13;

/// Trait for hashing inputs that are prime field elements.
pub trait PoseidonHasher
{
    /// Calculates the Poseidon hash of exactly `width - 1` inputs.
    fn hash(&self, inputs: &[Fr]) -> Result<Fr, PoseidonError>;
}

/// The circom Poseidon permutation over the BN254 scalar field, for a single
/// state width.
pub struct Poseidon
{
    params: PoseidonParameters<Fr>,
}

impl Poseidon
{
    /// The permutation over a state of `width` elements.
    pub fn circom(width: usize) -> Result<Self, PoseidonError>
    {
        if !(2..=MAX_X5_LEN).contains(&width)
        {
            Err(PoseidonError::InvalidWidthCircom { width, max_limit: MAX_X5_LEN })?
        }

        // Bounded by MAX_X5_LEN above.
        let params = get_poseidon_parameters::<Fr>(width as u8)?;
        Ok(Poseidon { params })
    }

    /// A hasher over `arity` inputs, the capacity lane included.
    pub fn with_arity(arity: usize) -> Result<Self, PoseidonError>
    {
        Self::circom(arity + 1)
    }

    pub fn width(&self) -> usize
    {
        self.params.width
    }

    fn round(&self, state: &mut [Fr], round: usize, full: bool)
    {
        let width = self.params.width;
        let constants = &self.params.ark[round * width..(round + 1) * width];
        for (value, constant) in state.iter_mut().zip(constants)
        {
            *value += constant;
        }

        let sboxed = if full { width } else { 1 };
        for value in state[..sboxed].iter_mut()
        {
            *value = value.pow([self.params.alpha]);
        }

        let mixed: Vec<Fr> = self.params.mds
            .iter()
            .map(|row| row.iter().zip(state.iter()).fold(Fr::zero(), |acc, (m, v)| acc + *m * v))
            .collect();
        state.copy_from_slice(&mixed);
    }

    /// Half of the full rounds, then the partial rounds, then the remaining
    /// full rounds.
    fn apply(&self, state: &mut [Fr])
    {
        let half = self.params.full_rounds / 2;
        let partial_end = half + self.params.partial_rounds;

        for round in 0..self.params.full_rounds + self.params.partial_rounds
        {
            self.round(state, round, round < half || round >= partial_end);
        }
    }

    /// Applies the raw permutation to a full-width state.
    pub fn permute(&self, state: &[Fr]) -> Result<Vec<Fr>, PoseidonError>
    {
        if state.len() != self.params.width
        {
            Err(PoseidonError::InvalidNumberOfInputs {
                inputs: state.len(),
                max_limit: self.params.width,
                width: self.params.width,
            })?
        }

        let mut state = state.to_vec();
        self.apply(&mut state);
        Ok(state)
    }
}

impl PoseidonHasher for Poseidon
{
    fn hash(&self, inputs: &[Fr]) -> Result<Fr, PoseidonError>
    {
        let arity = self.params.width - 1;
        if inputs.len() != arity
        {
            Err(PoseidonError::InvalidNumberOfInputs {
                inputs: inputs.len(),
                max_limit: arity,
                width: self.params.width,
            })?
        }

        let mut state = Vec::with_capacity(self.params.width);
        state.push(Fr::zero());
        state.extend_from_slice(inputs);
        self.apply(&mut state);

        Ok(state[0])
    }
}
