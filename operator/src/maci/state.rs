use ark_bn254::Fr;
use ark_ff::Zero;
use num_bigint::BigUint;

use crate::crypto::{Ciphertext, Point};
use crate::error::TreeError;
use crate::hash::{hash2, hash5, PoseidonError};
use crate::tree::{QuinaryMerkleTree, QuinaryTree};
use crate::types::{biguint_to_fr, StateLeafValues};

/// The lifecycle of a voting round. Transitions only move forward.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MaciState
{
    /// Sign ups, ballots and deactivation requests are accepted.
    Filling,

    /// Ballot batches are being processed, newest first.
    Processing,

    /// State leaves are being tallied.
    Tallying,

    /// The round is over and read only.
    Ended,
}

/// The zero leaves of the state and deactivation trees. Computed once and
/// handed to every engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ZeroLeaves
{
    /// `H5(0, 0, 0, 0, 0)`, the hash of an empty deactivation leaf.
    pub zero_hash5: Fr,

    /// `H2(zero_hash5, zero_hash5)`, the hash of an empty state leaf.
    pub zero_hash10: Fr,
}

impl ZeroLeaves
{
    pub fn compute() -> Result<Self, PoseidonError>
    {
        let zero_hash5 = hash5([Fr::zero(); 5])?;
        let zero_hash10 = hash2([zero_hash5, zero_hash5])?;
        Ok(ZeroLeaves { zero_hash5, zero_hash10 })
    }
}

/// A participant's entry in the state tree.
#[derive(Clone, Debug, PartialEq)]
pub struct StateLeaf
{
    /// The key commands for this leaf must be signed with.
    pub pub_key: Point,

    /// The remaining voice credits.
    pub balance: BigUint,

    /// The vote weight given to each option.
    pub vote_option_tree: QuinaryTree,

    /// The nonce of the last applied command.
    pub nonce: u64,

    /// Whether any command has been applied to the leaf.
    pub voted: bool,

    /// The deactivation ciphertext supplied at sign up.
    pub d1: Point,
    pub d2: Point,
}

impl StateLeaf
{
    pub fn new(
        pub_key: Point,
        balance: BigUint,
        deactivation: [Fr; 4],
        vote_option_tree_depth: u8
    ) -> Result<Self, TreeError>
    {
        let ciphertext = Ciphertext::from_coordinates(deactivation);
        Ok(StateLeaf {
            pub_key,
            balance,
            vote_option_tree: QuinaryTree::new(vote_option_tree_depth, Fr::zero())?,
            nonce: 0,
            voted: false,
            d1: ciphertext.c1,
            d2: ciphertext.c2,
        })
    }

    /// The leaf held at every index nobody signed up to. Its hash is the
    /// state tree's zero leaf.
    pub fn empty(vote_option_tree_depth: u8) -> Result<Self, TreeError>
    {
        Self::new(Point::default(), BigUint::default(), [Fr::zero(); 4], vote_option_tree_depth)
    }

    /// The sign up deactivation ciphertext.
    pub fn deactivation(&self) -> Ciphertext
    {
        Ciphertext { c1: self.d1, c2: self.d2, x_increment: Fr::zero() }
    }

    pub fn values(&self) -> StateLeafValues
    {
        let vote_root = if self.voted { self.vote_option_tree.root() } else { Fr::zero() };
        [
            self.pub_key.x,
            self.pub_key.y,
            biguint_to_fr(&self.balance),
            vote_root,
            Fr::from(self.nonce),
            self.d1.x,
            self.d1.y,
            self.d2.x,
            self.d2.y,
            Fr::zero(),
        ]
    }

    /// `H2(H5(values[0..5]), H5(values[5..10]))`.
    pub fn hash(&self) -> Result<Fr, PoseidonError>
    {
        let values = self.values();
        let left = hash5([values[0], values[1], values[2], values[3], values[4]])?;
        let right = hash5([values[5], values[6], values[7], values[8], values[9]])?;
        hash2([left, right])
    }
}
