pub mod command;
pub mod config;
pub mod message;
pub mod provider;
pub mod state;
pub mod witness;

pub use command::{Command, CommandError};
pub use config::MaciConfig;
pub use message::{hash_message_and_enc_pub_key, Message};
pub use provider::MaciProvider;
pub use state::{MaciState, StateLeaf, ZeroLeaves};
pub use witness::{
    DeactivateBatch,
    ProcessDeactivateInput,
    ProcessMessageInput,
    Rejection,
    TallyInput
};

use std::collections::BTreeMap;

use ark_bn254::Fr;
use ark_ff::{MontFp, Zero};
use num_bigint::BigUint;

use crate::crypto::{Keypair, Point};
use crate::error::{MaciError, Result};
use crate::tree::{QuinaryMerkleTree, QuinaryTree};
use crate::types::{fr_to_biguint, StateIndex};

/// Separates the linear sum from the sum of squares in a tally leaf.
pub const TALLY_SEPARATOR: Fr = MontFp!("1000000000000000000000000");

/// Domain tag of the salts of deactivation ciphertexts.
pub const DEACTIVATE_SALT_TAG: u64 = 20040;

/// The state engine of a single voting round.
#[derive(Clone, Debug)]
pub struct Maci
{
    /// The immutable round parameters.
    config: MaciConfig,

    /// The coordinator's keys.
    coordinator: Keypair,

    /// `H2(coordinator.pub_key)`.
    coordinator_pub_key_hash: Fr,

    zero_leaves: ZeroLeaves,

    /// The current period.
    state: MaciState,

    state_tree: QuinaryTree,

    /// Non-zero at the index of every deactivated key.
    active_state_tree: QuinaryTree,

    /// The deactivation ciphertexts written by the coordinator.
    deactivate_tree: QuinaryTree,

    /// Packed per option results.
    tally_tree: QuinaryTree,

    state_leaves: BTreeMap<StateIndex, StateLeaf>,

    messages: Vec<Message>,
    commands: Vec<Option<Command>>,

    deactivate_messages: Vec<Message>,
    deactivate_commands: Vec<Option<Command>>,

    /// The number of deactivation messages processed.
    processed_deactivate_count: u64,

    /// One past the newest unprocessed message.
    msg_end_idx: u64,

    /// The number of tally batches processed.
    batch_num: u64,

    state_salt: Fr,
    state_commitment: Fr,
    tally_salt: Fr,
    tally_commitment: Fr,
}

impl Maci
{
    pub fn new(config: MaciConfig, coordinator: Keypair) -> Result<Self>
    {
        Self::with_zero_leaves(config, coordinator, ZeroLeaves::compute()?)
    }

    pub fn with_zero_leaves(config: MaciConfig, coordinator: Keypair, zero_leaves: ZeroLeaves) -> Result<Self>
    {
        config.validate()?;

        let state_tree = QuinaryTree::new(config.state_tree_depth, zero_leaves.zero_hash10)?;
        let active_state_tree = QuinaryTree::new(config.state_tree_depth, Fr::zero())?;
        let deactivate_tree = QuinaryTree::new(config.deactivate_tree_depth(), zero_leaves.zero_hash5)?;
        let tally_tree = QuinaryTree::new(config.vote_option_tree_depth, Fr::zero())?;
        let coordinator_pub_key_hash = coordinator.pub_key_hash()?;

        tracing::info!(
            state_tree_depth = config.state_tree_depth,
            vote_option_tree_depth = config.vote_option_tree_depth,
            batch_size = config.batch_size,
            num_sign_ups = config.num_sign_ups,
            quadratic = config.is_quadratic_cost,
            "round created"
        );

        Ok(Maci {
            config,
            coordinator,
            coordinator_pub_key_hash,
            zero_leaves,
            state: MaciState::Filling,
            state_tree,
            active_state_tree,
            deactivate_tree,
            tally_tree,
            state_leaves: BTreeMap::new(),
            messages: Vec::new(),
            commands: Vec::new(),
            deactivate_messages: Vec::new(),
            deactivate_commands: Vec::new(),
            processed_deactivate_count: 0,
            msg_end_idx: 0,
            batch_num: 0,
            state_salt: Fr::zero(),
            state_commitment: Fr::zero(),
            tally_salt: Fr::zero(),
            tally_commitment: Fr::zero(),
        })
    }

    pub(crate) fn ensure_state(&self, expected: MaciState) -> Result<()>
    {
        if self.state != expected
        {
            Err(MaciError::Lifecycle { expected, actual: self.state })?
        }
        Ok(())
    }

    /// The leaf at `index`, or an empty leaf if nobody signed up there.
    pub(crate) fn state_leaf_or_empty(&self, index: StateIndex) -> Result<StateLeaf>
    {
        match self.state_leaves.get(&index)
        {
            Some(leaf) => Ok(leaf.clone()),
            None => Ok(StateLeaf::empty(self.config.vote_option_tree_depth)?),
        }
    }

    /// Splits a tally leaf into the sum of vote weights and the sum of their
    /// squares.
    pub fn decode_result(value: &Fr) -> (BigUint, BigUint)
    {
        let value = fr_to_biguint(value);
        let separator = fr_to_biguint(&TALLY_SEPARATOR);
        (&value / &separator, &value % &separator)
    }

    /// The decoded tally of every vote option.
    pub fn results(&self) -> Vec<(BigUint, BigUint)>
    {
        self.tally_tree
            .leaves()
            .iter()
            .take(self.config.max_vote_options as usize)
            .map(Self::decode_result)
            .collect()
    }

    pub fn config(&self) -> &MaciConfig
    {
        &self.config
    }

    pub fn state(&self) -> MaciState
    {
        self.state
    }

    pub fn state_root(&self) -> Fr
    {
        self.state_tree.root()
    }

    pub fn state_tree(&self) -> &QuinaryTree
    {
        &self.state_tree
    }

    pub fn active_state_tree(&self) -> &QuinaryTree
    {
        &self.active_state_tree
    }

    pub fn deactivate_tree(&self) -> &QuinaryTree
    {
        &self.deactivate_tree
    }

    pub fn num_sign_ups(&self) -> u64
    {
        self.config.num_sign_ups
    }

    pub fn state_leaf(&self, index: StateIndex) -> Option<&StateLeaf>
    {
        self.state_leaves.get(&index)
    }

    pub fn messages(&self) -> &[Message]
    {
        &self.messages
    }

    pub fn commands(&self) -> &[Option<Command>]
    {
        &self.commands
    }

    pub fn deactivate_messages(&self) -> &[Message]
    {
        &self.deactivate_messages
    }

    pub fn deactivate_commands(&self) -> &[Option<Command>]
    {
        &self.deactivate_commands
    }

    /// The raw tally leaves.
    pub fn tally_results(&self) -> &[Fr]
    {
        self.tally_tree.leaves()
    }

    pub fn state_commitment(&self) -> Fr
    {
        self.state_commitment
    }

    pub fn state_salt(&self) -> Fr
    {
        self.state_salt
    }

    pub fn tally_commitment(&self) -> Fr
    {
        self.tally_commitment
    }

    pub fn tally_salt(&self) -> Fr
    {
        self.tally_salt
    }

    pub fn processed_deactivate_count(&self) -> u64
    {
        self.processed_deactivate_count
    }

    pub fn msg_end_idx(&self) -> u64
    {
        self.msg_end_idx
    }

    pub fn tally_batch_num(&self) -> u64
    {
        self.batch_num
    }

    pub fn coordinator_pub_key(&self) -> Point
    {
        self.coordinator.pub_key
    }

    pub fn zero_leaves(&self) -> ZeroLeaves
    {
        self.zero_leaves
    }
}
