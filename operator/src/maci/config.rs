use serde::{Deserialize, Serialize};

use crate::error::{MaciError, Result};
use crate::tree::{MAX_TREE_DEPTH, TREE_ARITY};

/// The number of levels the deactivation tree has beyond the state tree.
pub const DEACTIVATE_TREE_EXTRA_DEPTH: u8 = 2;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MaciConfig
{
    /// The depth of the state tree.
    pub state_tree_depth: u8,

    /// The depth of the state subtree tallied per batch.
    pub int_state_tree_depth: u8,

    /// The depth of each participants vote option tree.
    pub vote_option_tree_depth: u8,

    /// The number of messages processed per batch.
    pub batch_size: usize,

    /// The number of possible outcomes of the round.
    pub max_vote_options: u64,

    /// The number of participants registered when the round opened.
    pub num_sign_ups: u64,

    /// Whether a vote weight of `w` costs `w²` voice credits rather than `w`.
    pub is_quadratic_cost: bool,
}

fn capacity(depth: u8) -> u64
{
    (TREE_ARITY as u64).pow(depth as u32)
}

impl MaciConfig
{
    pub fn validate(&self) -> Result<()>
    {
        if self.batch_size == 0
        {
            Err(MaciError::InvalidConfig("batch size must be positive".into()))?
        }

        if self.state_tree_depth.saturating_add(DEACTIVATE_TREE_EXTRA_DEPTH) > MAX_TREE_DEPTH
        {
            Err(MaciError::InvalidConfig(format!(
                "state tree depth {} exceeds the maximum of {}",
                self.state_tree_depth,
                MAX_TREE_DEPTH - DEACTIVATE_TREE_EXTRA_DEPTH
            )))?
        }

        if self.vote_option_tree_depth > MAX_TREE_DEPTH
        {
            Err(MaciError::InvalidConfig(format!(
                "vote option tree depth {} exceeds the maximum of {}",
                self.vote_option_tree_depth,
                MAX_TREE_DEPTH
            )))?
        }

        if self.int_state_tree_depth > self.state_tree_depth
        {
            Err(MaciError::InvalidConfig("tally batch depth exceeds the state tree depth".into()))?
        }

        if self.max_vote_options > self.vote_option_capacity()
        {
            Err(MaciError::InvalidConfig(format!(
                "{} vote options do not fit a vote option tree of {} leaves",
                self.max_vote_options,
                self.vote_option_capacity()
            )))?
        }

        if self.num_sign_ups > self.state_capacity()
        {
            Err(MaciError::InvalidConfig(format!(
                "{} sign ups do not fit a state tree of {} leaves",
                self.num_sign_ups,
                self.state_capacity()
            )))?
        }

        Ok(())
    }

    /// The number of leaves of the state tree.
    pub fn state_capacity(&self) -> u64
    {
        capacity(self.state_tree_depth)
    }

    pub fn vote_option_capacity(&self) -> u64
    {
        capacity(self.vote_option_tree_depth)
    }

    /// The number of state leaves tallied per batch.
    pub fn tally_batch_size(&self) -> u64
    {
        capacity(self.int_state_tree_depth)
    }

    pub fn deactivate_tree_depth(&self) -> u8
    {
        self.state_tree_depth + DEACTIVATE_TREE_EXTRA_DEPTH
    }
}
