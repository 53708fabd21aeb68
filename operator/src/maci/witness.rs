//! Circuit inputs produced by each batch. Field elements serialize as decimal
//! strings under the circuits' signal names.
use ark_bn254::Fr;
use num_bigint::BigUint;
use serde::Serialize;

use crate::maci::CommandError;
use crate::types::{decimal, PathElements, StateLeafValues};

/// A command skipped while processing a batch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rejection
{
    /// The slot within the batch.
    pub slot: usize,

    /// The position of the message in its log.
    pub message_index: usize,

    pub reason: CommandError,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDeactivateInput
{
    #[serde(serialize_with = "decimal::serialize")]
    pub input_hash: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_active_state_root: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_deactivate_root: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub batch_start_hash: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub batch_end_hash: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub msgs: Vec<Vec<Fr>>,

    #[serde(serialize_with = "decimal::serialize")]
    pub coord_priv_key: BigUint,

    #[serde(serialize_with = "decimal::serialize")]
    pub coord_pub_key: [Fr; 2],

    #[serde(serialize_with = "decimal::serialize")]
    pub enc_pub_keys: Vec<[Fr; 2]>,

    /// The new deactivation ciphertext of every slot.
    #[serde(serialize_with = "decimal::serialize")]
    pub c1: Vec<[Fr; 2]>,

    #[serde(serialize_with = "decimal::serialize")]
    pub c2: Vec<[Fr; 2]>,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_active_state: Vec<Fr>,

    #[serde(serialize_with = "decimal::serialize")]
    pub new_active_state: Vec<Fr>,

    /// The index of the first deactivation leaf written by the batch.
    pub deactivate_index0: u64,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_state_root: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_state_leaves: Vec<StateLeafValues>,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_state_leaves_path_elements: Vec<PathElements>,

    #[serde(serialize_with = "decimal::serialize")]
    pub active_state_leaves_path_elements: Vec<PathElements>,

    #[serde(serialize_with = "decimal::serialize")]
    pub deactivate_leaves_path_elements: Vec<PathElements>,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_deactivate_commitment: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub new_deactivate_root: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub new_deactivate_commitment: Fr,
}

/// The outcome of a deactivation batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateBatch
{
    pub input: ProcessDeactivateInput,

    /// The leaves appended to the deactivation tree, one per real slot.
    #[serde(serialize_with = "decimal::serialize")]
    pub new_deactivate: Vec<[Fr; 5]>,

    /// The number of requests in this batch, excluding padding.
    pub size: u64,

    /// The deactivation tree root after the batch.
    #[serde(serialize_with = "decimal::serialize")]
    pub root: Fr,

    #[serde(skip)]
    pub rejections: Vec<Rejection>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMessageInput
{
    #[serde(serialize_with = "decimal::serialize")]
    pub input_hash: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub packed_vals: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub batch_start_hash: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub batch_end_hash: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub msgs: Vec<Vec<Fr>>,

    #[serde(serialize_with = "decimal::serialize")]
    pub coord_priv_key: BigUint,

    #[serde(serialize_with = "decimal::serialize")]
    pub coord_pub_key: [Fr; 2],

    #[serde(serialize_with = "decimal::serialize")]
    pub enc_pub_keys: Vec<[Fr; 2]>,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_state_root: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_state_leaves: Vec<StateLeafValues>,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_state_leaves_path_elements: Vec<PathElements>,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_state_commitment: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_state_salt: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub new_state_commitment: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub new_state_salt: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_vote_weights: Vec<Fr>,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_vote_weights_path_elements: Vec<PathElements>,

    #[serde(serialize_with = "decimal::serialize")]
    pub active_state_root: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub deactivate_root: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub deactivate_commitment: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub active_state_leaves: Vec<Fr>,

    #[serde(serialize_with = "decimal::serialize")]
    pub active_state_leaves_path_elements: Vec<PathElements>,

    #[serde(skip)]
    pub rejections: Vec<Rejection>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyInput
{
    #[serde(serialize_with = "decimal::serialize")]
    pub state_root: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub state_salt: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub packed_vals: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub state_commitment: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_tally_commitment: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub new_tally_commitment: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub input_hash: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub state_leaf: Vec<StateLeafValues>,

    /// The siblings of the batch subtree root, from its level to the root.
    #[serde(serialize_with = "decimal::serialize")]
    pub state_path_elements: PathElements,

    #[serde(serialize_with = "decimal::serialize")]
    pub votes: Vec<Vec<Fr>>,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_results: Vec<Fr>,

    #[serde(serialize_with = "decimal::serialize")]
    pub current_results_root_salt: Fr,

    #[serde(serialize_with = "decimal::serialize")]
    pub new_results_root_salt: Fr,
}
