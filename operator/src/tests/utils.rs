use ark_bn254::Fr;
use num_bigint::BigUint;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

use crate::crypto::{encrypt_odevity, Keypair, Point};
use crate::maci::{Command, Maci, MaciConfig, MaciProvider};

pub fn get_rng(seed: u64) -> ChaCha20Rng
{
    ChaCha20Rng::seed_from_u64(seed)
}

pub fn get_coordinator() -> Keypair
{
    Keypair::from_private(Fr::from(1_234_567u64))
}

pub fn get_participant(seed: u64) -> Keypair
{
    Keypair::from_private(Fr::from(1_000 + seed))
}

pub fn get_config(num_sign_ups: u64, batch_size: usize, is_quadratic_cost: bool) -> MaciConfig
{
    MaciConfig {
        state_tree_depth: 2,
        int_state_tree_depth: 1,
        vote_option_tree_depth: 1,
        batch_size,
        max_vote_options: 5,
        num_sign_ups,
        is_quadratic_cost,
    }
}

pub fn get_maci(num_sign_ups: u64, batch_size: usize, is_quadratic_cost: bool) -> Maci
{
    Maci::new(get_config(num_sign_ups, batch_size, is_quadratic_cost), get_coordinator()).unwrap()
}

/// The sign up deactivation ciphertext of a participant.
pub fn get_deactivation(coordinator: &Point, deactivated: bool, seed: u64) -> [Fr; 4]
{
    encrypt_odevity(deactivated, coordinator, &Fr::from(seed)).unwrap().coordinates()
}

pub fn sign_up(maci: &mut Maci, index: u64, participant: &Keypair, balance: u64, deactivated: bool)
{
    let deactivation = get_deactivation(&maci.coordinator_pub_key(), deactivated, 77 + index);
    maci.init_state_tree(index, participant.pub_key, BigUint::from(balance), deactivation).unwrap();
}

/// An encrypted, signed command and the ephemeral key it was encrypted with.
pub fn get_ballot(
    participant: &Keypair,
    coordinator: &Point,
    nonce: u32,
    state_idx: u32,
    vo_idx: u32,
    new_votes: u128,
    rng: &mut ChaCha20Rng
) -> (Vec<Fr>, Point)
{
    let packed = Command::pack(nonce, state_idx, vo_idx, new_votes, None);
    let plaintext = Command::sign_plaintext(&participant.priv_key, packed, &participant.pub_key).unwrap();
    let enc_key = Keypair::random(rng);
    let ciphertext = Command::encrypt_plaintext(&plaintext, &enc_key, coordinator).unwrap();
    (ciphertext, enc_key.pub_key)
}

pub fn push_ballot(
    maci: &mut Maci,
    participant: &Keypair,
    nonce: u32,
    state_idx: u32,
    vo_idx: u32,
    new_votes: u128,
    rng: &mut ChaCha20Rng
)
{
    let (ciphertext, enc_pub_key) = get_ballot(
        participant,
        &maci.coordinator_pub_key(),
        nonce,
        state_idx,
        vo_idx,
        new_votes,
        rng
    );
    maci.push_message(ciphertext, enc_pub_key).unwrap();
}

pub fn push_deactivate_request(maci: &mut Maci, participant: &Keypair, state_idx: u32, rng: &mut ChaCha20Rng)
{
    let (ciphertext, enc_pub_key) = get_ballot(participant, &maci.coordinator_pub_key(), 0, state_idx, 0, 0, rng);
    maci.push_deactivate_message(ciphertext, enc_pub_key).unwrap();
}
