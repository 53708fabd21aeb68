use ark_bn254::Fr;
use ark_ff::{One, Zero};
use num_bigint::BigUint;

use crate::crypto::{decrypt_odevity, Ciphertext, Keypair};
use crate::error::MaciError;
use crate::hash::{hash2, sha256_input_hash};
use crate::maci::{
    hash_message_and_enc_pub_key,
    Command,
    CommandError,
    Maci,
    MaciConfig,
    MaciProvider,
    MaciState,
    Rejection,
    ZeroLeaves,
    TALLY_SEPARATOR
};
use crate::tests::{
    get_config,
    get_coordinator,
    get_maci,
    get_participant,
    get_rng,
    push_ballot,
    push_deactivate_request,
    sign_up
};
use crate::tree::{QuinaryMerkleTree, QuinaryTree};

fn balance(maci: &Maci, index: u64) -> BigUint
{
    maci.state_leaf(index).unwrap().balance.clone()
}

/// A revised quadratic vote refunds the old cost before charging the new one.
#[test]
fn quadratic_cost_revote()
{
    let mut rng = get_rng(10);
    let mut maci = get_maci(1, 1, true);
    let participant = get_participant(1);
    sign_up(&mut maci, 0, &participant, 100, false);

    // Batches are processed newest first, so the later ballot in the log is applied first.
    push_ballot(&mut maci, &participant, 2, 0, 0, 8, &mut rng);
    push_ballot(&mut maci, &participant, 1, 0, 0, 5, &mut rng);
    maci.end_vote_period().unwrap();
    assert_eq!(maci.state(), MaciState::Processing);
    assert_eq!(maci.msg_end_idx(), 2);

    let first = maci.process_message(Fr::from(11u64)).unwrap();
    assert!(first.rejections.is_empty());
    assert_eq!(balance(&maci, 0), BigUint::from(75u32));
    assert_eq!(maci.msg_end_idx(), 1);
    assert_eq!(maci.state(), MaciState::Processing);

    let second = maci.process_message(Fr::from(12u64)).unwrap();
    assert!(second.rejections.is_empty());
    assert_eq!(second.current_vote_weights, vec![Fr::from(5u64)]);
    assert_eq!(second.current_state_commitment, first.new_state_commitment);
    assert_eq!(balance(&maci, 0), BigUint::from(36u32));
    assert_eq!(maci.state_leaf(0).unwrap().nonce, 2);
    assert_eq!(maci.state(), MaciState::Tallying);

    let tally = maci.process_tally(Fr::from(13u64)).unwrap();
    assert_eq!(tally.current_results, vec![Fr::zero(); 5]);
    assert_eq!(maci.state(), MaciState::Ended);

    let expected = Fr::from(8u64) * (Fr::from(8u64) + TALLY_SEPARATOR);
    assert_eq!(maci.tally_results()[0], expected);
    assert_eq!(Maci::decode_result(&expected), (BigUint::from(8u32), BigUint::from(64u32)));
    assert_eq!(maci.results()[0], (BigUint::from(8u32), BigUint::from(64u32)));
    assert_eq!(maci.results()[1], (BigUint::default(), BigUint::default()));
}

/// A replayed nonce is rejected and leaves the state unchanged.
#[test]
fn stale_nonce_rejected()
{
    let mut rng = get_rng(11);
    let mut maci = get_maci(1, 5, false);
    let participant = get_participant(1);
    sign_up(&mut maci, 0, &participant, 100, false);

    push_ballot(&mut maci, &participant, 1, 0, 0, 3, &mut rng);
    push_ballot(&mut maci, &participant, 1, 0, 0, 4, &mut rng);
    maci.end_vote_period().unwrap();

    let input = maci.process_message(Fr::from(1u64)).unwrap();
    assert_eq!(
        input.rejections,
        vec![Rejection { slot: 0, message_index: 0, reason: CommandError::NonceError }]
    );

    let leaf = maci.state_leaf(0).unwrap();
    assert_eq!(leaf.nonce, 1);
    assert_eq!(leaf.balance, BigUint::from(96u32));
    assert_eq!(leaf.vote_option_tree.leaf(0).unwrap(), Fr::from(4u64));
    assert_eq!(maci.state(), MaciState::Tallying);
}

/// A key deactivated in a processed batch cannot vote afterwards.
#[test]
fn deactivated_user_blocked()
{
    let mut rng = get_rng(12);
    let mut maci = get_maci(4, 5, false);
    let participants: Vec<Keypair> = (0..4).map(get_participant).collect();
    for (index, participant) in participants.iter().enumerate()
    {
        sign_up(&mut maci, index as u64, participant, 50, false);
    }

    push_deactivate_request(&mut maci, &participants[3], 3, &mut rng);
    let batch = maci.process_deactivate_message(5, 4).unwrap();

    assert!(batch.rejections.is_empty());
    assert_eq!(batch.size, 1);
    assert_eq!(batch.new_deactivate.len(), 1);
    assert_eq!(batch.root, maci.deactivate_tree().root());
    assert_eq!(maci.active_state_tree().leaf(3).unwrap(), Fr::from(1u64));
    assert_eq!(maci.processed_deactivate_count(), 1);

    let leaf = batch.new_deactivate[0];
    let ciphertext = Ciphertext::from_coordinates([leaf[0], leaf[1], leaf[2], leaf[3]]);
    assert!(!decrypt_odevity(&get_coordinator().formatted_priv_key, &ciphertext));

    push_ballot(&mut maci, &participants[3], 1, 3, 0, 1, &mut rng);
    assert_eq!(maci.check_command_now(maci.commands()[0].as_ref()).unwrap(), Some(CommandError::Inactive));

    maci.end_vote_period().unwrap();
    let input = maci.process_message(Fr::zero()).unwrap();
    assert_eq!(input.rejections.len(), 1);
    assert_eq!(input.rejections[0].reason, CommandError::Inactive);
    assert_eq!(balance(&maci, 3), BigUint::from(50u32));
    assert!(!maci.state_leaf(3).unwrap().voted);
}

/// Invalid deactivation requests still consume a deactivation leaf but leave the
/// active state untouched.
#[test]
fn deactivate_batch_with_rejections()
{
    let mut rng = get_rng(13);
    let mut maci = get_maci(4, 5, false);
    let participants: Vec<Keypair> = (0..4).map(get_participant).collect();
    for (index, participant) in participants.iter().enumerate()
    {
        sign_up(&mut maci, index as u64, participant, 50, false);
    }

    push_deactivate_request(&mut maci, &participants[3], 3, &mut rng);
    push_deactivate_request(&mut maci, &participants[2], 1, &mut rng);
    push_deactivate_request(&mut maci, &participants[0], 10, &mut rng);

    let current_active_root = maci.active_state_tree().root();
    let batch = maci.process_deactivate_message(5, 4).unwrap();
    let input = &batch.input;

    assert_eq!(
        batch.rejections,
        vec![
            Rejection { slot: 1, message_index: 1, reason: CommandError::SignatureError },
            Rejection { slot: 2, message_index: 2, reason: CommandError::StateLeafIndexOverflow },
        ]
    );
    assert_eq!(batch.size, 3);
    assert_eq!(batch.new_deactivate.len(), 3);

    let coordinator = get_coordinator();
    let parities: Vec<bool> = batch.new_deactivate
        .iter()
        .map(|leaf| decrypt_odevity(
            &coordinator.formatted_priv_key,
            &Ciphertext::from_coordinates([leaf[0], leaf[1], leaf[2], leaf[3]])
        ))
        .collect();
    assert_eq!(parities, vec![false, true, true]);

    assert_eq!(maci.active_state_tree().leaf(3).unwrap(), Fr::from(1u64));
    assert_eq!(maci.active_state_tree().leaf(1).unwrap(), Fr::zero());

    // Every slot carries a full witness, padding included.
    assert_eq!(input.deactivate_index0, 0);
    assert_eq!(input.current_active_state_root, current_active_root);
    assert_eq!(input.msgs.len(), 5);
    assert_eq!(input.current_state_leaves.len(), 5);
    assert_eq!(input.current_active_state.len(), 5);
    assert_eq!(input.deactivate_leaves_path_elements.len(), 5);
    assert_eq!(input.deactivate_leaves_path_elements[0].len(), 4);
    assert_eq!(input.current_state_leaves_path_elements[0].len(), 2);

    // The signature failure is witnessed at the claimed index, the overflow at the last leaf.
    let sub_state_tree = maci.state_tree().sub_tree(4).unwrap();
    assert_eq!(input.current_state_root, sub_state_tree.root());
    assert_eq!(input.current_state_leaves_path_elements[1], sub_state_tree.path_element_of(1).unwrap());
    assert_eq!(input.current_state_leaves_path_elements[2], sub_state_tree.path_element_of(24).unwrap());

    let expected = sha256_input_hash(&[
        input.new_deactivate_root,
        coordinator.pub_key_hash().unwrap(),
        input.batch_start_hash,
        input.batch_end_hash,
        input.current_deactivate_commitment,
        input.new_deactivate_commitment,
        input.current_state_root,
    ]);
    assert_eq!(input.input_hash, expected);
    assert_eq!(input.batch_start_hash, Fr::zero());
    assert_eq!(input.batch_end_hash, maci.deactivate_messages()[2].hash);

    assert!(matches!(maci.process_deactivate_message(5, 4), Err(MaciError::EmptyBatch(_))));
}

/// Deactivation batches are clamped to the batch size and continue where the last one stopped.
#[test]
fn deactivate_batches_advance()
{
    let mut rng = get_rng(14);
    let mut maci = get_maci(2, 2, false);
    let participant = get_participant(0);
    sign_up(&mut maci, 0, &participant, 10, false);

    for _ in 0..3
    {
        push_deactivate_request(&mut maci, &participant, 0, &mut rng);
    }

    let first = maci.process_deactivate_message(10, 1).unwrap();
    assert_eq!(first.size, 2);
    assert_eq!(first.new_deactivate.len(), 2);

    let second = maci.process_deactivate_message(10, 1).unwrap();
    assert_eq!(second.size, 1);
    assert_eq!(second.new_deactivate.len(), 1);
    assert_eq!(maci.processed_deactivate_count(), 3);
    assert_eq!(second.input.deactivate_index0, 2);
    assert_eq!(second.input.batch_start_hash, maci.deactivate_messages()[1].hash);
    assert_eq!(second.input.current_deactivate_root, first.root);

    // The latest processed request sets the epoch.
    assert_eq!(maci.active_state_tree().leaf(0).unwrap(), Fr::from(3u64));
}

/// The deactivation log is bounded by its tree, and the last batch pads past
/// the final leaf without failing.
#[test]
fn deactivate_log_fills_tree()
{
    let mut rng = get_rng(24);
    let config = MaciConfig {
        state_tree_depth: 0,
        int_state_tree_depth: 0,
        ..get_config(1, 4, false)
    };
    let mut maci = Maci::new(config, get_coordinator()).unwrap();
    let participant = get_participant(0);
    sign_up(&mut maci, 0, &participant, 10, false);

    let capacity = maci.deactivate_tree().capacity();
    assert_eq!(capacity, 25);
    for _ in 0..capacity
    {
        push_deactivate_request(&mut maci, &participant, 0, &mut rng);
    }

    let first = maci.deactivate_messages()[0].clone();
    assert_eq!(
        maci.push_deactivate_message(first.ciphertext, first.enc_pub_key).unwrap_err(),
        MaciError::LogFull { log: "deactivate", capacity: 25 }
    );
    assert_eq!(maci.deactivate_messages().len(), 25);

    for _ in 0..6
    {
        assert_eq!(maci.process_deactivate_message(4, 1).unwrap().size, 4);
    }
    assert_eq!(maci.processed_deactivate_count(), 24);

    let last = maci.process_deactivate_message(4, 1).unwrap();
    assert_eq!(last.size, 1);
    assert_eq!(last.new_deactivate.len(), 1);
    assert_eq!(last.input.deactivate_index0, 24);
    assert_eq!(last.root, maci.deactivate_tree().root());

    let last_path = maci.deactivate_tree().path_element_of(24).unwrap();
    assert!(last.input.deactivate_leaves_path_elements.iter().all(|path| *path == last_path));

    assert_eq!(maci.processed_deactivate_count(), 25);
    assert_eq!(maci.active_state_tree().leaf(0).unwrap(), Fr::from(25u64));
    assert!(matches!(maci.process_deactivate_message(4, 1), Err(MaciError::EmptyBatch(_))));
}

/// A participant whose sign up ciphertext is odd is treated as deactivated.
#[test]
fn odd_sign_up_deactivated()
{
    let mut rng = get_rng(15);
    let mut maci = get_maci(1, 5, false);
    let participant = get_participant(1);
    sign_up(&mut maci, 0, &participant, 100, true);

    push_ballot(&mut maci, &participant, 1, 0, 0, 1, &mut rng);
    push_deactivate_request(&mut maci, &participant, 0, &mut rng);

    let command = maci.commands()[0].clone();
    assert!(command.is_some());
    assert_eq!(maci.check_command_now(command.as_ref()).unwrap(), Some(CommandError::Deactivated));

    let request = maci.deactivate_commands()[0].clone();
    assert_eq!(maci.check_deactivate_command(request.as_ref(), 1).unwrap(), Some(CommandError::Deactivated));
}

/// Each check reports its own rejection.
#[test]
fn command_checks()
{
    let mut rng = get_rng(16);
    let mut maci = get_maci(2, 5, true);
    let participant = get_participant(1);
    let stranger = get_participant(2);
    sign_up(&mut maci, 0, &participant, 16, false);

    push_ballot(&mut maci, &participant, 1, 0, 0, 4, &mut rng);
    push_ballot(&mut maci, &participant, 1, 3, 0, 1, &mut rng);
    push_ballot(&mut maci, &participant, 1, 0, 5, 1, &mut rng);
    push_ballot(&mut maci, &participant, 2, 0, 0, 1, &mut rng);
    push_ballot(&mut maci, &stranger, 1, 0, 0, 1, &mut rng);
    push_ballot(&mut maci, &participant, 1, 0, 0, 5, &mut rng);

    let check = |index: usize| maci.check_command_now(maci.commands()[index].as_ref()).unwrap();
    assert_eq!(check(0), None);
    assert_eq!(check(1), Some(CommandError::StateLeafIndexOverflow));
    assert_eq!(check(2), Some(CommandError::VoteOptionIndexOverflow));
    assert_eq!(check(3), Some(CommandError::NonceError));
    assert_eq!(check(4), Some(CommandError::SignatureError));
    assert_eq!(check(5), Some(CommandError::InsufficientBalance));
    assert_eq!(maci.check_command_now(None).unwrap(), Some(CommandError::EmptyCommand));

    assert_eq!(CommandError::StateLeafIndexOverflow.to_string(), "state leaf index overflow");
    assert_eq!(CommandError::InsufficientBalance.to_string(), "insufficient balance");
}

/// A replayed active state marks the listed keys inactive.
#[test]
fn init_active_state_replay()
{
    let mut rng = get_rng(17);
    let mut maci = get_maci(2, 5, false);
    let participant = get_participant(1);
    sign_up(&mut maci, 1, &participant, 10, false);

    maci.init_active_state(&[Fr::zero(), Fr::from(5u64)]).unwrap();
    push_ballot(&mut maci, &participant, 1, 1, 0, 1, &mut rng);
    assert_eq!(maci.check_command_now(maci.commands()[0].as_ref()).unwrap(), Some(CommandError::Inactive));

    maci.end_vote_period().unwrap();
    assert!(matches!(maci.init_active_state(&[]), Err(MaciError::Lifecycle { .. })));
}

/// A round without ballots or participants needs no batches at all.
#[test]
fn empty_round_ends_immediately()
{
    let mut maci = get_maci(0, 5, false);
    maci.end_vote_period().unwrap();
    assert_eq!(maci.state(), MaciState::Ended);
    assert_eq!(maci.state_commitment(), hash2([maci.state_root(), Fr::zero()]).unwrap());

    assert!(matches!(maci.process_tally(Fr::zero()), Err(MaciError::Lifecycle { .. })));
    assert!(matches!(maci.process_message(Fr::zero()), Err(MaciError::Lifecycle { .. })));
}

/// Without ballots the round goes straight to tallying the sign ups.
#[test]
fn round_without_ballots()
{
    let mut maci = get_maci(2, 5, false);
    sign_up(&mut maci, 0, &get_participant(0), 10, false);
    sign_up(&mut maci, 1, &get_participant(1), 10, false);

    maci.end_vote_period().unwrap();
    assert_eq!(maci.state(), MaciState::Tallying);

    let salt = Fr::from(5u64);
    let tally = maci.process_tally(salt).unwrap();
    let empty_results = QuinaryTree::new(1, Fr::zero()).unwrap();

    assert_eq!(tally.current_tally_commitment, Fr::zero());
    assert_eq!(tally.new_tally_commitment, hash2([empty_results.root(), salt]).unwrap());
    assert_eq!(tally.packed_vals, Fr::from(2u64 << 32));
    assert_eq!(tally.state_path_elements.len(), 1);
    assert_eq!(tally.state_leaf.len(), 5);
    assert_eq!(tally.votes[0], vec![Fr::zero(); 5]);
    assert_eq!(maci.state(), MaciState::Ended);
    assert_eq!(maci.tally_commitment(), tally.new_tally_commitment);
}

/// Operations are refused outside of their period.
#[test]
fn lifecycle_violations()
{
    let mut rng = get_rng(18);
    let mut maci = get_maci(1, 5, false);
    let participant = get_participant(1);
    sign_up(&mut maci, 0, &participant, 10, false);

    assert_eq!(
        maci.process_message(Fr::zero()).unwrap_err(),
        MaciError::Lifecycle { expected: MaciState::Processing, actual: MaciState::Filling }
    );
    assert!(matches!(maci.end_processing_period(), Err(MaciError::Lifecycle { .. })));

    push_ballot(&mut maci, &participant, 1, 0, 0, 1, &mut rng);
    maci.end_vote_period().unwrap();
    assert_eq!(maci.state(), MaciState::Processing);

    let (ciphertext, enc_pub_key) = (maci.messages()[0].ciphertext.clone(), maci.messages()[0].enc_pub_key);
    assert_eq!(
        maci.push_message(ciphertext.clone(), enc_pub_key).unwrap_err(),
        MaciError::Lifecycle { expected: MaciState::Filling, actual: MaciState::Processing }
    );
    assert!(matches!(maci.push_deactivate_message(ciphertext, enc_pub_key), Err(MaciError::Lifecycle { .. })));
    assert!(matches!(maci.init_state_tree(0, participant.pub_key, BigUint::default(), [Fr::zero(); 4]), Err(MaciError::Lifecycle { .. })));
    assert!(matches!(maci.process_deactivate_message(1, 1), Err(MaciError::Lifecycle { .. })));
    assert!(matches!(maci.end_vote_period(), Err(MaciError::Lifecycle { .. })));
    assert_eq!(
        maci.process_tally(Fr::zero()).unwrap_err(),
        MaciError::Lifecycle { expected: MaciState::Tallying, actual: MaciState::Processing }
    );
}

/// Each message commits to its predecessor.
#[test]
fn message_hash_chain()
{
    let mut rng = get_rng(19);
    let mut maci = get_maci(1, 5, false);
    let participant = get_participant(1);

    for nonce in 1..=3
    {
        push_ballot(&mut maci, &participant, nonce, 0, 0, 1, &mut rng);
    }
    maci.push_message(vec![Fr::from(9u64); 7], participant.pub_key).unwrap();

    let messages = maci.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].prev_hash, Fr::zero());
    for (k, message) in messages.iter().enumerate()
    {
        if k > 0 { assert_eq!(message.prev_hash, messages[k - 1].hash); }
        assert_eq!(
            message.hash,
            hash_message_and_enc_pub_key(&message.ciphertext, &message.enc_pub_key, &message.prev_hash).unwrap()
        );
    }

    // A ciphertext that does not decrypt is kept without a command.
    assert!(maci.commands()[..3].iter().all(Option::is_some));
    assert!(maci.commands()[3].is_none());

    assert!(matches!(
        maci.push_message(vec![Fr::zero(); 5], participant.pub_key),
        Err(MaciError::InvalidMessage(_))
    ));
    assert_eq!(maci.messages().len(), 4);
}

/// Message batches cover the tail first and stop at the oldest message.
#[test]
fn message_batch_boundaries()
{
    let mut rng = get_rng(20);
    let mut maci = get_maci(1, 2, false);
    let participant = get_participant(1);
    sign_up(&mut maci, 0, &participant, 100, false);

    for nonce in [3, 2, 1]
    {
        push_ballot(&mut maci, &participant, nonce, 0, 0, nonce as u128, &mut rng);
    }
    maci.end_vote_period().unwrap();

    let state_tree = maci.state_tree().clone();
    let tail = maci.process_message(Fr::from(1u64)).unwrap();
    assert_eq!(tail.batch_start_hash, maci.messages()[2].prev_hash);
    assert_eq!(tail.batch_end_hash, maci.messages()[2].hash);
    assert_eq!(tail.msgs.len(), 2);
    assert_eq!(tail.msgs[1], vec![Fr::zero(); 7]);
    assert_eq!(tail.enc_pub_keys[1], [Fr::zero(), Fr::zero()]);
    assert_eq!(maci.msg_end_idx(), 2);

    // The padding slot is witnessed at the last state leaf, before the batch applies.
    assert_eq!(tail.current_state_leaves_path_elements[1], state_tree.path_element_of(24).unwrap());
    assert_ne!(maci.state_root(), state_tree.root());

    let head = maci.process_message(Fr::from(2u64)).unwrap();
    assert_eq!(head.batch_start_hash, Fr::zero());
    assert_eq!(head.batch_end_hash, maci.messages()[1].hash);
    assert!(head.rejections.is_empty());
    assert_eq!(maci.state(), MaciState::Tallying);
    assert_eq!(maci.state_leaf(0).unwrap().nonce, 3);
    assert_eq!(balance(&maci, 0), BigUint::from(97u32));
}

/// The public input hash binds the documented values in order.
#[test]
fn message_input_hash()
{
    let mut rng = get_rng(21);
    let mut maci = get_maci(1, 1, true);
    let participant = get_participant(1);
    sign_up(&mut maci, 0, &participant, 100, false);
    push_ballot(&mut maci, &participant, 1, 0, 2, 3, &mut rng);
    maci.end_vote_period().unwrap();

    let current_state_commitment = maci.state_commitment();
    let salt = Fr::from(77u64);
    let input = maci.process_message(salt).unwrap();

    assert_eq!(input.packed_vals, Fr::from(5u128 + (1u128 << 32) + (1u128 << 64)));
    assert_eq!(input.current_state_commitment, current_state_commitment);
    assert_eq!(input.new_state_commitment, hash2([maci.state_root(), salt]).unwrap());
    assert_eq!(
        input.deactivate_commitment,
        hash2([maci.active_state_tree().root(), maci.deactivate_tree().root()]).unwrap()
    );

    let expected = sha256_input_hash(&[
        input.packed_vals,
        get_coordinator().pub_key_hash().unwrap(),
        input.batch_start_hash,
        input.batch_end_hash,
        input.current_state_commitment,
        input.new_state_commitment,
        input.deactivate_commitment,
    ]);
    assert_eq!(input.input_hash, expected);
    assert_eq!(maci.state_commitment(), input.new_state_commitment);
    assert_eq!(maci.state_salt(), salt);
}

/// Replaying a batch from the same state yields the same witness.
#[test]
fn batches_are_deterministic()
{
    let mut rng = get_rng(22);
    let mut maci = get_maci(3, 5, true);
    let participants: Vec<Keypair> = (0..3).map(get_participant).collect();
    for (index, participant) in participants.iter().enumerate()
    {
        sign_up(&mut maci, index as u64, participant, 20, false);
    }
    push_deactivate_request(&mut maci, &participants[2], 2, &mut rng);
    push_ballot(&mut maci, &participants[0], 1, 0, 1, 3, &mut rng);
    push_ballot(&mut maci, &participants[1], 1, 1, 4, 2, &mut rng);

    let mut replay = maci.clone();
    let deactivate = maci.process_deactivate_message(5, 3).unwrap();
    assert_eq!(replay.process_deactivate_message(5, 3).unwrap(), deactivate);

    maci.end_vote_period().unwrap();
    replay.end_vote_period().unwrap();

    let input = maci.process_message(Fr::from(8u64)).unwrap();
    let replayed = replay.process_message(Fr::from(8u64)).unwrap();
    assert_eq!(input, replayed);
    assert_eq!(serde_json::to_string(&input).unwrap(), serde_json::to_string(&replayed).unwrap());

    let tally = maci.process_tally(Fr::from(9u64)).unwrap();
    assert_eq!(replay.process_tally(Fr::from(9u64)).unwrap(), tally);
    assert_eq!(maci.results(), replay.results());
    assert_eq!(maci.results()[1], (BigUint::from(3u32), BigUint::from(9u32)));
    assert_eq!(maci.results()[4], (BigUint::from(2u32), BigUint::from(4u32)));
}

/// Witnesses serialize as circom inputs: camel case names and decimal strings.
#[test]
fn witness_serialization()
{
    let mut rng = get_rng(23);
    let mut maci = get_maci(1, 2, false);
    let participant = get_participant(1);
    sign_up(&mut maci, 0, &participant, 100, false);
    push_ballot(&mut maci, &participant, 1, 0, 0, 3, &mut rng);
    maci.end_vote_period().unwrap();

    let input = maci.process_message(Fr::zero()).unwrap();
    let json = serde_json::to_value(&input).unwrap();

    assert!(json["inputHash"].is_string());
    assert_eq!(json["packedVals"], serde_json::json!("4294967301"));
    assert_eq!(json["currentStateLeaves"].as_array().unwrap().len(), 2);
    assert_eq!(json["currentStateLeaves"][0].as_array().unwrap().len(), 10);
    assert_eq!(json["currentStateLeaves"][0][2], serde_json::json!("100"));
    assert_eq!(json["currentStateLeavesPathElements"][0][0].as_array().unwrap().len(), 4);
    assert_eq!(json["newStateSalt"], serde_json::json!("0"));
    assert!(json.get("rejections").is_none());

    let tally = serde_json::to_value(maci.process_tally(Fr::one()).unwrap()).unwrap();
    assert_eq!(tally["newResultsRootSalt"], serde_json::json!("1"));
    assert_eq!(tally["votes"][0][0], serde_json::json!("3"));
}

/// Inconsistent configurations are refused.
#[test]
fn config_validation()
{
    let coordinator = get_coordinator();
    let zero_leaves = ZeroLeaves::compute().unwrap();
    let invalid = |config| matches!(
        Maci::with_zero_leaves(config, coordinator.clone(), zero_leaves),
        Err(MaciError::InvalidConfig(_))
    );

    assert!(invalid(get_config(1, 0, false)));
    assert!(invalid(get_config(26, 5, false)));
    assert!(invalid(crate::maci::MaciConfig { int_state_tree_depth: 3, ..get_config(1, 5, false) }));
    assert!(invalid(crate::maci::MaciConfig { max_vote_options: 6, ..get_config(1, 5, false) }));
    assert!(invalid(crate::maci::MaciConfig { state_tree_depth: 8, ..get_config(1, 5, false) }));
    assert!(invalid(crate::maci::MaciConfig { vote_option_tree_depth: 10, ..get_config(1, 5, false) }));

    let maci = Maci::with_zero_leaves(get_config(25, 5, false), coordinator, zero_leaves).unwrap();
    assert_eq!(maci.state_root(), QuinaryTree::new(2, zero_leaves.zero_hash10).unwrap().root());
    assert_eq!(maci.zero_leaves(), zero_leaves);
}

/// Command fields survive packing, and the salt does not disturb them.
#[test]
fn command_packing()
{
    let salt = BigUint::from(0xdead_beefu64);
    let packed = Command::pack(7, 3, 2, (1u128 << 95) + 9, Some(&salt));
    assert_eq!(Command::unpack(&packed), (7, 3, 2, (1u128 << 95) + 9));

    // Weights are truncated to 96 bits.
    let packed = Command::pack(1, 0, 0, (1u128 << 96) + 4, None);
    assert_eq!(Command::unpack(&packed), (1, 0, 0, 4));

    assert_eq!(Command::from_plaintext(&[Fr::zero(); 5]).unwrap(), None);
}
