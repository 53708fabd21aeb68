use ark_bn254::Fr;
use ark_ff::Zero;
use num_bigint::BigUint;

use crate::crypto::{
    decrypt_odevity,
    encrypt_odevity,
    gen_ecdh_shared_key,
    gen_static_random_key,
    Point
};
use crate::error::{MaciError, Result};
use crate::hash::{hash2, hash5, sha256_input_hash};
use crate::maci::{
    Command,
    CommandError,
    DeactivateBatch,
    Maci,
    MaciState,
    Message,
    ProcessDeactivateInput,
    ProcessMessageInput,
    Rejection,
    StateLeaf,
    TallyInput,
    DEACTIVATE_SALT_TAG,
    TALLY_SEPARATOR
};
use crate::maci::message::{MAX_MESSAGE_LENGTH, MESSAGE_LENGTH};
use crate::tree::{QuinaryMerkleTree, QuinaryTree};
use crate::types::{fr_to_biguint, PathElements, StateIndex, StateLeafValues};

pub trait MaciProvider
{
    /// Registers or replaces the participant at `index`.
    fn init_state_tree(
        &mut self,
        index: StateIndex,
        pub_key: Point,
        balance: BigUint,
        deactivation: [Fr; 4]
    ) -> Result<()>;

    /// Replays an externally stored active state leaf array.
    fn init_active_state(&mut self, leaves: &[Fr]) -> Result<()>;

    fn push_message(&mut self, ciphertext: Vec<Fr>, enc_pub_key: Point) -> Result<()>;

    fn push_deactivate_message(&mut self, ciphertext: Vec<Fr>, enc_pub_key: Point) -> Result<()>;

    fn end_vote_period(&mut self) -> Result<()>;

    fn process_deactivate_message(
        &mut self,
        input_size: u64,
        sub_state_tree_length: u64
    ) -> Result<DeactivateBatch>;

    fn process_message(&mut self, new_state_salt: Fr) -> Result<ProcessMessageInput>;

    fn end_processing_period(&mut self) -> Result<()>;

    fn process_tally(&mut self, new_tally_salt: Fr) -> Result<TallyInput>;

    /// Validates a ballot against the current state.
    fn check_command_now(&self, command: Option<&Command>) -> Result<Option<CommandError>>;

    /// Validates a deactivation request against the first
    /// `sub_state_tree_length` participants.
    fn check_deactivate_command(
        &self,
        command: Option<&Command>,
        sub_state_tree_length: u64
    ) -> Result<Option<CommandError>>;
}

/// Takes the messages and commands in `start..end` and pads them to `size`.
fn padded_batch(
    messages: &[Message],
    commands: &[Option<Command>],
    start: usize,
    end: usize,
    size: usize
) -> (Vec<Message>, Vec<Option<Command>>)
{
    let mut batch_messages = messages[start..end].to_vec();
    let mut batch_commands = commands[start..end].to_vec();

    batch_messages.resize(size, Message::empty());
    batch_commands.resize(size, None);

    (batch_messages, batch_commands)
}

fn enc_pub_keys(messages: &[Message]) -> Vec<[Fr; 2]>
{
    messages.iter().map(|message| message.enc_pub_key.as_array()).collect()
}

fn ciphertexts(messages: &[Message]) -> Vec<Vec<Fr>>
{
    messages.iter().map(|message| message.ciphertext.clone()).collect()
}

fn validate_ciphertext(ciphertext: &[Fr]) -> Result<()>
{
    if ciphertext.len() != MESSAGE_LENGTH && ciphertext.len() != MAX_MESSAGE_LENGTH
    {
        Err(MaciError::InvalidMessage(format!(
            "ciphertext of {} words, expected {} or {}",
            ciphertext.len(),
            MESSAGE_LENGTH,
            MAX_MESSAGE_LENGTH
        )))?
    }
    Ok(())
}

impl Maci
{
    /// Appends a message to a hash chained log and tries to decrypt it.
    fn append_message(
        &self,
        log: &[Message],
        ciphertext: Vec<Fr>,
        enc_pub_key: Point
    ) -> Result<(Message, Option<Command>)>
    {
        validate_ciphertext(&ciphertext)?;

        let prev_hash = log.last().map(|message| message.hash).unwrap_or_else(Fr::zero);
        let command = Command::decrypt(&ciphertext, &enc_pub_key, &self.coordinator);
        let message = Message::new(ciphertext, enc_pub_key, prev_hash)?;

        Ok((message, command))
    }

    /// The highest state index, used by slots without a valid command.
    fn sentinel_state_index(&self) -> StateIndex
    {
        self.config.state_capacity() - 1
    }

    fn deactivate_commitment(&self) -> Result<Fr>
    {
        Ok(hash2([self.active_state_tree.root(), self.deactivate_tree.root()])?)
    }
}

impl MaciProvider for Maci
{
    fn init_state_tree(
        &mut self,
        index: StateIndex,
        pub_key: Point,
        balance: BigUint,
        deactivation: [Fr; 4]
    ) -> Result<()>
    {
        self.ensure_state(MaciState::Filling)?;

        let leaf = StateLeaf::new(pub_key, balance, deactivation, self.config.vote_option_tree_depth)?;
        self.state_tree.update_leaf(index, leaf.hash()?)?;
        self.state_leaves.insert(index, leaf);

        tracing::debug!(index, "state leaf initialized");
        Ok(())
    }

    fn init_active_state(&mut self, leaves: &[Fr]) -> Result<()>
    {
        self.ensure_state(MaciState::Filling)?;
        self.active_state_tree.init_leaves(leaves)?;
        Ok(())
    }

    fn push_message(&mut self, ciphertext: Vec<Fr>, enc_pub_key: Point) -> Result<()>
    {
        self.ensure_state(MaciState::Filling)?;

        let (message, command) = self.append_message(&self.messages, ciphertext, enc_pub_key)?;
        if command.is_none()
        {
            tracing::debug!(index = self.messages.len(), "message stored without a command");
        }

        self.messages.push(message);
        self.commands.push(command);
        Ok(())
    }

    fn push_deactivate_message(&mut self, ciphertext: Vec<Fr>, enc_pub_key: Point) -> Result<()>
    {
        self.ensure_state(MaciState::Filling)?;

        // Every request is answered with a leaf of the deactivation tree.
        let capacity = self.deactivate_tree.capacity();
        if self.deactivate_messages.len() as u64 >= capacity
        {
            Err(MaciError::LogFull { log: "deactivate", capacity })?
        }

        let (message, command) = self.append_message(&self.deactivate_messages, ciphertext, enc_pub_key)?;
        if command.is_none()
        {
            tracing::debug!(index = self.deactivate_messages.len(), "deactivate message stored without a command");
        }

        self.deactivate_messages.push(message);
        self.deactivate_commands.push(command);
        Ok(())
    }

    fn end_vote_period(&mut self) -> Result<()>
    {
        self.ensure_state(MaciState::Filling)?;

        self.state = MaciState::Processing;
        self.msg_end_idx = self.messages.len() as u64;
        self.state_salt = Fr::zero();
        self.state_commitment = hash2([self.state_tree.root(), Fr::zero()])?;

        tracing::info!(messages = self.msg_end_idx, "vote period ended");

        if self.msg_end_idx == 0
        {
            self.end_processing_period()?;
        }
        Ok(())
    }

    fn process_deactivate_message(
        &mut self,
        input_size: u64,
        sub_state_tree_length: u64
    ) -> Result<DeactivateBatch>
    {
        self.ensure_state(MaciState::Filling)?;

        let batch_size = self.config.batch_size;
        let remaining = self.deactivate_messages.len() as u64 - self.processed_deactivate_count;
        let size = input_size.min(batch_size as u64).min(remaining);
        if size == 0 { Err(MaciError::EmptyBatch("deactivate messages"))? }

        let batch_start = self.processed_deactivate_count;
        let batch_end = batch_start + size;
        let capacity = self.deactivate_tree.capacity();
        if batch_end > capacity
        {
            Err(MaciError::LogFull { log: "deactivate", capacity })?
        }
        let (messages, commands) = padded_batch(
            &self.deactivate_messages,
            &self.deactivate_commands,
            batch_start as usize,
            batch_end as usize,
            batch_size
        );

        let sub_state_tree = self.state_tree.sub_tree(sub_state_tree_length)?;
        let current_active_state_root = self.active_state_tree.root();
        let current_deactivate_root = self.deactivate_tree.root();
        let current_deactivate_commitment = self.deactivate_commitment()?;

        let mut c1 = Vec::with_capacity(batch_size);
        let mut c2 = Vec::with_capacity(batch_size);
        let mut current_active_state = Vec::with_capacity(batch_size);
        let mut new_active_state = Vec::with_capacity(batch_size);
        let mut current_state_leaves = Vec::with_capacity(batch_size);
        let mut current_state_leaves_path_elements = Vec::with_capacity(batch_size);
        let mut active_state_leaves_path_elements = Vec::with_capacity(batch_size);
        let mut deactivate_leaves_path_elements = Vec::with_capacity(batch_size);
        let mut new_deactivate = Vec::new();
        let mut rejections = Vec::new();

        for (slot, command) in commands.iter().enumerate()
        {
            let deactivate_index = batch_start + slot as u64;
            let error = self.check_deactivate_command(command.as_ref(), sub_state_tree_length)?;

            let sentinel = self.sentinel_state_index();
            let state_idx = match (error, command)
            {
                (None, Some(command)) => command.state_idx,
                (Some(CommandError::SignatureError), Some(command)) => command.state_idx.min(sentinel),
                _ => sentinel,
            };

            let leaf = self.state_leaf_or_empty(state_idx)?;
            let shared_key = gen_ecdh_shared_key(&self.coordinator.formatted_priv_key, &leaf.pub_key);
            let salt = gen_static_random_key(&self.coordinator.priv_key, DEACTIVATE_SALT_TAG, deactivate_index)?;
            let ciphertext = encrypt_odevity(error.is_some(), &self.coordinator.pub_key, &salt)?;

            let deactivate_leaf = [
                ciphertext.c1.x,
                ciphertext.c1.y,
                ciphertext.c2.x,
                ciphertext.c2.y,
                hash2(shared_key.as_array())?,
            ];

            let active_state = self.active_state_tree.leaf(state_idx)?;
            current_active_state.push(active_state);
            current_state_leaves.push(leaf.values());
            current_state_leaves_path_elements.push(sub_state_tree.path_element_of(state_idx)?);
            active_state_leaves_path_elements.push(self.active_state_tree.path_element_of(state_idx)?);
            // Padding past the last leaf is witnessed at the last leaf.
            let path_index = deactivate_index.min(capacity - 1);
            deactivate_leaves_path_elements.push(self.deactivate_tree.path_element_of(path_index)?);
            c1.push(ciphertext.c1.as_array());
            c2.push(ciphertext.c2.as_array());

            let is_real = deactivate_index < batch_end;
            match error
            {
                None =>
                {
                    let epoch = Fr::from(deactivate_index + 1);
                    self.active_state_tree.update_leaf(state_idx, epoch)?;
                    self.deactivate_tree.update_leaf(deactivate_index, hash5(deactivate_leaf)?)?;
                    new_active_state.push(epoch);
                    new_deactivate.push(deactivate_leaf);
                },
                Some(reason) =>
                {
                    new_active_state.push(active_state);
                    if is_real
                    {
                        self.deactivate_tree.update_leaf(deactivate_index, hash5(deactivate_leaf)?)?;
                        new_deactivate.push(deactivate_leaf);

                        tracing::debug!(slot, state_idx, %reason, "deactivate command rejected");
                        rejections.push(Rejection { slot, message_index: deactivate_index as usize, reason });
                    }
                },
            }
        }

        let new_deactivate_root = self.deactivate_tree.root();
        let new_deactivate_commitment = self.deactivate_commitment()?;
        let batch_start_hash = self.deactivate_messages[batch_start as usize].prev_hash;
        let batch_end_hash = self.deactivate_messages[batch_end as usize - 1].hash;
        let current_state_root = sub_state_tree.root();

        let input_hash = sha256_input_hash(&[
            new_deactivate_root,
            self.coordinator_pub_key_hash,
            batch_start_hash,
            batch_end_hash,
            current_deactivate_commitment,
            new_deactivate_commitment,
            current_state_root,
        ]);

        self.processed_deactivate_count = batch_end;

        tracing::info!(
            batch_start,
            batch_end,
            rejected = rejections.len(),
            "deactivate batch processed"
        );

        Ok(DeactivateBatch {
            input: ProcessDeactivateInput {
                input_hash,
                current_active_state_root,
                current_deactivate_root,
                batch_start_hash,
                batch_end_hash,
                msgs: ciphertexts(&messages),
                coord_priv_key: self.coordinator.formatted_priv_key.clone(),
                coord_pub_key: self.coordinator.pub_key.as_array(),
                enc_pub_keys: enc_pub_keys(&messages),
                c1,
                c2,
                current_active_state,
                new_active_state,
                deactivate_index0: batch_start,
                current_state_root,
                current_state_leaves,
                current_state_leaves_path_elements,
                active_state_leaves_path_elements,
                deactivate_leaves_path_elements,
                current_deactivate_commitment,
                new_deactivate_root,
                new_deactivate_commitment,
            },
            new_deactivate,
            size,
            root: new_deactivate_root,
            rejections,
        })
    }

    fn process_message(&mut self, new_state_salt: Fr) -> Result<ProcessMessageInput>
    {
        self.ensure_state(MaciState::Processing)?;
        if self.msg_end_idx == 0 { Err(MaciError::EmptyBatch("messages"))? }

        let batch_size = self.config.batch_size;
        let batch_start = ((self.msg_end_idx - 1) / batch_size as u64) * batch_size as u64;
        let batch_end = (batch_start + batch_size as u64).min(self.msg_end_idx);
        let (messages, commands) = padded_batch(
            &self.messages,
            &self.commands,
            batch_start as usize,
            batch_end as usize,
            batch_size
        );

        let current_state_root = self.state_tree.root();
        let active_state_root = self.active_state_tree.root();
        let deactivate_root = self.deactivate_tree.root();
        let deactivate_commitment = self.deactivate_commitment()?;

        let mut current_state_leaves: Vec<StateLeafValues> = vec![[Fr::zero(); 10]; batch_size];
        let mut current_state_leaves_path_elements: Vec<PathElements> = vec![Vec::new(); batch_size];
        let mut current_vote_weights = vec![Fr::zero(); batch_size];
        let mut current_vote_weights_path_elements: Vec<PathElements> = vec![Vec::new(); batch_size];
        let mut active_state_leaves = vec![Fr::zero(); batch_size];
        let mut active_state_leaves_path_elements: Vec<PathElements> = vec![Vec::new(); batch_size];
        let mut rejections = Vec::new();

        for slot in (0..batch_size).rev()
        {
            let command = commands[slot].as_ref();
            let error = self.check_command_now(command)?;

            let (state_idx, vo_idx) = match (error, command)
            {
                (None, Some(command)) => (command.state_idx, command.vo_idx),
                _ => (self.sentinel_state_index(), 0),
            };

            let mut leaf = self.state_leaf_or_empty(state_idx)?;
            let current_vote_weight = leaf.vote_option_tree.leaf(vo_idx)?;

            current_state_leaves[slot] = leaf.values();
            current_state_leaves_path_elements[slot] = self.state_tree.path_element_of(state_idx)?;
            current_vote_weights[slot] = current_vote_weight;
            current_vote_weights_path_elements[slot] = leaf.vote_option_tree.path_element_of(vo_idx)?;
            active_state_leaves[slot] = self.active_state_tree.leaf(state_idx)?;
            active_state_leaves_path_elements[slot] = self.active_state_tree.path_element_of(state_idx)?;

            if let Some(reason) = error
            {
                let message_index = batch_start as usize + slot;
                if message_index < batch_end as usize
                {
                    tracing::debug!(slot, message_index, %reason, "command rejected");
                    rejections.push(Rejection { slot, message_index, reason });
                }
                continue;
            }
            let Some(command) = command else { continue };

            let current = fr_to_biguint(&current_vote_weight);
            let new = BigUint::from(command.new_votes);
            leaf.balance = if self.config.is_quadratic_cost
            {
                &leaf.balance + &current * &current - &new * &new
            }
            else
            {
                &leaf.balance + &current - &new
            };

            leaf.pub_key = command.new_pub_key;
            leaf.vote_option_tree.update_leaf(vo_idx, Fr::from(command.new_votes))?;
            leaf.nonce = command.nonce;
            leaf.voted = true;

            self.state_tree.update_leaf(state_idx, leaf.hash()?)?;
            self.state_leaves.insert(state_idx, leaf);
        }

        let rejected = rejections.len();

        let new_state_root = self.state_tree.root();
        let new_state_commitment = hash2([new_state_root, new_state_salt])?;

        let mut packed_vals = self.config.max_vote_options as u128 + ((self.config.num_sign_ups as u128) << 32);
        if self.config.is_quadratic_cost
        {
            packed_vals += 1u128 << 64;
        }
        let packed_vals = Fr::from(packed_vals);

        let batch_start_hash = self.messages[batch_start as usize].prev_hash;
        let batch_end_hash = self.messages[batch_end as usize - 1].hash;

        let input_hash = sha256_input_hash(&[
            packed_vals,
            self.coordinator_pub_key_hash,
            batch_start_hash,
            batch_end_hash,
            self.state_commitment,
            new_state_commitment,
            deactivate_commitment,
        ]);

        let input = ProcessMessageInput {
            input_hash,
            packed_vals,
            batch_start_hash,
            batch_end_hash,
            msgs: ciphertexts(&messages),
            coord_priv_key: self.coordinator.formatted_priv_key.clone(),
            coord_pub_key: self.coordinator.pub_key.as_array(),
            enc_pub_keys: enc_pub_keys(&messages),
            current_state_root,
            current_state_leaves,
            current_state_leaves_path_elements,
            current_state_commitment: self.state_commitment,
            current_state_salt: self.state_salt,
            new_state_commitment,
            new_state_salt,
            current_vote_weights,
            current_vote_weights_path_elements,
            active_state_root,
            deactivate_root,
            deactivate_commitment,
            active_state_leaves,
            active_state_leaves_path_elements,
            rejections,
        };

        self.msg_end_idx = batch_start;
        self.state_commitment = new_state_commitment;
        self.state_salt = new_state_salt;

        tracing::info!(
            batch_start,
            batch_end,
            rejected,
            "message batch processed"
        );

        if batch_start == 0
        {
            self.end_processing_period()?;
        }

        Ok(input)
    }

    fn end_processing_period(&mut self) -> Result<()>
    {
        self.ensure_state(MaciState::Processing)?;

        self.state = MaciState::Tallying;
        self.batch_num = 0;
        self.tally_salt = Fr::zero();
        self.tally_commitment = Fr::zero();
        self.tally_tree = QuinaryTree::new(self.config.vote_option_tree_depth, Fr::zero())?;

        tracing::info!("processing period ended");

        if self.config.num_sign_ups == 0
        {
            self.state = MaciState::Ended;
            tracing::info!("round ended without sign ups");
        }
        Ok(())
    }

    fn process_tally(&mut self, new_tally_salt: Fr) -> Result<TallyInput>
    {
        self.ensure_state(MaciState::Tallying)?;

        let batch_size = self.config.tally_batch_size();
        let batch_start = self.batch_num * batch_size;
        let batch_end = batch_start + batch_size;

        let state_path_elements = self.state_tree
            .path_element_of(batch_start)?
            .split_off(self.config.int_state_tree_depth as usize);

        let current_results = self.tally_tree.leaves().to_vec();
        let mut results = current_results.clone();

        let mut state_leaf = Vec::with_capacity(batch_size as usize);
        let mut votes = Vec::with_capacity(batch_size as usize);

        for index in batch_start..batch_end
        {
            let leaf = self.state_leaf_or_empty(index)?;
            state_leaf.push(leaf.values());
            votes.push(leaf.vote_option_tree.leaves().to_vec());

            if !leaf.voted { continue; }

            for (result, weight) in results.iter_mut().zip(leaf.vote_option_tree.leaves())
            {
                *result += *weight * (*weight + TALLY_SEPARATOR);
            }
        }

        self.tally_tree.init_leaves(&results)?;

        let new_tally_commitment = hash2([self.tally_tree.root(), new_tally_salt])?;
        let packed_vals = Fr::from(self.batch_num as u128 + ((self.config.num_sign_ups as u128) << 32));

        let input_hash = sha256_input_hash(&[
            packed_vals,
            self.state_commitment,
            self.tally_commitment,
            new_tally_commitment,
        ]);

        let input = TallyInput {
            state_root: self.state_tree.root(),
            state_salt: self.state_salt,
            packed_vals,
            state_commitment: self.state_commitment,
            current_tally_commitment: self.tally_commitment,
            new_tally_commitment,
            input_hash,
            state_leaf,
            state_path_elements,
            votes,
            current_results,
            current_results_root_salt: self.tally_salt,
            new_results_root_salt: new_tally_salt,
        };

        self.batch_num += 1;
        self.tally_commitment = new_tally_commitment;
        self.tally_salt = new_tally_salt;

        tracing::info!(batch_start, batch_end, "tally batch processed");

        if batch_end >= self.config.num_sign_ups
        {
            self.state = MaciState::Ended;
            tracing::info!("round ended");
        }

        Ok(input)
    }

    fn check_command_now(&self, command: Option<&Command>) -> Result<Option<CommandError>>
    {
        let Some(command) = command else { return Ok(Some(CommandError::EmptyCommand)) };

        if command.state_idx > self.config.num_sign_ups || command.state_idx >= self.config.state_capacity()
        {
            return Ok(Some(CommandError::StateLeafIndexOverflow));
        }

        if command.vo_idx >= self.config.max_vote_options
        {
            return Ok(Some(CommandError::VoteOptionIndexOverflow));
        }

        if !self.active_state_tree.leaf(command.state_idx)?.is_zero()
        {
            return Ok(Some(CommandError::Inactive));
        }

        let leaf = self.state_leaf_or_empty(command.state_idx)?;
        if decrypt_odevity(&self.coordinator.formatted_priv_key, &leaf.deactivation())
        {
            return Ok(Some(CommandError::Deactivated));
        }

        if command.nonce != leaf.nonce + 1
        {
            return Ok(Some(CommandError::NonceError));
        }

        if !command.verify_signature(&leaf.pub_key)
        {
            return Ok(Some(CommandError::SignatureError));
        }

        let current = fr_to_biguint(&leaf.vote_option_tree.leaf(command.vo_idx)?);
        let new = BigUint::from(command.new_votes);
        let sufficient = if self.config.is_quadratic_cost
        {
            &leaf.balance + &current * &current >= &new * &new
        }
        else
        {
            &leaf.balance + &current >= new
        };

        if !sufficient
        {
            return Ok(Some(CommandError::InsufficientBalance));
        }

        Ok(None)
    }

    fn check_deactivate_command(
        &self,
        command: Option<&Command>,
        sub_state_tree_length: u64
    ) -> Result<Option<CommandError>>
    {
        let Some(command) = command else { return Ok(Some(CommandError::EmptyCommand)) };

        if command.state_idx >= sub_state_tree_length || command.state_idx >= self.config.state_capacity()
        {
            return Ok(Some(CommandError::StateLeafIndexOverflow));
        }

        let leaf = self.state_leaf_or_empty(command.state_idx)?;
        if decrypt_odevity(&self.coordinator.formatted_priv_key, &leaf.deactivation())
        {
            return Ok(Some(CommandError::Deactivated));
        }

        if !command.verify_signature(&leaf.pub_key)
        {
            return Ok(Some(CommandError::SignatureError));
        }

        Ok(None)
    }
}
