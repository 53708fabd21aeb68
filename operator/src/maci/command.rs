use ark_bn254::Fr;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};

use crate::crypto::{cipher, eddsa, Keypair, Point, Signature};
use crate::error::CipherError;
use crate::hash::{hash3, PoseidonError};
use crate::types::{biguint_to_fr, fr_to_biguint, StateIndex, VoteOptionIndex};

/// The number of plaintext words of a command.
pub const COMMAND_LENGTH: usize = 6;

const NONCE_OFFSET: usize = 0;
const STATE_INDEX_OFFSET: usize = 32;
const VOTE_OPTION_OFFSET: usize = 64;
const NEW_VOTES_OFFSET: usize = 96;
const SALT_OFFSET: usize = 192;

/// Why a command was skipped. These are expected outcomes of processing, not
/// failures of the engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum CommandError
{
    #[error("empty command")]
    EmptyCommand,

    #[error("state leaf index overflow")]
    StateLeafIndexOverflow,

    #[error("vote option index overflow")]
    VoteOptionIndexOverflow,

    /// The participant's key was deactivated in an earlier batch.
    #[error("inactive")]
    Inactive,

    /// The sign up deactivation ciphertext decrypts to an odd value.
    #[error("deactivated")]
    Deactivated,

    #[error("nonce error")]
    NonceError,

    #[error("signature error")]
    SignatureError,

    #[error("insufficient balance")]
    InsufficientBalance,
}

/// A decrypted ballot or deactivation request.
#[derive(Clone, Debug, PartialEq)]
pub struct Command
{
    pub nonce: u64,
    pub state_idx: StateIndex,
    pub vo_idx: VoteOptionIndex,

    /// The weight replacing the previous vote for `vo_idx`.
    pub new_votes: u128,

    /// The key the state leaf adopts.
    pub new_pub_key: Point,

    pub signature: Signature,

    /// `H3(packed, new_pub_key.x, new_pub_key.y)`, the signed value.
    pub msg_hash: Fr,
}

fn bits(value: &BigUint, offset: usize, width: usize) -> BigUint
{
    (value >> offset) & ((BigUint::one() << width) - 1u32)
}

impl Command
{
    /// Packs the scalar fields of a command into a single word.
    pub fn pack(
        nonce: u32,
        state_idx: u32,
        vo_idx: u32,
        new_votes: u128,
        salt: Option<&BigUint>
    ) -> Fr
    {
        let mut packed = BigUint::from(nonce) << NONCE_OFFSET;
        packed |= BigUint::from(state_idx) << STATE_INDEX_OFFSET;
        packed |= BigUint::from(vo_idx) << VOTE_OPTION_OFFSET;
        packed |= bits(&BigUint::from(new_votes), 0, SALT_OFFSET - NEW_VOTES_OFFSET) << NEW_VOTES_OFFSET;
        if let Some(salt) = salt
        {
            packed |= salt << SALT_OFFSET;
        }
        biguint_to_fr(&packed)
    }

    /// Splits a packed word into `(nonce, state_idx, vo_idx, new_votes)`.
    pub fn unpack(packed: &Fr) -> (u64, StateIndex, VoteOptionIndex, u128)
    {
        let packed = fr_to_biguint(packed);
        let word = |offset, width| bits(&packed, offset, width);

        (
            word(NONCE_OFFSET, 32).to_u64().unwrap_or_default(),
            word(STATE_INDEX_OFFSET, 32).to_u64().unwrap_or_default(),
            word(VOTE_OPTION_OFFSET, 32).to_u64().unwrap_or_default(),
            word(NEW_VOTES_OFFSET, 96).to_u128().unwrap_or_default(),
        )
    }

    /// Reads a command from its plaintext
    /// `[packed, new_pub_key.x, new_pub_key.y, r8.x, r8.y, s]`.
    pub fn from_plaintext(plaintext: &[Fr]) -> Result<Option<Command>, PoseidonError>
    {
        if plaintext.len() < COMMAND_LENGTH { return Ok(None); }

        let (nonce, state_idx, vo_idx, new_votes) = Self::unpack(&plaintext[0]);
        let new_pub_key = Point::new(plaintext[1], plaintext[2]);
        let signature = Signature {
            r8: Point::new(plaintext[3], plaintext[4]),
            s: plaintext[5],
        };
        let msg_hash = hash3([plaintext[0], plaintext[1], plaintext[2]])?;

        Ok(Some(Command { nonce, state_idx, vo_idx, new_votes, new_pub_key, signature, msg_hash }))
    }

    /// Builds and signs the plaintext of a command.
    pub fn sign_plaintext(priv_key: &Fr, packed: Fr, new_pub_key: &Point) -> Result<Vec<Fr>, PoseidonError>
    {
        let msg_hash = hash3([packed, new_pub_key.x, new_pub_key.y])?;
        let signature = eddsa::sign(priv_key, &msg_hash)?;

        Ok(vec![
            packed,
            new_pub_key.x,
            new_pub_key.y,
            signature.r8.x,
            signature.r8.y,
            signature.s,
        ])
    }

    /// Encrypts a plaintext for the coordinator with an ephemeral key. The
    /// ephemeral public key travels beside the ciphertext.
    pub fn encrypt_plaintext(
        plaintext: &[Fr],
        enc_key: &Keypair,
        coordinator_pub_key: &Point
    ) -> Result<Vec<Fr>, CipherError>
    {
        let shared = enc_key.shared_key(coordinator_pub_key);
        cipher::encrypt(plaintext, &shared, &BigUint::default())
    }

    /// Decrypts a message for the coordinator. Anything that does not
    /// decrypt cleanly is treated as an absent command.
    pub fn decrypt(ciphertext: &[Fr], enc_pub_key: &Point, coordinator: &Keypair) -> Option<Command>
    {
        let shared = coordinator.shared_key(enc_pub_key);
        let plaintext = match cipher::decrypt(ciphertext, &shared, &BigUint::default(), COMMAND_LENGTH)
        {
            Ok(plaintext) => plaintext,
            Err(error) =>
            {
                tracing::debug!(%error, "message does not decrypt to a command");
                return None;
            }
        };

        match Self::from_plaintext(&plaintext)
        {
            Ok(command) => command,
            Err(error) =>
            {
                tracing::debug!(%error, "command hash could not be computed");
                None
            }
        }
    }

    /// Whether the command is signed by the holder of `pub_key`.
    pub fn verify_signature(&self, pub_key: &Point) -> bool
    {
        eddsa::verify(&self.msg_hash, &self.signature, pub_key)
    }
}
