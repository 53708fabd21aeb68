pub mod babyjub;
pub mod cipher;
pub mod eddsa;
pub mod keys;
pub mod odevity;

pub use babyjub::{Point, BASE8};
pub use eddsa::Signature;
pub use keys::{
    format_priv_key_for_babyjub,
    gen_ecdh_shared_key,
    gen_keypair,
    gen_random_key,
    gen_static_random_key,
    Keypair
};
pub use odevity::{
    decrypt_odevity,
    encrypt_odevity,
    rerandomize,
    Ciphertext
};
