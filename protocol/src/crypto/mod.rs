//! # Cryptographic Primitives
//!
//! Everything signing- and hashing-related flows through here. The network
//! fixes the choices for us:
//!
//! - **Ed25519** for every account key and signature.
//! - **SHA-256** for network ids, transaction hashes and derived ids.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations (`ed25519-dalek`, `sha2`).

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{sha256, sha256_multi, Hash};
pub use keys::{KeyError, KeyPair};
pub use signatures::{
    signature_hint, signed_payload_hint, verify, verify_decorated, verify_raw,
    DecoratedSignature, SignatureError,
};
