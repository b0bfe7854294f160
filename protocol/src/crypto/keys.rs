//! # Key Management
//!
//! Ed25519 keypairs and their StrKey forms.
//!
//! An account is an ed25519 public key (`G...`); the matching secret seed
//! (`S...`) is the only thing that can authorize operations on it. This
//! module handles creating keypairs, moving seeds in and out of their string
//! form, and producing the decorated signatures that go into envelopes.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - Key generation uses `OsRng`.
//! - Key bytes are never logged, and `Debug` only ever prints the public key.

use std::fmt;

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

use super::hash::sha256;
use super::signatures::{signature_hint, signed_payload_hint, DecoratedSignature};
use crate::config::Network;
use crate::strkey;
use crate::types::AccountId;

/// Errors that can occur during key operations.
///
/// Deliberately vague about *why* a key was rejected; error messages are a
/// classic place for key material to leak.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid secret seed")]
    InvalidSecretSeed,

    #[error("invalid public key: not a valid ed25519 point")]
    InvalidPublicKey,
}

/// An ed25519 signing keypair.
///
/// The signature hint (last four bytes of the public key) is computed once
/// at construction, since every decorated signature needs it.
///
/// `KeyPair` does not implement `Serialize`. Exporting a seed should be a
/// deliberate call to [`KeyPair::secret_seed`], not a side effect of dumping
/// a struct to JSON.
///
/// ```
/// use stellar_wire::crypto::KeyPair;
///
/// let kp = KeyPair::random();
/// let sig = kp.sign(b"hello");
/// assert!(kp.verify(b"hello", &sig));
/// assert!(kp.address().starts_with('G'));
/// ```
pub struct KeyPair {
    signing_key: SigningKey,
    hint: [u8; 4],
}

impl KeyPair {
    /// Generates a fresh keypair from the OS RNG.
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Builds a keypair from a raw 32-byte ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Parses an `S...` secret seed.
    pub fn from_secret_seed(seed: &str) -> Result<Self, KeyError> {
        let bytes = strkey::decode_secret_seed(seed).map_err(|_| KeyError::InvalidSecretSeed)?;
        Ok(Self::from_seed(&bytes))
    }

    /// The network's root account: the keypair whose seed is the network id.
    /// Only meaningful on standalone networks, where it holds the genesis
    /// balance.
    pub fn master(network: &Network) -> Self {
        Self::from_seed(&sha256(network.passphrase().as_bytes()))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let hint = signature_hint(&signing_key.verifying_key().to_bytes());
        Self { signing_key, hint }
    }

    /// The `S...` form of the seed. **Handle with extreme care.**
    pub fn secret_seed(&self) -> String {
        strkey::encode_secret_seed(&self.signing_key.to_bytes())
    }

    /// Raw 32-byte seed.
    pub fn seed_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn account_id(&self) -> AccountId {
        AccountId::from_bytes(self.public_key_bytes())
    }

    /// The `G...` address.
    pub fn address(&self) -> String {
        strkey::encode_account_id(&self.public_key_bytes())
    }

    /// Last four bytes of the public key.
    pub fn signature_hint(&self) -> [u8; 4] {
        self.hint
    }

    /// Signs `message` and returns the raw 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verifies a raw signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        let sig = DalekSignature::from_bytes(signature);
        self.signing_key.verifying_key().verify(message, &sig).is_ok()
    }

    /// Signs `message` and attaches this key's hint.
    pub fn sign_decorated(&self, message: &[u8]) -> DecoratedSignature {
        DecoratedSignature::new(self.hint, self.sign(message))
    }

    /// Signs `payload` for an ed25519 signed-payload signer. The hint is this
    /// key's hint XORed with the last four bytes of the payload.
    pub fn sign_payload_decorated(&self, payload: &[u8]) -> DecoratedSignature {
        let hint = signed_payload_hint(&self.public_key_bytes(), payload);
        DecoratedSignature::new(hint, self.sign(payload))
    }
}

impl Clone for KeyPair {
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
            hint: self.hint,
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material, not even partially.
        write!(f, "KeyPair(pub={})", self.address())
    }
}

impl PartialEq for KeyPair {
    /// Compares public keys, so secret bytes never go through a
    /// non-constant-time comparison.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for KeyPair {}

/// Parses raw bytes as an ed25519 public key, rejecting non-points.
pub fn verifying_key(bytes: &[u8; 32]) -> Result<VerifyingKey, KeyError> {
    VerifyingKey::from_bytes(bytes).map_err(|_| KeyError::InvalidPublicKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known SDK test pair.
    const SEED: &str = "SBGWSG6BTNCKCOB3DIFBGCVMUPQFYPA2G4O34RMTB343OYPXU5DJDVMN";

    #[test]
    fn test_generate_produces_valid_keypair() {
        let kp = KeyPair::random();
        assert!(strkey::is_valid_account_id(&kp.address()));
        assert!(strkey::is_valid_secret_seed(&kp.secret_seed()));
    }

    #[test]
    fn keypair_sign_verify_roundtrip() {
        let kp = KeyPair::random();
        let sig = kp.sign(b"pay 100 XLM");
        assert!(kp.verify(b"pay 100 XLM", &sig));
        assert!(!kp.verify(b"pay 900 XLM", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp1 = KeyPair::random();
        let kp2 = KeyPair::random();
        let sig = kp1.sign(b"message");
        assert!(!kp2.verify(b"message", &sig));
    }

    #[test]
    fn test_secret_seed_roundtrip() {
        let kp = KeyPair::from_secret_seed(SEED).unwrap();
        assert_eq!(kp.secret_seed(), SEED);
        let again = KeyPair::from_seed(&kp.seed_bytes());
        assert_eq!(again, kp);
    }

    #[test]
    fn test_account_id_is_not_a_seed() {
        let kp = KeyPair::random();
        assert_eq!(
            KeyPair::from_secret_seed(&kp.address()),
            Err(KeyError::InvalidSecretSeed)
        );
    }

    #[test]
    fn test_hint_is_last_four_key_bytes() {
        let kp = KeyPair::random();
        let pk = kp.public_key_bytes();
        assert_eq!(kp.signature_hint(), [pk[28], pk[29], pk[30], pk[31]]);
        assert_eq!(kp.sign_decorated(b"x").hint, kp.signature_hint());
    }

    #[test]
    fn test_signed_payload_hint_xors_payload_tail() {
        let kp = KeyPair::random();
        let key_hint = kp.signature_hint();
        let payload = [1u8, 2, 3, 4, 5, 6];
        let sig = kp.sign_payload_decorated(&payload);
        assert_eq!(
            sig.hint,
            [
                key_hint[0] ^ 3,
                key_hint[1] ^ 4,
                key_hint[2] ^ 5,
                key_hint[3] ^ 6
            ]
        );
    }

    #[test]
    fn test_deterministic_signatures() {
        let kp = KeyPair::from_seed(&[42u8; 32]);
        assert_eq!(kp.sign(b"same"), kp.sign(b"same"));
    }

    #[test]
    fn test_master_keypair_is_stable() {
        let network = Network::standalone();
        assert_eq!(KeyPair::master(&network), KeyPair::master(&network));
        assert_ne!(KeyPair::master(&network), KeyPair::master(&Network::testnet()));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = KeyPair::from_secret_seed(SEED).unwrap();
        let debug_str = format!("{:?}", kp);
        assert!(debug_str.starts_with("KeyPair(pub=G"));
        assert!(!debug_str.contains(SEED));
    }

    #[test]
    fn test_clone_preserves_identity() {
        let kp = KeyPair::random();
        let cloned = kp.clone();
        assert_eq!(kp.seed_bytes(), cloned.seed_bytes());
        assert_eq!(kp.signature_hint(), cloned.signature_hint());
    }
}
