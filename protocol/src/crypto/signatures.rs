//! # Digital Signatures
//!
//! Decorated signatures and the checks that tie them back to signers.
//!
//! A decorated signature is a 4-byte hint plus the signature bytes. The hint
//! lets a verifier skip straight to the one candidate signer it could belong
//! to instead of trying every key on the account.
//!
//! | signer kind          | hint                                   | "signature"          |
//! |----------------------|----------------------------------------|----------------------|
//! | ed25519              | last 4 bytes of the public key         | ed25519 over the tx hash |
//! | hash-x               | last 4 bytes of SHA-256(preimage)      | the preimage itself  |
//! | ed25519 signed payload | key hint XOR last 4 payload bytes    | ed25519 over the payload |
//!
//! Pre-authorized transaction signers never appear as signatures at all; they
//! are satisfied by the transaction hash matching.
//!
//! ## Strictness
//!
//! Verification uses `ed25519-dalek`'s `verify_strict`, which rejects the
//! small-order and non-canonical edge cases lenient verifiers accept.

use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hash::sha256;
use crate::types::SignerKey;
use crate::xdr::{BytesM, ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

/// Errors during signature checks.
///
/// Intentionally coarse; a detailed error oracle helps nobody but attackers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("signature hint does not match signer")]
    HintMismatch,

    #[error("invalid signature bytes: expected 64 bytes")]
    InvalidSignatureBytes,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("pre-authorized transaction signers carry no signature")]
    PreAuthTx,
}

/// A signature plus its 4-byte hint (`DecoratedSignature` in XDR).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecoratedSignature {
    #[serde(with = "hex::serde")]
    pub hint: [u8; 4],
    /// Up to 64 bytes: an ed25519 signature, or a hash-x preimage.
    pub signature: BytesM<64>,
}

impl DecoratedSignature {
    pub fn new(hint: [u8; 4], signature: [u8; 64]) -> Self {
        Self {
            hint,
            signature: BytesM::from_array(signature),
        }
    }

    /// The decorated "signature" for a hash-x signer: the preimage itself,
    /// hinted by the tail of its hash.
    pub fn hash_x(preimage: BytesM<64>) -> Self {
        let hash = sha256(&preimage);
        Self {
            hint: last_four(&hash),
            signature: preimage,
        }
    }
}

impl WriteXdr for DecoratedSignature {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.hint.write_xdr(w);
        self.signature.write_xdr(w);
    }
}

impl ReadXdr for DecoratedSignature {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self {
            hint: ReadXdr::read_xdr(r)?,
            signature: ReadXdr::read_xdr(r)?,
        })
    }
}

fn last_four(bytes: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    let n = bytes.len().min(4);
    out[4 - n..].copy_from_slice(&bytes[bytes.len() - n..]);
    out
}

/// Hint for an ed25519 key: its last four bytes.
pub fn signature_hint(public_key: &[u8; 32]) -> [u8; 4] {
    last_four(public_key)
}

/// Hint for an ed25519 signed-payload signer.
///
/// Payloads shorter than four bytes are zero-padded on the right first, the
/// same way their XDR encoding pads them.
pub fn signed_payload_hint(public_key: &[u8; 32], payload: &[u8]) -> [u8; 4] {
    let key_hint = signature_hint(public_key);
    let mut tail = [0u8; 4];
    if payload.len() >= 4 {
        tail.copy_from_slice(&payload[payload.len() - 4..]);
    } else {
        tail[..payload.len()].copy_from_slice(payload);
    }
    let mut hint = [0u8; 4];
    for i in 0..4 {
        hint[i] = key_hint[i] ^ tail[i];
    }
    hint
}

/// Verify a signature using raw byte components.
///
/// This is the "I got these bytes off the wire" variant: it parses the key
/// and signature, then verifies strictly.
pub fn verify_raw(
    public_key: &[u8; 32],
    message: &[u8],
    signature: &[u8],
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|_| SignatureError::InvalidPublicKey)?;
    let sig_bytes: [u8; 64] = signature
        .try_into()
        .map_err(|_| SignatureError::InvalidSignatureBytes)?;
    let signature = DalekSignature::from_bytes(&sig_bytes);
    verifying_key
        .verify_strict(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

/// Boolean form of [`verify_raw`].
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8]) -> bool {
    verify_raw(public_key, message, signature).is_ok()
}

/// Checks that `sig` was produced by `signer` over the transaction hash
/// `tx_hash`. The hint is checked first.
pub fn verify_decorated(
    signer: &SignerKey,
    tx_hash: &[u8; 32],
    sig: &DecoratedSignature,
) -> Result<(), SignatureError> {
    match signer {
        SignerKey::Ed25519(key) => {
            if sig.hint != signature_hint(key) {
                return Err(SignatureError::HintMismatch);
            }
            verify_raw(key, tx_hash, &sig.signature)
        }
        SignerKey::HashX(hash) => {
            if sig.hint != last_four(hash) {
                return Err(SignatureError::HintMismatch);
            }
            if sha256(&sig.signature) != *hash {
                return Err(SignatureError::VerificationFailed);
            }
            Ok(())
        }
        SignerKey::Ed25519SignedPayload { ed25519, payload } => {
            if sig.hint != signed_payload_hint(ed25519, payload) {
                return Err(SignatureError::HintMismatch);
            }
            verify_raw(ed25519, payload, &sig.signature)
        }
        SignerKey::PreAuthTx(_) => Err(SignatureError::PreAuthTx),
    }
}

/// Index of the first signature in `signatures` that `signer` produced.
///
/// Scans in list order, the same order validators use.
pub fn find_signature(
    signer: &SignerKey,
    tx_hash: &[u8; 32],
    signatures: &[DecoratedSignature],
) -> Option<usize> {
    signatures
        .iter()
        .position(|sig| verify_decorated(signer, tx_hash, sig).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn test_ed25519_decorated_verifies() {
        let kp = KeyPair::random();
        let hash = sha256(b"tx");
        let sig = kp.sign_decorated(&hash);
        let signer = SignerKey::Ed25519(kp.public_key_bytes());
        assert_eq!(verify_decorated(&signer, &hash, &sig), Ok(()));
        assert_eq!(
            verify_decorated(&signer, &sha256(b"other"), &sig),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_hint_mismatch_short_circuits() {
        let kp = KeyPair::random();
        let other = KeyPair::random();
        let hash = sha256(b"tx");
        let sig = other.sign_decorated(&hash);
        let signer = SignerKey::Ed25519(kp.public_key_bytes());
        if other.signature_hint() != kp.signature_hint() {
            assert_eq!(
                verify_decorated(&signer, &hash, &sig),
                Err(SignatureError::HintMismatch)
            );
        }
    }

    #[test]
    fn test_hash_x_preimage() {
        let preimage = BytesM::<64>::try_from(&b"open sesame"[..]).unwrap();
        let hash = sha256(b"open sesame");
        let sig = DecoratedSignature::hash_x(preimage);
        assert_eq!(sig.hint, [hash[28], hash[29], hash[30], hash[31]]);
        assert_eq!(
            verify_decorated(&SignerKey::HashX(hash), &[0u8; 32], &sig),
            Ok(())
        );
    }

    #[test]
    fn test_signed_payload_short_payload_hint() {
        let key = [0xffu8; 32];
        assert_eq!(signed_payload_hint(&key, &[1, 2]), [0xfe, 0xfd, 0xff, 0xff]);
    }

    #[test]
    fn test_signed_payload_signer() {
        let kp = KeyPair::random();
        let payload = vec![9u8; 20];
        let sig = kp.sign_payload_decorated(&payload);
        let signer = SignerKey::Ed25519SignedPayload {
            ed25519: kp.public_key_bytes(),
            payload: BytesM::try_from(payload).unwrap(),
        };
        assert_eq!(verify_decorated(&signer, &[0u8; 32], &sig), Ok(()));
    }

    #[test]
    fn test_find_signature_respects_order() {
        let a = KeyPair::random();
        let b = KeyPair::random();
        let hash = sha256(b"multi");
        let sigs = vec![b.sign_decorated(&hash), a.sign_decorated(&hash)];
        let signer_a = SignerKey::Ed25519(a.public_key_bytes());
        assert_eq!(find_signature(&signer_a, &hash, &sigs), Some(1));
    }

    #[test]
    fn test_decorated_signature_xdr_layout() {
        let sig = DecoratedSignature::new([1, 2, 3, 4], [7u8; 64]);
        let bytes = sig.to_xdr();
        assert_eq!(bytes.len(), 4 + 4 + 64);
        assert_eq!(&bytes[..8], &[1, 2, 3, 4, 0, 0, 0, 64]);
        assert_eq!(DecoratedSignature::from_xdr(&bytes), Ok(sig));
    }

    #[test]
    fn test_raw_rejects_wrong_length() {
        let kp = KeyPair::random();
        assert_eq!(
            verify_raw(&kp.public_key_bytes(), b"m", &[0u8; 10]),
            Err(SignatureError::InvalidSignatureBytes)
        );
    }
}
