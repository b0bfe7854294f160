//! Envelopes: a transaction plus its signatures, as transmitted.
//!
//! Three generations decode: legacy V0 (raw ed25519 source, time bounds
//! only), V1, and fee bump. Only V1 and fee bump are produced.
//!
//! A V0 transaction's bytes equal those of its V1 conversion minus the
//! leading key-type word, so a V0 envelope is hashed through
//! [`TransactionV0::to_v1`] and shares its hash with the converted form.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::builder::Transaction;
use super::fee_bump::FeeBumpTransaction;
use super::preconditions::{Preconditions, TimeBounds};
use crate::config::{Network, MAX_OPS_PER_TX, MAX_SIGNATURES};
use crate::crypto::signatures::find_signature;
use crate::crypto::{sha256, DecoratedSignature, KeyPair};
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::types::{AccountId, Memo, MuxedAccount, SignerKey};
use crate::xdr::{
    invalid_discriminant, xdr_enum, BytesM, ReadXdr, VecM, WriteXdr, XdrError, XdrReader,
    XdrWriter,
};

xdr_enum! {
    /// Domain separators for everything that gets hashed or signed.
    pub enum EnvelopeType {
        TxV0 = 0,
        Scp = 1,
        Tx = 2,
        Auth = 3,
        ScpValue = 4,
        TxFeeBump = 5,
        OpId = 6,
        PoolRevokeOpId = 7,
        ContractId = 8,
        SorobanAuthorization = 9,
    }
}

pub type Signatures = VecM<DecoratedSignature, MAX_SIGNATURES>;

// ---------------------------------------------------------------------------
// Legacy V0
// ---------------------------------------------------------------------------

/// A pre-protocol-13 transaction. Decoded for compatibility, never built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionV0 {
    #[serde(with = "hex::serde")]
    pub source_account_ed25519: [u8; 32],
    pub fee: u32,
    pub seq_num: i64,
    pub time_bounds: Option<TimeBounds>,
    pub memo: Memo,
    pub operations: VecM<Operation, MAX_OPS_PER_TX>,
}

impl TransactionV0 {
    /// The equivalent V1 transaction: same fields, source as a plain
    /// account, time bounds as the time-only precondition.
    pub fn to_v1(&self) -> Transaction {
        Transaction {
            source_account: MuxedAccount::from(AccountId::from(self.source_account_ed25519)),
            fee: self.fee,
            seq_num: self.seq_num,
            cond: self.time_bounds.map_or(Preconditions::None, Preconditions::Time),
            memo: self.memo.clone(),
            operations: self.operations.clone(),
            ext: Default::default(),
        }
    }
}

impl WriteXdr for TransactionV0 {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.source_account_ed25519.write_xdr(w);
        w.write_u32(self.fee);
        w.write_i64(self.seq_num);
        w.write_option(&self.time_bounds);
        self.memo.write_xdr(w);
        self.operations.write_xdr(w);
        w.write_discriminant(0);
    }
}

impl ReadXdr for TransactionV0 {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        let tx = Self {
            source_account_ed25519: ReadXdr::read_xdr(r)?,
            fee: r.read_u32()?,
            seq_num: r.read_i64()?,
            time_bounds: r.read_option()?,
            memo: Memo::read_xdr(r)?,
            operations: VecM::read_xdr(r)?,
        };
        match r.read_discriminant()? {
            0 => Ok(tx),
            other => Err(invalid_discriminant("TransactionV0Ext", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionV0Envelope {
    pub tx: TransactionV0,
    pub signatures: Signatures,
}

impl WriteXdr for TransactionV0Envelope {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.tx.write_xdr(w);
        self.signatures.write_xdr(w);
    }
}

impl ReadXdr for TransactionV0Envelope {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            tx: TransactionV0::read_xdr(r)?,
            signatures: VecM::read_xdr(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// V1
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionV1Envelope {
    pub tx: Transaction,
    pub signatures: Signatures,
}

impl WriteXdr for TransactionV1Envelope {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.tx.write_xdr(w);
        self.signatures.write_xdr(w);
    }
}

impl ReadXdr for TransactionV1Envelope {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            tx: Transaction::read_xdr(r)?,
            signatures: VecM::read_xdr(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Fee bump
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBumpTransactionEnvelope {
    pub tx: FeeBumpTransaction,
    pub signatures: Signatures,
}

impl WriteXdr for FeeBumpTransactionEnvelope {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.tx.write_xdr(w);
        self.signatures.write_xdr(w);
    }
}

impl ReadXdr for FeeBumpTransactionEnvelope {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            tx: FeeBumpTransaction::read_xdr(r)?,
            signatures: VecM::read_xdr(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Signature payload
// ---------------------------------------------------------------------------

/// The transaction a signature payload commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedTransaction {
    Tx(Transaction),
    TxFeeBump(FeeBumpTransaction),
}

/// `network_id || tagged transaction`. Its SHA-256 is the transaction hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSignaturePayload {
    pub network_id: [u8; 32],
    pub tagged_transaction: TaggedTransaction,
}

impl WriteXdr for TransactionSignaturePayload {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.network_id.write_xdr(w);
        match &self.tagged_transaction {
            TaggedTransaction::Tx(tx) => {
                EnvelopeType::Tx.write_xdr(w);
                tx.write_xdr(w);
            }
            TaggedTransaction::TxFeeBump(tx) => {
                EnvelopeType::TxFeeBump.write_xdr(w);
                tx.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for TransactionSignaturePayload {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        let network_id = ReadXdr::read_xdr(r)?;
        let tagged_transaction = match EnvelopeType::read_xdr(r)? {
            EnvelopeType::Tx => TaggedTransaction::Tx(Transaction::read_xdr(r)?),
            EnvelopeType::TxFeeBump => TaggedTransaction::TxFeeBump(FeeBumpTransaction::read_xdr(r)?),
            other => {
                return Err(invalid_discriminant(
                    "TransactionSignaturePayloadTaggedTransaction",
                    other.discriminant(),
                ))
            }
        };
        Ok(Self {
            network_id,
            tagged_transaction,
        })
    }
}

// ---------------------------------------------------------------------------
// TransactionEnvelope
// ---------------------------------------------------------------------------

/// The unit exchanged with the network, usually as base64.
///
/// ```rust
/// use stellar_wire::config::Network;
/// use stellar_wire::crypto::KeyPair;
/// use stellar_wire::operation::BumpSequenceBuilder;
/// use stellar_wire::transaction::{TransactionBuilder, TransactionEnvelope};
/// use stellar_wire::xdr::WriteXdr;
///
/// let keypair = KeyPair::from_seed(&[7; 32]);
/// let mut envelope = TransactionBuilder::new(&keypair.address(), 1)
///     .add_operation(BumpSequenceBuilder::new(10).build().unwrap())
///     .build()
///     .unwrap()
///     .into_envelope();
/// envelope.sign(&keypair, &Network::testnet()).unwrap();
///
/// let wire = envelope.to_xdr_base64();
/// assert_eq!(TransactionEnvelope::parse(&wire).unwrap(), envelope);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionEnvelope {
    TxV0(TransactionV0Envelope),
    Tx(TransactionV1Envelope),
    TxFeeBump(FeeBumpTransactionEnvelope),
}

impl TransactionEnvelope {
    /// Decodes a base64 envelope.
    pub fn parse(base64: &str) -> Result<Self> {
        let envelope = Self::from_xdr_base64(base64)?;
        trace!(envelope_type = ?envelope.envelope_type(), "envelope decoded");
        Ok(envelope)
    }

    pub fn envelope_type(&self) -> EnvelopeType {
        match self {
            Self::TxV0(_) => EnvelopeType::TxV0,
            Self::Tx(_) => EnvelopeType::Tx,
            Self::TxFeeBump(_) => EnvelopeType::TxFeeBump,
        }
    }

    /// What the signatures on this envelope commit to.
    pub fn signature_payload(&self, network: &Network) -> TransactionSignaturePayload {
        let tagged_transaction = match self {
            Self::TxV0(env) => TaggedTransaction::Tx(env.tx.to_v1()),
            Self::Tx(env) => TaggedTransaction::Tx(env.tx.clone()),
            Self::TxFeeBump(env) => TaggedTransaction::TxFeeBump(env.tx.clone()),
        };
        TransactionSignaturePayload {
            network_id: network.network_id(),
            tagged_transaction,
        }
    }

    pub fn signature_base(&self, network: &Network) -> Vec<u8> {
        self.signature_payload(network).to_xdr()
    }

    pub fn hash(&self, network: &Network) -> [u8; 32] {
        sha256(&self.signature_base(network))
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        match self {
            Self::TxV0(env) => &env.signatures,
            Self::Tx(env) => &env.signatures,
            Self::TxFeeBump(env) => &env.signatures,
        }
    }

    fn signatures_mut(&mut self) -> &mut Signatures {
        match self {
            Self::TxV0(env) => &mut env.signatures,
            Self::Tx(env) => &mut env.signatures,
            Self::TxFeeBump(env) => &mut env.signatures,
        }
    }

    /// Appends a signature. Order is preserved on the wire.
    pub fn add_signature(&mut self, signature: DecoratedSignature) -> Result<()> {
        let hint = hex::encode(signature.hint);
        let signatures = self.signatures_mut();
        signatures.try_push(signature).map_err(|_| {
            Error::constraint(
                "signatures",
                format!("an envelope carries at most {MAX_SIGNATURES}"),
            )
        })?;
        debug!(hint = %hint, signer_count = signatures.len(), "signature attached");
        Ok(())
    }

    /// Signs the transaction hash for `network` with `keypair`.
    pub fn sign(&mut self, keypair: &KeyPair, network: &Network) -> Result<()> {
        let hash = self.hash(network);
        self.add_signature(keypair.sign_decorated(&hash))
    }

    /// Attaches the preimage of a hash-x signer. No key is involved: the
    /// preimage itself is the signature.
    pub fn sign_hash_x(&mut self, preimage: &[u8]) -> Result<()> {
        let preimage = BytesM::try_from(preimage).map_err(|_| {
            Error::constraint("hash-x preimage", "must be at most 64 bytes")
        })?;
        self.add_signature(DecoratedSignature::hash_x(preimage))
    }

    /// Index of the signature `signer` produced, if any.
    pub fn find_signature(&self, signer: &SignerKey, network: &Network) -> Option<usize> {
        find_signature(signer, &self.hash(network), self.signatures())
    }

    /// The source whose sequence number the transaction consumes (the inner
    /// transaction's source, for fee bumps).
    pub fn source_account(&self) -> MuxedAccount {
        match self {
            Self::TxV0(env) => AccountId::from(env.tx.source_account_ed25519).into(),
            Self::Tx(env) => env.tx.source_account,
            Self::TxFeeBump(env) => env.tx.inner_tx.tx.source_account,
        }
    }

    /// The operations, looking through a fee bump to its inner transaction.
    pub fn operations(&self) -> &[Operation] {
        match self {
            Self::TxV0(env) => &env.tx.operations,
            Self::Tx(env) => &env.tx.operations,
            Self::TxFeeBump(env) => &env.tx.inner_tx.tx.operations,
        }
    }
}

impl WriteXdr for TransactionEnvelope {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.envelope_type().write_xdr(w);
        match self {
            Self::TxV0(env) => env.write_xdr(w),
            Self::Tx(env) => env.write_xdr(w),
            Self::TxFeeBump(env) => env.write_xdr(w),
        }
    }
}

impl ReadXdr for TransactionEnvelope {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match EnvelopeType::read_xdr(r)? {
            EnvelopeType::TxV0 => Ok(Self::TxV0(TransactionV0Envelope::read_xdr(r)?)),
            EnvelopeType::Tx => Ok(Self::Tx(TransactionV1Envelope::read_xdr(r)?)),
            EnvelopeType::TxFeeBump => Ok(Self::TxFeeBump(FeeBumpTransactionEnvelope::read_xdr(r)?)),
            other => Err(invalid_discriminant("TransactionEnvelope", other.discriminant())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signatures::verify_decorated;
    use crate::operation::PaymentBuilder;
    use crate::transaction::TransactionBuilder;
    use crate::types::Asset;

    const DEST: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    fn keypair() -> KeyPair {
        KeyPair::from_seed(&[1; 32])
    }

    fn envelope() -> TransactionEnvelope {
        let payment = PaymentBuilder::new(DEST, Asset::native(), "5").build().unwrap();
        TransactionBuilder::new(&keypair().address(), 7)
            .add_operation(payment)
            .build()
            .unwrap()
            .into_envelope()
    }

    fn v0_of(tx: &Transaction) -> TransactionV0 {
        TransactionV0 {
            source_account_ed25519: *tx.source_account.account_id().as_bytes(),
            fee: tx.fee,
            seq_num: tx.seq_num,
            time_bounds: tx.cond.time_bounds().copied(),
            memo: tx.memo.clone(),
            operations: tx.operations.clone(),
        }
    }

    #[test]
    fn sign_then_verify() {
        let network = Network::testnet();
        let mut env = envelope();
        env.sign(&keypair(), &network).unwrap();
        assert_eq!(env.signatures().len(), 1);
        assert_eq!(env.signatures()[0].hint, keypair().signature_hint());

        let signer = SignerKey::Ed25519(keypair().public_key_bytes());
        assert_eq!(env.find_signature(&signer, &network), Some(0));
        assert_eq!(env.find_signature(&signer, &Network::public()), None);
        let hash = env.hash(&network);
        assert!(verify_decorated(&signer, &hash, &env.signatures()[0]).is_ok());
    }

    #[test]
    fn signatures_keep_attachment_order() {
        let network = Network::testnet();
        let second = KeyPair::from_seed(&[2; 32]);
        let mut env = envelope();
        env.sign(&keypair(), &network).unwrap();
        env.sign(&second, &network).unwrap();
        env.sign_hash_x(b"preimage").unwrap();
        let decoded = TransactionEnvelope::from_xdr(&env.to_xdr()).unwrap();
        let hints: Vec<_> = decoded.signatures().iter().map(|s| s.hint).collect();
        assert_eq!(hints[0], keypair().signature_hint());
        assert_eq!(hints[1], second.signature_hint());
        assert_eq!(decoded.signatures()[2].signature.as_slice(), b"preimage");
    }

    #[test]
    fn hash_x_signature_verifies() {
        let network = Network::testnet();
        let mut env = envelope();
        env.sign_hash_x(b"open sesame").unwrap();
        let signer = SignerKey::HashX(sha256(b"open sesame"));
        assert_eq!(env.find_signature(&signer, &network), Some(0));
        assert!(env.sign_hash_x(&[0u8; 65]).is_err());
    }

    #[test]
    fn signature_limit() {
        let mut env = envelope();
        for i in 0..20u8 {
            env.sign_hash_x(&[i]).unwrap();
        }
        assert!(matches!(
            env.sign_hash_x(b"one too many"),
            Err(Error::Constraint { field: "signatures", .. })
        ));
    }

    #[test]
    fn signature_base_matches_transaction() {
        let network = Network::testnet();
        let env = envelope();
        let TransactionEnvelope::Tx(inner) = &env else {
            panic!("expected v1");
        };
        assert_eq!(env.signature_base(&network), inner.tx.signature_base(&network));
        assert_eq!(env.hash(&network), inner.tx.hash(&network));
    }

    #[test]
    fn v0_shares_hash_with_v1_conversion() {
        let network = Network::testnet();
        let TransactionEnvelope::Tx(v1) = envelope() else {
            panic!("expected v1");
        };
        let v0 = v0_of(&v1.tx);
        // same bytes, minus the muxed-account key type word
        assert_eq!(v0.to_xdr(), v1.tx.to_xdr()[4..].to_vec());

        let env = TransactionEnvelope::TxV0(TransactionV0Envelope {
            tx: v0.clone(),
            signatures: VecM::new(),
        });
        assert_eq!(env.hash(&network), v1.tx.hash(&network));
        assert_eq!(v0.to_v1(), v1.tx);
    }

    #[test]
    fn v0_envelope_reencodes_exactly() {
        let TransactionEnvelope::Tx(v1) = envelope() else {
            panic!("expected v1");
        };
        let mut env = TransactionEnvelope::TxV0(TransactionV0Envelope {
            tx: v0_of(&v1.tx),
            signatures: VecM::new(),
        });
        env.sign(&keypair(), &Network::testnet()).unwrap();
        let bytes = env.to_xdr();
        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
        let decoded = TransactionEnvelope::from_xdr(&bytes).unwrap();
        assert_eq!(decoded.envelope_type(), EnvelopeType::TxV0);
        assert_eq!(decoded.to_xdr(), bytes);
    }

    #[test]
    fn base64_roundtrip() {
        let mut env = envelope();
        env.sign(&keypair(), &Network::testnet()).unwrap();
        let wire = env.to_xdr_base64();
        assert_eq!(TransactionEnvelope::parse(&wire).unwrap(), env);
        assert!(TransactionEnvelope::parse("AAAA").is_err());
    }

    #[test]
    fn unproducible_envelope_types_rejected() {
        // ENVELOPE_TYPE_SCP is a valid EnvelopeType but not an envelope arm
        assert!(matches!(
            TransactionEnvelope::from_xdr(&[0, 0, 0, 1]),
            Err(XdrError::InvalidDiscriminant { value: 1, .. })
        ));
    }

    #[test]
    fn signature_payload_roundtrip() {
        let payload = envelope().signature_payload(&Network::testnet());
        let bytes = payload.to_xdr();
        assert_eq!(TransactionSignaturePayload::from_xdr(&bytes).unwrap(), payload);
    }

    #[test]
    fn accessors_look_through() {
        let env = envelope();
        assert_eq!(env.operations().len(), 1);
        assert_eq!(env.source_account().account_id(), keypair().account_id());
    }
}
