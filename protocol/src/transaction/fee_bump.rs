//! Fee-bump transactions.
//!
//! A fee bump lets a second account pay a higher fee for an already-signed
//! transaction without touching its signatures. The wrapper owns its inner
//! envelope outright.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::envelope::{
    EnvelopeType, FeeBumpTransactionEnvelope, TransactionEnvelope, TransactionV1Envelope,
};
use crate::config::{Network, BASE_FEE};
use crate::crypto::sha256;
use crate::error::{Error, Result};
use crate::types::MuxedAccount;
use crate::xdr::{invalid_discriminant, ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBumpTransaction {
    pub fee_source: MuxedAccount,
    /// Total fee in stroops, covering the inner transaction as well.
    pub fee: i64,
    /// Always a V1 envelope on the wire (`ENVELOPE_TYPE_TX` arm).
    pub inner_tx: TransactionV1Envelope,
}

impl FeeBumpTransaction {
    pub fn signature_base(&self, network: &Network) -> Vec<u8> {
        let mut w = XdrWriter::with_capacity(512);
        network.network_id().write_xdr(&mut w);
        EnvelopeType::TxFeeBump.write_xdr(&mut w);
        self.write_xdr(&mut w);
        w.into_bytes()
    }

    pub fn hash(&self, network: &Network) -> [u8; 32] {
        sha256(&self.signature_base(network))
    }

    /// Wraps the fee bump in an unsigned envelope.
    pub fn into_envelope(self) -> TransactionEnvelope {
        TransactionEnvelope::TxFeeBump(FeeBumpTransactionEnvelope {
            tx: self,
            signatures: VecM::new(),
        })
    }
}

impl WriteXdr for FeeBumpTransaction {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.fee_source.write_xdr(w);
        w.write_i64(self.fee);
        EnvelopeType::Tx.write_xdr(w);
        self.inner_tx.write_xdr(w);
        w.write_discriminant(0);
    }
}

impl ReadXdr for FeeBumpTransaction {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        let fee_source = MuxedAccount::read_xdr(r)?;
        let fee = r.read_i64()?;
        let inner_tx = match EnvelopeType::read_xdr(r)? {
            EnvelopeType::Tx => TransactionV1Envelope::read_xdr(r)?,
            other => return Err(invalid_discriminant("FeeBumpTransactionInnerTx", other.discriminant())),
        };
        match r.read_discriminant()? {
            0 => Ok(Self {
                fee_source,
                fee,
                inner_tx,
            }),
            other => Err(invalid_discriminant("FeeBumpTransactionExt", other)),
        }
    }
}

#[derive(Debug, Clone)]
enum FeeSourceInput {
    Address(String),
    Muxed(MuxedAccount),
}

/// Builds a [`FeeBumpTransaction`] around a signed V1 envelope.
///
/// `base_fee` is the per-operation rate. The total fee is
/// `base_fee * (inner operations + 1) + inner resource fee`; the extra
/// operation slot pays for the fee bump itself.
///
/// ```rust
/// use stellar_wire::operation::BumpSequenceBuilder;
/// use stellar_wire::transaction::{FeeBumpBuilder, TransactionBuilder};
///
/// let source = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";
/// let inner = TransactionBuilder::new(source, 1)
///     .add_operation(BumpSequenceBuilder::new(5).build().unwrap())
///     .add_operation(BumpSequenceBuilder::new(6).build().unwrap())
///     .build()
///     .unwrap()
///     .into_envelope();
///
/// let bump = FeeBumpBuilder::new(source, inner).base_fee(100).build().unwrap();
/// assert_eq!(bump.fee, 300);
/// ```
#[derive(Debug, Clone)]
pub struct FeeBumpBuilder {
    fee_source: FeeSourceInput,
    inner: TransactionEnvelope,
    base_fee: i64,
}

impl FeeBumpBuilder {
    /// `fee_source` is `G...` or `M...`, parsed at build.
    pub fn new(fee_source: &str, inner: TransactionEnvelope) -> Self {
        Self {
            fee_source: FeeSourceInput::Address(fee_source.to_string()),
            inner,
            base_fee: i64::from(BASE_FEE),
        }
    }

    pub fn with_muxed_fee_source(fee_source: MuxedAccount, inner: TransactionEnvelope) -> Self {
        Self {
            fee_source: FeeSourceInput::Muxed(fee_source),
            inner,
            base_fee: i64::from(BASE_FEE),
        }
    }

    pub fn base_fee(mut self, fee: i64) -> Self {
        self.base_fee = fee;
        self
    }

    pub fn build(self) -> Result<FeeBumpTransaction> {
        let inner = match self.inner {
            TransactionEnvelope::Tx(env) => env,
            other => {
                return Err(Error::constraint(
                    "inner transaction",
                    format!("must be a V1 envelope, got {:?}", other.envelope_type()),
                ))
            }
        };

        let op_count = inner.tx.operations.len() as i64;
        let resource_fee = inner.tx.resource_fee();
        // decoded envelopes skip the data builder's checks
        if resource_fee < 0 {
            return Err(Error::constraint(
                "resource fee",
                format!("{resource_fee} is negative"),
            ));
        }
        let overflow = || Error::Overflow("fee bump fee");
        let inner_fee = i64::from(inner.tx.fee)
            .checked_sub(resource_fee)
            .ok_or_else(overflow)?;
        // base_fee must cover the inner per-operation rate, rounded up
        let inner_rate = if op_count == 0 || inner_fee <= 0 {
            0
        } else {
            inner_fee
                .checked_add(op_count - 1)
                .ok_or_else(overflow)?
                / op_count
        };
        let min_rate = inner_rate.max(i64::from(BASE_FEE));
        if self.base_fee < min_rate {
            return Err(Error::constraint(
                "base fee",
                format!("{} is below the minimum of {min_rate}", self.base_fee),
            ));
        }

        let fee = self
            .base_fee
            .checked_mul(op_count + 1)
            .and_then(|f| f.checked_add(resource_fee))
            .ok_or_else(overflow)?;

        let fee_source = match &self.fee_source {
            FeeSourceInput::Address(address) => MuxedAccount::parse(address)?,
            FeeSourceInput::Muxed(account) => *account,
        };

        debug!(fee_source = %fee_source, fee, inner_operations = op_count, "fee bump built");
        Ok(FeeBumpTransaction {
            fee_source,
            fee,
            inner_tx: inner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::operation::{PaymentBuilder, RestoreFootprintBuilder};
    use crate::soroban::{SorobanDataBuilder, SorobanTransactionData};
    use crate::transaction::{TransactionBuilder, TransactionExt};
    use crate::types::Asset;

    const FEE_SOURCE: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    fn inner_with(ops: usize, base_fee: u32) -> TransactionEnvelope {
        let kp = KeyPair::from_seed(&[3; 32]);
        let payment = PaymentBuilder::new(FEE_SOURCE, Asset::native(), "1").build().unwrap();
        let mut env = TransactionBuilder::new(&kp.address(), 1)
            .base_fee(base_fee)
            .add_operations(vec![payment; ops])
            .build()
            .unwrap()
            .into_envelope();
        env.sign(&kp, &Network::testnet()).unwrap();
        env
    }

    #[test]
    fn total_fee_counts_the_wrapper() {
        let bump = FeeBumpBuilder::new(FEE_SOURCE, inner_with(2, 100))
            .base_fee(100)
            .build()
            .unwrap();
        assert_eq!(bump.fee, 300);
    }

    #[test]
    fn base_fee_below_inner_rate_rejected() {
        let err = FeeBumpBuilder::new(FEE_SOURCE, inner_with(2, 100))
            .base_fee(99)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ValueConstraint);

        assert!(FeeBumpBuilder::new(FEE_SOURCE, inner_with(2, 250))
            .base_fee(200)
            .build()
            .is_err());
        assert!(FeeBumpBuilder::new(FEE_SOURCE, inner_with(2, 250))
            .base_fee(250)
            .build()
            .is_ok());
    }

    #[test]
    fn fee_overflow_detected() {
        let err = FeeBumpBuilder::new(FEE_SOURCE, inner_with(2, 100))
            .base_fee(i64::MAX / 2)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::Overflow("fee bump fee"));
    }

    #[test]
    fn inner_resource_fee_is_excluded_then_added() {
        let kp = KeyPair::from_seed(&[3; 32]);
        let data = SorobanDataBuilder::new().resource_fee(10_000).build().unwrap();
        let inner = TransactionBuilder::new(&kp.address(), 1)
            .add_operation(RestoreFootprintBuilder::new().build().unwrap())
            .soroban_data(data)
            .build()
            .unwrap()
            .into_envelope();
        let bump = FeeBumpBuilder::new(FEE_SOURCE, inner).base_fee(100).build().unwrap();
        assert_eq!(bump.fee, 100 * 2 + 10_000);
    }

    /// A Soroban envelope as received off the wire, with `resource_fee`
    /// written straight into its extension.
    fn decoded_soroban_inner(resource_fee: i64) -> TransactionEnvelope {
        let kp = KeyPair::from_seed(&[3; 32]);
        let data = SorobanDataBuilder::new().resource_fee(10_000).build().unwrap();
        let mut tx = TransactionBuilder::new(&kp.address(), 1)
            .add_operation(RestoreFootprintBuilder::new().build().unwrap())
            .soroban_data(data.clone())
            .build()
            .unwrap();
        tx.ext = TransactionExt::V1(SorobanTransactionData { resource_fee, ..data });
        TransactionEnvelope::parse(&tx.into_envelope().to_xdr_base64()).unwrap()
    }

    #[test]
    fn decoded_soroban_inner_is_bumped() {
        let bump = FeeBumpBuilder::new(FEE_SOURCE, decoded_soroban_inner(10_000))
            .base_fee(150)
            .build()
            .unwrap();
        assert_eq!(bump.fee, 150 * 2 + 10_000);
    }

    #[test]
    fn negative_resource_fee_rejected() {
        for resource_fee in [-100, i64::MIN] {
            let err = FeeBumpBuilder::new(FEE_SOURCE, decoded_soroban_inner(resource_fee))
                .base_fee(100)
                .build()
                .unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::ValueConstraint);
        }
    }

    #[test]
    fn resource_fee_near_the_limit_overflows_cleanly() {
        let err = FeeBumpBuilder::new(FEE_SOURCE, decoded_soroban_inner(i64::MAX))
            .base_fee(100)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::Overflow("fee bump fee"));
    }

    #[test]
    fn inner_must_be_v1() {
        let bump = FeeBumpBuilder::new(FEE_SOURCE, inner_with(1, 100))
            .build()
            .unwrap()
            .into_envelope();
        assert!(FeeBumpBuilder::new(FEE_SOURCE, bump).build().is_err());
    }

    #[test]
    fn inner_signatures_survive() {
        let inner = inner_with(1, 100);
        let inner_sigs = inner.signatures().to_vec();
        let mut env = FeeBumpBuilder::new(FEE_SOURCE, inner).build().unwrap().into_envelope();
        env.sign(&KeyPair::from_seed(&[9; 32]), &Network::testnet()).unwrap();

        let decoded = TransactionEnvelope::from_xdr(&env.to_xdr()).unwrap();
        let TransactionEnvelope::TxFeeBump(fb) = &decoded else {
            panic!("expected fee bump");
        };
        assert_eq!(fb.tx.inner_tx.signatures.to_vec(), inner_sigs);
        assert_eq!(fb.signatures.len(), 1);
        assert_eq!(decoded, env);
    }

    #[test]
    fn hash_differs_from_inner() {
        let network = Network::testnet();
        let inner = inner_with(1, 100);
        let inner_hash = inner.hash(&network);
        let bump = FeeBumpBuilder::new(FEE_SOURCE, inner).build().unwrap();
        assert_ne!(bump.hash(&network), inner_hash);
        assert_eq!(bump.clone().into_envelope().hash(&network), bump.hash(&network));
        let base = bump.signature_base(&network);
        assert_eq!(&base[32..36], &[0, 0, 0, 5]);
    }

    #[test]
    fn muxed_fee_source() {
        let muxed = MuxedAccount::new(FEE_SOURCE.parse().unwrap(), Some(99));
        let bump = FeeBumpBuilder::with_muxed_fee_source(muxed, inner_with(1, 100))
            .build()
            .unwrap();
        assert_eq!(bump.fee_source, muxed);
        assert!(FeeBumpBuilder::new("nonsense", inner_with(1, 100)).build().is_err());
    }
}
