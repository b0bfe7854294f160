//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] collects the source, sequence number,
//! operations, memo and preconditions, then `.build()` validates them and
//! computes the fee, returning an unsigned [`Transaction`].
//!
//! The builder does not sign. Signing happens on the envelope (see
//! [`super::envelope`]), which keeps construction testable without key
//! material.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::envelope::{EnvelopeType, TransactionEnvelope, TransactionV1Envelope};
use super::preconditions::{LedgerBounds, Preconditions, PreconditionsV2, TimeBounds};
use crate::config::{Network, BASE_FEE, MAX_EXTRA_SIGNERS, MAX_OPS_PER_TX};
use crate::crypto::sha256;
use crate::error::{Error, Result};
use crate::operation::{Operation, OperationBody};
use crate::soroban::SorobanTransactionData;
use crate::types::{AccountId, Memo, MuxedAccount, SignerKey};
use crate::xdr::{invalid_discriminant, ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// The transaction extension: nothing, or Soroban resource data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionExt {
    #[default]
    V0,
    V1(SorobanTransactionData),
}

impl WriteXdr for TransactionExt {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::V0 => w.write_discriminant(0),
            Self::V1(data) => {
                w.write_discriminant(1);
                data.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for TransactionExt {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match r.read_discriminant()? {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1(SorobanTransactionData::read_xdr(r)?)),
            other => Err(invalid_discriminant("TransactionExt", other)),
        }
    }
}

/// A transaction in the current (V1) envelope generation.
///
/// Once a signature has been taken over a transaction, mutating any field
/// silently invalidates it; build, then sign, then leave it alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub source_account: MuxedAccount,
    /// Total fee in stroops, across all operations plus any resource fee.
    pub fee: u32,
    pub seq_num: i64,
    pub cond: Preconditions,
    pub memo: Memo,
    pub operations: VecM<Operation, MAX_OPS_PER_TX>,
    pub ext: TransactionExt,
}

impl Transaction {
    /// `network_id || ENVELOPE_TYPE_TX || transaction`: the bytes whose
    /// SHA-256 is the transaction hash.
    pub fn signature_base(&self, network: &Network) -> Vec<u8> {
        let mut w = XdrWriter::with_capacity(256);
        network.network_id().write_xdr(&mut w);
        EnvelopeType::Tx.write_xdr(&mut w);
        self.write_xdr(&mut w);
        w.into_bytes()
    }

    /// The network-visible transaction id, and the message every signer
    /// signs.
    pub fn hash(&self, network: &Network) -> [u8; 32] {
        sha256(&self.signature_base(network))
    }

    pub fn soroban_data(&self) -> Option<&SorobanTransactionData> {
        match &self.ext {
            TransactionExt::V0 => None,
            TransactionExt::V1(data) => Some(data),
        }
    }

    /// The Soroban resource fee included in `fee`, or 0.
    pub fn resource_fee(&self) -> i64 {
        self.soroban_data().map_or(0, |data| data.resource_fee)
    }

    /// Checks that every begin-sponsoring operation is closed by an
    /// end-sponsoring operation run by the sponsored account, and that no
    /// end appears without an open begin.
    ///
    /// The network enforces this at apply time; this catches the mistake
    /// before the transaction is signed.
    pub fn check_sponsorship_pairing(&self) -> Result<()> {
        let mut open: Vec<AccountId> = Vec::new();
        for (index, op) in self.operations.iter().enumerate() {
            match &op.body {
                OperationBody::BeginSponsoringFutureReserves(begin) => {
                    if open.contains(&begin.sponsored_id) {
                        return Err(Error::constraint(
                            "sponsorship",
                            format!("operation {index} re-sponsors {}", begin.sponsored_id),
                        ));
                    }
                    open.push(begin.sponsored_id);
                }
                OperationBody::EndSponsoringFutureReserves => {
                    let source = op
                        .source_account
                        .unwrap_or(self.source_account)
                        .account_id();
                    let Some(pos) = open.iter().position(|id| *id == source) else {
                        return Err(Error::constraint(
                            "sponsorship",
                            format!("operation {index} ends a sponsorship {source} is not in"),
                        ));
                    };
                    open.remove(pos);
                }
                _ => {}
            }
        }
        match open.first() {
            Some(id) => Err(Error::constraint(
                "sponsorship",
                format!("sponsorship of {id} is never ended"),
            )),
            None => Ok(()),
        }
    }

    /// Wraps the transaction in an unsigned V1 envelope.
    pub fn into_envelope(self) -> TransactionEnvelope {
        TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: self,
            signatures: VecM::new(),
        })
    }
}

impl WriteXdr for Transaction {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.source_account.write_xdr(w);
        w.write_u32(self.fee);
        w.write_i64(self.seq_num);
        self.cond.write_xdr(w);
        self.memo.write_xdr(w);
        self.operations.write_xdr(w);
        self.ext.write_xdr(w);
    }
}

impl ReadXdr for Transaction {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            source_account: MuxedAccount::read_xdr(r)?,
            fee: r.read_u32()?,
            seq_num: r.read_i64()?,
            cond: Preconditions::read_xdr(r)?,
            memo: Memo::read_xdr(r)?,
            operations: VecM::read_xdr(r)?,
            ext: TransactionExt::read_xdr(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum SourceInput {
    Address(String),
    Muxed(MuxedAccount),
}

/// Fluent builder for unsigned [`Transaction`] values.
///
/// # Usage
///
/// ```rust
/// use stellar_wire::config::Network;
/// use stellar_wire::operation::PaymentBuilder;
/// use stellar_wire::transaction::TransactionBuilder;
/// use stellar_wire::types::Asset;
///
/// let source = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";
/// let payment = PaymentBuilder::new(source, Asset::native(), "10").build().unwrap();
/// let tx = TransactionBuilder::new(source, 2)
///     .add_operation(payment)
///     .set_timeout(300)
///     .build()
///     .unwrap();
/// assert_eq!(tx.fee, 100);
/// let envelope = tx.into_envelope();
/// assert_eq!(envelope.hash(&Network::testnet()).len(), 32);
/// ```
///
/// `sequence` is the sequence number the transaction itself carries, i.e.
/// the source account's current sequence plus one.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    source: SourceInput,
    sequence: i64,
    base_fee: u32,
    operations: Vec<Operation>,
    memo: Memo,
    time_bounds: Option<(u64, u64)>,
    timeout: Option<u64>,
    ledger_bounds: Option<(u32, u32)>,
    min_seq_num: Option<i64>,
    min_seq_age: u64,
    min_seq_ledger_gap: u32,
    extra_signers: Vec<SignerKey>,
    soroban_data: Option<SorobanTransactionData>,
}

impl TransactionBuilder {
    /// Creates a builder for `source` (`G...` or `M...`), parsed at build.
    ///
    /// Defaults:
    /// - `base_fee`: [`BASE_FEE`] stroops per operation
    /// - memo: none
    /// - preconditions: none
    pub fn new(source: &str, sequence: i64) -> Self {
        Self::with_source(SourceInput::Address(source.to_string()), sequence)
    }

    pub fn with_muxed_source(source: MuxedAccount, sequence: i64) -> Self {
        Self::with_source(SourceInput::Muxed(source), sequence)
    }

    fn with_source(source: SourceInput, sequence: i64) -> Self {
        Self {
            source,
            sequence,
            base_fee: BASE_FEE,
            operations: Vec::new(),
            memo: Memo::None,
            time_bounds: None,
            timeout: None,
            ledger_bounds: None,
            min_seq_num: None,
            min_seq_age: 0,
            min_seq_ledger_gap: 0,
            extra_signers: Vec::new(),
            soroban_data: None,
        }
    }

    /// Fee per operation in stroops; must be at least [`BASE_FEE`].
    pub fn base_fee(mut self, fee: u32) -> Self {
        self.base_fee = fee;
        self
    }

    pub fn add_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn add_operations(mut self, ops: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(ops);
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    /// Explicit validity window in UNIX seconds; 0 as `max_time` means
    /// unbounded.
    pub fn time_bounds(mut self, min_time: u64, max_time: u64) -> Self {
        self.time_bounds = Some((min_time, max_time));
        self
    }

    /// Sets the upper time bound to `seconds` from the moment `build()` runs.
    /// A timeout of 0 means no upper bound.
    pub fn set_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn ledger_bounds(mut self, min_ledger: u32, max_ledger: u32) -> Self {
        self.ledger_bounds = Some((min_ledger, max_ledger));
        self
    }

    pub fn min_sequence_number(mut self, min_seq_num: i64) -> Self {
        self.min_seq_num = Some(min_seq_num);
        self
    }

    /// Seconds.
    pub fn min_sequence_age(mut self, age: u64) -> Self {
        self.min_seq_age = age;
        self
    }

    pub fn min_sequence_ledger_gap(mut self, gap: u32) -> Self {
        self.min_seq_ledger_gap = gap;
        self
    }

    pub fn extra_signer(mut self, signer: SignerKey) -> Self {
        self.extra_signers.push(signer);
        self
    }

    /// Attaches Soroban resource data; its resource fee is added to the
    /// transaction fee.
    pub fn soroban_data(mut self, data: SorobanTransactionData) -> Self {
        self.soroban_data = Some(data);
        self
    }

    fn preconditions(&self) -> Result<Preconditions> {
        let time_bounds = match (self.time_bounds, self.timeout) {
            (Some((_, max)), Some(_)) if max != 0 => {
                return Err(Error::constraint(
                    "time bounds",
                    "an explicit max time and a timeout cannot both be set",
                ));
            }
            (bounds, Some(timeout)) => {
                let min_time = bounds.map_or(0, |(min, _)| min);
                let max_time = if timeout == 0 {
                    0
                } else {
                    let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
                    now.checked_add(timeout).ok_or(Error::Overflow("timeout"))?
                };
                Some(TimeBounds::new(min_time, max_time)?)
            }
            (Some((min, max)), None) => Some(TimeBounds::new(min, max)?),
            (None, None) => None,
        };
        let ledger_bounds = self
            .ledger_bounds
            .map(|(min, max)| LedgerBounds::new(min, max))
            .transpose()?;
        if self.min_seq_num.is_some_and(|n| n < 0) {
            return Err(Error::constraint("min sequence number", "must not be negative"));
        }
        let extra_signers = VecM::try_from(self.extra_signers.clone()).map_err(|_| {
            Error::constraint(
                "extra signers",
                format!("at most {MAX_EXTRA_SIGNERS} are allowed"),
            )
        })?;

        Ok(Preconditions::from_v2(PreconditionsV2 {
            time_bounds,
            ledger_bounds,
            min_seq_num: self.min_seq_num,
            min_seq_age: self.min_seq_age,
            min_seq_ledger_gap: self.min_seq_ledger_gap,
            extra_signers,
        }))
    }

    /// Validates the collected fields and produces an unsigned transaction.
    ///
    /// `fee = base_fee * operations + resource_fee`, which must fit the
    /// 32-bit fee field.
    pub fn build(self) -> Result<Transaction> {
        if self.operations.is_empty() {
            return Err(Error::constraint("operations", "a transaction needs at least one"));
        }
        let op_count = self.operations.len();
        if op_count > MAX_OPS_PER_TX as usize {
            return Err(Error::constraint(
                "operations",
                format!("{op_count} exceeds the maximum of {MAX_OPS_PER_TX}"),
            ));
        }
        let soroban_ops = self.operations.iter().filter(|op| is_soroban(&op.body)).count();
        if soroban_ops > 0 && op_count > 1 {
            return Err(Error::constraint(
                "operations",
                "a smart-contract operation must be the only operation",
            ));
        }
        if self.base_fee < BASE_FEE {
            return Err(Error::constraint(
                "base fee",
                format!("{} is below the network minimum of {BASE_FEE}", self.base_fee),
            ));
        }
        if self.sequence < 0 {
            return Err(Error::constraint("sequence number", "must not be negative"));
        }

        let resource_fee = self.soroban_data.as_ref().map_or(0, |d| d.resource_fee);
        let fee = u64::from(self.base_fee)
            .checked_mul(op_count as u64)
            .and_then(|f| f.checked_add(u64::try_from(resource_fee).ok()?))
            .and_then(|f| u32::try_from(f).ok())
            .ok_or(Error::Overflow("transaction fee"))?;

        let cond = self.preconditions()?;
        let source_account = match &self.source {
            SourceInput::Address(address) => MuxedAccount::parse(address)?,
            SourceInput::Muxed(account) => *account,
        };
        let ext = match self.soroban_data {
            Some(data) => TransactionExt::V1(data),
            None => TransactionExt::V0,
        };

        let tx = Transaction {
            source_account,
            fee,
            seq_num: self.sequence,
            cond,
            memo: self.memo,
            operations: VecM::try_from(self.operations)?,
            ext,
        };
        debug!(
            source = %tx.source_account,
            seq_num = tx.seq_num,
            fee = tx.fee,
            operations = op_count,
            "transaction built"
        );
        Ok(tx)
    }
}

fn is_soroban(body: &OperationBody) -> bool {
    matches!(
        body,
        OperationBody::InvokeHostFunction(_)
            | OperationBody::ExtendFootprintTtl(_)
            | OperationBody::RestoreFootprint
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{
        BeginSponsoringFutureReservesBuilder, CreateAccountBuilder,
        EndSponsoringFutureReservesBuilder, PaymentBuilder, RestoreFootprintBuilder,
    };
    use crate::soroban::SorobanDataBuilder;
    use crate::types::Asset;

    const SOURCE: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";
    const OTHER: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    fn payment() -> Operation {
        PaymentBuilder::new(OTHER, Asset::native(), "1").build().unwrap()
    }

    fn sample_tx() -> Transaction {
        TransactionBuilder::new(SOURCE, 100)
            .add_operation(payment())
            .add_operation(payment())
            .time_bounds(0, 1_700_000_000)
            .build()
            .unwrap()
    }

    #[test]
    fn fee_is_base_fee_times_ops() {
        let tx = sample_tx();
        assert_eq!(tx.fee, 200);
        let tx = TransactionBuilder::new(SOURCE, 1)
            .base_fee(1_000)
            .add_operation(payment())
            .build()
            .unwrap();
        assert_eq!(tx.fee, 1_000);
    }

    #[test]
    fn fee_overflow_detected() {
        let err = TransactionBuilder::new(SOURCE, 1)
            .base_fee(u32::MAX / 2)
            .add_operations(vec![payment(), payment(), payment()])
            .build()
            .unwrap_err();
        assert_eq!(err, Error::Overflow("transaction fee"));
    }

    #[test]
    fn base_fee_below_minimum_rejected() {
        assert!(TransactionBuilder::new(SOURCE, 1)
            .base_fee(99)
            .add_operation(payment())
            .build()
            .is_err());
    }

    #[test]
    fn empty_transaction_rejected() {
        assert!(TransactionBuilder::new(SOURCE, 1).build().is_err());
    }

    #[test]
    fn too_many_operations_rejected() {
        let ops = vec![payment(); 101];
        assert!(TransactionBuilder::new(SOURCE, 1).add_operations(ops).build().is_err());
    }

    #[test]
    fn hash_is_deterministic_and_network_bound() {
        let tx = sample_tx();
        assert_eq!(tx.hash(&Network::testnet()), sample_tx().hash(&Network::testnet()));
        assert_ne!(tx.hash(&Network::testnet()), tx.hash(&Network::public()));
    }

    #[test]
    fn signature_base_layout() {
        let tx = sample_tx();
        let base = tx.signature_base(&Network::testnet());
        assert_eq!(&base[..32], &Network::testnet().network_id());
        assert_eq!(&base[32..36], &[0, 0, 0, 2]);
        assert_eq!(&base[36..], tx.to_xdr().as_slice());
    }

    #[test]
    fn transaction_xdr_roundtrip() {
        let tx = sample_tx();
        assert_eq!(Transaction::from_xdr(&tx.to_xdr()).unwrap(), tx);
    }

    #[test]
    fn timeout_sets_max_time_from_now() {
        let before = Utc::now().timestamp() as u64;
        let tx = TransactionBuilder::new(SOURCE, 1)
            .add_operation(payment())
            .set_timeout(30)
            .build()
            .unwrap();
        let after = Utc::now().timestamp() as u64;
        let bounds = tx.cond.time_bounds().copied().unwrap();
        assert_eq!(bounds.min_time, 0);
        assert!(bounds.max_time >= before + 30 && bounds.max_time <= after + 30);
        assert!(matches!(tx.cond, Preconditions::Time(_)));
    }

    #[test]
    fn timeout_conflicts_with_explicit_max_time() {
        assert!(TransactionBuilder::new(SOURCE, 1)
            .add_operation(payment())
            .time_bounds(0, 10)
            .set_timeout(30)
            .build()
            .is_err());
    }

    #[test]
    fn no_bounds_means_no_preconditions() {
        let tx = TransactionBuilder::new(SOURCE, 1).add_operation(payment()).build().unwrap();
        assert_eq!(tx.cond, Preconditions::None);
    }

    #[test]
    fn extended_preconditions_use_v2() {
        let tx = TransactionBuilder::new(SOURCE, 1)
            .add_operation(payment())
            .ledger_bounds(10, 20)
            .min_sequence_age(60)
            .extra_signer(SignerKey::HashX([3; 32]))
            .build()
            .unwrap();
        assert!(matches!(tx.cond, Preconditions::V2(_)));
        assert!(TransactionBuilder::new(SOURCE, 1)
            .add_operation(payment())
            .extra_signer(SignerKey::HashX([1; 32]))
            .extra_signer(SignerKey::HashX([2; 32]))
            .extra_signer(SignerKey::HashX([3; 32]))
            .build()
            .is_err());
    }

    #[test]
    fn soroban_data_adds_resource_fee() {
        let data = SorobanDataBuilder::new()
            .resources(1_000_000, 1_000, 1_000)
            .resource_fee(5_000)
            .build()
            .unwrap();
        let tx = TransactionBuilder::new(SOURCE, 1)
            .add_operation(RestoreFootprintBuilder::new().build().unwrap())
            .soroban_data(data)
            .build()
            .unwrap();
        assert_eq!(tx.fee, 5_100);
        assert_eq!(tx.resource_fee(), 5_000);
        assert_eq!(Transaction::from_xdr(&tx.to_xdr()).unwrap(), tx);
    }

    #[test]
    fn soroban_operation_must_be_alone() {
        assert!(TransactionBuilder::new(SOURCE, 1)
            .add_operation(RestoreFootprintBuilder::new().build().unwrap())
            .add_operation(payment())
            .build()
            .is_err());
    }

    #[test]
    fn muxed_source_is_kept() {
        let muxed = MuxedAccount::new(SOURCE.parse().unwrap(), Some(42));
        let tx = TransactionBuilder::with_muxed_source(muxed, 1)
            .add_operation(payment())
            .build()
            .unwrap();
        assert_eq!(tx.source_account, muxed);
        let from_str = TransactionBuilder::new(&muxed.to_string(), 1)
            .add_operation(payment())
            .build()
            .unwrap();
        assert_eq!(from_str.source_account, muxed);
    }

    #[test]
    fn sponsorship_pairing() {
        let begin = BeginSponsoringFutureReservesBuilder::new(OTHER).build().unwrap();
        let create = CreateAccountBuilder::new(OTHER, "0").build().unwrap();
        let end = EndSponsoringFutureReservesBuilder::new()
            .source_account(OTHER)
            .build()
            .unwrap();

        let paired = TransactionBuilder::new(SOURCE, 1)
            .add_operations(vec![begin.clone(), create.clone(), end.clone()])
            .build()
            .unwrap();
        assert!(paired.check_sponsorship_pairing().is_ok());

        let unclosed = TransactionBuilder::new(SOURCE, 1)
            .add_operations(vec![begin.clone(), create])
            .build()
            .unwrap();
        assert!(unclosed.check_sponsorship_pairing().is_err());

        // end run by the sponsor instead of the sponsored account
        let wrong_end = EndSponsoringFutureReservesBuilder::new().build().unwrap();
        let misrouted = TransactionBuilder::new(SOURCE, 1)
            .add_operations(vec![begin, wrong_end])
            .build()
            .unwrap();
        assert!(misrouted.check_sponsorship_pairing().is_err());

        let stray = TransactionBuilder::new(SOURCE, 1).add_operation(end).build().unwrap();
        assert!(stray.check_sponsorship_pairing().is_err());
    }

    #[test]
    fn transaction_json_roundtrip() {
        let tx = sample_tx();
        let json = serde_json::to_string(&tx).unwrap();
        let recovered: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, recovered);
    }
}
