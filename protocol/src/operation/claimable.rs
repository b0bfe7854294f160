//! Claimable balances and clawback.

use serde::{Deserialize, Serialize};

use crate::config::MAX_CLAIMANTS;
use crate::crypto::{sha256, Hash};
use crate::error::{Error, Result};
use crate::transaction::EnvelopeType;
use crate::types::amount::positive_amount;
use crate::types::{AccountId, Asset, ClaimableBalanceId, Claimant, MuxedAccount};
use crate::xdr::{ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::{source_account_setters, Operation, OperationBody, SourceOverride};

// ---------------------------------------------------------------------------
// Create claimable balance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateClaimableBalanceOp {
    pub asset: Asset,
    pub amount: i64,
    pub claimants: VecM<Claimant, MAX_CLAIMANTS>,
}

impl CreateClaimableBalanceOp {
    /// The id the ledger will assign to the balance this operation creates,
    /// given the transaction source, its sequence number and the operation's
    /// index within the transaction.
    pub fn balance_id(source: &AccountId, seq_num: i64, op_index: u32) -> ClaimableBalanceId {
        let mut w = XdrWriter::new();
        EnvelopeType::OpId.write_xdr(&mut w);
        source.write_xdr(&mut w);
        w.write_i64(seq_num);
        w.write_u32(op_index);
        ClaimableBalanceId(Hash(sha256(w.as_bytes())))
    }
}

impl WriteXdr for CreateClaimableBalanceOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.asset.write_xdr(w);
        w.write_i64(self.amount);
        self.claimants.write_xdr(w);
    }
}

impl ReadXdr for CreateClaimableBalanceOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            asset: Asset::read_xdr(r)?,
            amount: r.read_i64()?,
            claimants: VecM::read_xdr(r)?,
        })
    }
}

/// Locks `amount` of `asset` until one of 1..=10 claimants claims it.
#[derive(Debug, Clone)]
pub struct CreateClaimableBalanceBuilder {
    asset: Asset,
    amount: String,
    claimants: Vec<Claimant>,
    source: SourceOverride,
}

impl CreateClaimableBalanceBuilder {
    pub fn new(asset: Asset, amount: &str, claimants: Vec<Claimant>) -> Self {
        Self {
            asset,
            amount: amount.to_string(),
            claimants,
            source: SourceOverride::default(),
        }
    }

    pub fn claimant(mut self, claimant: Claimant) -> Self {
        self.claimants.push(claimant);
        self
    }

    pub fn build(self) -> Result<Operation> {
        if self.claimants.is_empty() {
            return Err(Error::constraint("claimants", "at least one claimant is required"));
        }
        let count = self.claimants.len();
        let claimants = VecM::try_from(self.claimants).map_err(|_| {
            Error::constraint("claimants", format!("{count} exceeds the maximum of {MAX_CLAIMANTS}"))
        })?;
        let body = CreateClaimableBalanceOp {
            asset: self.asset,
            amount: positive_amount("amount", &self.amount)?,
            claimants,
        };
        self.source
            .into_operation(OperationBody::CreateClaimableBalance(body))
    }
}

source_account_setters!(CreateClaimableBalanceBuilder);

// ---------------------------------------------------------------------------
// Claim claimable balance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimClaimableBalanceOp {
    pub balance_id: ClaimableBalanceId,
}

impl WriteXdr for ClaimClaimableBalanceOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.balance_id.write_xdr(w);
    }
}

impl ReadXdr for ClaimClaimableBalanceOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            balance_id: ClaimableBalanceId::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClaimClaimableBalanceBuilder {
    balance_id: String,
    source: SourceOverride,
}

impl ClaimClaimableBalanceBuilder {
    /// `balance_id` is a `B...` StrKey or the hex form Horizon returns.
    pub fn new(balance_id: &str) -> Self {
        Self {
            balance_id: balance_id.to_string(),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        let body = ClaimClaimableBalanceOp {
            balance_id: self.balance_id.parse()?,
        };
        self.source
            .into_operation(OperationBody::ClaimClaimableBalance(body))
    }
}

source_account_setters!(ClaimClaimableBalanceBuilder);

// ---------------------------------------------------------------------------
// Clawback claimable balance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClawbackClaimableBalanceOp {
    pub balance_id: ClaimableBalanceId,
}

impl WriteXdr for ClawbackClaimableBalanceOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.balance_id.write_xdr(w);
    }
}

impl ReadXdr for ClawbackClaimableBalanceOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            balance_id: ClaimableBalanceId::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClawbackClaimableBalanceBuilder {
    balance_id: String,
    source: SourceOverride,
}

impl ClawbackClaimableBalanceBuilder {
    pub fn new(balance_id: &str) -> Self {
        Self {
            balance_id: balance_id.to_string(),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        let body = ClawbackClaimableBalanceOp {
            balance_id: self.balance_id.parse()?,
        };
        self.source
            .into_operation(OperationBody::ClawbackClaimableBalance(body))
    }
}

source_account_setters!(ClawbackClaimableBalanceBuilder);

// ---------------------------------------------------------------------------
// Clawback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClawbackOp {
    pub asset: Asset,
    pub from: MuxedAccount,
    pub amount: i64,
}

impl WriteXdr for ClawbackOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.asset.write_xdr(w);
        self.from.write_xdr(w);
        w.write_i64(self.amount);
    }
}

impl ReadXdr for ClawbackOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            asset: Asset::read_xdr(r)?,
            from: MuxedAccount::read_xdr(r)?,
            amount: r.read_i64()?,
        })
    }
}

/// Burns `amount` of an issued asset held by `from`. Only the issuer can
/// claw back, and only from trust lines with clawback enabled.
#[derive(Debug, Clone)]
pub struct ClawbackBuilder {
    asset: Asset,
    from: String,
    amount: String,
    source: SourceOverride,
}

impl ClawbackBuilder {
    pub fn new(asset: Asset, from: &str, amount: &str) -> Self {
        Self {
            asset,
            from: from.to_string(),
            amount: amount.to_string(),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        if self.asset.is_native() {
            return Err(Error::constraint("asset", "the native asset cannot be clawed back"));
        }
        let body = ClawbackOp {
            asset: self.asset,
            from: MuxedAccount::parse(&self.from)?,
            amount: positive_amount("amount", &self.amount)?,
        };
        self.source.into_operation(OperationBody::Clawback(body))
    }
}

source_account_setters!(ClawbackBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClaimPredicate;

    const ACCOUNT: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";
    const BALANCE_HEX: &str =
        "00000000da0d57da7d4850e7fc10d2a9d0ebc731f7afb40574c03395b17d49149b91f5be";

    fn claimant() -> Claimant {
        Claimant::new(ACCOUNT, ClaimPredicate::Unconditional).unwrap()
    }

    #[test]
    fn create_balance_roundtrip() {
        let predicate = ClaimPredicate::before_relative_time(3600).unwrap().not();
        let op = CreateClaimableBalanceBuilder::new(Asset::native(), "12.5", vec![claimant()])
            .claimant(Claimant::new(ACCOUNT, predicate).unwrap())
            .build()
            .unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn claimant_count_is_bounded() {
        assert!(CreateClaimableBalanceBuilder::new(Asset::native(), "1", vec![])
            .build()
            .is_err());
        let eleven = vec![claimant(); 11];
        assert!(CreateClaimableBalanceBuilder::new(Asset::native(), "1", eleven)
            .build()
            .is_err());
        let ten = vec![claimant(); 10];
        assert!(CreateClaimableBalanceBuilder::new(Asset::native(), "1", ten)
            .build()
            .is_ok());
    }

    #[test]
    fn claim_accepts_hex_and_strkey() {
        let from_hex = ClaimClaimableBalanceBuilder::new(BALANCE_HEX).build().unwrap();
        let OperationBody::ClaimClaimableBalance(body) = &from_hex.body else {
            panic!("wrong body");
        };
        let strkey = body.balance_id.to_string();
        assert!(strkey.starts_with('B'));
        let from_strkey = ClaimClaimableBalanceBuilder::new(&strkey).build().unwrap();
        assert_eq!(from_hex, from_strkey);
        assert_eq!(&hex::encode(&from_hex.to_xdr()[8..]), BALANCE_HEX);
    }

    #[test]
    fn clawback_balance_rejects_garbage() {
        assert!(ClawbackClaimableBalanceBuilder::new("not-an-id").build().is_err());
    }

    #[test]
    fn balance_id_depends_on_op_index() {
        let source: AccountId = ACCOUNT.parse().unwrap();
        let a = CreateClaimableBalanceOp::balance_id(&source, 10, 0);
        let b = CreateClaimableBalanceOp::balance_id(&source, 10, 1);
        assert_ne!(a, b);
        assert_eq!(a, CreateClaimableBalanceOp::balance_id(&source, 10, 0));
    }

    #[test]
    fn clawback_from_muxed_holder() {
        let usd = Asset::credit("USD", ACCOUNT).unwrap();
        let muxed = MuxedAccount::new(ACCOUNT.parse().unwrap(), Some(1)).to_string();
        let op = ClawbackBuilder::new(usd, &muxed, "3").build().unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
        assert!(ClawbackBuilder::new(Asset::native(), ACCOUNT, "3").build().is_err());
        assert!(ClawbackBuilder::new(usd, ACCOUNT, "0").build().is_err());
    }
}
