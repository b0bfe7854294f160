//! Account creation, payments, path payments and account merge.

use serde::{Deserialize, Serialize};

use crate::config::MAX_PATH_LENGTH;
use crate::error::{Error, Result};
use crate::types::amount::{non_negative_amount, positive_amount};
use crate::types::{AccountId, Asset, MuxedAccount};
use crate::xdr::{ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::{source_account_setters, Operation, OperationBody, SourceOverride};

// ---------------------------------------------------------------------------
// Create account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountOp {
    pub destination: AccountId,
    /// Stroops.
    pub starting_balance: i64,
}

impl WriteXdr for CreateAccountOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.destination.write_xdr(w);
        w.write_i64(self.starting_balance);
    }
}

impl ReadXdr for CreateAccountOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            destination: AccountId::read_xdr(r)?,
            starting_balance: r.read_i64()?,
        })
    }
}

/// Creates and funds a new account. The destination must be a plain
/// `G...` address; a zero starting balance is allowed for sponsored
/// accounts.
#[derive(Debug, Clone)]
pub struct CreateAccountBuilder {
    destination: String,
    starting_balance: String,
    source: SourceOverride,
}

impl CreateAccountBuilder {
    pub fn new(destination: &str, starting_balance: &str) -> Self {
        Self {
            destination: destination.to_string(),
            starting_balance: starting_balance.to_string(),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        let body = CreateAccountOp {
            destination: self.destination.parse()?,
            starting_balance: non_negative_amount("starting balance", &self.starting_balance)?,
        };
        self.source.into_operation(OperationBody::CreateAccount(body))
    }
}

source_account_setters!(CreateAccountBuilder);

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOp {
    pub destination: MuxedAccount,
    pub asset: Asset,
    pub amount: i64,
}

impl WriteXdr for PaymentOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.destination.write_xdr(w);
        self.asset.write_xdr(w);
        w.write_i64(self.amount);
    }
}

impl ReadXdr for PaymentOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            destination: MuxedAccount::read_xdr(r)?,
            asset: Asset::read_xdr(r)?,
            amount: r.read_i64()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PaymentBuilder {
    destination: String,
    asset: Asset,
    amount: String,
    source: SourceOverride,
}

impl PaymentBuilder {
    /// `destination` may be `G...` or `M...`; `amount` is a decimal string.
    pub fn new(destination: &str, asset: Asset, amount: &str) -> Self {
        Self {
            destination: destination.to_string(),
            asset,
            amount: amount.to_string(),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        let body = PaymentOp {
            destination: MuxedAccount::parse(&self.destination)?,
            asset: self.asset,
            amount: positive_amount("amount", &self.amount)?,
        };
        self.source.into_operation(OperationBody::Payment(body))
    }
}

source_account_setters!(PaymentBuilder);

// ---------------------------------------------------------------------------
// Path payments
// ---------------------------------------------------------------------------

pub type Path = VecM<Asset, MAX_PATH_LENGTH>;

fn path(assets: Vec<Asset>) -> Result<Path> {
    let len = assets.len();
    VecM::try_from(assets).map_err(|_| {
        Error::constraint(
            "path",
            format!("{len} intermediate assets, at most {MAX_PATH_LENGTH} allowed"),
        )
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPaymentStrictReceiveOp {
    pub send_asset: Asset,
    /// Most the sender will pay.
    pub send_max: i64,
    pub destination: MuxedAccount,
    pub dest_asset: Asset,
    /// Exactly what the destination receives.
    pub dest_amount: i64,
    pub path: Path,
}

impl WriteXdr for PathPaymentStrictReceiveOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.send_asset.write_xdr(w);
        w.write_i64(self.send_max);
        self.destination.write_xdr(w);
        self.dest_asset.write_xdr(w);
        w.write_i64(self.dest_amount);
        self.path.write_xdr(w);
    }
}

impl ReadXdr for PathPaymentStrictReceiveOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            send_asset: Asset::read_xdr(r)?,
            send_max: r.read_i64()?,
            destination: MuxedAccount::read_xdr(r)?,
            dest_asset: Asset::read_xdr(r)?,
            dest_amount: r.read_i64()?,
            path: Path::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PathPaymentStrictReceiveBuilder {
    send_asset: Asset,
    send_max: String,
    destination: String,
    dest_asset: Asset,
    dest_amount: String,
    path: Vec<Asset>,
    source: SourceOverride,
}

impl PathPaymentStrictReceiveBuilder {
    pub fn new(
        send_asset: Asset,
        send_max: &str,
        destination: &str,
        dest_asset: Asset,
        dest_amount: &str,
    ) -> Self {
        Self {
            send_asset,
            send_max: send_max.to_string(),
            destination: destination.to_string(),
            dest_asset,
            dest_amount: dest_amount.to_string(),
            path: Vec::new(),
            source: SourceOverride::default(),
        }
    }

    /// Intermediate assets, at most five.
    pub fn path(mut self, path: Vec<Asset>) -> Self {
        self.path = path;
        self
    }

    pub fn build(self) -> Result<Operation> {
        let body = PathPaymentStrictReceiveOp {
            send_asset: self.send_asset,
            send_max: positive_amount("send max", &self.send_max)?,
            destination: MuxedAccount::parse(&self.destination)?,
            dest_asset: self.dest_asset,
            dest_amount: positive_amount("destination amount", &self.dest_amount)?,
            path: path(self.path)?,
        };
        self.source
            .into_operation(OperationBody::PathPaymentStrictReceive(body))
    }
}

source_account_setters!(PathPaymentStrictReceiveBuilder);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPaymentStrictSendOp {
    pub send_asset: Asset,
    /// Exactly what the sender pays.
    pub send_amount: i64,
    pub destination: MuxedAccount,
    pub dest_asset: Asset,
    /// Least the destination will accept.
    pub dest_min: i64,
    pub path: Path,
}

impl WriteXdr for PathPaymentStrictSendOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.send_asset.write_xdr(w);
        w.write_i64(self.send_amount);
        self.destination.write_xdr(w);
        self.dest_asset.write_xdr(w);
        w.write_i64(self.dest_min);
        self.path.write_xdr(w);
    }
}

impl ReadXdr for PathPaymentStrictSendOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            send_asset: Asset::read_xdr(r)?,
            send_amount: r.read_i64()?,
            destination: MuxedAccount::read_xdr(r)?,
            dest_asset: Asset::read_xdr(r)?,
            dest_min: r.read_i64()?,
            path: Path::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PathPaymentStrictSendBuilder {
    send_asset: Asset,
    send_amount: String,
    destination: String,
    dest_asset: Asset,
    dest_min: String,
    path: Vec<Asset>,
    source: SourceOverride,
}

impl PathPaymentStrictSendBuilder {
    pub fn new(
        send_asset: Asset,
        send_amount: &str,
        destination: &str,
        dest_asset: Asset,
        dest_min: &str,
    ) -> Self {
        Self {
            send_asset,
            send_amount: send_amount.to_string(),
            destination: destination.to_string(),
            dest_asset,
            dest_min: dest_min.to_string(),
            path: Vec::new(),
            source: SourceOverride::default(),
        }
    }

    /// Intermediate assets, at most five.
    pub fn path(mut self, path: Vec<Asset>) -> Self {
        self.path = path;
        self
    }

    pub fn build(self) -> Result<Operation> {
        let body = PathPaymentStrictSendOp {
            send_asset: self.send_asset,
            send_amount: positive_amount("send amount", &self.send_amount)?,
            destination: MuxedAccount::parse(&self.destination)?,
            dest_asset: self.dest_asset,
            dest_min: positive_amount("destination minimum", &self.dest_min)?,
            path: path(self.path)?,
        };
        self.source
            .into_operation(OperationBody::PathPaymentStrictSend(body))
    }
}

source_account_setters!(PathPaymentStrictSendBuilder);

// ---------------------------------------------------------------------------
// Account merge
// ---------------------------------------------------------------------------

/// Merges the source account into `destination` and removes it.
#[derive(Debug, Clone)]
pub struct AccountMergeBuilder {
    destination: String,
    source: SourceOverride,
}

impl AccountMergeBuilder {
    pub fn new(destination: &str) -> Self {
        Self {
            destination: destination.to_string(),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        let destination = MuxedAccount::parse(&self.destination)?;
        self.source
            .into_operation(OperationBody::AccountMerge(destination))
    }
}

source_account_setters!(AccountMergeBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::strkey;

    const DEST: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";

    fn usd() -> Asset {
        Asset::credit("USD", DEST).unwrap()
    }

    #[test]
    fn create_account_encoding() {
        let op = CreateAccountBuilder::new(DEST, "10").build().unwrap();
        let OperationBody::CreateAccount(body) = &op.body else {
            panic!("wrong body");
        };
        assert_eq!(body.starting_balance, 100_000_000);
        assert_eq!(op.to_xdr().len(), 4 + 4 + 36 + 8);
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn create_account_rejects_muxed_destination() {
        let m = strkey::encode_muxed_account(&[1; 32], 5);
        assert!(CreateAccountBuilder::new(&m, "10").build().is_err());
        assert!(CreateAccountBuilder::new(DEST, "0").build().is_ok());
        assert!(CreateAccountBuilder::new(DEST, "-1").build().is_err());
    }

    #[test]
    fn payment_amount_is_scaled() {
        let op = PaymentBuilder::new(DEST, Asset::native(), "100.5").build().unwrap();
        let OperationBody::Payment(body) = &op.body else {
            panic!("wrong body");
        };
        assert_eq!(body.amount, 1_005_000_000);
    }

    #[test]
    fn payment_rejects_bad_amounts() {
        for bad in ["0", "-1", "1.00000001", "abc", "922337203685.4775808"] {
            let err = PaymentBuilder::new(DEST, Asset::native(), bad).build().unwrap_err();
            assert_ne!(err.kind(), ErrorKind::Structural, "{bad}");
        }
        let err = PaymentBuilder::new(DEST, Asset::native(), "922337203685.4775808")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn payment_to_muxed_destination() {
        let m = strkey::encode_muxed_account(&[1; 32], 5);
        let op = PaymentBuilder::new(&m, usd(), "1").build().unwrap();
        let OperationBody::Payment(body) = &op.body else {
            panic!("wrong body");
        };
        assert_eq!(body.destination.id(), Some(5));
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn path_limited_to_five() {
        let five = vec![usd(); 5];
        let ok = PathPaymentStrictSendBuilder::new(Asset::native(), "1", DEST, usd(), "1")
            .path(five.clone())
            .build()
            .unwrap();
        assert_eq!(Operation::from_xdr(&ok.to_xdr()).unwrap(), ok);

        let mut six = five;
        six.push(Asset::native());
        let err = PathPaymentStrictReceiveBuilder::new(Asset::native(), "1", DEST, usd(), "1")
            .path(six)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueConstraint);
    }

    #[test]
    fn strict_receive_roundtrip() {
        let op = PathPaymentStrictReceiveBuilder::new(Asset::native(), "50", DEST, usd(), "10")
            .path(vec![usd()])
            .source_account(DEST)
            .build()
            .unwrap();
        assert_eq!(op.operation_type(), crate::operation::OperationType::PathPaymentStrictReceive);
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn account_merge_body_is_bare_account() {
        let op = AccountMergeBuilder::new(DEST).build().unwrap();
        // no source, type 8, key type 0, key
        assert_eq!(op.to_xdr().len(), 4 + 4 + 4 + 32);
    }
}
