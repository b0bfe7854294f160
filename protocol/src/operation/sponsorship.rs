//! Reserve sponsorship.
//!
//! Begin and end operations come in pairs inside one transaction: everything
//! between them that creates reserves for the sponsored account is paid for
//! by the begin operation's source. See
//! [`Transaction::check_sponsorship_pairing`](crate::transaction::Transaction::check_sponsorship_pairing).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{AccountId, LedgerKey, SignerKey};
use crate::xdr::{invalid_discriminant, ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::{source_account_setters, Operation, OperationBody, SourceOverride};

// ---------------------------------------------------------------------------
// Begin / end
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginSponsoringFutureReservesOp {
    pub sponsored_id: AccountId,
}

impl WriteXdr for BeginSponsoringFutureReservesOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.sponsored_id.write_xdr(w);
    }
}

impl ReadXdr for BeginSponsoringFutureReservesOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            sponsored_id: AccountId::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BeginSponsoringFutureReservesBuilder {
    sponsored_id: String,
    source: SourceOverride,
}

impl BeginSponsoringFutureReservesBuilder {
    pub fn new(sponsored_id: &str) -> Self {
        Self {
            sponsored_id: sponsored_id.to_string(),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        let body = BeginSponsoringFutureReservesOp {
            sponsored_id: self.sponsored_id.parse()?,
        };
        self.source
            .into_operation(OperationBody::BeginSponsoringFutureReserves(body))
    }
}

source_account_setters!(BeginSponsoringFutureReservesBuilder);

/// Closes a sponsorship block. Its source must be the sponsored account.
#[derive(Debug, Clone, Default)]
pub struct EndSponsoringFutureReservesBuilder {
    source: SourceOverride,
}

impl EndSponsoringFutureReservesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> Result<Operation> {
        self.source
            .into_operation(OperationBody::EndSponsoringFutureReserves)
    }
}

source_account_setters!(EndSponsoringFutureReservesBuilder);

// ---------------------------------------------------------------------------
// Revoke
// ---------------------------------------------------------------------------

const REVOKE_SPONSORSHIP_LEDGER_ENTRY: i32 = 0;
const REVOKE_SPONSORSHIP_SIGNER: i32 = 1;

/// Removes or transfers sponsorship of a ledger entry or of a signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokeSponsorshipOp {
    LedgerEntry(LedgerKey),
    Signer {
        account_id: AccountId,
        signer_key: SignerKey,
    },
}

impl WriteXdr for RevokeSponsorshipOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::LedgerEntry(key) => {
                w.write_discriminant(REVOKE_SPONSORSHIP_LEDGER_ENTRY);
                key.write_xdr(w);
            }
            Self::Signer { account_id, signer_key } => {
                w.write_discriminant(REVOKE_SPONSORSHIP_SIGNER);
                account_id.write_xdr(w);
                signer_key.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for RevokeSponsorshipOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match r.read_discriminant()? {
            REVOKE_SPONSORSHIP_LEDGER_ENTRY => Ok(Self::LedgerEntry(LedgerKey::read_xdr(r)?)),
            REVOKE_SPONSORSHIP_SIGNER => Ok(Self::Signer {
                account_id: AccountId::read_xdr(r)?,
                signer_key: SignerKey::read_xdr(r)?,
            }),
            other => Err(invalid_discriminant("RevokeSponsorshipOp", other)),
        }
    }
}

#[derive(Debug, Clone)]
enum RevokeTarget {
    LedgerEntry(LedgerKey),
    Signer { account_id: String, signer_key: SignerKey },
}

#[derive(Debug, Clone)]
pub struct RevokeSponsorshipBuilder {
    target: RevokeTarget,
    source: SourceOverride,
}

impl RevokeSponsorshipBuilder {
    fn with_target(target: RevokeTarget) -> Self {
        Self {
            target,
            source: SourceOverride::default(),
        }
    }

    /// Any ledger entry; the `LedgerKey` helpers cover the common kinds.
    pub fn ledger_entry(key: LedgerKey) -> Self {
        Self::with_target(RevokeTarget::LedgerEntry(key))
    }

    pub fn account(account_id: &str) -> Result<Self> {
        Ok(Self::ledger_entry(LedgerKey::account(account_id)?))
    }

    pub fn signer(account_id: &str, signer_key: SignerKey) -> Self {
        Self::with_target(RevokeTarget::Signer {
            account_id: account_id.to_string(),
            signer_key,
        })
    }

    pub fn build(self) -> Result<Operation> {
        let body = match self.target {
            RevokeTarget::LedgerEntry(key) => RevokeSponsorshipOp::LedgerEntry(key),
            RevokeTarget::Signer { account_id, signer_key } => RevokeSponsorshipOp::Signer {
                account_id: account_id.parse()?,
                signer_key,
            },
        };
        self.source.into_operation(OperationBody::RevokeSponsorship(body))
    }
}

source_account_setters!(RevokeSponsorshipBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Asset, TrustLineAsset};

    const ACCOUNT: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";

    #[test]
    fn begin_sponsoring_roundtrip() {
        let op = BeginSponsoringFutureReservesBuilder::new(ACCOUNT).build().unwrap();
        assert_eq!(op.to_xdr().len(), 4 + 4 + 36);
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
        assert!(BeginSponsoringFutureReservesBuilder::new("M...").build().is_err());
    }

    #[test]
    fn revoke_ledger_entry() {
        let usd = Asset::credit("USD", ACCOUNT).unwrap();
        let key = LedgerKey::trustline(ACCOUNT, TrustLineAsset::from(usd)).unwrap();
        let op = RevokeSponsorshipBuilder::ledger_entry(key).build().unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);

        let account = RevokeSponsorshipBuilder::account(ACCOUNT).unwrap().build().unwrap();
        assert_eq!(Operation::from_xdr(&account.to_xdr()).unwrap(), account);
    }

    #[test]
    fn revoke_signer() {
        let op = RevokeSponsorshipBuilder::signer(ACCOUNT, SignerKey::PreAuthTx([9; 32]))
            .build()
            .unwrap();
        let bytes = op.to_xdr();
        // no source, op type 18, signer arm
        assert_eq!(&bytes[4..12], &[0, 0, 0, 18, 0, 0, 0, 1]);
        assert_eq!(Operation::from_xdr(&bytes).unwrap(), op);
    }

    #[test]
    fn unknown_revoke_arm() {
        assert!(RevokeSponsorshipOp::from_xdr(&[0, 0, 0, 2]).is_err());
    }
}
