//! # Operations
//!
//! The 27 operations a transaction can carry, as one closed tagged union.
//!
//! Every operation is an [`Operation`]: an optional source-account override
//! plus an [`OperationBody`]. Decoding dispatches on the body's
//! discriminant; an unknown operation type is a hard error, never a no-op.
//!
//! Each operation kind has a builder. Builders take their required inputs
//! in `new`, optional inputs through setters, and do all parsing and
//! validation in `build()`, so a builder never yields an operation the
//! protocol would reject on value grounds.
//!
//! ```
//! use stellar_wire::operation::PaymentBuilder;
//! use stellar_wire::types::Asset;
//!
//! let op = PaymentBuilder::new(
//!     "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ",
//!     Asset::native(),
//!     "100.5",
//! )
//! .build()
//! .unwrap();
//! assert!(op.source_account.is_none());
//! ```
//!
//! ## Layout
//!
//! ```text
//! payments.rs       — create account, payment, path payments, account merge
//! offers.rs         — manage sell/buy offer, create passive sell offer
//! account.rs        — set options, trust lines, data entries, bump sequence, inflation
//! claimable.rs      — claimable balances and clawback
//! sponsorship.rs    — begin/end/revoke sponsorship
//! liquidity_pool.rs — pool deposit and withdraw
//! soroban.rs        — invoke host function, extend TTL, restore footprint
//! ```

pub mod account;
pub mod claimable;
pub mod liquidity_pool;
pub mod offers;
pub mod payments;
pub mod soroban;
pub mod sponsorship;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::MuxedAccount;
use crate::xdr::{xdr_enum, ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

pub use account::{
    AllowTrustBuilder, AllowTrustOp, BumpSequenceBuilder, BumpSequenceOp, ChangeTrustBuilder,
    ChangeTrustOp, InflationBuilder, ManageDataBuilder, ManageDataOp, SetOptionsBuilder,
    SetOptionsOp, SetTrustLineFlagsBuilder, SetTrustLineFlagsOp, TrustLineFlags,
};
pub use claimable::{
    ClaimClaimableBalanceBuilder, ClaimClaimableBalanceOp, ClawbackBuilder,
    ClawbackClaimableBalanceBuilder, ClawbackClaimableBalanceOp, ClawbackOp,
    CreateClaimableBalanceBuilder, CreateClaimableBalanceOp,
};
pub use liquidity_pool::{
    LiquidityPoolDepositBuilder, LiquidityPoolDepositOp, LiquidityPoolWithdrawBuilder,
    LiquidityPoolWithdrawOp,
};
pub use offers::{
    CreatePassiveSellOfferBuilder, CreatePassiveSellOfferOp, ManageBuyOfferBuilder,
    ManageBuyOfferOp, ManageSellOfferBuilder, ManageSellOfferOp,
};
pub use payments::{
    AccountMergeBuilder, CreateAccountBuilder, CreateAccountOp, PathPaymentStrictReceiveBuilder,
    PathPaymentStrictReceiveOp, PathPaymentStrictSendBuilder, PathPaymentStrictSendOp,
    PaymentBuilder, PaymentOp,
};
pub use soroban::{
    ExtendFootprintTtlBuilder, ExtendFootprintTtlOp, InvokeHostFunctionBuilder,
    InvokeHostFunctionOp, RestoreFootprintBuilder,
};
pub use sponsorship::{
    BeginSponsoringFutureReservesBuilder, BeginSponsoringFutureReservesOp,
    EndSponsoringFutureReservesBuilder, RevokeSponsorshipBuilder, RevokeSponsorshipOp,
};

xdr_enum! {
    /// Operation discriminants.
    pub enum OperationType {
        CreateAccount = 0,
        Payment = 1,
        PathPaymentStrictReceive = 2,
        ManageSellOffer = 3,
        CreatePassiveSellOffer = 4,
        SetOptions = 5,
        ChangeTrust = 6,
        AllowTrust = 7,
        AccountMerge = 8,
        Inflation = 9,
        ManageData = 10,
        BumpSequence = 11,
        ManageBuyOffer = 12,
        PathPaymentStrictSend = 13,
        CreateClaimableBalance = 14,
        ClaimClaimableBalance = 15,
        BeginSponsoringFutureReserves = 16,
        EndSponsoringFutureReserves = 17,
        RevokeSponsorship = 18,
        Clawback = 19,
        ClawbackClaimableBalance = 20,
        SetTrustLineFlags = 21,
        LiquidityPoolDeposit = 22,
        LiquidityPoolWithdraw = 23,
        InvokeHostFunction = 24,
        ExtendFootprintTtl = 25,
        RestoreFootprint = 26,
    }
}

/// The type-specific part of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationBody {
    CreateAccount(CreateAccountOp),
    Payment(PaymentOp),
    PathPaymentStrictReceive(PathPaymentStrictReceiveOp),
    ManageSellOffer(ManageSellOfferOp),
    CreatePassiveSellOffer(CreatePassiveSellOfferOp),
    SetOptions(SetOptionsOp),
    ChangeTrust(ChangeTrustOp),
    AllowTrust(AllowTrustOp),
    /// The destination that receives the merged balance.
    AccountMerge(MuxedAccount),
    Inflation,
    ManageData(ManageDataOp),
    BumpSequence(BumpSequenceOp),
    ManageBuyOffer(ManageBuyOfferOp),
    PathPaymentStrictSend(PathPaymentStrictSendOp),
    CreateClaimableBalance(CreateClaimableBalanceOp),
    ClaimClaimableBalance(ClaimClaimableBalanceOp),
    BeginSponsoringFutureReserves(BeginSponsoringFutureReservesOp),
    EndSponsoringFutureReserves,
    RevokeSponsorship(RevokeSponsorshipOp),
    Clawback(ClawbackOp),
    ClawbackClaimableBalance(ClawbackClaimableBalanceOp),
    SetTrustLineFlags(SetTrustLineFlagsOp),
    LiquidityPoolDeposit(LiquidityPoolDepositOp),
    LiquidityPoolWithdraw(LiquidityPoolWithdrawOp),
    InvokeHostFunction(InvokeHostFunctionOp),
    ExtendFootprintTtl(ExtendFootprintTtlOp),
    RestoreFootprint,
}

impl OperationBody {
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::CreateAccount(_) => OperationType::CreateAccount,
            Self::Payment(_) => OperationType::Payment,
            Self::PathPaymentStrictReceive(_) => OperationType::PathPaymentStrictReceive,
            Self::ManageSellOffer(_) => OperationType::ManageSellOffer,
            Self::CreatePassiveSellOffer(_) => OperationType::CreatePassiveSellOffer,
            Self::SetOptions(_) => OperationType::SetOptions,
            Self::ChangeTrust(_) => OperationType::ChangeTrust,
            Self::AllowTrust(_) => OperationType::AllowTrust,
            Self::AccountMerge(_) => OperationType::AccountMerge,
            Self::Inflation => OperationType::Inflation,
            Self::ManageData(_) => OperationType::ManageData,
            Self::BumpSequence(_) => OperationType::BumpSequence,
            Self::ManageBuyOffer(_) => OperationType::ManageBuyOffer,
            Self::PathPaymentStrictSend(_) => OperationType::PathPaymentStrictSend,
            Self::CreateClaimableBalance(_) => OperationType::CreateClaimableBalance,
            Self::ClaimClaimableBalance(_) => OperationType::ClaimClaimableBalance,
            Self::BeginSponsoringFutureReserves(_) => OperationType::BeginSponsoringFutureReserves,
            Self::EndSponsoringFutureReserves => OperationType::EndSponsoringFutureReserves,
            Self::RevokeSponsorship(_) => OperationType::RevokeSponsorship,
            Self::Clawback(_) => OperationType::Clawback,
            Self::ClawbackClaimableBalance(_) => OperationType::ClawbackClaimableBalance,
            Self::SetTrustLineFlags(_) => OperationType::SetTrustLineFlags,
            Self::LiquidityPoolDeposit(_) => OperationType::LiquidityPoolDeposit,
            Self::LiquidityPoolWithdraw(_) => OperationType::LiquidityPoolWithdraw,
            Self::InvokeHostFunction(_) => OperationType::InvokeHostFunction,
            Self::ExtendFootprintTtl(_) => OperationType::ExtendFootprintTtl,
            Self::RestoreFootprint => OperationType::RestoreFootprint,
        }
    }
}

impl WriteXdr for OperationBody {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.operation_type().write_xdr(w);
        match self {
            Self::CreateAccount(op) => op.write_xdr(w),
            Self::Payment(op) => op.write_xdr(w),
            Self::PathPaymentStrictReceive(op) => op.write_xdr(w),
            Self::ManageSellOffer(op) => op.write_xdr(w),
            Self::CreatePassiveSellOffer(op) => op.write_xdr(w),
            Self::SetOptions(op) => op.write_xdr(w),
            Self::ChangeTrust(op) => op.write_xdr(w),
            Self::AllowTrust(op) => op.write_xdr(w),
            Self::AccountMerge(destination) => destination.write_xdr(w),
            Self::ManageData(op) => op.write_xdr(w),
            Self::BumpSequence(op) => op.write_xdr(w),
            Self::ManageBuyOffer(op) => op.write_xdr(w),
            Self::PathPaymentStrictSend(op) => op.write_xdr(w),
            Self::CreateClaimableBalance(op) => op.write_xdr(w),
            Self::ClaimClaimableBalance(op) => op.write_xdr(w),
            Self::BeginSponsoringFutureReserves(op) => op.write_xdr(w),
            Self::RevokeSponsorship(op) => op.write_xdr(w),
            Self::Clawback(op) => op.write_xdr(w),
            Self::ClawbackClaimableBalance(op) => op.write_xdr(w),
            Self::SetTrustLineFlags(op) => op.write_xdr(w),
            Self::LiquidityPoolDeposit(op) => op.write_xdr(w),
            Self::LiquidityPoolWithdraw(op) => op.write_xdr(w),
            Self::InvokeHostFunction(op) => op.write_xdr(w),
            Self::ExtendFootprintTtl(op) => op.write_xdr(w),
            Self::Inflation | Self::EndSponsoringFutureReserves => {}
            Self::RestoreFootprint => soroban::write_extension_point(w),
        }
    }
}

impl ReadXdr for OperationBody {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        use OperationType as T;

        Ok(match OperationType::read_xdr(r)? {
            T::CreateAccount => Self::CreateAccount(ReadXdr::read_xdr(r)?),
            T::Payment => Self::Payment(ReadXdr::read_xdr(r)?),
            T::PathPaymentStrictReceive => Self::PathPaymentStrictReceive(ReadXdr::read_xdr(r)?),
            T::ManageSellOffer => Self::ManageSellOffer(ReadXdr::read_xdr(r)?),
            T::CreatePassiveSellOffer => Self::CreatePassiveSellOffer(ReadXdr::read_xdr(r)?),
            T::SetOptions => Self::SetOptions(ReadXdr::read_xdr(r)?),
            T::ChangeTrust => Self::ChangeTrust(ReadXdr::read_xdr(r)?),
            T::AllowTrust => Self::AllowTrust(ReadXdr::read_xdr(r)?),
            T::AccountMerge => Self::AccountMerge(ReadXdr::read_xdr(r)?),
            T::Inflation => Self::Inflation,
            T::ManageData => Self::ManageData(ReadXdr::read_xdr(r)?),
            T::BumpSequence => Self::BumpSequence(ReadXdr::read_xdr(r)?),
            T::ManageBuyOffer => Self::ManageBuyOffer(ReadXdr::read_xdr(r)?),
            T::PathPaymentStrictSend => Self::PathPaymentStrictSend(ReadXdr::read_xdr(r)?),
            T::CreateClaimableBalance => Self::CreateClaimableBalance(ReadXdr::read_xdr(r)?),
            T::ClaimClaimableBalance => Self::ClaimClaimableBalance(ReadXdr::read_xdr(r)?),
            T::BeginSponsoringFutureReserves => {
                Self::BeginSponsoringFutureReserves(ReadXdr::read_xdr(r)?)
            }
            T::EndSponsoringFutureReserves => Self::EndSponsoringFutureReserves,
            T::RevokeSponsorship => Self::RevokeSponsorship(ReadXdr::read_xdr(r)?),
            T::Clawback => Self::Clawback(ReadXdr::read_xdr(r)?),
            T::ClawbackClaimableBalance => Self::ClawbackClaimableBalance(ReadXdr::read_xdr(r)?),
            T::SetTrustLineFlags => Self::SetTrustLineFlags(ReadXdr::read_xdr(r)?),
            T::LiquidityPoolDeposit => Self::LiquidityPoolDeposit(ReadXdr::read_xdr(r)?),
            T::LiquidityPoolWithdraw => Self::LiquidityPoolWithdraw(ReadXdr::read_xdr(r)?),
            T::InvokeHostFunction => Self::InvokeHostFunction(ReadXdr::read_xdr(r)?),
            T::ExtendFootprintTtl => Self::ExtendFootprintTtl(ReadXdr::read_xdr(r)?),
            T::RestoreFootprint => {
                soroban::read_extension_point(r)?;
                Self::RestoreFootprint
            }
        })
    }
}

/// One operation: an optional source override and its body.
///
/// With no override the operation runs as the transaction's source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub source_account: Option<MuxedAccount>,
    pub body: OperationBody,
}

impl Operation {
    pub fn new(body: OperationBody) -> Self {
        Self {
            source_account: None,
            body,
        }
    }

    pub fn operation_type(&self) -> OperationType {
        self.body.operation_type()
    }
}

impl WriteXdr for Operation {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_option(&self.source_account);
        self.body.write_xdr(w);
    }
}

impl ReadXdr for Operation {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            source_account: r.read_option()?,
            body: OperationBody::read_xdr(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Builder plumbing
// ---------------------------------------------------------------------------

/// A builder's source-account override, parsed at `build()`.
#[derive(Debug, Clone, Default)]
pub(crate) enum SourceOverride {
    #[default]
    Inherit,
    Address(String),
    Muxed(MuxedAccount),
}

impl SourceOverride {
    pub(crate) fn resolve(&self) -> Result<Option<MuxedAccount>> {
        match self {
            Self::Inherit => Ok(None),
            Self::Address(address) => Ok(Some(MuxedAccount::parse(address)?)),
            Self::Muxed(account) => Ok(Some(*account)),
        }
    }

    /// Wraps a finished body with the resolved override.
    pub(crate) fn into_operation(self, body: OperationBody) -> Result<Operation> {
        Ok(Operation {
            source_account: self.resolve()?,
            body,
        })
    }
}

/// Adds `source_account` / `muxed_source_account` setters to a builder with
/// a `source: SourceOverride` field.
macro_rules! source_account_setters {
    ($builder:ty) => {
        impl $builder {
            /// Runs the operation as `address` (`G...` or `M...`) instead of
            /// the transaction source.
            pub fn source_account(mut self, address: &str) -> Self {
                self.source = $crate::operation::SourceOverride::Address(address.to_string());
                self
            }

            /// Runs the operation as an already-parsed account.
            pub fn muxed_source_account(mut self, account: $crate::types::MuxedAccount) -> Self {
                self.source = $crate::operation::SourceOverride::Muxed(account);
                self
            }
        }
    };
}

pub(crate) use source_account_setters;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Asset;

    const DEST: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";

    #[test]
    fn source_override_sits_before_body() {
        let op = PaymentBuilder::new(DEST, Asset::native(), "1")
            .source_account(DEST)
            .build()
            .unwrap();
        let bytes = op.to_xdr();
        // present flag, key type, key, then the operation type
        assert_eq!(&bytes[..8], &[0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(&bytes[40..44], &[0, 0, 0, 1]);
        assert_eq!(Operation::from_xdr(&bytes).unwrap(), op);
    }

    #[test]
    fn absent_source_is_one_word() {
        let op = InflationBuilder::new().build().unwrap();
        assert_eq!(op.to_xdr(), vec![0, 0, 0, 0, 0, 0, 0, 9]);
    }

    #[test]
    fn muxed_source_is_kept() {
        let muxed = MuxedAccount::new(DEST.parse().unwrap(), Some(7));
        let op = EndSponsoringFutureReservesBuilder::new()
            .muxed_source_account(muxed)
            .build()
            .unwrap();
        assert_eq!(op.source_account, Some(muxed));
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn bad_source_fails_at_build() {
        let err = PaymentBuilder::new(DEST, Asset::native(), "1")
            .source_account("GNOTANADDRESS")
            .build();
        assert!(err.is_err());
    }

    #[test]
    fn unknown_operation_type_is_an_error() {
        let bytes = [0, 0, 0, 0, 0, 0, 0, 27];
        assert!(matches!(
            Operation::from_xdr(&bytes),
            Err(XdrError::InvalidDiscriminant { value: 27, .. })
        ));
    }

    #[test]
    fn restore_footprint_requires_void_extension() {
        assert!(Operation::from_xdr(&[0, 0, 0, 0, 0, 0, 0, 26, 0, 0, 0, 0]).is_ok());
        assert!(Operation::from_xdr(&[0, 0, 0, 0, 0, 0, 0, 26, 0, 0, 0, 1]).is_err());
    }

    #[test]
    fn operation_types_cover_all_discriminants() {
        assert_eq!(OperationType::VARIANTS.len(), 27);
        for (i, t) in OperationType::VARIANTS.iter().enumerate() {
            assert_eq!(t.discriminant(), i as i32);
        }
    }
}
