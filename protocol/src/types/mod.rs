//! # Value Types
//!
//! The vocabulary operations are written in: accounts, assets, prices,
//! amounts, memos, signers, claim predicates and ledger keys. Each type owns
//! its canonical XDR encoding and, where one exists, its StrKey string form.
//!
//! ## Layout
//!
//! ```text
//! account.rs    — AccountId, MuxedAccount (G... / M...)
//! ids.rs        — PoolId, ClaimableBalanceId, ContractId
//! amount.rs     — decimal string <-> stroops
//! asset.rs      — Asset, ChangeTrustAsset, TrustLineAsset, pool parameters
//! price.rs      — Price (n/d) and decimal-string approximation
//! memo.rs       — Memo
//! signer.rs     — SignerKey, Signer
//! claimant.rs   — Claimant, ClaimPredicate
//! ledger_key.rs — LedgerKey
//! ```

pub mod account;
pub mod amount;
pub mod asset;
pub mod claimant;
pub mod ids;
pub mod ledger_key;
pub mod memo;
pub mod price;
pub mod signer;

pub use account::{AccountId, MuxedAccount};
pub use amount::{from_stroops, from_stroops_i128, to_stroops, to_stroops_i128};
pub use asset::{
    AlphaNum12, AlphaNum4, Asset, AssetCode, AssetCode12, AssetCode4, ChangeTrustAsset,
    LiquidityPoolParameters, TrustLineAsset,
};
pub use claimant::{ClaimPredicate, Claimant};
pub use ids::{ClaimableBalanceId, ContractId, PoolId};
pub use ledger_key::{ConfigSettingId, ContractDataDurability, LedgerKey};
pub use memo::Memo;
pub use price::Price;
pub use signer::{Signer, SignerKey};

/// Implements `Serialize`/`Deserialize` through `Display`/`FromStr`, for
/// types whose natural interchange form is a string (StrKeys, `CODE:ISSUER`).
macro_rules! serde_via_str {
    ($ty:ty) => {
        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::core::result::Result<Self, D::Error> {
                let s = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use serde_via_str;
