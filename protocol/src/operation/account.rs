//! Account configuration: options, trust lines, data entries, sequence
//! bumps and inflation.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::config::{MAX_DATA_LENGTH, MAX_HOME_DOMAIN_LENGTH};
use crate::error::{Error, Result};
use crate::types::amount::non_negative_amount;
use crate::types::{AccountId, Asset, AssetCode, ChangeTrustAsset, Signer};
use crate::xdr::{BytesM, ReadXdr, StringM, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::{source_account_setters, Operation, OperationBody, SourceOverride};

/// Account flags settable through set-options.
pub mod account_flags {
    pub const AUTH_REQUIRED: u32 = 0x1;
    pub const AUTH_REVOCABLE: u32 = 0x2;
    pub const AUTH_IMMUTABLE: u32 = 0x4;
    pub const AUTH_CLAWBACK_ENABLED: u32 = 0x8;
    pub const MASK: u32 = 0xF;
}

fn weight(field: &'static str, value: u32) -> Result<u32> {
    if value > 255 {
        return Err(Error::constraint(field, format!("{value} exceeds 255")));
    }
    Ok(value)
}

fn flag_pair(field: &'static str, set: u32, clear: u32, mask: u32) -> Result<()> {
    if (set | clear) & !mask != 0 {
        return Err(Error::constraint(field, format!("unknown flag bits in {:#x}", (set | clear) & !mask)));
    }
    if set & clear != 0 {
        return Err(Error::constraint(field, "the same flag cannot be both set and cleared"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Set options
// ---------------------------------------------------------------------------

/// Every field is optional; absent fields leave the account unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOptionsOp {
    pub inflation_dest: Option<AccountId>,
    pub clear_flags: Option<u32>,
    pub set_flags: Option<u32>,
    pub master_weight: Option<u32>,
    pub low_threshold: Option<u32>,
    pub med_threshold: Option<u32>,
    pub high_threshold: Option<u32>,
    pub home_domain: Option<StringM<MAX_HOME_DOMAIN_LENGTH>>,
    /// Adds, updates, or (with weight 0) removes a signer.
    pub signer: Option<Signer>,
}

impl WriteXdr for SetOptionsOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_option(&self.inflation_dest);
        w.write_option(&self.clear_flags);
        w.write_option(&self.set_flags);
        w.write_option(&self.master_weight);
        w.write_option(&self.low_threshold);
        w.write_option(&self.med_threshold);
        w.write_option(&self.high_threshold);
        w.write_option(&self.home_domain);
        w.write_option(&self.signer);
    }
}

impl ReadXdr for SetOptionsOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            inflation_dest: r.read_option()?,
            clear_flags: r.read_option()?,
            set_flags: r.read_option()?,
            master_weight: r.read_option()?,
            low_threshold: r.read_option()?,
            med_threshold: r.read_option()?,
            high_threshold: r.read_option()?,
            home_domain: r.read_option()?,
            signer: r.read_option()?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetOptionsBuilder {
    inflation_dest: Option<String>,
    clear_flags: Option<u32>,
    set_flags: Option<u32>,
    master_weight: Option<u32>,
    low_threshold: Option<u32>,
    med_threshold: Option<u32>,
    high_threshold: Option<u32>,
    home_domain: Option<String>,
    signer: Option<Signer>,
    source: SourceOverride,
}

impl SetOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inflation_dest(mut self, account: &str) -> Self {
        self.inflation_dest = Some(account.to_string());
        self
    }

    /// Bits from [`account_flags`] to clear.
    pub fn clear_flags(mut self, flags: u32) -> Self {
        self.clear_flags = Some(flags);
        self
    }

    /// Bits from [`account_flags`] to set.
    pub fn set_flags(mut self, flags: u32) -> Self {
        self.set_flags = Some(flags);
        self
    }

    pub fn master_weight(mut self, weight: u32) -> Self {
        self.master_weight = Some(weight);
        self
    }

    pub fn low_threshold(mut self, threshold: u32) -> Self {
        self.low_threshold = Some(threshold);
        self
    }

    pub fn med_threshold(mut self, threshold: u32) -> Self {
        self.med_threshold = Some(threshold);
        self
    }

    pub fn high_threshold(mut self, threshold: u32) -> Self {
        self.high_threshold = Some(threshold);
        self
    }

    /// An empty string clears the home domain.
    pub fn home_domain(mut self, domain: &str) -> Self {
        self.home_domain = Some(domain.to_string());
        self
    }

    pub fn signer(mut self, signer: Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn build(self) -> Result<Operation> {
        flag_pair(
            "account flags",
            self.set_flags.unwrap_or(0),
            self.clear_flags.unwrap_or(0),
            account_flags::MASK,
        )?;
        let weight_opt = |field, value: Option<u32>| value.map(|v| weight(field, v)).transpose();
        let home_domain = self
            .home_domain
            .as_deref()
            .map(|d| {
                StringM::try_from(d).map_err(|_| {
                    Error::constraint(
                        "home domain",
                        format!("must be at most {MAX_HOME_DOMAIN_LENGTH} bytes"),
                    )
                })
            })
            .transpose()?;
        if let Some(signer) = &self.signer {
            weight("signer weight", signer.weight)?;
        }

        let body = SetOptionsOp {
            inflation_dest: self.inflation_dest.as_deref().map(str::parse).transpose()?,
            clear_flags: self.clear_flags,
            set_flags: self.set_flags,
            master_weight: weight_opt("master weight", self.master_weight)?,
            low_threshold: weight_opt("low threshold", self.low_threshold)?,
            med_threshold: weight_opt("medium threshold", self.med_threshold)?,
            high_threshold: weight_opt("high threshold", self.high_threshold)?,
            home_domain,
            signer: self.signer,
        };
        self.source.into_operation(OperationBody::SetOptions(body))
    }
}

source_account_setters!(SetOptionsBuilder);

// ---------------------------------------------------------------------------
// Change trust
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTrustOp {
    pub line: ChangeTrustAsset,
    /// 0 removes the trust line.
    pub limit: i64,
}

impl WriteXdr for ChangeTrustOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.line.write_xdr(w);
        w.write_i64(self.limit);
    }
}

impl ReadXdr for ChangeTrustOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            line: ChangeTrustAsset::read_xdr(r)?,
            limit: r.read_i64()?,
        })
    }
}

/// Creates, updates or removes a trust line. The limit defaults to the
/// maximum amount.
#[derive(Debug, Clone)]
pub struct ChangeTrustBuilder {
    line: ChangeTrustAsset,
    limit: Option<String>,
    source: SourceOverride,
}

impl ChangeTrustBuilder {
    pub fn new(line: impl Into<ChangeTrustAsset>) -> Self {
        Self {
            line: line.into(),
            limit: None,
            source: SourceOverride::default(),
        }
    }

    pub fn limit(mut self, limit: &str) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub fn build(self) -> Result<Operation> {
        if matches!(self.line, ChangeTrustAsset::Native) {
            return Err(Error::constraint("trust line", "cannot trust the native asset"));
        }
        let limit = match &self.limit {
            Some(limit) => non_negative_amount("limit", limit)?,
            None => i64::MAX,
        };
        let body = ChangeTrustOp {
            line: self.line,
            limit,
        };
        self.source.into_operation(OperationBody::ChangeTrust(body))
    }
}

source_account_setters!(ChangeTrustBuilder);

// ---------------------------------------------------------------------------
// Allow trust
// ---------------------------------------------------------------------------

/// Authorization levels for allow-trust.
pub mod allow_trust {
    pub const UNAUTHORIZED: u32 = 0;
    pub const AUTHORIZED: u32 = 1;
    pub const AUTHORIZED_TO_MAINTAIN_LIABILITIES: u32 = 2;
}

/// Superseded by set-trust-line-flags but still valid on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowTrustOp {
    pub trustor: AccountId,
    pub asset: AssetCode,
    pub authorize: u32,
}

impl WriteXdr for AllowTrustOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.trustor.write_xdr(w);
        self.asset.write_xdr(w);
        w.write_u32(self.authorize);
    }
}

impl ReadXdr for AllowTrustOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            trustor: AccountId::read_xdr(r)?,
            asset: AssetCode::read_xdr(r)?,
            authorize: r.read_u32()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AllowTrustBuilder {
    trustor: String,
    asset_code: String,
    authorize: u32,
    source: SourceOverride,
}

impl AllowTrustBuilder {
    /// `authorize` is one of the [`allow_trust`] levels.
    pub fn new(trustor: &str, asset_code: &str, authorize: u32) -> Self {
        Self {
            trustor: trustor.to_string(),
            asset_code: asset_code.to_string(),
            authorize,
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        if self.authorize > allow_trust::AUTHORIZED_TO_MAINTAIN_LIABILITIES {
            return Err(Error::constraint(
                "authorize",
                format!("{} is not an authorization level", self.authorize),
            ));
        }
        let body = AllowTrustOp {
            trustor: self.trustor.parse()?,
            asset: self.asset_code.parse()?,
            authorize: self.authorize,
        };
        self.source.into_operation(OperationBody::AllowTrust(body))
    }
}

source_account_setters!(AllowTrustBuilder);

// ---------------------------------------------------------------------------
// Manage data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManageDataOp {
    pub data_name: StringM<MAX_DATA_LENGTH>,
    /// `None` deletes the entry.
    pub data_value: Option<BytesM<MAX_DATA_LENGTH>>,
}

impl WriteXdr for ManageDataOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.data_name.write_xdr(w);
        w.write_option(&self.data_value);
    }
}

impl ReadXdr for ManageDataOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            data_name: StringM::read_xdr(r)?,
            data_value: r.read_option()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ManageDataBuilder {
    name: String,
    value: Option<Vec<u8>>,
    source: SourceOverride,
}

impl ManageDataBuilder {
    /// Sets `name` to `value`, or deletes it when `value` is `None`.
    pub fn new(name: &str, value: Option<&[u8]>) -> Self {
        Self {
            name: name.to_string(),
            value: value.map(<[u8]>::to_vec),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        if self.name.is_empty() {
            return Err(Error::constraint("data name", "must not be empty"));
        }
        let data_name = StringM::try_from(self.name.as_str()).map_err(|_| {
            Error::constraint("data name", format!("must be at most {MAX_DATA_LENGTH} bytes"))
        })?;
        let data_value = self
            .value
            .map(|v| {
                BytesM::try_from(v).map_err(|_| {
                    Error::constraint("data value", format!("must be at most {MAX_DATA_LENGTH} bytes"))
                })
            })
            .transpose()?;
        let body = ManageDataOp { data_name, data_value };
        self.source.into_operation(OperationBody::ManageData(body))
    }
}

source_account_setters!(ManageDataBuilder);

// ---------------------------------------------------------------------------
// Bump sequence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpSequenceOp {
    pub bump_to: i64,
}

impl WriteXdr for BumpSequenceOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_i64(self.bump_to);
    }
}

impl ReadXdr for BumpSequenceOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self { bump_to: r.read_i64()? })
    }
}

#[derive(Debug, Clone)]
pub struct BumpSequenceBuilder {
    bump_to: i64,
    source: SourceOverride,
}

impl BumpSequenceBuilder {
    pub fn new(bump_to: i64) -> Self {
        Self {
            bump_to,
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        if self.bump_to < 0 {
            return Err(Error::constraint("bump to", "sequence numbers are non-negative"));
        }
        let body = BumpSequenceOp { bump_to: self.bump_to };
        self.source.into_operation(OperationBody::BumpSequence(body))
    }
}

source_account_setters!(BumpSequenceBuilder);

// ---------------------------------------------------------------------------
// Inflation
// ---------------------------------------------------------------------------

/// Inflation has been disabled on the network since protocol 12, but the
/// operation still exists on the wire.
#[derive(Debug, Clone, Default)]
pub struct InflationBuilder {
    source: SourceOverride,
}

impl InflationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> Result<Operation> {
        self.source.into_operation(OperationBody::Inflation)
    }
}

source_account_setters!(InflationBuilder);

// ---------------------------------------------------------------------------
// Set trust line flags
// ---------------------------------------------------------------------------

/// Trust-line flag bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrustLineFlags(pub u32);

impl TrustLineFlags {
    pub const NONE: Self = Self(0);
    pub const AUTHORIZED: Self = Self(0x1);
    pub const AUTHORIZED_TO_MAINTAIN_LIABILITIES: Self = Self(0x2);
    pub const CLAWBACK_ENABLED: Self = Self(0x4);
    const MASK: u32 = 0x7;

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TrustLineFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTrustLineFlagsOp {
    pub trustor: AccountId,
    pub asset: Asset,
    pub clear_flags: u32,
    pub set_flags: u32,
}

impl WriteXdr for SetTrustLineFlagsOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.trustor.write_xdr(w);
        self.asset.write_xdr(w);
        w.write_u32(self.clear_flags);
        w.write_u32(self.set_flags);
    }
}

impl ReadXdr for SetTrustLineFlagsOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            trustor: AccountId::read_xdr(r)?,
            asset: Asset::read_xdr(r)?,
            clear_flags: r.read_u32()?,
            set_flags: r.read_u32()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SetTrustLineFlagsBuilder {
    trustor: String,
    asset: Asset,
    set_flags: TrustLineFlags,
    clear_flags: TrustLineFlags,
    source: SourceOverride,
}

impl SetTrustLineFlagsBuilder {
    pub fn new(trustor: &str, asset: Asset) -> Self {
        Self {
            trustor: trustor.to_string(),
            asset,
            set_flags: TrustLineFlags::NONE,
            clear_flags: TrustLineFlags::NONE,
            source: SourceOverride::default(),
        }
    }

    pub fn set_flags(mut self, flags: TrustLineFlags) -> Self {
        self.set_flags = flags;
        self
    }

    pub fn clear_flags(mut self, flags: TrustLineFlags) -> Self {
        self.clear_flags = flags;
        self
    }

    pub fn build(self) -> Result<Operation> {
        if self.asset.is_native() {
            return Err(Error::constraint("asset", "native trust lines have no flags"));
        }
        flag_pair("trust line flags", self.set_flags.0, self.clear_flags.0, TrustLineFlags::MASK)?;
        if self.set_flags.contains(TrustLineFlags::CLAWBACK_ENABLED) {
            return Err(Error::constraint("trust line flags", "clawback can only be cleared"));
        }
        if self
            .set_flags
            .contains(TrustLineFlags::AUTHORIZED | TrustLineFlags::AUTHORIZED_TO_MAINTAIN_LIABILITIES)
        {
            return Err(Error::constraint(
                "trust line flags",
                "authorized and authorized-to-maintain-liabilities are exclusive",
            ));
        }
        let body = SetTrustLineFlagsOp {
            trustor: self.trustor.parse()?,
            asset: self.asset,
            clear_flags: self.clear_flags.0,
            set_flags: self.set_flags.0,
        };
        self.source.into_operation(OperationBody::SetTrustLineFlags(body))
    }
}

source_account_setters!(SetTrustLineFlagsBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LiquidityPoolParameters, SignerKey};

    const ACCOUNT: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";

    fn usd() -> Asset {
        Asset::credit("USD", ACCOUNT).unwrap()
    }

    #[test]
    fn empty_set_options_is_nine_absent_fields() {
        let op = SetOptionsBuilder::new().build().unwrap();
        let bytes = op.to_xdr();
        assert_eq!(bytes.len(), 4 + 4 + 9 * 4);
        assert!(bytes[8..].iter().all(|b| *b == 0));
    }

    #[test]
    fn set_options_full_roundtrip() {
        let signer = Signer::new(SignerKey::HashX([5; 32]), 10).unwrap();
        let op = SetOptionsBuilder::new()
            .inflation_dest(ACCOUNT)
            .set_flags(account_flags::AUTH_REQUIRED | account_flags::AUTH_REVOCABLE)
            .clear_flags(account_flags::AUTH_CLAWBACK_ENABLED)
            .master_weight(1)
            .low_threshold(1)
            .med_threshold(2)
            .high_threshold(3)
            .home_domain("example.com")
            .signer(signer)
            .build()
            .unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn set_options_validation() {
        assert!(SetOptionsBuilder::new().master_weight(256).build().is_err());
        assert!(SetOptionsBuilder::new().high_threshold(300).build().is_err());
        assert!(SetOptionsBuilder::new().home_domain(&"d".repeat(33)).build().is_err());
        assert!(SetOptionsBuilder::new().set_flags(0x10).build().is_err());
        assert!(SetOptionsBuilder::new().set_flags(1).clear_flags(1).build().is_err());
        assert!(SetOptionsBuilder::new().inflation_dest("nope").build().is_err());
        let heavy = Signer { key: SignerKey::Ed25519([1; 32]), weight: 256 };
        assert!(SetOptionsBuilder::new().signer(heavy).build().is_err());
    }

    #[test]
    fn change_trust_defaults_to_max_limit() {
        let op = ChangeTrustBuilder::new(usd()).build().unwrap();
        let OperationBody::ChangeTrust(body) = &op.body else {
            panic!("wrong body");
        };
        assert_eq!(body.limit, i64::MAX);
        assert!(ChangeTrustBuilder::new(Asset::native()).build().is_err());
    }

    #[test]
    fn change_trust_pool_share() {
        let params = LiquidityPoolParameters::constant_product(Asset::native(), usd()).unwrap();
        let op = ChangeTrustBuilder::new(ChangeTrustAsset::PoolShare(params))
            .limit("1000")
            .build()
            .unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn allow_trust_levels() {
        let op = AllowTrustBuilder::new(ACCOUNT, "USDC", allow_trust::AUTHORIZED)
            .build()
            .unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
        assert!(AllowTrustBuilder::new(ACCOUNT, "USDC", 3).build().is_err());
        assert!(AllowTrustBuilder::new(ACCOUNT, "TOOLONGASSETCODE", 1).build().is_err());
    }

    #[test]
    fn manage_data_bounds() {
        assert!(ManageDataBuilder::new("", None).build().is_err());
        assert!(ManageDataBuilder::new(&"n".repeat(65), None).build().is_err());
        assert!(ManageDataBuilder::new("k", Some(&[0u8; 65])).build().is_err());
        let op = ManageDataBuilder::new("k", Some(&[1, 2, 3])).build().unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
        let delete = ManageDataBuilder::new("k", None).build().unwrap();
        assert_eq!(Operation::from_xdr(&delete.to_xdr()).unwrap(), delete);
    }

    #[test]
    fn bump_sequence_non_negative() {
        assert!(BumpSequenceBuilder::new(-1).build().is_err());
        let op = BumpSequenceBuilder::new(i64::MAX).build().unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn trust_line_flag_rules() {
        let ok = SetTrustLineFlagsBuilder::new(ACCOUNT, usd())
            .set_flags(TrustLineFlags::AUTHORIZED)
            .clear_flags(TrustLineFlags::CLAWBACK_ENABLED)
            .build()
            .unwrap();
        assert_eq!(Operation::from_xdr(&ok.to_xdr()).unwrap(), ok);

        let both = TrustLineFlags::AUTHORIZED | TrustLineFlags::AUTHORIZED_TO_MAINTAIN_LIABILITIES;
        assert!(SetTrustLineFlagsBuilder::new(ACCOUNT, usd()).set_flags(both).build().is_err());
        assert!(SetTrustLineFlagsBuilder::new(ACCOUNT, usd())
            .set_flags(TrustLineFlags::CLAWBACK_ENABLED)
            .build()
            .is_err());
        assert!(SetTrustLineFlagsBuilder::new(ACCOUNT, usd())
            .set_flags(TrustLineFlags::AUTHORIZED)
            .clear_flags(TrustLineFlags::AUTHORIZED)
            .build()
            .is_err());
        assert!(SetTrustLineFlagsBuilder::new(ACCOUNT, Asset::native()).build().is_err());
    }
}
