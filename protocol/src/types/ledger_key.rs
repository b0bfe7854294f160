//! Keys identifying ledger entries.
//!
//! Used by revoke-sponsorship and by the read/write footprint of Soroban
//! transactions.

use serde::{Deserialize, Serialize};

use crate::crypto::Hash;
use crate::error::{Error, Result};
use crate::soroban::{ScAddress, ScVal};
use crate::xdr::{invalid_discriminant, xdr_enum, ReadXdr, StringM, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::{AccountId, ClaimableBalanceId, PoolId, TrustLineAsset};

const ACCOUNT: i32 = 0;
const TRUSTLINE: i32 = 1;
const OFFER: i32 = 2;
const DATA: i32 = 3;
const CLAIMABLE_BALANCE: i32 = 4;
const LIQUIDITY_POOL: i32 = 5;
const CONTRACT_DATA: i32 = 6;
const CONTRACT_CODE: i32 = 7;
const CONFIG_SETTING: i32 = 8;
const TTL: i32 = 9;

xdr_enum! {
    /// Lifetime class of a contract data entry.
    pub enum ContractDataDurability {
        Temporary = 0,
        Persistent = 1,
    }
}

xdr_enum! {
    /// Network configuration entries.
    pub enum ConfigSettingId {
        ContractMaxSizeBytes = 0,
        ContractComputeV0 = 1,
        ContractLedgerCostV0 = 2,
        ContractHistoricalDataV0 = 3,
        ContractEventsV0 = 4,
        ContractBandwidthV0 = 5,
        ContractCostParamsCpuInstructions = 6,
        ContractCostParamsMemoryBytes = 7,
        ContractDataKeySizeBytes = 8,
        ContractDataEntrySizeBytes = 9,
        StateArchival = 10,
        ContractExecutionLanes = 11,
        LiveSorobanStateSizeWindow = 12,
        EvictionIterator = 13,
        ContractParallelComputeV0 = 14,
        ContractLedgerCostExtV0 = 15,
        ScpTiming = 16,
    }
}

/// A reference to one ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKey {
    Account {
        account_id: AccountId,
    },
    Trustline {
        account_id: AccountId,
        asset: TrustLineAsset,
    },
    Offer {
        seller_id: AccountId,
        offer_id: i64,
    },
    Data {
        account_id: AccountId,
        data_name: StringM<64>,
    },
    ClaimableBalance {
        balance_id: ClaimableBalanceId,
    },
    LiquidityPool {
        liquidity_pool_id: PoolId,
    },
    ContractData {
        contract: ScAddress,
        key: ScVal,
        durability: ContractDataDurability,
    },
    ContractCode {
        hash: Hash,
    },
    ConfigSetting {
        config_setting_id: ConfigSettingId,
    },
    Ttl {
        /// SHA-256 of the contract data or code key.
        key_hash: Hash,
    },
}

impl LedgerKey {
    pub fn account(account_id: &str) -> Result<Self> {
        Ok(Self::Account {
            account_id: account_id.parse()?,
        })
    }

    pub fn trustline(account_id: &str, asset: TrustLineAsset) -> Result<Self> {
        Ok(Self::Trustline {
            account_id: account_id.parse()?,
            asset,
        })
    }

    pub fn offer(seller_id: &str, offer_id: i64) -> Result<Self> {
        Ok(Self::Offer {
            seller_id: seller_id.parse()?,
            offer_id,
        })
    }

    pub fn data(account_id: &str, name: &str) -> Result<Self> {
        let data_name = StringM::try_from(name)
            .map_err(|_| Error::constraint("data name", "must be at most 64 bytes"))?;
        Ok(Self::Data {
            account_id: account_id.parse()?,
            data_name,
        })
    }

    /// The key of the matching `Ttl` entry. Only contract data and code
    /// entries have one.
    pub fn ttl_key(&self) -> Option<LedgerKey> {
        match self {
            Self::ContractData { .. } | Self::ContractCode { .. } => Some(Self::Ttl {
                key_hash: Hash::of(&self.to_xdr()),
            }),
            _ => None,
        }
    }
}

impl WriteXdr for LedgerKey {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Account { account_id } => {
                w.write_discriminant(ACCOUNT);
                account_id.write_xdr(w);
            }
            Self::Trustline { account_id, asset } => {
                w.write_discriminant(TRUSTLINE);
                account_id.write_xdr(w);
                asset.write_xdr(w);
            }
            Self::Offer { seller_id, offer_id } => {
                w.write_discriminant(OFFER);
                seller_id.write_xdr(w);
                w.write_i64(*offer_id);
            }
            Self::Data { account_id, data_name } => {
                w.write_discriminant(DATA);
                account_id.write_xdr(w);
                data_name.write_xdr(w);
            }
            Self::ClaimableBalance { balance_id } => {
                w.write_discriminant(CLAIMABLE_BALANCE);
                balance_id.write_xdr(w);
            }
            Self::LiquidityPool { liquidity_pool_id } => {
                w.write_discriminant(LIQUIDITY_POOL);
                liquidity_pool_id.write_xdr(w);
            }
            Self::ContractData { contract, key, durability } => {
                w.write_discriminant(CONTRACT_DATA);
                contract.write_xdr(w);
                key.write_xdr(w);
                durability.write_xdr(w);
            }
            Self::ContractCode { hash } => {
                w.write_discriminant(CONTRACT_CODE);
                hash.write_xdr(w);
            }
            Self::ConfigSetting { config_setting_id } => {
                w.write_discriminant(CONFIG_SETTING);
                config_setting_id.write_xdr(w);
            }
            Self::Ttl { key_hash } => {
                w.write_discriminant(TTL);
                key_hash.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for LedgerKey {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            ACCOUNT => Self::Account {
                account_id: AccountId::read_xdr(r)?,
            },
            TRUSTLINE => Self::Trustline {
                account_id: AccountId::read_xdr(r)?,
                asset: TrustLineAsset::read_xdr(r)?,
            },
            OFFER => Self::Offer {
                seller_id: AccountId::read_xdr(r)?,
                offer_id: r.read_i64()?,
            },
            DATA => Self::Data {
                account_id: AccountId::read_xdr(r)?,
                data_name: StringM::read_xdr(r)?,
            },
            CLAIMABLE_BALANCE => Self::ClaimableBalance {
                balance_id: ClaimableBalanceId::read_xdr(r)?,
            },
            LIQUIDITY_POOL => Self::LiquidityPool {
                liquidity_pool_id: PoolId::read_xdr(r)?,
            },
            CONTRACT_DATA => Self::ContractData {
                contract: ScAddress::read_xdr(r)?,
                key: ScVal::read_xdr(r)?,
                durability: ContractDataDurability::read_xdr(r)?,
            },
            CONTRACT_CODE => Self::ContractCode {
                hash: Hash::read_xdr(r)?,
            },
            CONFIG_SETTING => Self::ConfigSetting {
                config_setting_id: ConfigSettingId::read_xdr(r)?,
            },
            TTL => Self::Ttl {
                key_hash: Hash::read_xdr(r)?,
            },
            other => return Err(invalid_discriminant("LedgerKey", other)),
        })
    }
}
