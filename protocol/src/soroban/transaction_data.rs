//! Resource declarations attached to Soroban transactions
//! (`SorobanTransactionData`, transaction extension v1).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::LedgerKey;
use crate::xdr::{invalid_discriminant, ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

/// The ledger entries a transaction may read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerFootprint {
    pub read_only: VecM<LedgerKey>,
    pub read_write: VecM<LedgerKey>,
}

impl WriteXdr for LedgerFootprint {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.read_only.write_xdr(w);
        self.read_write.write_xdr(w);
    }
}

impl ReadXdr for LedgerFootprint {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            read_only: VecM::read_xdr(r)?,
            read_write: VecM::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SorobanResources {
    pub footprint: LedgerFootprint,
    pub instructions: u32,
    pub disk_read_bytes: u32,
    pub write_bytes: u32,
}

impl WriteXdr for SorobanResources {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.footprint.write_xdr(w);
        w.write_u32(self.instructions);
        w.write_u32(self.disk_read_bytes);
        w.write_u32(self.write_bytes);
    }
}

impl ReadXdr for SorobanResources {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            footprint: LedgerFootprint::read_xdr(r)?,
            instructions: r.read_u32()?,
            disk_read_bytes: r.read_u32()?,
            write_bytes: r.read_u32()?,
        })
    }
}

/// Either nothing, or the indices of archived footprint entries to restore
/// automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SorobanTransactionDataExt {
    #[default]
    V0,
    V1 {
        archived_soroban_entries: VecM<u32>,
    },
}

impl WriteXdr for SorobanTransactionDataExt {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::V0 => w.write_discriminant(0),
            Self::V1 { archived_soroban_entries } => {
                w.write_discriminant(1);
                archived_soroban_entries.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for SorobanTransactionDataExt {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            0 => Self::V0,
            1 => Self::V1 {
                archived_soroban_entries: VecM::read_xdr(r)?,
            },
            other => return Err(invalid_discriminant("SorobanTransactionDataExt", other)),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SorobanTransactionData {
    pub ext: SorobanTransactionDataExt,
    pub resources: SorobanResources,
    /// Stroops reserved for resource fees, on top of the inclusion fee.
    pub resource_fee: i64,
}

impl WriteXdr for SorobanTransactionData {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.ext.write_xdr(w);
        self.resources.write_xdr(w);
        w.write_i64(self.resource_fee);
    }
}

impl ReadXdr for SorobanTransactionData {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            ext: SorobanTransactionDataExt::read_xdr(r)?,
            resources: SorobanResources::read_xdr(r)?,
            resource_fee: r.read_i64()?,
        })
    }
}

/// Assembles [`SorobanTransactionData`], usually from simulation results.
#[derive(Debug, Clone, Default)]
pub struct SorobanDataBuilder {
    data: SorobanTransactionData,
}

impl SorobanDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing data, e.g. decoded from a simulation response.
    pub fn from_data(data: SorobanTransactionData) -> Self {
        Self { data }
    }

    pub fn from_xdr_base64(data: &str) -> Result<Self> {
        Ok(Self::from_data(SorobanTransactionData::from_xdr_base64(data)?))
    }

    pub fn read_only(mut self, keys: Vec<LedgerKey>) -> Result<Self> {
        self.data.resources.footprint.read_only = VecM::try_from(keys)?;
        Ok(self)
    }

    pub fn read_write(mut self, keys: Vec<LedgerKey>) -> Result<Self> {
        self.data.resources.footprint.read_write = VecM::try_from(keys)?;
        Ok(self)
    }

    pub fn resources(mut self, instructions: u32, disk_read_bytes: u32, write_bytes: u32) -> Self {
        self.data.resources.instructions = instructions;
        self.data.resources.disk_read_bytes = disk_read_bytes;
        self.data.resources.write_bytes = write_bytes;
        self
    }

    pub fn resource_fee(mut self, fee: i64) -> Self {
        self.data.resource_fee = fee;
        self
    }

    /// Marks footprint entries (by index into the read-write list) as
    /// archived so they are restored before execution.
    pub fn archived_entries(mut self, indices: Vec<u32>) -> Result<Self> {
        self.data.ext = SorobanTransactionDataExt::V1 {
            archived_soroban_entries: VecM::try_from(indices)?,
        };
        Ok(self)
    }

    pub fn build(self) -> Result<SorobanTransactionData> {
        if self.data.resource_fee < 0 {
            return Err(Error::constraint("resource fee", "must be non-negative"));
        }
        if let SorobanTransactionDataExt::V1 { archived_soroban_entries } = &self.data.ext {
            let rw = self.data.resources.footprint.read_write.len();
            if let Some(bad) = archived_soroban_entries.iter().find(|i| **i as usize >= rw) {
                return Err(Error::constraint(
                    "archived entries",
                    format!("index {bad} is outside the read-write footprint ({rw} entries)"),
                ));
            }
        }
        Ok(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Hash;

    fn code_key(b: u8) -> LedgerKey {
        LedgerKey::ContractCode { hash: Hash([b; 32]) }
    }

    #[test]
    fn test_builder_roundtrip() {
        let data = SorobanDataBuilder::new()
            .read_only(vec![code_key(1)])
            .unwrap()
            .read_write(vec![code_key(2), code_key(3)])
            .unwrap()
            .resources(1_000_000, 2_048, 512)
            .resource_fee(12_345)
            .archived_entries(vec![1])
            .unwrap()
            .build()
            .unwrap();
        let b64 = data.to_xdr_base64();
        let rebuilt = SorobanDataBuilder::from_xdr_base64(&b64).unwrap().build().unwrap();
        assert_eq!(rebuilt, data);
    }

    #[test]
    fn test_empty_data_layout() {
        let data = SorobanDataBuilder::new().build().unwrap();
        // ext v0, two empty vectors, three u32s, one i64
        assert_eq!(data.to_xdr(), vec![0u8; 4 + 4 + 4 + 12 + 8]);
    }

    #[test]
    fn test_archived_index_out_of_range() {
        let err = SorobanDataBuilder::new()
            .read_write(vec![code_key(2)])
            .unwrap()
            .archived_entries(vec![1])
            .unwrap()
            .build();
        assert!(err.is_err());
    }

    #[test]
    fn test_negative_resource_fee_rejected() {
        assert!(SorobanDataBuilder::new().resource_fee(-1).build().is_err());
    }
}
