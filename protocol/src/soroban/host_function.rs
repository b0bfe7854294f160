//! Host functions: the payload of an invoke-host-function operation.
//!
//! There are four wire arms but five things a user actually does: invoke a
//! contract, upload Wasm, create a contract from uploaded Wasm (with or
//! without constructor arguments), or deploy the built-in contract for a
//! classic asset. Each has its own constructor here.

use serde::{Deserialize, Serialize};

use crate::config::Network;
use crate::crypto::{sha256, Hash};
use crate::error::Result;
use crate::transaction::EnvelopeType;
use crate::types::{Asset, ContractId};
use crate::xdr::{invalid_discriminant, BytesM, ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::scval::{symbol, ContractExecutable, ScAddress, ScSymbol, ScVal};

const HOST_FUNCTION_TYPE_INVOKE_CONTRACT: i32 = 0;
const HOST_FUNCTION_TYPE_CREATE_CONTRACT: i32 = 1;
const HOST_FUNCTION_TYPE_UPLOAD_CONTRACT_WASM: i32 = 2;
const HOST_FUNCTION_TYPE_CREATE_CONTRACT_V2: i32 = 3;

const CONTRACT_ID_PREIMAGE_FROM_ADDRESS: i32 = 0;
const CONTRACT_ID_PREIMAGE_FROM_ASSET: i32 = 1;

/// What a new contract's id is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractIdPreimage {
    /// A deployer address plus a salt it chooses.
    FromAddress {
        address: ScAddress,
        #[serde(with = "hex::serde")]
        salt: [u8; 32],
    },
    /// The asset a built-in asset contract wraps.
    FromAsset(Asset),
}

impl ContractIdPreimage {
    /// The id the network will assign: SHA-256 over the network id and
    /// this preimage, tagged `ENVELOPE_TYPE_CONTRACT_ID`.
    pub fn contract_id(&self, network: &Network) -> ContractId {
        let mut w = XdrWriter::new();
        EnvelopeType::ContractId.write_xdr(&mut w);
        w.write_fixed_opaque(&network.network_id());
        self.write_xdr(&mut w);
        ContractId(Hash(sha256(w.as_bytes())))
    }
}

impl WriteXdr for ContractIdPreimage {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::FromAddress { address, salt } => {
                w.write_discriminant(CONTRACT_ID_PREIMAGE_FROM_ADDRESS);
                address.write_xdr(w);
                w.write_fixed_opaque(salt);
            }
            Self::FromAsset(asset) => {
                w.write_discriminant(CONTRACT_ID_PREIMAGE_FROM_ASSET);
                asset.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for ContractIdPreimage {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            CONTRACT_ID_PREIMAGE_FROM_ADDRESS => Self::FromAddress {
                address: ScAddress::read_xdr(r)?,
                salt: r.read_fixed_opaque()?,
            },
            CONTRACT_ID_PREIMAGE_FROM_ASSET => Self::FromAsset(Asset::read_xdr(r)?),
            other => return Err(invalid_discriminant("ContractIdPreimage", other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateContractArgs {
    pub contract_id_preimage: ContractIdPreimage,
    pub executable: ContractExecutable,
}

impl WriteXdr for CreateContractArgs {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.contract_id_preimage.write_xdr(w);
        self.executable.write_xdr(w);
    }
}

impl ReadXdr for CreateContractArgs {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            contract_id_preimage: ContractIdPreimage::read_xdr(r)?,
            executable: ContractExecutable::read_xdr(r)?,
        })
    }
}

/// [`CreateContractArgs`] plus arguments for the contract's constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateContractArgsV2 {
    pub contract_id_preimage: ContractIdPreimage,
    pub executable: ContractExecutable,
    pub constructor_args: VecM<ScVal>,
}

impl WriteXdr for CreateContractArgsV2 {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.contract_id_preimage.write_xdr(w);
        self.executable.write_xdr(w);
        self.constructor_args.write_xdr(w);
    }
}

impl ReadXdr for CreateContractArgsV2 {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            contract_id_preimage: ContractIdPreimage::read_xdr(r)?,
            executable: ContractExecutable::read_xdr(r)?,
            constructor_args: VecM::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvokeContractArgs {
    pub contract_address: ScAddress,
    pub function_name: ScSymbol,
    pub args: VecM<ScVal>,
}

impl WriteXdr for InvokeContractArgs {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.contract_address.write_xdr(w);
        self.function_name.write_xdr(w);
        self.args.write_xdr(w);
    }
}

impl ReadXdr for InvokeContractArgs {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            contract_address: ScAddress::read_xdr(r)?,
            function_name: ScSymbol::read_xdr(r)?,
            args: VecM::read_xdr(r)?,
        })
    }
}

/// The function an invoke-host-function operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostFunction {
    InvokeContract(InvokeContractArgs),
    CreateContract(CreateContractArgs),
    UploadContractWasm(BytesM),
    CreateContractV2(CreateContractArgsV2),
}

impl HostFunction {
    /// Calls `function` on the contract at `contract` (a `C...` address).
    pub fn invoke_contract(contract: &str, function: &str, args: Vec<ScVal>) -> Result<Self> {
        Ok(Self::InvokeContract(InvokeContractArgs {
            contract_address: contract.parse()?,
            function_name: symbol(function)?,
            args: VecM::try_from(args)?,
        }))
    }

    pub fn upload_wasm(wasm: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self::UploadContractWasm(BytesM::try_from(wasm.into())?))
    }

    /// Instantiates uploaded Wasm. The new id is derived from `deployer`
    /// and `salt`.
    pub fn create_contract(deployer: &str, wasm_hash: [u8; 32], salt: [u8; 32]) -> Result<Self> {
        Ok(Self::CreateContract(CreateContractArgs {
            contract_id_preimage: ContractIdPreimage::FromAddress {
                address: deployer.parse()?,
                salt,
            },
            executable: ContractExecutable::Wasm(Hash(wasm_hash)),
        }))
    }

    /// Like [`HostFunction::create_contract`], running the contract's
    /// constructor with `args`.
    pub fn create_contract_with_constructor(
        deployer: &str,
        wasm_hash: [u8; 32],
        salt: [u8; 32],
        args: Vec<ScVal>,
    ) -> Result<Self> {
        Ok(Self::CreateContractV2(CreateContractArgsV2 {
            contract_id_preimage: ContractIdPreimage::FromAddress {
                address: deployer.parse()?,
                salt,
            },
            executable: ContractExecutable::Wasm(Hash(wasm_hash)),
            constructor_args: VecM::try_from(args)?,
        }))
    }

    /// Deploys the built-in contract that wraps a classic asset.
    pub fn deploy_asset_contract(asset: Asset) -> Self {
        Self::CreateContract(CreateContractArgs {
            contract_id_preimage: ContractIdPreimage::FromAsset(asset),
            executable: ContractExecutable::StellarAsset,
        })
    }

    /// The id of the contract this function creates, if it creates one.
    pub fn created_contract_id(&self, network: &Network) -> Option<ContractId> {
        match self {
            Self::CreateContract(args) => Some(args.contract_id_preimage.contract_id(network)),
            Self::CreateContractV2(args) => Some(args.contract_id_preimage.contract_id(network)),
            Self::InvokeContract(_) | Self::UploadContractWasm(_) => None,
        }
    }
}

impl WriteXdr for HostFunction {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::InvokeContract(args) => {
                w.write_discriminant(HOST_FUNCTION_TYPE_INVOKE_CONTRACT);
                args.write_xdr(w);
            }
            Self::CreateContract(args) => {
                w.write_discriminant(HOST_FUNCTION_TYPE_CREATE_CONTRACT);
                args.write_xdr(w);
            }
            Self::UploadContractWasm(wasm) => {
                w.write_discriminant(HOST_FUNCTION_TYPE_UPLOAD_CONTRACT_WASM);
                wasm.write_xdr(w);
            }
            Self::CreateContractV2(args) => {
                w.write_discriminant(HOST_FUNCTION_TYPE_CREATE_CONTRACT_V2);
                args.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for HostFunction {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            HOST_FUNCTION_TYPE_INVOKE_CONTRACT => Self::InvokeContract(InvokeContractArgs::read_xdr(r)?),
            HOST_FUNCTION_TYPE_CREATE_CONTRACT => Self::CreateContract(CreateContractArgs::read_xdr(r)?),
            HOST_FUNCTION_TYPE_UPLOAD_CONTRACT_WASM => Self::UploadContractWasm(BytesM::read_xdr(r)?),
            HOST_FUNCTION_TYPE_CREATE_CONTRACT_V2 => {
                Self::CreateContractV2(CreateContractArgsV2::read_xdr(r)?)
            }
            other => return Err(invalid_discriminant("HostFunction", other)),
        })
    }
}
