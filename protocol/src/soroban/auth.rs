//! Authorization entries for contract invocations.
//!
//! An invoke-host-function operation carries, next to its function, a list
//! of entries saying who authorized which call tree. Entries with
//! source-account credentials are covered by the transaction signature;
//! entries with address credentials carry their own signature over a
//! `ENVELOPE_TYPE_SOROBAN_AUTHORIZATION` preimage.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Network;
use crate::crypto::{sha256, KeyPair};
use crate::error::{Error, Result};
use crate::transaction::EnvelopeType;
use crate::xdr::{invalid_discriminant, ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::host_function::{CreateContractArgs, CreateContractArgsV2, InvokeContractArgs};
use super::scval::{ScAddress, ScVal};

const SOROBAN_CREDENTIALS_SOURCE_ACCOUNT: i32 = 0;
const SOROBAN_CREDENTIALS_ADDRESS: i32 = 1;

const AUTHORIZED_FUNCTION_CONTRACT_FN: i32 = 0;
const AUTHORIZED_FUNCTION_CREATE_CONTRACT: i32 = 1;
const AUTHORIZED_FUNCTION_CREATE_CONTRACT_V2: i32 = 2;

/// A call that an entry authorizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SorobanAuthorizedFunction {
    ContractFn(InvokeContractArgs),
    CreateContractHostFn(CreateContractArgs),
    CreateContractV2HostFn(CreateContractArgsV2),
}

impl WriteXdr for SorobanAuthorizedFunction {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::ContractFn(args) => {
                w.write_discriminant(AUTHORIZED_FUNCTION_CONTRACT_FN);
                args.write_xdr(w);
            }
            Self::CreateContractHostFn(args) => {
                w.write_discriminant(AUTHORIZED_FUNCTION_CREATE_CONTRACT);
                args.write_xdr(w);
            }
            Self::CreateContractV2HostFn(args) => {
                w.write_discriminant(AUTHORIZED_FUNCTION_CREATE_CONTRACT_V2);
                args.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for SorobanAuthorizedFunction {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            AUTHORIZED_FUNCTION_CONTRACT_FN => Self::ContractFn(InvokeContractArgs::read_xdr(r)?),
            AUTHORIZED_FUNCTION_CREATE_CONTRACT => {
                Self::CreateContractHostFn(CreateContractArgs::read_xdr(r)?)
            }
            AUTHORIZED_FUNCTION_CREATE_CONTRACT_V2 => {
                Self::CreateContractV2HostFn(CreateContractArgsV2::read_xdr(r)?)
            }
            other => return Err(invalid_discriminant("SorobanAuthorizedFunction", other)),
        })
    }
}

/// A node in the authorized call tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SorobanAuthorizedInvocation {
    pub function: SorobanAuthorizedFunction,
    pub sub_invocations: VecM<SorobanAuthorizedInvocation>,
}

impl SorobanAuthorizedInvocation {
    pub fn new(function: SorobanAuthorizedFunction) -> Self {
        Self {
            function,
            sub_invocations: VecM::new(),
        }
    }

    pub fn with_sub_invocation(mut self, sub: SorobanAuthorizedInvocation) -> Result<Self> {
        self.sub_invocations.try_push(sub)?;
        Ok(self)
    }
}

impl WriteXdr for SorobanAuthorizedInvocation {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.function.write_xdr(w);
        self.sub_invocations.write_xdr(w);
    }
}

impl ReadXdr for SorobanAuthorizedInvocation {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        r.nested(|r| {
            Ok(Self {
                function: SorobanAuthorizedFunction::read_xdr(r)?,
                sub_invocations: VecM::read_xdr(r)?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SorobanAddressCredentials {
    pub address: ScAddress,
    pub nonce: i64,
    pub signature_expiration_ledger: u32,
    /// `Void` until signed.
    pub signature: ScVal,
}

impl WriteXdr for SorobanAddressCredentials {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.address.write_xdr(w);
        w.write_i64(self.nonce);
        w.write_u32(self.signature_expiration_ledger);
        self.signature.write_xdr(w);
    }
}

impl ReadXdr for SorobanAddressCredentials {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            address: ScAddress::read_xdr(r)?,
            nonce: r.read_i64()?,
            signature_expiration_ledger: r.read_u32()?,
            signature: ScVal::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SorobanCredentials {
    SourceAccount,
    Address(SorobanAddressCredentials),
}

impl WriteXdr for SorobanCredentials {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::SourceAccount => w.write_discriminant(SOROBAN_CREDENTIALS_SOURCE_ACCOUNT),
            Self::Address(creds) => {
                w.write_discriminant(SOROBAN_CREDENTIALS_ADDRESS);
                creds.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for SorobanCredentials {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            SOROBAN_CREDENTIALS_SOURCE_ACCOUNT => Self::SourceAccount,
            SOROBAN_CREDENTIALS_ADDRESS => Self::Address(SorobanAddressCredentials::read_xdr(r)?),
            other => return Err(invalid_discriminant("SorobanCredentials", other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SorobanAuthorizationEntry {
    pub credentials: SorobanCredentials,
    pub root_invocation: SorobanAuthorizedInvocation,
}

impl SorobanAuthorizationEntry {
    /// An entry covered by the transaction's own source signature.
    pub fn source_account(root_invocation: SorobanAuthorizedInvocation) -> Self {
        Self {
            credentials: SorobanCredentials::SourceAccount,
            root_invocation,
        }
    }

    /// The hash an address signer signs for this entry on `network`.
    ///
    /// `None` for source-account entries, which have nothing to sign.
    pub fn signature_payload(&self, network: &Network) -> Option<[u8; 32]> {
        let SorobanCredentials::Address(creds) = &self.credentials else {
            return None;
        };
        let mut w = XdrWriter::new();
        EnvelopeType::SorobanAuthorization.write_xdr(&mut w);
        w.write_fixed_opaque(&network.network_id());
        w.write_i64(creds.nonce);
        w.write_u32(creds.signature_expiration_ledger);
        self.root_invocation.write_xdr(&mut w);
        Some(sha256(w.as_bytes()))
    }
}

impl WriteXdr for SorobanAuthorizationEntry {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.credentials.write_xdr(w);
        self.root_invocation.write_xdr(w);
    }
}

impl ReadXdr for SorobanAuthorizationEntry {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            credentials: SorobanCredentials::read_xdr(r)?,
            root_invocation: SorobanAuthorizedInvocation::read_xdr(r)?,
        })
    }
}

/// Signs an address-credential entry with `signer`, valid through
/// `valid_until_ledger`.
///
/// The signature is stored in the account-contract convention: a vector
/// holding one map `{public_key: bytes, signature: bytes}`. Source-account
/// entries are returned unchanged. The entry's address must be `signer`'s
/// account.
pub fn authorize_entry(
    entry: &SorobanAuthorizationEntry,
    signer: &KeyPair,
    valid_until_ledger: u32,
    network: &Network,
) -> Result<SorobanAuthorizationEntry> {
    let address = match &entry.credentials {
        SorobanCredentials::SourceAccount => return Ok(entry.clone()),
        SorobanCredentials::Address(creds) => creds.address,
    };
    if address != ScAddress::Account(signer.account_id()) {
        return Err(Error::constraint(
            "authorization entry",
            format!("address {address} is not the signer {}", signer.address()),
        ));
    }

    let mut entry = entry.clone();
    if let SorobanCredentials::Address(creds) = &mut entry.credentials {
        creds.signature_expiration_ledger = valid_until_ledger;
    }
    let payload = entry
        .signature_payload(network)
        .ok_or_else(|| Error::constraint("authorization entry", "no address credentials"))?;
    let signature = signer.sign(&payload);
    let sig_map = ScVal::map(vec![
        (ScVal::symbol("public_key")?, ScVal::bytes(signer.public_key_bytes())?),
        (ScVal::symbol("signature")?, ScVal::bytes(signature)?),
    ])?;

    if let SorobanCredentials::Address(creds) = &mut entry.credentials {
        creds.signature = ScVal::vec(vec![sig_map])?;
    }
    debug!(
        payload = %hex::encode(payload),
        valid_until_ledger,
        "signed authorization entry"
    );
    Ok(entry)
}
