//! Smart-contract operations.
//!
//! A transaction carrying one of these must carry exactly one operation and
//! Soroban resource data; [`TransactionBuilder`](crate::transaction::TransactionBuilder)
//! enforces the first rule.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::soroban::{HostFunction, SorobanAuthorizationEntry};
use crate::xdr::{invalid_discriminant, ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::{source_account_setters, Operation, OperationBody, SourceOverride};

/// `ExtensionPoint`: a union whose only arm is void.
pub(crate) fn write_extension_point(w: &mut XdrWriter) {
    w.write_discriminant(0);
}

pub(crate) fn read_extension_point(r: &mut XdrReader<'_>) -> std::result::Result<(), XdrError> {
    match r.read_discriminant()? {
        0 => Ok(()),
        other => Err(invalid_discriminant("ExtensionPoint", other)),
    }
}

// ---------------------------------------------------------------------------
// Invoke host function
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeHostFunctionOp {
    pub host_function: HostFunction,
    /// Encoded independently of the function, in the order given.
    pub auth: VecM<SorobanAuthorizationEntry>,
}

impl WriteXdr for InvokeHostFunctionOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.host_function.write_xdr(w);
        self.auth.write_xdr(w);
    }
}

impl ReadXdr for InvokeHostFunctionOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            host_function: HostFunction::read_xdr(r)?,
            auth: VecM::read_xdr(r)?,
        })
    }
}

/// Runs a host function. Use the [`HostFunction`] constructors for the
/// common forms: invoke, upload wasm, create contract (with or without a
/// constructor) and deploy a Stellar asset contract.
#[derive(Debug, Clone)]
pub struct InvokeHostFunctionBuilder {
    host_function: HostFunction,
    auth: Vec<SorobanAuthorizationEntry>,
    source: SourceOverride,
}

impl InvokeHostFunctionBuilder {
    pub fn new(host_function: HostFunction) -> Self {
        Self {
            host_function,
            auth: Vec::new(),
            source: SourceOverride::default(),
        }
    }

    /// Replaces the authorization entries, typically with the ones returned
    /// by transaction simulation.
    pub fn auth(mut self, entries: Vec<SorobanAuthorizationEntry>) -> Self {
        self.auth = entries;
        self
    }

    pub fn add_auth(mut self, entry: SorobanAuthorizationEntry) -> Self {
        self.auth.push(entry);
        self
    }

    pub fn build(self) -> Result<Operation> {
        let auth = VecM::try_from(self.auth)?;
        let body = InvokeHostFunctionOp {
            host_function: self.host_function,
            auth,
        };
        self.source
            .into_operation(OperationBody::InvokeHostFunction(body))
    }
}

source_account_setters!(InvokeHostFunctionBuilder);

// ---------------------------------------------------------------------------
// Extend footprint TTL
// ---------------------------------------------------------------------------

/// Extends the TTL of every read-only footprint entry to at least
/// `extend_to` ledgers from now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendFootprintTtlOp {
    pub extend_to: u32,
}

impl WriteXdr for ExtendFootprintTtlOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        write_extension_point(w);
        w.write_u32(self.extend_to);
    }
}

impl ReadXdr for ExtendFootprintTtlOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        read_extension_point(r)?;
        Ok(Self {
            extend_to: r.read_u32()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExtendFootprintTtlBuilder {
    extend_to: u32,
    source: SourceOverride,
}

impl ExtendFootprintTtlBuilder {
    pub fn new(extend_to: u32) -> Self {
        Self {
            extend_to,
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        if self.extend_to == 0 {
            return Err(Error::constraint("extend to", "must be at least one ledger"));
        }
        let body = ExtendFootprintTtlOp {
            extend_to: self.extend_to,
        };
        self.source
            .into_operation(OperationBody::ExtendFootprintTtl(body))
    }
}

source_account_setters!(ExtendFootprintTtlBuilder);

// ---------------------------------------------------------------------------
// Restore footprint
// ---------------------------------------------------------------------------

/// Restores the archived entries in the read-write footprint.
#[derive(Debug, Clone, Default)]
pub struct RestoreFootprintBuilder {
    source: SourceOverride,
}

impl RestoreFootprintBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> Result<Operation> {
        self.source.into_operation(OperationBody::RestoreFootprint)
    }
}

source_account_setters!(RestoreFootprintBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::crypto::KeyPair;
    use crate::soroban::{authorize_entry, ScVal, SorobanAuthorizedFunction, SorobanAuthorizedInvocation};
    use crate::types::Asset;

    const CONTRACT: &str = "CA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQGAXE";

    #[test]
    fn invoke_contract_roundtrip() {
        let host_fn = HostFunction::invoke_contract(
            CONTRACT,
            "transfer",
            vec![ScVal::from(7u32), ScVal::from(-3i128)],
        )
        .unwrap();
        let op = InvokeHostFunctionBuilder::new(host_fn).build().unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn auth_entries_travel_with_the_op() {
        let host_fn = HostFunction::invoke_contract(CONTRACT, "mint", vec![]).unwrap();
        let HostFunction::InvokeContract(args) = host_fn.clone() else {
            panic!("wrong host function");
        };
        let invocation =
            SorobanAuthorizedInvocation::new(SorobanAuthorizedFunction::ContractFn(args));
        let entry = SorobanAuthorizationEntry::source_account(invocation);

        let op = InvokeHostFunctionBuilder::new(host_fn)
            .add_auth(entry.clone())
            .add_auth(entry)
            .build()
            .unwrap();
        let OperationBody::InvokeHostFunction(body) = &op.body else {
            panic!("wrong body");
        };
        assert_eq!(body.auth.len(), 2);
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn source_account_auth_entry_roundtrip() {
        let keypair = KeyPair::from_seed(&[4; 32]);
        let host_fn = HostFunction::deploy_asset_contract(Asset::native());
        let HostFunction::CreateContract(args) = host_fn.clone() else {
            panic!("wrong host function");
        };
        let invocation =
            SorobanAuthorizedInvocation::new(SorobanAuthorizedFunction::CreateContractHostFn(args));
        let unsigned = SorobanAuthorizationEntry::source_account(invocation);
        let signed = authorize_entry(&unsigned, &keypair, 1000, &Network::testnet()).unwrap();

        let op = InvokeHostFunctionBuilder::new(host_fn)
            .auth(vec![signed])
            .build()
            .unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn extend_ttl_layout() {
        let op = ExtendFootprintTtlBuilder::new(500_000).build().unwrap();
        let bytes = op.to_xdr();
        assert_eq!(&bytes[4..], &[0, 0, 0, 25, 0, 0, 0, 0, 0, 0x07, 0xa1, 0x20]);
        assert_eq!(Operation::from_xdr(&bytes).unwrap(), op);
        assert!(ExtendFootprintTtlBuilder::new(0).build().is_err());
    }

    #[test]
    fn restore_footprint_roundtrip() {
        let op = RestoreFootprintBuilder::new().build().unwrap();
        assert_eq!(op.to_xdr(), vec![0, 0, 0, 0, 0, 0, 0, 26, 0, 0, 0, 0]);
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }
}
