//! # Soroban
//!
//! Structures for smart-contract transactions: contract values, the host
//! functions an invoke-host-function operation runs, the authorization
//! entries that travel next to them, and the resource data attached to the
//! transaction as extension v1.

pub mod auth;
pub mod host_function;
pub mod scval;
pub mod transaction_data;

pub use auth::{
    authorize_entry, SorobanAddressCredentials, SorobanAuthorizationEntry,
    SorobanAuthorizedFunction, SorobanAuthorizedInvocation, SorobanCredentials,
};
pub use host_function::{
    ContractIdPreimage, CreateContractArgs, CreateContractArgsV2, HostFunction, InvokeContractArgs,
};
pub use scval::{
    symbol, ContractExecutable, Int128Parts, Int256Parts, MuxedEd25519Account, ScAddress,
    ScContractInstance, ScError, ScErrorCode, ScMap, ScMapEntry, ScSymbol, ScVal, ScVec,
    UInt128Parts, UInt256Parts,
};
pub use transaction_data::{
    LedgerFootprint, SorobanDataBuilder, SorobanResources, SorobanTransactionData,
    SorobanTransactionDataExt,
};
