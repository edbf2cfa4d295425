//! `banquet-contracts` — contracts, amount invariants, and the signing
//! transition.

pub mod contract;

pub use contract::{Contract, ContractFilter, ContractPatch, ContractRepository, NewContract};
