// SPDX-License-Identifier: Apache-2.0

pub mod calldata;
pub mod config;
pub mod contract_class;
pub mod error;
pub mod felt;
pub mod fixtures;
pub mod starknet;
pub mod uint256;

pub use calldata::Calldata;
pub use config::TestkitConfig;
pub use contract_class::{Artifacts, ContractClass, ContractClassResolver};
pub use error::{Error, Result};
pub use felt::{short_string_to_felt, ContractAddress, Felt, FIELD_PRIME};
pub use fixtures::{Fixtures, Session, TwoTokens};
pub use starknet::Starknet;
pub use uint256::{RangeCheck, Uint256};
