// SPDX-License-Identifier: Apache-2.0

use crate::calldata::Calldata;
use crate::contract_class::ContractClass;
use crate::error::Result;
use crate::felt::{ContractAddress, Felt};

/// A StarkNet state the fixtures can deploy into and call. Implemented by the
/// simulator in use; this crate only drives it.
///
/// Cloning must produce an independent copy of the whole state, so that one
/// test cannot observe the transactions of another.
pub trait Starknet: Clone {
    /// Deploy a contract class, running its constructor with the given
    /// calldata, and return the new contract's address.
    fn deploy(
        &mut self,
        class: &ContractClass,
        constructor_calldata: Calldata,
    ) -> Result<ContractAddress>;

    /// Send a transaction to an external function, as `caller`.
    fn invoke(
        &mut self,
        contract: &ContractAddress,
        function: &str,
        calldata: Calldata,
        caller: &Felt,
    ) -> Result<Vec<Felt>>;

    /// Call a function without changing state.
    fn call(
        &self,
        contract: &ContractAddress,
        function: &str,
        calldata: Calldata,
    ) -> Result<Vec<Felt>>;

    /// An independent copy of the current state.
    fn fork(&self) -> Self {
        self.clone()
    }
}
