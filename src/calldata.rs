// SPDX-License-Identifier: Apache-2.0

use crate::felt::{short_string_to_felt, EncodingError, Felt};
use crate::uint256::Uint256;
use itertools::Itertools;
use num_bigint::BigInt;
use std::fmt;

/// Arguments of a contract call, flattened to field elements in the order
/// the contract's calling convention expects them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Calldata(Vec<Felt>);

impl Calldata {
    pub fn new() -> Self {
        Calldata(Vec::new())
    }

    pub fn felt(mut self, felt: Felt) -> Self {
        self.0.push(felt);
        self
    }

    pub fn int(self, value: impl Into<BigInt>) -> Result<Self, EncodingError> {
        Ok(self.felt(Felt::try_from(value.into())?))
    }

    pub fn short_string(self, text: &str) -> Result<Self, EncodingError> {
        Ok(self.felt(short_string_to_felt(text)?))
    }

    /// A `Uint256` takes two slots, low limb first.
    pub fn uint256(mut self, value: &Uint256) -> Result<Self, EncodingError> {
        self.0.extend(value.to_calldata()?);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Felt] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Felt> {
        self.0
    }
}

impl From<Vec<Felt>> for Calldata {
    fn from(felts: Vec<Felt>) -> Self {
        Calldata(felts)
    }
}

impl FromIterator<Felt> for Calldata {
    fn from_iter<T: IntoIterator<Item = Felt>>(iter: T) -> Self {
        Calldata(iter.into_iter().collect())
    }
}

impl IntoIterator for Calldata {
    type Item = Felt;
    type IntoIter = std::vec::IntoIter<Felt>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Calldata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uint256::RangeCheck;

    #[test]
    fn token_constructor_layout() {
        let calldata = Calldata::new()
            .short_string("TokenA")
            .unwrap()
            .short_string("TKNA")
            .unwrap()
            .int(18)
            .unwrap()
            .short_string("MINTER")
            .unwrap();

        assert_eq!(
            calldata.to_string(),
            "[92837519912513, 1414221377, 18, 84977242096978]"
        );
    }

    #[test]
    fn uint256_takes_two_slots() {
        let amount = Uint256::from_limbs(1, 2, RangeCheck::Strict).unwrap();
        let calldata = Calldata::new()
            .int(123)
            .unwrap()
            .uint256(&amount)
            .unwrap();

        assert_eq!(calldata.len(), 3);
        assert_eq!(
            calldata.into_vec(),
            vec![Felt::from(123u64), Felt::from(1u64), Felt::from(2u64)]
        );
    }

    #[test]
    fn rejects_non_felts() {
        assert!(Calldata::new().int(-1).is_err());
        assert!(Calldata::new().short_string("é").is_err());
        assert!(Calldata::new().is_empty());
    }
}
