// SPDX-License-Identifier: Apache-2.0

//! Field elements of the StarkNet prime field, and the short string
//! encoding used for contract-readable names.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The prime `2^251 + 17 * 2^192 + 1` which bounds every field element.
pub static FIELD_PRIME: Lazy<BigUint> = Lazy::new(|| {
    BigUint::from_str(
        "3618502788666131213697322783095070105623107215331596699973092056135872020481",
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("'{text}' contains characters which are not ascii")]
    NonAscii { text: String },
    #[error("'{text}' is too long")]
    TooLong { text: String },
    #[error("value {value} is not below the field prime")]
    OutOfField { value: BigInt },
    #[error("'{text}' is not a valid number")]
    InvalidNumber { text: String },
}

/// An integer in the range `0..FIELD_PRIME`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Felt(BigUint);

/// Contracts are addressed by a single field element.
pub type ContractAddress = Felt;

impl Felt {
    pub fn new(value: BigUint) -> Result<Self, EncodingError> {
        if value < *FIELD_PRIME {
            Ok(Felt(value))
        } else {
            Err(EncodingError::OutOfField {
                value: BigInt::from(value),
            })
        }
    }

    pub fn zero() -> Self {
        Felt(BigUint::zero())
    }

    /// Encode a short ascii string as the big-endian integer of its bytes.
    pub fn from_short_string(text: &str) -> Result<Self, EncodingError> {
        short_string_to_felt(text)
    }

    /// Parse a hex number with an optional `0x` prefix.
    pub fn from_hex_str(text: &str) -> Result<Self, EncodingError> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);

        if digits.is_empty() {
            return Err(EncodingError::InvalidNumber {
                text: text.to_owned(),
            });
        }

        // hex::decode wants whole bytes
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits.to_owned()
        };

        let bytes = hex::decode(padded).map_err(|_| EncodingError::InvalidNumber {
            text: text.to_owned(),
        })?;

        Felt::new(BigUint::from_bytes_be(&bytes))
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn to_bigint(&self) -> BigInt {
        BigInt::from_biguint(Sign::Plus, self.0.clone())
    }

    /// Big-endian bytes, zero padded to 32 bytes.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let bytes = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        out
    }

    pub fn to_hex_string(&self) -> String {
        let bytes = self.0.to_bytes_be();
        let hex = hex::encode(bytes);
        match hex.trim_start_matches('0') {
            "" => "0x0".to_owned(),
            digits => format!("0x{digits}"),
        }
    }

    pub fn to_u128(&self) -> Option<u128> {
        self.0.to_u128()
    }
}

/// Pack a short ascii string into a single field element, treating its bytes
/// as a big-endian integer. The string must encode to a value below the
/// field prime.
pub fn short_string_to_felt(text: &str) -> Result<Felt, EncodingError> {
    if !text.is_ascii() {
        return Err(EncodingError::NonAscii {
            text: text.to_owned(),
        });
    }

    let value = BigUint::from_bytes_be(text.as_bytes());

    if value >= *FIELD_PRIME {
        return Err(EncodingError::TooLong {
            text: text.to_owned(),
        });
    }

    Ok(Felt(value))
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Felt(BigUint::from(value))
    }
}

impl From<u128> for Felt {
    fn from(value: u128) -> Self {
        Felt(BigUint::from(value))
    }
}

impl TryFrom<BigInt> for Felt {
    type Error = EncodingError;

    fn try_from(value: BigInt) -> Result<Self, Self::Error> {
        match value.to_biguint() {
            Some(unsigned) => Felt::new(unsigned),
            None => Err(EncodingError::OutOfField { value }),
        }
    }
}

impl TryFrom<&BigInt> for Felt {
    type Error = EncodingError;

    fn try_from(value: &BigInt) -> Result<Self, Self::Error> {
        Felt::try_from(value.clone())
    }
}

impl FromStr for Felt {
    type Err = EncodingError;

    /// Decimal, or hex when prefixed with `0x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") || s.starts_with("0X") {
            return Felt::from_hex_str(s);
        }

        match BigInt::from_str(s) {
            Ok(value) => Felt::try_from(value),
            Err(_) => Err(EncodingError::InvalidNumber { text: s.to_owned() }),
        }
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::LowerHex for Felt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
