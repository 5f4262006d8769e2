// SPDX-License-Identifier: Apache-2.0

//! The StarkNet `Uint256` struct: a 256-bit unsigned integer passed to
//! contracts as two 128-bit limbs, low limb first.

use crate::felt::{EncodingError, Felt};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Num, One, Signed, Zero};
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static LIMB_MODULUS: Lazy<BigInt> = Lazy::new(|| BigInt::one() << 128);
static UINT256_MODULUS: Lazy<BigInt> = Lazy::new(|| BigInt::one() << 256);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("number {value} out of range for Uint256")]
    OutOfRange { value: BigInt },
    #[error("{limb} limb {value} does not fit in 128 bits")]
    LimbOutOfRange { limb: &'static str, value: BigInt },
    #[error("'{text}' is not a valid number")]
    InvalidNumber { text: String },
}

/// Whether construction rejects values outside `0..2^256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeCheck {
    #[default]
    Strict,
    /// Accept anything. Useful for feeding deliberately illegal values to a
    /// contract under test.
    Lenient,
}

impl RangeCheck {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            RangeCheck::Strict
        } else {
            RangeCheck::Lenient
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uint256 {
    value: BigInt,
}

impl Uint256 {
    /// Construct with strict range checking.
    pub fn new(n: impl Into<BigInt>) -> Result<Self, RangeError> {
        Self::with_check(n, RangeCheck::Strict)
    }

    /// Construct without range checking. Negative numbers are still offset by
    /// `2^256` once.
    pub fn lenient(n: impl Into<BigInt>) -> Self {
        let mut value = n.into();

        if value.is_negative() {
            value += &*UINT256_MODULUS;
        }

        Uint256 { value }
    }

    pub fn with_check(n: impl Into<BigInt>, check: RangeCheck) -> Result<Self, RangeError> {
        let num = Self::lenient(n);

        if check == RangeCheck::Strict && !in_range(&num.value, &UINT256_MODULUS) {
            return Err(RangeError::OutOfRange { value: num.value });
        }

        Ok(num)
    }

    /// Combine two limbs as `(high << 128) + low`.
    pub fn from_limbs(
        low: impl Into<BigInt>,
        high: impl Into<BigInt>,
        check: RangeCheck,
    ) -> Result<Self, RangeError> {
        let low = low.into();
        let high = high.into();

        if check == RangeCheck::Strict {
            for (limb, value) in [("low", &low), ("high", &high)] {
                if !in_range(value, &LIMB_MODULUS) {
                    return Err(RangeError::LimbOutOfRange {
                        limb,
                        value: value.clone(),
                    });
                }
            }
        }

        Self::with_check((high << 128) + low, check)
    }

    pub fn value(&self) -> &BigInt {
        &self.value
    }

    pub fn low(&self) -> BigInt {
        self.value.mod_floor(&LIMB_MODULUS)
    }

    pub fn high(&self) -> BigInt {
        self.value.div_floor(&LIMB_MODULUS)
    }

    /// The `(low, high)` tuple a contract function expects for a `Uint256`
    /// argument.
    pub fn to_limb_pair(&self) -> (BigInt, BigInt) {
        (self.low(), self.high())
    }

    /// Both limbs as field elements. Fails only for lenient values whose high
    /// limb is not a field element.
    pub fn to_calldata(&self) -> Result<[Felt; 2], EncodingError> {
        let (low, high) = self.to_limb_pair();

        Ok([Felt::try_from(low)?, Felt::try_from(high)?])
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Parse decimal or `0x` prefixed hex, with an optional leading minus.
    pub fn parse(text: &str, check: RangeCheck) -> Result<Self, RangeError> {
        Self::with_check(parse_integer(text)?, check)
    }
}

/// Parse decimal or `0x`/`0X` prefixed hex, with at most one leading minus.
pub fn parse_integer(text: &str) -> Result<BigInt, RangeError> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (radix, body) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };

    // from_str_radix takes a sign of its own; only the one stripped above is allowed
    if body.starts_with(['+', '-']) {
        return Err(RangeError::InvalidNumber {
            text: text.to_owned(),
        });
    }

    let magnitude =
        BigInt::from_str_radix(body, radix).map_err(|_| RangeError::InvalidNumber {
            text: text.to_owned(),
        })?;

    Ok(if negative { -magnitude } else { magnitude })
}

fn in_range(value: &BigInt, bound: &BigInt) -> bool {
    !value.is_negative() && value < bound
}

impl From<u128> for Uint256 {
    fn from(value: u128) -> Self {
        Uint256 {
            value: BigInt::from(value),
        }
    }
}

impl FromStr for Uint256 {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uint256::parse(s, RangeCheck::Strict)
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
