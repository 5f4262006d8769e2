// SPDX-License-Identifier: Apache-2.0

//! Settings for the amm fixtures, usually read from `testkit.toml`.
//!
//! Every key is optional; missing keys take the default token names, minter
//! and initial mint.

use crate::error::Result;
use crate::felt::{short_string_to_felt, Felt};
use crate::uint256::{RangeCheck, Uint256};
use serde::Deserializer;
use serde_derive::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct TestkitConfig {
    pub artifacts: ArtifactsConfig,
    pub uint256: Uint256Config,
    pub mint: MintConfig,
    pub tokens: TokensConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ArtifactsConfig {
    /// Directories searched for artifacts
    pub import_path: Vec<PathBuf>,
    pub amm: PathBuf,
    pub erc20: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        ArtifactsConfig {
            import_path: vec![PathBuf::from("abis")],
            amm: PathBuf::from("amm_compiled.json"),
            erc20: PathBuf::from("erc20_compiled.json"),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Uint256Config {
    pub strict: bool,
}

impl Default for Uint256Config {
    fn default() -> Self {
        Uint256Config { strict: true }
    }
}

impl Uint256Config {
    pub fn range_check(&self) -> RangeCheck {
        RangeCheck::from_strict(self.strict)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MintConfig {
    /// Amount minted on each token, as a decimal or hex string
    #[serde(deserialize_with = "deserialize_number")]
    pub amount: String,
    /// Short string naming the minting account
    pub minter: String,
    #[serde(deserialize_with = "deserialize_number")]
    pub recipient: String,
}

impl Default for MintConfig {
    fn default() -> Self {
        MintConfig {
            amount: (100u128 * 10u128.pow(18)).to_string(),
            minter: "MINTER".to_owned(),
            recipient: "123".to_owned(),
        }
    }
}

impl MintConfig {
    pub fn amount(&self, check: RangeCheck) -> Result<Uint256> {
        Ok(Uint256::parse(&self.amount, check)?)
    }

    pub fn minter(&self) -> Result<Felt> {
        Ok(short_string_to_felt(&self.minter)?)
    }

    pub fn recipient(&self) -> Result<Felt> {
        Ok(self.recipient.parse::<Felt>()?)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

/// The two tokens of the pool, token A first.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "Vec<TokenConfig>")]
pub struct TokensConfig {
    pub a: TokenConfig,
    pub b: TokenConfig,
}

impl Default for TokensConfig {
    fn default() -> Self {
        TokensConfig {
            a: TokenConfig {
                name: "TokenA".to_owned(),
                symbol: "TKNA".to_owned(),
                decimals: default_decimals(),
            },
            b: TokenConfig {
                name: "TokenB".to_owned(),
                symbol: "TKNB".to_owned(),
                decimals: default_decimals(),
            },
        }
    }
}

impl TryFrom<Vec<TokenConfig>> for TokensConfig {
    type Error = String;

    fn try_from(tokens: Vec<TokenConfig>) -> std::result::Result<Self, Self::Error> {
        match <[TokenConfig; 2]>::try_from(tokens) {
            Ok([a, b]) => Ok(TokensConfig { a, b }),
            Err(tokens) => Err(format!(
                "exactly two tokens are needed for the pool, found {}",
                tokens.len()
            )),
        }
    }
}

fn default_decimals() -> u8 {
    18
}

/// Numbers can be written as toml integers or, when they do not fit in 64
/// bits, as strings.
fn deserialize_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = <toml::Value as serde::Deserialize>::deserialize(deserializer)?;

    match value {
        toml::Value::Integer(n) => Ok(n.to_string()),
        toml::Value::String(s) => Ok(s),
        other => Err(serde::de::Error::custom(format!(
            "expected a number, found {}",
            other.type_str()
        ))),
    }
}

impl TestkitConfig {
    pub fn from_toml_str(toml: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml)
    }

    pub fn from_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
