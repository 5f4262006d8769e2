// SPDX-License-Identifier: Apache-2.0

//! Deployment fixtures for the amm: two ERC20 tokens with an initial mint,
//! and the amm pool over them.
//!
//! A [`Session`] owns the session-wide state. Tokens are deployed into it
//! once; every test then works on its own fork from [`Session::starknet`].

use crate::calldata::Calldata;
use crate::config::{TestkitConfig, TokenConfig};
use crate::contract_class::{Artifacts, ContractClass};
use crate::error::{Error, Result};
use crate::felt::{short_string_to_felt, ContractAddress, Felt};
use crate::starknet::Starknet;
use crate::uint256::Uint256;
use tracing::{debug, info};

/// ERC20 function the minter uses to create the initial supply.
pub const MINT_FUNCTION: &str = "permissionedMint";
pub const GET_TOKEN_A: &str = "get_token_a";
pub const GET_TOKEN_B: &str = "get_token_b";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenSpec {
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        TokenSpec {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            decimals,
        }
    }

    /// `[name, symbol, decimals, minter]`
    pub fn constructor_calldata(&self, minter: &Felt) -> Result<Calldata> {
        Ok(Calldata::new()
            .short_string(&self.name)?
            .short_string(&self.symbol)?
            .int(self.decimals)?
            .felt(minter.clone()))
    }
}

impl From<&TokenConfig> for TokenSpec {
    fn from(config: &TokenConfig) -> Self {
        TokenSpec::new(&config.name, &config.symbol, config.decimals)
    }
}

/// The values the fixtures deploy and mint with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixtures {
    pub token_a: TokenSpec,
    pub token_b: TokenSpec,
    pub minter: Felt,
    pub recipient: Felt,
    pub initial_mint: Uint256,
}

impl Fixtures {
    pub fn from_config(config: &TestkitConfig) -> Result<Self> {
        Ok(Fixtures {
            token_a: TokenSpec::from(&config.tokens.a),
            token_b: TokenSpec::from(&config.tokens.b),
            minter: config.mint.minter()?,
            recipient: config.mint.recipient()?,
            initial_mint: config.mint.amount(config.uint256.range_check())?,
        })
    }

    /// `[recipient, amount.low, amount.high]`
    pub fn mint_calldata(&self) -> Result<Calldata> {
        Ok(Calldata::new()
            .felt(self.recipient.clone())
            .uint256(&self.initial_mint)?)
    }

    /// Every transaction the fixtures send, in order, with placeholders for
    /// the token addresses which only the simulator can assign.
    pub fn deployment_plan(&self) -> Result<Vec<PlannedCall>> {
        let token_a_placeholder = short_string_to_felt("<token_a>")?;
        let token_b_placeholder = short_string_to_felt("<token_b>")?;
        let mint = self.mint_calldata()?;

        Ok(vec![
            PlannedCall {
                target: "erc20".to_owned(),
                function: "constructor".to_owned(),
                calldata: self.token_a.constructor_calldata(&self.minter)?,
            },
            PlannedCall {
                target: "erc20".to_owned(),
                function: "constructor".to_owned(),
                calldata: self.token_b.constructor_calldata(&self.minter)?,
            },
            PlannedCall {
                target: self.token_a.symbol.clone(),
                function: MINT_FUNCTION.to_owned(),
                calldata: mint.clone(),
            },
            PlannedCall {
                target: self.token_b.symbol.clone(),
                function: MINT_FUNCTION.to_owned(),
                calldata: mint,
            },
            PlannedCall {
                target: "amm".to_owned(),
                function: "constructor".to_owned(),
                calldata: Calldata::new()
                    .felt(token_a_placeholder)
                    .felt(token_b_placeholder),
            },
        ])
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Fixtures {
            token_a: TokenSpec::new("TokenA", "TKNA", 18),
            token_b: TokenSpec::new("TokenB", "TKNB", 18),
            minter: Felt::from(84977242096978u64),
            recipient: Felt::from(123u64),
            initial_mint: Uint256::from(100u128 * 10u128.pow(18)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCall {
    /// Contract class or token symbol the call goes to
    pub target: String,
    pub function: String,
    pub calldata: Calldata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoTokens {
    pub token_a: ContractAddress,
    pub token_b: ContractAddress,
}

pub struct Session<S: Starknet> {
    starknet: S,
    artifacts: Artifacts,
    fixtures: Fixtures,
    token_a: Option<ContractAddress>,
    tokens: Option<TwoTokens>,
    /// Tokens which received the initial mint, in order
    minted: usize,
}

impl<S: Starknet> Session<S> {
    pub fn new(starknet: S, artifacts: Artifacts, fixtures: Fixtures) -> Self {
        Session {
            starknet,
            artifacts,
            fixtures,
            token_a: None,
            tokens: None,
            minted: 0,
        }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    /// The session state itself. Tests should use [`Session::starknet`].
    pub fn session_starknet(&self) -> &S {
        &self.starknet
    }

    /// A fresh copy of the session state for one test.
    pub fn starknet(&self) -> S {
        self.starknet.fork()
    }

    /// Deploy token A and token B, once per session. A token which deployed
    /// before a failure is kept, so a retry does not deploy it twice.
    pub fn two_tokens(&mut self) -> Result<TwoTokens> {
        if let Some(tokens) = &self.tokens {
            return Ok(tokens.clone());
        }

        let erc20 = self.artifacts.erc20.clone();

        let token_a = match &self.token_a {
            Some(token_a) => token_a.clone(),
            None => {
                let token_a = self.starknet.deploy(
                    &erc20,
                    self.fixtures.token_a.constructor_calldata(&self.fixtures.minter)?,
                )?;
                debug!(address = %token_a, symbol = %self.fixtures.token_a.symbol, "deployed token");

                self.token_a = Some(token_a.clone());
                token_a
            }
        };

        let token_b = self.starknet.deploy(
            &erc20,
            self.fixtures.token_b.constructor_calldata(&self.fixtures.minter)?,
        )?;
        debug!(address = %token_b, symbol = %self.fixtures.token_b.symbol, "deployed token");

        let tokens = TwoTokens { token_a, token_b };
        self.tokens = Some(tokens.clone());

        Ok(tokens)
    }

    /// Mint the initial supply of both tokens to the recipient, as the minter.
    /// Runs once per session; a token minted before a failure is not minted
    /// again.
    pub fn mint_tokens(&mut self) -> Result<TwoTokens> {
        let tokens = self.two_tokens()?;

        if self.minted == 2 {
            return Ok(tokens);
        }

        let calldata = self.fixtures.mint_calldata()?;

        for token in [&tokens.token_a, &tokens.token_b].into_iter().skip(self.minted) {
            self.starknet.invoke(
                token,
                MINT_FUNCTION,
                calldata.clone(),
                &self.fixtures.minter,
            )?;
            self.minted += 1;
        }

        info!(
            amount = %self.fixtures.initial_mint,
            recipient = %self.fixtures.recipient,
            "minted initial supply"
        );

        Ok(tokens)
    }

    /// Deploy the amm into a fork of the session and check its constructor.
    pub fn amm(&mut self) -> Result<(S, ContractAddress)> {
        let tokens = self.two_tokens()?;
        let mut starknet = self.starknet();

        let amm = deploy_amm(&mut starknet, &self.artifacts.amm, &tokens)?;
        assert_constructor(&starknet, &amm, &tokens)?;

        Ok((starknet, amm))
    }
}

/// Deploy the amm pool over the two tokens.
pub fn deploy_amm<S: Starknet>(
    starknet: &mut S,
    amm: &ContractClass,
    tokens: &TwoTokens,
) -> Result<ContractAddress> {
    let calldata = Calldata::new()
        .felt(tokens.token_a.clone())
        .felt(tokens.token_b.clone());

    let address = starknet.deploy(amm, calldata)?;
    debug!(%address, "deployed amm");

    Ok(address)
}

/// The amm must report the tokens it was constructed with.
pub fn assert_constructor<S: Starknet>(
    starknet: &S,
    amm: &ContractAddress,
    tokens: &TwoTokens,
) -> Result<()> {
    for (function, expected) in [(GET_TOKEN_A, &tokens.token_a), (GET_TOKEN_B, &tokens.token_b)] {
        let found = starknet.call(amm, function, Calldata::new())?;

        if found.as_slice() != std::slice::from_ref(expected) {
            return Err(Error::UnexpectedResult {
                function: function.to_owned(),
                expected: vec![expected.clone()],
                found,
            });
        }
    }

    debug!(%amm, "constructor stored both tokens");

    Ok(())
}
