// SPDX-License-Identifier: Apache-2.0

use amm_testkit::{
    config::TestkitConfig, contract_class::AbiFunction, uint256::parse_integer, ContractClass,
    ContractClassResolver, RangeCheck,
};
use clap::{builder::ValueParser, value_parser, ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use itertools::Itertools;
use num_bigint::BigInt;
use std::{ffi::OsString, path::PathBuf};


#[derive(Parser)]
#[command(author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"), subcommand_required = true)]
pub struct Cli {
    #[arg(name = "VERBOSE", help = "show debug messages", short = 'v', long = "verbose", action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Encode short ascii strings as field elements")]
    Felt(FeltCommand),

    #[command(about = "Split a number into the low and high limbs of a Uint256")]
    Uint256(Uint256Command),

    #[command(about = "Combine low and high limbs into a Uint256")]
    Limbs(LimbsCommand),

    #[command(about = "List the functions of a compiled contract class")]
    Inspect(InspectCommand),

    #[command(about = "Print the transactions the amm fixtures send")]
    Plan(PlanCommand),

    #[command(about = "Print shell completion for various shells to STDOUT")]
    ShellComplete(ShellComplete),
}

#[derive(Args)]
pub struct FeltCommand {
    #[arg(name = "TEXT", help = "Strings to encode", required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct Uint256Command {
    #[arg(name = "NUMBER", help = "Decimal or 0x prefixed hex number; negative numbers are offset by 2^256", allow_negative_numbers = true)]
    pub number: String,

    #[clap(flatten)]
    pub range: RangeArg,
}

#[derive(Args)]
pub struct LimbsCommand {
    #[arg(name = "LOW", help = "Low 128 bits", value_parser = ValueParser::new(parse_number), allow_negative_numbers = true)]
    pub low: BigInt,

    #[arg(name = "HIGH", help = "High 128 bits", value_parser = ValueParser::new(parse_number), allow_negative_numbers = true)]
    pub high: BigInt,

    #[clap(flatten)]
    pub range: RangeArg,
}

#[derive(Args)]
pub struct RangeArg {
    #[arg(name = "LENIENT", help = "Accept values outside the Uint256 range", long = "lenient", action = ArgAction::SetTrue)]
    pub lenient: bool,
}

impl RangeArg {
    pub fn check(&self) -> RangeCheck {
        RangeCheck::from_strict(!self.lenient)
    }
}

#[derive(Args)]
pub struct InspectCommand {
    #[arg(name = "ARTIFACT", help = "Compiled contract class", value_parser = ValueParser::os_string())]
    pub artifact: OsString,

    #[arg(name = "IMPORTPATH", help = "Directory to search for artifacts", value_parser = ValueParser::path_buf(), action = ArgAction::Append, long = "importpath", short = 'I', num_args = 1)]
    pub import_path: Option<Vec<PathBuf>>,
}

#[derive(Args)]
pub struct PlanCommand {
    #[arg(name = "CONFFILE", help = "Take settings from configuration file", long = "config-file", value_parser = ValueParser::path_buf(), num_args = 1)]
    pub configuration_file: Option<PathBuf>,

    #[arg(name = "MINTER", help = "Short string naming the minting account", long = "minter", num_args = 1)]
    pub minter: Option<String>,

    #[arg(name = "RECIPIENT", help = "Account receiving the initial supply", long = "recipient", num_args = 1)]
    pub recipient: Option<String>,

    #[arg(name = "AMOUNT", help = "Initial supply of each token", long = "amount", num_args = 1)]
    pub amount: Option<String>,

    #[arg(name = "DECIMALS", help = "Decimals of both tokens", long = "decimals", num_args = 1, value_parser = value_parser!(u8))]
    pub decimals: Option<u8>,

    #[arg(name = "LENIENT", help = "Accept an amount outside the Uint256 range", long = "lenient", action = ArgAction::SetTrue)]
    pub lenient: bool,
}

/// Used when --config-file is not given; fine if it does not exist.
pub const DEFAULT_CONFIG_FILE: &str = "testkit.toml";

impl PlanCommand {
    /// Read the configuration file, then apply the arguments given on the
    /// command line on top of it.
    pub fn config(&self) -> anyhow::Result<TestkitConfig> {
        let mut config = match &self.configuration_file {
            Some(path) => TestkitConfig::from_file(path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    TestkitConfig::from_file(&path)?
                } else {
                    TestkitConfig::default()
                }
            }
        };

        if let Some(minter) = &self.minter {
            config.mint.minter = minter.clone();
        }

        if let Some(recipient) = &self.recipient {
            config.mint.recipient = recipient.clone();
        }

        if let Some(amount) = &self.amount {
            config.mint.amount = amount.clone();
        }

        if let Some(decimals) = self.decimals {
            config.tokens.a.decimals = decimals;
            config.tokens.b.decimals = decimals;
        }

        if self.lenient {
            config.uint256.strict = false;
        }

        Ok(config)
    }
}

#[derive(Args)]
pub struct ShellComplete {
    #[arg(required = true, value_parser = value_parser!(Shell), help = "Name of a supported shell")]
    pub shell_complete: Shell,
}

/// One line per function: signature, calldata size and mutability.
pub fn describe_function(kind: &str, f: &AbiFunction, class: &ContractClass) -> String {
    let inputs = f
        .inputs
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .join(", ");

    let mut line = format!("{kind} {}({inputs})", f.name);

    if !f.outputs.is_empty() {
        let outputs = f
            .outputs
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .join(", ");
        line.push_str(&format!(" -> ({outputs})"));
    }

    match f.calldata_len(class) {
        Some(1) => line.push_str(" [1 felt]"),
        Some(n) => line.push_str(&format!(" [{n} felts]")),
        None => line.push_str(" [variable]"),
    }

    if f.is_view() {
        line.push_str(" view");
    }

    line
}

pub fn imports_arg(command: &InspectCommand) -> ContractClassResolver {
    let mut resolver = ContractClassResolver::default();

    if let Some(paths) = &command.import_path {
        for path in paths {
            resolver.add_import_path(path);
        }
    }

    resolver
}

/// Decimal or 0x prefixed hex, with an optional minus sign.
fn parse_number(number: &str) -> Result<BigInt, String> {
    parse_integer(number).map_err(|err| err.to_string())
}
