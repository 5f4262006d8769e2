// SPDX-License-Identifier: Apache-2.0

use amm_testkit::{short_string_to_felt, Fixtures, Uint256};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{describe_function, imports_arg, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" })),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Felt(felt_args) => {
            for text in &felt_args.text {
                let felt = short_string_to_felt(text)?;
                println!("{text}\t{felt}\t{}", felt.to_hex_string());
            }
        }
        Commands::Uint256(uint_args) => {
            let num = Uint256::parse(&uint_args.number, uint_args.range.check())?;
            let (low, high) = num.to_limb_pair();

            println!("low: {low}");
            println!("high: {high}");
        }
        Commands::Limbs(limb_args) => {
            let num = Uint256::from_limbs(
                limb_args.low.clone(),
                limb_args.high.clone(),
                limb_args.range.check(),
            )?;

            println!("{num}");
        }
        Commands::Inspect(inspect_args) => {
            let mut resolver = imports_arg(&inspect_args);
            let resolved = resolver.resolve(&inspect_args.artifact)?;
            let class = &resolved.class;

            debug!(path = %resolved.full_path.display(), "inspecting contract class");

            if let Some(constructor) = class.constructor() {
                println!("{}", describe_function("constructor", constructor, class));
            }

            for function in class.functions() {
                println!("{}", describe_function("function", function, class));
            }
        }
        Commands::Plan(plan_args) => {
            let config = plan_args.config()?;
            let fixtures = Fixtures::from_config(&config)?;

            for call in fixtures.deployment_plan()? {
                println!("{}.{} {}", call.target, call.function, call.calldata);
            }
        }
        Commands::ShellComplete(shell_args) => {
            let mut app = Cli::command();
            generate(
                shell_args.shell_complete,
                &mut app,
                "amm-testkit",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
