#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::items_after_statements)]

mod config;

use alloy_primitives::{
    utils::{format_ether, parse_ether},
    Address, U256,
};
use anyhow::{anyhow, bail, Result};
use clap::Parser;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

use fundme_core::{
    chain::LocalChain,
    deployments::{deploy_all, NamedAccounts},
    receipts::ReceiptAction,
};

use crate::config::Settings;

/// The CLI application that defines all available commands.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
enum Args {
    /// List the dev accounts and their balances.
    Accounts,
    /// Deploy the contracts, fund them from several accounts and withdraw as the owner.
    Scenario(ScenarioArgs),
}

/// The arguments for the `scenario` command.
#[derive(Debug, Clone, Parser)]
struct ScenarioArgs {
    /// The number of accounts that fund the contract, not counting the deployer.
    #[arg(long, default_value_t = 1)]
    funders: usize,
    /// Withdraw with `cheaperWithdraw` instead of `withdraw`.
    #[arg(long)]
    cheaper: bool,
    /// The amount each funder contributes, in ETH.
    #[arg(long, default_value = "1")]
    amount: String,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

/// The outcome of a scenario run.
#[derive(Debug, Serialize)]
struct ScenarioReport {
    network: String,
    fund_me: Address,
    price_feed: Address,
    owner: Address,
    withdraw_variant: String,
    contributions: Vec<Contribution>,
    contract_balance_before: U256,
    owner_balance_before: U256,
    owner_balance_after: U256,
    withdraw_gas_used: u64,
    withdraw_gas_cost: U256,
}

/// A single `fund()` call of a scenario run.
#[derive(Debug, Serialize)]
struct Contribution {
    funder: Address,
    amount: U256,
    gas_used: u64,
}

/// The main entry point for the CLI.
fn main() -> Result<()> {
    // Parse the arguments.
    let cli = Args::parse();

    // Load the settings and setup the logger.
    let settings = Settings::new()?;
    fundme_utils::init_logger(settings.log_format);

    // Run the command.
    match cli {
        Args::Accounts => {
            let chain = LocalChain::new(settings.chain_config())?;
            let deployer = NamedAccounts::default().resolve("deployer")?;

            #[derive(Tabled)]
            struct AccountRow {
                #[tabled(rename = "Index")]
                index: usize,
                #[tabled(rename = "Name")]
                name: String,
                #[tabled(rename = "Address")]
                address: String,
                #[tabled(rename = "Balance (ETH)")]
                balance: String,
            }

            let rows = chain.accounts().into_iter().enumerate().map(|(index, address)| AccountRow {
                index,
                name: if index == deployer { "deployer".to_string() } else { String::new() },
                address: address.to_string(),
                balance: format_ether(chain.balance_of(address)),
            });

            let mut table = Table::new(rows);
            table.with(Style::modern());
            println!("\nAccounts on {} (chain id {}):", settings.network.name, chain.chain_id());
            println!("{table}\n");
        }
        Args::Scenario(args) => {
            let report = run_scenario(&settings, &args)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

/// Deploys the contracts, funds them and withdraws as the owner.
fn run_scenario(settings: &Settings, args: &ScenarioArgs) -> Result<ScenarioReport> {
    let amount = parse_ether(&args.amount)
        .map_err(|e| anyhow!("invalid amount {}: {}", args.amount, e))?;
    if args.funders >= settings.accounts {
        bail!(
            "cannot fund from {} accounts with only {} dev accounts besides the deployer",
            args.funders,
            settings.accounts.saturating_sub(1)
        );
    }

    // Setup the chain and deploy the contracts.
    let mut chain = LocalChain::new(settings.chain_config())?;
    let deployment = deploy_all(
        &mut chain,
        &settings.network,
        &NamedAccounts::default(),
        settings.mock_feed_params(),
    )
    .map_err(|e| anyhow!("failed to deploy: {}", e))?;
    let fund_me = deployment.fund_me;
    let signers = chain.signers().to_vec();

    // Fund the contract from every funder.
    info!(funders = args.funders, amount = %format_ether(amount), "Funding FundMe...");
    let mut contributions = Vec::with_capacity(args.funders);
    for signer in &signers[1..=args.funders] {
        let receipt = fund_me.connect(signer).fund(&mut chain, amount)?;
        contributions.push(Contribution {
            funder: signer.address(),
            amount,
            gas_used: receipt.gas_used,
        });
    }

    // Withdraw as the owner.
    let owner = &signers[0];
    let contract_balance_before = fund_me.balance(&chain);
    let owner_balance_before = chain.balance_of(owner.address());
    let connected = fund_me.connect(owner);
    let receipt = if args.cheaper {
        connected.cheaper_withdraw(&mut chain)?
    } else {
        connected.withdraw(&mut chain)?
    };
    let withdraw_variant = match receipt.action {
        ReceiptAction::CheaperWithdraw(_) => "cheaperWithdraw",
        _ => "withdraw",
    };
    info!(gas_used = receipt.gas_used, variant = withdraw_variant, "Withdrew from FundMe");

    Ok(ScenarioReport {
        network: settings.network.name.to_string(),
        fund_me: fund_me.address(),
        price_feed: deployment.price_feed,
        owner: owner.address(),
        withdraw_variant: withdraw_variant.to_string(),
        contributions,
        contract_balance_before,
        owner_balance_before,
        owner_balance_after: chain.balance_of(owner.address()),
        withdraw_gas_used: receipt.gas_used,
        withdraw_gas_cost: receipt.gas_cost(),
    })
}

/// Prints the contributions and the withdrawal of a scenario run as tables.
fn print_report(report: &ScenarioReport) {
    #[derive(Tabled)]
    struct ContributionRow {
        #[tabled(rename = "Funder")]
        funder: String,
        #[tabled(rename = "Amount (ETH)")]
        amount: String,
        #[tabled(rename = "Gas Used")]
        gas_used: u64,
    }

    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "Metric")]
        name: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows = report.contributions.iter().map(|contribution| ContributionRow {
        funder: contribution.funder.to_string(),
        amount: format_ether(contribution.amount),
        gas_used: contribution.gas_used,
    });
    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("\nContributions to FundMe at {}:", report.fund_me);
    println!("{table}\n");

    let data = vec![
        SummaryRow { name: "Network".to_string(), value: report.network.clone() },
        SummaryRow { name: "Price Feed".to_string(), value: report.price_feed.to_string() },
        SummaryRow { name: "Owner".to_string(), value: report.owner.to_string() },
        SummaryRow { name: "Variant".to_string(), value: report.withdraw_variant.clone() },
        SummaryRow {
            name: "Contract Balance Before".to_string(),
            value: format!("{} ETH", format_ether(report.contract_balance_before)),
        },
        SummaryRow {
            name: "Owner Balance Before".to_string(),
            value: format!("{} ETH", format_ether(report.owner_balance_before)),
        },
        SummaryRow {
            name: "Owner Balance After".to_string(),
            value: format!("{} ETH", format_ether(report.owner_balance_after)),
        },
        SummaryRow { name: "Gas Used".to_string(), value: report.withdraw_gas_used.to_string() },
        SummaryRow {
            name: "Gas Cost".to_string(),
            value: format!("{} ETH", format_ether(report.withdraw_gas_cost)),
        },
    ];
    let mut table = Table::new(data);
    table.with(Style::modern());
    println!("Withdrawal:");
    println!("{table}\n");
}
