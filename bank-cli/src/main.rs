//! Bank CLI
//!
//! Command-line interface for the Bank API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use bank_client::BankClient;
use bank_types::{AccountResponse, Money};

#[derive(Parser)]
#[command(name = "bank")]
#[command(author, version, about = "Bank API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Bank API
    #[arg(long, env = "BANK_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deposit funds (sent with role `client`)
    Deposit {
        /// Amount in major units, e.g. 40 or 40.05
        amount: Money,
    },
    /// Withdraw funds (sent with role `admin`)
    Withdraw {
        /// Amount in major units, e.g. 40 or 40.05
        amount: Money,
    },
    /// Check API health
    Health,
}

fn print_account(account: &AccountResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(account)?);
    if let Ok(balance) = Money::new(account.balance) {
        println!("Balance: {}", balance);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = BankClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }
        Commands::Deposit { amount } => {
            let account = client.deposit(amount).await?;
            print_account(&account)?;
        }
        Commands::Withdraw { amount } => {
            let account = client.withdraw(amount).await?;
            print_account(&account)?;
        }
    }

    Ok(())
}
