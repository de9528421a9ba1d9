use std::process::ExitCode;

use clap::{Parser, Subcommand};
use warden::telemetry;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Apply database migrations.
    Migrate,
    /// Show lockout and password expiry of an account.
    Status {
        /// Username or email, depending on `identity_column`.
        identity: String,
    },
}

async fn run(args: Args) -> warden::error::Result<()> {
    match args.cmd {
        Commands::Migrate => {
            let config = warden::config::Configuration::default().read();
            let pool = warden::connect(&config).await?;
            warden::adapters::postgres::migrate(&pool).await?;

            println!("Migrations applied.");
        },
        Commands::Status { identity } => {
            let state = warden::initialize_state().await?;
            let service = &state.authentication;

            let locked_out = service.is_locked_out(&identity).await?;
            println!("identity:   {identity}");
            println!("locked out: {locked_out}");

            match service.find_by_identity(&identity).await? {
                Some(user) => {
                    if let Some(id) = user.id {
                        println!("user id:    {id}");
                        println!(
                            "expired:    {}",
                            service.is_expired(id).await?
                        );
                    }
                },
                None => println!("no enabled account"),
            }
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        },
    }
}
