use std::process::ExitCode;

use log::error;
use tablekeeper::{
    ConnectionConfig, DbError, PostgresClient, ProvisionOutcome, Provisioner, OAUTH_PROVIDERS,
};

const RULE: &str = "-----------------------------------------------";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ProvisionOutcome, DbError> {
    let config = ConnectionConfig::from_env()?;
    let client = PostgresClient::connect(&config.database_url).await?;
    let provisioner = Provisioner::with_mode(client, config.mode);

    let outcome = provisioner.ensure_table(&OAUTH_PROVIDERS).await;
    match &outcome {
        ProvisionOutcome::AlreadyExists => {
            println!("Table {} already exists!", OAUTH_PROVIDERS.name)
        }
        ProvisionOutcome::Created => {
            println!("Table {} created successfully!", OAUTH_PROVIDERS.name)
        }
        ProvisionOutcome::ManualActionRequired(sql) => {
            println!("Table {} does not exist.", OAUTH_PROVIDERS.name);
            println!("Please run this SQL against your database:");
            println!("{}", RULE);
            println!("{}", sql);
            println!("{}", RULE);
        }
        // Logged by the provisioner.
        ProvisionOutcome::ProbeFailed(_) | ProvisionOutcome::CreationFailed(_) => {}
    }

    Ok(outcome)
}
