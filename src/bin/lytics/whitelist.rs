use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use lytics_sdk::LyticsClient;
use tracing::info;

#[derive(Args, Debug)]
pub struct WhitelistArgs {
    /// Lytics account ID whose whitelist is used
    #[arg(short, long)]
    aid: u64,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// List the whitelisted fields
    List,
    /// Add a field to the whitelist
    Add { field: String },
    /// Remove a field from the whitelist
    Remove { field: String },
}

pub async fn run(client: &LyticsClient, args: WhitelistArgs) -> Result<()> {
    if args.aid == 0 {
        bail!("A valid account ID must be specified");
    }
    info!("Account ID: {}", args.aid);
    if client.api.get_account(args.aid).await?.is_none() {
        bail!(
            "The specified account ID does not exist or cannot be accessed using the specified API key"
        );
    }

    match args.mode {
        Mode::List => {
            let fields = client.api.get_whitelist_fields(args.aid).await?;
            if fields.is_empty() {
                info!("No fields are currently whitelisted.");
                return Ok(());
            }
            info!("{} fields are currently whitelisted.", fields.len());
            for (i, field) in fields.iter().enumerate() {
                info!("  {}. {}", i + 1, field);
            }
        }
        Mode::Add { field } => {
            info!("Field: {}", field);
            if client
                .set_whitelist_field_status(args.aid, &field, true)
                .await?
            {
                info!("The field was added to the whitelist.");
            } else {
                info!("The field is already whitelisted.");
            }
        }
        Mode::Remove { field } => {
            info!("Field: {}", field);
            if client
                .set_whitelist_field_status(args.aid, &field, false)
                .await?
            {
                info!("The field was removed from the whitelist.");
            } else {
                info!("The field is not currently whitelisted.");
            }
        }
    }
    Ok(())
}
