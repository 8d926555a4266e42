use colored::Colorize;

use crate::api::ApiClient;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args)]
pub struct StatusOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: StatusOptions, global: crate::Global) -> Result<()> {
    let api = ApiClient::from_global(&global);

    let health = api
        .health()
        .await
        .map_err(|err| eyre!("Backend not reachable at {}: {err}", global.backend_url))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        println!("{} {}", "Backend reachable:".green(), health.message);
    }

    Ok(())
}
