use colored::Colorize;

use crate::api::ApiClient;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args)]
pub struct AddOptions {
    /// The task prompt to learn from
    #[arg(long)]
    pub task: String,

    /// The solution to store for the task
    #[arg(long)]
    pub solution: String,
}

pub async fn run(options: AddOptions, global: crate::Global) -> Result<()> {
    let api = ApiClient::from_global(&global);

    let response = api
        .submit_training_example(&options.task, &options.solution)
        .await?;

    println!(
        "{} {}",
        "Training example saved:".green(),
        response.id.bright_white()
    );

    Ok(())
}
