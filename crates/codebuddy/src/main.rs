#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod api;
mod chat;
mod error;
mod feedback;
mod generate;
mod prelude;
mod status;
mod training;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Chat client for the CodeBuddy code-generation backend"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Base URL of the code-generation backend
    #[clap(
        long,
        env = "CODEBUDDY_BACKEND_URL",
        global = true,
        default_value = "http://localhost:5000"
    )]
    backend_url: String,

    /// Whether to display additional information.
    #[clap(long, env = "CODEBUDDY_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Interactive chat session
    Chat(crate::chat::ChatOptions),

    /// One-shot code generation
    Generate(crate::generate::GenerateOptions),

    /// Record feedback on a task/solution pair
    Feedback(crate::feedback::FeedbackOptions),

    /// Training example operations
    Training(crate::training::App),

    /// Check that the backend is reachable
    Status(crate::status::StatusOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Chat(options) => crate::chat::run(options, app.global).await,
        SubCommands::Generate(options) => crate::generate::run(options, app.global).await,
        SubCommands::Feedback(options) => crate::feedback::run(options, app.global).await,
        SubCommands::Training(sub_app) => crate::training::run(sub_app, app.global).await,
        SubCommands::Status(options) => crate::status::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
