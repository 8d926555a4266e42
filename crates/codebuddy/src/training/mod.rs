use crate::prelude::*;

pub mod add;
pub mod list;

#[derive(Debug, clap::Parser)]
#[command(name = "training")]
#[command(about = "Training example operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List stored training examples
    #[clap(name = "list")]
    List(list::ListOptions),

    /// Store a new training example
    #[clap(name = "add")]
    Add(add::AddOptions),
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::List(options) => list::run(options, global).await,
        Commands::Add(options) => add::run(options, global).await,
    }
}
