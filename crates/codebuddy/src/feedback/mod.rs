use colored::Colorize;

use codebuddy_core::api::FeedbackKind;

use crate::api::ApiClient;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args)]
pub struct FeedbackOptions {
    /// Feedback type: positive or negative
    #[arg(value_name = "TYPE")]
    pub kind: FeedbackKind,

    /// The original task prompt
    #[arg(long)]
    pub task: String,

    /// The generated solution the feedback refers to
    #[arg(long)]
    pub solution: String,
}

pub async fn run(options: FeedbackOptions, global: crate::Global) -> Result<()> {
    let api = ApiClient::from_global(&global);

    let ack = api
        .submit_feedback(&options.task, &options.solution, options.kind)
        .await?;

    let message = ack.message.unwrap_or_else(|| match options.kind {
        FeedbackKind::Positive => "Positive feedback saved".to_string(),
        FeedbackKind::Negative => "Negative feedback saved".to_string(),
    });
    println!("{}", message.green());

    Ok(())
}
