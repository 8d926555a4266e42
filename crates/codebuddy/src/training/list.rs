use colored::Colorize;

use codebuddy_core::api::{TrainingExample, DEFAULT_LANGUAGE_FILTER};

use crate::api::ApiClient;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args)]
pub struct ListOptions {
    /// Filter by language (All, Python, PowerShell); passed to the
    /// backend verbatim
    #[arg(short, long, default_value = DEFAULT_LANGUAGE_FILTER)]
    pub language: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Fetching training examples (filter: {})...", options.language);
    }

    let api = ApiClient::from_global(&global);
    let examples = api.list_training_examples(&options.language).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&examples)?);
    } else {
        print!("{}", format_examples_text(&examples, &options.language));
    }

    Ok(())
}

/// Render the training-example listing as a table with usage hints.
fn format_examples_text(examples: &[TrainingExample], filter: &str) -> String {
    let mut result = String::new();

    result.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&f!(
        "{}\n",
        f!("TRAINING EXAMPLES ({filter})").bright_cyan().bold()
    ));
    result.push_str(&f!("{}\n\n", "=".repeat(80).bright_cyan()));

    if examples.is_empty() {
        result.push_str(&f!("{}\n", "No training examples found.".yellow()));
    } else {
        let mut table = new_table();
        table.add_row(prettytable::row![
            "Filename",
            "Source",
            "Language",
            "Timestamp",
            "Task Preview"
        ]);

        for example in examples {
            table.add_row(prettytable::row![
                example.filename,
                example.source,
                example.language,
                example.timestamp,
                example.task_preview
            ]);
        }

        result.push_str(&table.to_string());
        result.push_str(&f!(
            "\n{} {}\n",
            examples.len().to_string().bright_cyan().bold(),
            "examples".bright_white()
        ));
    }

    result.push_str(&f!("\n{}:\n", "To filter by language".bright_white().bold()));
    result.push_str(&f!(
        "  {}\n",
        "codebuddy training list --language <All|Python|PowerShell>".cyan()
    ));
    result.push_str(&f!("\n{}:\n", "To store a new example".bright_white().bold()));
    result.push_str(&f!(
        "  {}\n",
        "codebuddy training add --task <task> --solution <solution>".cyan()
    ));

    result
}
