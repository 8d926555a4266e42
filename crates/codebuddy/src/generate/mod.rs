use colored::Colorize;

use codebuddy_core::api::{GenerateRequest, GenerateResponse, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use codebuddy_core::chat::clean_code;
use codebuddy_core::language::LanguageMode;

use crate::api::ApiClient;
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Args)]
pub struct GenerateOptions {
    /// The task to generate code for
    #[arg(value_name = "PROMPT")]
    pub prompt: String,

    /// Language for generation: auto, python or powershell
    #[arg(short, long, default_value = "auto")]
    pub language: LanguageMode,

    /// Sampling temperature (0.0 - 1.0)
    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Maximum tokens to generate (128 - 2048)
    #[arg(short, long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Repetition penalty; the backend applies its own default when
    /// omitted
    #[arg(long)]
    pub repetition_penalty: Option<f32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: GenerateOptions, global: crate::Global) -> Result<()> {
    let api = ApiClient::from_global(&global);

    // Resolve the language before the request leaves the client; the
    // backend never sees "auto" from here.
    let language = options.language.resolve(&options.prompt);
    if global.verbose && options.language == LanguageMode::Auto {
        eprintln!("Detected language: {}", language.display_name());
    }

    let mut request = GenerateRequest::new(options.prompt.clone(), language.as_str())
        .with_temperature(options.temperature)
        .with_max_tokens(options.max_tokens);
    if let Some(penalty) = options.repetition_penalty {
        request = request.with_repetition_penalty(penalty);
    }

    let result = api.generate(request).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_generation(&result));
    }

    Ok(())
}

/// Render a generation result: header with the language, then the code
/// with any markdown fence stripped.
fn format_generation(result: &GenerateResponse) -> String {
    let mut output = String::new();

    output.push_str(&f!("{}\n", "=".repeat(80).bright_cyan()));
    output.push_str(&f!(
        "{}\n",
        f!("GENERATED {} CODE", result.language.to_uppercase())
            .bright_cyan()
            .bold()
    ));
    output.push_str(&f!("{}\n\n", "=".repeat(80).bright_cyan()));
    output.push_str(&clean_code(&result.code));
    output.push('\n');

    output
}
