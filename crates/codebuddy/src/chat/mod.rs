use std::time::{Duration, Instant};

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use codebuddy_core::api::{
    clamp_max_tokens, clamp_temperature, FeedbackKind, GenerateRequest, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
use codebuddy_core::chat::{clean_code, latest_exchange, Message};
use codebuddy_core::language::{Language, LanguageMode};

use crate::api::ApiClient;
use crate::prelude::{eprintln, println, *};

/// How long a transient status notification stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, clap::Args)]
pub struct ChatOptions {
    /// Language mode for the session: auto, python or powershell
    #[arg(short, long, default_value = "auto")]
    pub language: LanguageMode,

    /// Sampling temperature (0.0 - 1.0)
    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Maximum tokens to generate (128 - 2048)
    #[arg(short, long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

/// Request state of a session. At most one generation is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Sending,
    Failed(String),
}

/// Per-session generation settings, clamped to the supported ranges.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Single-slot transient status notification. Setting a new status
/// replaces both the message and the expiry deadline, so a stale window
/// can never clear a newer message.
#[derive(Debug)]
struct StatusSlot {
    message: String,
    expires_at: Instant,
}

/// Client-side chat state: the transcript, the language mode, pending
/// request state and the status slot. One instance per `codebuddy chat`
/// invocation; nothing is shared across sessions.
pub struct ChatSession {
    pub messages: Vec<Message>,
    pub mode: LanguageMode,
    /// Last resolved language, kept for display next to the prompt.
    pub detected: Option<Language>,
    pub settings: GenerationSettings,
    pub state: SessionState,
    status: Option<StatusSlot>,
}

impl ChatSession {
    pub fn new(mode: LanguageMode, settings: GenerationSettings) -> Self {
        Self {
            messages: Vec::new(),
            mode,
            detected: match mode {
                LanguageMode::Auto => None,
                LanguageMode::Python => Some(Language::Python),
                LanguageMode::PowerShell => Some(Language::PowerShell),
            },
            settings,
            state: SessionState::Idle,
            status: None,
        }
    }

    pub fn set_language(&mut self, mode: LanguageMode) {
        self.mode = mode;
        self.detected = match mode {
            LanguageMode::Auto => None,
            LanguageMode::Python => Some(Language::Python),
            LanguageMode::PowerShell => Some(Language::PowerShell),
        };
    }

    /// Label shown next to the prompt: the explicit selection, or the
    /// last detection result when in auto mode.
    pub fn language_label(&self) -> &'static str {
        match self.detected {
            Some(language) => language.display_name(),
            None => self.mode.display_name(),
        }
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.settings.temperature = clamp_temperature(temperature);
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        self.settings.max_tokens = clamp_max_tokens(max_tokens);
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(StatusSlot {
            message: message.into(),
            expires_at: Instant::now() + STATUS_TTL,
        });
    }

    /// Current status notification, if its window has not elapsed.
    pub fn status(&self) -> Option<&str> {
        self.status_at(Instant::now())
    }

    fn status_at(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|slot| now < slot.expires_at)
            .map(|slot| slot.message.as_str())
    }

    /// Send a prompt to the backend.
    ///
    /// Blank input and an already-in-flight send are both no-ops. The
    /// user message is appended before the request is issued and is kept
    /// on failure; there is no rollback.
    pub async fn send_message(&mut self, api: &ApiClient, text: &str) -> Option<&Message> {
        if text.trim().is_empty() || self.state == SessionState::Sending {
            return None;
        }

        self.messages.push(Message::user(text));
        self.state = SessionState::Sending;

        let language = self.mode.resolve(text);
        self.detected = Some(language);

        let request = GenerateRequest::new(text, language.as_str())
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        match api.generate(request).await {
            Ok(result) => {
                self.messages
                    .push(Message::assistant(clean_code(&result.code), language));
                self.state = SessionState::Idle;
                self.messages.last()
            }
            Err(err) => {
                self.state = SessionState::Failed(err.to_string());
                None
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.messages.clear();
        self.set_status("Conversation cleared");
    }

    /// Record feedback on the latest user/assistant exchange. Without a
    /// resolvable pair no gateway call is made; the outcome is reported
    /// through the status slot either way.
    pub async fn record_feedback(&mut self, api: &ApiClient, kind: FeedbackKind) {
        if self.messages.len() < 2 {
            self.set_status("No conversation to provide feedback on");
            return;
        }

        let Some(exchange) = latest_exchange(&self.messages) else {
            self.set_status("Incomplete conversation for feedback");
            return;
        };
        let task = exchange.task.to_string();
        let solution = exchange.solution.to_string();

        match api.submit_feedback(&task, &solution, kind).await {
            Ok(_) => self.set_status(match kind {
                FeedbackKind::Positive => "Positive feedback saved",
                FeedbackKind::Negative => "Negative feedback saved",
            }),
            Err(err) => self.set_status(f!("Error: {err}")),
        }
    }

    /// Store the latest exchange as a training example. Same
    /// pair-resolution rule as feedback.
    pub async fn record_training_example(&mut self, api: &ApiClient) {
        if self.messages.len() < 2 {
            self.set_status("No conversation to learn from");
            return;
        }

        let Some(exchange) = latest_exchange(&self.messages) else {
            self.set_status("Incomplete conversation to learn from");
            return;
        };
        let task = exchange.task.to_string();
        let solution = exchange.solution.to_string();

        match api.submit_training_example(&task, &solution).await {
            Ok(_) => self.set_status("Training example saved"),
            Err(err) => self.set_status(f!("Error: {err}")),
        }
    }
}

/// A parsed REPL input line.
#[derive(Debug, PartialEq)]
enum ReplCommand<'a> {
    Send(&'a str),
    Lang(LanguageMode),
    Temperature(f32),
    MaxTokens(u32),
    Clear,
    Like,
    Dislike,
    Learn,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

fn parse_line(line: &str) -> ReplCommand<'_> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return ReplCommand::Empty;
    }
    if !trimmed.starts_with('/') {
        return ReplCommand::Send(trimmed);
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let argument = parts.next().map(str::trim).unwrap_or("");

    match command {
        "/lang" | "/language" => argument
            .parse()
            .map(ReplCommand::Lang)
            .unwrap_or_else(ReplCommand::Invalid),
        "/temp" | "/temperature" => argument
            .parse()
            .map(ReplCommand::Temperature)
            .map_err(|_| f!("Invalid temperature: {argument}"))
            .unwrap_or_else(ReplCommand::Invalid),
        "/tokens" | "/max-tokens" => argument
            .parse()
            .map(ReplCommand::MaxTokens)
            .map_err(|_| f!("Invalid token count: {argument}"))
            .unwrap_or_else(ReplCommand::Invalid),
        "/clear" => ReplCommand::Clear,
        "/like" => ReplCommand::Like,
        "/dislike" => ReplCommand::Dislike,
        "/learn" => ReplCommand::Learn,
        "/help" => ReplCommand::Help,
        "/quit" | "/exit" => ReplCommand::Quit,
        other => ReplCommand::Invalid(f!(
            "Unknown command: {other}. Type /help for the command list."
        )),
    }
}

pub async fn run(options: ChatOptions, global: crate::Global) -> Result<()> {
    let api = ApiClient::from_global(&global);
    let settings = GenerationSettings {
        temperature: clamp_temperature(options.temperature),
        max_tokens: clamp_max_tokens(options.max_tokens),
    };
    let mut session = ChatSession::new(options.language, settings);

    if global.verbose {
        println!("Backend: {}", global.backend_url);
        println!();
    }
    print_banner(&session);

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        print_prompt(&session);

        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }

        match parse_line(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Help => print_help(),
            ReplCommand::Lang(mode) => {
                session.set_language(mode);
                println!("Language mode: {}", mode.display_name().cyan());
            }
            ReplCommand::Temperature(temperature) => {
                session.set_temperature(temperature);
                println!("Temperature: {}", session.settings.temperature);
            }
            ReplCommand::MaxTokens(max_tokens) => {
                session.set_max_tokens(max_tokens);
                println!("Max tokens: {}", session.settings.max_tokens);
            }
            ReplCommand::Clear => session.clear_history(),
            ReplCommand::Like => session.record_feedback(&api, FeedbackKind::Positive).await,
            ReplCommand::Dislike => session.record_feedback(&api, FeedbackKind::Negative).await,
            ReplCommand::Learn => session.record_training_example(&api).await,
            ReplCommand::Invalid(message) => eprintln!("{}", message.yellow()),
            ReplCommand::Send(text) => {
                let text = text.to_string();
                let reply = session
                    .send_message(&api, &text)
                    .await
                    .map(format_assistant);
                match reply {
                    Some(rendered) => println!("{rendered}"),
                    None => {
                        if let SessionState::Failed(error) = &session.state {
                            eprintln!("{} {}", "Error:".red().bold(), error.red());
                        }
                    }
                }
            }
        }

        if let Some(status) = session.status() {
            println!("{}", status.dimmed());
        }
    }

    Ok(())
}

fn print_banner(session: &ChatSession) {
    println!("{}", "=".repeat(80).bright_cyan());
    println!("{}", "CODEBUDDY CHAT".bright_cyan().bold());
    println!("{}", "=".repeat(80).bright_cyan());
    println!(
        "Language mode: {}. Type a prompt to generate code, {} for commands.",
        session.mode.display_name().cyan(),
        "/help".cyan()
    );
    println!();
}

fn print_prompt(session: &ChatSession) {
    use std::io::Write;

    anstream::print!("{} ", f!("[{}]>", session.language_label()).bright_cyan());
    let _ = anstream::stdout().flush();
}

fn print_help() {
    println!("{}", "Commands:".bright_white().bold());
    println!("  {}  switch language mode", "/lang <auto|python|powershell>".cyan());
    println!("  {}                    set sampling temperature", "/temp <0.0-1.0>".cyan());
    println!("  {}                 set generation token budget", "/tokens <128-2048>".cyan());
    println!("  {}                             clear the conversation", "/clear".cyan());
    println!("  {}                              mark the last answer as good", "/like".cyan());
    println!("  {}                           mark the last answer as bad", "/dislike".cyan());
    println!("  {}                             save the last answer for training", "/learn".cyan());
    println!("  {}                              leave the chat", "/quit".cyan());
}

/// Render an assistant message: language tag plus the generated code.
fn format_assistant(message: &Message) -> String {
    let label = message
        .language
        .map(|language| language.display_name())
        .unwrap_or("Code");

    let mut result = String::new();
    result.push('\n');
    result.push_str(&f!("{}\n", label.green().bold()));
    result.push_str(&f!("{}\n", "-".repeat(40).bright_black()));
    result.push_str(&message.content);
    result.push('\n');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::spawn_stub;

    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn idle_session() -> ChatSession {
        ChatSession::new(LanguageMode::Auto, GenerationSettings::default())
    }

    #[test]
    fn test_parse_line_send() {
        assert_eq!(parse_line("sort a list\n"), ReplCommand::Send("sort a list"));
    }

    #[test]
    fn test_parse_line_empty() {
        assert_eq!(parse_line("   \n"), ReplCommand::Empty);
    }

    #[test]
    fn test_parse_line_lang() {
        assert_eq!(
            parse_line("/lang powershell"),
            ReplCommand::Lang(LanguageMode::PowerShell)
        );
        assert_eq!(parse_line("/language auto"), ReplCommand::Lang(LanguageMode::Auto));
        assert!(matches!(parse_line("/lang perl"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_line_settings() {
        assert_eq!(parse_line("/temp 0.7"), ReplCommand::Temperature(0.7));
        assert_eq!(parse_line("/tokens 512"), ReplCommand::MaxTokens(512));
        assert!(matches!(parse_line("/temp hot"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_line("/tokens many"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_line_simple_commands() {
        assert_eq!(parse_line("/clear"), ReplCommand::Clear);
        assert_eq!(parse_line("/like"), ReplCommand::Like);
        assert_eq!(parse_line("/dislike"), ReplCommand::Dislike);
        assert_eq!(parse_line("/learn"), ReplCommand::Learn);
        assert_eq!(parse_line("/help"), ReplCommand::Help);
        assert_eq!(parse_line("/quit"), ReplCommand::Quit);
        assert_eq!(parse_line("/exit"), ReplCommand::Quit);
    }

    #[test]
    fn test_parse_line_unknown_command() {
        assert!(matches!(parse_line("/frobnicate"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn test_status_slot_expires_after_window() {
        let mut session = idle_session();
        session.set_status("Conversation cleared");

        let now = Instant::now();
        assert_eq!(session.status_at(now), Some("Conversation cleared"));
        assert_eq!(session.status_at(now + Duration::from_secs(4)), None);
    }

    #[test]
    fn test_status_slot_replacement_resets_deadline() {
        let mut session = idle_session();
        session.set_status("first");
        session.set_status("second");

        // Only the newest message is ever visible, and it owns the full
        // window: there is no stale timer that could clear it early.
        let now = Instant::now();
        assert_eq!(session.status_at(now), Some("second"));
        assert_eq!(session.status_at(now + Duration::from_secs(2)), Some("second"));
        assert_eq!(session.status_at(now + Duration::from_secs(4)), None);
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = idle_session();
        assert!(session.messages.is_empty());
        assert_eq!(session.state, SessionState::Idle);
        assert!(session.detected.is_none());
        assert_eq!(session.language_label(), "Auto Detect");
    }

    #[test]
    fn test_explicit_mode_sets_label() {
        let session = ChatSession::new(LanguageMode::PowerShell, GenerationSettings::default());
        assert_eq!(session.language_label(), "PowerShell");
    }

    #[test]
    fn test_settings_are_clamped() {
        let mut session = idle_session();
        session.set_temperature(3.0);
        assert_eq!(session.settings.temperature, 1.0);
        session.set_max_tokens(8);
        assert_eq!(session.settings.max_tokens, 128);
    }

    #[tokio::test]
    async fn test_send_blank_message_is_noop() {
        let api = ApiClient::new(UNREACHABLE);
        let mut session = idle_session();

        let reply = session.send_message(&api, "   ").await;

        assert!(reply.is_none());
        assert!(session.messages.is_empty());
        assert_eq!(session.state, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_send_while_sending_is_rejected() {
        let api = ApiClient::new(UNREACHABLE);
        let mut session = idle_session();
        session.state = SessionState::Sending;

        let reply = session.send_message(&api, "sort a list").await;

        assert!(reply.is_none());
        assert!(session.messages.is_empty());
        assert_eq!(session.state, SessionState::Sending);
    }

    #[tokio::test]
    async fn test_send_failure_keeps_user_message() {
        let api = ApiClient::new(UNREACHABLE);
        let mut session = idle_session();

        let reply = session.send_message(&api, "sort a list").await;

        assert!(reply.is_none());
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].content, "sort a list");
        assert!(matches!(session.state, SessionState::Failed(_)));
    }

    #[tokio::test]
    async fn test_send_success_appends_tagged_reply() {
        let (base_url, _state) = spawn_stub().await;
        let api = ApiClient::new(base_url);
        let mut session = idle_session();

        session
            .send_message(&api, "Get-Service | Where-Object status")
            .await
            .unwrap();

        assert_eq!(session.state, SessionState::Idle);
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[1].language, Some(Language::PowerShell));
        assert_eq!(session.detected, Some(Language::PowerShell));
        assert_eq!(session.language_label(), "PowerShell");
        // The stub fences its code; the session stores it cleaned.
        assert!(!session.messages[1].content.contains("```"));
    }

    #[tokio::test]
    async fn test_explicit_language_skips_detection() {
        let (base_url, _state) = spawn_stub().await;
        let api = ApiClient::new(base_url);
        let mut session = ChatSession::new(LanguageMode::Python, GenerationSettings::default());

        session
            .send_message(&api, "Get-Service | Where-Object status")
            .await
            .unwrap();

        assert_eq!(session.messages[1].language, Some(Language::Python));
    }

    #[test]
    fn test_clear_history_empties_and_notifies() {
        let mut session = idle_session();
        session.messages.push(Message::user("task"));
        session
            .messages
            .push(Message::assistant("solution", Language::Python));

        session.clear_history();

        assert!(session.messages.is_empty());
        assert_eq!(session.status_at(Instant::now()), Some("Conversation cleared"));
    }

    #[tokio::test]
    async fn test_feedback_requires_two_messages() {
        // Unreachable backend: reaching it would surface a Network error
        // in the status; the guard must fire first.
        let api = ApiClient::new(UNREACHABLE);
        let mut session = idle_session();
        session.messages.push(Message::user("task"));

        session.record_feedback(&api, FeedbackKind::Positive).await;

        assert_eq!(
            session.status_at(Instant::now()),
            Some("No conversation to provide feedback on")
        );
    }

    #[tokio::test]
    async fn test_feedback_requires_resolvable_pair() {
        let api = ApiClient::new(UNREACHABLE);
        let mut session = idle_session();
        session.messages.push(Message::user("first"));
        session.messages.push(Message::user("second"));

        session.record_feedback(&api, FeedbackKind::Positive).await;

        assert_eq!(
            session.status_at(Instant::now()),
            Some("Incomplete conversation for feedback")
        );
    }

    #[tokio::test]
    async fn test_feedback_success_notifies() {
        let (base_url, _state) = spawn_stub().await;
        let api = ApiClient::new(base_url);
        let mut session = idle_session();
        session.messages.push(Message::user("task"));
        session
            .messages
            .push(Message::assistant("solution", Language::Python));

        session.record_feedback(&api, FeedbackKind::Negative).await;

        assert_eq!(
            session.status_at(Instant::now()),
            Some("Negative feedback saved")
        );
    }

    #[tokio::test]
    async fn test_feedback_failure_notifies_with_error() {
        let api = ApiClient::new(UNREACHABLE);
        let mut session = idle_session();
        session.messages.push(Message::user("task"));
        session
            .messages
            .push(Message::assistant("solution", Language::Python));

        session.record_feedback(&api, FeedbackKind::Positive).await;

        let status = session.status_at(Instant::now()).unwrap();
        assert!(status.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_learn_requires_two_messages() {
        let api = ApiClient::new(UNREACHABLE);
        let mut session = idle_session();

        session.record_training_example(&api).await;

        assert_eq!(
            session.status_at(Instant::now()),
            Some("No conversation to learn from")
        );
    }

    #[tokio::test]
    async fn test_learn_stores_latest_exchange() {
        let (base_url, state) = spawn_stub().await;
        let api = ApiClient::new(base_url);
        let mut session = idle_session();
        session.messages.push(Message::user("sort a list"));
        session
            .messages
            .push(Message::assistant("sorted(items)", Language::Python));

        session.record_training_example(&api).await;

        assert_eq!(
            session.status_at(Instant::now()),
            Some("Training example saved")
        );
        let examples = state.examples.lock().unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].task_preview, "sort a list");
    }

    #[test]
    fn test_format_assistant_includes_language_tag() {
        let message = Message::assistant("Get-Process", Language::PowerShell);
        let rendered = format_assistant(&message);
        assert!(rendered.contains("PowerShell"));
        assert!(rendered.contains("Get-Process"));
    }
}
