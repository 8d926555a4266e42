use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A concrete generation language, after any auto-detection has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    PowerShell,
}

impl Language {
    /// Wire value sent to the backend ("python" / "powershell").
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::PowerShell => "powershell",
        }
    }

    /// Human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::PowerShell => "PowerShell",
        }
    }

    /// File extension for saved snippets.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Language::Python => ".py",
            Language::PowerShell => ".ps1",
        }
    }

    /// Class name used by syntax highlighters.
    pub fn highlight_class(&self) -> &'static str {
        match self {
            Language::Python => "language-python",
            Language::PowerShell => "language-powershell",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "powershell" | "ps1" => Ok(Language::PowerShell),
            other => Err(format!(
                "Unknown language: {other}. Valid languages: python, powershell"
            )),
        }
    }
}

/// Language selection at the UI boundary. `Auto` must be resolved to a
/// concrete [`Language`] before a request is sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    #[default]
    Auto,
    Python,
    PowerShell,
}

impl LanguageMode {
    /// Human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageMode::Auto => "Auto Detect",
            LanguageMode::Python => "Python",
            LanguageMode::PowerShell => "PowerShell",
        }
    }

    /// Resolve to a concrete language, running detection on `prompt` when
    /// the mode is `Auto`.
    pub fn resolve(&self, prompt: &str) -> Language {
        match self {
            LanguageMode::Auto => detect(prompt),
            LanguageMode::Python => Language::Python,
            LanguageMode::PowerShell => Language::PowerShell,
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageMode::Auto => f.write_str("auto"),
            LanguageMode::Python => f.write_str("python"),
            LanguageMode::PowerShell => f.write_str("powershell"),
        }
    }
}

impl FromStr for LanguageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(LanguageMode::Auto),
            other => Language::from_str(other).map(|lang| match lang {
                Language::Python => LanguageMode::Python,
                Language::PowerShell => LanguageMode::PowerShell,
            }),
        }
    }
}

/// Markers that indicate a PowerShell prompt: cmdlet verb prefixes,
/// platform terms, and syntax fragments.
const POWERSHELL_KEYWORDS: &[&str] = &[
    // Cmdlet naming patterns
    "get-", "set-", "new-", "remove-", "add-", "install-", "invoke-", "import-", "export-",
    "start-", "stop-", "restart-", "out-", "update-", "convert-", "test-",
    // Platform terms
    "windows", "azure", "active directory", "ad ", "exchange", "registry", "powershell",
    "cmdlet", "winrm", "pssession", ".ps1", "wmi", "cim",
    // Syntax fragments
    "$_", "${", "$env:", "@(", "$profile", "$home", "$psscriptroot", "-contains", "-eq",
    "-ne", "-gt", "-lt", "-match", "foreach-object", "where-object", "select-object",
];

/// Markers that indicate a Python prompt: syntax fragments and common
/// library names.
const PYTHON_KEYWORDS: &[&str] = &[
    // Syntax
    "def ",
    "import ",
    "from ",
    "class ",
    "if __name__ == \"__main__\"",
    "with open",
    "with as",
    "print(",
    "for in",
    "while",
    "try:",
    "except:",
    "raise ",
    "return ",
    "yield ",
    "async def",
    "await ",
    // Libraries
    "pandas",
    "numpy",
    "matplotlib",
    "sklearn",
    "tensorflow",
    "pytorch",
    "flask",
    "django",
    "fastapi",
    "requests",
    "os.path",
    "pathlib",
    "pip install",
];

/// Detect the generation language of a free-text prompt.
///
/// Case-insensitive substring scan against the two keyword sets, counting
/// hits per set. PowerShell wins only when it has strictly more hits than
/// Python; ties and zero hits fall back to Python. An empty prompt returns
/// Python without scanning.
///
/// Matching is substring containment, not word-boundary: a marker like
/// `"ad "` also fires inside longer words ("load the file"). That
/// imprecision is part of the documented semantics.
pub fn detect(prompt: &str) -> Language {
    if prompt.is_empty() {
        return Language::Python;
    }

    let prompt_lower = prompt.to_lowercase();

    let powershell_matches = POWERSHELL_KEYWORDS
        .iter()
        .filter(|keyword| prompt_lower.contains(*keyword))
        .count();
    let python_matches = PYTHON_KEYWORDS
        .iter()
        .filter(|keyword| prompt_lower.contains(*keyword))
        .count();

    if powershell_matches > python_matches {
        Language::PowerShell
    } else {
        Language::Python
    }
}
