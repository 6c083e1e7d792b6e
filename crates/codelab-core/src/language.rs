//! Language table: backend identifiers, file extensions and starter templates
//!
//! The editor never keeps a "current language" around. Callers pick a
//! [`Language`] and pass it to every operation that depends on it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::CodeLabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    Cpp,
    #[serde(alias = "sql")]
    Mysql,
    Html,
    Css,
    #[serde(alias = "js")]
    Javascript,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Python,
        Language::Java,
        Language::Cpp,
        Language::Mysql,
        Language::Html,
        Language::Css,
        Language::Javascript,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Mysql => "mysql",
            Language::Html => "html",
            Language::Css => "css",
            Language::Javascript => "javascript",
        }
    }

    /// Upper-case label used in report lines.
    pub fn label(&self) -> String {
        self.tag().to_uppercase()
    }

    /// Guess the language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cpp" | "cc" | "cxx" | "hpp" => Some(Language::Cpp),
            "sql" => Some(Language::Mysql),
            "html" | "htm" => Some(Language::Html),
            "css" => Some(Language::Css),
            "js" | "mjs" => Some(Language::Javascript),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = CodeLabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" | "python3" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
            "mysql" | "sql" => Ok(Language::Mysql),
            "html" => Ok(Language::Html),
            "css" => Ok(Language::Css),
            "javascript" | "js" | "node" => Ok(Language::Javascript),
            other => Err(CodeLabError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Everything the editor knows about one language.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageSpec {
    /// Identifier the remote execution service expects. `None` means the
    /// language is handled locally.
    pub backend_id: Option<u32>,
    pub extension: &'static str,
    pub editor_mode: &'static str,
    pub template: &'static str,
}

/// How a run request for a language is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRoute {
    Remote(u32),
    HtmlPreview,
    CssPreview,
    LocalJavaScript,
    LocalPython,
    Unsupported,
}

/// Per-language overrides read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageOverride {
    #[serde(default)]
    pub backend_id: Option<u32>,
    /// Refuse to run this language at all.
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone)]
pub struct LanguageTable {
    entries: BTreeMap<Language, LanguageSpec>,
    disabled: Vec<Language>,
}

impl LanguageTable {
    pub fn builtin() -> Self {
        let entries = Language::ALL
            .iter()
            .map(|lang| (*lang, builtin_spec(*lang)))
            .collect();
        Self {
            entries,
            disabled: Vec::new(),
        }
    }

    /// Built-in table with configured backend identifiers applied on top.
    pub fn with_overrides(overrides: &BTreeMap<Language, LanguageOverride>) -> Self {
        let mut table = Self::builtin();
        for (lang, over) in overrides {
            if over.disabled {
                log::debug!("Execution disabled for {}", lang);
                table.disabled.push(*lang);
            }
            if let (Some(spec), Some(id)) = (table.entries.get_mut(lang), over.backend_id) {
                log::debug!("Overriding backend id for {}: {}", lang, id);
                spec.backend_id = Some(id);
            }
        }
        table
    }

    pub fn spec(&self, language: Language) -> &LanguageSpec {
        // Every variant is inserted by `builtin`.
        &self.entries[&language]
    }

    pub fn route(&self, language: Language) -> RunRoute {
        if self.disabled.contains(&language) {
            return RunRoute::Unsupported;
        }
        match (language, self.spec(language).backend_id) {
            (Language::Html, _) => RunRoute::HtmlPreview,
            (Language::Css, _) => RunRoute::CssPreview,
            (_, Some(id)) => RunRoute::Remote(id),
            (Language::Javascript, None) => RunRoute::LocalJavaScript,
            (Language::Python, None) => RunRoute::LocalPython,
            (_, None) => RunRoute::Unsupported,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Language, &LanguageSpec)> {
        self.entries.iter()
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_spec(language: Language) -> LanguageSpec {
    match language {
        Language::Python => LanguageSpec {
            backend_id: None,
            extension: "py",
            editor_mode: "python",
            template: "# Python Code\nprint(\"Hello, World!\")\n\n# Write your Python code here\n",
        },
        Language::Java => LanguageSpec {
            backend_id: Some(62),
            extension: "java",
            editor_mode: "text/x-java",
            template: "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello, World!\");\n        \n        // Write your Java code here\n    }\n}\n",
        },
        Language::Cpp => LanguageSpec {
            backend_id: Some(54),
            extension: "cpp",
            editor_mode: "text/x-c++src",
            template: "#include <iostream>\nusing namespace std;\n\nint main() {\n    cout << \"Hello, World!\" << endl;\n    \n    // Write your C++ code here\n    \n    return 0;\n}\n",
        },
        Language::Mysql => LanguageSpec {
            backend_id: Some(82),
            extension: "sql",
            editor_mode: "text/x-sql",
            template: "-- MySQL Query\nSELECT \"Hello, World!\" as message;\n\n-- Write your SQL queries here\n-- Note: CREATE TABLE and INSERT operations may be limited in the sandbox\n",
        },
        Language::Html => LanguageSpec {
            backend_id: None,
            extension: "html",
            editor_mode: "htmlmixed",
            template: "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    <title>My HTML Page</title>\n</head>\n<body>\n    <h1>Hello, World!</h1>\n    <p>Write your HTML code here</p>\n</body>\n</html>\n",
        },
        Language::Css => LanguageSpec {
            backend_id: None,
            extension: "css",
            editor_mode: "css",
            template: "/* CSS Styles */\nbody {\n    font-family: Arial, sans-serif;\n    margin: 0;\n    padding: 20px;\n    background-color: #f0f0f0;\n}\n\nh1 {\n    color: #333;\n    text-align: center;\n}\n\n/* Write your CSS code here */\n",
        },
        Language::Javascript => LanguageSpec {
            backend_id: None,
            extension: "js",
            editor_mode: "javascript",
            template: "// JavaScript Code\nconsole.log(\"Hello, World!\");\n\n// Write your JavaScript code here\nfunction greet(name) {\n    return `Hello, ${name}!`;\n}\n\nconsole.log(greet(\"CodeLab\"));\n",
        },
    }
}
