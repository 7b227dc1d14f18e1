//! Gesture-to-code template catalog.
//!
//! This module provides the static mapping from confirmed gestures to code
//! snippets per target language, plus the set of supported languages.

use crate::error::{GestoError, Result};
use crate::gesture::GestureLabel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target language for emitted code snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Python,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Python => "python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = GestoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "javascript" => Ok(Language::Javascript),
            "python" => Ok(Language::Python),
            other => Err(GestoError::UnsupportedLanguage {
                language: other.to_string(),
            }),
        }
    }
}

/// All languages the catalog knows about.
pub const LANGUAGES: &[Language] = &[Language::Javascript, Language::Python];

/// One entry in the template catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTemplate {
    pub label: GestureLabel,
    pub language: Language,
    /// The snippet inserted when the gesture fires.
    pub snippet: &'static str,
    /// Short human-readable description, shown by `gesto templates list`.
    pub description: &'static str,
}

/// Catalog of gesture-to-code templates.
///
/// Not every label has an entry for every language; a lookup miss surfaces
/// as [`GestoError::MissingTemplate`] at ingest time rather than a panic.
pub const TEMPLATES: &[GestureTemplate] = &[
    GestureTemplate {
        label: GestureLabel::Loop,
        language: Language::Javascript,
        snippet: "for (let i = 0; i < 10; i++) {\n    \n}",
        description: "Creates a for loop",
    },
    GestureTemplate {
        label: GestureLabel::Loop,
        language: Language::Python,
        snippet: "for i in range(10):\n    pass",
        description: "Creates a for loop",
    },
    GestureTemplate {
        label: GestureLabel::If,
        language: Language::Javascript,
        snippet: "if (condition) {\n    \n}",
        description: "Creates an if statement",
    },
    GestureTemplate {
        label: GestureLabel::If,
        language: Language::Python,
        snippet: "if condition:\n    pass",
        description: "Creates an if statement",
    },
    GestureTemplate {
        label: GestureLabel::Function,
        language: Language::Javascript,
        snippet: "function myFunction() {\n    \n}",
        description: "Defines a function",
    },
    GestureTemplate {
        label: GestureLabel::Function,
        language: Language::Python,
        snippet: "def my_function():\n    pass",
        description: "Defines a function",
    },
    GestureTemplate {
        label: GestureLabel::Variable,
        language: Language::Javascript,
        snippet: "let myVariable = \"\";",
        description: "Declares a variable",
    },
    GestureTemplate {
        label: GestureLabel::Print,
        language: Language::Javascript,
        snippet: "console.log();",
        description: "Prints to the console",
    },
    GestureTemplate {
        label: GestureLabel::Print,
        language: Language::Python,
        snippet: "print()",
        description: "Prints to the console",
    },
];

/// Find the template for a label/language pair.
pub fn get_template(label: GestureLabel, language: Language) -> Option<&'static GestureTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.label == label && t.language == language)
}

/// Get the full template catalog.
pub fn list_templates() -> &'static [GestureTemplate] {
    TEMPLATES
}

/// All templates for one language, in catalog order.
pub fn templates_for(language: Language) -> impl Iterator<Item = &'static GestureTemplate> {
    TEMPLATES.iter().filter(move |t| t.language == language)
}
