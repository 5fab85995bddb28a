//! Reference vocabularies for stylistic-drift mining.
//!
//! These lists are configuration data, not code: deployments ship a
//! versioned YAML file (see `config/vocabulary.yaml`) and tests substitute
//! their own fixtures. [`Vocabulary::default`] carries the built-in set used
//! when no file is configured.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const BUILTIN_VERSION: &str = "builtin-1";

const MARKETING_PHRASES: &[&str] = &[
    "absolute beaut",
    "this is what dreams are made of",
    "game changer",
    "to die for",
    "incredible",
    "amazing",
    "mind-blowing",
    "out of this world",
    "next level",
    "insane",
    "unreal",
    "obsessed",
    "you won't believe",
    "literally the best",
];

const SALESY_EMOJI: &[&str] = &["🤩", "🔥", "💯", "🚀", "😍", "🙌", "💪"];

const ENCOURAGED_EXPRESSIONS: &[&str] = &[
    "proper",
    "brilliant",
    "lovely",
    "bang on",
    "flipping",
    "moreish",
    "cracking",
    "cheeky",
    "smashed it",
    "bad boys",
    "cracker",
    "belter",
    "hoovered",
];

const CALL_TO_ACTION: &[&str] = &[
    "link in bio",
    "comment",
    "tag a",
    "tag someone",
    "share",
    "follow",
    "dm us",
    "save this",
    "let me know",
    "let us know",
    "book now",
    "order now",
    "pop in",
    "come and",
];

const ACRONYM_STOPLIST: &[&str] = &["I", "OK", "UK", "US", "TV", "PR", "Q3", "Q4"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Free-form version tag, echoed into reports so results can be tied
    /// to the list that produced them.
    #[serde(default = "default_version")]
    pub version: String,
    /// Clichés the user tends to strip from drafts.
    pub marketing_phrases: Vec<String>,
    /// Emoji that read as salesy.
    pub salesy_emoji: Vec<String>,
    /// Informal expressions the user's own voice favours.
    pub encouraged_expressions: Vec<String>,
    /// Keywords marking a closing call to action.
    #[serde(default)]
    pub call_to_action: Vec<String>,
    /// All-caps tokens that are not shouting (acronyms).
    #[serde(default)]
    pub acronym_stoplist: Vec<String>,
}

fn default_version() -> String {
    "unversioned".to_string()
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            version: BUILTIN_VERSION.to_string(),
            marketing_phrases: owned(MARKETING_PHRASES),
            salesy_emoji: owned(SALESY_EMOJI),
            encouraged_expressions: owned(ENCOURAGED_EXPRESSIONS),
            call_to_action: owned(CALL_TO_ACTION),
            acronym_stoplist: owned(ACRONYM_STOPLIST),
        }
    }
}

/// Load and validate a vocabulary from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_vocabulary(path: &Path) -> Result<Vocabulary, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VocabularyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_vocabulary(&content)
}

/// Parse and validate a vocabulary from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_vocabulary(yaml: &str) -> Result<Vocabulary, ConfigError> {
    let vocabulary: Vocabulary =
        serde_yaml::from_str(yaml).map_err(ConfigError::VocabularyFileParse)?;

    validate_vocabulary(&vocabulary)?;

    Ok(vocabulary)
}

fn validate_vocabulary(vocabulary: &Vocabulary) -> Result<(), ConfigError> {
    let lists: [(&str, &[String], bool); 5] = [
        ("marketing_phrases", vocabulary.marketing_phrases.as_slice(), true),
        ("salesy_emoji", vocabulary.salesy_emoji.as_slice(), false),
        ("encouraged_expressions", vocabulary.encouraged_expressions.as_slice(), true),
        ("call_to_action", vocabulary.call_to_action.as_slice(), true),
        ("acronym_stoplist", vocabulary.acronym_stoplist.as_slice(), false),
    ];

    for (name, items, case_insensitive) in lists {
        let mut seen = HashSet::new();
        for item in items {
            if item.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{name} contains an empty entry"
                )));
            }
            let key = if case_insensitive {
                item.trim().to_lowercase()
            } else {
                item.trim().to_string()
            };
            if !seen.insert(key) {
                return Err(ConfigError::Validation(format!(
                    "duplicate entry in {name}: '{item}'"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "vocabulary_test.rs"]
mod tests;
