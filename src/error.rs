//! Error taxonomy.
//!
//!   GrammarError     malformed prototype string (developer error, fatal at startup)
//!   MatchError       per-token matcher failures (unexpected / missing value)
//!   ConversionError  raw text could not be converted to the target type
//!   DefinitionError  anything that prevents building a command's option set
//!   ConfigError      config file could not be read or decoded
//!
//! Validation errors are plain strings collected from `ArgSet::validate`.

use std::path::PathBuf;

/// A prototype string that does not follow the option grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("option prototype cannot be the empty string")]
    Empty,

    #[error("empty option names are not supported: \"{0}\"")]
    EmptyName(String),

    #[error("conflicting option types in \"{prototype}\": '{first}' vs. '{second}'")]
    ConflictingArity {
        prototype: String,
        first: char,
        second: char,
    },

    #[error("ill-formed name/value separator found in \"{0}\"")]
    IllFormedSeparator(String),

    #[error("the default option handler '<>' cannot require values: \"{0}\"")]
    CatchAllValue(String),

    #[error("cannot provide key/value separators for options taking {count} value(s): \"{prototype}\"")]
    SeparatorsNotAllowed { prototype: String, count: usize },

    #[error("cannot provide max value count of {count} for {arity} option \"{prototype}\"")]
    InvalidValueCount {
        prototype: String,
        arity: &'static str,
        count: usize,
    },
}

/// Matcher failures for a single option reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("option `{option}` does not take a value (got `{value}`)")]
    UnexpectedValue { option: String, value: String },

    #[error("missing required value for option `{option}`")]
    MissingValue { option: String },
}

/// Raw text that could not be converted to the type of the bound property.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not convert string `{value}` to type {target} for option `{option}`")]
pub struct ConversionError {
    pub option: String,
    pub value: String,
    pub target: &'static str,
}

/// Errors raised while building option definitions or registering commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("invalid option grammar: {0}")]
    Grammar(#[from] GrammarError),

    #[error("option name `{0}` is registered more than once")]
    DuplicateOption(String),
}

/// Config file loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, DefinitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_names_everything() {
        let err = ConversionError {
            option: "count".into(),
            value: "abc".into(),
            target: "u32",
        };
        let msg = err.to_string();
        assert!(msg.contains("`abc`"));
        assert!(msg.contains("u32"));
        assert!(msg.contains("`count`"));
    }

    #[test]
    fn grammar_error_wraps_into_definition_error() {
        let err: DefinitionError = GrammarError::Empty.into();
        assert!(matches!(err, DefinitionError::Grammar(GrammarError::Empty)));
        assert!(err.to_string().starts_with("invalid option grammar"));
    }
}
