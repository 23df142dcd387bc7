/*!
set.rs - option definitions and the token matcher.

`OptionSet::parse` walks the raw argument list once:

  --name / -name / /name     option reference (inline value after `=` or `:`)
  --                         stop scanning; everything after goes to extras
  anything else              positional: catch-all `<>` if registered, else extras

Values are reported per primary name, in encounter order, so repeatable
options simply collect several entries.
*/

use std::collections::BTreeMap;
use std::collections::HashMap;

use log::trace;

use super::prototype::{CATCH_ALL, OptionShape, ValueArity};
use crate::error::{DefinitionError, GrammarError, MatchError};

/// Token that ends option scanning.
pub const TERMINATOR: &str = "--";

const PREFIXES: [&str; 3] = ["--", "-", "/"];

/// One value reported by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// The option was present without any text (flags, optional values left out).
    Present,
    Text(String),
}

impl RawValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Present => None,
            RawValue::Text(s) => Some(s),
        }
    }
}

/// An option shape plus the text shown in help output.
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    shape: OptionShape,
    description: String,
}

impl OptionDefinition {
    /// Single-value definition.
    pub fn new(prototype: &str, description: impl Into<String>) -> Result<Self, GrammarError> {
        Self::with_max_values(prototype, description, 1)
    }

    pub fn with_max_values(
        prototype: &str,
        description: impl Into<String>,
        max_value_count: usize,
    ) -> Result<Self, GrammarError> {
        Ok(OptionDefinition {
            shape: OptionShape::parse(prototype, max_value_count)?,
            description: description.into(),
        })
    }

    pub fn shape(&self) -> &OptionShape {
        &self.shape
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Key under which matched values are reported.
    pub fn key(&self) -> &str {
        self.shape.primary_name()
    }
}

/// Result of matching an argument list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    assignments: BTreeMap<String, Vec<RawValue>>,
    extras: Vec<String>,
}

impl Matches {
    /// Values recorded for the option whose primary name is `key`.
    pub fn values(&self, key: &str) -> Option<&[RawValue]> {
        self.assignments.get(key).map(|v| v.as_slice())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.assignments.contains_key(key)
    }

    pub fn assignments(&self) -> &BTreeMap<String, Vec<RawValue>> {
        &self.assignments
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    pub fn into_extras(self) -> Vec<String> {
        self.extras
    }

    fn push(&mut self, key: &str, value: RawValue) {
        self.assignments
            .entry(key.to_string())
            .or_default()
            .push(value);
    }
}

/// Ordered collection of option definitions with name lookup.
#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    definitions: Vec<OptionDefinition>,
    by_name: HashMap<String, usize>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Every name must be unused so far.
    pub fn add(&mut self, definition: OptionDefinition) -> Result<(), DefinitionError> {
        for name in definition.shape().names() {
            if self.by_name.contains_key(name) {
                return Err(DefinitionError::DuplicateOption(name.clone()));
            }
        }
        let idx = self.definitions.len();
        for name in definition.shape().names() {
            self.by_name.insert(name.clone(), idx);
        }
        self.definitions.push(definition);
        Ok(())
    }

    /// Parse a prototype and register it.
    pub fn add_prototype(
        &mut self,
        prototype: &str,
        description: impl Into<String>,
    ) -> Result<(), DefinitionError> {
        self.add(OptionDefinition::new(prototype, description)?)
    }

    pub fn definitions(&self) -> &[OptionDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve a prefix-stripped option name.
    ///
    /// Exact names win. Otherwise a case-insensitive prefix of exactly one
    /// long (multi-character) name is accepted.
    pub fn lookup(&self, name: &str) -> Option<&OptionDefinition> {
        if name.is_empty() {
            return None;
        }
        if let Some(&idx) = self.by_name.get(name) {
            return Some(&self.definitions[idx]);
        }
        let needle = name.to_lowercase();
        let mut found: Option<usize> = None;
        for (idx, def) in self.definitions.iter().enumerate() {
            let hit = def
                .shape()
                .names()
                .iter()
                .filter(|n| n.chars().count() > 1 && n.as_str() != CATCH_ALL)
                .any(|n| n.to_lowercase().starts_with(&needle));
            if !hit {
                continue;
            }
            match found {
                Some(prev) if prev != idx => return None,
                _ => found = Some(idx),
            }
        }
        found.map(|idx| &self.definitions[idx])
    }

    /// Match `args` against the registered definitions.
    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> Result<Matches, MatchError> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        let catch_all = self.by_name.get(CATCH_ALL).map(|&i| &self.definitions[i]);
        let mut matches = Matches::default();
        let mut i = 0;

        while i < args.len() {
            let token = args[i];
            i += 1;

            if token == TERMINATOR {
                trace!("terminator reached, {} token(s) left as extras", args.len() - i);
                matches.extras.extend(args[i..].iter().map(|s| s.to_string()));
                break;
            }

            let Some((def, inline)) = self.option_reference(token) else {
                if strip_prefix(token).is_some() {
                    trace!("unrecognized option `{token}`");
                    matches.extras.push(token.to_string());
                } else if let Some(def) = catch_all {
                    matches.push(def.key(), RawValue::Text(token.to_string()));
                } else {
                    matches.extras.push(token.to_string());
                }
                continue;
            };

            let shape = def.shape();
            trace!("`{token}` matched option `{}`", shape.primary_name());

            if shape.arity() == ValueArity::None {
                if let Some(value) = inline {
                    return Err(MatchError::UnexpectedValue {
                        option: shape.primary_name().to_string(),
                        value: value.to_string(),
                    });
                }
                matches.push(def.key(), RawValue::Present);
                continue;
            }

            if shape.max_value_count() <= 1 {
                let value = match inline {
                    Some(v) => Some(v.to_string()),
                    None if i < args.len() && !self.is_option_reference(args[i]) => {
                        i += 1;
                        Some(args[i - 1].to_string())
                    }
                    None => None,
                };
                match (value, shape.arity()) {
                    (Some(v), _) => matches.push(def.key(), RawValue::Text(v)),
                    (None, ValueArity::Required) => {
                        return Err(MatchError::MissingValue {
                            option: shape.primary_name().to_string(),
                        });
                    }
                    (None, _) => matches.push(def.key(), RawValue::Present),
                }
                continue;
            }

            let max = shape.max_value_count();
            let mut values: Vec<String> = Vec::new();
            if let Some(v) = inline {
                split_into(v, shape.separators(), max, &mut values);
            }
            let wanted = match shape.arity() {
                ValueArity::Required => max,
                _ if inline.is_some() => 0,
                _ => 1,
            };
            while values.len() < wanted && i < args.len() && !self.is_option_reference(args[i]) {
                split_into(args[i], shape.separators(), max, &mut values);
                i += 1;
            }
            if shape.arity() == ValueArity::Required && values.len() < max {
                return Err(MatchError::MissingValue {
                    option: shape.primary_name().to_string(),
                });
            }
            if values.is_empty() {
                matches.push(def.key(), RawValue::Present);
            }
            for v in values {
                matches.push(def.key(), RawValue::Text(v));
            }
        }

        Ok(matches)
    }

    fn is_option_reference(&self, token: &str) -> bool {
        token == TERMINATOR || self.option_reference(token).is_some()
    }

    /// Resolve `token` to a definition plus its inline value, if it names one.
    fn option_reference<'t>(&self, token: &'t str) -> Option<(&OptionDefinition, Option<&'t str>)> {
        let body = strip_prefix(token)?;
        for sep in ['=', ':'] {
            if let Some((name, value)) = body.split_once(sep)
                && let Some(def) = self.lookup(name)
            {
                return Some((def, Some(value)));
            }
        }
        self.lookup(body).map(|def| (def, None))
    }
}

/// Strip the longest option prefix, if any.
fn strip_prefix(token: &str) -> Option<&str> {
    PREFIXES
        .iter()
        .find_map(|p| token.strip_prefix(p))
        .filter(|rest| !rest.is_empty())
}

/// Split `raw` on the first matching separators, leaving the rest intact once
/// `max` values are reached.
fn split_into(raw: &str, separators: Option<&[String]>, max: usize, out: &mut Vec<String>) {
    let Some(separators) = separators else {
        out.push(raw.to_string());
        return;
    };
    let mut rest = raw;
    while out.len() + 1 < max {
        let next = separators
            .iter()
            .filter(|s| !s.is_empty())
            .filter_map(|s| rest.find(s.as_str()).map(|pos| (pos, s.len())))
            .min_by_key(|&(pos, _)| pos);
        let Some((pos, len)) = next else {
            break;
        };
        out.push(rest[..pos].to_string());
        rest = &rest[pos + len..];
    }
    out.push(rest.to_string());
}
