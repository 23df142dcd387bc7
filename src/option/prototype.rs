/*!
prototype.rs - option prototype grammar.

Grammar:
  name[|alias...][=|:][{sep}|sep...]

  v|verbose       flag, no value
  o|output=       required value
  level:          optional value
  D={:}{=}        required, two values split on ':' or '=' (max count 2)

The first `=` or `:` found in a name segment fixes the arity for the whole
prototype; every segment carrying a terminator must use the same one.
Everything after the terminator is separator specification.
*/

use std::fmt;

use crate::error::GrammarError;

/// Name of the catch-all option receiving positional tokens.
pub const CATCH_ALL: &str = "<>";

const NAME_TERMINATORS: [char; 2] = ['=', ':'];

/// Whether an option takes no value, an optional value, or a required value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueArity {
    None,
    Optional,
    Required,
}

impl ValueArity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueArity::None => "none",
            ValueArity::Optional => "optional",
            ValueArity::Required => "required",
        }
    }

    /// Whether the option consumes a value at all.
    pub fn takes_value(&self) -> bool {
        !matches!(self, ValueArity::None)
    }
}

impl fmt::Display for ValueArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed, immutable form of a prototype string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionShape {
    prototype: String,
    names: Vec<String>,
    arity: ValueArity,
    terminator: Option<char>,
    max_value_count: usize,
    separators: Option<Vec<String>>,
}

impl OptionShape {
    /// Parse a prototype for an option taking at most one value.
    pub fn parse_single(prototype: &str) -> Result<Self, GrammarError> {
        Self::parse(prototype, 1)
    }

    /// Parse a prototype, allowing up to `max_value_count` values per occurrence.
    pub fn parse(prototype: &str, max_value_count: usize) -> Result<Self, GrammarError> {
        if prototype.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut names: Vec<String> = Vec::new();
        let mut terminator: Option<char> = None;
        let mut seps: Vec<String> = Vec::new();

        for segment in prototype.split('|') {
            if segment.is_empty() {
                return Err(GrammarError::EmptyName(prototype.to_string()));
            }
            let Some(end) = segment.find(NAME_TERMINATORS) else {
                names.push(segment.to_string());
                continue;
            };
            // Terminators are ASCII, so `end` is a char boundary and the byte is the char.
            let found = segment.as_bytes()[end] as char;
            match terminator {
                Some(t) if t != found => {
                    return Err(GrammarError::ConflictingArity {
                        prototype: prototype.to_string(),
                        first: t,
                        second: found,
                    });
                }
                _ => terminator = Some(found),
            }
            names.push(segment[..end].to_string());
            parse_separators(segment, end, &mut seps)?;
        }

        let arity = match terminator {
            Some('=') => ValueArity::Required,
            Some(_) => ValueArity::Optional,
            None => ValueArity::None,
        };

        let mut separators = None;
        if arity.takes_value() {
            if max_value_count <= 1 && !seps.is_empty() {
                return Err(GrammarError::SeparatorsNotAllowed {
                    prototype: prototype.to_string(),
                    count: max_value_count,
                });
            }
            if max_value_count > 1 {
                separators = if seps.is_empty() {
                    Some(vec![":".to_string(), "=".to_string()])
                } else if seps.len() == 1 && seps[0].is_empty() {
                    None
                } else {
                    Some(seps)
                };
            }
        }

        if max_value_count == 0 && arity.takes_value() {
            return Err(GrammarError::InvalidValueCount {
                prototype: prototype.to_string(),
                arity: arity.as_str(),
                count: max_value_count,
            });
        }
        if arity == ValueArity::None && max_value_count > 1 {
            return Err(GrammarError::InvalidValueCount {
                prototype: prototype.to_string(),
                arity: arity.as_str(),
                count: max_value_count,
            });
        }
        if names.iter().any(|n| n == CATCH_ALL)
            && ((names.len() == 1 && arity.takes_value())
                || (names.len() > 1 && max_value_count > 1))
        {
            return Err(GrammarError::CatchAllValue(prototype.to_string()));
        }

        Ok(OptionShape {
            prototype: prototype.to_string(),
            names,
            arity,
            terminator,
            max_value_count,
            separators,
        })
    }

    pub fn prototype(&self) -> &str {
        &self.prototype
    }

    /// All names, primary first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn primary_name(&self) -> &str {
        // Parsing guarantees at least one name.
        &self.names[0]
    }

    pub fn arity(&self) -> ValueArity {
        self.arity
    }

    /// The `=` or `:` that fixed the arity, if any.
    pub fn terminator(&self) -> Option<char> {
        self.terminator
    }

    pub fn max_value_count(&self) -> usize {
        self.max_value_count
    }

    /// Value separators; `None` means values are never split.
    pub fn separators(&self) -> Option<&[String]> {
        self.separators.as_deref()
    }

    pub fn is_catch_all(&self) -> bool {
        self.names.iter().any(|n| n == CATCH_ALL)
    }
}

impl fmt::Display for OptionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prototype)
    }
}

/// Collect separators following the terminator at `end`.
///
/// Bare characters become one-character separators; `{...}` groups become
/// multi-character separators (`{}` is the empty separator).
fn parse_separators(segment: &str, end: usize, seps: &mut Vec<String>) -> Result<(), GrammarError> {
    let mut open: Option<usize> = None;
    for (i, ch) in segment[end + 1..].char_indices() {
        let i = end + 1 + i;
        match ch {
            '{' => {
                if open.is_some() {
                    return Err(GrammarError::IllFormedSeparator(segment.to_string()));
                }
                open = Some(i + 1);
            }
            '}' => {
                let Some(start) = open.take() else {
                    return Err(GrammarError::IllFormedSeparator(segment.to_string()));
                };
                seps.push(segment[start..i].to_string());
            }
            _ => {
                if open.is_none() {
                    seps.push(ch.to_string());
                }
            }
        }
    }
    if open.is_some() {
        return Err(GrammarError::IllFormedSeparator(segment.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flag_with_alias() {
        let shape = OptionShape::parse_single("v|verbose").unwrap();
        assert_eq!(shape.names(), ["v", "verbose"]);
        assert_eq!(shape.arity(), ValueArity::None);
        assert_eq!(shape.terminator(), None);
        assert_eq!(shape.primary_name(), "v");
    }

    #[test]
    fn required_value() {
        let shape = OptionShape::parse_single("o|output=").unwrap();
        assert_eq!(shape.names(), ["o", "output"]);
        assert_eq!(shape.arity(), ValueArity::Required);
        assert_eq!(shape.terminator(), Some('='));
        assert_eq!(shape.separators(), None);
    }

    #[test]
    fn explicit_separator() {
        let shape = OptionShape::parse("level:{,}", 2).unwrap();
        assert_eq!(shape.arity(), ValueArity::Optional);
        assert_eq!(shape.separators(), Some(&[",".to_string()][..]));
    }

    #[test]
    fn default_separators_for_multi_value() {
        let shape = OptionShape::parse("D=", 2).unwrap();
        assert_eq!(
            shape.separators(),
            Some(&[":".to_string(), "=".to_string()][..])
        );
    }

    #[test]
    fn empty_brace_disables_splitting() {
        let shape = OptionShape::parse("D={}", 2).unwrap();
        assert_eq!(shape.separators(), None);
    }

    #[test]
    fn bare_and_braced_separators_mix() {
        let shape = OptionShape::parse("p=;{->}", 3).unwrap();
        assert_eq!(
            shape.separators(),
            Some(&[";".to_string(), "->".to_string()][..])
        );
    }

    #[test]
    fn separators_rejected_for_single_value() {
        let err = OptionShape::parse_single("x={a}{b}").unwrap_err();
        assert!(matches!(err, GrammarError::SeparatorsNotAllowed { count: 1, .. }));
    }

    #[test]
    fn empty_prototype_rejected() {
        assert_eq!(OptionShape::parse_single(""), Err(GrammarError::Empty));
    }

    #[test]
    fn empty_segment_rejected() {
        assert!(matches!(
            OptionShape::parse_single("a||b"),
            Err(GrammarError::EmptyName(_))
        ));
        assert!(matches!(
            OptionShape::parse_single("a|"),
            Err(GrammarError::EmptyName(_))
        ));
    }

    #[test]
    fn conflicting_terminators_rejected() {
        let err = OptionShape::parse_single("a=|b:").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::ConflictingArity {
                first: '=',
                second: ':',
                ..
            }
        ));
    }

    #[test]
    fn agreeing_terminators_accepted() {
        let shape = OptionShape::parse_single("a=|b=").unwrap();
        assert_eq!(shape.names(), ["a", "b"]);
        assert_eq!(shape.arity(), ValueArity::Required);
    }

    #[test]
    fn unbalanced_braces_rejected() {
        assert!(matches!(
            OptionShape::parse("x={a", 2),
            Err(GrammarError::IllFormedSeparator(_))
        ));
        assert!(matches!(
            OptionShape::parse("x=a}", 2),
            Err(GrammarError::IllFormedSeparator(_))
        ));
        assert!(matches!(
            OptionShape::parse("x={{a}", 2),
            Err(GrammarError::IllFormedSeparator(_))
        ));
    }

    #[test]
    fn value_count_must_match_arity() {
        assert!(matches!(
            OptionShape::parse("x=", 0),
            Err(GrammarError::InvalidValueCount { count: 0, .. })
        ));
        assert!(matches!(
            OptionShape::parse("x", 2),
            Err(GrammarError::InvalidValueCount { count: 2, .. })
        ));
        assert!(OptionShape::parse("x", 0).is_ok());
    }

    #[test]
    fn catch_all_rules() {
        assert!(OptionShape::parse_single("<>").unwrap().is_catch_all());
        assert!(matches!(
            OptionShape::parse_single("<>="),
            Err(GrammarError::CatchAllValue(_))
        ));
        assert!(OptionShape::parse_single("<>|rest=").is_ok());
        assert!(matches!(
            OptionShape::parse("<>|rest=", 2),
            Err(GrammarError::CatchAllValue(_))
        ));
    }

    proptest! {
        #[test]
        fn parsing_is_deterministic(proto in "[a-z]{1,6}(\\|[a-z]{1,6}){0,2}[=:]?") {
            let first = OptionShape::parse_single(&proto).unwrap();
            let second = OptionShape::parse_single(&proto).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
