//! multicmd - a framework for multi-command console applications.
//!
//! Layout:
//!   option/   prototype grammar + option matcher
//!   bind/     binding matched values onto typed argument sets
//!   cmd/      commands, registry/resolver, help views, builtins
//!   engine    Config + registry, renders outcomes
//!   config    serde-backed engine configuration
//!   utils     logging setup

pub mod bind;
pub mod cmd;
pub mod config;
pub mod engine;
pub mod error;
pub mod option;
pub mod utils;

pub use bind::{Arg, ArgSet, ArgVisitor, SetProperty, SetSlot, Slot};
pub use cmd::{
    Command, CommandDescriptor, CommandRegistry, HelpView, Invocation, ParseOutcome,
};
pub use config::Config;
pub use engine::{Dispatch, Engine};
pub use error::{
    ConfigError, ConversionError, DefinitionError, GrammarError, MatchError, Result,
};
pub use option::{Matches, OptionDefinition, OptionSet, OptionShape, ValueArity};
