/*!
Command layer.

  mod.rs        Command trait + CommandDescriptor
  registry.rs   CommandRegistry::resolve -> ParseOutcome
  help.rs       HelpView (command list / single command usage)
  builtin.rs    help, console, viewargs
  format.rs     color / table helpers for human output

Conventions:
  - A command is an `ArgSet` (its options) plus `run`.
  - Commands are registered explicitly through descriptors; each descriptor
    carries a factory so every resolution binds a fresh instance.
  - `run` returns `anyhow::Result<()>`.
*/

pub mod builtin;
pub mod format;
pub mod help;
pub mod registry;

use std::fmt;
use std::sync::Arc;

use crate::bind::ArgSet;
use crate::engine::Engine;
use crate::error::GrammarError;
use crate::option::OptionShape;

pub use help::{CommandSummary, HelpTopic, HelpView, OptionHelp};
pub use registry::{CommandRegistry, Invocation, ParseOutcome};

/// A runnable sub-command.
pub trait Command: ArgSet {
    fn run(&mut self, engine: &Engine) -> anyhow::Result<()>;

    /// Tokens left over after option matching. Dropped unless the command keeps them.
    fn set_extra_args(&mut self, extras: Vec<String>) {
        let _ = extras;
    }
}

type Factory = Arc<dyn Fn() -> Box<dyn Command> + Send + Sync>;

/// Everything the registry knows about one command.
#[derive(Clone)]
pub struct CommandDescriptor {
    prototype: String,
    names: Vec<String>,
    description: String,
    category: String,
    internal: bool,
    help: bool,
    factory: Factory,
}

impl CommandDescriptor {
    /// `prototype` names the command and its aliases (`"count|wc"`).
    pub fn new<C, F>(
        prototype: &str,
        description: impl Into<String>,
        factory: F,
    ) -> Result<Self, GrammarError>
    where
        C: Command + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let shape = OptionShape::parse_single(prototype)?;
        Ok(CommandDescriptor {
            prototype: prototype.to_string(),
            names: shape.names().to_vec(),
            description: description.into(),
            category: String::new(),
            internal: false,
            help: false,
            factory: Arc::new(move || Box::new(factory()) as Box<dyn Command>),
        })
    }

    /// Command built with `C::default()` for every resolution.
    pub fn of<C>(prototype: &str, description: impl Into<String>) -> Result<Self, GrammarError>
    where
        C: Command + Default + 'static,
    {
        Self::new(prototype, description, C::default)
    }

    /// Pre-built command; every resolution binds a copy of `instance`.
    pub fn with_instance<C>(
        prototype: &str,
        description: impl Into<String>,
        instance: C,
    ) -> Result<Self, GrammarError>
    where
        C: Command + Clone + Send + Sync + 'static,
    {
        Self::new(prototype, description, move || instance.clone())
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Mark as framework-provided; listed after user categories.
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Framework command with a fixed, valid name list.
    pub(crate) fn builtin<C, F>(prototype: &str, description: &str, factory: F) -> Self
    where
        C: Command + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        CommandDescriptor {
            prototype: prototype.to_string(),
            names: prototype.split('|').map(str::to_string).collect(),
            description: description.to_string(),
            category: String::new(),
            internal: true,
            help: false,
            factory: Arc::new(move || Box::new(factory()) as Box<dyn Command>),
        }
    }

    /// The help pseudo-command.
    pub(crate) fn help<C, F>(prototype: &str, description: &str, factory: F) -> Self
    where
        C: Command + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        CommandDescriptor {
            help: true,
            ..Self::builtin(prototype, description, factory)
        }
    }

    pub fn prototype(&self) -> &str {
        &self.prototype
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn primary_name(&self) -> &str {
        &self.names[0]
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category_name(&self) -> &str {
        &self.category
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn is_help(&self) -> bool {
        self.help
    }

    pub fn instantiate(&self) -> Box<dyn Command> {
        (self.factory)()
    }

    pub fn summary(&self) -> CommandSummary {
        CommandSummary {
            prototype: self.prototype.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            internal: self.internal,
        }
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("prototype", &self.prototype)
            .field("category", &self.category)
            .field("internal", &self.internal)
            .finish_non_exhaustive()
    }
}
