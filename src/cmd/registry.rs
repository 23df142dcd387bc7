/*!
registry.rs - command registry and resolver.

Resolution of one argument vector:

  []                         -> default command, or command list
  [unknown, ..]              -> command list + "Unknown command" notice
  [help]                     -> command list
  [help, name, ..]           -> resolve [name, help]
  [name, help] / [name, /?]  -> usage of `name`
  [name, options..]          -> bind + match + validate -> Run | Invalid

Only developer errors (bad option grammar, clashing option names) come back
as `Err`; malformed user input always ends in a help view.
*/

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::bind;
use crate::cmd::builtin::HelpCommand;
use crate::cmd::help::HelpView;
use crate::cmd::{Command, CommandDescriptor};
use crate::engine::Engine;
use crate::error::DefinitionError;
use crate::option::OptionSet;

/// Synthetic option registered for every command.
pub const HELP_OPTION: &str = "?|h|help";
const HELP_OPTION_KEY: &str = "?";

/// Names and aliases of the help pseudo-command.
pub const HELP_COMMAND: &str = "help|h|?";

/// A fully bound command ready to run.
pub struct Invocation {
    name: String,
    command: Box<dyn Command>,
}

impl Invocation {
    /// Primary name of the resolved command.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &dyn Command {
        self.command.as_ref()
    }

    pub fn command_mut(&mut self) -> &mut dyn Command {
        self.command.as_mut()
    }

    pub fn into_command(self) -> Box<dyn Command> {
        self.command
    }

    pub fn run(&mut self, engine: &Engine) -> anyhow::Result<()> {
        self.command.run(engine)
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What a resolution produced.
#[derive(Debug)]
pub enum ParseOutcome {
    Run(Invocation),
    Help(HelpView),
    /// Non-empty, ordered list of problems plus the usage of the command.
    Invalid { errors: Vec<String>, help: HelpView },
}

impl ParseOutcome {
    pub fn is_run(&self) -> bool {
        matches!(self, ParseOutcome::Run(_))
    }

    pub fn help(&self) -> Option<&HelpView> {
        match self {
            ParseOutcome::Run(_) => None,
            ParseOutcome::Help(help) | ParseOutcome::Invalid { help, .. } => Some(help),
        }
    }
}

/// Named command descriptors with case-insensitive lookup.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
    by_name: HashMap<String, usize>,
    default_command: Option<String>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Registry holding only the help pseudo-command.
    pub fn new() -> Self {
        let mut registry = CommandRegistry {
            commands: Vec::new(),
            by_name: HashMap::new(),
            default_command: None,
        };
        registry.register(CommandDescriptor::help(
            HELP_COMMAND,
            "show available commands",
            HelpCommand::default,
        ));
        registry
    }

    /// Add a command. Returns `false` when a command with the same prototype
    /// was registered earlier; the earlier one is kept. Aliases already taken
    /// by another command also stay with that command.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> bool {
        if self
            .commands
            .iter()
            .any(|c| c.prototype() == descriptor.prototype())
        {
            debug!("dropping duplicate command `{}`", descriptor.prototype());
            return false;
        }
        let idx = self.commands.len();
        for name in descriptor.names() {
            let key = name.to_lowercase();
            if self.by_name.contains_key(&key) {
                debug!("name `{name}` already taken; ignored for `{}`", descriptor.prototype());
                continue;
            }
            self.by_name.insert(key, idx);
        }
        debug!("registered command `{}`", descriptor.prototype());
        self.commands.push(descriptor);
        true
    }

    /// Command resolved on empty input instead of the command list.
    pub fn set_default_command(&mut self, name: Option<String>) {
        self.default_command = name;
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.commands[idx])
    }

    /// Descriptors in registration order.
    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    pub fn list_help(&self) -> HelpView {
        HelpView::commands(self.commands.iter().map(|c| c.summary()).collect())
    }

    fn is_help_token(&self, token: &str) -> bool {
        self.get(normalize(token)).is_some_and(|d| d.is_help())
    }

    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<ParseOutcome, DefinitionError> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();

        let Some(first) = args.first().map(|a| a.trim()).filter(|a| !a.is_empty()) else {
            if let Some(name) = &self.default_command
                && self.get(name).is_some_and(|d| !d.is_help())
            {
                debug!("empty input, resolving default command `{name}`");
                return self.resolve(&[name.as_str()]);
            }
            return Ok(ParseOutcome::Help(self.list_help()));
        };

        let name = normalize(first);
        let Some(descriptor) = self.get(name) else {
            debug!("unknown command `{name}`");
            return Ok(ParseOutcome::Help(
                self.list_help()
                    .with_notice(format!("Unknown command: {name}")),
            ));
        };

        if descriptor.is_help() {
            return match args.get(1) {
                Some(target) if !self.is_help_token(target) => self.resolve(&[*target, first]),
                _ => Ok(ParseOutcome::Help(self.list_help())),
            };
        }

        self.bind_command(descriptor, &args[1..])
    }

    fn bind_command(
        &self,
        descriptor: &CommandDescriptor,
        rest: &[&str],
    ) -> Result<ParseOutcome, DefinitionError> {
        let mut command = descriptor.instantiate();
        let mut options = OptionSet::new();
        bind::register(&mut *command, &mut options)?;
        options.add_prototype(HELP_OPTION, "show this message and exit")?;
        let help = HelpView::command(descriptor.summary(), &options);

        if rest.first().is_some_and(|t| self.is_help_token(t)) {
            return Ok(ParseOutcome::Help(help));
        }

        let matches = match options.parse(rest) {
            Ok(m) => m,
            Err(e) => {
                debug!("`{}` rejected: {e}", descriptor.primary_name());
                return Ok(ParseOutcome::Invalid {
                    errors: vec![e.to_string()],
                    help,
                });
            }
        };
        if matches.contains(HELP_OPTION_KEY) {
            return Ok(ParseOutcome::Help(help));
        }

        if let Err(e) = bind::assign(&mut *command, &matches) {
            debug!("`{}` rejected: {e}", descriptor.primary_name());
            return Ok(ParseOutcome::Invalid {
                errors: vec![e.to_string()],
                help,
            });
        }

        let errors = bind::validate(&mut *command);
        if !errors.is_empty() {
            debug!(
                "`{}` failed validation with {} error(s)",
                descriptor.primary_name(),
                errors.len()
            );
            return Ok(ParseOutcome::Invalid { errors, help });
        }

        command.set_extra_args(matches.into_extras());
        Ok(ParseOutcome::Run(Invocation {
            name: descriptor.primary_name().to_string(),
            command,
        }))
    }
}

/// Trim whitespace and leading `/` or `-` from a command token.
fn normalize(token: &str) -> &str {
    token.trim().trim_start_matches(['/', '-'])
}
