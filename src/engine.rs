/*!
engine.rs - ties a `Config` to a `CommandRegistry` and turns resolution
outcomes into output.

  Engine::new(config)    registry with help (+ console / viewargs per config)
  Engine::register(desc)
  Engine::resolve(args)  -> ParseOutcome
  Engine::run(args)      resolve + print help/errors or run, to stdout
  Engine::dispatch(args, out)  same as run, output to any writer
  Engine::on_run / on_end_run  hooks around every command body

Errors returned from `run`/`dispatch` are developer errors (bad option
grammar) or failures raised by the command body. User input mistakes end
in `Dispatch::Rejected` after the errors and usage were printed.
*/

use std::fmt;
use std::io::{self, Write};
use std::time::Instant;

use anyhow::Context;
use log::debug;

use crate::cmd::builtin::{CONSOLE_COMMAND, ConsoleCommand, VIEW_ARGS_COMMAND, ViewArgsCommand};
use crate::cmd::format::{Role, StyleOptions, paint, prefixed};
use crate::cmd::{CommandDescriptor, CommandRegistry, ParseOutcome};
use crate::config::Config;
use crate::error::DefinitionError;

const ERROR_PREFIX: &str = "!!!";

/// How a dispatched argument vector ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Completed,
    ShowedHelp,
    Rejected,
}

/// Called with the primary name of the command being run.
type RunHook = Box<dyn Fn(&str) + Send + Sync>;

pub struct Engine {
    config: Config,
    registry: CommandRegistry,
    style: StyleOptions,
    on_run: Option<RunHook>,
    on_end_run: Option<RunHook>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let mut registry = CommandRegistry::new();
        if config.console_enabled {
            registry.register(CommandDescriptor::builtin(
                CONSOLE_COMMAND,
                "interactive mode; one command per line",
                ConsoleCommand::default,
            ));
        }
        if config.show_view_args {
            registry.register(CommandDescriptor::builtin(
                VIEW_ARGS_COMMAND,
                "show how the arguments were split",
                ViewArgsCommand::default,
            ));
        }
        registry.set_default_command(config.default_command.clone());
        Engine {
            config,
            registry,
            style: StyleOptions::detect(),
            on_run: None,
            on_end_run: None,
        }
    }

    /// Runs right before every command body, after binding succeeded.
    pub fn on_run(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_run = Some(Box::new(hook));
        self
    }

    /// Runs after every command body, whether it succeeded or failed.
    pub fn on_end_run(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_end_run = Some(Box::new(hook));
        self
    }

    /// Override terminal detection (color, width) for rendered output.
    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }

    /// See [`CommandRegistry::register`].
    pub fn register(&mut self, descriptor: CommandDescriptor) -> bool {
        self.registry.register(descriptor)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn style(&self) -> &StyleOptions {
        &self.style
    }

    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<ParseOutcome, DefinitionError> {
        self.registry.resolve(args)
    }

    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> anyhow::Result<Dispatch> {
        let mut stdout = io::stdout();
        self.dispatch(args, &mut stdout)
    }

    pub fn dispatch<S: AsRef<str>>(
        &self,
        args: &[S],
        out: &mut dyn Write,
    ) -> anyhow::Result<Dispatch> {
        let outcome = self
            .resolve(args)
            .context("command definition is invalid")?;
        match outcome {
            ParseOutcome::Help(view) => {
                write!(out, "{}", view.render(&self.style))?;
                Ok(Dispatch::ShowedHelp)
            }
            ParseOutcome::Invalid { errors, help } => {
                self.write_errors(&errors, out)?;
                writeln!(out)?;
                write!(out, "{}", help.render(&self.style))?;
                Ok(Dispatch::Rejected)
            }
            ParseOutcome::Run(mut invocation) => {
                debug!("running `{}`", invocation.name());
                let started = Instant::now();
                if let Some(hook) = &self.on_run {
                    hook(invocation.name());
                }
                let result = invocation.run(self);
                if let Some(hook) = &self.on_end_run {
                    hook(invocation.name());
                }
                result.with_context(|| format!("command `{}` failed", invocation.name()))?;
                if self.config.show_run_time {
                    let line = format!(
                        "{} completed in {} ms",
                        invocation.name(),
                        started.elapsed().as_millis()
                    );
                    writeln!(out, "{}", paint(Role::Dim, line, &self.style))?;
                }
                Ok(Dispatch::Completed)
            }
        }
    }

    fn write_errors(&self, errors: &[String], out: &mut dyn Write) -> io::Result<()> {
        for error in errors {
            for line in prefixed(ERROR_PREFIX, error, self.style.term_width) {
                writeln!(out, "{}", paint(Role::Error, line, &self.style))?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("style", &self.style)
            .field("on_run", &self.on_run.is_some())
            .field("on_end_run", &self.on_end_run.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::bind::{Arg, ArgSet, ArgVisitor};
    use crate::cmd::Command;

    #[derive(Default, Clone)]
    struct Record {
        word: String,
        seen: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl ArgSet for Record {
        fn visit_args(&mut self, v: &mut dyn ArgVisitor) {
            v.leaf(&Arg::new("w|word", "word to record").required(), &mut self.word);
            v.leaf(&Arg::new("fail", "fail on purpose"), &mut self.fail);
        }

        fn validate(&self) -> Vec<String> {
            if self.word.is_empty() {
                vec!["--word is required".to_string()]
            } else {
                Vec::new()
            }
        }
    }

    impl Command for Record {
        fn run(&mut self, _engine: &Engine) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("asked to fail");
            }
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(self.word.clone());
            }
            Ok(())
        }
    }

    fn engine(config: Config) -> (Engine, Arc<Mutex<Vec<String>>>) {
        let preset = Record::default();
        let seen = preset.seen.clone();
        let mut engine = Engine::new(config).with_style(StyleOptions::plain());
        assert!(engine.register(
            CommandDescriptor::with_instance("record|rec", "remember a word", preset).unwrap()
        ));
        (engine, seen)
    }

    fn dispatch(engine: &Engine, args: &[&str]) -> (Dispatch, String) {
        let mut out = Vec::new();
        let result = engine.dispatch(args, &mut out).unwrap();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn builtins_follow_config() {
        let (plain, _) = engine(Config::default());
        assert!(plain.registry().get("console").is_none());
        assert!(plain.registry().get("viewargs").is_none());

        let (full, _) = engine(Config {
            console_enabled: true,
            show_view_args: true,
            ..Config::default()
        });
        assert!(full.registry().get("console").unwrap().is_internal());
        assert!(full.registry().get("viewargs").unwrap().is_internal());
    }

    #[test]
    fn runs_bound_command() {
        let (engine, seen) = engine(Config::default());
        let (result, out) = dispatch(&engine, &["rec", "--word", "alpha"]);
        assert_eq!(result, Dispatch::Completed);
        assert!(out.is_empty());
        assert_eq!(*seen.lock().unwrap(), ["alpha"]);
    }

    #[test]
    fn invalid_input_prints_errors_then_usage() {
        let (engine, seen) = engine(Config::default());
        let (result, out) = dispatch(&engine, &["record"]);
        assert_eq!(result, Dispatch::Rejected);
        assert!(out.starts_with("!!! --word is required\n"));
        assert!(out.contains("Usage: record|rec [options]"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn long_errors_wrap_under_the_prefix() {
        let (engine, _) = engine(Config::default());
        let engine = engine.with_style(StyleOptions {
            use_color: false,
            term_width: 20,
        });
        let mut out = Vec::new();
        let errors = vec!["one two three four five six".to_string()];
        engine.write_errors(&errors, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["!!! one two three", "    four five six"]);
    }

    #[test]
    fn help_and_unknown_commands_show_help() {
        let (engine, _) = engine(Config::default());
        let empty: [&str; 0] = [];
        let (result, out) = dispatch(&engine, &empty);
        assert_eq!(result, Dispatch::ShowedHelp);
        assert!(out.contains("record|rec"));

        let (result, out) = dispatch(&engine, &["bogus"]);
        assert_eq!(result, Dispatch::ShowedHelp);
        assert!(out.starts_with("Unknown command: bogus"));
    }

    #[test]
    fn default_command_from_config() {
        let (engine, _) = engine(Config {
            default_command: Some("record".into()),
            ..Config::default()
        });
        let empty: [&str; 0] = [];
        let (result, _) = dispatch(&engine, &empty);
        assert_eq!(result, Dispatch::Rejected);
    }

    #[test]
    fn run_time_is_reported_when_enabled() {
        let (engine, _) = engine(Config {
            show_run_time: true,
            ..Config::default()
        });
        let (_, out) = dispatch(&engine, &["record", "-w", "x"]);
        assert!(out.starts_with("record completed in "));
        assert!(out.trim_end().ends_with(" ms"));
    }

    #[test]
    fn command_failure_carries_context() {
        let (engine, _) = engine(Config::default());
        let mut out = Vec::new();
        let err = engine
            .dispatch(&["record", "-w", "x", "--fail"], &mut out)
            .unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("command `record` failed"));
        assert!(chain.contains("asked to fail"));
    }

    #[test]
    fn hooks_wrap_every_command_body() {
        let (engine, seen) = engine(Config::default());
        let before = seen.clone();
        let after = seen.clone();
        let engine = engine
            .on_run(move |name| before.lock().unwrap().push(format!("before {name}")))
            .on_end_run(move |name| after.lock().unwrap().push(format!("after {name}")));

        let (result, _) = dispatch(&engine, &["rec", "-w", "alpha"]);
        assert_eq!(result, Dispatch::Completed);
        assert_eq!(
            *seen.lock().unwrap(),
            ["before record", "alpha", "after record"]
        );

        let mut out = Vec::new();
        assert!(
            engine
                .dispatch(&["record", "-w", "x", "--fail"], &mut out)
                .is_err()
        );
        assert_eq!(seen.lock().unwrap()[3..], ["before record", "after record"]);

        let (result, _) = dispatch(&engine, &["record"]);
        assert_eq!(result, Dispatch::Rejected);
        assert_eq!(seen.lock().unwrap().len(), 5, "rejected input runs no hooks");
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
        assert_send_sync::<CommandRegistry>();
    }
}
