/*!
builtin.rs - commands provided by the framework itself.

  help      pseudo-command; intercepted by the resolver, never run
  console   interactive loop resolving one command per input line
  viewargs  shows how trailing text was split into arguments

All of them are registered in the internal category.
*/

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use anyhow::Context;

use crate::bind::{ArgSet, ArgVisitor};
use crate::cmd::Command;
use crate::engine::Engine;

pub const CONSOLE_COMMAND: &str = "console";
pub const VIEW_ARGS_COMMAND: &str = "viewargs";

/* ---- help ---- */

/// Placeholder behind the help descriptor. The resolver answers `help`
/// with a `ParseOutcome::Help` before any instance is bound.
#[derive(Debug, Default, Clone)]
pub struct HelpCommand;

impl ArgSet for HelpCommand {
    fn visit_args(&mut self, _visitor: &mut dyn ArgVisitor) {}
}

impl Command for HelpCommand {
    fn run(&mut self, _engine: &Engine) -> anyhow::Result<()> {
        Ok(())
    }
}

/* ---- console ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Interactive mode: `exit`/`quit` leave, `history` lists recent lines.
#[derive(Debug, Default, Clone)]
pub struct ConsoleCommand {
    history: VecDeque<String>,
}

impl ConsoleCommand {
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(|s| s.as_str())
    }

    /// Drive the console from any line source, writing engine output to `out`.
    pub fn run_lines<R: BufRead>(
        &mut self,
        engine: &Engine,
        input: R,
        out: &mut dyn Write,
    ) -> anyhow::Result<()> {
        let prompt = engine.config().prompt.clone();
        let mut lines = input.lines();
        loop {
            write!(out, "{prompt} ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            let line = line.context("failed to read console input")?;
            if self.handle_line(engine, &line, out)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    fn handle_line(
        &mut self,
        engine: &Engine,
        line: &str,
        out: &mut dyn Write,
    ) -> anyhow::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        match line.to_lowercase().as_str() {
            "exit" | "quit" => return Ok(Flow::Exit),
            "history" => {
                for (i, entry) in self.history.iter().enumerate() {
                    writeln!(out, "{:>3}  {entry}", i + 1)?;
                }
                return Ok(Flow::Continue);
            }
            _ => {}
        }
        self.remember(line, engine.config().history_size);

        let args = match shell_words::split(line) {
            Ok(args) => args,
            Err(e) => {
                writeln!(out, "!!! could not split input: {e}")?;
                return Ok(Flow::Continue);
            }
        };

        let nested_console = args.first().is_some_and(|first| {
            engine
                .registry()
                .get(first.trim_start_matches(['/', '-']))
                .is_some_and(|d| d.primary_name() == CONSOLE_COMMAND)
        });
        if nested_console {
            writeln!(out, "already in console mode")?;
            return Ok(Flow::Continue);
        }

        if let Err(e) = engine.dispatch(args.as_slice(), out) {
            writeln!(out, "!!! {e:#}")?;
        }
        Ok(Flow::Continue)
    }

    fn remember(&mut self, line: &str, limit: usize) {
        if limit == 0 {
            return;
        }
        while self.history.len() >= limit {
            self.history.pop_front();
        }
        self.history.push_back(line.to_string());
    }
}

impl ArgSet for ConsoleCommand {
    fn visit_args(&mut self, _visitor: &mut dyn ArgVisitor) {}
}

impl Command for ConsoleCommand {
    fn run(&mut self, engine: &Engine) -> anyhow::Result<()> {
        if let Some(app) = &engine.config().app_name {
            println!("{app} console; type `help` for commands, `exit` to leave");
        }
        let stdin = io::stdin();
        self.run_lines(engine, stdin.lock(), &mut io::stdout())
    }
}

/* ---- viewargs ---- */

/// Echo back the argument list a command would receive.
#[derive(Debug, Default, Clone)]
pub struct ViewArgsCommand {
    args: Vec<String>,
}

impl ViewArgsCommand {
    pub fn describe(&self) -> String {
        if self.args.is_empty() {
            return "(no arguments)\n".to_string();
        }
        self.args
            .iter()
            .enumerate()
            .map(|(i, a)| format!("[{i}] {a}\n"))
            .collect()
    }
}

impl ArgSet for ViewArgsCommand {
    fn visit_args(&mut self, _visitor: &mut dyn ArgVisitor) {}
}

impl Command for ViewArgsCommand {
    fn run(&mut self, _engine: &Engine) -> anyhow::Result<()> {
        print!("{}", self.describe());
        Ok(())
    }

    fn set_extra_args(&mut self, extras: Vec<String>) {
        self.args = extras;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Cursor;

    fn engine() -> Engine {
        Engine::new(Config {
            console_enabled: true,
            show_view_args: true,
            history_size: 2,
            prompt: ">".into(),
            ..Config::default()
        })
    }

    fn console(input: &str) -> (ConsoleCommand, String) {
        let engine = engine();
        let mut console = ConsoleCommand::default();
        let mut out: Vec<u8> = Vec::new();
        console
            .run_lines(&engine, Cursor::new(input.to_string()), &mut out)
            .unwrap();
        (console, String::from_utf8(out).unwrap())
    }

    #[test]
    fn help_is_answered_by_the_resolver() {
        let engine = engine();
        let outcome = engine.resolve(&["help"]).unwrap();
        assert!(!outcome.is_run());
        let mut out = Vec::new();
        let result = engine.dispatch(&["?"], &mut out).unwrap();
        assert_eq!(result, crate::engine::Dispatch::ShowedHelp);
        assert!(HelpCommand.run(&engine).is_ok());
    }

    #[test]
    fn viewargs_lists_tokens() {
        let mut cmd = ViewArgsCommand::default();
        assert_eq!(cmd.describe(), "(no arguments)\n");
        cmd.set_extra_args(vec!["a".into(), "b c".into()]);
        assert_eq!(cmd.describe(), "[0] a\n[1] b c\n");
    }

    #[test]
    fn console_exits_on_quit() {
        let (console, out) = console("quit\nhelp\n");
        assert!(out.starts_with("> "));
        assert!(!out.contains("Available commands"));
        assert_eq!(console.history().count(), 0);
    }

    #[test]
    fn console_dispatches_lines() {
        let (_, out) = console("help\nexit\n");
        assert!(out.contains("Available commands"));
    }

    #[test]
    fn console_refuses_nesting() {
        let (_, out) = console("console\n");
        assert!(out.contains("already in console mode"));
    }

    #[test]
    fn console_reports_split_errors() {
        let (_, out) = console("viewargs \"unterminated\n");
        assert!(out.contains("!!! could not split input"));
    }

    #[test]
    fn history_is_bounded() {
        let (console, out) = console("help\nnope\nviewargs x\nhistory\n");
        let kept: Vec<&str> = console.history().collect();
        assert_eq!(kept, ["nope", "viewargs x"]);
        assert!(out.contains("  1  nope"));
    }
}
