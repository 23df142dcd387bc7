/*!
Demo commands wired into the `multicmd` binary.

  echo|say   print trailing arguments (flags, defaults, extras)
  count|wc   line/word/byte counts of a file (required option, nested set,
             validation, JSON output)

JSON Output Shape (count --json):
{
  "file": "<path>",
  "label": "<label or null>",
  "lines": 3,
  "words": 12,
  "bytes": 64
}
*/

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use multicmd::bind::{Arg, ArgSet, ArgVisitor, SetProperty};
use multicmd::cmd::format::{Role, paint, two_columns};
use multicmd::{Command, CommandDescriptor, Engine};

pub fn descriptors() -> Result<Vec<CommandDescriptor>> {
    Ok(vec![
        CommandDescriptor::of::<EchoCommand>("echo|say", "print the given words")?
            .category("demo"),
        CommandDescriptor::of::<CountCommand>("count|wc", "count lines, words and bytes of a file")?
            .category("demo"),
    ])
}

/* ---- echo ---- */

#[derive(Debug, Clone)]
pub struct EchoCommand {
    upper: bool,
    times: u32,
    separator: String,
    words: Vec<String>,
}

impl Default for EchoCommand {
    fn default() -> Self {
        EchoCommand {
            upper: false,
            times: 1,
            separator: " ".to_string(),
            words: Vec::new(),
        }
    }
}

impl EchoCommand {
    fn render(&self) -> String {
        let line = self.words.join(&self.separator);
        let line = if self.upper { line.to_uppercase() } else { line };
        (0..self.times).map(|_| format!("{line}\n")).collect()
    }
}

impl ArgSet for EchoCommand {
    fn visit_args(&mut self, v: &mut dyn ArgVisitor) {
        v.leaf(&Arg::new("u|upper", "print in upper case"), &mut self.upper);
        v.leaf(&Arg::new("n|times", "repeat count"), &mut self.times);
        v.leaf(&Arg::new("s|separator", "text placed between words"), &mut self.separator);
    }

    fn validate(&self) -> Vec<String> {
        if self.times == 0 {
            vec!["--times must be at least 1".to_string()]
        } else {
            Vec::new()
        }
    }
}

impl Command for EchoCommand {
    fn run(&mut self, _engine: &Engine) -> Result<()> {
        print!("{}", self.render());
        Ok(())
    }

    fn set_extra_args(&mut self, extras: Vec<String>) {
        self.words = extras;
    }
}

/* ---- count ---- */

/// Output options shared by reporting commands.
#[derive(Debug, Clone, Default)]
pub struct FormatArgs {
    json: bool,
    label: Option<String>,
}

impl ArgSet for FormatArgs {
    fn visit_args(&mut self, v: &mut dyn ArgVisitor) {
        v.leaf(&Arg::new("json", "print JSON instead of a listing"), &mut self.json);
        v.leaf(&Arg::new("l|label", "name shown instead of the path"), &mut self.label);
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountCommand {
    file: PathBuf,
    format: FormatArgs,
    machine_output: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Counts {
    file: String,
    label: Option<String>,
    lines: usize,
    words: usize,
    bytes: usize,
}

impl CountCommand {
    fn counts(&self) -> Result<Counts> {
        let content = fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        Ok(Counts {
            file: self.file.display().to_string(),
            label: self.format.label.clone(),
            lines: content.lines().count(),
            words: content.split_whitespace().count(),
            bytes: content.len(),
        })
    }
}

impl ArgSet for CountCommand {
    fn visit_args(&mut self, v: &mut dyn ArgVisitor) {
        v.leaf(&Arg::new("f|file", "file to count").required(), &mut self.file);
        let machine_output = &mut self.machine_output;
        v.set(&mut SetProperty::new(&mut self.format).on_assign(|f| {
            *machine_output = f.json;
        }));
    }

    fn validate(&self) -> Vec<String> {
        if self.file.as_os_str().is_empty() {
            return vec!["--file is required".to_string()];
        }
        if !self.file.is_file() {
            return vec![format!("no such file: {}", self.file.display())];
        }
        Vec::new()
    }
}

impl Command for CountCommand {
    fn run(&mut self, engine: &Engine) -> Result<()> {
        let counts = self.counts()?;
        if self.machine_output {
            println!("{}", serde_json::to_string_pretty(&counts)?);
            return Ok(());
        }
        let style = engine.style();
        let name = counts.label.as_deref().unwrap_or(&counts.file);
        println!("{}", paint(Role::Heading, name, style));
        let rows = [
            ("lines", counts.lines),
            ("words", counts.words),
            ("bytes", counts.bytes),
        ]
        .map(|(what, n)| (what.to_string(), n.to_string()));
        println!("{}", two_columns(("COUNT", "VALUE"), &rows, style));
        Ok(())
    }
}
