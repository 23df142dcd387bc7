/*!
help.rs - help views produced by the resolver.

Two topics:
  - command list, grouped by category (internal commands last)
  - single command usage with one row per registered option

Views are plain data; `render` turns them into text using `format.rs`.
*/

use std::fmt::Write as _;

use crate::cmd::format::{Role, StyleOptions, paint, two_columns, wrap_text};
use crate::option::{CATCH_ALL, OptionSet, ValueArity};

/// One line of the command list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub prototype: String,
    pub description: String,
    pub category: String,
    pub internal: bool,
}

/// One option row of a command's usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionHelp {
    pub names: Vec<String>,
    pub arity: ValueArity,
    pub description: String,
}

impl OptionHelp {
    /// `-o, --output=VALUE` style label.
    pub fn label(&self) -> String {
        let mut label = self
            .names
            .iter()
            .map(|n| {
                if n == CATCH_ALL {
                    n.clone()
                } else if n.chars().count() == 1 {
                    format!("-{n}")
                } else {
                    format!("--{n}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        match self.arity {
            ValueArity::Required => label.push_str("=VALUE"),
            ValueArity::Optional => label.push_str("[=VALUE]"),
            ValueArity::None => {}
        }
        label
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpTopic {
    Commands(Vec<CommandSummary>),
    Command {
        command: CommandSummary,
        options: Vec<OptionHelp>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpView {
    topic: HelpTopic,
    notice: Option<String>,
}

impl HelpView {
    /// Command list; sorted by (internal, category, prototype).
    pub fn commands(mut commands: Vec<CommandSummary>) -> Self {
        commands.sort_by_key(|c| {
            (
                c.internal,
                c.category.to_lowercase(),
                c.prototype.to_lowercase(),
            )
        });
        HelpView {
            topic: HelpTopic::Commands(commands),
            notice: None,
        }
    }

    /// Usage of a single command, built from its registered options.
    pub fn command(command: CommandSummary, options: &OptionSet) -> Self {
        let options = options
            .definitions()
            .iter()
            .map(|d| OptionHelp {
                names: d.shape().names().to_vec(),
                arity: d.shape().arity(),
                description: d.description().to_string(),
            })
            .collect();
        HelpView {
            topic: HelpTopic::Command { command, options },
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    pub fn topic(&self) -> &HelpTopic {
        &self.topic
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_command_list(&self) -> bool {
        matches!(self.topic, HelpTopic::Commands(_))
    }

    /// Prototype of the described command, for single-command views.
    pub fn command_prototype(&self) -> Option<&str> {
        match &self.topic {
            HelpTopic::Command { command, .. } => Some(&command.prototype),
            HelpTopic::Commands(_) => None,
        }
    }

    pub fn render(&self, style: &StyleOptions) -> String {
        let mut out = String::new();
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "{}\n", paint(Role::Notice, notice, style));
        }
        match &self.topic {
            HelpTopic::Commands(commands) => render_commands(&mut out, commands, style),
            HelpTopic::Command { command, options } => {
                render_command(&mut out, command, options, style)
            }
        }
        out
    }
}

fn render_commands(out: &mut String, commands: &[CommandSummary], style: &StyleOptions) {
    let _ = writeln!(out, "{}", paint(Role::Heading, "Available commands:", style));

    let mut start = 0;
    while start < commands.len() {
        let group = (&commands[start].category, commands[start].internal);
        let end = commands[start..]
            .iter()
            .position(|c| (&c.category, c.internal) != group)
            .map(|p| start + p)
            .unwrap_or(commands.len());

        out.push('\n');
        if !group.0.is_empty() {
            let _ = writeln!(out, "{}", paint(Role::Label, group.0, style));
        }
        let rows: Vec<(String, String)> = commands[start..end]
            .iter()
            .map(|c| (c.prototype.clone(), c.description.clone()))
            .collect();
        let _ = writeln!(out, "{}", two_columns(("COMMAND", "DESCRIPTION"), &rows, style));
        start = end;
    }

    let _ = writeln!(
        out,
        "\n{}",
        paint(
            Role::Dim,
            "Use `help <command>` or `<command> /?` for details on a single command",
            style
        )
    );
}

fn render_command(
    out: &mut String,
    command: &CommandSummary,
    options: &[OptionHelp],
    style: &StyleOptions,
) {
    let _ = writeln!(
        out,
        "{} {} [options]",
        paint(Role::Heading, "Usage:", style),
        paint(Role::Name, &command.prototype, style)
    );
    if !command.description.is_empty() {
        for line in wrap_text(&command.description, style.term_width.saturating_sub(2)) {
            let _ = writeln!(out, "  {line}");
        }
    }
    if options.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}", paint(Role::Heading, "Options:", style));
    let rows: Vec<(String, String)> = options
        .iter()
        .map(|o| (o.label(), o.description.clone()))
        .collect();
    let _ = writeln!(out, "{}", two_columns(("OPTION", "DESCRIPTION"), &rows, style));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(prototype: &str, category: &str, internal: bool) -> CommandSummary {
        CommandSummary {
            prototype: prototype.into(),
            description: format!("{prototype} description"),
            category: category.into(),
            internal,
        }
    }

    #[test]
    fn list_is_grouped_with_internal_last() {
        let view = HelpView::commands(vec![
            summary("help|h|?", "", true),
            summary("zeta", "tools", false),
            summary("alpha", "tools", false),
            summary("deploy", "", false),
            summary("console", "", true),
        ]);
        let HelpTopic::Commands(list) = view.topic() else {
            panic!("expected command list");
        };
        let order: Vec<&str> = list.iter().map(|c| c.prototype.as_str()).collect();
        assert_eq!(order, ["deploy", "alpha", "zeta", "console", "help|h|?"]);
    }

    #[test]
    fn option_labels() {
        let req = OptionHelp {
            names: vec!["o".into(), "output".into()],
            arity: ValueArity::Required,
            description: String::new(),
        };
        assert_eq!(req.label(), "-o, --output=VALUE");
        let opt = OptionHelp {
            names: vec!["level".into()],
            arity: ValueArity::Optional,
            description: String::new(),
        };
        assert_eq!(opt.label(), "--level[=VALUE]");
        let flag = OptionHelp {
            names: vec!["?".into(), "h".into(), "help".into()],
            arity: ValueArity::None,
            description: String::new(),
        };
        assert_eq!(flag.label(), "-?, -h, --help");
    }

    #[test]
    fn command_view_lists_options() {
        let mut options = OptionSet::new();
        options
            .add_prototype("f|file=", "input file")
            .unwrap();
        options
            .add_prototype("n|lines:", "line count default=10")
            .unwrap();
        let view = HelpView::command(summary("count|wc", "", false), &options);
        assert_eq!(view.command_prototype(), Some("count|wc"));

        let text = view.render(&StyleOptions::plain());
        assert!(text.starts_with("Usage: count|wc [options]"));
        assert!(text.contains("-f, --file=VALUE"));
        assert!(text.contains("-n, --lines[=VALUE]"));
        assert!(text.contains("line count default=10"));
    }

    #[test]
    fn notice_comes_first() {
        let view = HelpView::commands(vec![summary("deploy", "", false)])
            .with_notice("Unknown command: nope");
        let text = view.render(&StyleOptions::plain());
        assert!(text.starts_with("Unknown command: nope"));
        assert!(text.contains("deploy"));
        assert!(view.is_command_list());
    }
}
