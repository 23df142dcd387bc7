/*!
format.rs - text layout for help views and diagnostics.

  StyleOptions   color on/off + terminal width
  paint          wrap text in the ANSI code of a `Role`
  two_columns    NAME / DESCRIPTION listing, descriptions wrapped under
                 their own column
  wrap_text      greedy word wrap
  prefixed       wrap a message under a fixed marker such as `!!!`

Color follows NO_COLOR; width follows COLUMNS (40..=220, default 100).
Nothing here prints.
*/

const DEFAULT_WIDTH: usize = 100;
const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 220;
const GUTTER: &str = "  ";
/// Descriptions never get less room than this, even next to long names.
const MIN_DESCRIPTION_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOptions {
    pub use_color: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map_or(DEFAULT_WIDTH, |w| w.clamp(MIN_WIDTH, MAX_WIDTH));
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            term_width,
        }
    }

    /// No color, default width.
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            term_width: DEFAULT_WIDTH,
        }
    }
}

/// What a piece of help or diagnostic text is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// "Usage:", "Options:", section titles.
    Heading,
    /// Command prototypes.
    Name,
    /// Column headers and category names.
    Label,
    Notice,
    Error,
    Dim,
}

impl Role {
    fn sgr(self) -> &'static str {
        match self {
            Role::Heading => "1",
            Role::Name => "36",
            Role::Label => "35",
            Role::Notice => "33",
            Role::Error => "31",
            Role::Dim => "2",
        }
    }
}

pub fn paint(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if style.use_color {
        format!("\x1b[{}m{}\x1b[0m", role.sgr(), text.as_ref())
    } else {
        text.as_ref().to_string()
    }
}

/// Two-column listing with a header row.
///
/// The name column is as wide as its longest entry, capped at a third of the
/// terminal. A name that does not fit gets a line of its own and its
/// description starts on the next line, aligned with the column.
pub fn two_columns(
    headers: (&str, &str),
    rows: &[(String, String)],
    style: &StyleOptions,
) -> String {
    let name_width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain([headers.0.chars().count()])
        .max()
        .unwrap_or(0)
        .min(style.term_width / 3);
    let description_width = style
        .term_width
        .saturating_sub(name_width + GUTTER.len())
        .max(MIN_DESCRIPTION_WIDTH);
    let indent = " ".repeat(name_width + GUTTER.len());

    let mut lines = vec![
        paint(
            Role::Label,
            format!("{:<name_width$}{GUTTER}{}", headers.0, headers.1),
            style,
        ),
        paint(
            Role::Dim,
            format!(
                "{}{GUTTER}{}",
                "-".repeat(name_width),
                "-".repeat(headers.1.chars().count())
            ),
            style,
        ),
    ];

    for (name, description) in rows {
        let mut wrapped = wrap_text(description, description_width).into_iter();
        let first = wrapped.next().unwrap_or_default();
        if name.chars().count() > name_width {
            lines.push(name.clone());
            if !first.is_empty() {
                lines.push(format!("{indent}{first}"));
            }
        } else {
            let line = format!("{name:<name_width$}{GUTTER}{first}");
            lines.push(line.trim_end().to_string());
        }
        lines.extend(wrapped.map(|rest| format!("{indent}{rest}")));
    }

    lines.join("\n")
}

/// Greedy word wrap on whitespace. `width == 0` disables wrapping; words longer
/// than `width` stay whole. Always returns at least one line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut len = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if len > 0 && width > 0 && len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            len = 0;
        }
        if len > 0 {
            current.push(' ');
            len += 1;
        }
        current.push_str(word);
        len += word_len;
    }
    if len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// `marker message` wrapped to `width`, continuation lines indented past the marker.
pub fn prefixed(marker: &str, message: &str, width: usize) -> Vec<String> {
    let marker_len = marker.chars().count() + 1;
    let pad = " ".repeat(marker_len);
    wrap_text(message, width.saturating_sub(marker_len))
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{marker} {line}")
            } else {
                format!("{pad}{line}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(width: usize) -> StyleOptions {
        StyleOptions {
            use_color: false,
            term_width: width,
        }
    }

    fn rows(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, d)| (n.to_string(), d.to_string()))
            .collect()
    }

    #[test]
    fn columns_align_on_longest_name() {
        let text = two_columns(
            ("OPTION", "DESCRIPTION"),
            &rows(&[("-n", "count"), ("--verbose", "")]),
            &style(80),
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "OPTION     DESCRIPTION");
        assert_eq!(lines[1], "---------  -----------");
        assert_eq!(lines[2], "-n         count");
        assert_eq!(lines[3], "--verbose");
    }

    #[test]
    fn long_descriptions_wrap_under_their_column() {
        let text = two_columns(
            ("C", "D"),
            &rows(&[("run", "alpha beta gamma delta epsilon zeta eta theta")]),
            &style(40),
        );
        let lines: Vec<&str> = text.lines().skip(2).collect();
        assert_eq!(lines[0], "run  alpha beta gamma delta epsilon zeta");
        assert_eq!(lines[1], "     eta theta");
    }

    #[test]
    fn oversized_name_gets_its_own_line() {
        let name = "--a-really-long-option-name-for-testing=VALUE";
        let text = two_columns(("OPTION", "DESCRIPTION"), &rows(&[(name, "short")]), &style(60));
        let lines: Vec<&str> = text.lines().skip(2).collect();
        assert_eq!(lines[0], name);
        assert_eq!(lines[1], format!("{}short", " ".repeat(22)));
    }

    #[test]
    fn wrap_rules() {
        assert_eq!(
            wrap_text("hello world from formatting", 10),
            ["hello", "world from", "formatting"]
        );
        assert_eq!(wrap_text("", 10), [""]);
        assert_eq!(wrap_text("a b c", 0), ["a b c"]);
        assert_eq!(wrap_text("unbreakable word", 4), ["unbreakable", "word"]);
    }

    #[test]
    fn prefixed_indents_continuations() {
        assert_eq!(
            prefixed("!!!", "one two three four five six", 20),
            ["!!! one two three", "    four five six"]
        );
    }

    #[test]
    fn paint_respects_style() {
        assert_eq!(paint(Role::Error, "x", &style(80)), "x");
        let colored = StyleOptions {
            use_color: true,
            term_width: 80,
        };
        assert_eq!(paint(Role::Error, "x", &colored), "\x1b[31mx\x1b[0m");
    }
}
