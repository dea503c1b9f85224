//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Diagnostics go to stderr; command results go to stdout.
pub(crate) struct Output {
    term: Term,
    out: Term,
    dim: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            out: Term::stdout(),
            dim: Style::new().dim(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a result line to stdout.
    pub(crate) fn data(&self, line: &str) {
        let _ = self.out.write_line(line);
    }

    /// Print a highlighted result line to stdout (cyan bold).
    pub(crate) fn highlight(&self, line: &str) {
        let _ = self.out.write_line(&self.cyan_bold.apply_to(line).to_string());
    }

    /// Print a secondary result line to stdout (dim).
    pub(crate) fn detail(&self, line: &str) {
        let _ = self.out.write_line(&self.dim.apply_to(line).to_string());
    }
}
