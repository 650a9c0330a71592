//! ANSI terminal colors for pretty-printed Fabrique source.

use fabrique_ast::{Highlight, Style};

/// Paints each style with a fixed ANSI color.
pub struct AnsiHighlight;

impl Highlight for AnsiHighlight {
    fn paint(&self, style: Style, text: &str) -> String {
        let code = match style {
            Style::Action => "33",
            Style::Literal => "36",
            Style::Definition => "1",
            Style::Operator => "34",
            Style::Reference => "0",
            Style::Type => "32",
            Style::Filename => "35",
            Style::Plain => return text.to_string(),
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}
