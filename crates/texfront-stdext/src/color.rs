//! Terminal styling for diagnostics.
//!
//! Styles are rendered with the [Colored crate](https://docs.rs/colored/latest/colored/)
//! when the `color` Cargo feature is enabled.
//! Without the feature [paint] returns the string unchanged, so callers never need to
//! check which build they are in:
//!
//! ```
//! use texfront_stdext::color::{paint, Style};
//! println!["{}: something went wrong", paint("Error", Style::Error)];
//! ```

/// The role of a piece of diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Bold bright red.
    Error,
    /// Bold bright yellow.
    Warning,
    /// Bold.
    Emphasis,
    /// Bright cyan: line numbers and separators in the margin.
    Margin,
    /// Bold bright cyan: the `>>>` before a source location.
    Marker,
}

#[cfg(feature = "color")]
pub fn paint(s: &str, style: Style) -> String {
    use colored::Colorize;
    let colored = match style {
        Style::Error => s.bright_red().bold(),
        Style::Warning => s.bright_yellow().bold(),
        Style::Emphasis => s.bold(),
        Style::Margin => s.bright_cyan(),
        Style::Marker => s.bright_cyan().bold(),
    };
    colored.to_string()
}

#[cfg(not(feature = "color"))]
pub fn paint(s: &str, _: Style) -> String {
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_preserved() {
        for style in [
            Style::Error,
            Style::Warning,
            Style::Emphasis,
            Style::Margin,
            Style::Marker,
        ] {
            assert!(paint("hello", style).contains("hello"));
        }
    }
}
