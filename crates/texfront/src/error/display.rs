//! Rendering of traced errors in the style of compiler diagnostics.
//!
//! ```text
//! Error: undefined control sequence \foo
//!  >>> input.tex:3:1
//!   |
//! 3 | \foo bar
//!   | ^^^^ undefined control sequence
//! ```

use super::TracedError;
use crate::token::trace::SourceCodeTrace;
use std::fmt::Formatter;
use texfront_stdext::color::{paint, Style};

pub fn format_error(f: &mut Formatter<'_>, err: &TracedError) -> std::fmt::Result {
    let trace = &err.trace;
    let gutter = Gutter {
        width: trace.line_number.to_string().len(),
    };
    writeln!(
        f,
        "{}: {}",
        paint("Error", Style::Error),
        paint(&err.error.to_string(), Style::Emphasis)
    )?;
    write_trace(f, &gutter, trace, &annotation(err))?;
    for note in &err.notes {
        let mut lines = note.trim_end().lines();
        let Some(first) = lines.next() else {
            continue;
        };
        gutter.line(f, "", Some('|'), "")?;
        let first = format!["{} {first}", paint("note:", Style::Emphasis)];
        gutter.line(f, "", Some('='), &first)?;
        for line in lines {
            gutter.line(f, "", Some(' '), &format!["      {line}"])?;
        }
    }
    Ok(())
}

fn annotation(err: &TracedError) -> String {
    if err.trace.token.is_none() {
        return "input ended here".to_string();
    }
    match &*err.error {
        super::Error::NoSuchControlSequence { .. } => "undefined control sequence".to_string(),
        super::Error::Syntax(syntax) => format!["expected {}", syntax.expected],
        _ => String::new(),
    }
}

/// The left column holding line numbers, sized for the widest number shown.
struct Gutter {
    width: usize,
}

impl Gutter {
    fn line(
        &self,
        f: &mut Formatter<'_>,
        label: &str,
        separator: Option<char>,
        content: &str,
    ) -> std::fmt::Result {
        let mut margin = format!["{label:>width$} ", width = self.width];
        if let Some(c) = separator {
            margin.push(c);
            margin.push(' ');
        }
        writeln!(f, "{}{content}", paint(&margin, Style::Margin))
    }
}

fn write_trace(
    f: &mut Formatter<'_>,
    gutter: &Gutter,
    trace: &SourceCodeTrace,
    annotation: &str,
) -> std::fmt::Result {
    let location = format!(
        "{} {}:{}:{}",
        paint(">>>", Style::Marker),
        trace.origin,
        trace.line_number,
        trace.index + 1
    );
    writeln!(f, "{}{location}", " ".repeat(gutter.width.saturating_sub(1)))?;
    gutter.line(f, "", Some('|'), "")?;
    let width = trace.value.chars().count();
    let highlighted = highlight_substring(&trace.line_content, trace.index, width);
    gutter.line(f, &trace.line_number.to_string(), Some('|'), &highlighted)?;
    let underline = format![
        "{}{} {}",
        " ".repeat(trace.index),
        paint(&"^".repeat(width.max(1)), Style::Error),
        paint(annotation, Style::Error),
    ];
    gutter.line(f, "", Some('|'), &underline)
}

fn highlight_substring(line: &str, start: usize, length: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() < start + length {
        return line.trim_end().into();
    }
    let part = |range: std::ops::Range<usize>| -> String { chars[range].iter().collect() };
    format![
        "{}{}{}",
        part(0..start),
        paint(&part(start..start + length), Style::Emphasis),
        part(start + length..chars.len()).trim_end()
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::token::trace::Origin;

    #[test]
    fn highlight_multibyte() {
        let got = highlight_substring("hël wörld  ", 4, 5);
        assert!(got.contains("wörld"));
        assert!(got.starts_with("hël "));
    }

    #[test]
    fn format_contains_location() {
        let err = TracedError {
            error: Box::new(Error::EndOfInput {
                doing: "reading a macro argument".to_string(),
            }),
            trace: SourceCodeTrace {
                origin: Origin::File("input.tex".into()),
                line_content: r"\foo{a".to_string(),
                line_number: 3,
                index: 6,
                char_offset: 20,
                value: " ".to_string(),
                token: None,
            },
            notes: vec!["first note".to_string()],
        };
        let got = format!["{err}"];
        assert!(got.contains("unexpected end of input while reading a macro argument"));
        assert!(got.contains("input.tex:3:7"));
        assert!(got.contains("first note"));
    }
}
