//! Tracing system for determining the origin of a token.
//!
//! Error messages need to show where a token came from: the file, the line and the column.
//! Storing this information on every token would make tokens large, so instead each token holds a
//! 32-bit [Key] and the [Tracer] can turn a key back into a [SourceCodeTrace].
//!
//! When source code is added to the input it is registered with
//! [register_source_code](Tracer::register_source_code).
//! The tracer allocates a contiguous [KeyRange] with one key per character of the source.
//! The character at index _i_ of the source is assigned the _i_-th key of the range.
//! Tracing a key finds the range it belongs to; the offset into the range is the
//! character offset into the source code.
use crate::token::{CsNameInterner, Token, Value};
use std::collections::BTreeMap;
use std::ops::Bound::Included;
use std::path::PathBuf;

/// Key attached to tokens to enable tracing them.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Key(u32);

impl Key {
    /// A key that does not correspond to any source code.
    pub fn dummy() -> Key {
        Key(u32::MAX)
    }

    #[cfg(test)]
    pub fn for_testing(u: u32) -> Key {
        Key(u)
    }
}

/// Range of keys assigned to one piece of source code.
#[derive(Debug, Clone, Copy)]
pub struct KeyRange {
    first: u32,
    len: u32,
}

impl KeyRange {
    /// The key of the character at the provided index of the source code.
    ///
    /// Characters outside the range get the dummy key.
    pub fn key(&self, index: usize) -> Key {
        match u32::try_from(index) {
            Ok(i) if i < self.len => Key(self.first + i),
            _ => Key::dummy(),
        }
    }

    pub fn empty() -> KeyRange {
        KeyRange { first: 0, len: 0 }
    }
}

/// Enum describing the possible origins of source code.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Origin {
    File(PathBuf),
    Terminal,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Terminal => write!(f, "<terminal>"),
        }
    }
}

/// A token trace.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SourceCodeTrace {
    /// Origin of the source code this token came from.
    pub origin: Origin,
    /// Content of the line this token came from.
    pub line_content: String,
    /// Number of the line within the file, starting at 1.
    pub line_number: usize,
    /// Index within the line that the token starts.
    pub index: usize,
    /// Character offset of the token within the source code.
    pub char_offset: usize,
    /// Value of the token as it appears in the source code.
    pub value: String,
    /// The token being traced, or [None] for an end of input trace.
    pub token: Option<Token>,
}

/// Data structure that records information for token tracing.
#[derive(Default, Debug)]
pub struct Tracer {
    checkpoints: BTreeMap<u32, SourceCode>,
    next_key: u32,
    last_input: Option<u32>,
}

#[derive(Debug)]
struct SourceCode {
    origin: Origin,
    content: String,
}

impl Tracer {
    /// Registers source code with the tracer.
    ///
    /// One extra key is allocated beyond the length of the source
    /// for the end of line character that terminates the last line.
    pub fn register_source_code(&mut self, origin: Origin, source_code: &str) -> KeyRange {
        let len = u32::try_from(source_code.chars().count())
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1)
            .min(u32::MAX - 1 - self.next_key);
        let range = KeyRange {
            first: self.next_key,
            len,
        };
        self.checkpoints.insert(
            range.first,
            SourceCode {
                origin,
                content: source_code.to_string(),
            },
        );
        self.last_input = Some(range.first);
        self.next_key += len;
        range
    }

    /// Return a trace for the provided token.
    pub fn trace(&self, token: Token, interner: &CsNameInterner) -> SourceCodeTrace {
        let value = match token.value() {
            Value::CommandRef(command_ref) => command_ref.to_string(interner),
            _ => token.char().map(String::from).unwrap_or_default(),
        };
        let key = token.trace_key().0;
        let checkpoint = if key == Key::dummy().0 {
            None
        } else {
            self.checkpoints
                .range((Included(&0), Included(&key)))
                .next_back()
        };
        let (first_key, source) = match checkpoint {
            None => {
                return SourceCodeTrace {
                    origin: Origin::Terminal,
                    line_content: value.clone(),
                    line_number: 1,
                    index: 0,
                    char_offset: 0,
                    value,
                    token: Some(token),
                }
            }
            Some((first_key, source)) => (*first_key, source),
        };
        let char_offset = (key - first_key) as usize;
        let mut line_number = 1;
        let mut byte_line_start = 0;
        let mut char_line_start = 0;
        for (char_index, (byte_index, c)) in source.content.char_indices().enumerate() {
            if char_index == char_offset {
                break;
            }
            if c == '\n' {
                byte_line_start = byte_index + 1;
                char_line_start = char_index + 1;
                line_number += 1;
            }
        }
        let tail = source.content.get(byte_line_start..).unwrap_or_default();
        let line_content = match tail.split_once('\n') {
            None => tail.to_string(),
            Some((line, _)) => line.to_string(),
        };
        SourceCodeTrace {
            origin: source.origin.clone(),
            line_content,
            line_number,
            index: char_offset - char_line_start,
            char_offset,
            value,
            token: Some(token),
        }
    }

    /// Returns a trace pointing just past the last non-empty line of the last input.
    pub fn trace_end_of_input(&self) -> SourceCodeTrace {
        let source = self
            .last_input
            .and_then(|first_key| self.checkpoints.get(&first_key));
        let source = match source {
            None => {
                return SourceCodeTrace {
                    origin: Origin::Terminal,
                    line_content: String::new(),
                    line_number: 1,
                    index: 0,
                    char_offset: 0,
                    value: " ".to_string(),
                    token: None,
                }
            }
            Some(source) => source,
        };
        // (line index, byte index of first character)
        let mut last_line: (usize, usize) = (0, 0);
        let mut last_non_empty_line: (usize, usize) = (0, 0);
        for (i, c) in source.content.char_indices() {
            if !c.is_whitespace() {
                last_non_empty_line = last_line;
            } else if c == '\n' {
                last_line.0 += 1;
                last_line.1 = i + 1;
            }
        }
        let line = source
            .content
            .get(last_non_empty_line.1..)
            .unwrap_or_default();
        let line = line.split('\n').next().unwrap_or_default().trim_end();
        SourceCodeTrace {
            origin: source.origin.clone(),
            line_content: line.to_string(),
            line_number: last_non_empty_line.0 + 1,
            index: line.chars().count(),
            char_offset: source.content.chars().count(),
            value: " ".to_string(),
            token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_second_line() {
        let mut tracer = Tracer::default();
        let interner = CsNameInterner::default();
        let origin = Origin::File("input.tex".into());
        let range = tracer.register_source_code(origin.clone(), "hël\nwörld\n");
        let token = Token::new_letter('r', range.key(6));
        let got = tracer.trace(token, &interner);
        assert_eq!(
            got,
            SourceCodeTrace {
                origin,
                line_content: "wörld".to_string(),
                line_number: 2,
                index: 2,
                char_offset: 6,
                value: "r".to_string(),
                token: Some(token),
            }
        );
    }

    #[test]
    fn trace_across_sources() {
        let mut tracer = Tracer::default();
        let interner = CsNameInterner::default();
        tracer.register_source_code(Origin::Terminal, "abc");
        let second = tracer.register_source_code(Origin::File("b.tex".into()), "xyz");
        let got = tracer.trace(Token::new_letter('y', second.key(1)), &interner);
        assert_eq!(got.origin, Origin::File("b.tex".into()));
        assert_eq!(got.index, 1);
    }

    #[test]
    fn trace_end_of_input_skips_blank_lines() {
        let mut tracer = Tracer::default();
        tracer.register_source_code(Origin::Terminal, "a\nlast line  \n\n");
        let got = tracer.trace_end_of_input();
        assert_eq!(got.line_number, 2);
        assert_eq!(got.line_content, "last line");
        assert_eq!(got.index, 9);
    }
}
