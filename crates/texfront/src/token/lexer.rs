//! Conversion of input characters into tokens.
//!
//! Tokens are produced one at a time on request, because category codes can change
//! between any two tokens. With plain TeX category codes, the input
//! ```tex
//! \catcode`\A=10 AB
//! ```
//! must yield the single letter B after the assignment: by the time the lexer reads
//! `A` it is a space, and spaces after the number are skipped.
//!
//! The lexer is the 3-state machine of TeX.2021.303: each line starts in the
//! [State::LineStart] state, and the state determines what spaces and
//! end of line characters turn into.

use super::reader::Reader;
use super::trace;
use super::{CatCode, CsName, CsNameInterner, Token, Value};
use crate::codes::Codes;
use crate::error::Error;

/// State of the lexer's line reading machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// At the beginning of a line. Spaces are skipped and an end of line character is `\par`.
    LineStart,
    /// In the middle of a line. A space or end of line character produces one space token.
    MidLine,
    /// After a space or a control word. Spaces and end of line characters produce nothing.
    SkippingBlanks,
}

/// The lexer.
#[derive(Debug)]
pub struct Lexer {
    reader: Reader,
    state: State,
    // Control sequence names are read into a shared buffer to avoid allocating for each one.
    buffer: String,
}

impl Default for Lexer {
    fn default() -> Self {
        Lexer {
            reader: Default::default(),
            state: State::LineStart,
            buffer: Default::default(),
        }
    }
}

/// Converts the value of `\endlinechar` to a character.
///
/// Values outside of the range [0, 255] mean no character is appended.
fn end_line_char(value: i32) -> Option<char> {
    u8::try_from(value).ok().map(char::from)
}

impl Lexer {
    /// Inserts new source code at the current read position.
    pub fn push_source(&mut self, content: &str, keys: trace::KeyRange) {
        self.reader.push_source(content, keys);
        self.state = State::LineStart;
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the next token, or [None] if the input is exhausted.
    pub fn next(
        &mut self,
        codes: &Codes,
        end_line_char_value: i32,
        interner: &mut CsNameInterner,
    ) -> Result<Option<Token>, Box<Error>> {
        loop {
            let (raw, key) = match self.reader.peek() {
                None => return Ok(None),
                Some(next) => next,
            };
            let (c, line_end) = if raw == '\n' {
                self.reader.advance();
                match end_line_char(end_line_char_value) {
                    None => {
                        self.state = State::LineStart;
                        continue;
                    }
                    Some(c) => (c, true),
                }
            } else {
                (raw, false)
            };
            let cat_code = codes.cat_code(c);
            if !line_end {
                if cat_code == CatCode::Superscript && self.reader.decode_trio() {
                    continue;
                }
                self.reader.advance();
            }
            let token = match cat_code {
                CatCode::Escape => {
                    self.read_name(line_end, codes, end_line_char_value);
                    let name = intern(interner, &self.buffer)?;
                    Some(Token::new_control_sequence(name, key))
                }
                CatCode::EndOfLine => {
                    if !line_end {
                        self.reader.skip_line();
                    }
                    let token = match self.state {
                        State::LineStart => Some(Token::new_control_sequence(
                            intern(interner, "par")?,
                            key,
                        )),
                        State::MidLine => Some(Token::new_space(' ', key)),
                        State::SkippingBlanks => None,
                    };
                    self.state = State::LineStart;
                    token
                }
                CatCode::Space => {
                    if self.state == State::MidLine {
                        self.state = State::SkippingBlanks;
                        Some(Token::new_space(' ', key))
                    } else {
                        None
                    }
                }
                CatCode::Comment => {
                    if !line_end {
                        self.reader.skip_line();
                    }
                    self.state = State::LineStart;
                    None
                }
                CatCode::Ignored => None,
                CatCode::Invalid => {
                    return Err(Box::new(Error::InvalidCharacter { character: c, key }));
                }
                _ => {
                    self.state = State::MidLine;
                    Value::new(c, cat_code).map(|value| Token::new_from_value(value, key))
                }
            };
            if line_end {
                self.state = State::LineStart;
            }
            if let Some(token) = token {
                return Ok(Some(token));
            }
        }
    }

    /// Reads the name of a control sequence into the buffer and updates the state.
    fn read_name(&mut self, escape_ended_line: bool, codes: &Codes, end_line_char_value: i32) {
        self.buffer.clear();
        if escape_ended_line {
            return;
        }
        loop {
            let c = match self.reader.peek() {
                None => return,
                Some((c, _)) => c,
            };
            if c == '\n' {
                self.reader.advance();
                if let Some(c) = end_line_char(end_line_char_value) {
                    self.buffer.push(c);
                }
                self.state = State::LineStart;
                return;
            }
            let cat_code = codes.cat_code(c);
            if cat_code == CatCode::Superscript && self.reader.decode_trio() {
                continue;
            }
            self.reader.advance();
            self.buffer.push(c);
            if cat_code != CatCode::Letter {
                self.state = if cat_code == CatCode::Space {
                    State::SkippingBlanks
                } else {
                    State::MidLine
                };
                return;
            }
            break;
        }
        while let Some((c, _)) = self.reader.peek() {
            if c == '\n' {
                break;
            }
            let cat_code = codes.cat_code(c);
            if cat_code == CatCode::Superscript && self.reader.decode_trio() {
                continue;
            }
            if cat_code != CatCode::Letter {
                break;
            }
            self.reader.advance();
            self.buffer.push(c);
        }
        self.state = State::SkippingBlanks;
    }
}

/// Interns a control sequence name.
pub(crate) fn intern(interner: &mut CsNameInterner, name: &str) -> Result<CsName, Box<Error>> {
    interner.get_or_intern(name).ok_or_else(|| {
        Box::new(Error::Overflow {
            token: None,
            message: "too many distinct control sequence names".to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatCodeDefaults;
    use texfront_stdext::collections::groupingmap::Scope;
    use super::Value::{BeginGroup, EndGroup, Letter, Other, Superscript};

    const SPACE: Value = Value::Space(' ');

    /// What a test expects; control sequences are named rather than interned.
    enum Want {
        Cs(&'static str),
        Token(Value),
    }

    impl From<Value> for Want {
        fn from(value: Value) -> Self {
            Want::Token(value)
        }
    }

    fn cs(name: &'static str) -> Want {
        Want::Cs(name)
    }

    fn describe(value: &Value, interner: &CsNameInterner) -> String {
        match value {
            Value::CommandRef(command_ref) => command_ref.to_string(interner),
            other => format!("{other:?}"),
        }
    }

    fn test_codes() -> Codes {
        let mut codes = Codes::new(CatCodeDefaults::PlainTex);
        codes.set_cat_code('X', CatCode::EndOfLine, Scope::Local);
        codes.set_cat_code('Y', CatCode::Space, Scope::Local);
        codes.set_cat_code('Z', CatCode::Ignored, Scope::Local);
        codes
    }

    fn run(input: &str, end_line_char: i32) -> Result<(Vec<Value>, CsNameInterner), Box<Error>> {
        let mut lexer = Lexer::default();
        lexer.push_source(input, trace::KeyRange::empty());
        let codes = test_codes();
        let mut interner = CsNameInterner::default();
        let mut values = vec![];
        while let Some(token) = lexer.next(&codes, end_line_char, &mut interner)? {
            values.push(token.value());
        }
        Ok((values, interner))
    }

    fn check(input: &str, want: Vec<Want>) {
        let (values, interner) = run(input, 13).unwrap();
        let got: Vec<String> = values.iter().map(|v| describe(v, &interner)).collect();
        let want: Vec<String> = want
            .into_iter()
            .map(|w| match w {
                Want::Cs(name) => format!("\\{name}"),
                Want::Token(value) => describe(&value, &interner),
            })
            .collect();
        assert_eq!(got, want, "input: {input:?}");
    }

    macro_rules! lexer_tests {
        ($( ($name: ident, $input: expr, [ $( $want: expr ),* $(,)? ]), )+) => {
            $(
            #[test]
            fn $name() {
                check($input, vec![ $( Want::from($want) ),* ]);
            }
            )+
        };
    }

    lexer_tests![
        (control_word_then_group, r"\a{b}", [cs("a"), BeginGroup('{'), Letter('b'), EndGroup('}'), SPACE]),
        (space_after_control_word_skipped, r"\a b", [cs("a"), Letter('b'), SPACE]),
        (spaces_after_control_word_skipped, "\\a  b", [cs("a"), Letter('b'), SPACE]),
        (newline_after_control_word_skipped, "\\a\n b", [cs("a"), Letter('b'), SPACE]),
        (multi_letter_name, "\\ABC", [cs("ABC")]),
        (control_symbol_keeps_spaces, "\\{ {", [cs("{"), SPACE, BeginGroup('{'), SPACE]),
        (control_space_skips_spaces, "\\  a", [cs(" "), Letter('a'), SPACE]),
        (control_symbol_at_end_of_line, "\\\n", [cs("\r")]),
        (spaces_collapse, "a   b", [Letter('a'), SPACE, Letter('b'), SPACE]),
        (leading_spaces_skipped, "   a", [Letter('a'), SPACE]),
        (blank_line_is_par, "a\n\nb", [Letter('a'), SPACE, cs("par"), Letter('b'), SPACE]),
        (blank_line_with_spaces_is_par, "a\n   \nb", [Letter('a'), SPACE, cs("par"), Letter('b'), SPACE]),
        (comment_dropped, "A%ignored\nC", [Letter('A'), Letter('C'), SPACE]),
        (comment_after_control_word, "\\a%\nb", [cs("a"), Letter('b'), SPACE]),
        (end_of_line_character_discards_rest_of_line, "aXbc\nd", [Letter('a'), SPACE, Letter('d'), SPACE]),
        (custom_space_character, "aYb", [Letter('a'), SPACE, Letter('b'), SPACE]),
        (ignored_character, "aZb", [Letter('a'), Letter('b'), SPACE]),
        (trio_hex, "^^41b", [Letter('A'), Letter('b'), SPACE]),
        (trio_minus_64, "^^a", [Other('!'), SPACE]),
        (trio_inside_control_word, "\\a^^62c d", [cs("abc"), Letter('d'), SPACE]),
        (trio_ends_control_word, "\\a^^5b", [cs("a"), Other('['), SPACE]),
        (truncated_trio_not_decoded, "a^^", [Letter('a'), Superscript('^'), Superscript('^'), SPACE]),
        (trio_produces_trio, "^^5e^5e", [Superscript('^'), SPACE]),
    ];

    #[test]
    fn no_end_line_char() {
        let (got, _) = run("a\nb\n", -1).unwrap();
        assert_eq!(got, vec![Letter('a'), Letter('b')]);
    }

    #[test]
    fn invalid_character() {
        let got = run("a\x7Fb", 13);
        assert!(matches!(
            got.map_err(|err| *err),
            Err(Error::InvalidCharacter { character: '\x7F', .. })
        ));
    }

    #[test]
    fn catcode_change_applies_to_next_token() {
        let mut lexer = Lexer::default();
        lexer.push_source("AB", trace::KeyRange::empty());
        let mut codes = test_codes();
        let mut interner = CsNameInterner::default();
        let first = lexer.next(&codes, 13, &mut interner).unwrap().unwrap();
        assert_eq!(first.value(), Letter('A'));
        codes.set_cat_code('B', CatCode::Other, Scope::Local);
        let second = lexer.next(&codes, 13, &mut interner).unwrap().unwrap();
        assert_eq!(second.value(), Other('B'));
    }
}
