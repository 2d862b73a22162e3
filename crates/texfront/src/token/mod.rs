//! TeX tokens and category codes.

mod catcode;
pub mod lexer;
pub mod reader;
pub mod trace;
pub use catcode::CatCode;
use std::num;
use texfront_stdext::collections::interner;

/// String type used to represent control sequence names.
///
/// The implementation of this type is opaque so that it can be performance optimized
/// without worrying about downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CsName(num::NonZeroU32);

/// String interner for control sequence names.
pub type CsNameInterner = interner::Interner<CsName>;

impl interner::Key for CsName {
    fn try_from_usize(index: usize) -> Option<Self> {
        num::NonZeroU32::try_from_usize(index).map(CsName)
    }

    fn into_usize(self) -> usize {
        self.0.into_usize()
    }
}

/// The value of a token.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    BeginGroup(char),
    EndGroup(char),
    MathShift(char),
    AlignmentTab(char),
    Parameter(char),
    Superscript(char),
    Subscript(char),
    Space(char),
    Letter(char),
    Other(char),
    CommandRef(CommandRef),
}

/// The value of a token that references a command.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandRef {
    ControlSequence(CsName),
    ActiveCharacter(char),
    /// A command whose meaning cannot be changed by the user.
    Frozen(Frozen),
}

/// Commands with a fixed meaning that are inserted by the engine itself.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frozen {
    /// Inserted when a conditional ends while its condition is still being read.
    Relax,
    /// Marks the end of an alignment cell.
    EndTemplate,
}

impl CommandRef {
    pub fn to_string(&self, interner: &CsNameInterner) -> String {
        match self {
            CommandRef::ControlSequence(cs_name) => {
                format!("\\{}", interner.resolve(*cs_name).unwrap_or("<unknown>"))
            }
            CommandRef::ActiveCharacter(c) => format!("{c}"),
            CommandRef::Frozen(Frozen::Relax) => "\\relax".to_string(),
            CommandRef::Frozen(Frozen::EndTemplate) => "\\endtemplate".to_string(),
        }
    }
}

impl Value {
    /// Builds the value of a character token.
    ///
    /// Returns [None] for categories that never leave the lexer.
    pub fn new(c: char, cat_code: CatCode) -> Option<Value> {
        Some(match cat_code {
            CatCode::BeginGroup => Value::BeginGroup(c),
            CatCode::EndGroup => Value::EndGroup(c),
            CatCode::MathShift => Value::MathShift(c),
            CatCode::AlignmentTab => Value::AlignmentTab(c),
            CatCode::Parameter => Value::Parameter(c),
            CatCode::Superscript => Value::Superscript(c),
            CatCode::Subscript => Value::Subscript(c),
            CatCode::Space => Value::Space(c),
            CatCode::Letter => Value::Letter(c),
            CatCode::Other => Value::Other(c),
            CatCode::Active => Value::CommandRef(CommandRef::ActiveCharacter(c)),
            _ => return None,
        })
    }

    /// Returns the character and category of a character value.
    pub fn char_and_cat_code(&self) -> Option<(char, CatCode)> {
        Some(match *self {
            Value::BeginGroup(c) => (c, CatCode::BeginGroup),
            Value::EndGroup(c) => (c, CatCode::EndGroup),
            Value::MathShift(c) => (c, CatCode::MathShift),
            Value::AlignmentTab(c) => (c, CatCode::AlignmentTab),
            Value::Parameter(c) => (c, CatCode::Parameter),
            Value::Superscript(c) => (c, CatCode::Superscript),
            Value::Subscript(c) => (c, CatCode::Subscript),
            Value::Space(c) => (c, CatCode::Space),
            Value::Letter(c) => (c, CatCode::Letter),
            Value::Other(c) => (c, CatCode::Other),
            Value::CommandRef(CommandRef::ActiveCharacter(c)) => (c, CatCode::Active),
            Value::CommandRef(_) => return None,
        })
    }
}

/// A TeX token.
///
/// Equality only considers the value of the token, not where it came from.
#[derive(Debug, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    value: Value,
    trace_key: trace::Key,
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl std::hash::Hash for Token {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

macro_rules! token_constructor {
    ($name: ident, $value: expr) => {
        pub fn $name(c: char, trace_key: trace::Key) -> Token {
            Token {
                value: $value(c),
                trace_key,
            }
        }
    };
}

impl Token {
    token_constructor!(new_begin_group, Value::BeginGroup);
    token_constructor!(new_end_group, Value::EndGroup);
    token_constructor!(new_parameter, Value::Parameter);
    token_constructor!(new_space, Value::Space);
    token_constructor!(new_letter, Value::Letter);
    token_constructor!(new_other, Value::Other);

    pub fn new_control_sequence(name: CsName, trace_key: trace::Key) -> Token {
        Token {
            value: Value::CommandRef(CommandRef::ControlSequence(name)),
            trace_key,
        }
    }

    pub fn new_frozen(frozen: Frozen, trace_key: trace::Key) -> Token {
        Token {
            value: Value::CommandRef(CommandRef::Frozen(frozen)),
            trace_key,
        }
    }

    pub fn new_from_value(value: Value, trace_key: trace::Key) -> Token {
        Token { value, trace_key }
    }

    #[inline]
    pub fn value(&self) -> Value {
        self.value
    }

    #[inline]
    pub fn trace_key(&self) -> trace::Key {
        self.trace_key
    }

    pub fn char(&self) -> Option<char> {
        self.value.char_and_cat_code().map(|(c, _)| c)
    }

    pub fn cat_code(&self) -> Option<CatCode> {
        self.value.char_and_cat_code().map(|(_, code)| code)
    }

    pub fn command_ref(&self) -> Option<CommandRef> {
        match self.value {
            Value::CommandRef(command_ref) => Some(command_ref),
            _ => None,
        }
    }

    /// Returns a token with the same origin and a different value.
    pub fn with_value(&self, value: Value) -> Token {
        Token {
            value,
            trace_key: self.trace_key,
        }
    }

    /// Human readable description used in error messages.
    pub fn describe(&self, interner: &CsNameInterner) -> String {
        match self.value {
            Value::Letter(c) => format!["the letter {c}"],
            Value::Other(c) => format!["the non-letter character {c}"],
            Value::Space(_) => "a space".to_string(),
            Value::CommandRef(command_ref @ CommandRef::ActiveCharacter(_)) => {
                format!["the active character {}", command_ref.to_string(interner)]
            }
            Value::CommandRef(command_ref) => {
                format!["the control sequence {}", command_ref.to_string(interner)]
            }
            _ => match self.value.char_and_cat_code() {
                Some((c, code)) => format!["the character {c} with category code {code}"],
                None => "a token".to_string(),
            },
        }
    }
}

/// Write a collection of tokens to a string.
///
/// Control words are followed by a space when the next token is a letter,
/// so the output lexes back to the same tokens.
pub fn write_tokens<'a, T>(tokens: T, interner: &CsNameInterner) -> String
where
    T: IntoIterator<Item = &'a Token>,
{
    let mut s = String::new();
    let mut after_control_word = false;
    for token in tokens {
        match token.value {
            Value::CommandRef(command_ref) => {
                let name = command_ref.to_string(interner);
                after_control_word = match command_ref {
                    CommandRef::ActiveCharacter(_) => false,
                    _ => {
                        let mut chars = name.chars().skip(1);
                        chars.clone().next().is_some() && chars.all(char::is_alphabetic)
                    }
                };
                s.push_str(&name);
            }
            _ => {
                if let Some(c) = token.char() {
                    if after_control_word && token.cat_code() == Some(CatCode::Letter) {
                        s.push(' ');
                    }
                    s.push(c);
                }
                after_control_word = false;
            }
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_tokens_separates_control_words_from_letters() {
        let mut interner = CsNameInterner::default();
        let key = trace::Key::dummy();
        let relax = interner.get_or_intern("relax").unwrap();
        let tokens = vec![
            Token::new_control_sequence(relax, key),
            Token::new_letter('a', key),
            Token::new_control_sequence(relax, key),
            Token::new_other('1', key),
        ];
        assert_eq!(write_tokens(&tokens, &interner), r"\relax a\relax1");
    }

    #[test]
    fn tokens_compare_by_value_only() {
        let a = Token::new_letter('a', trace::Key::dummy());
        let b = Token::new_letter('a', trace::Key::for_testing(3));
        assert_eq!(a, b);
        assert_ne!(a, Token::new_other('a', trace::Key::dummy()));
    }
}
