//! Scoped per-character code tables.
//!
//! TeX keeps six tables indexed by character: the category codes plus the
//! `\lccode`, `\uccode`, `\sfcode`, `\mathcode` and `\delcode` tables.
//! All six live in a single grouping map keyed by ([CodeKind], character), so
//! entering and leaving a group restores all of them at once.
//!
//! The global scope is populated for the characters 0 through 255.
//! Looking up any other character that has never been set signals
//! [Error::NotInScope], which the typed accessors absorb into TeX's defaults.

use crate::config::CatCodeDefaults;
use crate::error::Error;
use crate::token::CatCode;
use texfront_stdext::collections::groupingmap::{GroupingHashMap, NoGroupToEndError, Scope};

/// The kind of a per-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodeKind {
    Category,
    LowerCase,
    UpperCase,
    SpaceFactor,
    Math,
    Delimiter,
}

impl CodeKind {
    pub const ALL: [CodeKind; 6] = [
        CodeKind::Category,
        CodeKind::LowerCase,
        CodeKind::UpperCase,
        CodeKind::SpaceFactor,
        CodeKind::Math,
        CodeKind::Delimiter,
    ];

    /// Largest value that can be assigned to a code of this kind.
    ///
    /// TeX.2021.1232.
    pub fn max_value(&self) -> i32 {
        match self {
            CodeKind::Category => 15,
            CodeKind::LowerCase | CodeKind::UpperCase => 255,
            CodeKind::SpaceFactor => 0o77777,
            CodeKind::Math => 0o100000,
            CodeKind::Delimiter => 0o77777777,
        }
    }

    /// Smallest value that can be assigned to a code of this kind.
    pub fn min_value(&self) -> i32 {
        match self {
            CodeKind::Delimiter => i32::MIN,
            _ => 0,
        }
    }

    /// Value for a character outside of the populated range.
    fn fallback(&self, c: char) -> i32 {
        match self {
            CodeKind::Category => CatCode::Other as i32,
            CodeKind::LowerCase | CodeKind::UpperCase => 0,
            CodeKind::SpaceFactor => 1000,
            CodeKind::Math => c as i32,
            CodeKind::Delimiter => -1,
        }
    }
}

impl std::fmt::Display for CodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CodeKind::Category => "catcode",
            CodeKind::LowerCase => "lccode",
            CodeKind::UpperCase => "uccode",
            CodeKind::SpaceFactor => "sfcode",
            CodeKind::Math => "mathcode",
            CodeKind::Delimiter => "delcode",
        };
        write!(f, "{name}")
    }
}

/// The per-character code tables.
#[derive(Debug)]
pub struct Codes {
    map: GroupingHashMap<(CodeKind, char), i32>,
}

/// Value of a code in INITEX for one of the populated characters.
///
/// TeX.2021.232.
fn initial_value(kind: CodeKind, c: char, defaults: CatCodeDefaults) -> i32 {
    let u = c as u32;
    match kind {
        CodeKind::Category => match defaults {
            CatCodeDefaults::Initex => CatCode::initex_default(u) as i32,
            CatCodeDefaults::PlainTex => CatCode::plain_tex_default(u) as i32,
        },
        CodeKind::LowerCase => {
            if c.is_ascii_alphabetic() {
                c.to_ascii_lowercase() as i32
            } else {
                0
            }
        }
        CodeKind::UpperCase => {
            if c.is_ascii_alphabetic() {
                c.to_ascii_uppercase() as i32
            } else {
                0
            }
        }
        CodeKind::SpaceFactor => {
            if c.is_ascii_uppercase() {
                999
            } else {
                1000
            }
        }
        CodeKind::Math => {
            if c.is_ascii_digit() {
                u as i32 + 0x7000
            } else if c.is_ascii_alphabetic() {
                u as i32 + 0x7100
            } else {
                u as i32
            }
        }
        CodeKind::Delimiter => {
            if c == '.' {
                0
            } else {
                -1
            }
        }
    }
}

impl Codes {
    pub fn new(defaults: CatCodeDefaults) -> Codes {
        let mut map = GroupingHashMap::default();
        for kind in CodeKind::ALL {
            for c in (0_u8..=255).map(char::from) {
                map.insert((kind, c), initial_value(kind, c, defaults), Scope::Global);
            }
        }
        Codes { map }
    }

    /// Returns the current value of a code.
    pub fn get(&self, kind: CodeKind, c: char) -> Result<i32, Box<Error>> {
        self.map
            .get(&(kind, c))
            .copied()
            .ok_or_else(|| Box::new(Error::NotInScope { kind, character: c }))
    }

    pub fn set(&mut self, kind: CodeKind, c: char, value: i32, scope: Scope) {
        self.map.insert((kind, c), value, scope);
    }

    /// Returns the current value of a code, or TeX's default for unpopulated characters.
    pub fn get_or_default(&self, kind: CodeKind, c: char) -> i32 {
        self.get(kind, c).unwrap_or_else(|_| kind.fallback(c))
    }

    #[inline]
    pub fn cat_code(&self, c: char) -> CatCode {
        u8::try_from(self.get_or_default(CodeKind::Category, c))
            .ok()
            .and_then(|u| CatCode::try_from(u).ok())
            .unwrap_or_default()
    }

    pub fn set_cat_code(&mut self, c: char, cat_code: CatCode, scope: Scope) {
        self.set(CodeKind::Category, c, cat_code as i32, scope);
    }

    /// Lower case mapping of a character, or [None] if the character has no mapping.
    pub fn lower_case(&self, c: char) -> Option<char> {
        self.case_mapping(CodeKind::LowerCase, c)
    }

    /// Upper case mapping of a character, or [None] if the character has no mapping.
    pub fn upper_case(&self, c: char) -> Option<char> {
        self.case_mapping(CodeKind::UpperCase, c)
    }

    fn case_mapping(&self, kind: CodeKind, c: char) -> Option<char> {
        match self.get_or_default(kind, c) {
            0 => None,
            u => u32::try_from(u).ok().and_then(char::from_u32),
        }
    }

    pub fn begin_group(&mut self) {
        self.map.begin_group();
    }

    pub fn end_group(&mut self) -> Result<(), NoGroupToEndError> {
        self.map.end_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let codes = Codes::new(CatCodeDefaults::Initex);
        assert_eq!(codes.cat_code('\\'), CatCode::Escape);
        assert_eq!(codes.cat_code('{'), CatCode::Other);
        assert_eq!(codes.get(CodeKind::LowerCase, 'Q').unwrap(), 'q' as i32);
        assert_eq!(codes.get(CodeKind::SpaceFactor, 'Q').unwrap(), 999);
        assert_eq!(codes.get(CodeKind::Math, '1').unwrap(), 0x7031);
        assert_eq!(codes.get(CodeKind::Delimiter, '.').unwrap(), 0);
    }

    #[test]
    fn not_in_scope_is_absorbed() {
        let codes = Codes::new(CatCodeDefaults::PlainTex);
        let c = 'λ';
        assert!(matches!(
            codes.get(CodeKind::Category, c).map_err(|err| *err),
            Err(Error::NotInScope { .. })
        ));
        assert_eq!(codes.cat_code(c), CatCode::Other);
        assert_eq!(codes.get_or_default(CodeKind::SpaceFactor, c), 1000);
        assert_eq!(codes.get_or_default(CodeKind::Delimiter, c), -1);
        assert_eq!(codes.get_or_default(CodeKind::Math, c), c as i32);
        assert_eq!(codes.upper_case(c), None);
    }

    #[test]
    fn local_value_restored_after_group() {
        let mut codes = Codes::new(CatCodeDefaults::PlainTex);
        codes.begin_group();
        codes.set_cat_code('@', CatCode::Letter, Scope::Local);
        codes.set(CodeKind::UpperCase, 'λ', 'Λ' as i32, Scope::Local);
        assert_eq!(codes.cat_code('@'), CatCode::Letter);
        assert_eq!(codes.upper_case('λ'), Some('Λ'));
        codes.end_group().unwrap();
        assert_eq!(codes.cat_code('@'), CatCode::Other);
        assert_eq!(codes.upper_case('λ'), None);
    }

    #[test]
    fn global_value_survives_group() {
        let mut codes = Codes::new(CatCodeDefaults::PlainTex);
        codes.begin_group();
        codes.set_cat_code('@', CatCode::Letter, Scope::Global);
        codes.end_group().unwrap();
        assert_eq!(codes.cat_code('@'), CatCode::Letter);
    }
}
