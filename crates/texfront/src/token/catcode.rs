//! Category codes.
use CatCode::*;

/// The 16 category codes of TeX.
///
/// Each variant's documentation gives a character that has that category in plain TeX.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatCode {
    /// Starts a control sequence: `\`.
    ///
    /// Never seen outside of the lexer.
    Escape = 0,
    /// `{`
    BeginGroup = 1,
    /// `}`
    EndGroup = 2,
    /// `$`
    MathShift = 3,
    /// `&`
    AlignmentTab = 4,
    /// The end of a line, ASCII carriage return.
    ///
    /// Never seen outside of the lexer.
    EndOfLine = 5,
    /// `#`
    Parameter = 6,
    /// `^`
    Superscript = 7,
    /// `_`
    Subscript = 8,
    /// Dropped by the lexer. ASCII null.
    Ignored = 9,
    /// ` `
    Space = 10,
    /// `[a-zA-Z]`
    Letter = 11,
    /// `@`, and every character without another category.
    #[default]
    Other = 12,
    /// A single character that behaves like a control sequence: `~`.
    Active = 13,
    /// `%`. Everything up to the end of the line is dropped.
    Comment = 14,
    /// The lexer returns an error when it sees one of these. ASCII delete.
    Invalid = 15,
}

impl TryFrom<u8> for CatCode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Escape,
            1 => BeginGroup,
            2 => EndGroup,
            3 => MathShift,
            4 => AlignmentTab,
            5 => EndOfLine,
            6 => Parameter,
            7 => Superscript,
            8 => Subscript,
            9 => Ignored,
            10 => Space,
            11 => Letter,
            12 => Other,
            13 => Active,
            14 => Comment,
            15 => Invalid,
            _ => return Err(()),
        })
    }
}

impl std::fmt::Display for CatCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({})", self, *self as u8)
    }
}

impl CatCode {
    /// Category code of a character in INITEX.
    ///
    /// TeX.2021.232 and the TeXBook p343.
    pub fn initex_default(c: u32) -> CatCode {
        match c {
            0 => Ignored,
            13 => EndOfLine,
            32 => Space,
            37 => Comment,
            92 => Escape,
            127 => Invalid,
            65..=90 | 97..=122 => Letter,
            _ => Other,
        }
    }

    /// Category code of a character after plain.tex has been loaded.
    pub fn plain_tex_default(c: u32) -> CatCode {
        match c {
            0x7B => BeginGroup,
            0x7D => EndGroup,
            0x24 => MathShift,
            0x26 => AlignmentTab,
            0x23 => Parameter,
            0x5E | 0x0B => Superscript,
            0x5F | 0x01 => Subscript,
            0x09 => Space,
            0x7E | 0x0C => Active,
            _ => CatCode::initex_default(c),
        }
    }

    /// Whether tokens with this category can only exist inside the lexer.
    pub fn is_raw(&self) -> bool {
        matches!(self, Escape | EndOfLine | Ignored | Comment | Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_through_u8() {
        for i in 0_u8..16 {
            let code = CatCode::try_from(i).unwrap();
            assert_eq!(code as u8, i);
        }
        assert_eq!(CatCode::try_from(16), Err(()));
    }

    #[test]
    fn plain_tex_differs_from_initex() {
        assert_eq!(CatCode::initex_default('{' as u32), Other);
        assert_eq!(CatCode::plain_tex_default('{' as u32), BeginGroup);
        assert_eq!(CatCode::plain_tex_default('a' as u32), Letter);
        assert_eq!(CatCode::plain_tex_default('\\' as u32), Escape);
    }
}
