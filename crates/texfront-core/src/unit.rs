/// A physical unit that a dimension can be written in.
///
/// TeX.2021.458; see also chapter 10 of the TeXbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScaledUnit {
    Point,
    Pica,
    Inch,
    BigPoint,
    Centimeter,
    Millimeter,
    DidotPoint,
    Cicero,
    ScaledPoint,
}

impl ScaledUnit {
    /// Every unit keyed by its keyword, in the order TeX tries them.
    pub const ALL: [(&'static str, ScaledUnit); 9] = [
        ("pt", ScaledUnit::Point),
        ("in", ScaledUnit::Inch),
        ("pc", ScaledUnit::Pica),
        ("cm", ScaledUnit::Centimeter),
        ("mm", ScaledUnit::Millimeter),
        ("bp", ScaledUnit::BigPoint),
        ("dd", ScaledUnit::DidotPoint),
        ("cc", ScaledUnit::Cicero),
        ("sp", ScaledUnit::ScaledPoint),
    ];

    /// Looks up a unit by keyword, e.g. `"cm"`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find_map(|(keyword, unit)| (keyword == s).then_some(unit))
    }

    /// Returns _(n, d)_ such that _x_ of this unit equals _xn/d_ points.
    pub fn conversion_fraction(&self) -> (i32, i32) {
        match self {
            ScaledUnit::Point => (1, 1),
            ScaledUnit::Pica => (12, 1),
            ScaledUnit::Inch => (7227, 100),
            ScaledUnit::BigPoint => (7227, 7200),
            ScaledUnit::Centimeter => (7227, 254),
            ScaledUnit::Millimeter => (7227, 2540),
            ScaledUnit::DidotPoint => (1238, 1157),
            ScaledUnit::Cicero => (14856, 1157),
            ScaledUnit::ScaledPoint => (1, 1 << 16),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keywords() {
        assert_eq!(ScaledUnit::parse("pc"), Some(ScaledUnit::Pica));
        assert_eq!(ScaledUnit::parse("sp"), Some(ScaledUnit::ScaledPoint));
        assert_eq!(ScaledUnit::parse("px"), None);
    }
}
