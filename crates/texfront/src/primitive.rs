//! The closed set of primitive commands.

macro_rules! primitives {
    ( $( $variant: ident => $name: expr, )+ ) => {
        /// A primitive command.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Primitive {
            $( $variant, )+
        }

        impl Primitive {
            /// All primitives, in the order they are installed in the router.
            pub const ALL: &'static [Primitive] = &[ $( Primitive::$variant, )+ ];

            /// The control sequence name the primitive is installed under.
            pub fn name(&self) -> &'static str {
                match self {
                    $( Primitive::$variant => $name, )+
                }
            }
        }
    };
}

primitives![
    // Expandable.
    ExpandAfter => "expandafter",
    NoExpand => "noexpand",
    CsName => "csname",
    String => "string",
    Number => "number",
    RomanNumeral => "romannumeral",
    The => "the",
    Input => "input",
    IfTrue => "iftrue",
    IfFalse => "iffalse",
    IfNum => "ifnum",
    IfDim => "ifdim",
    IfOdd => "ifodd",
    IfCase => "ifcase",
    IfX => "ifx",
    If => "if",
    IfCat => "ifcat",
    IfVMode => "ifvmode",
    IfHMode => "ifhmode",
    IfMMode => "ifmmode",
    IfInner => "ifinner",
    Else => "else",
    Or => "or",
    Fi => "fi",
    // Handled by the banisher when they reach the parser.
    Def => "def",
    GDef => "gdef",
    EDef => "edef",
    XDef => "xdef",
    Let => "let",
    FutureLet => "futurelet",
    Uppercase => "uppercase",
    Lowercase => "lowercase",
    // Prefixes.
    Global => "global",
    Long => "long",
    Outer => "outer",
    // Assignments.
    Count => "count",
    Dimen => "dimen",
    Skip => "skip",
    Toks => "toks",
    SetBox => "setbox",
    CharDef => "chardef",
    CountDef => "countdef",
    DimenDef => "dimendef",
    SkipDef => "skipdef",
    ToksDef => "toksdef",
    Advance => "advance",
    Multiply => "multiply",
    Divide => "divide",
    CatCode => "catcode",
    LcCode => "lccode",
    UcCode => "uccode",
    SfCode => "sfcode",
    MathCode => "mathcode",
    DelCode => "delcode",
    Font => "font",
    NullFont => "nullfont",
    // Everything else.
    EndCsName => "endcsname",
    BeginGroup => "begingroup",
    EndGroup => "endgroup",
    Box => "box",
    Copy => "copy",
    HBox => "hbox",
    VBox => "vbox",
    VTop => "vtop",
    HRule => "hrule",
    VRule => "vrule",
    HSkip => "hskip",
    VSkip => "vskip",
    HFil => "hfil",
    HFill => "hfill",
    HSs => "hss",
    HFilNeg => "hfilneg",
    VFil => "vfil",
    VFill => "vfill",
    VSs => "vss",
    VFilNeg => "vfilneg",
    Kern => "kern",
    Penalty => "penalty",
    Message => "message",
    Write => "write",
    Accent => "accent",
    Discretionary => "discretionary",
    DiscretionaryHyphen => "-",
    HAlign => "halign",
    VAlign => "valign",
    Cr => "cr",
    CrCr => "crcr",
    Char => "char",
    Par => "par",
    Indent => "indent",
    NoIndent => "noindent",
    Relax => "relax",
    End => "end",
    ControlSpace => " ",
];

impl Primitive {
    /// Whether the banisher expands this primitive rather than passing it on.
    pub fn is_expandable(&self) -> bool {
        use Primitive::*;
        matches!(
            self,
            ExpandAfter
                | NoExpand
                | CsName
                | String
                | Number
                | RomanNumeral
                | The
                | Input
                | Else
                | Or
                | Fi
        ) || self.is_conditional()
    }

    /// Whether this primitive opens a conditional.
    pub fn is_conditional(&self) -> bool {
        use Primitive::*;
        matches!(
            self,
            IfTrue
                | IfFalse
                | IfNum
                | IfDim
                | IfOdd
                | IfCase
                | IfX
                | If
                | IfCat
                | IfVMode
                | IfHMode
                | IfMMode
                | IfInner
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<&str> = Primitive::ALL.iter().map(Primitive::name).collect();
        assert_eq!(names.len(), Primitive::ALL.len());
    }

    #[test]
    fn conditionals_are_expandable() {
        assert!(Primitive::IfCase.is_expandable());
        assert!(Primitive::Fi.is_expandable());
        assert!(!Primitive::Fi.is_conditional());
        assert!(!Primitive::Def.is_expandable());
    }
}
