//! TeX's named parameters.
//!
//! Parameters are built-in variables like `\tolerance` or `\parindent`.
//! Each has a name, a type and an initial value (TeX.2021.236-247).
//! The date and time parameters start at the fixed values TeX.2021.241
//! gives for systems without a clock.

use crate::config::Config;
use crate::token::Token;
use texfront_core::{Glue, Scaled};
use texfront_stdext::collections::groupingmap::{GroupingHashMap, NoGroupToEndError, Scope};

macro_rules! parameters {
    (
        $enum_name: ident,
        $( $variant: ident => $name: expr, )+
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $enum_name {
            $( $variant, )+
        }

        impl $enum_name {
            pub const ALL: &'static [$enum_name] = &[ $( $enum_name::$variant, )+ ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( $enum_name::$variant => $name, )+
                }
            }
        }
    };
}

parameters![
    IntegerParameter,
    PreTolerance => "pretolerance",
    Tolerance => "tolerance",
    LinePenalty => "linepenalty",
    HyphenPenalty => "hyphenpenalty",
    ExHyphenPenalty => "exhyphenpenalty",
    ClubPenalty => "clubpenalty",
    WidowPenalty => "widowpenalty",
    BrokenPenalty => "brokenpenalty",
    BinOpPenalty => "binoppenalty",
    RelPenalty => "relpenalty",
    InterLinePenalty => "interlinepenalty",
    DoubleHyphenDemerits => "doublehyphendemerits",
    FinalHyphenDemerits => "finalhyphendemerits",
    AdjDemerits => "adjdemerits",
    Mag => "mag",
    Looseness => "looseness",
    HangAfter => "hangafter",
    Time => "time",
    Day => "day",
    Month => "month",
    Year => "year",
    ShowBoxBreadth => "showboxbreadth",
    ShowBoxDepth => "showboxdepth",
    HBadness => "hbadness",
    VBadness => "vbadness",
    Pausing => "pausing",
    TracingOnline => "tracingonline",
    TracingMacros => "tracingmacros",
    TracingCommands => "tracingcommands",
    Language => "language",
    UcHyph => "uchyph",
    LeftHyphenMin => "lefthyphenmin",
    RightHyphenMin => "righthyphenmin",
    GlobalDefs => "globaldefs",
    Fam => "fam",
    EscapeChar => "escapechar",
    DefaultHyphenChar => "defaulthyphenchar",
    DefaultSkewChar => "defaultskewchar",
    EndLineChar => "endlinechar",
    NewLineChar => "newlinechar",
    MaxDeadCycles => "maxdeadcycles",
    HoldingInserts => "holdinginserts",
    ErrorContextLines => "errorcontextlines",
];

parameters![
    DimensionParameter,
    ParIndent => "parindent",
    MathSurround => "mathsurround",
    LineSkipLimit => "lineskiplimit",
    HSize => "hsize",
    VSize => "vsize",
    MaxDepth => "maxdepth",
    SplitMaxDepth => "splitmaxdepth",
    BoxMaxDepth => "boxmaxdepth",
    HFuzz => "hfuzz",
    VFuzz => "vfuzz",
    DelimiterShortfall => "delimitershortfall",
    NullDelimiterSpace => "nulldelimiterspace",
    ScriptSpace => "scriptspace",
    PreDisplaySize => "predisplaysize",
    DisplayWidth => "displaywidth",
    DisplayIndent => "displayindent",
    OverfullRule => "overfullrule",
    HangIndent => "hangindent",
    HOffset => "hoffset",
    VOffset => "voffset",
    EmergencyStretch => "emergencystretch",
];

parameters![
    GlueParameter,
    LineSkip => "lineskip",
    BaselineSkip => "baselineskip",
    ParSkip => "parskip",
    AboveDisplaySkip => "abovedisplayskip",
    BelowDisplaySkip => "belowdisplayskip",
    AboveDisplayShortSkip => "abovedisplayshortskip",
    BelowDisplayShortSkip => "belowdisplayshortskip",
    LeftSkip => "leftskip",
    RightSkip => "rightskip",
    TopSkip => "topskip",
    SplitTopSkip => "splittopskip",
    TabSkip => "tabskip",
    SpaceSkip => "spaceskip",
    XSpaceSkip => "xspaceskip",
    ParFillSkip => "parfillskip",
];

parameters![
    TokenListParameter,
    Output => "output",
    EveryPar => "everypar",
    EveryMath => "everymath",
    EveryDisplay => "everydisplay",
    EveryHBox => "everyhbox",
    EveryVBox => "everyvbox",
    EveryJob => "everyjob",
    EveryCr => "everycr",
    ErrHelp => "errhelp",
];

impl IntegerParameter {
    fn initial_value(&self, config: &Config) -> i32 {
        match self {
            IntegerParameter::Mag => 1000,
            IntegerParameter::Tolerance => 10000,
            // 12:00 on 4 July 1776.
            IntegerParameter::Time => 12 * 60,
            IntegerParameter::Day => 4,
            IntegerParameter::Month => 7,
            IntegerParameter::Year => 1776,
            IntegerParameter::MaxDeadCycles => 25,
            IntegerParameter::HangAfter => 1,
            IntegerParameter::EscapeChar => config.escape_char,
            IntegerParameter::EndLineChar => config.end_line_char,
            IntegerParameter::NewLineChar => -1,
            _ => 0,
        }
    }
}

/// A parameter of any type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parameter {
    Integer(IntegerParameter),
    Dimension(DimensionParameter),
    Glue(GlueParameter),
    TokenList(TokenListParameter),
}

impl Parameter {
    /// Every parameter, with the name it is installed under.
    pub fn all() -> impl Iterator<Item = Parameter> {
        IntegerParameter::ALL
            .iter()
            .copied()
            .map(Parameter::Integer)
            .chain(DimensionParameter::ALL.iter().copied().map(Parameter::Dimension))
            .chain(GlueParameter::ALL.iter().copied().map(Parameter::Glue))
            .chain(TokenListParameter::ALL.iter().copied().map(Parameter::TokenList))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Integer(p) => p.name(),
            Parameter::Dimension(p) => p.name(),
            Parameter::Glue(p) => p.name(),
            Parameter::TokenList(p) => p.name(),
        }
    }
}

/// Current values of all parameters.
#[derive(Debug)]
pub struct Parameters {
    integers: GroupingHashMap<IntegerParameter, i32>,
    dimensions: GroupingHashMap<DimensionParameter, Scaled>,
    glues: GroupingHashMap<GlueParameter, Glue>,
    token_lists: GroupingHashMap<TokenListParameter, Vec<Token>>,
}

impl Parameters {
    pub fn new(config: &Config) -> Parameters {
        Parameters {
            integers: IntegerParameter::ALL
                .iter()
                .map(|p| (*p, p.initial_value(config)))
                .collect(),
            dimensions: Default::default(),
            glues: Default::default(),
            token_lists: Default::default(),
        }
    }

    pub fn integer(&self, p: IntegerParameter) -> i32 {
        self.integers.get(&p).copied().unwrap_or_default()
    }

    pub fn set_integer(&mut self, p: IntegerParameter, value: i32, scope: Scope) {
        self.integers.insert(p, value, scope);
    }

    pub fn dimension(&self, p: DimensionParameter) -> Scaled {
        self.dimensions.get(&p).copied().unwrap_or_default()
    }

    pub fn set_dimension(&mut self, p: DimensionParameter, value: Scaled, scope: Scope) {
        self.dimensions.insert(p, value, scope);
    }

    pub fn glue(&self, p: GlueParameter) -> Glue {
        self.glues.get(&p).copied().unwrap_or_default()
    }

    pub fn set_glue(&mut self, p: GlueParameter, value: Glue, scope: Scope) {
        self.glues.insert(p, value, scope);
    }

    pub fn token_list(&self, p: TokenListParameter) -> &[Token] {
        self.token_lists.get(&p).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn set_token_list(&mut self, p: TokenListParameter, value: Vec<Token>, scope: Scope) {
        self.token_lists.insert(p, value, scope);
    }

    pub fn begin_group(&mut self) {
        self.integers.begin_group();
        self.dimensions.begin_group();
        self.glues.begin_group();
        self.token_lists.begin_group();
    }

    pub fn end_group(&mut self) -> Result<(), NoGroupToEndError> {
        self.integers.end_group()?;
        self.dimensions.end_group()?;
        self.glues.end_group()?;
        self.token_lists.end_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<&str> = Parameter::all().map(|p| p.name()).collect();
        assert_eq!(names.len(), Parameter::all().count());
    }

    #[test]
    fn initial_values() {
        let config = Config {
            end_line_char: -1,
            ..Default::default()
        };
        let parameters = Parameters::new(&config);
        assert_eq!(parameters.integer(IntegerParameter::Mag), 1000);
        assert_eq!(parameters.integer(IntegerParameter::Year), 1776);
        assert_eq!(parameters.integer(IntegerParameter::EndLineChar), -1);
        assert_eq!(parameters.integer(IntegerParameter::EscapeChar), '\\' as i32);
        assert_eq!(parameters.dimension(DimensionParameter::HSize), Scaled::ZERO);
        assert!(parameters.token_list(TokenListParameter::EveryPar).is_empty());
    }

    #[test]
    fn local_assignment_is_undone() {
        let mut parameters = Parameters::new(&Default::default());
        parameters.begin_group();
        parameters.set_integer(IntegerParameter::Tolerance, 200, Scope::Local);
        parameters.set_dimension(DimensionParameter::HSize, Scaled::ONE, Scope::Global);
        assert_eq!(parameters.integer(IntegerParameter::Tolerance), 200);
        parameters.end_group().unwrap();
        assert_eq!(parameters.integer(IntegerParameter::Tolerance), 10000);
        assert_eq!(parameters.dimension(DimensionParameter::HSize), Scaled::ONE);
    }
}
