//! Configuration of the pipeline.
//!
//! All fields have defaults, so with the `serde` feature a configuration file only
//! needs to name the fields it changes:
//!
//! ```
//! # #[cfg(feature = "serde")]
//! # {
//! let config: texfront::Config = serde_json::from_str(r#"{"end_line_char": -1}"#).unwrap();
//! assert_eq!(config.end_line_char, -1);
//! assert!(config.csname_defines_relax);
//! # }
//! ```

/// Which table of category codes the run starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CatCodeDefaults {
    /// The category codes TeX starts with before any format is loaded.
    #[default]
    Initex,
    /// The category codes set by plain.tex.
    PlainTex,
}

/// Configuration of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Config {
    /// Initial category code table.
    pub cat_codes: CatCodeDefaults,
    /// Initial value of `\endlinechar`.
    pub end_line_char: i32,
    /// Initial value of `\escapechar`.
    pub escape_char: i32,
    /// Whether `\csname` of an undefined name defines it locally to be `\relax`, as TeX does.
    pub csname_defines_relax: bool,
    /// Whether macros are expanded while skipping the false branch of a conditional.
    pub expand_while_skipping: bool,
    /// Maximum number of nested macro expansions before the run is aborted.
    pub max_expansion_depth: usize,
    /// Whether to record which macro call produced each token, for error messages.
    pub trace_expansions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cat_codes: CatCodeDefaults::Initex,
            end_line_char: 13,
            escape_char: '\\' as i32,
            csname_defines_relax: true,
            expand_while_skipping: true,
            max_expansion_depth: 10_000,
            trace_expansions: false,
        }
    }
}

impl Config {
    /// Configuration with the category codes of plain TeX.
    pub fn plain_tex() -> Self {
        Config {
            cat_codes: CatCodeDefaults::PlainTex,
            ..Default::default()
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn deserialize_partial() {
        let got: Config =
            serde_json::from_str(r#"{"cat_codes": "plain_tex", "expand_while_skipping": false}"#)
                .unwrap();
        let want = Config {
            expand_while_skipping: false,
            ..Config::plain_tex()
        };
        assert_eq!(got, want);
    }

    #[test]
    fn serialize_round_trip() {
        let config = Config {
            max_expansion_depth: 12,
            trace_expansions: true,
            ..Default::default()
        };
        let s = serde_json::to_string(&config).unwrap();
        let got: Config = serde_json::from_str(&s).unwrap();
        assert_eq!(got, config);
    }

    #[test]
    fn unknown_cat_code_table() {
        let got: Result<Config, _> = serde_json::from_str(r#"{"cat_codes": "latex"}"#);
        assert!(got.is_err());
    }
}
