use crate::Scaled;

/// Stretchable space (TeX.2021.150).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glue {
    pub width: Scaled,
    pub stretch: Scaled,
    pub stretch_order: GlueOrder,
    pub shrink: Scaled,
    pub shrink_order: GlueOrder,
}

impl Glue {
    /// Rigid glue of the given width.
    pub fn from_width(width: Scaled) -> Glue {
        Glue {
            width,
            ..Default::default()
        }
    }

    /// `0pt plus 1<order>`, the glue behind `\hfil` and friends.
    pub fn infinite_stretch(order: GlueOrder) -> Glue {
        Glue {
            stretch: Scaled::ONE,
            stretch_order: order,
            ..Default::default()
        }
    }
}

impl std::ops::Neg for Glue {
    type Output = Glue;
    fn neg(self) -> Glue {
        Glue {
            width: -self.width,
            stretch: -self.stretch,
            shrink: -self.shrink,
            ..self
        }
    }
}

/// Formats like `\the` does, e.g. `3.0pt plus 1.0fil minus 2.0pt` (TeX.2021.178).
impl std::fmt::Display for Glue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.width)?;
        for (keyword, amount, order) in [
            ("plus", self.stretch, self.stretch_order),
            ("minus", self.shrink, self.shrink_order),
        ] {
            if amount == Scaled::ZERO {
                continue;
            }
            match order {
                GlueOrder::Normal => write!(f, " {keyword} {amount}")?,
                _ => {
                    let amount = amount.to_string();
                    let number = amount.strip_suffix("pt").unwrap_or(&amount);
                    write!(f, " {keyword} {number}{order}")?
                }
            }
        }
        Ok(())
    }
}

/// How infinite a stretch or shrink component is.
///
/// When a list contains glue of some infinite order, only the components of
/// the highest order present take part in stretching or shrinking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GlueOrder {
    #[default]
    Normal,
    Fil,
    Fill,
    Filll,
}

impl GlueOrder {
    /// The keyword for this order; empty for [GlueOrder::Normal].
    pub fn keyword(&self) -> &'static str {
        match self {
            GlueOrder::Normal => "",
            GlueOrder::Fil => "fil",
            GlueOrder::Fill => "fill",
            GlueOrder::Filll => "filll",
        }
    }

    /// Inverse of [GlueOrder::keyword] for the three infinite orders.
    pub fn parse(s: &str) -> Option<Self> {
        [GlueOrder::Fil, GlueOrder::Fill, GlueOrder::Filll]
            .into_iter()
            .find(|order| order.keyword() == s)
    }
}

impl std::fmt::Display for GlueOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}
