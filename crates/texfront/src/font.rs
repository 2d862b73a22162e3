//! Fonts.
//!
//! The pipeline only needs a few metrics of each font: the quad and x-height
//! for the `em` and `ex` units, plus character dimensions for consumers of
//! the command stream. Metrics come from a [FontLoader], so the pipeline does
//! not depend on any particular font file format.

use crate::token::CommandRef;
use std::rc::Rc;
use texfront_core::Scaled;
use texfront_stdext::collections::groupingmap::{GroupingVec, NoGroupToEndError, Scope};

/// Metrics of a font at its design size.
pub trait FontMetrics: std::fmt::Debug {
    fn design_size(&self) -> Scaled;

    fn width(&self, c: char) -> Scaled;

    fn height(&self, c: char) -> Scaled;

    fn depth(&self, c: char) -> Scaled;

    /// The font's em width.
    fn quad(&self) -> Scaled {
        self.width('M')
    }

    fn x_height(&self) -> Scaled {
        self.height('x')
    }
}

/// Metrics of `\nullfont`, in which every dimension is zero.
#[derive(Debug, Default)]
pub struct NullFontMetrics;

impl FontMetrics for NullFontMetrics {
    fn design_size(&self) -> Scaled {
        Scaled::ZERO
    }
    fn width(&self, _: char) -> Scaled {
        Scaled::ZERO
    }
    fn height(&self, _: char) -> Scaled {
        Scaled::ZERO
    }
    fn depth(&self, _: char) -> Scaled {
        Scaled::ZERO
    }
}

/// Source of font metrics for `\font` assignments.
pub trait FontLoader {
    /// Loads the metrics of the named font, or returns [None] if the font does not exist.
    fn load(&self, name: &str) -> Option<Rc<dyn FontMetrics>>;
}

/// A font loader that knows no fonts.
#[derive(Debug, Default)]
pub struct NullFontLoader;

impl FontLoader for NullFontLoader {
    fn load(&self, _: &str) -> Option<Rc<dyn FontMetrics>> {
        None
    }
}

/// Identifier of a loaded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontId(pub usize);

impl FontId {
    pub const NULL_FONT: FontId = FontId(0);
}

/// The size requested in a `\font` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    #[default]
    Design,
    At(Scaled),
    /// Scale factor times 1000.
    Scaled(i32),
}

/// A loaded font.
#[derive(Debug, Clone)]
pub struct Font {
    /// The control sequence that selects the font, or [None] for `\nullfont`.
    pub identifier: Option<CommandRef>,
    /// File name of the font.
    pub name: String,
    pub size: Scaled,
    pub metrics: Rc<dyn FontMetrics>,
}

impl Font {
    /// Scales a design size dimension to the size of this font.
    fn scale(&self, s: Scaled) -> Scaled {
        let design_size = self.metrics.design_size();
        if design_size == Scaled::ZERO || design_size == self.size {
            return s;
        }
        let scaled = (s.0 as i64) * (self.size.0 as i64) / (design_size.0 as i64);
        Scaled(scaled.clamp(-(Scaled::MAX_DIMEN.0 as i64), Scaled::MAX_DIMEN.0 as i64) as i32)
    }

    pub fn quad(&self) -> Scaled {
        self.scale(self.metrics.quad())
    }

    pub fn x_height(&self) -> Scaled {
        self.scale(self.metrics.x_height())
    }
}

/// All loaded fonts, plus the scoped current font.
#[derive(Debug)]
pub struct Fonts {
    fonts: Vec<Font>,
    current: GroupingVec<FontId>,
}

impl Default for Fonts {
    fn default() -> Self {
        Fonts {
            fonts: vec![Font {
                identifier: None,
                name: "nullfont".to_string(),
                size: Scaled::ZERO,
                metrics: Rc::new(NullFontMetrics),
            }],
            current: Default::default(),
        }
    }
}

fn actual_size(design_size: Scaled, size: FontSize) -> Scaled {
    match size {
        FontSize::Design => design_size,
        FontSize::At(at) => at,
        FontSize::Scaled(factor) => {
            let s = (design_size.0 as i64) * (factor as i64) / 1000;
            Scaled(s.clamp(0, Scaled::MAX_DIMEN.0 as i64) as i32)
        }
    }
}

impl Fonts {
    /// Returns the font already loaded from this file at this size, if any.
    ///
    /// The font is renamed to the new identifier (TeX.2021.1260).
    pub fn reuse(&mut self, identifier: CommandRef, name: &str, size: FontSize) -> Option<FontId> {
        let index = self.fonts.iter().skip(1).position(|font| {
            font.name == name && font.size == actual_size(font.metrics.design_size(), size)
        })? + 1;
        let font = self.fonts.get_mut(index)?;
        font.identifier = Some(identifier);
        log::debug!("reusing font {name} at {} as font {index}", font.size);
        Some(FontId(index))
    }

    /// Adds a font, returning its identifier.
    pub fn define(
        &mut self,
        identifier: CommandRef,
        name: String,
        size: FontSize,
        metrics: Rc<dyn FontMetrics>,
    ) -> FontId {
        let size = actual_size(metrics.design_size(), size);
        let id = FontId(self.fonts.len());
        log::debug!("loaded font {name} at {size} as font {}", id.0);
        self.fonts.push(Font {
            identifier: Some(identifier),
            name,
            size,
            metrics,
        });
        id
    }

    /// Number of loaded fonts, including `\nullfont`.
    pub fn loaded(&self) -> usize {
        self.fonts.len()
    }

    pub fn get(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(id.0)
    }

    pub fn current_id(&self) -> FontId {
        self.current.get(&0).copied().unwrap_or(FontId::NULL_FONT)
    }

    pub fn current(&self) -> &Font {
        // The null font is always present.
        &self.fonts[self.current_id().0]
    }

    pub fn select(&mut self, id: FontId, scope: Scope) {
        self.current.insert(0, id, scope);
    }

    pub fn begin_group(&mut self) {
        self.current.begin_group();
    }

    pub fn end_group(&mut self) -> Result<(), NoGroupToEndError> {
        self.current.end_group()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::token::CommandRef;

    const IDENTIFIER: CommandRef = CommandRef::ActiveCharacter('f');

    /// Metrics where every character is one design unit wide and half a unit high.
    #[derive(Debug)]
    pub struct SquareMetrics;

    impl FontMetrics for SquareMetrics {
        fn design_size(&self) -> Scaled {
            Scaled::ONE * 10
        }
        fn width(&self, _: char) -> Scaled {
            Scaled::ONE * 10
        }
        fn height(&self, _: char) -> Scaled {
            Scaled::ONE * 5
        }
        fn depth(&self, _: char) -> Scaled {
            Scaled::ZERO
        }
    }

    pub struct SquareLoader;

    impl FontLoader for SquareLoader {
        fn load(&self, name: &str) -> Option<Rc<dyn FontMetrics>> {
            if name == "square" {
                Some(Rc::new(SquareMetrics))
            } else {
                None
            }
        }
    }

    #[test]
    fn quad_scales_with_size() {
        let mut fonts = Fonts::default();
        let id = fonts.define(IDENTIFIER, "square".into(), FontSize::At(Scaled::ONE * 20), Rc::new(SquareMetrics));
        let font = fonts.get(id).unwrap();
        assert_eq!(font.quad(), Scaled::ONE * 20);
        assert_eq!(font.x_height(), Scaled::ONE * 10);
    }

    #[test]
    fn scaled_size() {
        let mut fonts = Fonts::default();
        let id = fonts.define(IDENTIFIER, "square".into(), FontSize::Scaled(500), Rc::new(SquareMetrics));
        assert_eq!(fonts.get(id).unwrap().size, Scaled::ONE * 5);
    }

    #[test]
    fn current_font_is_scoped() {
        let mut fonts = Fonts::default();
        let id = fonts.define(IDENTIFIER, "square".into(), FontSize::Design, Rc::new(SquareMetrics));
        fonts.begin_group();
        fonts.select(id, Scope::Local);
        assert_eq!(fonts.current_id(), id);
        fonts.end_group().unwrap();
        assert_eq!(fonts.current_id(), FontId::NULL_FONT);
        assert_eq!(fonts.current().quad(), Scaled::ZERO);
    }

    #[test]
    fn same_file_and_size_is_reused() {
        let mut fonts = Fonts::default();
        let id = fonts.define(IDENTIFIER, "square".into(), FontSize::Design, Rc::new(SquareMetrics));
        let other = CommandRef::ActiveCharacter('g');
        assert_eq!(fonts.reuse(other, "square", FontSize::At(Scaled::ONE * 10)), Some(id));
        assert_eq!(fonts.get(id).unwrap().identifier, Some(other));
        assert_eq!(fonts.reuse(other, "square", FontSize::Scaled(2000)), None);
        assert_eq!(fonts.reuse(other, "circle", FontSize::Design), None);
        assert_eq!(fonts.loaded(), 2);
    }
}
