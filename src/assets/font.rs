use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::{
    core::Rgba8,
    error::{CollageError, CollageResult},
};

/// Font bytes plus the family name `parley` resolved for them.
#[derive(Clone)]
pub struct FontFace {
    /// Raw font file bytes (TTF/OTF).
    pub bytes: Arc<Vec<u8>>,
    /// Primary family name registered from the font data.
    pub family: String,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes_len", &self.bytes.len())
            .field("family", &self.family)
            .finish()
    }
}

impl FontFace {
    /// Register `bytes` with a throwaway font collection to validate them and learn the family.
    pub fn from_bytes(bytes: Vec<u8>) -> CollageResult<Self> {
        let mut engine = TextLayoutEngine::new();
        let family = engine.register(&bytes)?;
        Ok(Self {
            bytes: Arc::new(bytes),
            family,
        })
    }
}

/// Read a font file from disk.
pub fn load_font(path: impl AsRef<Path>) -> CollageResult<FontFace> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("read font from '{}'", path.display()))?;
    let face = FontFace::from_bytes(bytes)?;
    tracing::debug!(path = %path.display(), family = %face.family, "loaded font");
    Ok(face)
}

/// Brush carried through `parley` layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush(pub Rgba8);

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    registered: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: None,
        }
    }

    fn register(&mut self, font_bytes: &[u8]) -> CollageResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CollageError::invalid_argument("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CollageError::invalid_argument("registered font family has no name"))?
            .to_string();
        Ok(family_name)
    }

    fn ensure_registered(&mut self, font: &FontFace) -> CollageResult<String> {
        if let Some(family) = &self.registered
            && family == &font.family
        {
            return Ok(family.clone());
        }
        let family = self.register(&font.bytes)?;
        self.registered = Some(family.clone());
        Ok(family)
    }

    /// Shape and lay out a single overlay string.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font: &FontFace,
        size_px: f32,
        color: Rgba8,
    ) -> CollageResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CollageError::invalid_argument(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.ensure_registered(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush(color)));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
