//! # Font Management
//!
//! Registration and resolution of fonts for the headless backend.
//!
//! The registry is a process-wide, append-only cache keyed by family + weight.
//! Export jobs running in parallel may register the same face more than once;
//! the first registration wins and later ones are no-ops, so concurrent
//! callers never observe a half-written entry.
//!
//! Families that were never registered resolve to the built-in Helvetica
//! metrics, which measure correctly but carry no outlines.

pub mod metrics;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CarouselError, Result};
use crate::model::FontEntry;
use crate::text::{FontSpec, TextMeasure};
pub use metrics::StandardFontMetrics;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
}

impl FontKey {
    pub fn new(family: &str, weight: u32) -> Self {
        Self {
            family: family.to_string(),
            weight,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// Built-in metrics only. No glyph outlines.
    Standard(StandardFont),
    /// A TrueType/OpenType face with outlines.
    Custom(CustomFont),
}

impl FontData {
    pub fn units_to_px(&self, units: f64, font_size: f64) -> f64 {
        match self {
            FontData::Standard(_) => units / 1000.0 * font_size,
            FontData::Custom(font) => units / font.metrics.units_per_em as f64 * font_size,
        }
    }

    /// Distance from the top of the em box to the baseline, in pixels.
    pub fn ascent(&self, font_size: f64) -> f64 {
        match self {
            FontData::Standard(std_font) => {
                self.units_to_px(std_font.metrics().ascender as f64, font_size)
            }
            FontData::Custom(font) => self.units_to_px(font.metrics.ascender as f64, font_size),
        }
    }

    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        match self {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font_size),
            FontData::Custom(font) => font.metrics.char_width(ch, font_size),
        }
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        match self {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size),
            FontData::Custom(font) => text
                .chars()
                .map(|ch| font.metrics.char_width(ch, font_size))
                .sum(),
        }
    }
}

/// A registered TrueType/OpenType face.
#[derive(Debug, Clone)]
pub struct CustomFont {
    pub data: Arc<Vec<u8>>,
    pub metrics: CustomFontMetrics,
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Maps characters to their glyph IDs in the font.
    pub glyph_ids: HashMap<char, u16>,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in pixels.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| CarouselError::FontError(format!("failed to parse font: {}", e)))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        // Basic Multilingual Plane is enough for slide copy.
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    glyph_ids.insert(ch, glyph_id.0);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            glyph_ids,
        })
    }
}

/// The built-in faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            StandardFont::Helvetica => &metrics::HELVETICA,
            StandardFont::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }

    fn for_weight(weight: u32) -> Self {
        if weight >= 600 {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }
}

/// A font registry that maps family + weight to font data.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: RwLock<HashMap<FontKey, Arc<FontData>>>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TrueType/OpenType face. Returns `false` when the key was
    /// already present, in which case the existing face is kept.
    pub fn register(&self, family: &str, weight: u32, data: Vec<u8>) -> Result<bool> {
        let key = FontKey::new(family, weight);
        if self.contains(&key) {
            log::trace!("font {}:{} already registered", family, weight);
            return Ok(false);
        }

        let metrics = CustomFontMetrics::from_font_data(&data).map_err(|e| match e {
            CarouselError::FontError(msg) => {
                CarouselError::FontError(format!("{} ({} {})", msg, family, weight))
            }
            other => other,
        })?;
        let font = Arc::new(FontData::Custom(CustomFont {
            data: Arc::new(data),
            metrics,
        }));

        let mut fonts = self.write();
        if fonts.contains_key(&key) {
            return Ok(false);
        }
        fonts.insert(key, font);
        log::debug!("registered font {}:{}", family, weight);
        Ok(true)
    }

    /// Register a font entry from a render job (base64 or data URI source).
    pub fn register_entry(&self, entry: &FontEntry) -> Result<bool> {
        let key = FontKey::new(&entry.family, entry.weight);
        if self.contains(&key) {
            return Ok(false);
        }
        let data = decode_font_src(&entry.src)?;
        self.register(&entry.family, entry.weight, data)
    }

    pub fn contains(&self, key: &FontKey) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a font, falling back to the closest registered weight of the
    /// family and finally to the built-in Helvetica.
    pub fn resolve(&self, family: &str, weight: u32) -> Arc<FontData> {
        let fonts = self.read();
        if let Some(font) = fonts.get(&FontKey::new(family, weight)) {
            return Arc::clone(font);
        }

        let nearest = fonts
            .iter()
            .filter(|(key, _)| key.family == family)
            .min_by_key(|(key, _)| (key.weight.abs_diff(weight), key.weight));
        match nearest {
            Some((_, font)) => Arc::clone(font),
            None => Arc::new(FontData::Standard(StandardFont::for_weight(weight))),
        }
    }

    // Entries are inserted whole and never mutated, so a writer that
    // panicked cannot leave the map inconsistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<FontKey, Arc<FontData>>> {
        self.fonts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<FontKey, Arc<FontData>>> {
        self.fonts.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolve a font `src` (data URI or raw base64) to bytes.
fn decode_font_src(src: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    let b64 = if src.starts_with("data:") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| CarouselError::FontError("invalid data URI: missing comma".to_string()))?;
        &src[comma_pos + 1..]
    } else {
        src
    };
    base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| CarouselError::FontError(format!("base64 decode error: {}", e)))
}

/// Headless text measurement backed by a [`FontRegistry`].
#[derive(Debug, Clone, Default)]
pub struct FontContext {
    registry: Arc<FontRegistry>,
}

impl FontContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Arc<FontRegistry>) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, font: &FontSpec) -> Arc<FontData> {
        self.registry.resolve(&font.family, font.weight)
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &Arc<FontRegistry> {
        &self.registry
    }
}

impl TextMeasure for FontContext {
    fn measure_width(&self, text: &str, font: &FontSpec) -> Result<f64> {
        Ok(self.resolve(font).measure_string(text, font.size))
    }
}
