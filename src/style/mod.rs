//! # Style Kits
//!
//! Typography, colours, and spacing applied to a slide. A style kit is the
//! named bundle picked by the user; a brand kit is an optional decoration that
//! overrides individual colours.

use serde::{Deserialize, Serialize};

/// Text font weight used when a kit does not specify one.
pub const DEFAULT_WEIGHT: u32 = 400;

/// An RGBA colour. Serialized as a `#rgb`, `#rrggbb` or `#rrggbbaa` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    /// Stroke colour of the overflow indicator in the interactive editor.
    pub const OVERFLOW: Color = Color {
        r: 0.937,
        g: 0.267,
        b: 0.267,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse a hex colour. Accepts an optional leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid hex colour '{}'", hex));
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map(|v| v as f64 / 255.0);
        let parsed = match digits.len() {
            3 => {
                let expand: Vec<String> = digits.chars().map(|c| c.to_string().repeat(2)).collect();
                (
                    channel(expand[0].as_str()),
                    channel(expand[1].as_str()),
                    channel(expand[2].as_str()),
                    Ok(1.0),
                )
            }
            6 => (
                channel(&digits[0..2]),
                channel(&digits[2..4]),
                channel(&digits[4..6]),
                Ok(1.0),
            ),
            8 => (
                channel(&digits[0..2]),
                channel(&digits[2..4]),
                channel(&digits[4..6]),
                channel(&digits[6..8]),
            ),
            _ => return Err(format!("invalid hex colour '{}'", hex)),
        };
        match parsed {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Self { r, g, b, a }),
            _ => Err(format!("invalid hex colour '{}'", hex)),
        }
    }

    /// Channels quantized to 8 bits, in RGBA order.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// CSS hex notation, `#rrggbb` when opaque and `#rrggbbaa` otherwise.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Horizontal alignment of wrapped lines inside a text box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// X coordinate of a line of `line_width` inside a box starting at `x`.
    pub fn line_x(self, x: f64, box_width: f64, line_width: f64) -> f64 {
        match self {
            TextAlign::Left => x,
            TextAlign::Center => x + (box_width - line_width) / 2.0,
            TextAlign::Right => x + box_width - line_width,
        }
    }
}

/// Prefix applied to each item of array content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulletStyle {
    Disc,
    Numbered,
}

impl BulletStyle {
    /// The prefix for the item at zero-based `index`.
    pub fn prefix(self, index: usize) -> String {
        match self {
            BulletStyle::Disc => "\u{2022} ".to_string(),
            BulletStyle::Numbered => format!("{}. ", index + 1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub headline_font: String,
    #[serde(default = "default_weight")]
    pub headline_weight: u32,
    pub body_font: String,
    #[serde(default = "default_weight")]
    pub body_weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitColors {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingRules {
    /// Inner padding in pixels. Blueprints already bake it into positions;
    /// kept so round-tripped kits stay intact.
    #[serde(default)]
    pub padding: f64,
    /// Unitless multiplier on font size.
    pub line_height: f64,
}

/// A named bundle of typography, colours and spacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleKit {
    #[serde(default)]
    pub id: Option<String>,
    pub typography: Typography,
    pub colors: KitColors,
    pub spacing_rules: SpacingRules,
}

impl StyleKit {
    /// Font family and weight for a layer. Layers whose id contains
    /// `"headline"` take the headline face, every other layer the body face.
    pub fn font_for_layer(&self, layer_id: &str) -> (&str, u32) {
        if layer_id.contains("headline") {
            (&self.typography.headline_font, self.typography.headline_weight)
        } else {
            (&self.typography.body_font, self.typography.body_weight)
        }
    }
}

impl Default for StyleKit {
    fn default() -> Self {
        Self {
            id: Some("minimal_clean".to_string()),
            typography: Typography {
                headline_font: "Helvetica".to_string(),
                headline_weight: 700,
                body_font: "Helvetica".to_string(),
                body_weight: DEFAULT_WEIGHT,
            },
            colors: KitColors {
                background: Color::WHITE,
                foreground: Color::rgb(0.067, 0.067, 0.067),
                accent: Color::rgb(0.231, 0.510, 0.965),
            },
            spacing_rules: SpacingRules {
                padding: 80.0,
                line_height: 1.2,
            },
        }
    }
}

/// Brand colours that take precedence over the style kit when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandKit {
    #[serde(default)]
    pub colors: BrandColors,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandColors {
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub foreground: Option<Color>,
    #[serde(default)]
    pub accent: Option<Color>,
}

/// Colours after applying the brand kit on top of the style kit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedColors {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
}

impl ResolvedColors {
    pub fn resolve(kit: &StyleKit, brand: Option<&BrandKit>) -> Self {
        let brand = brand.map(|b| &b.colors);
        Self {
            background: brand
                .and_then(|b| b.background)
                .unwrap_or(kit.colors.background),
            foreground: brand
                .and_then(|b| b.foreground)
                .unwrap_or(kit.colors.foreground),
            accent: brand.and_then(|b| b.accent).unwrap_or(kit.colors.accent),
        }
    }
}

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}
