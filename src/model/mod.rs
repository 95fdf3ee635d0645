//! # Slide Model
//!
//! The input representation for the rendering core. A slide is a layer
//! blueprint (fixed geometry, shared across slides of the same layout) plus
//! content keyed by layer id. Everything here is recomputed per render; no
//! derived value such as a fitted font size or an overflow flag is stored.

use std::collections::BTreeMap;

use crate::config::RenderOptions;
use crate::style::{BrandKit, BulletStyle, StyleKit, TextAlign};
use serde::{Deserialize, Serialize};

/// Canvas width in device pixels (LinkedIn portrait carousel).
pub const CANVAS_WIDTH: u32 = 1080;
/// Canvas height in device pixels.
pub const CANVAS_HEIGHT: u32 = 1350;

/// A box on the 1080×1350 canvas, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayerPosition {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// Font-size bounds for a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TextConstraints {
    pub max_font: u32,
    pub min_font: u32,
    /// Advisory unless `MaxLinesPolicy::Enforce` is selected.
    #[serde(default)]
    pub max_lines: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBoxLayer {
    pub id: String,
    pub position: LayerPosition,
    pub constraints: TextConstraints,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub bullet_style: Option<BulletStyle>,
}

/// One visual element of a slide, drawn in blueprint order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    /// Fills the whole canvas with the resolved background colour.
    Background,
    TextBox(TextBoxLayer),
}

/// Ordered layers defining a slide layout, independent of its text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayersBlueprint {
    pub layers: Vec<Layer>,
}

impl LayersBlueprint {
    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBoxLayer> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::TextBox(text_box) => Some(text_box),
            Layer::Background => None,
        })
    }
}

/// Text for one layer: a single string or a list of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentValue {
    Text(String),
    Items(Vec<String>),
}

impl ContentValue {
    /// True when there is nothing to draw.
    pub fn is_blank(&self) -> bool {
        match self {
            ContentValue::Text(text) => text.trim().is_empty(),
            ContentValue::Items(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    /// The text to measure, one item per line, prefixed by `bullet` when set.
    /// Bullets only apply to array content.
    pub fn to_text(&self, bullet: Option<BulletStyle>) -> String {
        match self {
            ContentValue::Text(text) => text.clone(),
            ContentValue::Items(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match bullet {
                    Some(style) => format!("{}{}", style.prefix(i), item),
                    None => item.clone(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Apply an edit while keeping the content's shape: scalar stays scalar,
    /// array content is split back into one item per line.
    pub fn with_text(&self, edited: &str) -> ContentValue {
        match self {
            ContentValue::Text(_) => ContentValue::Text(edited.to_string()),
            ContentValue::Items(_) => ContentValue::Items(
                edited
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}

/// Content of one slide keyed by layer id.
pub type SlideContent = BTreeMap<String, ContentValue>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub blueprint: LayersBlueprint,
    #[serde(default)]
    pub content: SlideContent,
}

/// A custom font to register before rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Inter").
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
    /// Font weight (100-900). Defaults to 400.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    400
}

/// Everything needed to render a deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub style_kit: StyleKit,
    #[serde(default)]
    pub brand_kit: Option<BrandKit>,
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
    #[serde(default)]
    pub options: RenderOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_json_shape() {
        let json = r#"{
            "layers": [
                { "type": "background" },
                {
                    "type": "text_box",
                    "id": "headline",
                    "position": { "x": 60, "y": 100, "width": 960, "height": 400 },
                    "constraints": { "max_font": 72, "min_font": 24, "max_lines": 3 },
                    "align": "center"
                },
                {
                    "type": "text_box",
                    "id": "body",
                    "position": { "x": 60, "y": 600, "width": 960, "height": 600 },
                    "constraints": { "max_font": 40, "min_font": 20 },
                    "bulletStyle": "numbered"
                }
            ]
        }"#;
        let blueprint: LayersBlueprint = serde_json::from_str(json).unwrap();
        assert_eq!(blueprint.layers.len(), 3);
        assert!(matches!(blueprint.layers[0], Layer::Background));
        let boxes: Vec<_> = blueprint.text_boxes().collect();
        assert_eq!(boxes[0].align, TextAlign::Center);
        assert_eq!(boxes[0].constraints.max_lines, Some(3));
        assert_eq!(boxes[1].align, TextAlign::Left);
        assert_eq!(boxes[1].bullet_style, Some(BulletStyle::Numbered));
    }

    #[test]
    fn test_content_shapes() {
        let content: SlideContent =
            serde_json::from_str(r#"{ "headline": "Hi", "body": ["A", "B"] }"#).unwrap();
        assert_eq!(content["headline"], ContentValue::Text("Hi".to_string()));
        assert_eq!(
            content["body"].to_text(Some(BulletStyle::Disc)),
            "\u{2022} A\n\u{2022} B"
        );
        assert_eq!(
            content["body"].to_text(Some(BulletStyle::Numbered)),
            "1. A\n2. B"
        );
        assert_eq!(content["body"].to_text(None), "A\nB");
    }

    #[test]
    fn test_bullets_ignored_for_scalar_content() {
        let value = ContentValue::Text("plain".to_string());
        assert_eq!(value.to_text(Some(BulletStyle::Disc)), "plain");
    }

    #[test]
    fn test_edit_preserves_shape() {
        let scalar = ContentValue::Text("old".to_string());
        assert_eq!(
            scalar.with_text("new\ntext"),
            ContentValue::Text("new\ntext".to_string())
        );
        let items = ContentValue::Items(vec!["a".to_string()]);
        assert_eq!(
            items.with_text("one\n\n two \nthree"),
            ContentValue::Items(vec![
                "one".to_string(),
                "two".to_string(),
                "three".to_string()
            ])
        );
    }

    #[test]
    fn test_blank_content() {
        assert!(ContentValue::Text("  ".to_string()).is_blank());
        assert!(ContentValue::Items(vec![]).is_blank());
        assert!(ContentValue::Items(vec!["".to_string()]).is_blank());
        assert!(!ContentValue::Items(vec!["x".to_string()]).is_blank());
    }

    #[test]
    fn test_hit_box() {
        let pos = LayerPosition {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
        };
        assert!(pos.contains(10.0, 60.0));
        assert!(!pos.contains(111.0, 20.0));
    }
}
