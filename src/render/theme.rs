//! Plot theme: palette, primary/accent colors and fonts

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::error::{ProcalError, Result};

/// Multiplier applied to font sizes by the `talk` context
const TALK_SCALE: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    /// `#RRGGBB` colors indexed by [`Series::color`](super::Series)
    pub palette: Vec<String>,
    /// Axes, ticks and text
    pub primary: String,
    /// Highlight color for fitted curves
    pub accent: String,
    pub background: String,
    pub font_family: String,
    pub font_scale: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            palette: [
                "#4C72B0", "#DD8452", "#55A868", "#C44E52", "#8172B3", "#937860",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            primary: "#262626".to_string(),
            accent: "#DD8452".to_string(),
            background: "#FFFFFF".to_string(),
            font_family: "sans-serif".to_string(),
            font_scale: 1.0,
        }
    }
}

impl Theme {
    /// Presentation theme: dark grey text, teal accent, Fira Sans at talk scale
    pub fn slides() -> Self {
        let primary = "#404040".to_string();
        let accent = "#01BCA3".to_string();
        Self {
            name: "slides".to_string(),
            palette: vec![primary.clone(), accent.clone(), "#8C8C8C".to_string()],
            primary,
            accent,
            background: "#FFFFFF".to_string(),
            font_family: "Fira Sans".to_string(),
            font_scale: TALK_SCALE,
        }
    }

    pub fn by_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::default()),
            "slides" => Ok(Self::slides()),
            other => Err(ProcalError::ConfigError(format!(
                "unknown theme '{}' (expected default or slides)",
                other
            ))),
        }
    }

    /// Palette color, cycling when the index exceeds the palette
    pub fn color(&self, index: usize) -> Result<RGBColor> {
        if self.palette.is_empty() {
            return Err(ProcalError::ConfigError(format!("theme '{}' has an empty palette", self.name)));
        }
        parse_hex(&self.palette[index % self.palette.len()])
    }

    pub fn primary_color(&self) -> Result<RGBColor> {
        parse_hex(&self.primary)
    }

    pub fn accent_color(&self) -> Result<RGBColor> {
        parse_hex(&self.accent)
    }

    pub fn background_color(&self) -> Result<RGBColor> {
        parse_hex(&self.background)
    }

    /// Font size in pixels for a base size
    pub fn font_size(&self, base: f64) -> f64 {
        base * self.font_scale
    }

    /// Check every color once, e.g. right after loading a config
    pub fn validate(&self) -> Result<()> {
        self.primary_color()?;
        self.accent_color()?;
        self.background_color()?;
        for i in 0..self.palette.len() {
            self.color(i)?;
        }
        if !(self.font_scale.is_finite() && self.font_scale > 0.0) {
            return Err(ProcalError::ConfigError(format!(
                "font_scale must be positive, got {}",
                self.font_scale
            )));
        }
        Ok(())
    }
}

fn parse_hex(color: &str) -> Result<RGBColor> {
    let hex = color.trim().trim_start_matches('#');
    let invalid = || ProcalError::ConfigError(format!("invalid color '{}', expected #RRGGBB", color));
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}
