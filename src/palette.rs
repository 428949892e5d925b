use anyhow::{anyhow, Result};
use plotters::style::RGBColor;
use std::collections::HashMap;

/// Default survey palette: five blues followed by five accents
pub const SURVEY10: [&str; 10] = [
    "#8fd0ff", "#589fef", "#0071bc", "#00468b", "#00215d",
    "#19D3F3", "#FF6692", "#B6E880", "#FF97FF", "#FECB52",
];

#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    /// An empty list falls back to the survey palette
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            return Self::survey10();
        }
        Self { colors }
    }

    pub fn survey10() -> Self {
        Self {
            colors: SURVEY10.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Color for a slot, cycling through the palette
    pub fn color_at(&self, idx: usize) -> &str {
        &self.colors[idx % self.colors.len()]
    }

    /// Assign colors by each key's position in `keys`
    pub fn assign_colors(&self, keys: &[String]) -> HashMap<String, String> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), self.color_at(i).to_string()))
            .collect()
    }
}

/// Parse `#rrggbb` into an RGB color
pub fn parse_hex_color(hex: &str) -> Result<RGBColor> {
    let digits = hex
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| anyhow!("Invalid color '{}': expected #rrggbb", hex))?;

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_cycles() {
        let palette = ColorPalette::survey10();
        assert_eq!(palette.color_at(0), "#8fd0ff");
        assert_eq!(palette.color_at(9), "#FECB52");
        assert_eq!(palette.color_at(10), "#8fd0ff");
    }

    #[test]
    fn test_assign_colors_positional() {
        let palette = ColorPalette::survey10();
        let keys = vec!["30s".to_string(), "20s".to_string()];
        let map = palette.assign_colors(&keys);
        assert_eq!(map["30s"], "#8fd0ff");
        assert_eq!(map["20s"], "#589fef");
    }

    #[test]
    fn test_empty_palette_uses_survey10() {
        let palette = ColorPalette::new(Vec::new());
        assert_eq!(palette.color_at(0), "#8fd0ff");
        assert_eq!(palette.color_at(11), "#589fef");
    }

    #[test]
    fn test_parse_hex_color() {
        let c = parse_hex_color("#19D3F3").unwrap();
        assert_eq!((c.0, c.1, c.2), (0x19, 0xd3, 0xf3));
        assert!(parse_hex_color("19D3F3").is_err());
        assert!(parse_hex_color("#19D3F").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }
}
