use ratatui::style::Color;

use crate::config::ColorsConfig;
use crate::system::classify::Tier;

/// The three heat anchors as configured, before parsing.
#[derive(Debug, Clone)]
pub struct HeatOverrides {
    pub low: String,
    pub mid: String,
    pub high: String,
}

impl HeatOverrides {
    pub fn from_config(colors: &ColorsConfig) -> Self {
        HeatOverrides {
            low: colors.heat_low.clone(),
            mid: colors.heat_mid.clone(),
            high: colors.heat_high.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub gauge_unfilled: Color,
    /// Indexed by tier: low, medium, high.
    pub heat_colors: [Color; 3],
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn from_config(heat: &HeatOverrides) -> Self {
        let mut theme = Self::dark();
        theme.apply_heat_overrides(heat);
        theme
    }

    // Each anchor falls back independently when it does not parse.
    fn apply_heat_overrides(&mut self, heat: &HeatOverrides) {
        for (slot, raw) in self
            .heat_colors
            .iter_mut()
            .zip([&heat.low, &heat.mid, &heat.high])
        {
            if let Some(color) = parse_hex_color(raw) {
                *slot = color;
            }
        }
    }

    pub fn tier_color(&self, tier: Tier) -> Color {
        match tier {
            Tier::Low => self.heat_colors[0],
            Tier::Medium => self.heat_colors[1],
            Tier::High => self.heat_colors[2],
        }
    }

    pub fn dark() -> Self {
        Theme {
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            status_ok: Color::Green,
            status_err: Color::Red,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            gauge_unfilled: Color::DarkGray,
            heat_colors: [
                Color::Rgb(16, 185, 129),
                Color::Rgb(249, 115, 22),
                Color::Rgb(239, 68, 68),
            ],
        }
    }
}

pub fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heat(low: &str, mid: &str, high: &str) -> HeatOverrides {
        HeatOverrides {
            low: low.to_string(),
            mid: mid.to_string(),
            high: high.to_string(),
        }
    }

    #[test]
    fn parses_hex_with_and_without_hash() {
        let rgb = |r, g, b| Some(Color::Rgb(r, g, b));
        assert_eq!(parse_hex_color("#2d5a27"), rgb(0x2d, 0x5a, 0x27));
        assert_eq!(parse_hex_color(" a12e2e "), rgb(0xa1, 0x2e, 0x2e));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn tiers_use_configured_heat_colors() {
        let theme = Theme::from_config(&heat("#000001", "#000002", "#000003"));
        assert_eq!(theme.tier_color(Tier::Low), Color::Rgb(0, 0, 1));
        assert_eq!(theme.tier_color(Tier::Medium), Color::Rgb(0, 0, 2));
        assert_eq!(theme.tier_color(Tier::High), Color::Rgb(0, 0, 3));
    }

    #[test]
    fn invalid_anchor_keeps_default() {
        let theme = Theme::from_config(&heat("nope", "#000002", ""));
        let dark = Theme::dark();
        assert_eq!(theme.heat_colors[0], dark.heat_colors[0]);
        assert_eq!(theme.heat_colors[1], Color::Rgb(0, 0, 2));
        assert_eq!(theme.heat_colors[2], dark.heat_colors[2]);
    }
}
