//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use stonemerge::StoneColor;
use thiserror::Error;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Stone colours: green, grey, yellow, merged.
    pub stones: [Color; 4],
    /// Playfield background; also the colour of an empty slot.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, points).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Cursor frame and secondary text.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl Theme {
    /// Hardcoded One Dark defaults (onedark.theme hex values).
    pub fn onedark_default() -> Self {
        Self {
            stones: [
                rgb(0x98C379), // mem_box / green
                rgb(0x5C6370), // inactive_fg / grey
                rgb(0xE5C07B), // title / yellow
                rgb(0x61AFEF), // cpu_box / blue
            ],
            bg: rgb(0x282C34),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override stone colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.stones = [
                    rgb(0x00FF00), // bright green
                    rgb(0xB0B0B0), // light grey
                    rgb(0xFFFF00), // yellow
                    rgb(0x0088FF), // blue
                ];
            }
            crate::Palette::Colorblind => {
                self.stones = [
                    rgb(0x009988), // teal
                    rgb(0xBBBBBB), // grey
                    rgb(0xEE7733), // orange
                    rgb(0x0077BB), // blue
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let d = Self::onedark_default();
        Self {
            stones: [
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.stones[0]),
                get("inactive_fg").unwrap_or(d.stones[1]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.stones[2]),
                get("cpu_box").unwrap_or(d.stones[3]),
            ],
            bg: get("main_bg").or_else(|| get("meter_bg")).unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    /// Presentation colour for a logical stone colour; empty slots use the background.
    #[inline]
    pub fn stone_color(&self, color: StoneColor) -> Color {
        match color {
            StoneColor::Green => self.stones[0],
            StoneColor::Grey => self.stones[1],
            StoneColor::Yellow => self.stones[2],
            StoneColor::Merged => self.stones[3],
            StoneColor::Empty => self.bg,
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return Err(ThemeError::InvalidHex(s.to_string()));
    }
    let channel = |range: std::ops::Range<usize>, scale: u8| {
        u8::from_str_radix(&s[range], 16)
            .map(|v| v * scale)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2, 1)?, channel(2..4, 1)?, channel(4..6, 1)?),
        3 => (channel(0..1, 17)?, channel(1..2, 17)?, channel(2..3, 17)?),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_map_overrides_stones() {
        let map = parse_theme_file(
            r##"
            # comment
            theme[cpu_box]="#010203"
            theme[main_bg]='#000000'
            "##,
        );
        let t = Theme::from_map(&map);
        assert_eq!(t.stone_color(StoneColor::Merged), Color::Rgb(1, 2, 3));
        assert_eq!(t.stone_color(StoneColor::Empty), Color::Rgb(0, 0, 0));
        assert_eq!(t.stones[0], Theme::default().stones[0]);
    }

    #[test]
    fn test_palettes_keep_stones_distinct() {
        for palette in [
            crate::Palette::Normal,
            crate::Palette::HighContrast,
            crate::Palette::Colorblind,
        ] {
            let t = Theme::default_for_palette(palette);
            for i in 0..t.stones.len() {
                for j in i + 1..t.stones.len() {
                    assert_ne!(t.stones[i], t.stones[j]);
                }
            }
        }
    }
}
