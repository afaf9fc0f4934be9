use ratatui::style::Color;

use crate::model::{DayStatus, UiConfig};

/// Colors the checklist screen uses, keyed in `[ui.colors]` by field name
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    /// Title rows and panel headings
    pub heading: Color,
    /// App name and the input cursor
    pub accent: Color,
    /// Fold markers, open checkboxes, hints, finished rows
    pub muted: Color,
    pub selection_bg: Color,
    /// Reset banner background
    pub banner_bg: Color,
    pub done: Color,
    pub partial: Color,
    pub missed: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x14, 0x16, 0x1E),
            text: Color::Rgb(0xC8, 0xCC, 0xD8),
            heading: Color::Rgb(0xF2, 0xF4, 0xF8),
            accent: Color::Rgb(0x5E, 0xB3, 0xF0),
            muted: Color::Rgb(0x6C, 0x72, 0x86),
            selection_bg: Color::Rgb(0x26, 0x2B, 0x3A),
            banner_bg: Color::Rgb(0x1E, 0x3A, 0x2A),
            done: Color::Rgb(0x5C, 0xD0, 0x8A),
            partial: Color::Rgb(0xF0, 0xC6, 0x4A),
            missed: Color::Rgb(0xEE, 0x5D, 0x5D),
        }
    }
}

impl Theme {
    /// Defaults with any valid `[ui.colors]` overrides applied. Unknown names
    /// and unparseable values are skipped.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();
        for (name, value) in &ui.colors {
            if let (Some(slot), Some(color)) = (theme.slot_mut(name), parse_color(value)) {
                *slot = color;
            }
        }
        theme
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Color> {
        Some(match name {
            "background" => &mut self.background,
            "text" => &mut self.text,
            "heading" => &mut self.heading,
            "accent" => &mut self.accent,
            "muted" => &mut self.muted,
            "selection_bg" => &mut self.selection_bg,
            "banner_bg" => &mut self.banner_bg,
            "done" => &mut self.done,
            "partial" => &mut self.partial,
            "missed" => &mut self.missed,
            _ => return None,
        })
    }

    /// Color for a history row
    pub fn status_color(&self, status: DayStatus) -> Color {
        match status {
            DayStatus::Completed => self.done,
            DayStatus::Partial => self.partial,
            DayStatus::Incomplete => self.missed,
        }
    }
}

/// `#rrggbb` or shorthand `#rgb`
fn parse_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let short = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
            Some(Color::Rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}
