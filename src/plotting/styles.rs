//! Static colour palette: dark theme, class colours, change colours

use crate::types::{Change, Role};
use plotters::style::RGBColor;

pub const BACKGROUND: RGBColor = RGBColor(0x1A, 0x1A, 0x1A);
pub const CHART_BG: RGBColor = RGBColor(0x2A, 0x2A, 0x2A);
pub const ROW_ALT: RGBColor = RGBColor(0x25, 0x25, 0x25);
pub const TEXT_PRIMARY: RGBColor = RGBColor(0xFF, 0xFF, 0xFF);
pub const TEXT_SECONDARY: RGBColor = RGBColor(0xCC, 0xCC, 0xCC);
pub const GRID: RGBColor = RGBColor(0x40, 0x40, 0x40);
pub const BORDER: RGBColor = RGBColor(0x55, 0x55, 0x55);
pub const POSITIVE: RGBColor = RGBColor(0x00, 0xFF, 0x00);
pub const NEGATIVE: RGBColor = RGBColor(0xFF, 0x00, 0x00);
pub const NEUTRAL: RGBColor = RGBColor(0xCC, 0xCC, 0xCC);
pub const UNCHANGED: RGBColor = RGBColor(0xFF, 0xD7, 0x00);

/// In-game class colour, white for unknown classes
///
/// Class names are matched case-insensitively and without spaces, so both
/// `DeathKnight` and `death knight` resolve.
pub fn class_color(class: &str) -> RGBColor {
    let normalized: String = class
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_uppercase();
    match normalized.as_str() {
        "DEATHKNIGHT" => RGBColor(0xC4, 0x1E, 0x3A),
        "DEMONHUNTER" => RGBColor(0xA3, 0x30, 0xC9),
        "DRUID" => RGBColor(0xFF, 0x7D, 0x0A),
        "EVOKER" => RGBColor(0x33, 0x93, 0x7F),
        "HUNTER" => RGBColor(0xAB, 0xD4, 0x73),
        "MAGE" => RGBColor(0x69, 0xCC, 0xF0),
        "MONK" => RGBColor(0x00, 0xFF, 0x96),
        "PALADIN" => RGBColor(0xF5, 0x8C, 0xBA),
        "PRIEST" => RGBColor(0xFF, 0xFF, 0xFF),
        "ROGUE" => RGBColor(0xFF, 0xF5, 0x69),
        "SHAMAN" => RGBColor(0x00, 0x70, 0xDE),
        "WARLOCK" => RGBColor(0x94, 0x82, 0xC9),
        "WARRIOR" => RGBColor(0xC7, 0x9C, 0x6E),
        _ => TEXT_PRIMARY,
    }
}

/// Line colour for role-aggregated progress series
pub fn role_color(role: Role) -> RGBColor {
    match role {
        Role::Tank => RGBColor(0x00, 0x70, 0xDE),
        Role::Healer => RGBColor(0x00, 0xFF, 0x96),
        Role::Dps => RGBColor(0xC4, 0x1E, 0x3A),
    }
}

/// Colour of a change cell; `invert` flips it for lower-is-better metrics
pub fn change_color(change: &Change, invert: bool) -> RGBColor {
    match change.delta() {
        None => NEUTRAL,
        Some(delta) if (delta * 100.0).round() == 0.0 => UNCHANGED,
        Some(delta) => {
            if (delta > 0.0) != invert {
                POSITIVE
            } else {
                NEGATIVE
            }
        }
    }
}
