//! Display colors
//!
//! Cosmetic ANSI colors handed out round-robin at registration. They only
//! decorate relayed lines and never affect routing.

/// ANSI sequence that restores the terminal's default color.
pub const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

/// Fixed, ordered palette.
pub const PALETTE: [DisplayColor; 6] = [
    DisplayColor::Red,
    DisplayColor::Green,
    DisplayColor::Yellow,
    DisplayColor::Blue,
    DisplayColor::Magenta,
    DisplayColor::Cyan,
];

impl DisplayColor {
    /// Palette entry for the given registry size.
    pub fn for_index(index: usize) -> Self {
        PALETTE[index % PALETTE.len()]
    }

    pub fn ansi_code(&self) -> &'static str {
        match self {
            DisplayColor::Red => "\x1b[31m",
            DisplayColor::Green => "\x1b[32m",
            DisplayColor::Yellow => "\x1b[33m",
            DisplayColor::Blue => "\x1b[34m",
            DisplayColor::Magenta => "\x1b[35m",
            DisplayColor::Cyan => "\x1b[36m",
        }
    }
}
