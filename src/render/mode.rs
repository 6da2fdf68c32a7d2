//! Render mode detection
//!
//! Picks how item icons are drawn based on what the terminal advertises.

use std::env;

use serde::{Deserialize, Serialize};

/// Available icon rendering modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Icons as a flat swatch of '#' in the icon's average colour.
    /// Works everywhere.
    Ascii,

    /// Icons downsampled into half-block cells ('▀' with fg/bg colours)
    #[default]
    Unicode,

    /// Real images via the Kitty graphics protocol.
    /// Supported by: Ghostty, Kitty, WezTerm
    Kitty,
}

impl RenderMode {
    /// Get a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Ascii => "ASCII",
            RenderMode::Unicode => "Unicode",
            RenderMode::Kitty => "Kitty Graphics",
        }
    }

    /// Check if this mode places images outside the cell buffer
    pub fn supports_images(&self) -> bool {
        matches!(self, RenderMode::Kitty)
    }

    /// Next mode in the cycle used by the UI toggle
    pub fn cycle(&self) -> RenderMode {
        match self {
            RenderMode::Ascii => RenderMode::Unicode,
            RenderMode::Unicode => RenderMode::Kitty,
            RenderMode::Kitty => RenderMode::Ascii,
        }
    }
}

/// Detect the best rendering mode for the current terminal
pub fn detect_render_mode() -> RenderMode {
    let mode = detect_from(|key| env::var(key).ok());
    log::info!("Detected render mode: {}", mode.name());
    mode
}

/// Detection over an arbitrary variable lookup
pub fn detect_from<F>(lookup: F) -> RenderMode
where
    F: Fn(&str) -> Option<String>,
{
    if is_kitty_supported(&lookup) {
        return RenderMode::Kitty;
    }
    if is_unicode_supported(&lookup) {
        return RenderMode::Unicode;
    }
    RenderMode::Ascii
}

fn is_kitty_supported<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(term) = lookup("TERM") {
        let term = term.to_lowercase();
        if term.contains("kitty") || term.contains("ghostty") {
            return true;
        }
    }

    if let Some(program) = lookup("TERM_PROGRAM") {
        let program = program.to_lowercase();
        if program.contains("kitty") || program.contains("ghostty") || program.contains("wezterm") {
            return true;
        }
    }

    ["KITTY_WINDOW_ID", "GHOSTTY_RESOURCES_DIR", "WEZTERM_PANE"]
        .iter()
        .any(|key| lookup(key).is_some())
}

fn is_unicode_supported<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    // LC_ALL overrides LANG
    let locale = lookup("LC_ALL")
        .filter(|v| !v.is_empty())
        .or_else(|| lookup("LANG"));

    match locale {
        Some(value) if value == "C" || value == "POSIX" => false,
        _ => true,
    }
}
