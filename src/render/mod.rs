//! Rendering support
//!
//! Icons can be drawn three ways:
//! - ASCII: a flat colour swatch
//! - Unicode: half-block thumbnails
//! - Kitty: real images via the Kitty graphics protocol

pub mod mode;
pub mod kitty;
pub mod icons;

pub use mode::{RenderMode, detect_render_mode};
pub use kitty::KittyGraphics;
pub use icons::{Icon, IconCache, IconPaths, Thumbnail};
