//! UI widgets

pub mod card_grid;
pub mod detail_overlay;
pub mod filter_bar;

pub use card_grid::{Card, CardGrid, CardGridWidget, CARD_HEIGHT, CARD_WIDTH};
pub use detail_overlay::{DetailFields, DetailOverlay, DetailOverlayWidget, OverlayState};
pub use filter_bar::{FilterBarLayout, FilterBarWidget, SearchInput, TextEdit};

use ratatui::{buffer::Buffer, layout::Rect};

use crate::catalog::ItemId;
use crate::render::{IconCache, RenderMode};

/// Where a Kitty image should be placed after the frame is drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlacement {
    pub item_id: ItemId,
    pub area: Rect,
}

/// Draw an item's icon into `area`. In Kitty mode the cells are blanked and a
/// placement is queued instead.
pub fn render_icon(
    icons: &mut IconCache,
    item_id: &ItemId,
    mode: RenderMode,
    area: Rect,
    buf: &mut Buffer,
    placements: &mut Vec<ImagePlacement>,
) {
    let area = area.intersection(buf.area);
    if area.is_empty() {
        return;
    }
    let icon = icons.get_or_load(item_id);

    match mode {
        RenderMode::Kitty => {
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.reset();
                    }
                }
            }
            placements.push(ImagePlacement {
                item_id: item_id.clone(),
                area,
            });
        }
        RenderMode::Unicode => {
            let thumb = icon.thumbnail(area.width, area.height);
            for row in 0..area.height {
                for col in 0..area.width {
                    if let (Some((top, bottom)), Some(cell)) =
                        (thumb.cell(col, row), buf.cell_mut((area.x + col, area.y + row)))
                    {
                        cell.set_char('▀').set_fg(top).set_bg(bottom);
                    }
                }
            }
        }
        RenderMode::Ascii => {
            let color = icon.average_color();
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_char('#').set_fg(color);
                    }
                }
            }
        }
    }
}

/// Truncate a string to fit within max_len characters, adding "…" if truncated
pub fn truncate_label(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else if max_len <= 1 {
        "…".chars().take(max_len).collect()
    } else {
        let truncated: String = name.chars().take(max_len - 1).collect();
        format!("{}…", truncated)
    }
}
