//! Item detail overlay
//!
//! Modal panel showing every field of one item. Stays open until closed
//! explicitly; showing another item overwrites everything.

use std::sync::Arc;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use super::{render_icon, ImagePlacement};
use crate::catalog::Item;
use crate::render::{IconCache, RenderMode};

const CLOSE_LABEL: &str = "[x]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Hidden,
    Visible,
}

/// Text shown in the overlay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub title: String,
    pub description: String,
    pub id: String,
    pub icon: String,
    pub rarity: String,
    pub unique: String,
    pub item_type: String,
    pub collection_type: String,
}

impl DetailFields {
    fn from_item(item: &Item) -> Self {
        Self {
            title: item.description.clone(),
            description: item.description2.clone(),
            id: item.id_text(),
            icon: item.icon.clone(),
            rarity: item.rare.clone(),
            unique: item.unique_label().to_string(),
            item_type: item.item_type.clone(),
            collection_type: item.collection_type.clone(),
        }
    }

    /// Labelled rows, in display order
    pub fn rows(&self) -> [(&'static str, &str); 6] {
        [
            ("ID", self.id.as_str()),
            ("Icon", self.icon.as_str()),
            ("Rarity", self.rarity.as_str()),
            ("Unique", self.unique.as_str()),
            ("Item Type", self.item_type.as_str()),
            ("Collection", self.collection_type.as_str()),
        ]
    }
}

#[derive(Debug, Default)]
pub struct DetailOverlay {
    state: OverlayState,
    fields: DetailFields,
    item: Option<Arc<Item>>,
    close_area: Option<Rect>,
}

impl DetailOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate from an item and make visible
    pub fn show(&mut self, item: Arc<Item>) {
        self.fields = DetailFields::from_item(&item);
        self.item = Some(item);
        self.state = OverlayState::Visible;
    }

    pub fn hide(&mut self) {
        self.state = OverlayState::Hidden;
        self.close_area = None;
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == OverlayState::Visible
    }

    pub fn fields(&self) -> &DetailFields {
        &self.fields
    }

    /// Item last shown
    pub fn item(&self) -> Option<&Arc<Item>> {
        self.item.as_ref()
    }

    /// Whether a position is on the close control
    pub fn hits_close(&self, x: u16, y: u16) -> bool {
        self.close_area.is_some_and(|r| {
            x >= r.left() && x < r.right() && y >= r.top() && y < r.bottom()
        })
    }
}

/// Overlay box: 70% x 70% of the screen, at least 50x16 when room allows
pub fn overlay_area(screen: Rect) -> Rect {
    let scale = |v: u16| (u32::from(v) * 7 / 10) as u16;
    let width = scale(screen.width).max(50).min(screen.width);
    let height = scale(screen.height).max(16).min(screen.height);
    Rect {
        x: screen.x + (screen.width - width) / 2,
        y: screen.y + (screen.height - height) / 2,
        width,
        height,
    }
}

pub struct DetailOverlayWidget<'a> {
    overlay: &'a mut DetailOverlay,
    icons: &'a mut IconCache,
    placements: &'a mut Vec<ImagePlacement>,
    mode: RenderMode,
}

impl<'a> DetailOverlayWidget<'a> {
    pub fn new(
        overlay: &'a mut DetailOverlay,
        icons: &'a mut IconCache,
        placements: &'a mut Vec<ImagePlacement>,
    ) -> Self {
        Self {
            overlay,
            icons,
            placements,
            mode: RenderMode::default(),
        }
    }

    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }
}

impl<'a> Widget for DetailOverlayWidget<'a> {
    fn render(mut self, screen: Rect, buf: &mut Buffer) {
        if !self.overlay.is_visible() {
            return;
        }
        let area = overlay_area(screen);
        Clear.render(area, buf);

        let fields = &self.overlay.fields;
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", fields.title),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(area);
        block.render(area, buf);

        // Close control in the top border
        let close_x = area.right().saturating_sub(CLOSE_LABEL.len() as u16 + 1);
        buf.set_string(close_x, area.y, CLOSE_LABEL, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
        let close_area = Rect::new(close_x, area.y, CLOSE_LABEL.len() as u16, 1);

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(18), Constraint::Min(10)])
            .split(sections[0]);

        // Image box, one cell of padding
        let image_area = Rect {
            x: top[0].x + 1,
            y: top[0].y,
            width: top[0].width.saturating_sub(2),
            height: top[0].height,
        };
        if let Some(item) = &self.overlay.item {
            render_icon(self.icons, &item.item_id, self.mode, image_area, buf, self.placements);
        }

        let label_style = Style::default().fg(Color::DarkGray);
        let value_style = Style::default().fg(Color::White);
        let lines: Vec<Line> = fields
            .rows()
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{:<12}", label), label_style),
                    Span::styled(value.to_string(), value_style),
                ])
            })
            .collect();
        Paragraph::new(lines).render(top[1], buf);

        Paragraph::new(fields.description.as_str())
            .style(Style::default().fg(Color::Rgb(180, 180, 190)))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP).title(" Description "))
            .render(sections[1], buf);

        Paragraph::new("[Esc] Close")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .render(sections[2], buf);

        self.overlay.close_area = Some(close_area);
    }
}
