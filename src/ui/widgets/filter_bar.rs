//! Search field, search button and category selectors

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use super::truncate_label;
use crate::catalog::{FilterField, Selector};

/// Editing operations on the search field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Clear,
}

/// Single-line text input with a cursor (in chars)
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    buffer: String,
    cursor: usize,
}

impl SearchInput {
    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    /// Apply an edit
    pub fn apply(&mut self, edit: TextEdit) {
        let len = self.buffer.chars().count();
        match edit {
            TextEdit::Insert(c) => {
                let at = self.byte_index(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
            }
            TextEdit::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            }
            TextEdit::Delete => {
                if self.cursor < len {
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            }
            TextEdit::Left => self.cursor = self.cursor.saturating_sub(1),
            TextEdit::Right => self.cursor = (self.cursor + 1).min(len),
            TextEdit::Home => self.cursor = 0,
            TextEdit::End => self.cursor = len,
            TextEdit::Clear => {
                self.buffer.clear();
                self.cursor = 0;
            }
        }
    }
}

/// Clickable regions from the last draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterBarLayout {
    pub search: Rect,
    pub button: Rect,
    pub selectors: [Rect; 3],
}

impl FilterBarLayout {
    fn contains(rect: Rect, x: u16, y: u16) -> bool {
        x >= rect.left() && x < rect.right() && y >= rect.top() && y < rect.bottom()
    }

    pub fn hits_search(&self, x: u16, y: u16) -> bool {
        Self::contains(self.search, x, y)
    }

    pub fn hits_button(&self, x: u16, y: u16) -> bool {
        Self::contains(self.button, x, y)
    }

    /// Selector under a position
    pub fn selector_at(&self, x: u16, y: u16) -> Option<FilterField> {
        self.selectors
            .iter()
            .zip(FilterField::ALL_FIELDS)
            .find(|(rect, _)| Self::contains(**rect, x, y))
            .map(|(_, field)| field)
    }
}

const BUTTON_LABEL: &str = "[ Search ]";

/// Two-row header: search field with button, then the three selectors
pub struct FilterBarWidget<'a> {
    input: &'a SearchInput,
    selectors: &'a [Selector; 3],
    layout: &'a mut FilterBarLayout,
    /// Focused element: None, the search field, or a selector
    focus_search: bool,
    focus_selector: Option<FilterField>,
}

impl<'a> FilterBarWidget<'a> {
    pub fn new(
        input: &'a SearchInput,
        selectors: &'a [Selector; 3],
        layout: &'a mut FilterBarLayout,
    ) -> Self {
        Self {
            input,
            selectors,
            layout,
            focus_search: false,
            focus_selector: None,
        }
    }

    pub fn focus_search(mut self, focused: bool) -> Self {
        self.focus_search = focused;
        self
    }

    pub fn focus_selector(mut self, field: Option<FilterField>) -> Self {
        self.focus_selector = field;
        self
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Rgb(100, 100, 120))
    }
}

impl<'a> Widget for FilterBarWidget<'a> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3)])
            .split(area);

        let search_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(BUTTON_LABEL.len() as u16 + 2),
            ])
            .split(rows[0]);

        // Search field
        let block = Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(border_style(self.focus_search));
        let inner = block.inner(search_row[0]);
        block.render(search_row[0], buf);

        let value = self.input.value();
        let width = usize::from(inner.width);
        // Keep the cursor in view for long queries
        let skip = (self.input.cursor() + 1).saturating_sub(width);
        let visible: String = value.chars().skip(skip).take(width).collect();
        if value.is_empty() && !self.focus_search {
            buf.set_string(inner.x, inner.y, "id, name or icon…", Style::default().fg(Color::DarkGray));
        } else {
            buf.set_string(inner.x, inner.y, &visible, Style::default().fg(Color::White));
        }
        if self.focus_search && inner.width > 0 {
            let cursor_x = inner.x + self.input.cursor().saturating_sub(skip) as u16;
            if let Some(cell) = buf.cell_mut((cursor_x, inner.y)) {
                cell.set_style(Style::default().add_modifier(Modifier::REVERSED));
            }
        }

        // Search button
        let button_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(100, 100, 120)));
        let button_inner = button_block.inner(search_row[1]);
        button_block.render(search_row[1], buf);
        buf.set_string(
            button_inner.x,
            button_inner.y,
            BUTTON_LABEL,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        );

        // Selectors
        let selector_cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(rows[1]);

        let mut selector_rects = [Rect::default(); 3];
        for (i, selector) in self.selectors.iter().enumerate() {
            let focused = self.focus_selector == Some(selector.field);
            let rect = selector_cols[i];
            let block = Block::default()
                .title(format!(" {} ", selector.field.name()))
                .borders(Borders::ALL)
                .border_style(border_style(focused));
            let inner = block.inner(rect);
            block.render(rect, buf);

            let label = truncate_label(
                selector.current().label(),
                usize::from(inner.width.saturating_sub(4)),
            );
            let text = format!("‹ {} ›", label);
            let style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            buf.set_string(inner.x, inner.y, &text, style);
            selector_rects[i] = rect;
        }

        *self.layout = FilterBarLayout {
            search: search_row[0],
            button: search_row[1],
            selectors: selector_rects,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> SearchInput {
        let mut input = SearchInput::default();
        for c in text.chars() {
            input.apply(TextEdit::Insert(c));
        }
        input
    }

    #[test]
    fn test_insert_and_backspace() {
        let mut input = typed("swrd");
        input.apply(TextEdit::Left);
        input.apply(TextEdit::Left);
        input.apply(TextEdit::Insert('o'));
        assert_eq!(input.value(), "sword");

        input.apply(TextEdit::End);
        input.apply(TextEdit::Backspace);
        assert_eq!(input.value(), "swor");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("épée");
        input.apply(TextEdit::Home);
        input.apply(TextEdit::Delete);
        assert_eq!(input.value(), "pée");
        input.apply(TextEdit::End);
        input.apply(TextEdit::Backspace);
        assert_eq!(input.value(), "pé");
    }

    #[test]
    fn test_cursor_bounds() {
        let mut input = typed("ab");
        input.apply(TextEdit::Right);
        assert_eq!(input.cursor(), 2);
        input.apply(TextEdit::Home);
        input.apply(TextEdit::Left);
        input.apply(TextEdit::Backspace);
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.value(), "ab");
        input.apply(TextEdit::Clear);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_layout_hit_testing() {
        let input = SearchInput::default();
        let selectors = FilterField::ALL_FIELDS.map(Selector::new);
        let mut layout = FilterBarLayout::default();
        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);

        FilterBarWidget::new(&input, &selectors, &mut layout).render(area, &mut buf);

        assert!(layout.hits_search(2, 1));
        assert!(layout.hits_button(58, 1));
        assert_eq!(layout.selector_at(1, 4), Some(FilterField::Rarity));
        assert_eq!(layout.selector_at(59, 4), Some(FilterField::CollectionType));
        assert_eq!(layout.selector_at(1, 1), None);
    }

    #[test]
    fn test_focused_search_survives_zero_width_field() {
        let input = typed("abc");
        let selectors = FilterField::ALL_FIELDS.map(Selector::new);
        for width in 1..20 {
            let mut layout = FilterBarLayout::default();
            let area = Rect::new(0, 0, width, 6);
            let mut buf = Buffer::empty(area);
            FilterBarWidget::new(&input, &selectors, &mut layout)
                .focus_search(true)
                .render(area, &mut buf);
        }
    }
}
