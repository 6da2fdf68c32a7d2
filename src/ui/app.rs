//! Main UI Application
//!
//! Owns the catalog and every widget's state, turns terminal input into
//! [`UiEvent`]s and draws the screen.

use std::io::{self, Write};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::catalog::{self, CatalogStore, FilterField, FilterState, LoadOutcome, Loader, Selector};
use crate::config::CatalogConfig;
use crate::render::{detect_render_mode, IconCache, KittyGraphics, RenderMode};
use super::widgets::{
    CardGrid, CardGridWidget, DetailOverlay, DetailOverlayWidget, FilterBarLayout,
    FilterBarWidget, ImagePlacement, SearchInput, TextEdit,
};

/// Which part of the screen receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Selector(FilterField),
    Grid,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Search,
        Focus::Selector(FilterField::Rarity),
        Focus::Selector(FilterField::ItemType),
        Focus::Selector(FilterField::CollectionType),
        Focus::Grid,
    ];

    fn position(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Focus {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> Focus {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Direction of a selector change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Prev,
}

/// Everything that can happen to the UI
#[derive(Debug)]
pub enum UiEvent {
    /// Dataset load finished, successfully or not
    LoadComplete(LoadOutcome),
    /// Search field edited. Does not search by itself.
    TextChanged(TextEdit),
    /// Enter pressed in the search field
    EnterPressed,
    /// Search button activated
    SearchClicked,
    /// A selector moved to another value
    FilterChanged(FilterField, Step),
    /// A card was chosen, by index into the displayed cards
    CardClicked(usize),
    /// Overlay close control activated
    CloseClicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed(String),
}

/// Main UI application
pub struct App {
    store: CatalogStore,
    loader: Option<Loader>,
    load_state: LoadState,
    search_input: SearchInput,
    selectors: [Selector; 3],
    grid: CardGrid,
    overlay: DetailOverlay,
    focus: Focus,
    /// Current icon render mode
    render_mode: RenderMode,
    icons: IconCache,
    /// Kitty placements requested by the last draw
    placements: Vec<ImagePlacement>,
    /// Kitty placements currently on screen
    presented: Vec<ImagePlacement>,
    filter_bar: FilterBarLayout,
    should_quit: bool,
}

impl App {
    /// Create the app and start loading the dataset
    pub fn new(config: &CatalogConfig) -> Self {
        let mut app = Self::detached(config);
        log::info!("Loading item data from {}", config.dataset_path.display());
        app.loader = Some(Loader::spawn(&config.dataset_path));
        app
    }

    /// Create the app without starting a load. The dataset arrives through
    /// [`UiEvent::LoadComplete`].
    pub fn detached(config: &CatalogConfig) -> Self {
        let render_mode = config.render_mode.unwrap_or_else(detect_render_mode);
        log::info!("Using render mode: {:?}", render_mode);

        Self {
            store: CatalogStore::new(),
            loader: None,
            load_state: LoadState::Pending,
            search_input: SearchInput::default(),
            selectors: FilterField::ALL_FIELDS.map(Selector::new),
            grid: CardGrid::new(),
            overlay: DetailOverlay::new(),
            focus: Focus::Search,
            render_mode,
            icons: IconCache::new(config.icon_paths()),
            placements: Vec::new(),
            presented: Vec::new(),
            filter_bar: FilterBarLayout::default(),
            should_quit: false,
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn grid(&self) -> &CardGrid {
        &self.grid
    }

    pub fn overlay(&self) -> &DetailOverlay {
        &self.overlay
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn selector(&self, field: FilterField) -> &Selector {
        &self.selectors[field_index(field)]
    }

    /// Cycle through render modes
    pub fn cycle_render_mode(&mut self) {
        self.render_mode = self.render_mode.cycle();
        log::info!("Switched to render mode: {:?}", self.render_mode);
    }

    /// Per-frame housekeeping: collect the dataset once it is ready
    pub fn tick(&mut self) {
        let outcome = match self.loader.as_mut().and_then(Loader::poll) {
            Some(outcome) => outcome,
            None => return,
        };
        self.loader = None;
        self.dispatch(UiEvent::LoadComplete(outcome));
    }

    /// The current search inputs
    pub fn filter_state(&self) -> FilterState {
        FilterState {
            query: self.search_input.value().to_string(),
            rarity: self.selector(FilterField::Rarity).current().clone(),
            item_type: self.selector(FilterField::ItemType).current().clone(),
            collection_type: self.selector(FilterField::CollectionType).current().clone(),
        }
    }

    /// Recompute results from the full store and rebuild the grid
    pub fn search(&mut self) {
        let filter = self.filter_state();
        let results = catalog::search(&self.store, &filter);
        log::debug!("Search {:?} matched {} of {} items", filter, results.len(), self.store.len());
        self.grid.render(results);
    }

    /// Event dispatch table
    pub fn dispatch(&mut self, event: UiEvent) {
        match event {
            UiEvent::LoadComplete(outcome) => self.on_load_complete(outcome),
            UiEvent::TextChanged(edit) => self.search_input.apply(edit),
            UiEvent::EnterPressed | UiEvent::SearchClicked => self.search(),
            UiEvent::FilterChanged(field, step) => {
                let selector = &mut self.selectors[field_index(field)];
                let changed = match step {
                    Step::Next => selector.next(),
                    Step::Prev => selector.prev(),
                };
                if changed {
                    self.search();
                }
            }
            UiEvent::CardClicked(index) => {
                if let Some(item) = self.grid.item(index).cloned() {
                    self.grid.set_cursor(index);
                    self.overlay.show(item);
                }
            }
            UiEvent::CloseClicked => self.overlay.hide(),
        }
    }

    fn on_load_complete(&mut self, outcome: LoadOutcome) {
        let items = match outcome {
            Ok(items) => items,
            Err(e) => {
                log::error!("Error loading item data: {}", e);
                self.load_state = LoadState::Failed(e.to_string());
                return;
            }
        };

        let count = items.len();
        if let Err(e) = self.store.populate(items) {
            log::warn!("Ignoring dataset: {}", e);
            return;
        }
        log::info!("Loaded {} items", count);

        self.selectors = FilterField::ALL_FIELDS.map(|field| Selector::from_store(field, &self.store));
        self.load_state = LoadState::Loaded;
        self.grid.render(self.store.items().iter().cloned());
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('r') if ctrl => {
                self.cycle_render_mode();
                return;
            }
            _ => {}
        }

        if self.overlay.is_visible() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('x')) {
                self.dispatch(UiEvent::CloseClicked);
            }
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Selector(field) => self.handle_selector_key(key, field),
            Focus::Grid => self.handle_grid_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let edit = match key.code {
            KeyCode::Enter => {
                self.dispatch(UiEvent::EnterPressed);
                return;
            }
            KeyCode::Down => {
                self.focus = Focus::Grid;
                return;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => TextEdit::Clear,
            KeyCode::Char(c) => TextEdit::Insert(c),
            KeyCode::Backspace => TextEdit::Backspace,
            KeyCode::Delete => TextEdit::Delete,
            KeyCode::Left => TextEdit::Left,
            KeyCode::Right => TextEdit::Right,
            KeyCode::Home => TextEdit::Home,
            KeyCode::End => TextEdit::End,
            KeyCode::Esc => TextEdit::Clear,
            _ => return,
        };
        self.dispatch(UiEvent::TextChanged(edit));
    }

    fn handle_selector_key(&mut self, key: KeyEvent, field: FilterField) {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') | KeyCode::Enter => {
                self.dispatch(UiEvent::FilterChanged(field, Step::Next));
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.dispatch(UiEvent::FilterChanged(field, Step::Prev));
            }
            KeyCode::Down => self.focus = Focus::Grid,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if self.grid.cursor() < self.grid.columns() {
                    self.focus = Focus::Search;
                } else {
                    self.grid.move_up();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.grid.move_down(),
            KeyCode::Left | KeyCode::Char('h') => self.grid.move_left(),
            KeyCode::Right | KeyCode::Char('l') => self.grid.move_right(),
            KeyCode::PageUp => self.grid.page_up(),
            KeyCode::PageDown => self.grid.page_down(),
            KeyCode::Home => self.grid.home(),
            KeyCode::End => self.grid.end(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if !self.grid.is_empty() {
                    self.dispatch(UiEvent::CardClicked(self.grid.cursor()));
                }
            }
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    /// Handle mouse input: clicks on cards, the search button, selectors and
    /// the overlay close control
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.overlay.is_visible() {
                    if self.overlay.hits_close(x, y) {
                        self.dispatch(UiEvent::CloseClicked);
                    }
                    return;
                }
                if self.filter_bar.hits_button(x, y) {
                    self.dispatch(UiEvent::SearchClicked);
                } else if self.filter_bar.hits_search(x, y) {
                    self.focus = Focus::Search;
                } else if let Some(field) = self.filter_bar.selector_at(x, y) {
                    self.focus = Focus::Selector(field);
                    self.dispatch(UiEvent::FilterChanged(field, Step::Next));
                } else if let Some(index) = self.grid.card_at(x, y) {
                    self.focus = Focus::Grid;
                    self.dispatch(UiEvent::CardClicked(index));
                }
            }
            MouseEventKind::ScrollDown if !self.overlay.is_visible() => self.grid.move_down(),
            MouseEventKind::ScrollUp if !self.overlay.is_visible() => self.grid.move_up(),
            _ => {}
        }
    }

    /// Render the whole screen
    pub fn render(&mut self, frame: &mut Frame) {
        frame.render_widget(Clear, frame.area());
        self.placements.clear();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Search + selectors
                Constraint::Min(3),    // Cards
                Constraint::Length(1), // Status
            ])
            .split(frame.area());

        let focus_selector = match self.focus {
            Focus::Selector(field) => Some(field),
            _ => None,
        };
        frame.render_widget(
            FilterBarWidget::new(&self.search_input, &self.selectors, &mut self.filter_bar)
                .focus_search(self.focus == Focus::Search)
                .focus_selector(focus_selector),
            chunks[0],
        );

        let title = format!(" Items ({}/{}) ", self.grid.len(), self.store.len());
        frame.render_widget(
            CardGridWidget::new(&mut self.grid, &mut self.icons, &mut self.placements)
                .mode(self.render_mode)
                .focused(self.focus == Focus::Grid && !self.overlay.is_visible())
                .title(&title),
            chunks[1],
        );

        frame.render_widget(Paragraph::new(self.status_line()), chunks[2]);

        if self.overlay.is_visible() {
            // Images under the modal would be drawn on top of it
            self.placements.clear();
            let area = frame.area();
            frame.render_widget(
                DetailOverlayWidget::new(&mut self.overlay, &mut self.icons, &mut self.placements)
                    .mode(self.render_mode),
                area,
            );
        }
    }

    fn status_line(&self) -> Line<'static> {
        let (state, color) = match &self.load_state {
            LoadState::Pending => ("Loading…".to_string(), Color::Yellow),
            LoadState::Loaded => (format!("{} items", self.store.len()), Color::Green),
            LoadState::Failed(_) => ("Failed to load items".to_string(), Color::Red),
        };
        Line::from(vec![
            Span::styled(format!(" {} ", state), Style::default().fg(color)),
            Span::styled(
                format!("│ {} │ ", self.render_mode.name()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                "[Tab] Focus  [Enter] Search/Open  [←→] Filter  [Esc] Close  [Ctrl+R] Icons  [Ctrl+Q] Quit",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }

    /// Forget what is on screen so the next present redraws every image
    pub fn invalidate_images(&mut self) {
        self.presented.clear();
    }

    /// Draw Kitty images for the last frame. Placements are only rewritten
    /// when they differ from what is on screen.
    pub fn present_images<W: Write>(&mut self, kitty: &mut KittyGraphics<W>) -> io::Result<()> {
        if !self.render_mode.supports_images() {
            self.placements.clear();
        }
        if self.placements == self.presented {
            return Ok(());
        }

        kitty.clear_placements()?;
        for placement in &self.placements {
            let icon = self.icons.get_or_load(&placement.item_id);
            let image_id = match icon.kitty_id {
                Some(id) if kitty.is_uploaded(id) => id,
                _ => {
                    let id = kitty.upload_image(icon.image())?;
                    icon.kitty_id = Some(id);
                    id
                }
            };
            let area = placement.area;
            kitty.display_image_at(image_id, area.x, area.y, area.width, area.height)?;
        }
        self.presented = self.placements.clone();
        Ok(())
    }
}

fn field_index(field: FilterField) -> usize {
    match field {
        FilterField::Rarity => 0,
        FilterField::ItemType => 1,
        FilterField::CollectionType => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Item, Selection};
    use crossterm::event::KeyEventKind;
    use ratatui::{backend::TestBackend, Terminal};

    fn config() -> CatalogConfig {
        CatalogConfig {
            icons_dir: "no/such/ICONS".into(),
            placeholder_path: "no/such/placeholder.png".into(),
            render_mode: Some(RenderMode::Ascii),
            ..CatalogConfig::default()
        }
    }

    fn item(id: i64, description: &str, rare: &str) -> Item {
        Item {
            item_id: id.into(),
            description: description.to_string(),
            rare: rare.to_string(),
            ..Item::default()
        }
    }

    fn loaded_app() -> App {
        let mut app = App::detached(&config());
        app.dispatch(UiEvent::LoadComplete(Ok(vec![
            item(101, "Sword", "Common"),
            item(102, "Axe", "Rare"),
            item(103, "Spear", "Common"),
        ])));
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn labels(app: &App) -> Vec<String> {
        app.grid().cards().iter().map(|c| c.label.clone()).collect()
    }

    fn draw(app: &mut App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
    }

    fn click(x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_load_renders_every_item() {
        let app = loaded_app();
        assert_eq!(app.load_state(), &LoadState::Loaded);
        assert_eq!(labels(&app), ["Sword", "Axe", "Spear"]);
    }

    #[test]
    fn test_failed_load_leaves_store_empty() {
        let mut app = App::detached(&config());
        app.dispatch(UiEvent::LoadComplete(Err(crate::catalog::CatalogError::WorkerGone)));

        assert!(matches!(app.load_state(), LoadState::Failed(_)));
        assert!(app.store().is_empty());
        app.dispatch(UiEvent::SearchClicked);
        assert!(app.grid().is_empty());
    }

    #[test]
    fn test_typing_does_not_search_until_enter() {
        let mut app = loaded_app();
        type_text(&mut app, "sp");
        assert_eq!(app.grid().len(), 3);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(labels(&app), ["Spear"]);
    }

    #[test]
    fn test_selector_change_searches_immediately() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus(), Focus::Selector(FilterField::Rarity));

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.selector(FilterField::Rarity).current(), &Selection::from("Common"));
        assert_eq!(labels(&app), ["Sword", "Spear"]);

        app.handle_key(key(KeyCode::Left));
        assert_eq!(labels(&app), ["Sword", "Axe", "Spear"]);
    }

    #[test]
    fn test_every_search_starts_from_full_store() {
        let mut app = loaded_app();
        type_text(&mut app, "zzz_no_match");
        app.dispatch(UiEvent::EnterPressed);
        assert!(app.grid().is_empty());

        app.dispatch(UiEvent::TextChanged(TextEdit::Clear));
        app.dispatch(UiEvent::SearchClicked);
        assert_eq!(app.grid().len(), 3);
    }

    #[test]
    fn test_grid_enter_opens_overlay_and_esc_closes() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.focus(), Focus::Grid);

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.overlay().is_visible());
        assert_eq!(app.overlay().fields().title, "Axe");

        // Overlay captures input
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.grid().cursor(), 1);

        app.handle_key(key(KeyCode::Esc));
        assert!(!app.overlay().is_visible());
    }

    #[test]
    fn test_mouse_click_on_card_and_close() {
        let mut app = loaded_app();
        draw(&mut app);

        let (x, y) = (0..40u16)
            .flat_map(|y| (0..100u16).map(move |x| (x, y)))
            .find(|&(x, y)| app.grid().card_at(x, y) == Some(2))
            .expect("third card drawn");
        app.handle_mouse(click(x, y));
        assert_eq!(app.overlay().fields().title, "Spear");

        draw(&mut app);
        let (cx, cy) = (0..40u16)
            .flat_map(|y| (0..100u16).map(move |x| (x, y)))
            .find(|&(x, y)| app.overlay().hits_close(x, y))
            .expect("close control drawn");
        app.handle_mouse(click(cx, cy));
        assert!(!app.overlay().is_visible());
    }

    #[test]
    fn test_narrow_terminals_draw_without_panicking() {
        let mut app = loaded_app();
        type_text(&mut app, "a");
        assert_eq!(app.focus(), Focus::Search);

        for width in 1..20 {
            let mut terminal = Terminal::new(TestBackend::new(width, 10)).unwrap();
            terminal.draw(|frame| app.render(frame)).unwrap();
        }

        app.dispatch(UiEvent::CardClicked(0));
        for width in 1..20 {
            let mut terminal = Terminal::new(TestBackend::new(width, 10)).unwrap();
            terminal.draw(|frame| app.render(frame)).unwrap();
        }
    }

    #[test]
    fn test_quit_shortcuts() {
        let mut app = loaded_app();
        type_text(&mut app, "q");
        assert!(!app.should_quit());

        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn test_render_mode_cycles() {
        let mut app = loaded_app();
        app.handle_key(KeyEvent {
            kind: KeyEventKind::Press,
            ..KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)
        });
        assert_eq!(app.render_mode(), RenderMode::Unicode);
    }

    #[test]
    fn test_kitty_images_presented_once() {
        let mut app = App::detached(&CatalogConfig {
            render_mode: Some(RenderMode::Kitty),
            ..config()
        });
        app.dispatch(UiEvent::LoadComplete(Ok(vec![item(1, "Sword", "Common")])));
        draw(&mut app);

        let mut kitty = KittyGraphics::new(Vec::new());
        app.present_images(&mut kitty).unwrap();
        let first = kitty.get_ref().len();
        assert!(first > 0);

        draw(&mut app);
        app.present_images(&mut kitty).unwrap();
        assert_eq!(kitty.get_ref().len(), first);

        app.invalidate_images();
        app.present_images(&mut kitty).unwrap();
        assert!(kitty.get_ref().len() > first);
    }
}
