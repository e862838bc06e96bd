use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::collection::CollectionKind;
use crate::filter::CategoryFilter;
use crate::state::{AppState, AuthMode, EnrichedEntry, LoginField};

const BG_BASE: Color = Color::Rgb(16, 16, 20);
const BG_PANEL: Color = Color::Rgb(26, 26, 32);
const BG_HIGHLIGHT: Color = Color::Rgb(104, 28, 32);
const TEXT_MAIN: Color = Color::Rgb(236, 236, 240);
const TEXT_DIM: Color = Color::Rgb(164, 164, 176);
const ACCENT_RED: Color = Color::Rgb(225, 66, 60);
const ACCENT_GOLD: Color = Color::Rgb(255, 203, 5);

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GridComponentId {
    Login,
    List,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridContext {
    Login,
    Browse,
    Search,
}

impl EventRoutingState<GridComponentId, GridContext> for AppState {
    fn focused(&self) -> Option<GridComponentId> {
        if !self.auth.authenticated {
            return Some(GridComponentId::Login);
        }
        if self.search.active {
            return Some(GridComponentId::Search);
        }
        Some(GridComponentId::List)
    }

    fn modal(&self) -> Option<GridComponentId> {
        if !self.auth.authenticated {
            return Some(GridComponentId::Login);
        }
        if self.search.active {
            return Some(GridComponentId::Search);
        }
        None
    }

    fn binding_context(&self, id: GridComponentId) -> GridContext {
        match id {
            GridComponentId::Login => GridContext::Login,
            GridComponentId::List => GridContext::Browse,
            GridComponentId::Search => GridContext::Search,
        }
    }

    fn default_context(&self) -> GridContext {
        GridContext::Browse
    }
}

pub struct GridUi {
    list: SelectList,
    status_bar: StatusBar,
}

impl Default for GridUi {
    fn default() -> Self {
        Self::new()
    }
}

impl GridUi {
    pub fn new() -> Self {
        Self {
            list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<GridComponentId>,
    ) {
        render_app(
            frame,
            area,
            state,
            render_ctx,
            event_ctx,
            &mut self.list,
            &mut self.status_bar,
        );
    }

    pub fn handle_login_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_login_event(event, state)
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_list_event(event, state, &mut self.list)
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state)
    }
}

pub fn render_app(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    _render_ctx: RenderContext,
    event_ctx: &mut EventContext<GridComponentId>,
    list: &mut SelectList,
    status_bar: &mut StatusBar,
) {
    let base = Block::default().style(Style::default().bg(BG_BASE));
    frame.render_widget(base, area);

    if !state.auth.authenticated {
        event_ctx.set_component_area(GridComponentId::Login, area);
        render_login(frame, area, state);
        return;
    }
    event_ctx.component_areas.remove(&GridComponentId::Login);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);

    if state.search.active {
        event_ctx.set_component_area(GridComponentId::Search, layout[0]);
    } else {
        event_ctx.component_areas.remove(&GridComponentId::Search);
    }
    render_header(frame, layout[0], state);

    event_ctx.set_component_area(GridComponentId::List, layout[1]);
    render_body(frame, layout[1], state, list);

    render_footer(frame, layout[2], state, status_bar);
}

pub fn handle_login_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => {
            if key
                .modifiers
                .contains(crossterm::event::KeyModifiers::CONTROL)
            {
                match key.code {
                    crossterm::event::KeyCode::Char('r') => vec![Action::AuthModeToggle],
                    crossterm::event::KeyCode::Char('c') => vec![Action::Quit],
                    _ => vec![],
                }
            } else {
                match key.code {
                    crossterm::event::KeyCode::Esc => vec![Action::Quit],
                    crossterm::event::KeyCode::Enter => vec![Action::AuthSubmit],
                    crossterm::event::KeyCode::Tab
                    | crossterm::event::KeyCode::Up
                    | crossterm::event::KeyCode::Down => vec![Action::AuthFieldNext],
                    crossterm::event::KeyCode::Backspace => vec![Action::AuthBackspace],
                    crossterm::event::KeyCode::Char(ch) => vec![Action::AuthInput(ch)],
                    _ => vec![],
                }
            }
        }
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_list_event(
    event: &EventKind,
    state: &AppState,
    list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::PageDown => vec![Action::SelectionPage(1)],
            crossterm::event::KeyCode::PageUp => vec![Action::SelectionPage(-1)],
            crossterm::event::KeyCode::Left => vec![Action::PagePrev],
            crossterm::event::KeyCode::Right => vec![Action::PageNext],
            crossterm::event::KeyCode::Char('f') => vec![Action::ToggleFavorite],
            crossterm::event::KeyCode::Char('c') => vec![Action::FilterNext],
            crossterm::event::KeyCode::Char('C') => vec![Action::FilterPrev],
            crossterm::event::KeyCode::Char('s') => vec![Action::SortNext],
            crossterm::event::KeyCode::Char('[') => vec![Action::CollectionPrev],
            crossterm::event::KeyCode::Char(']') => vec![Action::CollectionNext],
            crossterm::event::KeyCode::Char(ch @ '1'..='9')
                if state.collection.supports_generations() =>
            {
                vec![Action::JumpToGeneration(ch as u8 - b'0')]
            }
            _ => {
                let items = entry_items(state);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.selected_index.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: grid_list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::Select,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = list.handle_event(event, props).into_iter().collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc => vec![Action::SearchCancel],
            crossterm::event::KeyCode::Enter => vec![Action::SearchSubmit],
            crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
            crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

pub fn render_login(frame: &mut Frame, area: Rect, state: &AppState) {
    let title_style = Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD);
    let heading = match state.auth.mode {
        AuthMode::Login => "SIGN IN",
        AuthMode::Register => "CREATE ACCOUNT",
    };
    let field_line = |label: &str, value: &str, masked: bool, active: bool| {
        let marker = if active { "> " } else { "  " };
        let shown = if masked {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let cursor = if active { "_" } else { "" };
        Line::from(vec![
            Span::styled(marker.to_string(), Style::default().fg(ACCENT_GOLD)),
            Span::styled(format!("{label:<10}"), Style::default().fg(TEXT_DIM)),
            Span::styled(format!("{shown}{cursor}"), Style::default().fg(TEXT_MAIN)),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled("POKEGRID", title_style)),
        Line::from(Span::styled(heading, Style::default().fg(ACCENT_GOLD))),
        Line::default(),
        field_line(
            "Username",
            &state.auth.username,
            false,
            state.auth.field == LoginField::Username,
        ),
        field_line(
            "Password",
            &state.auth.password,
            true,
            state.auth.field == LoginField::Password,
        ),
        Line::default(),
    ];
    if state.auth.submitting {
        lines.push(Line::from(Span::styled(
            "Submitting...",
            Style::default().fg(TEXT_DIM),
        )));
    } else if let Some(error) = state.auth.error.as_deref() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(ACCENT_RED),
        )));
    } else {
        let hint = match state.auth.mode {
            AuthMode::Login => "Ctrl+R to create an account",
            AuthMode::Register => "Ctrl+R to sign in instead",
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(TEXT_DIM),
        )));
    }

    let panel = centered_panel(area, 46, 12);
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(ACCENT_RED));
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        panel,
    );
}

pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let title_style = Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD);
    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if let Some(query) = state.criteria.mode.query() {
        format!("/{query}")
    } else {
        "/".to_string()
    };
    let position = if state.criteria.mode.is_searching() {
        format!("{} matches", state.visible.len())
    } else {
        format!(
            "PAGE {:02}/{:02}",
            state.pager.current_page(),
            state.pager.total_pages()
        )
    };
    let header_text = Text::from(vec![
        Line::from(vec![
            Span::styled(state.collection.label(), title_style),
            Span::raw("  "),
            Span::styled(position, Style::default().fg(ACCENT_GOLD)),
            Span::raw("  |  Search: "),
            Span::styled(search, Style::default().fg(ACCENT_RED)),
        ]),
        Line::from(vec![
            Span::raw("Filter: "),
            Span::styled(
                state.criteria.category.label(),
                Style::default().fg(ACCENT_GOLD),
            ),
            Span::raw("  Sort: "),
            Span::styled(
                state.criteria.sort.label(),
                Style::default().fg(ACCENT_GOLD),
            ),
            Span::raw("  User: "),
            Span::styled(
                state.auth.username.clone(),
                Style::default().fg(ACCENT_RED),
            ),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .title("POKEGRID");
    frame.render_widget(
        Paragraph::new(header_text)
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

pub fn render_body(frame: &mut Frame, area: Rect, state: &AppState, list: &mut SelectList) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(state.collection.label())
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(error) = view_error(state) {
        frame.render_widget(
            Paragraph::new(format!("Error: {error}"))
                .style(Style::default().fg(ACCENT_RED))
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    if state.view_loading() {
        frame.render_widget(
            Paragraph::new(format!("Loading {}...", state.collection.slug()))
                .style(Style::default().fg(TEXT_DIM))
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    if state.visible.is_empty() {
        frame.render_widget(
            Paragraph::new(empty_message(state))
                .style(Style::default().fg(TEXT_DIM))
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let items = entry_items(state);
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.selected_index.min(items.len().saturating_sub(1)),
        is_focused: !state.search.active,
        style: grid_list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::Select,
        render_item: &|item| item.clone(),
    };
    list.render(frame, inner, props);
}

fn view_error(state: &AppState) -> Option<&str> {
    if state.criteria.mode.is_searching() {
        return state.search_error.as_deref();
    }
    match &state.page {
        tui_dispatch::DataResource::Failed(error) => Some(error.as_str()),
        _ => None,
    }
}

fn empty_message(state: &AppState) -> String {
    if state.criteria.mode.is_searching() {
        return format!("No {} match your search.", state.collection.slug());
    }
    if state.criteria.category == CategoryFilter::Favorites {
        return "No favorites yet. Press f to add one.".to_string();
    }
    "Nothing on this page.".to_string()
}

pub fn entry_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .visible
        .iter()
        .map(|entry| {
            let fav = if state.is_favorite(&entry.name) {
                "*"
            } else {
                " "
            };
            let number = entry
                .numeric_id
                .map(|id| format!("#{id:04}"))
                .unwrap_or_else(|| "#----".to_string());
            Line::from(format!(
                "{fav} {number} {name}{extra}",
                name = entry.name,
                extra = entry_extra(state.collection, entry)
            ))
        })
        .collect()
}

fn entry_extra(kind: CollectionKind, entry: &EnrichedEntry) -> String {
    match kind {
        CollectionKind::Pokemon => entry
            .generation
            .map(|gen| format!("  Gen {gen}"))
            .unwrap_or_default(),
        CollectionKind::Items => {
            let mut extra = String::new();
            if let Some(cost) = entry.cost {
                extra.push_str(&format!("  {cost}c"));
            }
            if let Some(category) = entry.category.as_deref() {
                extra.push_str(&format!("  [{category}]"));
            }
            extra
        }
        CollectionKind::Cards => {
            let mut extra = String::new();
            if let Some(rarity) = entry.rarity.as_deref() {
                extra.push_str(&format!("  {rarity}"));
            }
            if let Some(price) = entry.market_price {
                extra.push_str(&format!("  {price:.2}eur"));
            }
            extra
        }
        CollectionKind::Sets => entry
            .category
            .as_deref()
            .map(|series| format!("  [{series}]"))
            .unwrap_or_default(),
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = state.message.clone().unwrap_or_else(|| {
        if state.view_loading() {
            format!("Loading {}...", state.collection.slug())
        } else if !state.index_loading.is_empty() {
            "Indexing...".to_string()
        } else {
            String::new()
        }
    });
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_RED)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        let left = vec![
            StatusBarHint::new("Enter", "Search"),
            StatusBarHint::new("Esc", "Cancel"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        return (left, Vec::new());
    }

    let mut left = vec![
        StatusBarHint::new("j/k", "Move"),
        StatusBarHint::new("←/→", "Page"),
        StatusBarHint::new("f", "Favorite"),
        StatusBarHint::new("c", "Filter"),
        StatusBarHint::new("s", "Sort"),
    ];
    if state.collection.supports_generations() {
        left.push(StatusBarHint::new("1-9", "Gen"));
    }
    let center = vec![
        StatusBarHint::new("[ ]", "Collection"),
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("z", "Sign out"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn grid_list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn centered_panel(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
