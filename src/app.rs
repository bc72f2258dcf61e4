use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::host::{ChannelHost, HostEvent, Notice};
use crate::message::Inbound;
use crate::registry::{InstanceId, ViewInstance};
use crate::render::{FsRenderer, Renderer};
use crate::search::MIN_QUERY_LEN;
use crate::state::DocumentState;
use crate::theme::UiPalette;
use crate::view::{Pane, NO_WRAP};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use notify::{RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph};
use ratatui::Terminal;
use std::collections::{HashMap, HashSet};
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::LocalSet;

type DocCoordinator = Coordinator<FsRenderer, ChannelHost>;

const RELOAD_DEBOUNCE: Duration = Duration::from_millis(150);

// `path` is the logical file, `source` what gets rendered.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub path: PathBuf,
    pub source: PathBuf,
}

pub fn run_app(requests: Vec<OpenRequest>, config: Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    LocalSet::new().block_on(&runtime, run(requests, config))
}

async fn run(requests: Vec<OpenRequest>, config: Config) -> Result<()> {
    let (tx, rx) = unbounded_channel();
    let coordinator = Rc::new(
        Coordinator::new(
            DocumentState::from_config(&config),
            FsRenderer::new(config.converter.clone()),
            ChannelHost::new(tx),
        )
        .with_max_diff_blocks(config.max_diff_blocks),
    );

    let mut app = App::new(config, coordinator, rx);
    for request in requests {
        app.open(request).await;
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (fs_tx, fs_rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = fs_tx.send(res);
    })?;
    let sources: HashSet<PathBuf> = app.panes.iter().map(|p| p.source.clone()).collect();
    for source in &sources {
        if let Err(err) = watcher.watch(source, RecursiveMode::NonRecursive) {
            log::warn!("not watching {}: {err}", source.display());
        }
    }

    let tick_rate = Duration::from_millis(50);

    loop {
        app.drain_host_events();

        let size = terminal.size()?;
        let layout = app.layout(size);
        app.prepare(&layout);
        app.report_scrolls(&layout);

        terminal.draw(|f| ui(f, &app, &layout))?;

        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key, &layout) {
                    break;
                }
            }
        } else {
            tokio::time::sleep(tick_rate).await;
        }

        while let Ok(msg) = fs_rx.try_recv() {
            if let Ok(event) = msg {
                app.on_fs_event(event);
            }
        }

        app.handle_pending_reload().await;
    }

    app.close_all();
    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

struct PaneLayout {
    area: Rect,
    toolbar: Option<Rect>,
    outline: Option<Rect>,
    content: Rect,
}

struct LayoutInfo {
    panes: Vec<PaneLayout>,
    status: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    SearchInput,
}

struct App {
    config: Config,
    mode: Mode,
    search_input: String,
    coordinator: Rc<DocCoordinator>,
    events: UnboundedReceiver<HostEvent>,
    panes: Vec<Pane>,
    focused: usize,
    next_id: u64,
    status: Option<String>,
    reloads: HashMap<PathBuf, Instant>,
}

impl App {
    fn new(config: Config, coordinator: Rc<DocCoordinator>, events: UnboundedReceiver<HostEvent>) -> Self {
        Self {
            config,
            mode: Mode::Normal,
            search_input: String::new(),
            coordinator,
            events,
            panes: Vec::new(),
            focused: 0,
            next_id: 1,
            status: None,
            reloads: HashMap::new(),
        }
    }

    async fn open(&mut self, request: OpenRequest) {
        let id = InstanceId::new(self.next_id);
        self.next_id += 1;

        let instance = ViewInstance::with_source(id, request.path.clone(), request.source.clone());
        let state = self.coordinator.open(instance);
        let mut pane = Pane::new(id, request.path.clone(), request.source.clone(), state);
        match self.coordinator.renderer().render_to_markup(&request.source).await {
            Ok(markup) => pane.set_markup(&markup),
            Err(err) => {
                log::error!("failed to render {}: {err}", request.source.display());
                pane.set_error(err.to_string());
            }
        }
        self.panes.push(pane);
        self.spawn_diff(request.path);
    }

    fn close_focused(&mut self) {
        if self.panes.len() <= 1 {
            self.status = Some("Last pane; press q to quit".to_string());
            return;
        }
        let pane = self.panes.remove(self.focused);
        self.focused = self.focused.min(self.panes.len() - 1);
        if let Some(closed) = self.coordinator.close(pane.id) {
            if closed.rediff {
                self.spawn_diff(closed.instance.path);
            }
        }
    }

    fn close_all(&mut self) {
        for pane in self.panes.drain(..) {
            self.coordinator.close(pane.id);
        }
    }

    fn spawn_diff(&self, path: PathBuf) {
        let coordinator = Rc::clone(&self.coordinator);
        tokio::task::spawn_local(async move {
            let outcome = coordinator.maybe_trigger_diff(&path).await;
            log::debug!("diff for {}: {outcome:?}", path.display());
        });
    }

    fn drain_host_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                HostEvent::Post(id, message) => match self.panes.iter_mut().find(|p| p.id == id) {
                    Some(pane) => pane.apply(message),
                    None => log::debug!("message for closed pane {id} dropped"),
                },
                HostEvent::Notice(level, text) => {
                    match level {
                        Notice::Info => log::info!("{text}"),
                        Notice::Error => log::error!("{text}"),
                    }
                    self.status = Some(text);
                }
            }
        }
    }

    fn layout(&self, size: Rect) -> LayoutInfo {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(size);
        let main = vertical[0];
        let status = vertical[1];

        let count = self.panes.len().max(1) as u32;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, count); count as usize])
            .split(main);

        let panes = self
            .panes
            .iter()
            .zip(columns.iter())
            .map(|(pane, area)| self.pane_layout(pane, *area))
            .collect();

        LayoutInfo { panes, status }
    }

    fn pane_layout(&self, pane: &Pane, area: Rect) -> PaneLayout {
        let inner = Block::bordered().inner(area);
        let (toolbar, body) = if pane.state.toolbar_visible && inner.height > 1 {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(inner);
            (Some(split[0]), split[1])
        } else {
            (None, inner)
        };

        let outline_width = self.config.outline_width.min(body.width.saturating_sub(20));
        let (outline, content) = if pane.state.outline_visible && outline_width >= 8 {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(outline_width), Constraint::Min(20)])
                .split(body);
            (Some(split[0]), split[1])
        } else {
            (None, body)
        };

        PaneLayout {
            area,
            toolbar,
            outline,
            content,
        }
    }

    fn prepare(&mut self, layout: &LayoutInfo) {
        let wrap = self.config.wrap;
        for (pane, pl) in self.panes.iter_mut().zip(&layout.panes) {
            let width = if wrap { pl.content.width } else { NO_WRAP };
            pane.prepare(width, pl.content.height);
        }
    }

    fn report_scrolls(&mut self, layout: &LayoutInfo) {
        let mut reports = Vec::new();
        for (pane, pl) in self.panes.iter_mut().zip(&layout.panes) {
            if let Some(fraction) = pane.take_scroll_report(pl.content.height) {
                reports.push((pane.id, fraction));
            }
        }
        for (id, fraction) in reports {
            self.coordinator
                .handle_message(id, Inbound::Scroll { scroll_percent: fraction });
        }
    }

    fn focused_pane(&mut self) -> Option<&mut Pane> {
        self.panes.get_mut(self.focused)
    }

    fn handle_key(&mut self, key: KeyEvent, layout: &LayoutInfo) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        let height = layout
            .panes
            .get(self.focused)
            .map(|pl| pl.content.height)
            .unwrap_or(1);
        let page = height.saturating_sub(1).max(1) as isize;
        if self.mode == Mode::SearchInput {
            self.handle_search_input(key);
            return false;
        }
        self.status = None;

        let Some(id) = self.panes.get(self.focused).map(|p| p.id) else {
            return key.code == KeyCode::Char('q');
        };

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.focused = (self.focused + 1) % self.panes.len(),
            KeyCode::BackTab => {
                self.focused = (self.focused + self.panes.len() - 1) % self.panes.len();
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll_focused(1, height),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_focused(-1, height),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_focused(page, height),
            KeyCode::PageUp => self.scroll_focused(-page, height),
            KeyCode::Char('g') | KeyCode::Home => {
                if let Some(pane) = self.focused_pane() {
                    pane.scroll_to_top();
                }
            }
            KeyCode::Char('G') | KeyCode::End => {
                if let Some(pane) = self.focused_pane() {
                    pane.scroll_to_bottom(height);
                }
            }
            KeyCode::Char(']') => {
                if let Some(pane) = self.focused_pane() {
                    pane.next_heading();
                }
            }
            KeyCode::Char('[') => {
                if let Some(pane) = self.focused_pane() {
                    pane.prev_heading();
                }
            }
            KeyCode::Char('n') => {
                if let Some(pane) = self.focused_pane() {
                    pane.next_change();
                }
            }
            KeyCode::Char('N') => {
                if let Some(pane) = self.focused_pane() {
                    pane.prev_change();
                }
            }
            KeyCode::Char('/') => self.start_search(),
            KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => self.start_search(),
            KeyCode::Char('.') | KeyCode::F(3) if !key.modifiers.contains(KeyModifiers::SHIFT) => {
                if let Some(pane) = self.focused_pane() {
                    pane.next_match();
                }
            }
            KeyCode::Char(',') | KeyCode::F(3) => {
                if let Some(pane) = self.focused_pane() {
                    pane.prev_match();
                }
            }
            KeyCode::Esc => {
                if let Some(pane) = self.focused_pane() {
                    pane.clear_search();
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.coordinator.zoom_in(id);
            }
            KeyCode::Char('-') => {
                self.coordinator.zoom_out(id);
            }
            KeyCode::Char('0') => {
                self.coordinator.reset_zoom(id);
            }
            KeyCode::Char('o') => {
                self.coordinator.toggle_outline(id);
            }
            KeyCode::Char('t') => {
                self.coordinator.cycle_theme(id);
            }
            KeyCode::Char('b') => {
                self.coordinator.toggle_toolbar(id);
            }
            KeyCode::Char('r') => {
                if let Some(path) = self.panes.get(self.focused).map(|p| p.path.clone()) {
                    self.spawn_diff(path);
                    self.status = Some("Comparing…".to_string());
                }
            }
            KeyCode::Char('x') => self.close_focused(),
            _ => {}
        }
        false
    }

    fn start_search(&mut self) {
        self.search_input = self
            .panes
            .get(self.focused)
            .and_then(Pane::search_query)
            .unwrap_or_default()
            .to_string();
        self.mode = Mode::SearchInput;
    }

    fn handle_search_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.search_input.clear();
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                let query = std::mem::take(&mut self.search_input);
                let case_sensitive = self.config.search_case_sensitive;
                let Some(pane) = self.panes.get_mut(self.focused) else {
                    return;
                };
                if query.trim().is_empty() {
                    pane.clear_search();
                    return;
                }
                self.status = match pane.set_search(&query, case_sensitive) {
                    Some(0) => Some("No matches".to_string()),
                    Some(_) => None,
                    None => {
                        pane.clear_search();
                        Some(format!("Search needs at least {MIN_QUERY_LEN} characters"))
                    }
                };
            }
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search_input.push(c);
            }
            _ => {}
        }
    }

    fn scroll_focused(&mut self, delta: isize, height: u16) {
        if let Some(pane) = self.focused_pane() {
            pane.scroll_by(delta, height);
        }
    }

    fn on_fs_event(&mut self, event: notify::Event) {
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return;
        }
        let deadline = Instant::now() + RELOAD_DEBOUNCE;
        for path in event.paths {
            if self.panes.iter().any(|p| p.source == path) {
                self.reloads.insert(path, deadline);
            }
        }
    }

    async fn handle_pending_reload(&mut self) {
        let now = Instant::now();
        let due: Vec<PathBuf> = self
            .reloads
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();
        if due.is_empty() {
            return;
        }

        let mut stale = HashSet::new();
        for source in due {
            self.reloads.remove(&source);
            let result = self.coordinator.renderer().render_to_markup(&source).await;
            for pane in self.panes.iter_mut().filter(|p| p.source == source) {
                match &result {
                    Ok(markup) => pane.set_markup(markup),
                    Err(err) => pane.set_error(err.to_string()),
                }
            }
            log::info!("reloaded {}", source.display());
            stale.extend(self.coordinator.stale_diffs(&source));
        }
        for path in stale {
            self.spawn_diff(path);
        }
    }

    fn status_line(&self) -> Line<'static> {
        let palette = self
            .panes
            .get(self.focused)
            .map(Pane::palette)
            .unwrap_or_else(|| UiPalette::for_theme(self.config.theme));
        let muted = Style::default().fg(palette.muted);

        if self.mode == Mode::SearchInput {
            return Line::from(vec![
                Span::styled("/", Style::default().fg(palette.accent)),
                Span::raw(self.search_input.clone()),
            ]);
        }
        if let Some(status) = &self.status {
            return Line::from(Span::styled(status.clone(), Style::default().fg(palette.accent)));
        }
        let Some(pane) = self.panes.get(self.focused) else {
            return Line::from("");
        };

        let marks = pane.highlights();
        let mut spans = vec![
            Span::styled(
                format!(" {} ", display_name(&pane.path)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {} blocks ", pane.blocks().len()), muted),
            Span::styled(format!(" {}% ", pane.state.zoom_percent()), muted),
            Span::styled(format!(" {} ", pane.state.theme), muted),
        ];
        if let Some(error) = pane.error() {
            spans.push(Span::styled(
                format!(" {error} "),
                Style::default().fg(palette.removed_bg),
            ));
        }
        if !marks.is_empty() {
            spans.push(Span::styled(
                format!(" +{} -{} ", marks.added.len(), marks.removed.len()),
                Style::default().fg(palette.accent),
            ));
        }
        if let Some((current, total)) = pane.search_status() {
            spans.push(Span::styled(format!(" search {current}/{total} "), muted));
        }
        spans.push(Span::styled(
            "  Tab pane · j/k scroll · [/] heading · n/N change · / ., search · +/-/0 zoom · o t b · r x q",
            muted,
        ));
        Line::from(spans)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("docpane")
        .to_string()
}

fn pane_title(pane: &Pane) -> String {
    let name = display_name(&pane.path);
    if pane.source == pane.path {
        format!(" {name} ")
    } else {
        format!(" {name} @ {} ", display_name(&pane.source))
    }
}

fn toolbar_line(pane: &Pane, palette: &UiPalette, font: &str) -> Line<'static> {
    let key = Style::default().fg(palette.accent);
    let text = palette.base_style();
    let outline_icon = if pane.state.outline_visible { "◧" } else { "◨" };
    Line::from(vec![
        Span::styled("[-] ", key),
        Span::styled(format!("{}%", pane.state.zoom_percent()), text),
        Span::styled(" [+] [0] ", key),
        Span::styled(format!("{outline_icon} outline  "), text),
        Span::styled(format!("theme: {}  ", pane.state.theme), text),
        Span::styled(format!("font: {font}"), Style::default().fg(palette.muted)),
    ])
}

fn ui(f: &mut ratatui::Frame, app: &App, layout: &LayoutInfo) {
    for (idx, (pane, pl)) in app.panes.iter().zip(&layout.panes).enumerate() {
        draw_pane(f, pane, pl, idx == app.focused, &app.config.font);
    }
    f.render_widget(Paragraph::new(app.status_line()), layout.status);
}

fn draw_pane(f: &mut ratatui::Frame, pane: &Pane, pl: &PaneLayout, focused: bool, font: &str) {
    let palette = pane.palette();
    let base = palette.base_style();
    let border = if focused { palette.accent } else { palette.border };

    f.render_widget(
        Block::bordered()
            .title(pane_title(pane))
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(base),
        pl.area,
    );

    if let Some(area) = pl.toolbar {
        f.render_widget(Paragraph::new(toolbar_line(pane, &palette, font)).style(base), area);
    }

    if let Some(area) = pl.outline {
        let items: Vec<ListItem> = if pane.outline().is_empty() {
            vec![ListItem::new(Span::styled(
                "No headings found",
                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
            ))]
        } else {
            pane.outline()
                .iter()
                .map(|h| {
                    let indent = "  ".repeat(h.level.saturating_sub(1) as usize);
                    ListItem::new(format!("{indent}{}", h.text))
                })
                .collect()
        };
        let mut state = ListState::default();
        state.select(pane.current_heading());
        let list = List::new(items)
            .block(
                Block::bordered()
                    .title("Outline")
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette.border))
                    .style(base),
            )
            .style(base)
            .highlight_style(palette.highlight_style());
        f.render_stateful_widget(list, area, &mut state);
    }

    let scroll = pane.scroll().min(u16::MAX as usize) as u16;
    let paragraph = Paragraph::new(Text::from(pane.lines().to_vec()))
        .style(base)
        .scroll((scroll, 0));
    f.render_widget(paragraph, pl.content);
}

#[cfg(test)]
mod tests {
    use super::{App, Mode};
    use crate::config::Config;
    use crate::coordinator::Coordinator;
    use crate::host::ChannelHost;
    use crate::registry::InstanceId;
    use crate::render::FsRenderer;
    use crate::state::DocumentState;
    use crate::view::Pane;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::layout::Rect;
    use std::path::PathBuf;
    use std::rc::Rc;
    use tokio::sync::mpsc::unbounded_channel;

    fn app(markup: &str, config: Config) -> App {
        let (tx, rx) = unbounded_channel();
        let coordinator = Rc::new(Coordinator::new(
            DocumentState::default(),
            FsRenderer::default(),
            ChannelHost::new(tx),
        ));
        let mut app = App::new(config, coordinator, rx);
        let mut pane = Pane::new(
            InstanceId::new(1),
            PathBuf::from("/doc.md"),
            PathBuf::from("/doc.md"),
            DocumentState::default(),
        );
        pane.set_markup(markup);
        app.panes.push(pane);
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        let layout = app.layout(Rect::new(0, 0, 80, 20));
        app.prepare(&layout);
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), &layout);
    }

    fn type_query(app: &mut App, query: &str) {
        press(app, KeyCode::Char('/'));
        for ch in query.chars() {
            press(app, KeyCode::Char(ch));
        }
        press(app, KeyCode::Enter);
    }

    #[test]
    fn typed_query_searches_the_focused_pane() {
        let mut app = app("<p>Alpha beta</p><p>alpha</p>", Config::default());
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, Mode::SearchInput);
        for ch in "alpx".chars() {
            press(&mut app, KeyCode::Char(ch));
        }
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.search_input, "alph");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.panes[0].search_status(), Some((1, 2)));
        press(&mut app, KeyCode::Char('.'));
        assert_eq!(app.panes[0].search_status(), Some((2, 2)));
        press(&mut app, KeyCode::Char(','));
        assert_eq!(app.panes[0].search_status(), Some((1, 2)));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.panes[0].search_status(), None);
    }

    #[test]
    fn search_reports_misses_and_short_queries() {
        let mut app = app("<p>Alpha</p>", Config::default());
        type_query(&mut app, "zeta");
        assert_eq!(app.status.as_deref(), Some("No matches"));
        press(&mut app, KeyCode::Esc);
        type_query(&mut app, "a");
        assert_eq!(app.status.as_deref(), Some("Search needs at least 2 characters"));
        assert_eq!(app.panes[0].search_status(), None);
    }

    #[test]
    fn configured_case_sensitivity_applies() {
        let config = Config {
            search_case_sensitive: true,
            ..Config::default()
        };
        let mut app = app("<p>Alpha alpha</p>", config);
        type_query(&mut app, "Alpha");
        assert_eq!(app.panes[0].search_status(), Some((1, 1)));
    }

    #[test]
    fn escape_abandons_the_query() {
        let mut app = app("<p>Alpha</p>", Config::default());
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.search_input.is_empty());
        assert_eq!(app.panes[0].search_status(), None);
    }
}
