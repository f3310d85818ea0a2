use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use disclosure_watch::{
    format_change, format_compact, format_money, party_color, ranking, Bucket, Config, DataSources,
    PartyColor, Population, RankedMember, RuleEngine, SummaryCache,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;

pub struct App {
    pub config: Config,
    pub sources: DataSources,
    pub engine: RuleEngine,
    pub cache: SummaryCache,
    pub population: Population,
    pub query: String,
    pub searching: bool,
    /// Indices into the current population's ranking that match `query`
    pub visible: Vec<usize>,
    pub state: TableState,
    pub show_detail: bool,
}

impl App {
    pub fn new(config: Config, sources: DataSources, engine: RuleEngine) -> Self {
        let mut app = Self {
            config,
            sources,
            engine,
            cache: SummaryCache::new(),
            population: Population::Assembly,
            query: String::new(),
            searching: false,
            visible: Vec::new(),
            state: TableState::default(),
            show_detail: false,
        };
        app.refresh();
        app
    }

    pub fn ranking(&self) -> Arc<Vec<RankedMember>> {
        let (population, sources, engine) = (self.population, &self.sources, &self.engine);
        self.cache
            .get_or_compute(population, || ranking::rank(population, sources, engine))
    }

    /// Recompute the visible rows after a population or query change
    pub fn refresh(&mut self) {
        let ranked = self.ranking();
        self.visible = ranked
            .iter()
            .enumerate()
            .filter(|(_, m)| ranking::matches_query(m, &self.query))
            .map(|(i, _)| i)
            .collect();

        if self.visible.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn toggle_population(&mut self) {
        self.population = self.population.toggle();
        self.refresh();
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.refresh();
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.refresh();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.refresh();
    }

    /// Re-read the JSON documents and drop every cached ranking
    pub fn reload(&mut self) {
        self.sources = DataSources::load(&self.config);
        self.cache.invalidate_all();
        self.refresh();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_member(&self) -> Option<RankedMember> {
        let ranked = self.ranking();
        self.state
            .selected()
            .and_then(|i| self.visible.get(i))
            .and_then(|idx| ranked.get(*idx).cloned())
    }

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        if let Some(i) = self.state.selected() {
            let last = self.visible.len().saturating_sub(1);
            self.state.select(Some((i + 20).min(last)));
        }
    }

    pub fn page_up(&mut self) {
        if let Some(i) = self.state.selected() {
            self.state.select(Some(i.saturating_sub(20)));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if app.searching {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => app.searching = false,
                KeyCode::Backspace => app.pop_query(),
                KeyCode::Char(c) => app.push_query(c),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Char('/') => app.searching = true,
            KeyCode::Char('c') => app.clear_query(),
            KeyCode::Char('r') => app.reload(),
            KeyCode::Tab => app.toggle_population(),
            KeyCode::Enter => app.toggle_detail(),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::PageDown => app.page_down(),
            KeyCode::PageUp => app.page_up(),
            KeyCode::Home => app.state.select(Some(0)),
            KeyCode::End => {
                if !app.visible.is_empty() {
                    app.state.select(Some(app.visible.len() - 1));
                }
            }
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with population tabs + search
            Constraint::Min(0),    // Ranking
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail {
        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        render_table(f, content[0], app);
        render_detail_panel(f, content[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn color_of(color: PartyColor) -> Color {
    match color {
        PartyColor::Red => Color::Red,
        PartyColor::Blue => Color::Blue,
        PartyColor::DarkBlue => Color::Cyan,
        PartyColor::Orange => Color::LightRed,
        PartyColor::Indigo => Color::Magenta,
        PartyColor::Slate => Color::Gray,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, population) in [Population::Assembly, Population::Government].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *population == app.population {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(population.title(), style));
    }

    spans.push(Span::raw("  |  🔍 "));
    let query_style = if app.searching {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if app.searching { "▏" } else { "" };
    spans.push(Span::styled(format!("{}{}", app.query, cursor), query_style));

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["순위", "이름", "소속", "지역/직위", "순자산", "전년 대비"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let ranked = app.ranking();
    let rows: Vec<Row> = app
        .visible
        .iter()
        .filter_map(|idx| ranked.get(*idx))
        .map(|member| {
            let s = &member.summary;
            let change_color = if s.breakdown.change_amount >= 0 { Color::Red } else { Color::Blue };

            Row::new(vec![
                Cell::from(format!("{}위", member.rank)),
                Cell::from(truncate(&s.name, 10)),
                Cell::from(truncate(&s.affiliation_label, 14)).style(Style::default().fg(color_of(party_color(s)))),
                Cell::from(truncate(&s.secondary_label, 16)),
                Cell::from(format_money(s.breakdown.net_worth)),
                Cell::from(format_change(&s.breakdown)).style(Style::default().fg(change_color)),
            ])
            .height(1)
        })
        .collect();

    let title = format!(" 📊 재산 순위 ({}) ", app.visible.len());
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(18),
            Constraint::Length(18),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let Some(member) = app.selected_member() else {
        let empty = Paragraph::new("정보 없음").block(Block::default().borders(Borders::ALL).title(" 상세 "));
        f.render_widget(empty, area);
        return;
    };

    let s = &member.summary;
    let b = &s.breakdown;
    let label = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(s.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(s.affiliation_label.clone(), Style::default().fg(color_of(party_color(s)))),
        ]),
        Line::from(Span::styled(s.secondary_label.clone(), label)),
        Line::from(""),
        Line::from(vec![
            Span::styled("순자산 ", label),
            Span::styled(format_money(b.net_worth), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![Span::styled("전년 대비 ", label), Span::raw(format_change(b))]),
        Line::from(""),
    ];

    for bucket in Bucket::ALL {
        let items = b.items(bucket);
        if items.is_empty() {
            continue;
        }
        let sign = if bucket.is_debt() { "-" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ({}건) ", bucket.title(), items.len()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(format!("{}{}", sign, format_compact(b.total(bucket)))),
        ]));

        for item in items {
            let mut text = format!(
                "  [{}] {} {} {}{}",
                item.relationship,
                item.item_type,
                truncate(&item.description, 24),
                sign,
                format_money(item.current_value)
            );
            if let Some(reason) = item.display_reason() {
                text.push_str(&format!(" · {}", reason));
            }
            lines.push(Line::from(text));
        }
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" 상세 "));

    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let key = Style::default().fg(Color::Yellow);

    let spans = vec![
        Span::styled(format!(" {}/{} ", selected, app.visible.len()), Style::default().fg(Color::Cyan)),
        Span::raw(" | "),
        Span::styled("/", key),
        Span::raw(" Search | "),
        Span::styled("c", key),
        Span::raw(" Clear | "),
        Span::styled("Tab", key),
        Span::raw(" 국회/공직자 | "),
        Span::styled("Enter", key),
        Span::raw(" Details | "),
        Span::styled("r", key),
        Span::raw(" Reload | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(Block::default().borders(Borders::ALL));
    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
