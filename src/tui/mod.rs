use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use ratatui::Terminal;

use crate::app::App;
use crate::config::Theme;
use crate::graph::MediaType;
use crate::rows::{Row, RowKind};

const MEDIA_TABS: &[MediaType] = &[
    MediaType::Audio,
    MediaType::AlsaMidi,
    MediaType::PipewireMidi,
    MediaType::Video,
];

const KEY_HINTS: &str =
    "[/] expand/collapse  {/} all  space mark  c connect  d disconnect  a/m/p/v filter  r refresh  q quit";

pub fn run(app: &mut App, theme: &Theme) -> anyhow::Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // When stderr is redirected (e.g. `patchwire 2> debug.log`), keep
    // logging enabled so gateway warnings stay visible. When stderr is a
    // terminal, suppress logging to avoid corrupting the alternate screen.
    let prev_log_level = log::max_level();
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        log::set_max_level(log::LevelFilter::Off);
    }

    let result = event_loop(&mut terminal, app, theme);

    log::set_max_level(prev_log_level);

    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    crossterm::terminal::disable_raw_mode()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    theme: &Theme,
) -> anyhow::Result<()> {
    loop {
        render(terminal, app, theme)?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        if process_event(app, event::read()?) {
            return Ok(());
        }
        // Drain whatever queued up before redrawing.
        while event::poll(Duration::ZERO)? {
            if process_event(app, event::read()?) {
                return Ok(());
            }
        }
    }
}

/// Returns true when the app should quit.
fn process_event(app: &mut App, ev: Event) -> bool {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key.code),
        _ => false,
    }
}

fn handle_key(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::Char('[') => app.expand_one(),
        KeyCode::Char(']') => app.collapse_one(),
        KeyCode::Char('{') => app.expand_all(),
        KeyCode::Char('}') => app.collapse_all(),
        KeyCode::Char(' ') => app.toggle_mark(),
        KeyCode::Char('c') => app.connect_marked(),
        KeyCode::Char('d') => app.disconnect_highlighted(),
        KeyCode::Char('a') => app.set_media_type(MediaType::Audio),
        KeyCode::Char('m') => app.set_media_type(MediaType::AlsaMidi),
        KeyCode::Char('p') => app.set_media_type(MediaType::PipewireMidi),
        KeyCode::Char('v') => app.set_media_type(MediaType::Video),
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }
    false
}

fn render(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    theme: &Theme,
) -> anyhow::Result<()> {
    terminal.draw(|frame| {
        let [header_area, list_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let mut header = vec![Span::styled(
            "patchwire ",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for media in MEDIA_TABS {
            let style = if *media == app.media_type {
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme.label_color())
            };
            header.push(Span::styled(format!(" {} ", media.label()), style));
        }
        frame.render_widget(Paragraph::new(Line::from(header)), header_area);

        let items: Vec<ListItem> = app.rows.iter().map(|row| row_item(row, theme)).collect();
        let list = List::new(items).highlight_style(
            Style::default()
                .fg(theme.highlight_color())
                .add_modifier(Modifier::BOLD),
        );
        let mut list_state = ListState::default();
        if !app.rows.is_empty() {
            list_state.select(Some(app.view.highlight));
        }
        frame.render_stateful_widget(list, list_area, &mut list_state);

        frame.render_widget(
            Paragraph::new(KEY_HINTS).style(Style::default().fg(theme.label_color())),
            footer_area,
        );
    })?;
    Ok(())
}

fn row_item<'a>(row: &'a Row, theme: &Theme) -> ListItem<'a> {
    let mut spans = vec![
        Span::raw(format!("{:>6} ", row.id_col)),
        Span::raw(" ".repeat(row.indent())),
    ];
    match row.kind {
        RowKind::Label(_) => spans.push(Span::styled(
            row.label.clone(),
            Style::default().fg(theme.label_color()),
        )),
        _ => spans.push(Span::raw(row.label.as_str())),
    }
    if row.marked {
        spans.push(Span::styled(
            " (*)",
            Style::default().fg(theme.marked_color()),
        ));
    }
    ListItem::new(Line::from(spans))
}
