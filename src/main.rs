//! Shiori TUI - Actor-based terminal manga reader
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async catalog requests

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;

use shiori::app::AppActor;
use shiori::config::Config;
use shiori::constants::{APP_NAME, APP_VERSION};
use shiori::messages::render::{HomeRender, MangaRender, ReaderRender};
use shiori::messages::ui_events::{key_to_ui_event, InputMode, ViewKind};
use shiori::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use shiori::network::{MangaClient, NetworkActor};
use shiori::routes::Route;
use shiori::ui::{centered_rect, chapter_line, new_badge, page_state_color, pagination_line, render_tabs};

/// Terminal manga reader for the MangaDex catalog
#[derive(Parser, Debug)]
#[command(name = "shiori", version, about)]
struct Cli {
    /// Config file (default: ~/.shiori/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Translation language, e.g. pt-br or en
    #[arg(long)]
    language: Option<String>,

    /// Start the reader in data-saver mode
    #[arg(long)]
    data_saver: bool,

    /// Route to open: /, /manga/<id> or /manga/<id>/chapter/<chapter_id>
    #[arg(default_value = "/")]
    route: Route,
}

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(language) = cli.language {
        config.language = language;
    }
    if cli.data_saver {
        config.data_saver = true;
    }
    let config = config.normalized();

    // Initialize logging to file; the terminal belongs to the UI
    let log_dir = config
        .log_file
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let log_name = config
        .log_file
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "shiori.log".into());
    let file_appender = tracing_appender::rolling::never(&log_dir, log_name);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let client = Arc::new(MangaClient::new(&config)?);
    tracing::info!(
        version = APP_VERSION,
        api = %client.base_url(),
        language = %config.language,
        "Starting"
    );

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(client, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(config, cli.route, net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.view,
                    current_state.input_mode,
                    current_state.show_help,
                ) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title_bar(f, state, main_chunks[0]);

    match state.view {
        ViewKind::Home => draw_home(f, state, &state.home, main_chunks[1]),
        ViewKind::Manga => match &state.manga {
            Some(manga) => draw_manga(f, manga, main_chunks[1]),
            None => draw_loading(f, main_chunks[1]),
        },
        ViewKind::Reader => match &state.reader {
            Some(reader) => draw_reader(f, reader, main_chunks[1]),
            None => draw_loading(f, main_chunks[1]),
        },
    }

    draw_status_bar(f, state, main_chunks[2]);

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_title_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", APP_NAME),
            Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
        ),
        Span::styled(format!(" {}", state.route), Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_loading(f: &mut Frame, area: Rect) {
    let loading = Paragraph::new("Loading...")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(loading, area);
}

/// Inline error panel with the reload hint
fn draw_error(f: &mut Frame, message: &str, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "Something went wrong",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to reload",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let panel = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn draw_home(f: &mut Frame, state: &RenderState, home: &HomeRender, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Sources
            Constraint::Length(3), // Search box
            Constraint::Min(3),    // Cards
            Constraint::Length(1), // Pagination
        ])
        .split(area);

    let sources = ["Latest updates", "Release timeline", "Popular"];
    let selected = sources
        .iter()
        .position(|s| *s == home.source)
        .unwrap_or(sources.len());
    let mut titles: Vec<&str> = sources.to_vec();
    if selected == sources.len() {
        titles.push(home.source.as_str());
    }
    f.render_widget(render_tabs(&titles, selected), chunks[0]);

    let editing = state.input_mode == InputMode::Editing;
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        })
        .title(" Search (/ filter, Enter search the catalog) ");
    let search_text = if home.filter.is_empty() && !editing {
        Span::styled("Filter by title...", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(home.filter.as_str())
    };
    f.render_widget(Paragraph::new(search_text).block(search_block), chunks[1]);
    if editing {
        let max_x = chunks[1].x + chunks[1].width.saturating_sub(2);
        let cursor_x = (chunks[1].x + home.filter.chars().count() as u16 + 1).min(max_x);
        f.set_cursor_position(Position::new(cursor_x, chunks[1].y + 1));
    }

    if let Some(error) = &home.error {
        draw_error(f, error, chunks[2]);
        return;
    }
    if home.loading {
        draw_loading(f, chunks[2]);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", home.summary));

    if home.cards.is_empty() {
        let empty = Paragraph::new(home.empty_message.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, chunks[2]);
    } else {
        let items: Vec<ListItem> = home
            .cards
            .iter()
            .map(|card| {
                let mut title = vec![Span::styled(card.title.clone(), Style::default().bold())];
                if card.has_new {
                    title.push(Span::raw(" "));
                    title.push(new_badge());
                }
                let mut lines = vec![Line::from(title)];
                if card.chapters.is_empty() {
                    lines.push(Line::from(Span::styled(
                        "  No recent chapters",
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                lines.extend(card.chapters.iter().map(|ch| chapter_line(ch, "  ")));
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        list_state.select(Some(home.selected));
        f.render_stateful_widget(list, chunks[2], &mut list_state);
    }

    if home.total_pages > 1 {
        let pager = pagination_line(&home.window, home.page, home.total_pages);
        f.render_widget(Paragraph::new(pager).alignment(Alignment::Center), chunks[3]);
    }
}

fn draw_manga(f: &mut Frame, manga: &MangaRender, area: Rect) {
    if let Some(error) = &manga.error {
        draw_error(f, error, area);
        return;
    }
    if manga.loading {
        draw_loading(f, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let label = Style::default().fg(Color::DarkGray);
    let mut info = vec![
        Line::from(Span::styled(manga.title.clone(), Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(vec![Span::styled("Status:  ", label), Span::raw(manga.status.clone())]),
    ];
    if let Some(author) = &manga.author {
        info.push(Line::from(vec![Span::styled("Author:  ", label), Span::raw(author.clone())]));
    }
    if let Some(artist) = &manga.artist {
        info.push(Line::from(vec![Span::styled("Artist:  ", label), Span::raw(artist.clone())]));
    }
    info.push(Line::from(vec![
        Span::styled("Rating:  ", label),
        Span::styled(manga.rating.clone(), Style::default().fg(Color::Yellow)),
        Span::styled(format!("   Follows: {}   Comments: {}", manga.follows, manga.comments), label),
    ]));
    if !manga.genres.is_empty() {
        info.push(Line::from(vec![Span::styled("Genres:  ", label), Span::raw(manga.genres.join(", "))]));
    }
    if !manga.themes.is_empty() {
        info.push(Line::from(vec![Span::styled("Themes:  ", label), Span::raw(manga.themes.join(", "))]));
    }
    info.push(Line::from(vec![Span::styled("Cover:   ", label), Span::raw(manga.cover_url.clone())]));
    info.push(Line::from(""));
    info.extend(manga.description.lines().map(|l| Line::from(l.to_string())));

    let details = Paragraph::new(info)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: false });
    f.render_widget(details, chunks[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Chapters ({}) ", manga.chapters.len()));

    if manga.chapters.is_empty() {
        let empty = Paragraph::new(manga.empty_message.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = manga
        .chapters
        .iter()
        .map(|ch| ListItem::new(chapter_line(ch, "")))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    list_state.select(Some(manga.selected));
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn draw_reader(f: &mut Frame, reader: &ReaderRender, area: Rect) {
    if let Some(error) = &reader.error {
        draw_error(f, error, area);
        return;
    }
    if reader.loading {
        draw_loading(f, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Chapter header
            Constraint::Min(3),    // Page
            Constraint::Length(3), // Controls
        ])
        .split(area);

    let mut header = vec![
        Span::styled(reader.manga_title.clone(), Style::default().fg(Color::Cyan).bold()),
        Span::raw("  "),
        Span::raw(reader.chapter_label.clone()),
    ];
    if let Some(group) = &reader.group {
        header.push(Span::styled(format!("  [{}]", group), Style::default().fg(Color::Magenta)));
    }
    f.render_widget(
        Paragraph::new(Line::from(header)).block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    let page_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Page {} / {} [{}] ", reader.page, reader.total_pages, reader.quality));
    let page_text = match &reader.url {
        Some(url) => vec![
            Line::from(url.clone()),
            Line::from(""),
            Line::from(Span::styled(
                reader.page_state.label(),
                Style::default().fg(page_state_color(reader.page_state)),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "This chapter has no pages",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    f.render_widget(
        Paragraph::new(page_text).block(page_block).wrap(Wrap { trim: false }),
        chunks[1],
    );

    let enabled = Style::default().fg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray);
    let prev = if reader.prev_is_chapter { "← prev chapter" } else { "← prev" };
    let next = if reader.next_is_chapter { "next chapter →" } else { "next →" };
    let mut controls = vec![
        Span::styled(prev, if reader.can_prev { enabled } else { disabled }),
        Span::raw("   "),
        Span::styled(next, if reader.can_next { enabled } else { disabled }),
        Span::raw("   "),
        Span::styled(
            format!("data saver: {}", if reader.data_saver { "on" } else { "off" }),
            Style::default().fg(Color::Gray),
        ),
    ];
    if !reader.page_input.is_empty() {
        controls.push(Span::styled(
            format!("   go to page: {}", reader.page_input),
            Style::default().fg(Color::Yellow),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(controls)).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let hint = match (state.view, state.input_mode) {
        (_, InputMode::Editing) => " ESC:stop | Enter:search catalog | type to filter ",
        (ViewKind::Home, _) => " ↑/↓:select | ←/→:page | Enter:open | /:search | Tab:source | r:reload | ?:help | q:quit ",
        (ViewKind::Manga, _) => " ↑/↓:select | Enter:read | Esc:back | r:reload | ?:help | q:quit ",
        (ViewKind::Reader, _) => " ←/→:page | Home/End | 0-9 Enter:go to | d:data saver | Esc:back | ?:help ",
    };
    let text = match &state.status {
        Some(status) => format!(" {} |{}", status, hint),
        None => hint.to_string(),
    };

    let bar = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 SHIORI - Keyboard Shortcuts

 HOME
   ↑ / ↓              Select manga
   ← / →              Previous / next page
   Enter              Open manga
   / or s             Filter by title (Enter searches the catalog)
   Tab                Switch listing (latest / timeline / popular)

 MANGA
   ↑ / ↓              Select chapter
   Home / End         First / last chapter
   Enter              Read chapter

 READER
   ← / →  or  Space   Previous / next page (crosses chapters)
   Home / End         First / last page
   0-9 then Enter     Go to page
   d                  Toggle data saver

 GENERAL
   Esc / Backspace    Back
   r                  Reload
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}
