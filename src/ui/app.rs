use super::{AppEvent, EventHandler, FilterForm, Focus, FormAction, TerminalManager};
use crate::catalog::{Catalog, Song, SongFilter};
use crate::config::Config;
use crate::export::{ExportFormat, ExportManager};
use crate::search::{self, QueryOutcome, SearchSession};
use anyhow::Result;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct App {
    terminal: TerminalManager,
    event_handler: EventHandler,
    catalog: Arc<dyn Catalog>,
    exporter: ExportManager,

    // State
    session: SearchSession,
    form: FilterForm,
    should_quit: bool,

    // UI State
    querying: bool,
    status: String,
    path_width: u16,
}

impl App {
    pub fn new(config: &Config, catalog: Arc<dyn Catalog>) -> Result<Self> {
        let terminal = TerminalManager::new()?;
        let session = SearchSession::new(SongFilter::default());
        let form = FilterForm::new(session.filter());

        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
            catalog,
            exporter: ExportManager::new(&config.export.directory),
            session,
            form,
            should_quit: false,
            querying: false,
            status: String::new(),
            path_width: config.ui.path_column_width,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let _reader = self.event_handler.spawn_terminal_reader();

        // populate the table once on startup
        self.start_query();

        while !self.should_quit {
            let Self {
                terminal,
                session,
                form,
                querying,
                status,
                path_width,
                ..
            } = self;

            terminal.draw(|f| {
                Self::render_ui(f, form, session, *querying, status, *path_width);
            })?;

            match self.event_handler.next_event().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }

        info!("Leaving event loop");
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => {
                self.should_quit = true;
            }
            AppEvent::Render => {}
            AppEvent::QueryCompleted { seq, result } => {
                match self.session.complete(seq, result) {
                    QueryOutcome::Stale => {}
                    QueryOutcome::Replaced(_) | QueryOutcome::Failed => {
                        self.querying = false;
                    }
                }
            }
            other => {
                if let Some(action) = self.form.handle(&other, self.session.filter_mut()) {
                    self.perform(action);
                }
            }
        }
    }

    fn perform(&mut self, action: FormAction) {
        match action {
            FormAction::Query => self.start_query(),
            FormAction::Export(format) => self.export(format),
            FormAction::Quit => self.should_quit = true,
        }
    }

    /// Spawn the catalog read; the answer comes back through the event channel
    fn start_query(&mut self) {
        let ticket = self.session.begin();
        let catalog = Arc::clone(&self.catalog);
        let sender = self.event_handler.sender();
        self.querying = true;

        debug!("Issuing query #{} ({})", ticket.seq, ticket.filter);

        tokio::spawn(async move {
            let result = search::execute(catalog.as_ref(), &ticket).await;
            let _ = sender.send(AppEvent::QueryCompleted {
                seq: ticket.seq,
                result,
            });
        });
    }

    fn export(&mut self, format: ExportFormat) {
        self.status = match self.exporter.export(format, self.session.results()) {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => {
                error!("Export failed: {}", e);
                format!("Export failed: {}", e)
            }
        };
    }

    fn render_ui(
        f: &mut Frame,
        form: &FilterForm,
        session: &SearchSession,
        querying: bool,
        status: &str,
        path_width: u16,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Filter inputs
                Constraint::Length(3), // Buttons
                Constraint::Min(0),    // Results
                Constraint::Length(1), // Status
            ])
            .split(f.area());

        Self::render_header(f, chunks[0]);
        Self::render_inputs(f, chunks[1], form);
        Self::render_buttons(f, chunks[2], form);
        Self::render_results(f, chunks[3], session.results(), path_width);
        Self::render_status(f, chunks[4], session, querying, status);
    }

    fn render_header(f: &mut Frame, area: Rect) {
        let title = Paragraph::new("🎶 playgen - Playlist Generator")
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(title, area);
    }

    fn render_inputs(f: &mut Frame, area: Rect, form: &FilterForm) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for (field, chunk) in Focus::FIELDS.iter().zip(chunks.iter()) {
            let input = Paragraph::new(form.input(*field))
                .style(focus_style(form.focus() == *field))
                .block(Block::default().borders(Borders::ALL).title(field.label()));
            f.render_widget(input, *chunk);
        }
    }

    fn render_buttons(f: &mut Frame, area: Rect, form: &FilterForm) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(area);

        let colors = [Color::Blue, Color::Green, Color::Magenta];

        for ((button, chunk), color) in Focus::BUTTONS.iter().zip(chunks.iter()).zip(colors) {
            let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
            if form.focus() == *button {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let widget = Paragraph::new(button.label())
                .alignment(Alignment::Center)
                .style(style)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(widget, *chunk);
        }
    }

    fn render_results(f: &mut Frame, area: Rect, songs: &[Song], path_width: u16) {
        let header = Row::new(["Title", "Artist", "Tempo", "Energy", "Path"])
            .style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray));

        let rows = songs.iter().map(|song| {
            Row::new([
                Cell::from(song.title.as_str()),
                Cell::from(song.artist.as_str()),
                Cell::from(song.tempo.to_string()),
                Cell::from(song.energy.to_string()),
                Cell::from(truncate_display(&song.path, path_width as usize)),
            ])
        });

        let widths = [
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(path_width),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Songs"));

        f.render_widget(table, area);
    }

    fn render_status(f: &mut Frame, area: Rect, session: &SearchSession, querying: bool, status: &str) {
        let activity = if querying { "Searching... | " } else { "" };
        let line = format!(
            " {}{} songs | {} | {}",
            activity,
            session.results().len(),
            session.filter(),
            status
        );

        f.render_widget(Paragraph::new(line).style(Style::default().fg(Color::Gray)), area);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Cut text to `width` columns for display, marking the cut with an ellipsis
fn truncate_display(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate_display("/a.mp3", 40), "/a.mp3");
        assert_eq!(truncate_display("12345", 5), "12345");
    }

    #[test]
    fn test_truncate_long_path() {
        let cut = truncate_display("/music/library/artist/album/track.mp3", 10);
        assert_eq!(cut, "/music/li…");
        assert_eq!(cut.chars().count(), 10);
    }

    #[test]
    fn test_truncate_zero_width() {
        assert_eq!(truncate_display("/a.mp3", 0), "");
    }
}
