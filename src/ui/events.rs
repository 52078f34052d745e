use crate::catalog::{CatalogError, Song};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::error;

#[derive(Debug)]
pub enum AppEvent {
    // UI Events
    Quit,
    Render,

    // Form Events
    FocusNext,
    FocusPrev,
    Activate,
    Input(char),
    Backspace,

    // Catalog Events
    QueryCompleted {
        seq: u64,
        result: Result<Vec<Song>, CatalogError>,
    },
}

pub struct EventHandler {
    event_sender: mpsc::UnboundedSender<AppEvent>,
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        Self {
            event_sender,
            event_receiver,
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.event_sender.clone()
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.recv().await
    }

    /// Pump crossterm events into the channel until the receiver goes away
    pub fn spawn_terminal_reader(&self) -> JoinHandle<()> {
        let sender = self.sender();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = forward_terminal_events(&sender) {
                error!("Terminal event reader stopped: {}", e);
                let _ = sender.send(AppEvent::Quit);
            }
        })
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn forward_terminal_events(sender: &mpsc::UnboundedSender<AppEvent>) -> Result<()> {
    while !sender.is_closed() {
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(app_event) = key_to_app_event(key) {
                        let _ = sender.send(app_event);
                    }
                }
                Event::Resize(_, _) => {
                    let _ = sender.send(AppEvent::Render);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

pub fn key_to_app_event(key: KeyEvent) -> Option<AppEvent> {
    match key.code {
        // Quit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(AppEvent::Quit),
        KeyCode::Esc => Some(AppEvent::Quit),

        // other chords are not form input
        _ if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => None,

        // Focus
        KeyCode::Tab | KeyCode::Down | KeyCode::Right => Some(AppEvent::FocusNext),
        KeyCode::BackTab | KeyCode::Up | KeyCode::Left => Some(AppEvent::FocusPrev),
        KeyCode::Enter => Some(AppEvent::Activate),

        // Editing + hotkeys - the form decides which
        KeyCode::Backspace => Some(AppEvent::Backspace),
        KeyCode::Char(c) => Some(AppEvent::Input(c)),

        _ => None,
    }
}
