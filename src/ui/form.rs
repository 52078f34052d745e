// Filter form - four numeric inputs plus three action buttons
// Every accepted keystroke writes straight through to the SongFilter

use super::AppEvent;
use crate::catalog::SongFilter;
use crate::export::ExportFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    TempoMin,
    TempoMax,
    EnergyMin,
    EnergyMax,
    Query,
    ExportCsv,
    ExportM3u,
}

impl Focus {
    pub const ORDER: [Focus; 7] = [
        Focus::TempoMin,
        Focus::TempoMax,
        Focus::EnergyMin,
        Focus::EnergyMax,
        Focus::Query,
        Focus::ExportCsv,
        Focus::ExportM3u,
    ];

    pub const FIELDS: [Focus; 4] = [Focus::TempoMin, Focus::TempoMax, Focus::EnergyMin, Focus::EnergyMax];
    pub const BUTTONS: [Focus; 3] = [Focus::Query, Focus::ExportCsv, Focus::ExportM3u];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Index into the input buffers, None for buttons
    pub fn field_index(self) -> Option<usize> {
        Self::FIELDS.iter().position(|f| *f == self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Focus::TempoMin => "Tempo min",
            Focus::TempoMax => "Tempo max",
            Focus::EnergyMin => "Energy min",
            Focus::EnergyMax => "Energy max",
            Focus::Query => "Search [s]",
            Focus::ExportCsv => "Export CSV [c]",
            Focus::ExportM3u => "Export M3U [m]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Query,
    Export(ExportFormat),
    Quit,
}

#[derive(Debug, Clone)]
pub struct FilterForm {
    inputs: [String; 4],
    focus: Focus,
}

impl FilterForm {
    pub fn new(filter: &SongFilter) -> Self {
        Self {
            inputs: [
                filter.tempo_min.to_string(),
                filter.tempo_max.to_string(),
                filter.energy_min.to_string(),
                filter.energy_max.to_string(),
            ],
            focus: Focus::TempoMin,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn input(&self, field: Focus) -> &str {
        field.field_index().map(|i| self.inputs[i].as_str()).unwrap_or("")
    }

    /// Apply one UI event. Returns an action when the event asks for one.
    pub fn handle(&mut self, event: &AppEvent, filter: &mut SongFilter) -> Option<FormAction> {
        match event {
            AppEvent::FocusNext => {
                self.focus = self.focus.next();
                None
            }
            AppEvent::FocusPrev => {
                self.focus = self.focus.prev();
                None
            }
            AppEvent::Activate => match self.focus {
                Focus::ExportCsv => Some(FormAction::Export(ExportFormat::Csv)),
                Focus::ExportM3u => Some(FormAction::Export(ExportFormat::M3u)),
                // Enter inside an input runs the search too
                _ => Some(FormAction::Query),
            },
            AppEvent::Backspace => {
                if let Some(index) = self.focus.field_index() {
                    self.inputs[index].pop();
                    set_field(filter, index, coerce_number(&self.inputs[index]));
                }
                None
            }
            AppEvent::Input(c) => self.handle_char(*c, filter),
            _ => None,
        }
    }

    fn handle_char(&mut self, c: char, filter: &mut SongFilter) -> Option<FormAction> {
        if let Some(index) = self.focus.field_index() {
            if is_numeric_char(c) {
                self.inputs[index].push(c);
                set_field(filter, index, coerce_number(&self.inputs[index]));
                return None;
            }
        }

        // anything that isn't typed into an input is a hotkey
        match c {
            's' => Some(FormAction::Query),
            'c' => Some(FormAction::Export(ExportFormat::Csv)),
            'm' => Some(FormAction::Export(ExportFormat::M3u)),
            'q' => Some(FormAction::Quit),
            _ => None,
        }
    }
}

fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '-'
}

/// Text -> number the forgiving way: blank or unparsable text counts as 0
pub fn coerce_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn set_field(filter: &mut SongFilter, index: usize, value: f64) {
    match index {
        0 => filter.tempo_min = value,
        1 => filter.tempo_max = value,
        2 => filter.energy_min = value,
        3 => filter.energy_max = value,
        _ => {}
    }
}
