// Remote song catalog - the only data source playgen talks to
// The handle is built once at startup and passed around, never stashed globally

#[cfg(feature = "rest")]
pub mod rest; // PostgREST-style HTTP client

#[cfg(feature = "rest")]
pub use rest::RestCatalog;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One row of the catalog. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artist: String,
    pub tempo: f64, // beats per minute
    pub energy: f64, // 0-10 intensity
    #[serde(default, deserialize_with = "null_as_empty")]
    pub path: String,
}

/// NULL text columns show up as blank cells instead of failing the whole page
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Song {
    /// Column names in record order - also the CSV header
    pub const FIELDS: [&'static str; 5] = ["title", "artist", "tempo", "energy", "path"];

    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        tempo: f64,
        energy: f64,
        path: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            tempo,
            energy,
            path: path.into(),
        }
    }
}

/// Inclusive tempo/energy bounds for a catalog read.
///
/// Nothing stops min from exceeding max; such a filter simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SongFilter {
    pub tempo_min: f64,
    pub tempo_max: f64,
    pub energy_min: f64,
    pub energy_max: f64,
}

impl Default for SongFilter {
    fn default() -> Self {
        Self {
            tempo_min: 0.0,
            tempo_max: 200.0,
            energy_min: 0.0,
            energy_max: 10.0,
        }
    }
}

impl SongFilter {
    /// False when either range is inverted - no song can match
    pub fn is_satisfiable(&self) -> bool {
        self.tempo_min <= self.tempo_max && self.energy_min <= self.energy_max
    }

    pub fn matches(&self, song: &Song) -> bool {
        (self.tempo_min..=self.tempo_max).contains(&song.tempo)
            && (self.energy_min..=self.energy_max).contains(&song.energy)
    }
}

impl fmt::Display for SongFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tempo {}-{}, energy {}-{}",
            self.tempo_min, self.tempo_max, self.energy_min, self.energy_max
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(String),

    #[error("Catalog returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode catalog response: {0}")]
    Decode(String),
}

/// Range-filtered read access to the song table
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Every song inside the filter's inclusive bounds, in catalog order
    async fn select(&self, filter: &SongFilter) -> Result<Vec<Song>, CatalogError>;
}
