// playgen library - catalog query, search session, playlist export
// The binary wires these to a terminal form; everything here is UI-free except `ui`

pub mod catalog; // song model, filter, remote catalog access
pub mod config;  // settings and credentials
pub mod export;  // CSV / M3U playlist files
pub mod search;  // filter + result set, query sequencing
#[cfg(feature = "tui")]
pub mod ui;      // terminal interface

#[cfg(test)]
pub(crate) mod test_support;

// Export the stuff other modules actually use
pub use catalog::{Catalog, CatalogError, Song, SongFilter};
pub use config::Config;
pub use export::{ExportError, ExportFormat, ExportManager};
pub use search::{QueryOutcome, QueryTicket, SearchSession};
