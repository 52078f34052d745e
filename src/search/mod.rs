// Search session - owns the filter and the current result set
// Queries are numbered so a slow, older response can't clobber a newer one

use crate::catalog::{Catalog, CatalogError, Song, SongFilter};
use tracing::{debug, error, info};

/// A query that has been issued but not yet applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryTicket {
    pub seq: u64,
    pub filter: SongFilter,
}

/// What happened when a response was handed back to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Result set replaced; carries the new row count
    Replaced(usize),
    /// A newer query was issued after this one - response dropped
    Stale,
    /// Catalog error - result set left as it was
    Failed,
}

#[derive(Debug, Default)]
pub struct SearchSession {
    filter: SongFilter,
    results: Vec<Song>,
    latest_seq: u64,
}

impl SearchSession {
    pub fn new(filter: SongFilter) -> Self {
        Self {
            filter,
            results: Vec::new(),
            latest_seq: 0,
        }
    }

    pub fn filter(&self) -> &SongFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut SongFilter {
        &mut self.filter
    }

    pub fn results(&self) -> &[Song] {
        &self.results
    }

    /// Snapshot the current filter under a fresh sequence number
    pub fn begin(&mut self) -> QueryTicket {
        self.latest_seq += 1;
        QueryTicket {
            seq: self.latest_seq,
            filter: self.filter,
        }
    }

    pub fn complete(&mut self, seq: u64, result: Result<Vec<Song>, CatalogError>) -> QueryOutcome {
        if seq < self.latest_seq {
            debug!("Dropping response for query #{} (latest is #{})", seq, self.latest_seq);
            return QueryOutcome::Stale;
        }

        match result {
            Ok(songs) => {
                info!("Query #{} returned {} songs", seq, songs.len());
                let count = songs.len();
                self.results = songs;
                QueryOutcome::Replaced(count)
            }
            Err(e) => {
                error!("Query #{} failed: {}", seq, e);
                QueryOutcome::Failed
            }
        }
    }

    /// Issue, run and apply one query in place
    pub async fn refresh(&mut self, catalog: &dyn Catalog) -> QueryOutcome {
        let ticket = self.begin();
        let result = execute(catalog, &ticket).await;
        self.complete(ticket.seq, result)
    }
}

/// Run a ticket against the catalog. Inverted ranges never reach the network.
pub async fn execute(catalog: &dyn Catalog, ticket: &QueryTicket) -> Result<Vec<Song>, CatalogError> {
    if !ticket.filter.is_satisfiable() {
        debug!("Query #{} has an inverted range ({}), skipping catalog", ticket.seq, ticket.filter);
        return Ok(Vec::new());
    }

    catalog.select(&ticket.filter).await
}
