use super::{Catalog, CatalogError, Song, SongFilter};
use crate::config::CatalogConfig;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// Catalog client for a PostgREST-style endpoint (`/rest/v1/{table}`)
#[derive(Debug, Clone)]
pub struct RestCatalog {
    base_url: String,
    api_key: String,
    table: String,
    order_by: String,
    page_size: usize,
    max_rows: usize,
    client: Client,
}

impl RestCatalog {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
            order_by: config.order_by.clone(),
            page_size: config.page_size.max(1),
            max_rows: config.max_rows.max(1),
            client: Client::new(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    async fn fetch_page(
        &self,
        filter: &SongFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Song>, CatalogError> {
        let url = self.table_url();
        let params = query_params(filter, &self.order_by, offset, limit);

        debug!("Querying catalog: {} ({}, offset {}, limit {})", url, filter, offset, limit);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode_page(&body)
    }
}

#[async_trait]
impl Catalog for RestCatalog {
    async fn select(&self, filter: &SongFilter) -> Result<Vec<Song>, CatalogError> {
        let mut songs: Vec<Song> = Vec::new();

        // A short page only means the server capped it (PostgREST max-rows);
        // the result ends at the first empty page.
        loop {
            let limit = self.page_size.min(self.max_rows - songs.len());
            let page = self.fetch_page(filter, songs.len(), limit).await?;
            if page.is_empty() {
                break;
            }
            songs.extend(page);

            if songs.len() >= self.max_rows {
                songs.truncate(self.max_rows);
                warn!(
                    "Catalog result capped at {} rows - narrow the filter to see the rest",
                    self.max_rows
                );
                break;
            }
        }

        debug!("Catalog returned {} songs", songs.len());
        Ok(songs)
    }
}

/// Query string for one page: projection, the four inclusive bounds, sort key, paging window.
///
/// `offset` windows are only stable under an `order`; an empty `order_by` leaves it out.
pub fn query_params(
    filter: &SongFilter,
    order_by: &str,
    offset: usize,
    limit: usize,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), Song::FIELDS.join(",")),
        ("tempo".to_string(), format!("gte.{}", filter.tempo_min)),
        ("tempo".to_string(), format!("lte.{}", filter.tempo_max)),
        ("energy".to_string(), format!("gte.{}", filter.energy_min)),
        ("energy".to_string(), format!("lte.{}", filter.energy_max)),
    ];

    if !order_by.trim().is_empty() {
        params.push(("order".to_string(), order_by.trim().to_string()));
    }

    params.push(("limit".to_string(), limit.to_string()));
    params.push(("offset".to_string(), offset.to_string()));
    params
}

fn decode_page(body: &str) -> Result<Vec<Song>, CatalogError> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        CatalogError::Decode(format!("{} - Response: {}", e, preview))
    })
}
