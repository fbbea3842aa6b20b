use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::github::status::check_response;

/// Page size for list endpoints; GitHub's maximum.
pub const PAGE_SIZE: usize = 100;

pub struct Paginator<'a> {
    client: &'a Client,
    per_page: usize,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            per_page: PAGE_SIZE,
        }
    }

    /// Collects up to `max_items` across pages, stopping early on a short or
    /// empty page. `resource` names the listing for error messages.
    pub async fn fetch_limited<T: DeserializeOwned>(
        &self,
        base_url: Url,
        resource: &str,
        max_items: usize,
    ) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            let mut url = base_url.clone();
            url.query_pairs_mut()
                .append_pair("per_page", &self.per_page.to_string())
                .append_pair("page", &page.to_string());

            tracing::debug!("Fetching: {}", url);
            let response = self.client.get(url).send().await?;
            let response = check_response(response, resource).await?;

            let items: Vec<T> = response.json().await?;
            let items_count = items.len();
            all_items.extend(items);

            if is_last_page(items_count, self.per_page, all_items.len(), max_items) {
                break;
            }

            page += 1;
        }

        all_items.truncate(max_items);
        Ok(all_items)
    }
}

pub fn is_last_page(page_len: usize, per_page: usize, collected: usize, max_items: usize) -> bool {
    page_len < per_page || collected >= max_items
}
