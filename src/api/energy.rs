use reqwest::{Client, Url};
use serde_json::Value;

use crate::{
    api::{
        client,
        record::{Schema, Strictness, into_items, normalize},
    },
    core::{record::UsageRecord, region::Region},
    prelude::*,
};

/// Energy usage backend.
#[derive(Clone)]
pub struct Api {
    client: Client,
    base_url: Url,
    strictness: Strictness,
}

impl Api {
    /// The base URL may or may not include the trailing `/api` segment.
    pub fn new(base_url: &Url, strictness: Strictness) -> Result<Self> {
        Ok(Self { client: client::try_new()?, base_url: api_prefix(base_url)?, strictness })
    }

    /// Actual monthly usage of the region.
    #[instrument(skip_all, fields(region = %region))]
    pub async fn get_energy(&self, region: Region) -> Result<Vec<UsageRecord>> {
        let url = self.url(&["energy"], &region.query())?;
        let items = self.get_items(url).await.context("failed to fetch the energy usage")?;
        let records = normalize(&items, Schema::ACTUAL, self.strictness)?;
        info!(n_records = records.len(), "fetched the energy usage");
        Ok(records)
    }

    /// Forecasted monthly usage of the region.
    #[instrument(skip_all, fields(region = %region))]
    pub async fn get_predicted_energy(&self, region: Region) -> Result<Vec<UsageRecord>> {
        let url = self.url(&["predict-energy"], &region.query())?;
        let items = self.get_items(url).await.context("failed to fetch the energy forecast")?;
        let records = normalize(&items, Schema::FORECAST, self.strictness)?;
        info!(n_records = records.len(), "fetched the energy forecast");
        Ok(records)
    }

    /// Nationwide monthly totals.
    ///
    /// Endpoints are tried one by one until one returns a non-empty list.
    /// When none does, the result is empty.
    #[instrument(skip_all, fields(year = ?year))]
    pub async fn get_national_energy(&self, year: Option<u16>) -> Result<Vec<UsageRecord>> {
        let urls = self.national_urls(year)?;
        let Some((url, items)) = first_non_empty(urls, |url| self.get_items(url)).await else {
            warn!("none of the national endpoints returned records");
            return Ok(Vec::new());
        };
        let records = normalize(&items, Schema::NATIONAL, self.strictness)?;
        info!(%url, n_records = records.len(), "fetched the national energy usage");
        Ok(records)
    }

    fn national_urls(&self, year: Option<u16>) -> Result<Vec<Url>> {
        let mut urls = Vec::with_capacity(3);
        if let Some(year) = year {
            urls.push(self.url(&["energy", "country"], &[("year", year.to_string())])?);
        }
        urls.push(self.url(&["energy", "country"], &[])?);
        urls.push(self.url(&["energy"], &Region::Nation.query())?);
        Ok(urls)
    }

    async fn get_items(&self, url: Url) -> Result<Vec<Value>> {
        let body: Value = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("failed to request `{url}`"))?
            .error_for_status()
            .with_context(|| format!("`{url}` responded with an error"))?
            .json()
            .await
            .with_context(|| format!("failed to deserialize the response from `{url}`"))?;
        Ok(into_items(body))
    }

    fn url(&self, path: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("`{}` cannot be a base URL", self.base_url))?
            .pop_if_empty()
            .extend(path);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

/// Fetch the URLs one by one until one yields a non-empty list.
///
/// Failures are logged and skipped.
async fn first_non_empty<F, Fut>(urls: Vec<Url>, fetch: F) -> Option<(Url, Vec<Value>)>
where
    F: Fn(Url) -> Fut,
    Fut: Future<Output = Result<Vec<Value>>>,
{
    for url in urls {
        match fetch(url.clone()).await {
            Ok(items) if !items.is_empty() => return Some((url, items)),
            Ok(_) => {
                debug!(%url, "no records, trying the next endpoint…");
            }
            Err(error) => {
                warn!(%url, "failed to fetch the records: {error:#}");
            }
        }
    }
    None
}

/// Make sure the URL path ends with the `api` segment.
fn api_prefix(base_url: &Url) -> Result<Url> {
    let has_prefix = base_url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .is_some_and(|segment| segment == "api");
    let mut url = base_url.clone();
    if !has_prefix {
        url.path_segments_mut()
            .map_err(|()| anyhow!("`{base_url}` cannot be a base URL"))?
            .pop_if_empty()
            .push("api");
    }
    Ok(url)
}
