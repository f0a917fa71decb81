//! Oura API client
//!
//! Retrieves the two inputs of an analysis for a date range: the tag collection
//! (paginated through `next_token`) and the daily sleep, readiness and activity
//! summaries that make up the metric table. Any transport failure or non-success
//! status is reported as a [`FetchError`] before the analysis starts.

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::metric_table::{MetricTable, SummaryPayload};
use crate::models::{AnnotationRecord, TagPage};
use crate::range::RangeQuery;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct OuraClient {
    client: reqwest::Client,
    access_token: String,
    tags_url: String,
    summary_base_url: String,
}

impl OuraClient {
    pub fn new(config: &ApiConfig, access_token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            access_token: access_token.into(),
            tags_url: config.tags_url.clone(),
            summary_base_url: config.summary_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// All tag entries within the query range, following pagination
    pub async fn fetch_tags(&self, query: &RangeQuery) -> Result<Vec<AnnotationRecord>, FetchError> {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("start_date", query.start_date.format(DATE_FORMAT).to_string()),
                ("end_date", query.end_date.format(DATE_FORMAT).to_string()),
            ];
            if let Some(token) = next_token.take() {
                params.push(("next_token", token));
            }

            let page: TagPage = self.get_json("tag", &self.tags_url, &params).await?;
            debug!(entries = page.data.len(), "Fetched tag page");
            records.extend(page.data);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        info!(records = records.len(), "Fetched tags");
        Ok(records)
    }

    /// Daily sleep, readiness and activity summaries, requested concurrently
    pub async fn fetch_summaries(&self, query: &RangeQuery) -> Result<SummaryPayload, FetchError> {
        let params = [
            ("start", query.start_date.format(DATE_FORMAT).to_string()),
            ("end", query.end_date.format(DATE_FORMAT).to_string()),
        ];
        let sleep_url = format!("{}/sleep", self.summary_base_url);
        let readiness_url = format!("{}/readiness", self.summary_base_url);
        let activity_url = format!("{}/activity", self.summary_base_url);

        let (sleep, readiness, activity) = futures::try_join!(
            self.get_json::<SummaryPayload>("sleep", &sleep_url, &params),
            self.get_json::<SummaryPayload>("readiness", &readiness_url, &params),
            self.get_json::<SummaryPayload>("activity", &activity_url, &params),
        )?;

        info!(
            sleep = sleep.sleep.len(),
            readiness = readiness.readiness.len(),
            activity = activity.activity.len(),
            "Fetched daily summaries"
        );

        Ok(SummaryPayload {
            sleep: sleep.sleep,
            readiness: readiness.readiness,
            activity: activity.activity,
        })
    }

    pub async fn fetch_metric_table(&self, query: &RangeQuery) -> Result<MetricTable, FetchError> {
        let payload = self.fetch_summaries(query).await?;
        Ok(MetricTable::from_summaries(&payload))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                endpoint: endpoint.to_string(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| FetchError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}
