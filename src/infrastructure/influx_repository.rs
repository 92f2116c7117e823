// InfluxDB repository implementation
use crate::application::telemetry_repository::{TelemetryRepository, TimeWindow};
use crate::domain::telemetry::TemperatureReading;
use crate::infrastructure::config::{InfluxSettings, prepare_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Deserialize;
use std::collections::HashMap;

const LIST_WATERJETS_QUERY: &str = "SHOW TAG VALUES FROM \"${measurement}\" WITH KEY = \"${tag}\"";

const TEMPERATURE_QUERY: &str =
    "SELECT \"${field}\" FROM \"${measurement}\" WHERE ${time_filter}${tag_filter} ORDER BY time ASC";

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
    field: String,
    tag: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(settings: InfluxSettings) -> Self {
        Self {
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token,
            database: settings.database,
            retention_policy: settings.retention_policy,
            measurement: settings.measurement,
            field: settings.field,
            tag: settings.tag,
            client: reqwest::Client::new(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn query_vars(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("measurement".to_string(), self.measurement.clone());
        vars.insert("field".to_string(), self.field.clone());
        vars.insert("tag".to_string(), self.tag.clone());
        vars
    }

    fn temperature_query(&self, window: &TimeWindow, waterjet_id: Option<&str>) -> String {
        let time_filter = match window {
            TimeWindow::LastHours(hours) => format!("time >= now() - {}h", hours),
            TimeWindow::Between { start, end } => format!(
                "time >= '{}' AND time <= '{}'",
                start.to_rfc3339_opts(SecondsFormat::Secs, true),
                end.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        };
        let tag_filter = match waterjet_id {
            Some(id) => format!(" AND \"{}\" = '{}'", self.tag, escape_string_literal(id)),
            None => String::new(),
        };

        let mut vars = self.query_vars();
        vars.insert("time_filter".to_string(), time_filter);
        vars.insert("tag_filter".to_string(), tag_filter);
        prepare_query(TEMPERATURE_QUERY, &vars)
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);
        tracing::debug!("Executing InfluxQL query: {}", query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(error) = data.results.first().and_then(|r| r.error.as_ref()) {
            anyhow::bail!("InfluxDB query error: {}", error);
        }

        Ok(data)
    }
}

/// Escape text for an InfluxQL single-quoted literal; backslashes first so they cannot swallow a quote escape
fn escape_string_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Tag values from a `SHOW TAG VALUES` response, in response order
fn parse_tag_values(response: &InfluxQLResponse) -> Vec<String> {
    let mut values = Vec::new();
    for series in response.results.iter().flat_map(|r| r.series.iter().flatten()) {
        let value_idx = series.columns.iter().position(|c| c == "value").unwrap_or(1);
        for row in &series.values {
            if let Some(value) = row.get(value_idx).and_then(|v| v.as_str()) {
                values.push(value.to_string());
            }
        }
    }
    values
}

/// Temperature rows from a `SELECT` response; rows without a numeric value or RFC 3339 time are skipped
fn parse_temperatures(response: &InfluxQLResponse, field: &str) -> Vec<TemperatureReading> {
    let mut readings = Vec::new();
    for series in response.results.iter().flat_map(|r| r.series.iter().flatten()) {
        let time_idx = series.columns.iter().position(|c| c == "time").unwrap_or(0);
        let value_idx = series.columns.iter().position(|c| c == field).unwrap_or(1);

        for row in &series.values {
            let time = row.get(time_idx).and_then(|v| v.as_str());
            let value = row.get(value_idx).and_then(|v| v.as_f64());
            let (Some(time), Some(value)) = (time, value) else {
                tracing::warn!("Skipping malformed InfluxDB row: {:?}", row);
                continue;
            };
            match chrono::DateTime::parse_from_rfc3339(time) {
                Ok(parsed) => readings.push(TemperatureReading::new(
                    parsed.timestamp_millis(),
                    time.to_string(),
                    value,
                )),
                Err(e) => tracing::warn!("Skipping row with bad time {}: {}", time, e),
            }
        }
    }
    readings
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn list_waterjet_ids(&self) -> Result<Vec<String>> {
        let query = prepare_query(LIST_WATERJETS_QUERY, &self.query_vars());
        let response = self.execute_query(&query).await?;
        Ok(parse_tag_values(&response))
    }

    async fn query_temperatures(
        &self,
        window: &TimeWindow,
        waterjet_id: Option<&str>,
    ) -> Result<Vec<TemperatureReading>> {
        let query = self.temperature_query(window, waterjet_id);
        let response = self.execute_query(&query).await?;
        let readings = parse_temperatures(&response, &self.field);

        tracing::debug!("Fetched {} temperature readings for {:?}", readings.len(), waterjet_id);
        Ok(readings)
    }
}
