use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info};

use super::{RateSeries, RateSource};
use crate::config::{PayloadFormat, RatesConfig};
use crate::error::Result;
use crate::utils::parse_decimal_br;

/// SGS record as returned with `formato=json`
#[derive(Debug, Deserialize)]
struct SgsRecord {
    #[serde(default)]
    data: Option<String>,
    valor: serde_json::Value,
}

/// Latest point of an SGS series, value still in percent
///
/// Only the value is required; a missing or unreadable date is kept as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub date: Option<NaiveDate>,
    pub percent: Decimal,
}

impl Observation {
    pub fn as_fraction(&self) -> Decimal {
        self.percent / Decimal::ONE_HUNDRED
    }
}

/// Banco Central do Brasil SGS client
pub struct BcbClient {
    client: Client,
    config: RatesConfig,
}

impl BcbClient {
    pub fn new(config: RatesConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rendafixa/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn series_code(&self, series: RateSeries) -> u32 {
        match series {
            RateSeries::Cdi => self.config.cdi_series,
            RateSeries::Selic => self.config.selic_series,
        }
    }

    /// URL for the single most recent observation of a series
    pub fn series_url(&self, series: RateSeries) -> String {
        format!(
            "{}/dados/serie/bcdata.sgs.{}/dados/ultimos/1?formato={}",
            self.config.base_url.trim_end_matches('/'),
            self.series_code(series),
            self.config.format.as_query()
        )
    }
}

impl RateSource for BcbClient {
    async fn latest(&self, series: RateSeries) -> Result<Decimal> {
        let url = self.series_url(series);
        info!("Fetching {} from Banco Central ({})", series, url);

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to Banco Central")?
            .error_for_status()
            .context("Banco Central returned error status")?
            .text()
            .await
            .context("Failed to read Banco Central response")?;

        let observation = parse_series_payload(&body)
            .with_context(|| format!("Unexpected {} payload from Banco Central", series))?;
        match observation.date {
            Some(date) => debug!(
                "{} observation for {}: {}%",
                series,
                date.format("%d/%m/%Y"),
                observation.percent
            ),
            None => debug!("{} observation without date: {}%", series, observation.percent),
        }

        Ok(observation.as_fraction())
    }
}

/// Parse an SGS response body, JSON array or `;`-delimited text.
///
/// The last record wins; its value is a percentage such as `"13,25"`.
pub fn parse_series_payload(body: &str) -> Result<Observation> {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        bail!("Empty response body");
    }

    let (date, value) = if trimmed.starts_with('[') {
        last_json_record(trimmed)?
    } else {
        last_delimited_record(trimmed)?
    };

    let date = date.as_deref().and_then(parse_date_br);
    let percent = parse_decimal_br(&value)?;
    if percent.is_sign_negative() && !percent.is_zero() {
        bail!("Negative rate observation: {}", value);
    }

    Ok(Observation { date, percent })
}

fn last_json_record(body: &str) -> Result<(Option<String>, String)> {
    let records: Vec<SgsRecord> =
        serde_json::from_str(body).context("Failed to parse JSON series payload")?;
    let last = records
        .into_iter()
        .last()
        .ok_or_else(|| anyhow!("Series returned no observations"))?;

    let value = match last.valor {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        other => bail!("Unexpected 'valor' field: {}", other),
    };
    Ok((last.data, value))
}

fn find_header(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("Missing series column: {}", name))
}

fn last_delimited_record(body: &str) -> Result<(Option<String>, String)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let headers = reader.headers()?.clone();
    let data_idx = find_header(&headers, "data").ok();
    let valor_idx = find_header(&headers, "valor")?;

    let mut last = None;
    for result in reader.records() {
        let record = result.context("Malformed delimited series payload")?;
        let valor = record.get(valor_idx).unwrap_or("");
        if valor.is_empty() {
            continue;
        }
        let data = data_idx
            .and_then(|idx| record.get(idx))
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        last = Some((data, valor.to_string()));
    }

    last.ok_or_else(|| anyhow!("Series returned no observations"))
}

/// `dd/mm/yyyy`, ISO date or the date part of an ISO datetime
fn parse_date_br(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::from_str(value))
        .or_else(|_| NaiveDate::from_str(value.get(..10).unwrap_or(value)))
        .ok()
}
