//! Google Trends provider implementation.
//!
//! Talks to the public web endpoints behind trends.google.com:
//!
//! 1. `GET /trends/explore/?geo=..` once, to obtain the session cookie
//! 2. `POST /trends/api/explore` (parameters in the query string) to get
//!    per-widget request tokens
//! 3. `GET /trends/api/widgetdata/comparedgeo` (region widget) or
//!    `GET /trends/api/widgetdata/multiline` (time-series widget)
//!
//! Every body is JSON behind an anti-XSSI prefix such as `)]}'`.

use super::provider::{TrendsProvider, TrendsQuery};
use crate::config::TrendsConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::types::{RegionInterest, TimelinePoint};
use chrono::DateTime;
use reqwest::Method;
use reqwest::blocking::{Client, Request};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

const SESSION_PATH: &str = "/trends/explore/";
const EXPLORE_PATH: &str = "/trends/api/explore";
const REGION_PATH: &str = "/trends/api/widgetdata/comparedgeo";
const TIMELINE_PATH: &str = "/trends/api/widgetdata/multiline";

const REGION_WIDGET: &str = "GEO_MAP";
const TIMELINE_WIDGET: &str = "TIMESERIES";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExplorePayload<'a> {
    comparison_item: Vec<ComparisonItem<'a>>,
    category: u32,
    property: &'a str,
}

#[derive(Debug, Serialize)]
struct ComparisonItem<'a> {
    keyword: &'a str,
    time: &'a str,
    geo: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    widgets: Vec<Widget>,
}

#[derive(Debug, Clone, Deserialize)]
struct Widget {
    id: String,
    request: serde_json::Value,
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct WidgetResponse<T> {
    default: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoMapData {
    geo_map_data: Vec<GeoMapEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoMapEntry {
    #[serde(default)]
    geo_code: String,
    geo_name: String,
    value: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineData {
    timeline_data: Vec<TimelineEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineEntry {
    /// Unix seconds, sent as a string.
    time: String,
    value: Vec<i64>,
    #[serde(default)]
    is_partial: bool,
}

/// Google Trends provider backed by a blocking HTTP client with a cookie store.
///
/// # Example
///
/// ```rust,ignore
/// use eda_pipelines::trends::{GoogleTrendsProvider, TrendsClient};
///
/// let config = TrendsConfig::default();
/// let provider = GoogleTrendsProvider::new(&config)?;
/// let client = TrendsClient::new(provider, config);
/// let regions = client.interest_by_region("cricket")?;
/// ```
pub struct GoogleTrendsProvider {
    config: TrendsConfig,
    client: Client,
    session_ready: AtomicBool,
}

impl GoogleTrendsProvider {
    /// Create a provider. No request is made until the first query.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &TrendsConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config: config.clone(),
            client,
            session_ready: AtomicBool::new(false),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Country part of the host language ("en-US" -> "US").
    fn home_geo(&self) -> &str {
        self.config
            .host_language
            .rsplit('-')
            .next()
            .unwrap_or("US")
    }

    fn ensure_session(&self) -> Result<()> {
        if self.session_ready.load(Ordering::Relaxed) {
            return Ok(());
        }
        debug!("Fetching trends session cookie");
        self.client
            .execute(self.session_request()?)?
            .error_for_status()?;
        self.session_ready.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn request(&self, method: Method, path: &str, params: &[(&str, String)]) -> Result<Request> {
        Ok(self
            .client
            .request(method, self.url(path))
            .query(params)
            .build()?)
    }

    fn session_request(&self) -> Result<Request> {
        self.request(Method::GET, SESSION_PATH, &[("geo", self.home_geo().to_string())])
    }

    fn explore_request(&self, query: &TrendsQuery) -> Result<Request> {
        let payload = ExplorePayload {
            comparison_item: query
                .keywords
                .iter()
                .map(|keyword| ComparisonItem {
                    keyword,
                    time: &query.timeframe,
                    geo: &query.geo,
                })
                .collect(),
            category: query.category,
            property: &query.property,
        };

        let params = [
            ("hl", self.config.host_language.clone()),
            ("tz", self.config.tz_offset.to_string()),
            ("req", serde_json::to_string(&payload)?),
        ];
        self.request(Method::POST, EXPLORE_PATH, &params)
    }

    fn fetch_json<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let body = self.client.execute(request)?.error_for_status()?.text()?;
        parse_guarded(&body)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        self.fetch_json(self.request(Method::GET, path, params)?)
    }

    fn explore(&self, query: &TrendsQuery) -> Result<Vec<Widget>> {
        self.ensure_session()?;
        let response: ExploreResponse = self
            .fetch_json(self.explore_request(query)?)
            .context("Trends explore request")?;
        debug!("Explore returned {} widgets", response.widgets.len());
        Ok(response.widgets)
    }

    fn widget_params(&self, widget: &Widget) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            ("req", serde_json::to_string(&widget.request)?),
            ("token", widget.token.clone()),
            ("tz", self.config.tz_offset.to_string()),
        ])
    }
}

impl TrendsProvider for GoogleTrendsProvider {
    fn interest_by_region(&self, query: &TrendsQuery) -> Result<Vec<RegionInterest>> {
        info!("Querying interest by region for {:?}", query.keywords);
        let mut widget = find_widget(self.explore(query)?, REGION_WIDGET)?;
        if let Some(request) = widget.request.as_object_mut() {
            if query.geo.is_empty() {
                request.insert("resolution".to_string(), "COUNTRY".into());
            }
            request.insert("includeLowSearchVolumeGeos".to_string(), false.into());
        }

        let response: WidgetResponse<GeoMapData> = self
            .get_json(REGION_PATH, &self.widget_params(&widget)?)
            .context("Trends region request")?;
        regions_from_response(response.default, query.keywords.len())
    }

    fn interest_over_time(&self, query: &TrendsQuery) -> Result<Vec<TimelinePoint>> {
        info!("Querying interest over time for {:?}", query.keywords);
        let widget = find_widget(self.explore(query)?, TIMELINE_WIDGET)?;

        let response: WidgetResponse<TimelineData> = self
            .get_json(TIMELINE_PATH, &self.widget_params(&widget)?)
            .context("Trends timeline request")?;
        timeline_from_response(response.default, query.keywords.len())
    }

    fn name(&self) -> &str {
        "Google Trends"
    }
}

/// Parse a JSON body that may start with an anti-XSSI guard like `)]}',`.
fn parse_guarded<T: DeserializeOwned>(body: &str) -> Result<T> {
    let start = body
        .find(['{', '['])
        .ok_or_else(|| EdaError::UnexpectedResponse("response body contains no JSON".to_string()))?;
    Ok(serde_json::from_str(&body[start..])?)
}

fn find_widget(widgets: Vec<Widget>, id: &str) -> Result<Widget> {
    widgets
        .into_iter()
        .find(|w| w.id == id)
        .ok_or_else(|| EdaError::WidgetNotFound(id.to_string()))
}

fn regions_from_response(data: GeoMapData, keywords: usize) -> Result<Vec<RegionInterest>> {
    data.geo_map_data
        .into_iter()
        .map(|entry| {
            if entry.value.len() != keywords {
                return Err(EdaError::UnexpectedResponse(format!(
                    "region '{}' has {} values for {} keywords",
                    entry.geo_name,
                    entry.value.len(),
                    keywords
                )));
            }
            Ok(RegionInterest {
                geo_code: entry.geo_code,
                geo_name: entry.geo_name,
                values: entry.value,
            })
        })
        .collect()
}

fn timeline_from_response(data: TimelineData, keywords: usize) -> Result<Vec<TimelinePoint>> {
    data.timeline_data
        .into_iter()
        .map(|entry| {
            let secs: i64 = entry.time.parse().map_err(|_| {
                EdaError::UnexpectedResponse(format!("invalid timestamp '{}'", entry.time))
            })?;
            let date = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| {
                    EdaError::UnexpectedResponse(format!("timestamp out of range: {secs}"))
                })?
                .date_naive();
            if entry.value.len() != keywords {
                return Err(EdaError::UnexpectedResponse(format!(
                    "bucket {} has {} values for {} keywords",
                    date,
                    entry.value.len(),
                    keywords
                )));
            }
            Ok(TimelinePoint {
                date,
                values: entry.value,
                is_partial: entry.is_partial,
            })
        })
        .collect()
}
