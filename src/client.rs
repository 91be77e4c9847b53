/// High-level LyticsClient for multi-step workflows.
///
/// Wraps [`LyticsApi`] and adds the operations that combine or reshape endpoint
/// results: stream and field lookup, grouping, whitelist toggling, LQL function
/// testing and entity fragment graphs. Each workflow call issues its requests
/// sequentially and keeps no state between calls.
use std::collections::BTreeMap;

use log::debug;
use serde_json::Value;

use crate::api::LyticsApi;
use crate::config::LyticsConfig;
use crate::errors::LyticsError;
use crate::fragments::FragmentGraph;
use crate::models::*;
use crate::siphash::matches_identifier;
use crate::transport::{HttpTransport, Transport};

/// Quote an LQL string literal.
fn lql_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// LQL that evaluates `name(params...)` into the field `value` of a scratch table.
pub fn function_test_lql(name: &str, params: &[&str]) -> String {
    let args = params
        .iter()
        .map(|p| lql_string(p))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {name}({args}) AS value FROM _test INTO _test BY value ALIAS _test")
}

/// The high-level Lytics client.
#[derive(Debug, Clone)]
pub struct LyticsClient<T: Transport = HttpTransport> {
    pub api: LyticsApi<T>,
}

impl LyticsClient<HttpTransport> {
    /// Create a client over HTTP.
    pub fn new(config: LyticsConfig) -> Result<Self, LyticsError> {
        Ok(Self {
            api: LyticsApi::new(config)?,
        })
    }

    /// Create a client from `LIOKEY` (and optionally `LIO_API_BASE`).
    pub fn from_env() -> Result<Self, LyticsError> {
        Self::new(LyticsConfig::from_env()?)
    }
}

impl<T: Transport> LyticsClient<T> {
    /// Wrap an existing API client.
    pub fn with_api(api: LyticsApi<T>) -> Self {
        Self { api }
    }

    pub fn config(&self) -> &LyticsConfig {
        self.api.config()
    }

    // -----------------------------------------------------------------------
    // Streams
    // -----------------------------------------------------------------------

    /// Find a data stream by name.
    pub async fn get_stream(&self, name: &str) -> Result<Option<DataStream>, LyticsError> {
        debug!("client.get_stream name={}", name);
        if name.trim().is_empty() {
            return Err(LyticsError::invalid_argument("stream name is required"));
        }
        let streams = self.api.get_streams().await?;
        Ok(streams
            .into_iter()
            .find(|s| s.stream.as_deref() == Some(name)))
    }

    /// Find one field of a data stream; `None` if either does not exist.
    pub async fn get_stream_field(
        &self,
        stream: &str,
        field: &str,
    ) -> Result<Option<DataStreamField>, LyticsError> {
        debug!("client.get_stream_field stream={} field={}", stream, field);
        if field.trim().is_empty() {
            return Err(LyticsError::invalid_argument("field name is required"));
        }
        Ok(self
            .get_stream(stream)
            .await?
            .and_then(|s| s.field(field).cloned()))
    }

    // -----------------------------------------------------------------------
    // Queries & Segments
    // -----------------------------------------------------------------------

    /// All queries keyed by table; queries without a table go under "".
    pub async fn get_queries_grouped_by_table(
        &self,
    ) -> Result<BTreeMap<String, Vec<Query>>, LyticsError> {
        debug!("client.get_queries_grouped_by_table");
        let mut grouped: BTreeMap<String, Vec<Query>> = BTreeMap::new();
        for query in self.api.get_queries().await? {
            let table = query.table.clone().unwrap_or_default();
            grouped.entry(table).or_default().push(query);
        }
        Ok(grouped)
    }

    /// Segments split into audiences, characteristics and the rest.
    pub async fn get_segments_by_kind(
        &self,
        table: Option<&str>,
    ) -> Result<SegmentCollection, LyticsError> {
        debug!("client.get_segments_by_kind table={:?}", table);
        let segments = self.api.get_segments(table).await?;
        Ok(SegmentCollection::from_segments(segments))
    }

    /// Evaluate an LQL function against literal arguments.
    ///
    /// Returns the computed value, or `None` if the function produced nothing.
    pub async fn test_function(
        &self,
        name: &str,
        params: &[&str],
    ) -> Result<Option<Value>, LyticsError> {
        debug!("client.test_function name={} params={:?}", name, params);
        if name.trim().is_empty() {
            return Err(LyticsError::invalid_argument("function name is required"));
        }
        if name.chars().any(|c| !(c.is_alphanumeric() || c == '_' || c == '.')) {
            return Err(LyticsError::invalid_argument(format!(
                "invalid function name: {name}"
            )));
        }
        let lql = function_test_lql(name, params);
        let result = self.api.test_query(&lql, &Record::new()).await?;
        Ok(result
            .and_then(|entity| entity.get("value").cloned())
            .filter(|v| !v.is_null()))
    }

    // -----------------------------------------------------------------------
    // Campaigns
    // -----------------------------------------------------------------------

    /// All variations keyed by campaign id. Variations without one go under "".
    pub async fn get_campaign_variations_by_campaign(
        &self,
    ) -> Result<BTreeMap<String, Vec<CampaignVariation>>, LyticsError> {
        debug!("client.get_campaign_variations_by_campaign");
        let mut grouped: BTreeMap<String, Vec<CampaignVariation>> = BTreeMap::new();
        for variation in self.api.get_campaign_variations().await? {
            let campaign = variation.campaign_id.clone().unwrap_or_default();
            grouped.entry(campaign).or_default().push(variation);
        }
        for variations in grouped.values_mut() {
            variations.sort_by_key(|v| v.variation);
        }
        Ok(grouped)
    }

    /// Find one variation by id.
    pub async fn get_campaign_variation(
        &self,
        id: &str,
    ) -> Result<Option<CampaignVariation>, LyticsError> {
        debug!("client.get_campaign_variation id={}", id);
        if id.trim().is_empty() {
            return Err(LyticsError::invalid_argument("variation id is required"));
        }
        let grouped = self.get_campaign_variations_by_campaign().await?;
        Ok(grouped
            .into_values()
            .flatten()
            .find(|v| v.id.as_deref() == Some(id)))
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    pub async fn get_webhook_subscriptions(&self) -> Result<Vec<Subscription>, LyticsError> {
        debug!("client.get_webhook_subscriptions");
        Ok(self
            .api
            .get_subscriptions()
            .await?
            .into_iter()
            .filter(Subscription::is_webhook)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Whitelist
    // -----------------------------------------------------------------------

    /// Add or remove one whitelisted field.
    ///
    /// Returns `true` if the whitelist changed. No write is made when the field
    /// is already in the requested state.
    pub async fn set_whitelist_field_status(
        &self,
        aid: u64,
        field: &str,
        enabled: bool,
    ) -> Result<bool, LyticsError> {
        debug!(
            "client.set_whitelist_field_status aid={} field={} enabled={}",
            aid, field, enabled
        );
        if field.trim().is_empty() {
            return Err(LyticsError::invalid_argument("field name is required"));
        }
        let mut fields = self.api.get_whitelist_fields(aid).await?;
        let present = fields.iter().any(|f| f == field);
        if present == enabled {
            return Ok(false);
        }
        if enabled {
            fields.push(field.to_string());
        } else {
            fields.retain(|f| f != field);
        }
        self.api.set_whitelist_fields(aid, &fields).await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------------

    /// Fetch an entity's fragments and link them into a graph.
    pub async fn get_entity_fragment_graph(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<FragmentGraph, LyticsError> {
        debug!(
            "client.get_entity_fragment_graph table={} field={} value={}",
            table, field, value
        );
        let fragments = self.api.get_entity_fragments(table, field, value).await?;
        Ok(FragmentGraph::build(&fragments))
    }

    /// Check a value against a numeric identifier computed by the backend.
    pub fn verify_identifier(&self, value: &str, expected: i64) -> bool {
        matches_identifier(value, expected)
    }
}
