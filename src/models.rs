/// Data models for Lytics API types.
///
/// All models use serde for JSON serialization/deserialization. The remote
/// payloads vary between accounts and API versions, so every field defaults
/// when missing.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// An entity (e.g. a user profile) as returned by the entity endpoint.
pub type Entity = serde_json::Map<String, Value>;

/// A record used as input to query tests and data collection.
pub type Record = serde_json::Map<String, Value>;

/// Deserialize a value that may be a JSON number, a string containing a number (blank is 0), or null.
fn deserialize_lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        Some(Value::Number(n)) => Ok(n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0)),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0),
        Some(Value::String(s)) => s.trim().parse().map_err(serde::de::Error::custom),
        _ => Ok(0),
    }
}

/// Deserialize a field whose JSON value may be null, falling back to the type's default.
pub(crate) fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Feature flags enabled on an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccountFeatures {
    #[serde(rename = "audience-attribution")]
    #[serde(deserialize_with = "deserialize_null_default")]
    pub audience_attribution: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub campaigns: bool,
    #[serde(rename = "content-classification")]
    #[serde(deserialize_with = "deserialize_null_default")]
    pub content_classification: bool,
}

/// A Lytics account from GET /api/account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    #[serde(deserialize_with = "deserialize_lenient_u64")]
    pub aid: u64,
    pub id: Option<String>,
    pub name: Option<String>,
    pub domain: Option<String>,
    pub email: Option<String>,
    pub apikey: Option<String>,
    pub dataapikey: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub fid: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub locked: bool,
    #[serde(deserialize_with = "deserialize_lenient_u64")]
    pub masteraid: u64,
    #[serde(deserialize_with = "deserialize_lenient_u64")]
    pub parentaid: u64,
    pub parent_id: Option<String>,
    pub package_id: Option<String>,
    pub partner_id: Option<String>,
    pub partner_slug: Option<String>,
    pub provider_id: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub pubusers: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub two_factor_auth: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub features: AccountFeatures,
}

/// One account-level setting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSetting {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub value: Value,
    pub updated: Option<String>,
}

impl AccountSetting {
    /// The setting value as a list of strings; non-string items are skipped.
    pub fn string_values(&self) -> Vec<String> {
        match &self.value {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            Value::String(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Data streams and schema
// ---------------------------------------------------------------------------

/// Where a stream field lands in a table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStreamFieldColumn {
    #[serde(rename = "as")]
    pub name: Option<String>,
    pub table: Option<String>,
}

/// Counts of detected value shapes for a stream field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartFieldCounts {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub analyses: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub coverage: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub email: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub ip: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub noun: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub phone: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub time: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub uid: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub url: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub value: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub verb: u64,
}

/// A field observed on a data stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStreamField {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub avg: f64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub card: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub column: Vec<DataStreamFieldColumn>,
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub hidden: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub is_array: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub sample: Vec<Value>,
    pub smart: Option<SmartFieldCounts>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub sumlen: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub usage: u64,
}

/// A data stream from GET /api/schema/_streams.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStream {
    pub stream: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub avg_event_size: f64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub ct: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub curct: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub fields: Vec<DataStreamField>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub hidden: bool,
    pub last_msg_ts: Option<String>,
    pub last_update_ts: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub recent_events: Vec<Value>,
}

impl DataStream {
    pub fn field(&self, name: &str) -> Option<&DataStreamField> {
        self.fields.iter().find(|f| f.name.as_deref() == Some(name))
    }
}

/// A column of a table schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaColumn {
    #[serde(rename = "as")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub column_type: Option<String>,
    pub shortdesc: Option<String>,
    pub longdesc: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub is_by: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub hidden: bool,
    pub mergeop: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub froms: Vec<String>,
}

/// Schema of a table (e.g. "user" or "content").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub columns: Vec<SchemaColumn>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub by_fields: Vec<String>,
}

/// A term and how many entities carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

/// Term-frequency information for one field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldInfo {
    pub field: Option<String>,
    #[serde(deserialize_with = "deserialize_lenient_u64")]
    pub ents_present: u64,
    #[serde(deserialize_with = "deserialize_lenient_u64")]
    pub ents_absent: u64,
    #[serde(deserialize_with = "deserialize_lenient_u64")]
    pub approx_cardinality: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub terms_counts: BTreeMap<String, u64>,
}

impl FieldInfo {
    /// The `n` most frequent terms, most frequent first (ties by term).
    pub fn top_terms(&self, n: usize) -> Vec<TermCount> {
        let mut terms: Vec<TermCount> = self
            .terms_counts
            .iter()
            .map(|(term, count)| TermCount {
                term: term.clone(),
                count: *count,
            })
            .collect();
        terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        terms.truncate(n);
        terms
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// A field produced by a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryField {
    #[serde(rename = "as")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub shortdesc: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub is_by: bool,
}

/// An LQL query from GET /api/query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub id: Option<String>,
    pub alias: Option<String>,
    pub table: Option<String>,
    pub from: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub published: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub fields: Vec<QueryField>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub by_fields: Vec<String>,
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

/// Segment kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Audience,
    Characteristic,
    Unidentified,
}

impl SegmentKind {
    pub fn from_kind(kind: Option<&str>) -> Self {
        match kind {
            Some("segment") => SegmentKind::Audience,
            Some("aspect") => SegmentKind::Characteristic,
            _ => SegmentKind::Unidentified,
        }
    }
}

/// A segment from GET /api/segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug_name: Option<String>,
    pub kind: Option<String>,
    pub table: Option<String>,
    pub segment_ql: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub is_public: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub tags: Vec<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

impl Segment {
    pub fn segment_kind(&self) -> SegmentKind {
        SegmentKind::from_kind(self.kind.as_deref())
    }
}

/// Segments split by kind.
#[derive(Debug, Clone, Default)]
pub struct SegmentCollection {
    pub audience: Vec<Segment>,
    pub characteristic: Vec<Segment>,
    pub unidentified: Vec<Segment>,
}

impl SegmentCollection {
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut collection = Self::default();
        for segment in segments {
            match segment.segment_kind() {
                SegmentKind::Audience => collection.audience.push(segment),
                SegmentKind::Characteristic => collection.characteristic.push(segment),
                SegmentKind::Unidentified => collection.unidentified.push(segment),
            }
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.audience.len() + self.characteristic.len() + self.unidentified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A segment ML model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentMlModel {
    pub name: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub state: Option<String>,
    pub summary: Value,
    pub conf: Value,
    pub created: Option<String>,
    pub updated: Option<String>,
}

/// Body for POST /api/segmentml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentMlModelRequest {
    pub name: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

/// A campaign from GET /api/program/campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Campaign {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub segments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

/// A campaign variation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignVariation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub campaign_id: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub variation: u32,
    pub vehicle: Option<String>,
    pub reach: Option<String>,
    pub detail: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// One topic and its relevance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Topic {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub label: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub relevance: f64,
}

/// Result of POST /api/content/classify.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Classification {
    pub url: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub topics: Vec<Topic>,
    pub language: Option<String>,
}

/// A document known to the content graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub topics: BTreeMap<String, f64>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

// ---------------------------------------------------------------------------
// Subscriptions and tokens
// ---------------------------------------------------------------------------

/// Channel name for webhook subscriptions.
pub const WEBHOOK_CHANNEL: &str = "webhook";

/// A subscription from GET /api/subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub id: Option<String>,
    pub name: Option<String>,
    pub channel: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub segment_ids: Vec<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub user_fields: Vec<String>,
    pub webhook_url: Option<String>,
    pub config: Value,
    pub created: Option<String>,
    pub updated: Option<String>,
}

impl Subscription {
    pub fn is_webhook(&self) -> bool {
        self.channel.as_deref() == Some(WEBHOOK_CHANNEL)
    }
}

/// Body for POST /api/subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub name: String,
    pub channel: String,
    pub segment_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

/// Convenience request for a webhook subscription.
#[derive(Debug, Clone)]
pub struct WebhookSubscriptionRequest {
    pub name: String,
    pub url: String,
    pub segment_ids: Vec<String>,
    pub user_fields: Vec<String>,
}

impl From<WebhookSubscriptionRequest> for SubscriptionRequest {
    fn from(req: WebhookSubscriptionRequest) -> Self {
        SubscriptionRequest {
            name: req.name,
            channel: WEBHOOK_CHANNEL.to_string(),
            segment_ids: req.segment_ids,
            user_fields: req.user_fields,
            webhook_url: Some(req.url),
            config: None,
        }
    }
}

/// An API access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessToken {
    pub id: Option<String>,
    pub name: Option<String>,
    pub token: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub scopes: Vec<String>,
    pub expires: Option<String>,
    pub created: Option<String>,
}

/// Body for POST /api/apikey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenRequest {
    pub name: String,
    /// Lifetime such as "24h"; `None` lets the server pick its default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    pub scopes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Result of POST /collect/json/{stream}.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectResponse {
    #[serde(deserialize_with = "deserialize_lenient_u64")]
    pub message_count: u64,
    #[serde(deserialize_with = "deserialize_lenient_u64")]
    pub dropped: u64,
    #[serde(deserialize_with = "deserialize_lenient_u64")]
    pub filtered: u64,
}
