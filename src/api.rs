/// REST API client for Lytics.
///
/// Typed wrappers for the Lytics REST endpoints. Every call goes through
/// [`LyticsApi::dispatch`], which builds a fresh header set, sends one request
/// through the [`Transport`], classifies the response with
/// [`normalize`](crate::envelope::normalize) and resolves the HTTP statuses the
/// caller listed as "absent" into [`Reply::Absent`].
use std::any::type_name;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::config::LyticsConfig;
use crate::envelope::{normalize, Extractor, Outcome};
use crate::errors::LyticsError;
use crate::fragments::Fragment;
use crate::models::*;
use crate::transport::{HttpTransport, Request, Transport};

/// Account setting holding the whitelisted user fields.
pub const WHITELIST_SETTING: &str = "api_whitelist_fields";

/// Default number of terms returned by the field info endpoint.
pub const DEFAULT_FIELD_INFO_LIMIT: u32 = 20;

/// Request body content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Json,
    Csv,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Csv => "application/csv",
        }
    }
}

/// Everything the dispatcher needs for one request.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub url: Url,
    pub body: Option<String>,
    pub content_type: ContentType,
    pub extractor: Option<Extractor>,
    /// Non-2xx statuses that mean "absent" rather than failure.
    pub absent_on: Vec<StatusCode>,
}

impl Call {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            content_type: ContentType::Json,
            extractor: None,
            absent_on: Vec::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Serialize `body` to JSON text.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, LyticsError> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    /// Send `body` verbatim.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn extract(mut self, extractor: Extractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn absent_on(mut self, statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        self.absent_on.extend(statuses);
        self
    }
}

/// Result of a dispatched call that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Success with the extracted payload.
    Data(Value),
    /// Success without content (HTTP 204).
    Empty,
    /// "Not Found" inside a 2xx envelope.
    NotFound,
    /// The HTTP status was one the caller mapped to "absent".
    Absent(StatusCode),
}

impl Reply {
    /// The payload, or `None` when there is none.
    pub fn into_option(self) -> Option<Value> {
        match self {
            Reply::Data(Value::Null) => None,
            Reply::Data(value) => Some(value),
            Reply::Empty | Reply::NotFound | Reply::Absent(_) => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Reply::Absent(_))
    }

    /// Whether the remote reported the object missing, by status or by envelope.
    pub fn is_missing(&self) -> bool {
        matches!(self, Reply::Absent(_) | Reply::NotFound)
    }
}

fn require_text(name: &str, value: &str) -> Result<(), LyticsError> {
    if value.trim().is_empty() {
        return Err(LyticsError::invalid_argument(format!("{name} is required")));
    }
    Ok(())
}

fn require_id(name: &str, value: u64) -> Result<(), LyticsError> {
    if value == 0 {
        return Err(LyticsError::invalid_argument(format!(
            "{name} must be a non-zero id"
        )));
    }
    Ok(())
}

fn require_items<T>(name: &str, items: &[T]) -> Result<(), LyticsError> {
    if items.is_empty() {
        return Err(LyticsError::invalid_argument(format!(
            "{name} must not be empty"
        )));
    }
    Ok(())
}

fn require_field<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, LyticsError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LyticsError::invalid_argument(format!("{name} is required"))),
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, LyticsError> {
    serde_json::from_value(value).map_err(|e| {
        LyticsError::JsonError(format!("Failed to parse {}: {e}", type_name::<R>()))
    })
}

/// The status carried inside an envelope, if it is numeric.
fn envelope_status(envelope: &Value) -> Option<u16> {
    envelope
        .get("status")
        .and_then(|s| s.as_u64())
        .and_then(|s| u16::try_from(s).ok())
}

fn with_query(mut url: Url, pairs: &[(&str, &str)]) -> Url {
    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    url
}

/// Record values as query parameters; arrays repeat the key.
fn record_query(mut url: Url, record: &Record) -> Url {
    if record.is_empty() {
        return url;
    }
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in record {
            match value {
                Value::Array(items) => {
                    for item in items {
                        query.append_pair(key, &query_value(item));
                    }
                }
                other => {
                    query.append_pair(key, &query_value(other));
                }
            }
        }
    }
    url
}

fn query_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Payload extractors for endpoints that do not return a plain `data` field.

fn data_of(envelope: &Value) -> Value {
    envelope.get("data").cloned().unwrap_or(Value::Null)
}

/// `data.fields` when present, else `data`.
fn field_list(envelope: &Value) -> Value {
    let data = data_of(envelope);
    match data.get("fields") {
        Some(fields) => fields.clone(),
        None => data,
    }
}

/// `data.fragments` when present, else `data`.
fn fragment_list(envelope: &Value) -> Value {
    let data = data_of(envelope);
    match data.get("fragments") {
        Some(fragments) => fragments.clone(),
        None => data,
    }
}

/// `data` as a list: a single object becomes a one-item list.
fn as_list(envelope: &Value) -> Value {
    match data_of(envelope) {
        Value::Object(item) => Value::Array(vec![Value::Object(item)]),
        other => other,
    }
}

/// `data` as a list: an object keyed by name becomes the list of its values.
fn values_as_list(envelope: &Value) -> Value {
    match data_of(envelope) {
        Value::Object(map) => Value::Array(map.into_iter().map(|(_, v)| v).collect()),
        other => other,
    }
}

/// First item of a `data` list, or `data` itself.
fn first_item(envelope: &Value) -> Value {
    match data_of(envelope) {
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    }
}

/// Low-level REST API client for Lytics.
#[derive(Debug, Clone)]
pub struct LyticsApi<T: Transport = HttpTransport> {
    transport: T,
    config: LyticsConfig,
}

impl LyticsApi<HttpTransport> {
    /// Create a new API client over HTTP.
    pub fn new(config: LyticsConfig) -> Result<Self, LyticsError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport, config })
    }
}

impl<T: Transport> LyticsApi<T> {
    /// Create an API client over a custom transport.
    pub fn with_transport(config: LyticsConfig, transport: T) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &LyticsConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build an endpoint URL from path segments; each segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, LyticsError> {
        let mut url = Url::parse(&self.config.api_base)?;
        url.path_segments_mut()
            .map_err(|_| {
                LyticsError::ConfigError(format!(
                    "API base cannot carry a path: {}",
                    self.config.api_base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers(&self, content_type: ContentType) -> Result<HeaderMap, LyticsError> {
        let mut api_key = HeaderValue::from_str(&self.config.api_key).map_err(|_| {
            LyticsError::ConfigError("API key contains characters not allowed in a header".into())
        })?;
        api_key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        Ok(headers)
    }

    /// Send one request and classify the response.
    ///
    /// Non-2xx statuses listed in [`Call::absent_on`] resolve to
    /// [`Reply::Absent`]; other non-2xx statuses and failed envelopes are
    /// [`LyticsError::RemoteOperation`]. Nothing is retried.
    pub async fn dispatch(&self, call: Call) -> Result<Reply, LyticsError> {
        let Call {
            method,
            url,
            body,
            content_type,
            extractor,
            absent_on,
        } = call;
        debug!(
            "api.dispatch method={} path={} content_type={} body_len={:?}",
            method,
            url.path(),
            content_type.as_str(),
            body.as_ref().map(String::len)
        );

        let request = Request {
            method,
            url,
            headers: self.headers(content_type)?,
            body,
        };
        let response = self.transport.send(request).await?;
        let status = response.status;

        if !status.is_success() {
            if absent_on.contains(&status) {
                debug!("api.dispatch absent status={}", status);
                return Ok(Reply::Absent(status));
            }
            debug!(
                "api.dispatch non_success status={} body={}",
                status, response.body
            );
            let envelope = serde_json::from_str(&response.body)
                .unwrap_or_else(|_| Value::String(response.body.clone()));
            return Err(LyticsError::remote(status.as_u16(), envelope));
        }

        match normalize(status, &response.body, extractor) {
            Outcome::Success(payload) => {
                debug!("api.dispatch outcome=success status={}", status);
                Ok(Reply::Data(payload))
            }
            Outcome::Empty => {
                debug!("api.dispatch outcome=empty status={}", status);
                Ok(Reply::Empty)
            }
            Outcome::NotFound => {
                debug!("api.dispatch outcome=not_found status={}", status);
                Ok(Reply::NotFound)
            }
            Outcome::Failure(envelope) => {
                debug!("api.dispatch outcome=failure status={}", status);
                let code = envelope_status(&envelope).unwrap_or(status.as_u16());
                Err(LyticsError::remote(code, envelope))
            }
        }
    }

    /// Dispatch and decode the payload, `None` when there is none.
    pub async fn fetch<R: DeserializeOwned>(&self, call: Call) -> Result<Option<R>, LyticsError> {
        match self.dispatch(call).await?.into_option() {
            Some(value) => decode(value).map(Some),
            None => Ok(None),
        }
    }

    async fn fetch_list<R: DeserializeOwned>(&self, call: Call) -> Result<Vec<R>, LyticsError> {
        Ok(self.fetch(call).await?.unwrap_or_default())
    }

    async fn fetch_required<R: DeserializeOwned>(
        &self,
        call: Call,
        operation: &str,
    ) -> Result<R, LyticsError> {
        self.fetch(call)
            .await?
            .ok_or_else(|| LyticsError::Other(format!("{operation} returned no data")))
    }

    /// Deletes report `true` unless the object was missing.
    async fn delete_call(&self, url: Url) -> Result<bool, LyticsError> {
        let reply = self
            .dispatch(Call::delete(url).absent_on([StatusCode::NOT_FOUND]))
            .await?;
        Ok(!reply.is_missing())
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// GET /api/account - List the accounts the key can access.
    pub async fn get_accounts(&self) -> Result<Vec<Account>, LyticsError> {
        debug!("api.get_accounts");
        let url = self.endpoint(&["api", "account"])?;
        self.fetch_list(Call::get(url)).await
    }

    /// GET /api/account/{aid} - One account, `None` if it does not exist.
    pub async fn get_account(&self, aid: u64) -> Result<Option<Account>, LyticsError> {
        debug!("api.get_account aid={}", aid);
        require_id("aid", aid)?;
        let aid = aid.to_string();
        let url = self.endpoint(&["api", "account", &aid])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    // -----------------------------------------------------------------------
    // Account settings
    // -----------------------------------------------------------------------

    /// GET /api/account/{aid}/setting - All settings of an account.
    pub async fn get_account_settings(&self, aid: u64) -> Result<Vec<AccountSetting>, LyticsError> {
        debug!("api.get_account_settings aid={}", aid);
        require_id("aid", aid)?;
        let aid = aid.to_string();
        let url = self.endpoint(&["api", "account", &aid, "setting"])?;
        self.fetch_list(Call::get(url).extract(values_as_list)).await
    }

    /// GET /api/account/{aid}/setting/{slug} - One setting.
    pub async fn get_account_setting(
        &self,
        aid: u64,
        slug: &str,
    ) -> Result<Option<AccountSetting>, LyticsError> {
        debug!("api.get_account_setting aid={} slug={}", aid, slug);
        require_id("aid", aid)?;
        require_text("setting slug", slug)?;
        let aid = aid.to_string();
        let url = self.endpoint(&["api", "account", &aid, "setting", slug])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    /// POST /api/account/{aid}/setting/{slug} - Replace a setting value.
    pub async fn update_account_setting(
        &self,
        aid: u64,
        slug: &str,
        value: Value,
    ) -> Result<AccountSetting, LyticsError> {
        debug!("api.update_account_setting aid={} slug={}", aid, slug);
        require_id("aid", aid)?;
        require_text("setting slug", slug)?;
        let aid = aid.to_string();
        let url = self.endpoint(&["api", "account", &aid, "setting", slug])?;
        let call = Call::post(url).json(&json!({ "value": value }))?;
        Ok(self.fetch(call).await?.unwrap_or_else(|| AccountSetting {
            slug: Some(slug.to_string()),
            value,
            ..Default::default()
        }))
    }

    /// DELETE /api/account/{aid}/setting/{slug} - Reset a setting.
    pub async fn delete_account_setting(&self, aid: u64, slug: &str) -> Result<bool, LyticsError> {
        debug!("api.delete_account_setting aid={} slug={}", aid, slug);
        require_id("aid", aid)?;
        require_text("setting slug", slug)?;
        let aid = aid.to_string();
        let url = self.endpoint(&["api", "account", &aid, "setting", slug])?;
        self.delete_call(url).await
    }

    /// Fields currently whitelisted for the account; empty if never set.
    pub async fn get_whitelist_fields(&self, aid: u64) -> Result<Vec<String>, LyticsError> {
        debug!("api.get_whitelist_fields aid={}", aid);
        Ok(self
            .get_account_setting(aid, WHITELIST_SETTING)
            .await?
            .map(|setting| setting.string_values())
            .unwrap_or_default())
    }

    /// Replace the whitelisted fields; returns the list the server now holds.
    pub async fn set_whitelist_fields(
        &self,
        aid: u64,
        fields: &[String],
    ) -> Result<Vec<String>, LyticsError> {
        debug!("api.set_whitelist_fields aid={} fields={:?}", aid, fields);
        if let Some(blank) = fields.iter().position(|f| f.trim().is_empty()) {
            return Err(LyticsError::invalid_argument(format!(
                "whitelist field {blank} is blank"
            )));
        }
        let setting = self
            .update_account_setting(aid, WHITELIST_SETTING, json!(fields))
            .await?;
        Ok(setting.string_values())
    }

    // -----------------------------------------------------------------------
    // Streams & Schema
    // -----------------------------------------------------------------------

    /// GET /api/schema/_streams - All data streams with their fields.
    pub async fn get_streams(&self) -> Result<Vec<DataStream>, LyticsError> {
        debug!("api.get_streams");
        let url = self.endpoint(&["api", "schema", "_streams"])?;
        self.fetch_list(Call::get(url)).await
    }

    /// GET /api/schema/{table} - Schema of a table.
    pub async fn get_table_schema(&self, table: &str) -> Result<Option<TableSchema>, LyticsError> {
        debug!("api.get_table_schema table={}", table);
        require_text("table name", table)?;
        let url = self.endpoint(&["api", "schema", table])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    /// GET /api/schema/{table}/fieldinfo - Term frequencies for fields.
    pub async fn get_field_info(
        &self,
        table: &str,
        fields: &[&str],
        limit: Option<u32>,
    ) -> Result<Vec<FieldInfo>, LyticsError> {
        let limit = limit.unwrap_or(DEFAULT_FIELD_INFO_LIMIT);
        debug!(
            "api.get_field_info table={} fields={:?} limit={}",
            table, fields, limit
        );
        require_text("table name", table)?;
        require_items("fields", fields)?;
        if let Some(blank) = fields.iter().position(|f| f.trim().is_empty()) {
            return Err(LyticsError::invalid_argument(format!(
                "field {blank} is blank"
            )));
        }
        let joined = fields.join(",");
        let limit = limit.to_string();
        let url = with_query(
            self.endpoint(&["api", "schema", table, "fieldinfo"])?,
            &[("fields", joined.as_str()), ("limit", limit.as_str())],
        );
        self.fetch_list(
            Call::get(url)
                .extract(field_list)
                .absent_on([StatusCode::NOT_FOUND]),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// GET /api/query - All queries of the account.
    pub async fn get_queries(&self) -> Result<Vec<Query>, LyticsError> {
        debug!("api.get_queries");
        let url = self.endpoint(&["api", "query"])?;
        self.fetch_list(Call::get(url)).await
    }

    /// GET /api/query/{alias} - One query by alias.
    pub async fn get_query(&self, alias: &str) -> Result<Option<Query>, LyticsError> {
        debug!("api.get_query alias={}", alias);
        require_text("query alias", alias)?;
        let url = self.endpoint(&["api", "query", alias])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    /// POST /api/query - Create or replace the queries defined in `lql`.
    pub async fn upsert_query(&self, lql: &str) -> Result<Vec<Query>, LyticsError> {
        debug!("api.upsert_query lql_len={}", lql.len());
        require_text("LQL", lql)?;
        let url = self.endpoint(&["api", "query"])?;
        self.fetch_list(Call::post(url).text(lql).extract(as_list))
            .await
    }

    /// DELETE /api/query/{alias} - `false` if no such query.
    pub async fn delete_query(&self, alias: &str) -> Result<bool, LyticsError> {
        debug!("api.delete_query alias={}", alias);
        require_text("query alias", alias)?;
        let url = self.endpoint(&["api", "query", alias])?;
        self.delete_call(url).await
    }

    /// POST /api/query/_validate - `false` when the server rejects the LQL (400).
    pub async fn validate_query(&self, lql: &str) -> Result<bool, LyticsError> {
        debug!("api.validate_query lql_len={}", lql.len());
        require_text("LQL", lql)?;
        let url = self.endpoint(&["api", "query", "_validate"])?;
        let reply = self
            .dispatch(Call::post(url).text(lql).absent_on([StatusCode::BAD_REQUEST]))
            .await?;
        Ok(!reply.is_absent())
    }

    /// POST /api/query/_test - Evaluate `lql` against one record.
    pub async fn test_query(&self, lql: &str, record: &Record) -> Result<Option<Value>, LyticsError> {
        debug!(
            "api.test_query lql_len={} record_fields={}",
            lql.len(),
            record.len()
        );
        require_text("LQL", lql)?;
        let url = record_query(self.endpoint(&["api", "query", "_test"])?, record);
        self.fetch(Call::post(url).text(lql)).await
    }

    /// POST /api/query/_csvtolql - Generate LQL from sample CSV data.
    pub async fn generate_lql_from_csv(&self, stream: &str, csv: &str) -> Result<String, LyticsError> {
        debug!(
            "api.generate_lql_from_csv stream={} csv_len={}",
            stream,
            csv.len()
        );
        require_text("stream name", stream)?;
        require_text("CSV data", csv)?;
        let url = with_query(
            self.endpoint(&["api", "query", "_csvtolql"])?,
            &[("stream", stream)],
        );
        let call = Call::post(url).text(csv).content_type(ContentType::Csv);
        self.fetch_required(call, "generate_lql_from_csv").await
    }

    // -----------------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------------

    /// GET /api/entity/{table}/{field}/{value} - Look up an entity by a key.
    pub async fn get_entity(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Entity>, LyticsError> {
        debug!(
            "api.get_entity table={} field={} value={}",
            table, field, value
        );
        require_text("table name", table)?;
        require_text("field name", field)?;
        require_text("field value", value)?;
        let url = self.endpoint(&["api", "entity", table, field, value])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    /// GET /api/entity/{table}/{field}/{value}/fragments - Fragments of an entity.
    pub async fn get_entity_fragments(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Fragment>, LyticsError> {
        debug!(
            "api.get_entity_fragments table={} field={} value={}",
            table, field, value
        );
        require_text("table name", table)?;
        require_text("field name", field)?;
        require_text("field value", value)?;
        let url = self.endpoint(&["api", "entity", table, field, value, "fragments"])?;
        self.fetch_list(
            Call::get(url)
                .extract(fragment_list)
                .absent_on([StatusCode::NOT_FOUND]),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Collection
    // -----------------------------------------------------------------------

    /// POST /collect/json/{stream} - Send one record to a stream.
    pub async fn collect(
        &self,
        stream: &str,
        record: &Record,
        dryrun: bool,
    ) -> Result<CollectResponse, LyticsError> {
        debug!(
            "api.collect stream={} fields={} dryrun={}",
            stream,
            record.len(),
            dryrun
        );
        require_text("stream name", stream)?;
        let mut url = self.endpoint(&["collect", "json", stream])?;
        if dryrun {
            url = with_query(url, &[("dryrun", "true")]);
        }
        let call = Call::post(url).json(record)?;
        Ok(self.fetch(call).await?.unwrap_or_default())
    }

    /// POST /collect/json/{stream} - Send a batch of records to a stream.
    pub async fn upload(&self, stream: &str, records: &[Record]) -> Result<CollectResponse, LyticsError> {
        debug!("api.upload stream={} records={}", stream, records.len());
        require_text("stream name", stream)?;
        require_items("records", records)?;
        let url = self.endpoint(&["collect", "json", stream])?;
        let call = Call::post(url).json(records)?;
        Ok(self.fetch(call).await?.unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Campaigns
    // -----------------------------------------------------------------------

    /// GET /api/program/campaign - All campaigns.
    pub async fn get_campaigns(&self) -> Result<Vec<Campaign>, LyticsError> {
        debug!("api.get_campaigns");
        let url = self.endpoint(&["api", "program", "campaign"])?;
        self.fetch_list(Call::get(url)).await
    }

    /// GET /api/program/campaign/{id} - One campaign.
    pub async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, LyticsError> {
        debug!("api.get_campaign id={}", id);
        require_text("campaign id", id)?;
        let url = self.endpoint(&["api", "program", "campaign", id])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    /// POST /api/program/campaign - Create a campaign.
    pub async fn create_campaign(&self, campaign: &Campaign) -> Result<Campaign, LyticsError> {
        debug!("api.create_campaign name={:?}", campaign.name);
        require_field("campaign name", campaign.name.as_deref())?;
        let url = self.endpoint(&["api", "program", "campaign"])?;
        let call = Call::post(url).json(campaign)?;
        self.fetch_required(call, "create_campaign").await
    }

    /// PUT /api/program/campaign/{id} - Update a campaign.
    pub async fn update_campaign(&self, campaign: &Campaign) -> Result<Campaign, LyticsError> {
        debug!("api.update_campaign id={:?}", campaign.id);
        let id = require_field("campaign id", campaign.id.as_deref())?;
        let url = self.endpoint(&["api", "program", "campaign", id])?;
        let call = Call::put(url).json(campaign)?;
        self.fetch_required(call, "update_campaign").await
    }

    /// GET /api/program/campaign/variation - All variations of all campaigns.
    pub async fn get_campaign_variations(&self) -> Result<Vec<CampaignVariation>, LyticsError> {
        debug!("api.get_campaign_variations");
        let url = self.endpoint(&["api", "program", "campaign", "variation"])?;
        self.fetch_list(Call::get(url)).await
    }

    /// POST /api/program/campaign/variation - Create a variation.
    pub async fn create_campaign_variation(
        &self,
        variation: &CampaignVariation,
    ) -> Result<CampaignVariation, LyticsError> {
        debug!(
            "api.create_campaign_variation campaign_id={:?}",
            variation.campaign_id
        );
        require_field("campaign id", variation.campaign_id.as_deref())?;
        let url = self.endpoint(&["api", "program", "campaign", "variation"])?;
        let call = Call::post(url).json(variation)?;
        self.fetch_required(call, "create_campaign_variation").await
    }

    /// PUT /api/program/campaign/variation/{id} - Update a variation.
    pub async fn update_campaign_variation(
        &self,
        variation: &CampaignVariation,
    ) -> Result<CampaignVariation, LyticsError> {
        debug!("api.update_campaign_variation id={:?}", variation.id);
        let id = require_field("variation id", variation.id.as_deref())?;
        let url = self.endpoint(&["api", "program", "campaign", "variation", id])?;
        let call = Call::put(url).json(variation)?;
        self.fetch_required(call, "update_campaign_variation").await
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// POST /api/content/classify - Classify a block of text.
    pub async fn classify_text(&self, text: &str) -> Result<Classification, LyticsError> {
        debug!("api.classify_text text_len={}", text.len());
        require_text("text", text)?;
        let url = self.endpoint(&["api", "content", "classify"])?;
        let call = Call::post(url).json(&json!({ "text": text }))?;
        self.fetch_required(call, "classify_text").await
    }

    /// POST /api/content/classify?url= - Classify the document at a URL.
    pub async fn classify_url(&self, document_url: &str) -> Result<Classification, LyticsError> {
        debug!("api.classify_url url={}", document_url);
        require_text("url", document_url)?;
        let url = with_query(
            self.endpoint(&["api", "content", "classify"])?,
            &[("url", document_url)],
        );
        self.fetch_required(Call::post(url), "classify_url").await
    }

    /// GET /api/content/doc?urls= - Topics of a known document.
    pub async fn get_document_topics(&self, document_url: &str) -> Result<Option<Document>, LyticsError> {
        debug!("api.get_document_topics url={}", document_url);
        require_text("url", document_url)?;
        let url = with_query(
            self.endpoint(&["api", "content", "doc"])?,
            &[("urls", document_url)],
        );
        self.fetch(
            Call::get(url)
                .extract(first_item)
                .absent_on([StatusCode::NOT_FOUND]),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// GET /api/subscription - All subscriptions.
    pub async fn get_subscriptions(&self) -> Result<Vec<Subscription>, LyticsError> {
        debug!("api.get_subscriptions");
        let url = self.endpoint(&["api", "subscription"])?;
        self.fetch_list(Call::get(url)).await
    }

    /// GET /api/subscription/{id} - One subscription.
    pub async fn get_subscription(&self, id: &str) -> Result<Option<Subscription>, LyticsError> {
        debug!("api.get_subscription id={}", id);
        require_text("subscription id", id)?;
        let url = self.endpoint(&["api", "subscription", id])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    /// POST /api/subscription - Create a subscription.
    pub async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Subscription, LyticsError> {
        debug!(
            "api.create_subscription name={} channel={} segments={}",
            request.name,
            request.channel,
            request.segment_ids.len()
        );
        require_text("subscription name", &request.name)?;
        require_text("subscription channel", &request.channel)?;
        require_items("segment ids", &request.segment_ids)?;
        let url = self.endpoint(&["api", "subscription"])?;
        let call = Call::post(url).json(request)?;
        self.fetch_required(call, "create_subscription").await
    }

    /// POST /api/subscription - Create a webhook subscription.
    pub async fn create_webhook_subscription(
        &self,
        request: WebhookSubscriptionRequest,
    ) -> Result<Subscription, LyticsError> {
        debug!("api.create_webhook_subscription url={}", request.url);
        require_text("webhook url", &request.url)?;
        self.create_subscription(&request.into()).await
    }

    /// DELETE /api/subscription/{id} - `false` if no such subscription.
    pub async fn delete_subscription(&self, id: &str) -> Result<bool, LyticsError> {
        debug!("api.delete_subscription id={}", id);
        require_text("subscription id", id)?;
        let url = self.endpoint(&["api", "subscription", id])?;
        self.delete_call(url).await
    }

    // -----------------------------------------------------------------------
    // Access tokens
    // -----------------------------------------------------------------------

    /// POST /api/apikey - Create an access token.
    pub async fn create_access_token(
        &self,
        request: &AccessTokenRequest,
    ) -> Result<AccessToken, LyticsError> {
        debug!(
            "api.create_access_token name={} scopes={:?} expires={:?}",
            request.name, request.scopes, request.expires
        );
        require_text("token name", &request.name)?;
        require_items("scopes", &request.scopes)?;
        let url = self.endpoint(&["api", "apikey"])?;
        let call = Call::post(url).json(request)?;
        self.fetch_required(call, "create_access_token").await
    }

    /// GET /api/apikey/{id} - One access token.
    pub async fn get_access_token(&self, id: &str) -> Result<Option<AccessToken>, LyticsError> {
        debug!("api.get_access_token id={}", id);
        require_text("token id", id)?;
        let url = self.endpoint(&["api", "apikey", id])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    /// DELETE /api/apikey/{id} - `false` if no such token.
    pub async fn delete_access_token(&self, id: &str) -> Result<bool, LyticsError> {
        debug!("api.delete_access_token id={}", id);
        require_text("token id", id)?;
        let url = self.endpoint(&["api", "apikey", id])?;
        self.delete_call(url).await
    }

    // -----------------------------------------------------------------------
    // Segments
    // -----------------------------------------------------------------------

    /// GET /api/segment - Segments, optionally restricted to one table.
    pub async fn get_segments(&self, table: Option<&str>) -> Result<Vec<Segment>, LyticsError> {
        debug!("api.get_segments table={:?}", table);
        let mut url = self.endpoint(&["api", "segment"])?;
        if let Some(table) = table {
            require_text("table name", table)?;
            url = with_query(url, &[("table", table)]);
        }
        self.fetch_list(Call::get(url)).await
    }

    /// GET /api/segment/{id} - One segment by id or slug.
    pub async fn get_segment(&self, id: &str) -> Result<Option<Segment>, LyticsError> {
        debug!("api.get_segment id={}", id);
        require_text("segment id", id)?;
        let url = self.endpoint(&["api", "segment", id])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    /// GET /api/segmentml - All segment ML models.
    pub async fn get_segment_ml_models(&self) -> Result<Vec<SegmentMlModel>, LyticsError> {
        debug!("api.get_segment_ml_models");
        let url = self.endpoint(&["api", "segmentml"])?;
        self.fetch_list(Call::get(url).extract(values_as_list)).await
    }

    /// GET /api/segmentml/{name} - One segment ML model.
    pub async fn get_segment_ml_model(&self, name: &str) -> Result<Option<SegmentMlModel>, LyticsError> {
        debug!("api.get_segment_ml_model name={}", name);
        require_text("model name", name)?;
        let url = self.endpoint(&["api", "segmentml", name])?;
        self.fetch(Call::get(url).absent_on([StatusCode::NOT_FOUND]))
            .await
    }

    /// POST /api/segmentml - Train a model from a source and a target segment.
    pub async fn create_segment_ml_model(
        &self,
        request: &SegmentMlModelRequest,
    ) -> Result<SegmentMlModel, LyticsError> {
        debug!(
            "api.create_segment_ml_model name={} source={} target={}",
            request.name, request.source, request.target
        );
        require_text("model name", &request.name)?;
        require_text("source segment", &request.source)?;
        require_text("target segment", &request.target)?;
        let url = self.endpoint(&["api", "segmentml"])?;
        let call = Call::post(url).json(request)?;
        self.fetch_required(call, "create_segment_ml_model").await
    }

    /// DELETE /api/segmentml/{name} - `false` if no such model.
    pub async fn delete_segment_ml_model(&self, name: &str) -> Result<bool, LyticsError> {
        debug!("api.delete_segment_ml_model name={}", name);
        require_text("model name", name)?;
        let url = self.endpoint(&["api", "segmentml", name])?;
        self.delete_call(url).await
    }
}
