/// Tests for argument validation and the workflow client, using an in-memory
/// transport that records every request.
use std::sync::Mutex;

use lytics_sdk::api::LyticsApi;
use lytics_sdk::client::function_test_lql;
use lytics_sdk::*;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

#[derive(Default)]
struct MockTransport {
    routes: Vec<(Method, String, u16, String)>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    fn route(mut self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.routes
            .push((method, path.to_string(), status, body.to_string()));
        self
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, LyticsError> {
        let response = self
            .routes
            .iter()
            .find(|(m, p, _, _)| *m == request.method && p == request.url.path())
            .map(|(_, _, status, body)| {
                RawResponse::new(StatusCode::from_u16(*status).unwrap(), body.clone())
            })
            .unwrap_or_else(|| RawResponse::new(StatusCode::NOT_FOUND, ""));
        self.requests.lock().unwrap().push(request);
        Ok(response)
    }
}

fn success(data: Value) -> Value {
    json!({"status": 200, "message": "success", "data": data})
}

fn client_with(transport: MockTransport) -> LyticsClient<MockTransport> {
    LyticsClient::with_api(LyticsApi::with_transport(
        LyticsConfig::new("key"),
        transport,
    ))
}

// ── Validation ──────────────────────────────────────────────────

#[tokio::test]
async fn test_blank_table_is_rejected_without_a_request() {
    let client = client_with(MockTransport::default());
    let err = client.api.get_table_schema("  ").await.unwrap_err();
    assert!(matches!(err, LyticsError::InvalidArgument(_)));
    assert_eq!(client.api.transport().calls(), 0);
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_the_transport() {
    let client = client_with(MockTransport::default());
    let api = &client.api;

    assert!(api.get_account(0).await.is_err());
    assert!(api.get_query("").await.is_err());
    assert!(api.get_field_info("user", &[], None).await.is_err());
    assert!(api.get_field_info("user", &["city", " "], None).await.is_err());
    assert!(api.upsert_query("\n").await.is_err());
    assert!(api.get_entity("user", "email", "").await.is_err());
    assert!(api.upload("web", &[]).await.is_err());
    assert!(api.collect("", &Record::new(), false).await.is_err());
    assert!(api.create_campaign(&Campaign::default()).await.is_err());
    assert!(api.update_campaign(&Campaign::default()).await.is_err());
    assert!(api
        .create_access_token(&AccessTokenRequest {
            name: "t".into(),
            expires: None,
            scopes: vec![],
        })
        .await
        .is_err());
    assert!(api
        .create_subscription(&SubscriptionRequest {
            name: "s".into(),
            channel: "webhook".into(),
            segment_ids: vec![],
            user_fields: vec![],
            webhook_url: None,
            config: None,
        })
        .await
        .is_err());
    assert!(api
        .create_webhook_subscription(WebhookSubscriptionRequest {
            name: "s".into(),
            url: " ".into(),
            segment_ids: vec!["seg".into()],
            user_fields: vec![],
        })
        .await
        .is_err());
    assert!(client.test_function("", &[]).await.is_err());
    assert!(client.test_function("bad name(", &[]).await.is_err());
    assert!(client.set_whitelist_field_status(1, "", true).await.is_err());

    assert_eq!(api.transport().calls(), 0);
}

// ── Streams ─────────────────────────────────────────────────────

fn streams_transport() -> MockTransport {
    MockTransport::default().route(
        Method::GET,
        "/api/schema/_streams",
        200,
        success(json!([
            {"stream": "web", "fields": [{"name": "email", "type": "string", "card": 12}]},
            {"stream": "email", "fields": []}
        ])),
    )
}

#[tokio::test]
async fn test_get_stream_field() {
    let client = client_with(streams_transport());
    let field = client.get_stream_field("web", "email").await.unwrap().unwrap();
    assert_eq!(field.field_type.as_deref(), Some("string"));
    assert_eq!(field.card, 12);
}

#[tokio::test]
async fn test_missing_stream_field_is_none() {
    let client = client_with(streams_transport());
    assert!(client.get_stream_field("web", "phone").await.unwrap().is_none());
    assert!(client.get_stream_field("mobile", "email").await.unwrap().is_none());
}

// ── Grouping ────────────────────────────────────────────────────

#[tokio::test]
async fn test_queries_grouped_by_table() {
    let client = client_with(MockTransport::default().route(
        Method::GET,
        "/api/query",
        200,
        success(json!([
            {"alias": "a", "table": "user"},
            {"alias": "b", "table": "user"},
            {"alias": "c", "table": "content"},
            {"alias": "d"}
        ])),
    ));
    let grouped = client.get_queries_grouped_by_table().await.unwrap();
    assert_eq!(grouped["user"].len(), 2);
    assert_eq!(grouped["content"].len(), 1);
    assert_eq!(grouped[""][0].alias.as_deref(), Some("d"));
}

#[tokio::test]
async fn test_segments_by_kind() {
    let client = client_with(MockTransport::default().route(
        Method::GET,
        "/api/segment",
        200,
        success(json!([
            {"id": "1", "kind": "segment"},
            {"id": "2", "kind": "aspect"},
            {"id": "3", "kind": "segment"},
            {"id": "4"}
        ])),
    ));
    let segments = client.get_segments_by_kind(Some("user")).await.unwrap();
    assert_eq!(segments.audience.len(), 2);
    assert_eq!(segments.characteristic.len(), 1);
    assert_eq!(segments.unidentified.len(), 1);
    assert_eq!(segments.len(), 4);

    let requests = client.api.transport().requests();
    assert_eq!(requests[0].url.query(), Some("table=user"));
}

#[tokio::test]
async fn test_campaign_variations() {
    let client = client_with(MockTransport::default().route(
        Method::GET,
        "/api/program/campaign/variation",
        200,
        success(json!([
            {"id": "v2", "campaign_id": "c1", "variation": 1},
            {"id": "v1", "campaign_id": "c1", "variation": 0},
            {"id": "v3", "campaign_id": "c2", "variation": 0}
        ])),
    ));
    let grouped = client.get_campaign_variations_by_campaign().await.unwrap();
    let c1: Vec<_> = grouped["c1"].iter().map(|v| v.id.as_deref()).collect();
    assert_eq!(c1, vec![Some("v1"), Some("v2")]);

    let v3 = client.get_campaign_variation("v3").await.unwrap().unwrap();
    assert_eq!(v3.campaign_id.as_deref(), Some("c2"));
    assert!(client.get_campaign_variation("v9").await.unwrap().is_none());
}

#[tokio::test]
async fn test_webhook_subscriptions() {
    let client = client_with(MockTransport::default().route(
        Method::GET,
        "/api/subscription",
        200,
        success(json!([
            {"id": "s1", "channel": "webhook", "webhook_url": "https://example.com/hook"},
            {"id": "s2", "channel": "email"}
        ])),
    ));
    let hooks = client.get_webhook_subscriptions().await.unwrap();
    assert_eq!(hooks.len(), 1);
    assert_eq!(hooks[0].id.as_deref(), Some("s1"));
}

#[tokio::test]
async fn test_webhook_subscription_request_body() {
    let client = client_with(MockTransport::default().route(
        Method::POST,
        "/api/subscription",
        200,
        success(json!({"id": "s1", "channel": "webhook"})),
    ));
    let subscription = client
        .api
        .create_webhook_subscription(WebhookSubscriptionRequest {
            name: "hook".into(),
            url: "https://example.com/hook".into(),
            segment_ids: vec!["seg1".into()],
            user_fields: vec![],
        })
        .await
        .unwrap();
    assert!(subscription.is_webhook());

    let body: Value =
        serde_json::from_str(client.api.transport().requests()[0].body.as_deref().unwrap())
            .unwrap();
    assert_eq!(body["channel"], "webhook");
    assert_eq!(body["webhook_url"], "https://example.com/hook");
    assert!(body.get("user_fields").is_none());
}

// ── Whitelist ───────────────────────────────────────────────────

fn whitelist_transport(current: Value) -> MockTransport {
    MockTransport::default()
        .route(
            Method::GET,
            "/api/account/5/setting/api_whitelist_fields",
            200,
            success(json!({"slug": "api_whitelist_fields", "value": current})),
        )
        .route(
            Method::POST,
            "/api/account/5/setting/api_whitelist_fields",
            200,
            success(json!({"slug": "api_whitelist_fields", "value": []})),
        )
}

#[tokio::test]
async fn test_whitelist_no_write_when_unchanged() {
    let client = client_with(whitelist_transport(json!(["email"])));
    assert!(!client.set_whitelist_field_status(5, "email", true).await.unwrap());
    assert!(!client.set_whitelist_field_status(5, "city", false).await.unwrap());

    let requests = client.api.transport().requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.method == Method::GET));
}

#[tokio::test]
async fn test_whitelist_add_and_remove() {
    let client = client_with(whitelist_transport(json!(["email", "city"])));
    assert!(client.set_whitelist_field_status(5, "phone", true).await.unwrap());
    assert!(client.set_whitelist_field_status(5, "email", false).await.unwrap());

    let posted: Vec<Value> = client
        .api
        .transport()
        .requests()
        .iter()
        .filter(|r| r.method == Method::POST)
        .map(|r| serde_json::from_str(r.body.as_deref().unwrap()).unwrap())
        .collect();
    assert_eq!(posted[0], json!({"value": ["email", "city", "phone"]}));
    assert_eq!(posted[1], json!({"value": ["city"]}));
}

// ── LQL functions ───────────────────────────────────────────────

#[test]
fn test_function_lql_composition() {
    assert_eq!(
        function_test_lql("todate", &["2024-01-01", "2006-01-02"]),
        r#"SELECT todate("2024-01-01", "2006-01-02") AS value FROM _test INTO _test BY value ALIAS _test"#
    );
    assert_eq!(
        function_test_lql("now", &[]),
        "SELECT now() AS value FROM _test INTO _test BY value ALIAS _test"
    );
    assert_eq!(
        function_test_lql("len", &[r#"say "hi" \ bye"#]),
        r#"SELECT len("say \"hi\" \\ bye") AS value FROM _test INTO _test BY value ALIAS _test"#
    );
}

#[tokio::test]
async fn test_function_returns_value_field() {
    let client = client_with(MockTransport::default().route(
        Method::POST,
        "/api/query/_test",
        200,
        success(json!({"value": "3"})),
    ));
    let value = client.test_function("len", &["abc"]).await.unwrap();
    assert_eq!(value, Some(json!("3")));

    let request = &client.api.transport().requests()[0];
    assert_eq!(request.url.query(), None);
    assert_eq!(
        request.body.as_deref(),
        Some(r#"SELECT len("abc") AS value FROM _test INTO _test BY value ALIAS _test"#)
    );
}

#[tokio::test]
async fn test_function_without_value() {
    let client = client_with(MockTransport::default().route(
        Method::POST,
        "/api/query/_test",
        200,
        success(json!({})),
    ));
    assert_eq!(client.test_function("len", &[]).await.unwrap(), None);
}

// ── Fragments and identifiers ───────────────────────────────────

#[tokio::test]
async fn test_entity_fragment_graph() {
    let client = client_with(MockTransport::default().route(
        Method::GET,
        "/api/entity/user/email/a@b.c/fragments",
        200,
        success(json!({"fragments": [
            {"keys": [{"key": "email", "value": "a@b.c"}],
             "neighbors": [{"key": "user_id", "value": "42"}]},
            {"keys": [{"key": "user_id", "value": "42"}]}
        ]})),
    ));
    let graph = client
        .get_entity_fragment_graph("user", "email", "a@b.c")
        .await
        .unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
}

#[tokio::test]
async fn test_missing_entity_has_no_fragments() {
    let client = client_with(MockTransport::default());
    let fragments = client
        .api
        .get_entity_fragments("user", "email", "nobody")
        .await
        .unwrap();
    assert!(fragments.is_empty());
}

#[test]
fn test_verify_identifier() {
    let client = client_with(MockTransport::default());
    assert!(client.verify_identifier("test", -8890464022492218970));
    assert!(!client.verify_identifier("test", 0));
}
