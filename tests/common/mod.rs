#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceExt;

use rest_base::api::not_found_fallback;
use rest_base::auth::JwtError;
use rest_base::prelude::*;

/// Tokens known to the test token service: token -> (identity, expired)
pub struct StaticTokens(pub HashMap<&'static str, (&'static str, bool)>);

impl TokenService for StaticTokens {
    fn resolve_identity(&self, token: &str) -> Result<String, JwtError> {
        self.0
            .get(token)
            .map(|(identity, _)| identity.to_string())
            .ok_or_else(|| JwtError::InvalidToken("unknown token".to_string()))
    }

    fn is_expired(&self, token: &str) -> bool {
        self.0.get(token).map(|(_, expired)| *expired).unwrap_or(true)
    }
}

pub struct StaticPrincipals;

#[async_trait]
impl PrincipalLoader for StaticPrincipals {
    async fn load_principal(&self, identity: &str) -> Result<Principal, ApiError> {
        match identity {
            "alice" | "bob" => Ok(Principal::new(identity, vec!["ROLE_USER".to_string()])),
            other => Err(ApiError::unauthorized(format!("User '{}' not found", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widget {
    #[serde(flatten)]
    pub record: AuditableRecord<String>,
    pub name: String,
    pub price: u32,
}

#[derive(Debug, Serialize)]
pub struct WidgetName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WidgetBody {
    pub name: Option<String>,
    pub price: Option<u32>,
}

/// In-memory resource implementing all five capabilities; ids are sequential
#[derive(Default)]
pub struct WidgetService {
    next_id: AtomicU64,
    widgets: Mutex<BTreeMap<u64, Widget>>,
}

impl WidgetService {
    fn lookup(&self, id: u64) -> ApiResult<Widget> {
        self.widgets
            .lock()
            .map_err(|_| ApiError::unexpected("widget store poisoned"))?
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::validation(format!("Widget {} not found", id)))
    }
}

impl Resource for WidgetService {
    type Id = u64;
    type Body = WidgetBody;
}

#[async_trait]
impl CreateService for WidgetService {
    type Created = ServerResponse;

    fn validate_create(&self, body: &WidgetBody) -> ApiResult<()> {
        if body.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(self.required("name"));
        }
        if body.price.is_none() {
            return Err(self.required("price"));
        }
        Ok(())
    }

    async fn create(&self, ctx: &RequestContext, body: WidgetBody) -> ApiResult<ServerResponse> {
        let author = ctx.principal()?.subject.clone();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let widget = Widget {
            record: AuditableRecord::new(author).with_id(id.to_string())?,
            name: body.name.unwrap_or_default(),
            price: body.price.unwrap_or_default(),
        };

        self.widgets
            .lock()
            .map_err(|_| ApiError::unexpected("widget store poisoned"))?
            .insert(id, widget);
        Ok(ServerResponse::created(format!("Widget {} created", id)))
    }
}

#[async_trait]
impl FindService for WidgetService {
    type Record = Widget;
    type Projection = WidgetName;

    async fn find_by_id(&self, _ctx: &RequestContext, id: u64) -> ApiResult<Widget> {
        self.lookup(id)
    }

    async fn find_projection(&self, _ctx: &RequestContext, id: u64) -> ApiResult<WidgetName> {
        self.lookup(id).map(|w| WidgetName { name: w.name })
    }
}

#[async_trait]
impl FindAllService for WidgetService {
    type Item = Widget;

    async fn find_all(&self, _ctx: &RequestContext) -> ApiResult<Vec<Widget>> {
        let widgets = self
            .widgets
            .lock()
            .map_err(|_| ApiError::unexpected("widget store poisoned"))?;
        Ok(widgets.values().cloned().collect())
    }

    async fn find_page(&self, ctx: &RequestContext, request: PageRequest) -> ApiResult<Page<Widget>> {
        let all = self.find_all(ctx).await?;
        Ok(Page::from_items(all, request))
    }
}

#[async_trait]
impl UpdateService for WidgetService {
    type Updated = Json<Widget>;

    async fn update(&self, ctx: &RequestContext, id: u64, body: WidgetBody) -> ApiResult<Json<Widget>> {
        let editor = ctx.principal()?.subject.clone();
        let mut widgets = self
            .widgets
            .lock()
            .map_err(|_| ApiError::unexpected("widget store poisoned"))?;
        let current = widgets
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::validation(format!("Widget {} not found", id)))?;

        let updated = Widget {
            record: current.record.touched_by(editor),
            name: body.name.unwrap_or(current.name),
            price: body.price.unwrap_or(current.price),
        };
        widgets.insert(id, updated.clone());
        Ok(Json(updated))
    }
}

#[async_trait]
impl DeleteService for WidgetService {
    type Deleted = ServerResponse;

    async fn delete_by_id(&self, ctx: &RequestContext, id: u64) -> ApiResult<ServerResponse> {
        ctx.principal()?;
        let removed = self
            .widgets
            .lock()
            .map_err(|_| ApiError::unexpected("widget store poisoned"))?
            .remove(&id);
        match removed {
            Some(_) => Ok(ServerResponse::ok(format!("Widget {} deleted", id))),
            None => Err(ApiError::validation(format!("Widget {} not found", id))),
        }
    }
}

/// Read-only resource: only lookups are mounted
pub struct Catalog;

impl Resource for Catalog {
    type Id = u64;
    type Body = Value;
}

#[async_trait]
impl FindService for Catalog {
    type Record = Value;
    type Projection = Value;

    async fn find_by_id(&self, _ctx: &RequestContext, id: u64) -> ApiResult<Value> {
        Ok(serde_json::json!({ "id": id }))
    }

    async fn find_projection(&self, _ctx: &RequestContext, id: u64) -> ApiResult<Value> {
        Err(ApiError::exception(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("projection store unavailable for {}", id),
        )))
    }
}

async fn whoami(Authenticated(principal): Authenticated) -> ServerResponse {
    ServerResponse::ok(principal.subject)
}

pub fn app() -> Router {
    let tokens = StaticTokens(HashMap::from([
        ("abc123", ("alice", false)),
        ("bobtoken", ("bob", false)),
        ("expiredtok", ("alice", true)),
        ("ghosttoken", ("ghost", false)),
    ]));
    let gate = AuthGate::new(Arc::new(tokens), Arc::new(StaticPrincipals));

    Router::new()
        .route("/whoami", get(whoami))
        .nest("/api/widgets", ResourceRouter::new(WidgetService::default()).crud().build())
        .nest("/api/catalog", ResourceRouter::new(Catalog).find().build())
        .fallback(not_found_fallback)
        .layer(from_fn_with_state(gate, authentication_gate))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Result<TestResponse> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await.context("router failed")?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).context("response body is not JSON")?
    };

    Ok(TestResponse { status, body })
}

/// Every envelope carries exactly the four standard keys and agrees with the HTTP status
pub fn assert_envelope(response: &TestResponse, success: bool) {
    let object = response.body.as_object().expect("envelope should be a JSON object");
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["message", "status", "status_code", "time_stamp"]);
    assert_eq!(response.body["status_code"], response.status.as_u16());
    assert_eq!(response.body["status"], success);
    let stamp = response.body["time_stamp"].as_str().unwrap_or_default();
    assert!(
        chrono::DateTime::parse_from_rfc3339(stamp).is_ok(),
        "bad time_stamp: {}",
        stamp
    );
}
