//! Typed REST transport for the payroll backend.
//!
//! # Design
//! `PayrollClient` holds only immutable configuration: the base url, the
//! default header set and a shared `HttpTransport`. Each operation is split
//! into a `build_*` step that produces an `HttpRequest` and a `parse_*` step
//! that consumes an `HttpResponse`; the async methods compose the two around
//! one transport round-trip. Calls never coordinate with each other, so one
//! client may serve any number of concurrent callers.
//!
//! Response conventions:
//! - any 2xx is success, everything else is `ApiError::Http`;
//! - an empty body on a read is "no content" (`None`, empty list, zero);
//! - an empty or `null` body on a create is `ApiError::EmptyCreateResponse`;
//! - a created record id travels in the last segment of `Location`;
//! - a 404 on an attribute read means the attribute is absent.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{require_id, require_text, ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::model::{Resource, UpdateMode};
use crate::paths;
use crate::query::{self, Query, QueryResult, QueryResultType};

pub const VERSION_HEADER: &str = "X-Version";
pub const API_KEY_HEADER: &str = "Api-Key";
pub const TENANT_HEADER: &str = "Auth-Tenant";
const JSON: &str = "application/json";

/// Asynchronous client for one payroll backend endpoint.
#[derive(Clone)]
pub struct PayrollClient {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for PayrollClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("PayrollClient")
            .field("base_url", &self.base_url)
            .field("headers", &header_names)
            .finish_non_exhaustive()
    }
}

impl PayrollClient {
    /// Client with the production `reqwest` transport.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let mut headers = vec![("Accept".to_string(), JSON.to_string())];
        if let Some(version) = config.api_version {
            headers.push((VERSION_HEADER.to_string(), version.to_string()));
        }
        if let Some(key) = &config.api_key {
            headers.push((API_KEY_HEADER.to_string(), key.clone()));
        }
        if let Some(tenant) = &config.tenant {
            headers.push((TENANT_HEADER.to_string(), tenant.clone()));
        }
        Self {
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            headers,
            transport,
        }
    }

    /// A copy of this client scoped to `tenant_identifier`.
    pub fn with_tenant(&self, tenant_identifier: &str) -> Self {
        let mut client = self.clone();
        client.headers.retain(|(name, _)| name != TENANT_HEADER);
        client
            .headers
            .push((TENANT_HEADER.to_string(), tenant_identifier.to_string()));
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ---------------------------------------------------------------------
    // Request building
    // ---------------------------------------------------------------------

    fn build(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = self.headers.clone();
        if body.is_some() {
            headers.push(("Content-Type".to_string(), JSON.to_string()));
        }
        HttpRequest {
            method,
            url: self.url(path),
            headers,
            body,
        }
    }

    pub fn build_get(&self, path: &str) -> HttpRequest {
        self.build(HttpMethod::Get, path, None)
    }

    pub fn build_post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<HttpRequest> {
        Ok(self.build(HttpMethod::Post, path, Some(to_json(body)?)))
    }

    pub fn build_put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<HttpRequest> {
        Ok(self.build(HttpMethod::Put, path, Some(to_json(body)?)))
    }

    pub fn build_delete(&self, path: &str) -> HttpRequest {
        self.build(HttpMethod::Delete, path, None)
    }

    /// POST of a raw JSON attribute value.
    pub fn build_set_attribute(&self, item_path: &str, attribute_name: &str, value: &str) -> HttpRequest {
        self.build(
            HttpMethod::Post,
            &paths::attribute(item_path, attribute_name),
            Some(value.to_string()),
        )
    }

    // ---------------------------------------------------------------------
    // Response parsing
    // ---------------------------------------------------------------------

    pub fn parse_get<T: DeserializeOwned>(response: HttpResponse) -> ApiResult<Option<T>> {
        check_status(&response)?;
        if is_blank(&response.body) {
            return Ok(None);
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    pub fn parse_collection<T: DeserializeOwned>(response: HttpResponse) -> ApiResult<Vec<T>> {
        Ok(Self::parse_get::<Vec<T>>(response)?.unwrap_or_default())
    }

    pub fn parse_count(response: HttpResponse) -> ApiResult<i64> {
        Ok(Self::parse_get::<i64>(response)?.unwrap_or_default())
    }

    pub fn parse_query_result<T: DeserializeOwned>(response: HttpResponse) -> ApiResult<QueryResult<T>> {
        Ok(Self::parse_get::<QueryResult<T>>(response)?.unwrap_or_default())
    }

    /// A create response must carry the created object.
    pub fn parse_created<T: DeserializeOwned>(response: HttpResponse) -> ApiResult<T> {
        check_status(&response)?;
        if is_blank(&response.body) {
            return Err(ApiError::EmptyCreateResponse);
        }
        serde_json::from_str::<Option<T>>(&response.body)?.ok_or(ApiError::EmptyCreateResponse)
    }

    pub fn parse_empty(response: HttpResponse) -> ApiResult<()> {
        check_status(&response)
    }

    /// Raw JSON text of an attribute; `None` when absent.
    pub fn parse_attribute(response: HttpResponse) -> ApiResult<Option<String>> {
        if response.status == 404 {
            return Ok(None);
        }
        check_status(&response)?;
        if is_blank(&response.body) {
            return Ok(None);
        }
        Ok(Some(response.body))
    }

    /// Id from the last path segment of the `Location` header, 0 when absent.
    pub fn record_id(response: &HttpResponse) -> i32 {
        response
            .header("Location")
            .and_then(|location| location.split(['?', '#']).next())
            .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
            .and_then(|segment| segment.parse().ok())
            .unwrap_or(0)
    }

    // ---------------------------------------------------------------------
    // Round-trips
    // ---------------------------------------------------------------------

    pub async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.transport.execute(request).await?;
        debug!(method = method.as_str(), %url, status = response.status, "payroll api call");
        Ok(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<T>> {
        Self::parse_get(self.send(self.build_get(path)).await?)
    }

    pub async fn get_collection<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        Self::parse_collection(self.send(self.build_get(path)).await?)
    }

    pub async fn get_count(&self, path: &str) -> ApiResult<i64> {
        Self::parse_count(self.send(self.build_get(path)).await?)
    }

    pub async fn get_query_result<T: DeserializeOwned>(&self, path: &str) -> ApiResult<QueryResult<T>> {
        Self::parse_query_result(self.send(self.build_get(path)).await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Self::parse_created(self.send(self.build_post(path, body)?).await?)
    }

    /// POST returning the raw response after the status check.
    pub async fn post_raw<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<HttpResponse> {
        let response = self.send(self.build_post(path, body)?).await?;
        check_status(&response)?;
        Ok(response)
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        Self::parse_empty(self.send(self.build_put(path, body)?).await?)
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        Self::parse_empty(self.send(self.build_delete(path)).await?)
    }

    pub async fn delete_by_id(&self, path: &str, id: i32) -> ApiResult<()> {
        require_id("id", id)?;
        self.delete(&paths::item(path, id)).await
    }

    /// Create `new_object` under `path`, or update the record `existing_object` names.
    ///
    /// With an existing record its id is copied onto `new_object`, which is
    /// then PUT to `{path}/{id}` unless its update mode is `NoUpdate`.
    /// Without one, `new_object` is POSTed with id 0 (stamped with
    /// `created_date` if it has no creation date) and receives the id from
    /// the response `Location`; a non-positive id fails the call.
    pub async fn upsert<T>(
        &self,
        path: &str,
        new_object: &mut T,
        existing_object: Option<&T>,
        created_date: Option<DateTime<Utc>>,
    ) -> ApiResult<()>
    where
        T: Resource + Serialize + Send + Sync,
    {
        if let Some(existing) = existing_object {
            new_object.set_id(existing.id());
            if new_object.update_mode() == UpdateMode::NoUpdate {
                debug!(path, id = existing.id(), "upsert skipped, update disabled");
                return Ok(());
            }
            require_id("existing id", existing.id())?;
            return self.put(&paths::item(path, existing.id()), &*new_object).await;
        }

        if new_object.created().is_none() {
            if let Some(created) = created_date {
                new_object.set_created(created);
            }
        }
        new_object.set_id(0);
        let response = self.post_raw(path, &*new_object).await?;
        let id = Self::record_id(&response);
        if id <= 0 {
            return Err(ApiError::RecordNotCreated { path: path.to_string() });
        }
        new_object.set_id(id);
        Ok(())
    }

    pub async fn get_attribute(&self, item_path: &str, attribute_name: &str) -> ApiResult<Option<String>> {
        require_text("attributeName", attribute_name)?;
        let request = self.build_get(&paths::attribute(item_path, attribute_name));
        Self::parse_attribute(self.send(request).await?)
    }

    pub async fn set_attribute(&self, item_path: &str, attribute_name: &str, value: &str) -> ApiResult<()> {
        require_text("attributeName", attribute_name)?;
        let request = self.build_set_attribute(item_path, attribute_name, value);
        Self::parse_empty(self.send(request).await?)
    }

    pub async fn delete_attribute(&self, item_path: &str, attribute_name: &str) -> ApiResult<()> {
        require_text("attributeName", attribute_name)?;
        self.delete(&paths::attribute(item_path, attribute_name)).await
    }

    /// Probe the backend with a tenant count request. Never fails.
    pub async fn is_connection_available(&self) -> bool {
        let mut probe = Query::new();
        probe.result = QueryResultType::Count;
        let request = self.build_get(&query::compose(paths::TENANTS, &probe));
        match self.transport.execute(request).await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                warn!(status = response.status, base_url = %self.base_url, "backend probe rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, base_url = %self.base_url, "backend unreachable");
                false
            }
        }
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> ApiResult<String> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn is_blank(body: &str) -> bool {
    body.trim().is_empty()
}

/// Map a non-2xx status to `ApiError::Http`, preferring the body as message.
fn check_status(response: &HttpResponse) -> ApiResult<()> {
    if response.is_success() {
        return Ok(());
    }
    let message = if is_blank(&response.body) {
        reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string()
    } else {
        response.body.clone()
    };
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Transport that records requests and replays queued responses.
    #[derive(Default)]
    pub struct RecordingTransport {
        requests: Mutex<Vec<HttpRequest>>,
        responses: Mutex<VecDeque<ApiResult<HttpResponse>>>,
    }

    impl RecordingTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn respond(&self, response: HttpResponse) {
            self.responses.lock().unwrap().push_back(Ok(response));
        }

        pub fn fail(&self, error: ApiError) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn execute(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(200, "")))
        }
    }

    pub fn client_with(transport: Arc<RecordingTransport>) -> PayrollClient {
        PayrollClient::with_transport(&ClientConfig::new("http://localhost:5000/"), transport)
    }
}
