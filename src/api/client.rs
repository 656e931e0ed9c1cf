//! Purpose: Blocking HTTP client for the campus-history backend (JSON over POST).
//! Exports: `CampusClient`, `ApiResult`.
//! Role: Builds request bodies, posts them, and hands response values to the decoder.
//! Invariants: Status codes are not validated; any JSON body is decoded.
//! Invariants: Connection failures and unreadable bodies surface as `Transport`.
//! Invariants: Clones share one agent; the client holds no per-request state.
#![allow(clippy::result_large_err)]

use super::config::{ClientConfig, Endpoints};
use crate::core::decode::{Batch, ErrorPolicy, Feed, decode};
use crate::core::error::{Error, ErrorKind};
use crate::core::geo::Coordinate;
use crate::core::memory::{MemoryUpload, upload_outcome};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

pub type ApiResult<T> = Result<T, Error>;

#[derive(Clone)]
pub struct CampusClient {
    inner: Arc<CampusClientInner>,
}

#[derive(Clone)]
struct CampusClientInner {
    base_url: Url,
    endpoints: Endpoints,
    memory_radius: f64,
    geofence_radius: i64,
    policy: ErrorPolicy,
    agent: ureq::Agent,
}

#[derive(Serialize)]
struct ContentRequest<'a> {
    geofences: [&'a str; 1],
}

#[derive(Serialize)]
struct MemoriesRequest {
    lat: f64,
    lng: f64,
    rad: f64,
}

#[derive(Serialize)]
struct GeofencesRequest {
    geofence: GeofenceQuery,
}

#[derive(Serialize)]
struct GeofenceQuery {
    location: Coordinate,
    radius: i64,
}

impl CampusClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Ok(Self {
            inner: Arc::new(CampusClientInner {
                base_url,
                endpoints: config.endpoints,
                memory_radius: config.memory_radius,
                geofence_radius: config.geofence_radius,
                policy: ErrorPolicy::Stop,
                agent,
            }),
        })
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        Arc::make_mut(&mut self.inner).policy = policy;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.inner.policy
    }

    /// Historical text and image entries for one landmark.
    pub fn request_content(&self, geofence: &str) -> ApiResult<Batch> {
        let url = self.endpoint(&self.inner.endpoints.historical_info)?;
        let body = ContentRequest {
            geofences: [geofence],
        };
        let value = self.post_json(&url, &body)?;
        self.decode_feed(value, &Feed::historical(geofence))
    }

    pub fn request_memories(&self, location: Coordinate) -> ApiResult<Batch> {
        let url = self.endpoint(&self.inner.endpoints.memories_info)?;
        let body = MemoriesRequest {
            lat: location.latitude,
            lng: location.longitude,
            rad: self.inner.memory_radius,
        };
        let value = self.post_json(&url, &body)?;
        self.decode_feed(value, &Feed::Memories)
    }

    pub fn request_nearby_geofences(&self, location: Coordinate) -> ApiResult<Batch> {
        let url = self.endpoint(&self.inner.endpoints.geofences)?;
        let body = GeofencesRequest {
            geofence: GeofenceQuery {
                location,
                radius: self.inner.geofence_radius,
            },
        };
        let value = self.post_json(&url, &body)?;
        self.decode_feed(value, &Feed::Geofences)
    }

    pub fn upload_memory(&self, memory: &MemoryUpload) -> ApiResult<()> {
        let url = self.endpoint(&self.inner.endpoints.add_memory)?;
        let value = self.post_json(&url, &memory.request_body())?;
        let outcome = upload_outcome(value.as_ref());
        match &outcome {
            Ok(()) => tracing::info!(title = %memory.title, "memory uploaded"),
            Err(err) => tracing::warn!(%err, "upload failed"),
        }
        outcome
    }

    fn decode_feed(&self, value: Option<Value>, feed: &Feed) -> ApiResult<Batch> {
        let result = decode(value.as_ref(), feed, self.inner.policy);
        match &result {
            Ok(batch) => {
                for issue in &batch.skipped {
                    tracing::warn!(
                        feed = feed.name(),
                        index = issue.index,
                        key = %issue.key,
                        "skipped malformed element"
                    );
                }
                tracing::info!(feed = feed.name(), records = batch.len(), "data retrieved");
            }
            Err(err) => match err.kind() {
                ErrorKind::EmptyResult => {
                    tracing::warn!(feed = feed.name(), "no results were found")
                }
                ErrorKind::Malformed => tracing::warn!(%err, "data returned is malformed"),
                _ => tracing::warn!(%err, "connection to server failed"),
            },
        }
        result
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        build_url(&self.inner.base_url, path)
    }

    /// POST a JSON body; `Ok(None)` means no usable response value.
    fn post_json<T: Serialize>(&self, url: &Url, body: &T) -> ApiResult<Option<Value>> {
        let payload = serde_json::to_string(body).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode request json")
                .with_source(err)
        })?;
        tracing::debug!(url = %url, bytes = payload.len(), "posting request");

        let response = self
            .inner
            .agent
            .post(url.as_str())
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .send_string(&payload);

        let response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                tracing::debug!(url = %url, status = code, "non-success status");
                resp
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::debug!(url = %url, %err, "transport error");
                return Ok(None);
            }
        };
        Ok(read_json_response(response))
    }
}

fn read_json_response(response: ureq::Response) -> Option<Value> {
    match serde_json::from_reader(response.into_reader()) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(%err, "invalid response json");
            None
        }
    }
}

fn normalize_base_url(raw: &str) -> ApiResult<Url> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("base url must use http or https scheme"));
    }
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::Usage).with_message("base url cannot be a base"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, path: &str) -> ApiResult<Url> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("endpoint path is empty"));
    }
    base_url.join(relative).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid endpoint path: {path}"))
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{
        CampusClient, ContentRequest, GeofenceQuery, GeofencesRequest, build_url,
        normalize_base_url,
    };
    use crate::api::ClientConfig;
    use crate::core::decode::ErrorPolicy;
    use crate::core::error::ErrorKind;
    use crate::core::geo::Coordinate;
    use serde_json::json;

    #[test]
    fn normalize_base_url_keeps_path_prefix() {
        let url = normalize_base_url("http://localhost:8080/api?x=1").expect("url");
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
        let root = normalize_base_url("https://campus.example").expect("url");
        assert_eq!(root.as_str(), "https://campus.example/");
    }

    #[test]
    fn normalize_base_url_rejects_other_schemes() {
        let err = normalize_base_url("ftp://campus.example").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
        let err = normalize_base_url("not a url").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn build_url_resolves_under_base() {
        let base = normalize_base_url("http://localhost:8080/api").expect("url");
        let url = build_url(&base, "/addMemory").expect("url");
        assert_eq!(url.as_str(), "http://localhost:8080/api/addMemory");
        let err = build_url(&base, "/").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn request_bodies_match_backend_shape() {
        let content = serde_json::to_value(ContentRequest {
            geofences: ["Goodsell Observatory"],
        })
        .expect("json");
        assert_eq!(content, json!({ "geofences": ["Goodsell Observatory"] }));

        let fences = serde_json::to_value(GeofencesRequest {
            geofence: GeofenceQuery {
                location: Coordinate::new(44.5, -93.25),
                radius: 100,
            },
        })
        .expect("json");
        assert_eq!(
            fences,
            json!({ "geofence": { "location": { "lat": 44.5, "lng": -93.25 }, "radius": 100 } })
        );
    }

    #[test]
    fn error_policy_applies_to_clones() {
        let client = CampusClient::new(ClientConfig::default()).expect("client");
        let shared = client.clone();
        let skipping = client.with_error_policy(ErrorPolicy::Skip);
        assert_eq!(skipping.error_policy(), ErrorPolicy::Skip);
        assert_eq!(shared.error_policy(), ErrorPolicy::Stop);
        assert_eq!(skipping.base_url(), shared.base_url());
    }

    #[test]
    fn error_policy_on_unshared_client_keeps_config() {
        let config = ClientConfig::new("http://campus.example/api").with_geofence_radius(25);
        let client = CampusClient::new(config)
            .expect("client")
            .with_error_policy(ErrorPolicy::Skip)
            .with_error_policy(ErrorPolicy::Stop);
        assert_eq!(client.error_policy(), ErrorPolicy::Stop);
        assert_eq!(client.base_url().as_str(), "http://campus.example/api/");
        assert_eq!(client.inner.geofence_radius, 25);
    }
}
