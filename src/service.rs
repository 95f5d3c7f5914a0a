//! # Service Dispatcher
//!
//! Routes transport-neutral requests onto a [`Workbench`] and maps every
//! outcome to a status code and body. Any HTTP server can sit in front of
//! [`GearService::handle`]; none is bundled.
//!
//! | method | path              | action                          |
//! |--------|-------------------|---------------------------------|
//! | POST   | `/calculate`      | JSON calculation report         |
//! | POST   | `/save`           | save under a generated name     |
//! | POST   | `/save/{name}`    | save under `name`               |
//! | GET    | `/configs`        | list saved names                |
//! | GET    | `/configs/{name}` | saved payload                   |
//! | POST   | `/export/csv`     | calculation report as CSV       |

use std::fmt;
use std::str::FromStr;

use serde_json::{Value as Json, json};
use tracing::{debug, error};

use crate::storage::ConfigStore;
use crate::{Error, Result, Workbench};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_CSV: &str = "text/csv";

// ============================================================================
// Request / Response
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(Error::ValidationError(format!("unsupported method '{other}'"))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub method: Method,
    pub path: String,
    pub body: Vec<u8>,
}

impl ServiceRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::Get, path: path.into(), body: Vec::new() }
    }

    pub fn post(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { method: Method::Post, path: path.into(), body: body.into() }
    }

    pub fn post_json(path: impl Into<String>, body: &Json) -> Self {
        Self::post(path, body.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ServiceResponse {
    pub fn json(status: u16, value: &Json) -> Self {
        Self { status, content_type: CONTENT_TYPE_JSON, body: value.to_string().into_bytes() }
    }

    pub fn csv(body: String) -> Self {
        Self { status: 200, content_type: CONTENT_TYPE_CSV, body: body.into_bytes() }
    }

    /// `{"error": kind, "msg": message}` with the error's status. Server-side
    /// failures are logged and answered with a generic message.
    pub fn from_error(err: &Error) -> Self {
        let status = err.status_code();
        let msg = if err.is_client_error() {
            err.to_string()
        } else {
            error!(error = %err, kind = err.kind(), "request failed");
            "internal error".to_string()
        };
        Self::json(status, &json!({ "error": err.kind(), "msg": msg }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn body_json(&self) -> Result<Json> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ============================================================================
// Routing
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Calculate,
    SaveGenerated,
    SaveNamed(&'a str),
    ListConfigs,
    LoadConfig(&'a str),
    ExportCsv,
}

fn route(method: Method, path: &str) -> Option<Route<'_>> {
    let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        (Method::Post, ["calculate"]) => Some(Route::Calculate),
        (Method::Post, ["save"]) => Some(Route::SaveGenerated),
        (Method::Post, ["save", name]) if !name.is_empty() => Some(Route::SaveNamed(*name)),
        (Method::Get, ["configs"]) => Some(Route::ListConfigs),
        (Method::Get, ["configs", name]) if !name.is_empty() => Some(Route::LoadConfig(*name)),
        (Method::Post, ["export", "csv"]) => Some(Route::ExportCsv),
        _ => None,
    }
}

// ============================================================================
// Service
// ============================================================================

/// Request dispatcher over a [`Workbench`].
pub struct GearService<S: ConfigStore> {
    bench: Workbench<S>,
}

impl<S: ConfigStore> GearService<S> {
    pub fn new(bench: Workbench<S>) -> Self {
        Self { bench }
    }

    pub fn workbench(&self) -> &Workbench<S> {
        &self.bench
    }

    /// Dispatch one request. Never fails; errors become error responses.
    pub async fn handle(&self, req: ServiceRequest) -> ServiceResponse {
        debug!(method = %req.method, path = %req.path, bytes = req.body.len(), "dispatching");
        let Some(route) = route(req.method, &req.path) else {
            return ServiceResponse::json(
                404,
                &json!({ "error": "not_found", "msg": format!("no route for {} {}", req.method, req.path) }),
            );
        };
        match self.dispatch(route, &req.body).await {
            Ok(resp) => resp,
            Err(err) => ServiceResponse::from_error(&err),
        }
    }

    async fn dispatch(&self, route: Route<'_>, body: &[u8]) -> Result<ServiceResponse> {
        match route {
            Route::Calculate => {
                let report = self.bench.calculate_json(&parse_body(body)?)?;
                Ok(ServiceResponse::json(200, &serde_json::to_value(&report)?))
            }
            Route::SaveGenerated => {
                let saved = self.bench.save(None, &parse_body(body)?).await?;
                Ok(ServiceResponse::json(200, &json!({ "ok": true, "filename": saved.filename })))
            }
            Route::SaveNamed(name) => {
                let saved = self.bench.save(Some(name), &parse_body(body)?).await?;
                Ok(ServiceResponse::json(200, &json!({ "ok": true, "filename": saved.filename })))
            }
            Route::ListConfigs => {
                let files: Vec<String> =
                    self.bench.list().await?.into_iter().map(|name| format!("{name}.json")).collect();
                Ok(ServiceResponse::json(200, &json!({ "ok": true, "files": files })))
            }
            Route::LoadConfig(name) => Ok(ServiceResponse::json(200, &self.bench.load(name).await?)),
            Route::ExportCsv => {
                let report = self.bench.calculate_json(&parse_body(body)?)?;
                Ok(ServiceResponse::csv(crate::export::to_csv_string(&report)?))
            }
        }
    }
}

fn parse_body(body: &[u8]) -> Result<Json> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::ValidationError("request body is empty".into()));
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_routes() {
        assert_eq!(route(Method::Post, "/calculate"), Some(Route::Calculate));
        assert_eq!(route(Method::Post, "/calculate/"), Some(Route::Calculate));
        assert_eq!(route(Method::Post, "/save"), Some(Route::SaveGenerated));
        assert_eq!(route(Method::Post, "/save/rig"), Some(Route::SaveNamed("rig")));
        assert_eq!(route(Method::Get, "/configs"), Some(Route::ListConfigs));
        assert_eq!(route(Method::Get, "/configs/rig.json"), Some(Route::LoadConfig("rig.json")));
        assert_eq!(route(Method::Post, "/export/csv?x=1"), Some(Route::ExportCsv));
        assert_eq!(route(Method::Get, "/calculate"), None);
        assert_eq!(route(Method::Get, "/configs/a/b"), None);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert!("PATCH".parse::<Method>().is_err());
        assert!("DELETE".parse::<Method>().is_err());
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let resp = ServiceResponse::from_error(&Error::StorageError("disk on fire".into()));
        assert_eq!(resp.status, 500);
        assert_eq!(
            resp.body_json().unwrap(),
            json!({"error": "storage_error", "msg": "internal error"})
        );
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let service = GearService::new(Workbench::open_memory());
        let resp = service.handle(ServiceRequest::post("/calculate", "  ")).await;
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body_json().unwrap()["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let service = GearService::new(Workbench::open_memory());
        let resp = service.handle(ServiceRequest::get("/plot2d")).await;
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body_json().unwrap()["error"], "not_found");
    }
}
