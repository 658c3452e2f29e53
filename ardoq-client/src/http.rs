//! Blocking HTTP transport over `ureq`.
//!
//! A thin layer: builds URLs, attaches credentials, and turns non-success
//! statuses into [`TransportError`]. No retries and no pagination.

use serde_json::Value;

use ardoq_core::{
    transport::ComponentQuery, Component, Config, EntityId, EntityKind, Fields, Transport,
    TransportError, Workspace, WorkspaceId,
};

/// [`Transport`] backed by the service's REST API.
pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
    auth_header: String,
    org: Option<String>,
}

impl HttpTransport {
    /// Build a transport from resolved configuration.
    ///
    /// The caller is expected to have run [`Config::validate`]; a missing
    /// token is sent as an empty credential and rejected by the service.
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            base_url: format!("{}/api/", config.host.trim_end_matches('/')),
            auth_header: format!("Token token={}", config.token.as_deref().unwrap_or_default()),
            org: config.org.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: &str, resource: &str) -> ureq::Request {
        let url = format!("{}{}", self.base_url, resource);
        tracing::debug!(method, url = %url, "remote call");
        let req = self
            .agent
            .request(method, &url)
            .set("Authorization", &self.auth_header)
            .set("Accept", "application/json");
        match &self.org {
            Some(org) => req.query("org", org),
            None => req,
        }
    }

    fn json_body<T: serde::de::DeserializeOwned>(
        result: Result<ureq::Response, ureq::Error>,
    ) -> Result<T, TransportError> {
        let text = read_body(result)?;
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }
}

impl Transport for HttpTransport {
    fn fetch_workspace(&mut self, id: &WorkspaceId) -> Result<Workspace, TransportError> {
        let result = self
            .request("GET", &format!("workspace/{id}"))
            .query("aggregated", "true")
            .call();
        Self::json_body(result)
    }

    fn create_entity(&mut self, kind: EntityKind, body: &Fields) -> Result<Fields, TransportError> {
        let result = self.request("POST", kind.resource()).send_json(body);
        Self::json_body(result)
    }

    fn update_entity(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        body: &Fields,
    ) -> Result<Fields, TransportError> {
        let result = self
            .request("PUT", &format!("{}/{id}", kind.resource()))
            .send_json(body);
        Self::json_body(result)
    }

    fn delete_entity(&mut self, kind: EntityKind, id: &EntityId) -> Result<(), TransportError> {
        let result = self
            .request("DELETE", &format!("{}/{id}", kind.resource()))
            .call();
        read_body(result).map(|_| ())
    }

    fn search_components(
        &mut self,
        workspace: &WorkspaceId,
        query: &ComponentQuery,
    ) -> Result<Vec<Component>, TransportError> {
        let mut req = self
            .request("GET", "component/search")
            .query("workspace", &workspace.0);
        if let Some((field, value)) = &query.field {
            req = req.query("field", field).query("value", &query_value(value));
        } else if let Some(name) = &query.name {
            req = req.query("name", name);
        } else {
            return Ok(vec![]);
        }
        let mut found: Vec<Component> = Self::json_body(req.call())?;
        if query.exact && query.field.is_none() {
            found.retain(|c| query.matches(c));
        }
        Ok(found)
    }
}

/// Collapse a `ureq` outcome into the response text or a translated error.
fn read_body(result: Result<ureq::Response, ureq::Error>) -> Result<String, TransportError> {
    match result {
        Ok(resp) => resp
            .into_string()
            .map_err(|e| TransportError::Network(e.to_string())),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(translate_status(code, &body))
        }
        Err(ureq::Error::Transport(err)) => Err(TransportError::Network(err.to_string())),
    }
}

/// Map a non-success status and its body to the error taxonomy.
pub fn translate_status(code: u16, body: &str) -> TransportError {
    let message = error_message(body);
    match code {
        400 => TransportError::BadRequest(message),
        401 | 403 => TransportError::Unauthorized(message),
        404 => TransportError::NotFound(message),
        409 => TransportError::Conflict(message),
        412 => TransportError::VersionConflict(message),
        503 => TransportError::ServiceUnavailable(message),
        code => TransportError::Status { code, message },
    }
}

/// Pull a human-readable message out of an error body.
///
/// The service answers with `{"error": {"message": …}}`, `{"message": …}`, or
/// plain text depending on the endpoint.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let nested = value
        .get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(Value::as_str);
    nested
        .or_else(|| value.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
