//! HTTP verb wrappers, authentication and response classification.
//!
//! Every operation issues exactly one round-trip (two in OAuth2 mode, which
//! fetches a fresh token for every call; tokens are deliberately never
//! cached). Error signaling is content-based as well as status-based: a
//! success status whose body carries the embedded error-list key is still a
//! failure.

use crate::client::ScimClient;
use crate::config::OAuth2Config;
use crate::error::{ScimError, ScimResult};
use log::debug;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::blocking::RequestBuilder;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};

/// Key of the embedded error list in response bodies.
pub const RESPONSE_ERRORS: &str = "Errors";

/// Key of the resource list in query response bodies.
pub const RESPONSE_RESOURCES: &str = "Resources";

/// Resource path of the User endpoint.
pub const USERS_PATH: &str = "Users";

impl ScimClient {
    fn endpoint(&self, segments: &[&str]) -> String {
        format!("{}{}", self.config.normalized_base(), segments.join("/"))
    }

    /// Build an authorized request with the configured media types.
    ///
    /// OAuth2 mode posts the resource-owner credentials to the token
    /// endpoint first and attaches the extracted bearer token; otherwise
    /// basic credentials are attached per request.
    fn prepare(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, String)],
    ) -> ScimResult<RequestBuilder> {
        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, &self.config.accept)
            .header(CONTENT_TYPE, &self.config.content_type);
        if !params.is_empty() {
            request = request.query(params);
        }

        match &self.config.oauth2 {
            Some(oauth2) => Ok(request.bearer_auth(self.generate_token(oauth2)?)),
            None => Ok(request.basic_auth(
                &self.config.username,
                Some(self.config.password.expose_secret()),
            )),
        }
    }

    fn generate_token(&self, oauth2: &OAuth2Config) -> ScimResult<String> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &oauth2.client_id)
            .append_pair("client_secret", oauth2.client_secret.expose_secret())
            .append_pair("username", &self.config.username)
            .append_pair("password", self.config.password.expose_secret())
            .finish();

        let response = self
            .http
            .post(&oauth2.access_token_base_address)
            .header(CONTENT_TYPE, &oauth2.access_token_content_type)
            .header(ACCEPT, &self.config.accept)
            .body(body)
            .send()?;
        let text = response.text()?;

        let node: Value = serde_json::from_str(&text)
            .map_err(|_| ScimError::protocol(format!("No access token found - {text}")))?;
        match node.get(&oauth2.access_token_node_id).and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(ScimError::protocol(format!(
                "No access token found - {text}"
            ))),
        }
    }

    pub(crate) fn do_get(&self, segments: &[&str], params: &[(&str, String)]) -> ScimResult<Value> {
        let url = self.endpoint(segments);
        debug!("GET {url}");

        let response = self.prepare(Method::GET, &url, params)?.send()?;
        let status = response.status();
        let text = response.text()?;
        check_status(status, &text)?;

        let node = parse_body(&text)?;
        if node.is_array() {
            return Err(ScimError::protocol(format!(
                "Wrong response from GET request: {text}"
            )));
        }
        check_embedded_errors(&node, &text)?;
        Ok(node)
    }

    pub(crate) fn do_post(&self, segments: &[&str], payload: &Value) -> ScimResult<Value> {
        let url = self.endpoint(segments);
        debug!("POST {url}");

        let response = self
            .prepare(Method::POST, &url, &[])?
            .json(payload)
            .send()?;
        let status = response.status();
        let text = response.text()?;
        check_status(status, &text)?;

        let node = parse_body(&text)?;
        check_embedded_errors(&node, &text)?;
        Ok(node)
    }

    /// Dispatch an update with the configured verb (PUT full replace or
    /// PATCH partial).
    pub(crate) fn do_update(&self, user_id: &str, payload: &Value) -> ScimResult<Value> {
        let url = self.endpoint(&[USERS_PATH, user_id]);
        let method = match self.config.update_method {
            crate::config::UpdateMethod::Put => Method::PUT,
            crate::config::UpdateMethod::Patch => Method::PATCH,
        };
        debug!("{method} {url}");

        let response = self.prepare(method, &url, &[])?.json(payload).send()?;
        let status = response.status();
        let text = response.text()?;
        check_status(status, &text)?;

        let node = parse_body(&text)?;
        check_embedded_errors(&node, &text)?;
        Ok(node)
    }

    pub(crate) fn do_delete(&self, user_id: &str) -> ScimResult<()> {
        let url = self.endpoint(&[USERS_PATH, user_id]);
        debug!("DELETE {url}");

        let response = self.prepare(Method::DELETE, &url, &[])?.send()?;
        let status = response.status();
        match status {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(ScimError::NoSuchEntity(user_id.to_string())),
            _ => Err(ScimError::protocol(format!(
                "While deleting User {user_id}: unexpected status {status}"
            ))),
        }
    }
}

/// Classify the HTTP status. 404 surfaces as a distinguished no-such-entity
/// condition; anything outside 200/201/202 is a protocol error.
fn check_status(status: StatusCode, body: &str) -> ScimResult<()> {
    match status {
        StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => Ok(()),
        StatusCode::NOT_FOUND => Err(ScimError::NoSuchEntity(body.to_string())),
        _ => Err(ScimError::protocol(format!(
            "While executing request ({status}): {body}"
        ))),
    }
}

/// Parse a response body, normalizing empty and `null` bodies to an empty
/// JSON object.
fn parse_body(text: &str) -> ScimResult<Value> {
    if text.trim().is_empty() {
        debug!("Empty response body");
        return Ok(Value::Object(Map::new()));
    }
    let node: Value = serde_json::from_str(text)
        .map_err(|e| ScimError::protocol(format!("Unparseable response body: {e}")))?;
    if node.is_null() {
        Ok(Value::Object(Map::new()))
    } else {
        Ok(node)
    }
}

/// The server signals some failures inside a success response body.
fn check_embedded_errors(node: &Value, body: &str) -> ScimResult<()> {
    if node.get(RESPONSE_ERRORS).is_some() {
        Err(ScimError::protocol(body.to_string()))
    } else {
        Ok(())
    }
}
