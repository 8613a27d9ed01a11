//! Stateless HTTP request builder and response parser for the todo collection.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each collection operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Resource paths come from `codec::resource_path`, so the
//! addressing scheme lives in one place.

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::codec::resource_path;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Todo, TodoPayload};

#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, None)
    }

    pub fn build_create(&self, payload: &TodoPayload) -> Result<HttpRequest, ApiError> {
        self.with_body(HttpMethod::Post, None, payload)
    }

    pub fn build_update(&self, id: Uuid, payload: &TodoPayload) -> Result<HttpRequest, ApiError> {
        self.with_body(HttpMethod::Patch, Some(id), payload)
    }

    pub fn build_delete(&self, id: Uuid) -> HttpRequest {
        self.bare(HttpMethod::Delete, Some(id))
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        decode(&response)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    fn url(&self, id: Option<Uuid>) -> String {
        format!("{}{}", self.base_url, resource_path(id))
    }

    fn bare(&self, method: HttpMethod, id: Option<Uuid>) -> HttpRequest {
        HttpRequest {
            method,
            path: self.url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_body(
        &self,
        method: HttpMethod,
        id: Option<Uuid>,
        payload: &TodoPayload,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(id),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_produces_correct_request() {
        let req = client().build_list();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_targets_collection() {
        let payload = TodoPayload {
            title: "Buy milk".to_string(),
            completed: false,
        };
        let req = client().build_create(&payload).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["completed"], false);
        assert!(body.get("id").is_none());
    }

    #[test]
    fn build_update_patches_item_path() {
        let payload = TodoPayload {
            title: "Updated".to_string(),
            completed: true,
        };
        let req = client().build_update(Uuid::nil(), &payload).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(
            req.path,
            "http://localhost:3000/todos/00000000-0000-0000-0000-000000000000"
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["completed"], true);
    }

    #[test]
    fn build_delete_has_no_body() {
        let req = client().build_delete(Uuid::nil());
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_success() {
        let todos = client()
            .parse_list(response(
                200,
                r#"[{"id":"00000000-0000-0000-0000-000000000001","title":"Test","completed":false}]"#,
            ))
            .unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Test");
        assert_eq!(todos[0].id, Some(Uuid::from_u128(1)));
    }

    #[test]
    fn parse_list_bad_json() {
        let err = client().parse_list(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_create_wrong_status() {
        let err = client().parse_create(response(500, "internal error")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_update_success() {
        let todo = client()
            .parse_update(response(
                200,
                r#"{"id":"00000000-0000-0000-0000-000000000001","title":"Updated","completed":true}"#,
            ))
            .unwrap();
        assert_eq!(todo.title, "Updated");
        assert!(todo.completed);
    }

    #[test]
    fn parse_delete_not_found() {
        let err = client().parse_delete(response(404, "")).unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[test]
    fn parse_delete_success() {
        assert!(client().parse_delete(response(204, "")).is_ok());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:3000/");
        assert_eq!(client.build_list().path, "http://localhost:3000/todos");
    }
}
