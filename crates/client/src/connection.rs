//! The shared connection every entity call goes through.
//!
//! Data flow: ensure a valid access token (refreshing if needed) → build a
//! signed request → send it over the [`Transport`] → decode JSON or classify
//! the failure → for fetch-all listings, repeat per page and merge.

use crate::{
    classify::{Failure, classify},
    merge::merge_recursive,
    request::signed_request,
    response::parse_response,
    transport::ReqwestTransport,
};
use bytes::Bytes;
use http::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use teamleader_auth::{AuthorizationOutcome, TokenManager};
use teamleader_types::{
    Clock, Credentials, Page, Result, SystemClock, TeamleaderError, TokenStore, Transport,
};

/// Query parameters for a call; nested values encode as `key[sub]=..`.
pub type Params = Map<String, Value>;

/// Name of the pagination parameter.
const PAGE_PARAM: &str = "page";

pub struct Connection {
    credentials: Arc<Credentials>,
    tokens: TokenManager,
    transport: Arc<dyn Transport>,
}

impl Connection {
    /// A connection using `reqwest` and the system clock.
    pub fn new(credentials: Credentials, store: Arc<dyn TokenStore>) -> Self {
        Self::with_parts(
            credentials,
            store,
            Arc::new(ReqwestTransport::default()),
            Arc::new(SystemClock),
        )
    }

    /// A connection with every collaborator supplied by the caller.
    pub fn with_parts(
        credentials: Credentials,
        store: Arc<dyn TokenStore>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let credentials = Arc::new(credentials);
        let tokens = TokenManager::new(
            Arc::clone(&credentials),
            store,
            Arc::clone(&transport),
            clock,
        );
        Self {
            credentials,
            tokens,
            transport,
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The token lifecycle manager (store, refresh, clear).
    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Drive the authorization-code flow; see [`TokenManager::authorize`].
    ///
    /// # Errors
    ///
    /// Returns [`TeamleaderError::Api`] if the code exchange fails.
    pub async fn authorize(&self, code: Option<&str>) -> Result<AuthorizationOutcome> {
        self.tokens.authorize(code).await
    }

    /// `GET {api}/{endpoint}` with `params` as the query string.
    ///
    /// # Errors
    ///
    /// Returns the classified [`TeamleaderError`] of the failed call.
    pub async fn get(&self, endpoint: &str, params: Params) -> Result<Value> {
        self.get_with(endpoint, params, false).await
    }

    /// `GET` every page of a list endpoint and merge them into one value.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the first page that fails; pages
    /// fetched before it are discarded.
    pub async fn get_all(&self, endpoint: &str, params: Params) -> Result<Value> {
        self.get_with(endpoint, params, true).await
    }

    /// `GET`, optionally following pagination.
    ///
    /// With `fetch_all` and no `page` parameter, a cursor of size 100
    /// starting at page 1 is injected. A caller-supplied `page` cursor is
    /// followed from where it points, with its size clamped to 100. Another
    /// page is requested for as long as the previous one came back with
    /// exactly `size` items in `data`, up to page number `u32::MAX`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`TeamleaderError`] of the failed call.
    pub async fn get_with(&self, endpoint: &str, params: Params, fetch_all: bool) -> Result<Value> {
        self.fetch(endpoint, params, fetch_all)
            .await
            .map_err(classify)
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the classified [`TeamleaderError`] of the failed call.
    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        self.send_json(Method::POST, endpoint, body).await
    }

    /// `PATCH` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the classified [`TeamleaderError`] of the failed call.
    pub async fn patch<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        self.send_json(Method::PATCH, endpoint, body).await
    }

    /// `DELETE` without a body.
    ///
    /// # Errors
    ///
    /// Returns the classified [`TeamleaderError`] of the failed call.
    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.execute(Method::DELETE, endpoint, None, None)
            .await
            .map_err(classify)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<Value> {
        let body = serde_json::to_vec(body).map_err(TeamleaderError::from)?;
        self.execute(method, endpoint, Some(Bytes::from(body)), None)
            .await
            .map_err(classify)
    }

    async fn fetch(
        &self,
        endpoint: &str,
        mut params: Params,
        fetch_all: bool,
    ) -> std::result::Result<Value, Failure> {
        let cursor = if fetch_all {
            let page = match params.get(PAGE_PARAM) {
                None => Some(Page::default()),
                Some(supplied) => Page::from_value(supplied),
            };
            if let Some(page) = page {
                params.insert(PAGE_PARAM.to_string(), page.to_value());
            }
            page
        } else {
            None
        };

        let mut json = self.execute(Method::GET, endpoint, None, Some(&params)).await?;
        let Some(mut page) = cursor else {
            return Ok(json);
        };

        let mut more = has_more_data(&json, page);
        while more {
            if !page.advance() {
                tracing::warn!(endpoint, page = page.number, "page number limit reached");
                break;
            }
            params.insert(PAGE_PARAM.to_string(), page.to_value());
            tracing::debug!(endpoint, page = page.number, size = page.size, "fetching next page");

            let next = self.execute(Method::GET, endpoint, None, Some(&params)).await?;
            more = has_more_data(&next, page);
            merge_recursive(&mut json, next);
        }
        Ok(json)
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Bytes>,
        params: Option<&Params>,
    ) -> std::result::Result<Value, Failure> {
        let url = self.credentials.endpoint_url(endpoint);
        let request = signed_request(&self.tokens, method, &url, body, params).await?;
        tracing::debug!(method = %request.method, endpoint, "sending request");

        let response = self.transport.send(request).await?;
        Ok(parse_response(&response)?)
    }
}

/// A page holding exactly `size` items may be followed by more.
fn has_more_data(json: &Value, page: Page) -> bool {
    let count = json
        .get("data")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    count == page.size as usize
}
