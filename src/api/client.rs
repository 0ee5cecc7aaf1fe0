use crate::api::models::{Contact, LoginRequest, LoginResponse, Message, Ticket};
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use url::Url;

pub const CONTACTS_LIMIT: u32 = 100;
pub const TICKETS_LIMIT: u32 = 50;
pub const MESSAGES_LIMIT: u32 = 500;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid api url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Optional constraints for the ticket listing. Empty strings are omitted
/// from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub protocol: String,
    pub start: String,
    pub end: String,
}

impl TicketFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", TICKETS_LIMIT.to_string())];
        if !self.protocol.is_empty() {
            params.push(("protocolo", self.protocol.clone()));
        }
        if !self.start.is_empty() {
            params.push(("dataInicio", self.start.clone()));
        }
        if !self.end.is_empty() {
            params.push(("dataFim", self.end.clone()));
        }
        params
    }
}

/// REST client for the chat history backend. Clones share the bearer
/// credential.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    base: Url,
    bearer: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_http(base_url, HttpClient::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Self::with_http(base_url, http)
    }

    fn with_http(base_url: &str, http: HttpClient) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)?;
        // A trailing slash lets `path_segments_mut` append below the base path.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            base,
            bearer: Arc::new(RwLock::new(None)),
        })
    }

    pub fn set_bearer(&self, token: Option<String>) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn bearer(&self) -> Option<String> {
        self.bearer.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_auth(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(t) = self.bearer() {
            req = req.bearer_auth(t);
        }
        req
    }

    async fn get_json(&self, url: Url, query: &[(&str, String)]) -> Result<Value, ApiError> {
        log::debug!("GET {url} {query:?}");
        let resp = self.with_auth(self.http.get(url)).query(query).send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        Ok(resp.json::<Value>().await?)
    }

    /// `POST /login`; returns the session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["login"]);
        log::debug!("POST {url}");
        let resp = self
            .http
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        let body: LoginResponse = resp.json().await?;
        if body.token.is_empty() {
            return Err(ApiError::Decode("empty token".into()));
        }
        Ok(body.token)
    }

    pub async fn contacts(&self, search: &str) -> Result<Vec<Contact>, ApiError> {
        let url = self.endpoint(&["contatos"]);
        let json = self
            .get_json(url, &[("search", search.to_string()), ("limit", CONTACTS_LIMIT.to_string())])
            .await?;
        Ok(data_rows(&json)?.iter().filter_map(Contact::from_value).collect())
    }

    pub async fn tickets(&self, contact_id: &str, filter: &TicketFilter) -> Result<Vec<Ticket>, ApiError> {
        let url = self.endpoint(&["contatos", contact_id, "atendimentos"]);
        log::debug!(
            "ticket filter: protocolo={:?} dataInicio={:?} dataFim={:?}",
            filter.protocol,
            filter.start,
            filter.end
        );
        let json = self.get_json(url, &filter.query()).await?;
        let tickets: Vec<Ticket> = data_rows(&json)?
            .iter().filter_map(Ticket::from_value).collect();
        log::debug!("{} tickets found", tickets.len());
        Ok(tickets)
    }

    pub async fn messages(&self, ticket_id: &str) -> Result<Vec<Message>, ApiError> {
        let url = self.endpoint(&["atendimentos", ticket_id, "mensagens"]);
        let json = self.get_json(url, &[("limit", MESSAGES_LIMIT.to_string())]).await?;
        Ok(data_rows(&json)?.iter().map(Message::from_value).collect())
    }
}

/// Rows of the `{data: [...]}` envelope. A missing or null `data` is an
/// empty list.
fn data_rows(json: &Value) -> Result<&[Value], ApiError> {
    match json.get("data") {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(ApiError::Decode("data is not an array".into())),
    }
}
