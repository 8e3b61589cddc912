use anyhow::Context;
use gloo_net::http::Request;
use log::debug;
use minigym_domain as domain;
use minigym_web_app::RemoteConfig;
use serde_json::{Map, Value};

use crate::{
    Collection, Document, DocumentStore,
    records::{format_timestamp, parse_timestamp},
};

const KEY_UPDATED_AT: &str = "updatedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Option<Value>,
}

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> anyhow::Result<Response>;
}

pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> anyhow::Result<Response> {
        let builder = match method {
            Method::Get => Request::get(url),
            Method::Put => Request::put(url),
        };
        let request = match body {
            Some(body) => builder.json(body).context("failed to serialize request body")?,
            None => builder.build().context("failed to build request")?,
        };
        let response = request
            .send()
            .await
            .with_context(|| format!("failed to send request to {url}"))?;
        let text = response
            .text()
            .await
            .context("failed to read response body")?;
        let body = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text).context("failed to parse response body")?)
        };
        Ok(Response {
            status: response.status(),
            body,
        })
    }
}

/// Remote document store.
///
/// The workouts are part of the user document, the sessions are stored in a
/// separate document.
pub struct REST<S> {
    config: RemoteConfig,
    sender: S,
}

impl<S> REST<S> {
    pub fn new(config: RemoteConfig, sender: S) -> Self {
        Self { config, sender }
    }

    fn url(&self, collection: Collection) -> String {
        let user = format!("{}/users/{}", self.config.base_url, self.config.user_id);
        match collection {
            Collection::Workouts => user,
            Collection::Sessions => format!("{user}/data/sessions"),
        }
    }
}

impl<S: SendRequest> REST<S> {
    async fn send(
        &self,
        method: Method,
        collection: Collection,
        body: Option<&Value>,
    ) -> Result<Response, domain::StorageError> {
        self.sender
            .send_request(method, &self.url(collection), body)
            .await
            .map_err(|err| {
                debug!("{err:#}");
                domain::StorageError::NoConnection
            })
    }
}

impl<S: SendRequest> DocumentStore for REST<S> {
    async fn read(&self, collection: Collection) -> Result<Option<Document>, domain::StorageError> {
        let response = self.send(Method::Get, collection, None).await?;
        match response.status {
            404 => Ok(None),
            200..=299 => Ok(response.body.map(|body| document(collection, &body))),
            status => Err(unexpected_status(status)),
        }
    }

    async fn write(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), domain::StorageError> {
        let mut body = Map::new();
        body.insert(
            collection.as_ref().to_string(),
            Value::Array(document.records.clone()),
        );
        if let Some(updated_at) = document.updated_at {
            body.insert(
                KEY_UPDATED_AT.to_string(),
                Value::String(format_timestamp(updated_at)),
            );
        }
        let response = self
            .send(Method::Put, collection, Some(&Value::Object(body)))
            .await?;
        match response.status {
            200..=299 => Ok(()),
            status => Err(unexpected_status(status)),
        }
    }
}

fn document(collection: Collection, body: &Value) -> Document {
    Document {
        records: body
            .get(collection.as_ref())
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        updated_at: body
            .get(KEY_UPDATED_AT)
            .and_then(Value::as_str)
            .and_then(|timestamp| parse_timestamp(timestamp).ok()),
    }
}

fn unexpected_status(status: u16) -> domain::StorageError {
    domain::StorageError::Other(format!("unexpected response status {status}").into())
}
