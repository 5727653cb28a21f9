use std::time::Duration;

use async_trait::async_trait;
use models::Prize;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use super::{decode_blob, decode_records, encode_blob, PrizeStore};
use crate::errors::ServiceError;

/// Hosted key-value store reached over its REST API (Upstash / Vercel KV).
///
/// Each call is `POST {url}` with a bearer token and a JSON command array such
/// as `["GET","prizes"]`; replies are `{"result": ...}` or `{"error": "..."}`.
#[derive(Clone, Debug)]
pub struct KvRestStore {
    http: reqwest::Client,
    url: String,
    token: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct KvReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl KvRestStore {
    pub fn new(url: &str, token: &str, key: &str) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::StorageUnavailable(format!("kv http client: {e}")))?;
        Ok(Self {
            http,
            url: url.trim().trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            key: key.to_string(),
        })
    }

    async fn command(&self, args: &[&str]) -> Result<Option<Value>, ServiceError> {
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await
            .map_err(|e| ServiceError::StorageUnavailable(format!("kv request: {e}")))?;
        let status = resp.status();
        let reply: KvReply = resp
            .json()
            .await
            .map_err(|e| ServiceError::Storage(format!("kv reply ({status}): {e}")))?;
        if let Some(err) = reply.error {
            return Err(ServiceError::Storage(format!("kv error ({status}): {err}")));
        }
        if !status.is_success() {
            return Err(ServiceError::Storage(format!("kv status {status}")));
        }
        Ok(reply.result)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl PrizeStore for KvRestStore {
    async fn load_all(&self) -> Vec<Prize> {
        match self.command(&["GET", self.key.as_str()]).await {
            Ok(None) | Ok(Some(Value::Null)) => {
                debug!(key = %self.key, "kv key not set");
                Vec::new()
            }
            Ok(Some(Value::String(raw))) => decode_blob(self.backend(), raw.as_bytes()),
            // some clients store the array itself rather than its JSON text
            Ok(Some(Value::Array(items))) => decode_records(self.backend(), items),
            Ok(Some(other)) => {
                error!(backend = self.backend(), kind = %json_kind(&other), "unexpected kv value; using empty collection");
                Vec::new()
            }
            Err(e) => {
                error!(backend = self.backend(), error = %e, "failed to load prizes");
                Vec::new()
            }
        }
    }

    async fn save_all(&self, prizes: &[Prize]) -> Result<(), ServiceError> {
        let blob = encode_blob(prizes)?;
        self.command(&["SET", self.key.as_str(), blob.as_str()]).await.map_err(|e| {
            error!(backend = self.backend(), error = %e, "failed to save prizes");
            e
        })?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "kv"
    }
}
