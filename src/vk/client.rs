//! Rate-limited VK API client with retry on "not ready" payloads.

use std::num::NonZeroU32;
use std::ops::Range;
use std::time::Duration;

use governor::Quota;
use governor::RateLimiter;
use governor::clock::QuantaClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use log::debug;
use log::info;
use reqwest::Client;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::USER_AGENT;
use serde_json::Value;
use tokio::time::sleep;

use crate::config::Config;
use crate::vk::error::VkError;
use crate::vk::model::GroupProfile;
use crate::vk::model::UserProfile;

/// Backoff multipliers between retries: `backoff_unit * i` for i = 4, 6, ..., 62.
/// 30 retries, ~9.9s worst case at the default 100ms unit.
const BACKOFF_STEPS: Range<u32> = 4..64;

enum CallStatus {
    Ready,
    Retryable,
    Fatal { code: i64, message: String },
}

pub struct VkClient {
    /// Base method URL, overridable in tests.
    pub api_url: String,
    /// One backoff step; the retry schedule scales off this.
    pub backoff_unit: Duration,
    token: String,
    version: String,
    client: Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, QuantaClock>,
}

impl VkClient {
    pub fn new(config: &Config) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("vk-harvest/0.1"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to create client");

        // VK allows 3 requests per second for user tokens.
        let limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(config.api_rps).unwrap_or(NonZeroU32::MIN),
        ));

        Self {
            api_url: config.api_url.clone(),
            backoff_unit: Duration::from_millis(100),
            token: config.access_token.clone(),
            version: config.api_version.clone(),
            client,
            limiter,
        }
    }

    /// Calls one VK method and returns the contents of its `response` field.
    ///
    /// Retryable payloads (the upstream's "not ready yet" placeholder and
    /// transient error codes) are re-requested on an increasing backoff;
    /// exhausting the schedule yields [`VkError::UpstreamUnavailable`].
    pub async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Value, VkError> {
        let mut payload = self.request(method, params).await?;

        for i in BACKOFF_STEPS.step_by(2) {
            match Self::classify(&payload) {
                CallStatus::Ready => break,
                CallStatus::Fatal { code, message } => {
                    return Err(VkError::ApiError { code, message });
                }
                CallStatus::Retryable => {
                    debug!(
                        "VK method {method} not ready, retrying after {:?}",
                        self.backoff_unit * i
                    );
                    sleep(self.backoff_unit * i).await;
                    payload = self.request(method, params).await?;
                }
            }
        }

        match payload.get_mut("response") {
            Some(response) => Ok(response.take()),
            None => Err(VkError::UpstreamUnavailable {
                method: method.to_string(),
            }),
        }
    }

    async fn request(&self, method: &str, params: &[(&str, String)]) -> Result<Value, VkError> {
        if self.limiter.check().is_err() {
            info!("VK API is ratelimited. Waiting...");
        }
        self.limiter.until_ready().await;

        debug!("Calling VK method {method}");
        let response = self
            .client
            .get(format!("{}/{}", self.api_url, method))
            .query(&[
                ("access_token", self.token.as_str()),
                ("v", self.version.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn classify(payload: &Value) -> CallStatus {
        if payload.get("response").is_some() {
            return CallStatus::Ready;
        }
        match payload.get("error") {
            Some(err) => {
                let code = err.get("error_code").and_then(Value::as_i64).unwrap_or(0);
                // 1 unknown, 6 too many requests, 9 flood control, 10 internal
                if matches!(code, 1 | 6 | 9 | 10) {
                    CallStatus::Retryable
                } else {
                    let message = err
                        .get("error_msg")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown API error")
                        .to_string();
                    CallStatus::Fatal { code, message }
                }
            }
            // Neither `response` nor `error`: the request is still processing.
            None => CallStatus::Retryable,
        }
    }

    /// Zero-count probe returning the total member count of a group.
    pub async fn count_group_members(&self, group_id: &str) -> Result<u64, VkError> {
        let resp = self
            .call(
                "groups.getMembers",
                &[
                    ("group_id", group_id.to_string()),
                    ("count", "0".to_string()),
                    ("offset", "0".to_string()),
                ],
            )
            .await?;

        resp.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| VkError::MissingField {
                field: "response.count".to_string(),
            })
    }

    /// One page of member IDs at the given offset.
    pub async fn list_group_members(
        &self,
        group_id: &str,
        offset: u64,
        count: u64,
    ) -> Result<Vec<i64>, VkError> {
        let resp = self
            .call(
                "groups.getMembers",
                &[
                    ("group_id", group_id.to_string()),
                    ("count", count.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        let items = resp
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| VkError::MissingField {
                field: "response.items".to_string(),
            })?;

        items
            .iter()
            .map(|item| {
                item.as_i64().ok_or_else(|| VkError::MissingField {
                    field: "response.items[]".to_string(),
                })
            })
            .collect()
    }

    /// Batch-resolves user IDs to profiles, including deactivation flags.
    pub async fn resolve_users(&self, user_ids: &[i64]) -> Result<Vec<UserProfile>, VkError> {
        let resp = self
            .call("users.get", &[("user_ids", join_ids(user_ids))])
            .await?;
        Ok(serde_json::from_value(resp)?)
    }

    /// The IDs and true count of communities a user is subscribed to.
    pub async fn subscription_groups(&self, user_id: i64) -> Result<(u64, Vec<i64>), VkError> {
        let resp = self
            .call(
                "users.getSubscriptions",
                &[("user_id", user_id.to_string())],
            )
            .await?;

        let groups = resp.get("groups").ok_or_else(|| VkError::MissingField {
            field: "response.groups".to_string(),
        })?;
        let count = groups
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| VkError::MissingField {
                field: "response.groups.count".to_string(),
            })?;
        let items = groups
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| VkError::MissingField {
                field: "response.groups.items".to_string(),
            })?;

        let ids = items
            .iter()
            .map(|item| {
                item.as_i64().ok_or_else(|| VkError::MissingField {
                    field: "response.groups.items[]".to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((count, ids))
    }

    /// Batch-resolves community IDs to `(id, name)` profiles.
    pub async fn resolve_groups(&self, group_ids: &[i64]) -> Result<Vec<GroupProfile>, VkError> {
        let resp = self
            .call("groups.getById", &[("group_ids", join_ids(group_ids))])
            .await?;
        Ok(serde_json::from_value(resp)?)
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
