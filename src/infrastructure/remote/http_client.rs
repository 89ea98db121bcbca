use crate::application::ports::{BatchPushOutcome, PushOutcome, RemoteApi, RemoteConflict};
use crate::domain::entities::{
    CheckpointVerification, LocationSample, Photo, Report, TimeRecord,
};
use crate::domain::value_objects::{IdempotencyKey, RemoteId};
use crate::infrastructure::remote::dto::{
    BatchResponse, CheckpointVerificationPayload, ConflictResponse, CreatedResponse,
    ErrorResponse, LocationBatchPayload, PhotoPayload, ReportPayload, TimeRecordPayload,
};
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// `RemoteApi` over the sync HTTP API. Every failure is classified here so
/// callers only ever see `PushOutcome` variants, never transport errors.
pub struct HttpRemoteApi {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRemoteApi {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|err| {
                AppError::ConfigurationError(format!("Failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post_push<P: Serialize>(&self, path: &str, payload: &P) -> PushOutcome {
        let url = format!("{}{path}", self.base_url);
        let request = self.authorized(self.client.post(&url)).json(payload);
        match request.send().await {
            Ok(response) => classify_push(response).await,
            Err(err) => transport_outcome(path, err),
        }
    }

    async fn put_push<P: Serialize>(&self, path: &str, payload: &P) -> PushOutcome {
        let url = format!("{}{path}", self.base_url);
        let request = self.authorized(self.client.put(&url)).json(payload);
        match request.send().await {
            Ok(response) => classify_push(response).await,
            Err(err) => transport_outcome(path, err),
        }
    }
}

fn transport_outcome(path: &str, err: reqwest::Error) -> PushOutcome {
    debug!(target: "sync::remote", path, error = %err, "transport failure");
    PushOutcome::Transient(format!("Transport error: {err}"))
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

async fn error_detail(response: Response) -> String {
    let status = response.status();
    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(|body| body.message);
    match message {
        Some(message) => format!("{status}: {message}"),
        None => status.to_string(),
    }
}

async fn classify_push(response: Response) -> PushOutcome {
    let status = response.status();

    if status.is_success() {
        return match response.json::<CreatedResponse>().await {
            Ok(body) => match RemoteId::new(body.id) {
                Ok(remote_id) => PushOutcome::Synced(remote_id),
                Err(err) => PushOutcome::Permanent(format!("Malformed server id: {err}")),
            },
            // 2xx with an unreadable body is most likely a proxy hiccup.
            Err(err) => PushOutcome::Transient(format!("Unreadable response body: {err}")),
        };
    }

    if status == StatusCode::CONFLICT {
        return match response.json::<ConflictResponse>().await {
            Ok(body) => match RemoteId::new(body.id) {
                Ok(remote_id) => PushOutcome::Conflict(RemoteConflict {
                    remote_id,
                    server_updated_at: body.updated_at,
                }),
                Err(err) => PushOutcome::Permanent(format!("Malformed conflict id: {err}")),
            },
            Err(err) => PushOutcome::Transient(format!("Unreadable conflict body: {err}")),
        };
    }

    if is_retryable_status(status) {
        PushOutcome::Transient(error_detail(response).await)
    } else {
        PushOutcome::Permanent(error_detail(response).await)
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn push_time_record(&self, record: &TimeRecord, key: &IdempotencyKey) -> PushOutcome {
        let payload = TimeRecordPayload::from_record(record, key);
        self.post_push("/v1/time-records", &payload).await
    }

    async fn push_checkpoint_verification(
        &self,
        record: &CheckpointVerification,
        key: &IdempotencyKey,
    ) -> PushOutcome {
        let payload = CheckpointVerificationPayload::from_record(record, key);
        self.post_push("/v1/checkpoint-verifications", &payload).await
    }

    async fn push_report(&self, record: &Report, key: &IdempotencyKey) -> PushOutcome {
        let payload = ReportPayload::from_record(record, key);
        self.post_push("/v1/reports", &payload).await
    }

    async fn update_report(
        &self,
        remote_id: &RemoteId,
        record: &Report,
        key: &IdempotencyKey,
    ) -> PushOutcome {
        let payload = ReportPayload::from_record(record, key);
        let path = format!("/v1/reports/{}", remote_id.as_str());
        self.put_push(&path, &payload).await
    }

    async fn push_photo(&self, record: &Photo, key: &IdempotencyKey) -> PushOutcome {
        let payload = PhotoPayload::from_record(record, key);
        self.post_push("/v1/photos", &payload).await
    }

    async fn push_location_batch(
        &self,
        samples: &[LocationSample],
        keys: &[IdempotencyKey],
    ) -> BatchPushOutcome {
        let payload = LocationBatchPayload::from_records(samples, keys);
        let url = format!("{}/v1/locations/batch", self.base_url);
        let request = self.authorized(self.client.post(&url)).json(&payload);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(target: "sync::remote", error = %err, "location batch transport failure");
                return BatchPushOutcome::Transient(format!("Transport error: {err}"));
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<BatchResponse>().await {
                Ok(body) => BatchPushOutcome::Processed {
                    failed_indices: body.failed_indices,
                },
                Err(err) => {
                    BatchPushOutcome::Transient(format!("Unreadable batch body: {err}"))
                }
            };
        }

        if is_retryable_status(status) {
            BatchPushOutcome::Transient(error_detail(response).await)
        } else {
            BatchPushOutcome::Permanent(error_detail(response).await)
        }
    }
}
