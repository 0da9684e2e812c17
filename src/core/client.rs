use crate::core::pacing::{Pacer, RETRY_COUNTDOWN};
use crate::core::{ConfigProvider, ImageApi};
use crate::domain::model::{GenerationRequest, ImageResponse};
use crate::utils::error::{ImageGenError, Result};
use async_trait::async_trait;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde_json::Value;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
const RAW_BODY_PREVIEW_CHARS: usize = 500;

// 標準字母表，padding 可有可無
const B64_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

enum Attempt {
    Success(String),
    RateLimited(String),
}

/// HTTP client for the image generation endpoint.
pub struct ImageClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    size: String,
    timeout_secs: u64,
    retry_on_rate_limit: bool,
    pacer: Pacer,
}

impl ImageClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let timeout = config.request_timeout();
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: config.api_url().to_string(),
            api_key: config.api_key().to_string(),
            model: config.model().to_string(),
            size: config.size().to_string(),
            timeout_secs: timeout.as_secs(),
            retry_on_rate_limit: config.retry_on_rate_limit(),
            pacer: Pacer::default(),
        })
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Requests one image and returns the raw `b64_json` payload. A 429 is
    /// waited out and retried once; anything else but 200 is fatal.
    pub async fn generate_b64(&self, prompt: &str) -> Result<String> {
        let payload = GenerationRequest::new(&self.model, prompt, &self.size);
        let mut retried = false;

        loop {
            match self.send_once(&payload).await? {
                Attempt::Success(body) => return extract_b64(&body),
                Attempt::RateLimited(body) if self.retry_on_rate_limit && !retried => {
                    let wait_secs = parse_retry_after(&body).ok_or_else(|| {
                        ImageGenError::ApiError {
                            status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                            message: body.clone(),
                        }
                    })?;

                    tracing::warn!("⏳ Rate limited by API, retrying once in {}s", wait_secs);
                    println!(
                        "Rate limit hit, waiting {} seconds then retrying...",
                        wait_secs
                    );
                    self.pacer.countdown(wait_secs, RETRY_COUNTDOWN).await;
                    retried = true;
                }
                Attempt::RateLimited(body) => {
                    return Err(ImageGenError::ApiError {
                        status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                        message: format_error_body(&body),
                    })
                }
            }
        }
    }

    async fn send_once(&self, payload: &GenerationRequest) -> Result<Attempt> {
        tracing::debug!(
            "POST {} (model={}, size={})",
            self.api_url,
            payload.model,
            payload.size
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await.map_err(|e| self.request_error(e))?;

        match status {
            StatusCode::OK => Ok(Attempt::Success(body)),
            StatusCode::TOO_MANY_REQUESTS => Ok(Attempt::RateLimited(body)),
            other => Err(ImageGenError::ApiError {
                status: other.as_u16(),
                message: format_error_body(&body),
            }),
        }
    }

    fn request_error(&self, err: reqwest::Error) -> ImageGenError {
        if err.is_timeout() {
            ImageGenError::TimeoutError {
                seconds: self.timeout_secs,
            }
        } else {
            ImageGenError::RequestError(err)
        }
    }
}

#[async_trait]
impl ImageApi for ImageClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let b64 = self.generate_b64(prompt).await?;
        decode_b64(&b64)
    }
}

/// `retry_after` from a 429 body, 60 seconds when the key is absent.
/// `None` (fatal) when the body is not a JSON object or `retry_after` is not
/// an integer-like value. Negative waits clamp to zero.
pub fn parse_retry_after(body: &str) -> Option<u64> {
    let value: Value = serde_json::from_str(body).ok()?;
    let obj = value.as_object()?;

    let secs: i64 = match obj.get("retry_after") {
        None => return Some(DEFAULT_RETRY_AFTER_SECS),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
        Some(Value::String(s)) => s.trim().parse::<i64>().ok()?,
        Some(_) => return None,
    };
    Some(secs.max(0) as u64)
}

/// Compact JSON when the body parses, raw text otherwise.
pub fn format_error_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

pub fn extract_b64(body: &str) -> Result<String> {
    let parse_error = |reason: String| ImageGenError::ResponseError {
        reason,
        raw: body.chars().take(RAW_BODY_PREVIEW_CHARS).collect(),
    };

    let response: ImageResponse =
        serde_json::from_str(body).map_err(|e| parse_error(e.to_string()))?;

    let first = response
        .data
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| parse_error("Empty 'data' in API response".to_string()))?;

    first
        .and_then(|item| item.b64_json)
        .filter(|b64| !b64.is_empty())
        .ok_or_else(|| parse_error("Missing 'b64_json' in first data item".to_string()))
}

pub fn decode_b64(b64: &str) -> Result<Vec<u8>> {
    let compact: String = b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(B64_ENGINE.decode(compact)?)
}
