//! DNS-over-HTTPS upstream dispatcher (RFC 8484)
//!
//! One call, one upstream attempt: encode the query, pick the next endpoint,
//! substitute the client id and POST the wire bytes.
//!
//! ```text
//! POST /dns-query/<client id> HTTP/1.1
//! Content-Type: application/dns-message
//! Accept: application/dns-message
//! X-Forwarded-For: <caller ip>
//!
//! <raw DNS message bytes>
//! ```

use super::endpoints::{render_upstream_url, UpstreamEndpoints};
use async_trait::async_trait;
use ferrous_doh_application::dns::{decode_message, encode_message};
use ferrous_doh_application::ports::DohDispatcher;
use ferrous_doh_domain::{ClientContext, DomainError};
use hickory_proto::op::Message;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, trace};

/// Media type of DNS wire-format bodies (RFC 8484 §6).
pub const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";

pub struct DohClient {
    http: reqwest::Client,
    endpoints: UpstreamEndpoints,
    timeout: Duration,
}

impl DohClient {
    pub fn new(endpoints: UpstreamEndpoints, timeout: Duration) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| DomainError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints,
            timeout,
        })
    }

    pub fn from_urls<I, S>(urls: I, timeout: Duration) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(UpstreamEndpoints::new(urls)?, timeout)
    }

    pub fn endpoints(&self) -> &UpstreamEndpoints {
        &self.endpoints
    }

    async fn post(
        &self,
        upstream: &str,
        body: Vec<u8>,
        client: &ClientContext,
    ) -> Result<Vec<u8>, DomainError> {
        let mut request = self
            .http
            .post(upstream)
            .header(CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
            .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            .body(body);

        if let Some(ip) = client.client_ip {
            request = request.header(FORWARDED_FOR_HEADER, ip.to_string());
        }

        let transport_error = |reason: String| DomainError::Transport {
            upstream: upstream.to_string(),
            reason,
        };

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| transport_error(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| transport_error(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DomainError::UpstreamStatus {
                upstream: upstream.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default();
        if content_type != DNS_MESSAGE_CONTENT_TYPE {
            return Err(DomainError::ContentType {
                upstream: upstream.to_string(),
                content_type,
            });
        }

        let bytes = tokio::time::timeout(self.timeout, response.bytes())
            .await
            .map_err(|_| transport_error("timed out reading response body".into()))?
            .map_err(|e| transport_error(format!("failed to read response body: {e}")))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl DohDispatcher for DohClient {
    async fn dispatch(
        &self,
        query: &Message,
        client: &ClientContext,
    ) -> Result<Message, DomainError> {
        let body = encode_message(query)?;
        let upstream = render_upstream_url(self.endpoints.next(), &client.client_id);

        trace!(
            upstream = %upstream,
            query_id = query.id(),
            message_len = body.len(),
            "Sending DoH query"
        );

        let bytes = self.post(&upstream, body, client).await?;
        let response = decode_message(&bytes)?;

        debug!(
            upstream = %upstream,
            query_id = query.id(),
            response_len = bytes.len(),
            answers = response.answer_count(),
            "DoH response received"
        );

        Ok(response)
    }
}
