//! Default transport over the hyper-util pooled client.
//!
//! # Data Flow
//! ```text
//! TransportRequest
//!     → axum::http::Request (absolute-form URI, headers value by value)
//!     → hyper-util legacy Client (pooled HTTP/1.1 connections)
//!     → axum::body::to_bytes (bounded buffering)
//!     → TransportResponse
//! ```
//!
//! Plain `http` only; `https` needs a transport with a TLS connector.

use std::time::Duration;

use axum::body::Body;
use axum::http::{self, HeaderName, HeaderValue, Method};
use ::hyper::body::Incoming;
use futures_util::future::{BoxFuture, FutureExt};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TransportConfig;
use crate::error::BoxError;
use crate::headers::HeaderCollection;
use crate::message::{self, Version};
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Transport backed by a shared connection pool.
#[derive(Debug, Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    max_response_bytes: usize,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self::from_config(&TransportConfig::default())
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        connector.set_nodelay(config.nodelay);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            max_response_bytes: config.max_response_bytes,
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'static, Result<TransportResponse, BoxError>> {
        let client = self.client.clone();
        let limit = self.max_response_bytes;

        async move {
            let outbound = build_request(request)?;
            let response: http::Response<Incoming> = client.request(outbound).await?;

            let (parts, incoming) = response.into_parts();
            let body = axum::body::to_bytes(Body::new(incoming), limit).await?;

            Ok::<_, BoxError>(TransportResponse {
                version: from_http_version(parts.version)?,
                status: parts.status.as_u16(),
                headers: fold_headers(&parts.headers),
                body,
            })
        }
        .boxed()
    }
}

fn build_request(request: TransportRequest) -> Result<http::Request<Body>, BoxError> {
    if request.scheme != "http" {
        return Err(format!("unsupported scheme {:?}; only http is available", request.scheme).into());
    }

    let uri = format!(
        "{}://{}:{}{}",
        request.scheme, request.host, request.port, request.path
    );
    let mut builder = http::Request::builder()
        .method(Method::from_bytes(request.method.as_bytes())?)
        .uri(uri)
        .version(to_http_version(request.version));

    if let Some(headers) = builder.headers_mut() {
        for (name, value) in request.headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            for item in value.values() {
                headers.append(name.clone(), HeaderValue::from_str(item)?);
            }
        }
    }

    let body = match request.body {
        message::Body::Text(text) => Body::from(text),
        message::Body::Bytes(bytes) => Body::from(bytes),
        message::Body::Stream(stream) => {
            let stream = stream
                .take()
                .ok_or("request body stream was already consumed")?;
            Body::from_stream(stream)
        }
    };

    Ok(builder.body(body)?)
}

fn to_http_version(version: Version) -> http::Version {
    match version {
        Version::Http10 => http::Version::HTTP_10,
        Version::Http11 => http::Version::HTTP_11,
    }
}

fn from_http_version(version: http::Version) -> Result<Version, BoxError> {
    match version {
        http::Version::HTTP_09 | http::Version::HTTP_10 => Ok(Version::Http10),
        http::Version::HTTP_11 => Ok(Version::Http11),
        other => Err(format!("unsupported response version {:?}", other).into()),
    }
}

/// First occurrence is set, repeats are appended as a list.
fn fold_headers(headers: &http::HeaderMap) -> HeaderCollection {
    let mut folded = HeaderCollection::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        if folded.contains(name.as_str()) {
            folded.add(name.as_str(), value);
        } else {
            folded.set(name.as_str(), value);
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outbound() -> TransportRequest {
        let mut headers = HeaderCollection::new();
        headers.add("accept", "text/html");
        headers.add("accept", "application/json");
        headers.set("x-one", "1");

        TransportRequest {
            scheme: "http".to_string(),
            host: "example.com".to_string(),
            port: 8080,
            method: "MERGE".to_string(),
            path: "/a?b=c".to_string(),
            version: Version::Http10,
            headers,
            body: message::Body::from("payload"),
        }
    }

    #[test]
    fn test_build_request_absolute_form() {
        let req = build_request(outbound()).unwrap();
        assert_eq!(req.uri().to_string(), "http://example.com:8080/a?b=c");
        assert_eq!(req.method().as_str(), "MERGE");
        assert_eq!(req.version(), http::Version::HTTP_10);
        let accept: Vec<_> = req.headers().get_all("accept").iter().collect();
        assert_eq!(accept.len(), 2);
        assert_eq!(req.headers()["x-one"], "1");
    }

    #[test]
    fn test_https_rejected() {
        let mut request = outbound();
        request.scheme = "https".to_string();
        let err = build_request(request).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_consumed_stream_rejected() {
        let stream = message::BodyStream::new(futures_util::stream::empty::<Result<bytes::Bytes, std::io::Error>>());
        stream.take();

        let mut request = outbound();
        request.body = message::Body::Stream(stream);
        let err = build_request(request).unwrap_err();
        assert!(err.to_string().contains("already consumed"));
    }

    #[test]
    fn test_fold_headers_repeats_become_lists() {
        let mut map = http::HeaderMap::new();
        map.append("set-cookie", HeaderValue::from_static("a=1"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));
        map.insert("content-type", HeaderValue::from_static("text/plain"));

        let folded = fold_headers(&map);
        assert_eq!(folded.get("set-cookie").as_deref(), Some("a=1,b=2"));
        assert!(folded.get_value("set-cookie").unwrap().is_list());
        assert_eq!(folded.get("content-type").as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_version_mapping() {
        assert_eq!(from_http_version(http::Version::HTTP_11).unwrap(), Version::Http11);
        assert_eq!(from_http_version(http::Version::HTTP_10).unwrap(), Version::Http10);
        assert!(from_http_version(http::Version::HTTP_2).is_err());
    }
}
