// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Outgoing request events

use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Header entry as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A request with headers was sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedRequest {
    /// Full request URL
    pub url: String,
    /// Request headers in send order
    pub headers: Vec<HeaderEntry>,
    /// When the platform reported the request
    pub timestamp: DateTime<Utc>,
}

impl ObservedRequest {
    /// Create a new observed request
    pub fn new(url: impl Into<String>, headers: Vec<HeaderEntry>) -> Self {
        Self {
            url: url.into(),
            headers,
            timestamp: Utc::now(),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderEntry::new(name, value));
        self
    }
}

/// Stream of observed requests fed to the engine
pub type RequestStream = BoxStream<'static, ObservedRequest>;

/// Sending half handed to the platform integration
#[derive(Debug, Clone)]
pub struct RequestSender {
    tx: mpsc::Sender<ObservedRequest>,
}

impl RequestSender {
    /// Report a request; waits if the engine is behind
    ///
    /// Returns false once the receiving side is gone.
    pub async fn send(&self, request: ObservedRequest) -> bool {
        self.tx.send(request).await.is_ok()
    }

    /// Report a request without waiting; drops it when the buffer is full
    pub fn try_send(&self, request: ObservedRequest) -> bool {
        match self.tx.try_send(request) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping observed request");
                false
            }
        }
    }
}

/// Create a bounded request observer channel
pub fn request_channel(capacity: usize) -> (RequestSender, RequestStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let stream = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|request| (request, rx))
    });
    (RequestSender { tx }, Box::pin(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_request_channel_delivers_in_order() {
        let (sender, mut stream) = request_channel(4);
        assert!(sender.send(ObservedRequest::new("https://a.com/", vec![])).await);
        assert!(sender.try_send(ObservedRequest::new("https://b.com/", vec![])));
        drop(sender);

        assert_eq!(stream.next().await.unwrap().url, "https://a.com/");
        assert_eq!(stream.next().await.unwrap().url, "https://b.com/");
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_header_builder() {
        let req = ObservedRequest::new("https://x.com/", vec![])
            .header("Authorization", "Bearer z")
            .header("Accept", "*/*");
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.headers[0], HeaderEntry::new("Authorization", "Bearer z"));
    }
}
