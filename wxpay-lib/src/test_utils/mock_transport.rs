//! Scripted transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::transport::{GatewayTransport, TransportRequest, TransportResponse};
use crate::{Result, WxPayError};

/// Replies with queued responses in order and records every request.
///
/// Sending with an empty queue fails with a transport error.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<TransportResponse>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    /// Create a transport with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn push_response(&self, response: TransportResponse) {
        self.replies.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a send failure.
    pub fn push_error(&self, error: WxPayError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Requests sent so far.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GatewayTransport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WxPayError::Transport("no scripted response".to_string())))
    }
}
