//! Request Context
//!
//! Per-request metadata passed explicitly into handlers.

use std::net::IpAddr;
use uuid::Uuid;

/// Built by the context middleware, narrowed with the caller id once a
/// bearer token has been verified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub request_user_id: Option<i64>,
    pub correlation_id: Option<Uuid>,
    pub client_ip: Option<IpAddr>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_user(mut self, user_id: i64) -> Self {
        self.request_user_id = Some(user_id);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Caller id, if the request was authenticated
    pub fn caller(&self) -> Option<i64> {
        self.request_user_id
    }
}
