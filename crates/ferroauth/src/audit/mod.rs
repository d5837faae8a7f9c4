//! Audit trail for security-relevant events.
//!
//! Every issuance, refresh, revocation, and detected replay emits an
//! [`AuditEvent`] through the configured [`AuditSink`]. Sinks are
//! fire-and-forget: they must not fail the operation that produced the
//! event.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Kinds of auditable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// An access token was issued.
    TokenIssued,
    /// A refresh token was rotated.
    TokenRefreshed,
    /// A token was revoked.
    TokenRevoked,
    /// A consumed refresh token was replayed and its chain revoked.
    ReplayDetected,
    /// A token was introspected.
    TokenIntrospected,
}

impl AuditAction {
    /// Returns the wire value of this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenIssued => "token_issued",
            Self::TokenRefreshed => "token_refreshed",
            Self::TokenRevoked => "token_revoked",
            Self::ReplayDetected => "replay_detected",
            Self::TokenIntrospected => "token_introspected",
        }
    }
}

/// A single audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// What happened.
    pub action: AuditAction,

    /// The client involved, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// The user involved, when the grant carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    /// Whether the operation succeeded.
    pub success: bool,

    /// Short free-form detail (grant type, token kind, failure reason).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// When the event occurred.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a successful event.
    #[must_use]
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            client_id: None,
            user_id: None,
            success: true,
            detail: None,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the client.
    #[must_use]
    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the user.
    #[must_use]
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Sets the detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Marks the event as a failure.
    #[must_use]
    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }
}

/// Destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records an event. Must not fail the calling operation.
    async fn record(&self, event: AuditEvent);
}

/// Sink that emits events as structured log records.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) {
        tracing::info!(
            action = event.action.as_str(),
            client_id = event.client_id.as_deref(),
            user_id = ?event.user_id,
            success = event.success,
            detail = event.detail.as_deref(),
            "audit"
        );
    }
}

/// Sink that discards events.
#[derive(Debug, Default)]
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn record(&self, _event: AuditEvent) {}
}
