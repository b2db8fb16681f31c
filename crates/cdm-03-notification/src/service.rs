//! # Notification Service
//!
//! Rule management and event dispatch over the backend ports.

use std::sync::Arc;

use cdm_backend::{NotificationDispatcher, TableStore};
use serde::{Deserialize, Serialize};
use shared_types::{
    BackendError, CouncilEvent, NotificationChannel, NotificationRule, Role, Session,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::render::render_message;

/// Outcome of one (channel, recipient role) delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub channel: NotificationChannel,
    pub recipient: Role,
    /// `None` on success, the error message otherwise.
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-dispatch report: every attempted delivery and its outcome.
///
/// A failed channel never aborts the remaining deliveries; failures are
/// collected here and surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Rules that matched the event (enabled, same kind).
    pub matched_rules: usize,
    /// Every delivery attempted.
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchReport {
    /// True when at least one delivery failed.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.succeeded())
    }
}

/// Notification rule and dispatch service.
pub struct NotificationService {
    tables: Arc<dyn TableStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl NotificationService {
    pub fn new(tables: Arc<dyn TableStore>, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { tables, dispatcher }
    }

    /// All configured rules.
    pub async fn rules(&self) -> Result<Vec<NotificationRule>, BackendError> {
        self.tables.list_rules().await
    }

    /// Insert or replace a rule. Admin only.
    pub async fn upsert_rule(
        &self,
        rule: NotificationRule,
        requested_by: &Session,
    ) -> Result<(), BackendError> {
        if requested_by.role != Role::Admin {
            return Err(BackendError::PermissionDenied {
                action: "edit notification rules".into(),
            });
        }
        info!(rule_id = %rule.id, event = ?rule.event, "notification rule upserted");
        self.tables.upsert_rule(rule).await
    }

    /// Flip a rule's enabled flag. Admin only.
    pub async fn set_enabled(
        &self,
        id: Uuid,
        enabled: bool,
        requested_by: &Session,
    ) -> Result<(), BackendError> {
        if requested_by.role != Role::Admin {
            return Err(BackendError::PermissionDenied {
                action: "edit notification rules".into(),
            });
        }
        self.tables.set_rule_enabled(id, enabled).await
    }

    /// Dispatch an event through every matching enabled rule.
    pub async fn notify(&self, event: &CouncilEvent) -> Result<DispatchReport, BackendError> {
        let rules = self.tables.list_rules().await?;
        let matching: Vec<_> = rules
            .into_iter()
            .filter(|rule| rule.enabled && rule.event == event.kind)
            .collect();

        let (subject, body) = render_message(event);
        let mut outcomes = Vec::new();

        for rule in &matching {
            for &channel in &rule.channels {
                for &recipient in &rule.recipient_roles {
                    let result = self
                        .dispatcher
                        .dispatch(channel, recipient, &subject, &body)
                        .await;
                    if let Err(err) = &result {
                        warn!(
                            ?channel,
                            ?recipient,
                            error = %err,
                            "notification delivery failed"
                        );
                    }
                    outcomes.push(DispatchOutcome {
                        channel,
                        recipient,
                        error: result.err().map(|e| e.to_string()),
                    });
                }
            }
        }

        info!(
            event = ?event.kind,
            matched = matching.len(),
            attempted = outcomes.len(),
            "notification dispatch complete"
        );
        Ok(DispatchReport {
            matched_rules: matching.len(),
            outcomes,
        })
    }
}
