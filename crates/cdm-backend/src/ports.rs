//! # Backend Ports
//!
//! Abstract interfaces over the hosted backend's surfaces. Subsystems
//! depend on these traits, never on a concrete client.

use serde::{Deserialize, Serialize};
use shared_types::{
    ArchivedDocument, BackendError, Complaint, ComplaintStatus, Councillor, Meeting,
    NotificationChannel, NotificationRule, Page, Paginated, QueryFilter, Resolution, Role,
    Session, SortOrder,
};
use uuid::Uuid;

/// Relational table access (filter/sort/pagination CRUD).
#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    // --- documents ---

    /// List archive documents matching `filter`, sorted, windowed by `page`.
    async fn list_documents(
        &self,
        filter: QueryFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<Paginated<ArchivedDocument>, BackendError>;

    /// Fetch a single document row.
    async fn get_document(&self, id: Uuid) -> Result<ArchivedDocument, BackendError>;

    /// Insert a new document row.
    async fn insert_document(&self, document: ArchivedDocument) -> Result<(), BackendError>;

    /// Replace an existing document row.
    async fn update_document(&self, document: ArchivedDocument) -> Result<(), BackendError>;

    // --- complaints ---

    /// List complaints matching `filter`.
    async fn list_complaints(
        &self,
        filter: QueryFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<Paginated<Complaint>, BackendError>;

    /// All complaints registered by one user, newest first.
    async fn complaints_for_user(&self, user_id: Uuid) -> Result<Vec<Complaint>, BackendError>;

    /// Insert a new complaint row.
    async fn insert_complaint(&self, complaint: Complaint) -> Result<(), BackendError>;

    /// Advance a complaint to `status`.
    ///
    /// The transition is validated against the five-step workflow; an
    /// illegal advance is a [`BackendError::Conflict`].
    async fn update_complaint_status(
        &self,
        id: Uuid,
        status: ComplaintStatus,
    ) -> Result<Complaint, BackendError>;

    // --- meetings ---

    /// List meetings matching `filter`.
    async fn list_meetings(
        &self,
        filter: QueryFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<Paginated<Meeting>, BackendError>;

    /// Meetings scheduled at or after `after_unix`, soonest first, at most
    /// `limit` rows.
    async fn upcoming_meetings(
        &self,
        after_unix: i64,
        limit: usize,
    ) -> Result<Vec<Meeting>, BackendError>;

    /// Insert a new meeting row.
    async fn insert_meeting(&self, meeting: Meeting) -> Result<(), BackendError>;

    // --- resolutions ---

    /// List resolutions matching `filter`.
    async fn list_resolutions(
        &self,
        filter: QueryFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<Paginated<Resolution>, BackendError>;

    /// Most recently published resolutions, newest first.
    async fn recent_resolutions(&self, limit: usize) -> Result<Vec<Resolution>, BackendError>;

    /// Insert a new resolution row.
    async fn insert_resolution(&self, resolution: Resolution) -> Result<(), BackendError>;

    // --- councillors ---

    /// All councillors; `active_only` restricts to seated members.
    async fn list_councillors(&self, active_only: bool) -> Result<Vec<Councillor>, BackendError>;

    // --- notification rules ---

    /// All configured notification rules.
    async fn list_rules(&self) -> Result<Vec<NotificationRule>, BackendError>;

    /// Insert or replace a rule by id.
    async fn upsert_rule(&self, rule: NotificationRule) -> Result<(), BackendError>;

    /// Flip a rule's enabled flag.
    async fn set_rule_enabled(&self, id: Uuid, enabled: bool) -> Result<(), BackendError>;
}

/// One row of the backend's protocol statistics aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolStatRow {
    /// Protocol type code (`"PROC"`, `"RES"`, ...).
    pub type_code: String,
    /// Calendar year of the counter.
    pub year: u16,
    /// Numbers issued for this (type, year), including before any reset.
    pub total_issued: u64,
    /// Current counter value (0 after a reset).
    pub last_sequence: u32,
    /// Unix timestamp of the last counter change.
    pub last_updated: i64,
}

/// The backend's protocol-numbering remote procedures.
///
/// `generate_next_protocol` is the one concurrency-sensitive call in the
/// platform: it must be a single atomic increment-and-return, never a
/// read followed by a write.
#[async_trait::async_trait]
pub trait ProtocolRpc: Send + Sync {
    /// Atomically increment the `(type, year)` counter and return the new
    /// sequence value.
    async fn generate_next_protocol(
        &self,
        type_code: &str,
        year: u16,
    ) -> Result<u32, BackendError>;

    /// The sequence value the next generate call would return, without
    /// advancing the counter.
    async fn peek_next_protocol(&self, type_code: &str, year: u16) -> Result<u32, BackendError>;

    /// Counter statistics, optionally restricted to one year.
    async fn get_protocol_statistics(
        &self,
        year: Option<u16>,
    ) -> Result<Vec<ProtocolStatRow>, BackendError>;

    /// Reset the `(type, year)` counter to zero; returns the previous
    /// counter value. Privileged, audited by the caller.
    async fn reset_protocol_sequence(
        &self,
        type_code: &str,
        year: u16,
    ) -> Result<u32, BackendError>;
}

/// Authentication/session provider.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve a bearer token to an authenticated session.
    async fn session(&self, token: &str) -> Result<Session, BackendError>;
}

/// Object storage for uploaded and generated documents.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object under `key`.
    async fn put_document(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError>;

    /// Fetch an object's bytes.
    async fn get_document(&self, key: &str) -> Result<Vec<u8>, BackendError>;

    /// Public URL for a stored object.
    async fn document_url(&self, key: &str) -> Result<String, BackendError>;
}

/// Outbound notification delivery.
#[async_trait::async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Send one rendered notification to every user holding `recipient`.
    async fn dispatch(
        &self,
        channel: NotificationChannel,
        recipient: Role,
        subject: &str,
        body: &str,
    ) -> Result<(), BackendError>;
}
