//! # In-Memory Backend
//!
//! Deterministic implementation of every backend port, used by the test
//! suite and for degraded local operation. All state lives behind a single
//! `parking_lot::Mutex`, which is what makes the counter increment atomic:
//! the whole read-increment-write happens in one lock scope.

use std::collections::HashMap;

use parking_lot::Mutex;
use shared_types::{
    ArchivedDocument, BackendError, Complaint, ComplaintStatus, Councillor, Meeting,
    NotificationChannel, NotificationRule, Page, Paginated, QueryFilter, Resolution, Role,
    Session, SortOrder,
};
use tracing::debug;
use uuid::Uuid;

use crate::ports::{
    AuthProvider, NotificationDispatcher, ObjectStore, ProtocolRpc, ProtocolStatRow, TableStore,
};

/// One `(type, year)` counter row.
#[derive(Debug, Clone, Default)]
struct CounterRow {
    last_sequence: u32,
    total_issued: u64,
    last_updated: i64,
}

/// An object held by the in-memory object store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// A notification recorded by the in-memory dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedNotification {
    pub channel: NotificationChannel,
    pub recipient: Role,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
struct State {
    available: bool,
    now_unix: i64,
    counters: HashMap<(String, u16), CounterRow>,
    documents: Vec<ArchivedDocument>,
    complaints: Vec<Complaint>,
    meetings: Vec<Meeting>,
    resolutions: Vec<Resolution>,
    councillors: Vec<Councillor>,
    rules: Vec<NotificationRule>,
    sessions: HashMap<String, Session>,
    objects: HashMap<String, StoredObject>,
    dispatched: Vec<DispatchedNotification>,
    failing_channels: Vec<NotificationChannel>,
}

/// In-memory stand-in for the hosted backend.
///
/// Implements [`TableStore`], [`ProtocolRpc`], [`AuthProvider`],
/// [`ObjectStore`], and [`NotificationDispatcher`]. Construct once and
/// share via `Arc`.
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                available: true,
                ..State::default()
            }),
        }
    }

    /// Toggle availability. While unavailable, every port call fails with
    /// [`BackendError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    /// Advance the backend's notion of "now" (used for `last_updated`
    /// stamps on counter rows).
    pub fn set_now_unix(&self, now_unix: i64) {
        self.state.lock().now_unix = now_unix;
    }

    /// Register a token -> session mapping for [`AuthProvider`].
    pub fn register_session(&self, token: &str, session: Session) {
        self.state.lock().sessions.insert(token.to_string(), session);
    }

    /// Seed the councillor directory, which has no write surface of its
    /// own (seats are managed in the municipal registry).
    pub fn seed_councillors(&self, rows: Vec<Councillor>) {
        self.state.lock().councillors.extend(rows);
    }

    /// Make one delivery channel fail, for dispatch-failure tests.
    pub fn fail_channel(&self, channel: NotificationChannel) {
        self.state.lock().failing_channels.push(channel);
    }

    /// Notifications recorded by the dispatcher so far.
    pub fn dispatched(&self) -> Vec<DispatchedNotification> {
        self.state.lock().dispatched.clone()
    }

    fn check_available(state: &State) -> Result<(), BackendError> {
        if state.available {
            Ok(())
        } else {
            Err(BackendError::Unavailable {
                message: "in-memory backend marked unavailable".into(),
            })
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `row` passes every constraint in `filter`.
fn document_matches(doc: &ArchivedDocument, filter: &QueryFilter) -> bool {
    if let Some(kind) = &filter.kind {
        if !doc.kind.eq_ignore_ascii_case(kind) {
            return false;
        }
    }
    if let Some(status) = &filter.status {
        if !doc.status.label().eq_ignore_ascii_case(status) {
            return false;
        }
    }
    if let Some(year) = filter.year {
        if doc.year != year {
            return false;
        }
    }
    if let Some(text) = &filter.text {
        if !doc.title.to_lowercase().contains(&text.to_lowercase()) {
            return false;
        }
    }
    true
}

fn complaint_matches(complaint: &Complaint, filter: &QueryFilter) -> bool {
    if let Some(status) = &filter.status {
        if !complaint.status.label().eq_ignore_ascii_case(status) {
            return false;
        }
    }
    if let Some(year) = filter.year {
        if complaint.created_at.format("%Y").to_string() != format!("{year:04}") {
            return false;
        }
    }
    if let Some(text) = &filter.text {
        if !complaint.subject.to_lowercase().contains(&text.to_lowercase()) {
            return false;
        }
    }
    true
}

/// Apply sort + pagination to an already-filtered row set.
fn paginate<T: Clone>(
    mut rows: Vec<T>,
    sort: SortOrder,
    page: Page,
    newest_first_key: impl Fn(&T) -> i64,
) -> Paginated<T> {
    rows.sort_by_key(|r| newest_first_key(r));
    if sort == SortOrder::NewestFirst {
        rows.reverse();
    }
    let total = rows.len();
    let rows = rows
        .into_iter()
        .skip(page.offset)
        .take(page.effective_limit())
        .collect();
    Paginated { rows, total, page }
}

#[async_trait::async_trait]
impl TableStore for InMemoryBackend {
    async fn list_documents(
        &self,
        filter: QueryFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<Paginated<ArchivedDocument>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        let rows: Vec<_> = state
            .documents
            .iter()
            .filter(|d| document_matches(d, &filter))
            .cloned()
            .collect();
        Ok(paginate(rows, sort, page, |d| d.created_at.timestamp()))
    }

    async fn get_document(&self, id: Uuid) -> Result<ArchivedDocument, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        state
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                entity: format!("document {id}"),
            })
    }

    async fn insert_document(&self, document: ArchivedDocument) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        debug!(id = %document.id, kind = %document.kind, "insert document");
        state.documents.push(document);
        Ok(())
    }

    async fn update_document(&self, document: ArchivedDocument) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        match state.documents.iter_mut().find(|d| d.id == document.id) {
            Some(slot) => {
                *slot = document;
                Ok(())
            }
            None => Err(BackendError::NotFound {
                entity: format!("document {}", document.id),
            }),
        }
    }

    async fn list_complaints(
        &self,
        filter: QueryFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<Paginated<Complaint>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        let rows: Vec<_> = state
            .complaints
            .iter()
            .filter(|c| complaint_matches(c, &filter))
            .cloned()
            .collect();
        Ok(paginate(rows, sort, page, |c| c.created_at.timestamp()))
    }

    async fn complaints_for_user(&self, user_id: Uuid) -> Result<Vec<Complaint>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        let mut rows: Vec<_> = state
            .complaints
            .iter()
            .filter(|c| c.reporter_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| std::cmp::Reverse(c.created_at.timestamp()));
        Ok(rows)
    }

    async fn insert_complaint(&self, complaint: Complaint) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        debug!(id = %complaint.id, protocol = %complaint.protocol, "insert complaint");
        state.complaints.push(complaint);
        Ok(())
    }

    async fn update_complaint_status(
        &self,
        id: Uuid,
        status: ComplaintStatus,
    ) -> Result<Complaint, BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        let now = state.now_unix;
        let complaint = state
            .complaints
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| BackendError::NotFound {
                entity: format!("complaint {id}"),
            })?;
        if !complaint.status.can_advance_to(status) {
            return Err(BackendError::Conflict {
                message: format!(
                    "illegal transition {} -> {}",
                    complaint.status.label(),
                    status.label()
                ),
            });
        }
        complaint.status = status;
        if now != 0 {
            if let Some(updated) = chrono::DateTime::from_timestamp(now, 0) {
                complaint.updated_at = updated;
            }
        }
        Ok(complaint.clone())
    }

    async fn list_meetings(
        &self,
        filter: QueryFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<Paginated<Meeting>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        let rows: Vec<_> = state
            .meetings
            .iter()
            .filter(|m| match &filter.text {
                Some(text) => m.title.to_lowercase().contains(&text.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();
        Ok(paginate(rows, sort, page, |m| m.scheduled_at.timestamp()))
    }

    async fn upcoming_meetings(
        &self,
        after_unix: i64,
        limit: usize,
    ) -> Result<Vec<Meeting>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        let mut rows: Vec<_> = state
            .meetings
            .iter()
            .filter(|m| m.scheduled_at.timestamp() >= after_unix)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.scheduled_at.timestamp());
        rows.truncate(limit);
        Ok(rows)
    }

    async fn insert_meeting(&self, meeting: Meeting) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        state.meetings.push(meeting);
        Ok(())
    }

    async fn list_resolutions(
        &self,
        filter: QueryFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<Paginated<Resolution>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        let rows: Vec<_> = state
            .resolutions
            .iter()
            .filter(|r| match &filter.text {
                Some(text) => r.title.to_lowercase().contains(&text.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();
        Ok(paginate(rows, sort, page, |r| {
            r.published_at.map(|t| t.timestamp()).unwrap_or(0)
        }))
    }

    async fn recent_resolutions(&self, limit: usize) -> Result<Vec<Resolution>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        let mut rows: Vec<_> = state
            .resolutions
            .iter()
            .filter(|r| r.published_at.is_some())
            .cloned()
            .collect();
        rows.sort_by_key(|r| {
            std::cmp::Reverse(r.published_at.map(|t| t.timestamp()).unwrap_or(0))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn insert_resolution(&self, resolution: Resolution) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        state.resolutions.push(resolution);
        Ok(())
    }

    async fn list_councillors(&self, active_only: bool) -> Result<Vec<Councillor>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        Ok(state
            .councillors
            .iter()
            .filter(|c| !active_only || c.active)
            .cloned()
            .collect())
    }

    async fn list_rules(&self) -> Result<Vec<NotificationRule>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        Ok(state.rules.clone())
    }

    async fn upsert_rule(&self, rule: NotificationRule) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        match state.rules.iter_mut().find(|r| r.id == rule.id) {
            Some(slot) => *slot = rule,
            None => state.rules.push(rule),
        }
        Ok(())
    }

    async fn set_rule_enabled(&self, id: Uuid, enabled: bool) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        match state.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.enabled = enabled;
                Ok(())
            }
            None => Err(BackendError::NotFound {
                entity: format!("notification rule {id}"),
            }),
        }
    }
}

#[async_trait::async_trait]
impl ProtocolRpc for InMemoryBackend {
    async fn generate_next_protocol(
        &self,
        type_code: &str,
        year: u16,
    ) -> Result<u32, BackendError> {
        // Single lock scope: read, increment, stamp, return. Two callers
        // can never observe the same sequence value.
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        let now = state.now_unix;
        let row = state
            .counters
            .entry((type_code.to_string(), year))
            .or_default();
        row.last_sequence += 1;
        row.total_issued += 1;
        row.last_updated = now;
        Ok(row.last_sequence)
    }

    async fn peek_next_protocol(&self, type_code: &str, year: u16) -> Result<u32, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        let current = state
            .counters
            .get(&(type_code.to_string(), year))
            .map(|row| row.last_sequence)
            .unwrap_or(0);
        Ok(current + 1)
    }

    async fn get_protocol_statistics(
        &self,
        year: Option<u16>,
    ) -> Result<Vec<ProtocolStatRow>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        let mut rows: Vec<_> = state
            .counters
            .iter()
            .filter(|((_, y), _)| year.map(|wanted| *y == wanted).unwrap_or(true))
            .map(|((code, y), row)| ProtocolStatRow {
                type_code: code.clone(),
                year: *y,
                total_issued: row.total_issued,
                last_sequence: row.last_sequence,
                last_updated: row.last_updated,
            })
            .collect();
        rows.sort_by(|a, b| (a.year, &a.type_code).cmp(&(b.year, &b.type_code)));
        Ok(rows)
    }

    async fn reset_protocol_sequence(
        &self,
        type_code: &str,
        year: u16,
    ) -> Result<u32, BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        let now = state.now_unix;
        let row = state
            .counters
            .entry((type_code.to_string(), year))
            .or_default();
        let previous = row.last_sequence;
        row.last_sequence = 0;
        row.last_updated = now;
        debug!(type_code, year, previous, "counter reset");
        Ok(previous)
    }
}

#[async_trait::async_trait]
impl AuthProvider for InMemoryBackend {
    async fn session(&self, token: &str) -> Result<Session, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        state
            .sessions
            .get(token)
            .cloned()
            .ok_or_else(|| BackendError::PermissionDenied {
                action: "resolve session".into(),
            })
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryBackend {
    async fn put_document(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        state.objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get_document(&self, key: &str) -> Result<Vec<u8>, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        state
            .objects
            .get(key)
            .map(|obj| obj.bytes.clone())
            .ok_or_else(|| BackendError::NotFound {
                entity: format!("object {key}"),
            })
    }

    async fn document_url(&self, key: &str) -> Result<String, BackendError> {
        let state = self.state.lock();
        Self::check_available(&state)?;
        if state.objects.contains_key(key) {
            Ok(format!("memory://documents/{key}"))
        } else {
            Err(BackendError::NotFound {
                entity: format!("object {key}"),
            })
        }
    }
}

#[async_trait::async_trait]
impl NotificationDispatcher for InMemoryBackend {
    async fn dispatch(
        &self,
        channel: NotificationChannel,
        recipient: Role,
        subject: &str,
        body: &str,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        if state.failing_channels.contains(&channel) {
            return Err(BackendError::RpcFailed {
                procedure: "dispatch_notification".into(),
                message: format!("channel {channel:?} rejected the message"),
            });
        }
        state.dispatched.push(DispatchedNotification {
            channel,
            recipient,
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
