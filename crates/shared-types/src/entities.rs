//! # Core Domain Entities
//!
//! Defines the council entities that more than one subsystem reads or
//! writes.
//!
//! ## Clusters
//!
//! - **Ombudsman**: `Complaint`, `ComplaintStatus`
//! - **Council**: `Meeting`, `Resolution`, `Councillor`
//! - **Archive**: `ArchivedDocument`, `DocumentStatus`
//! - **Notification**: `NotificationRule`, `NotificationChannel`, `CouncilEvent`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// CLUSTER A: OMBUDSMAN
// =============================================================================

/// A citizen complaint registered through the ombudsman channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    /// Row identifier.
    pub id: Uuid,
    /// Protocol number string assigned at registration (`OUV-NNN/YYYY`).
    pub protocol: String,
    /// User who registered the complaint.
    pub reporter_id: Uuid,
    /// Short subject line.
    pub subject: String,
    /// Free-form description.
    pub description: String,
    /// Current workflow step.
    pub status: ComplaintStatus,
    /// Municipality district or locality the complaint refers to.
    pub locality: Option<String>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// The five-step complaint workflow.
///
/// Transitions are strictly linear: each step may only advance to the
/// next one. The original system applied status updates unvalidated;
/// here every update goes through [`ComplaintStatus::can_advance_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintStatus {
    /// Received and protocol-numbered.
    Registered,
    /// Assigned to a technical reviewer.
    UnderReview,
    /// Field inspection scheduled or in progress.
    Inspection,
    /// Awaiting council deliberation.
    Deliberation,
    /// Resolved and closed.
    Closed,
}

impl ComplaintStatus {
    /// Ordered workflow steps, first to last.
    pub const WORKFLOW: [ComplaintStatus; 5] = [
        ComplaintStatus::Registered,
        ComplaintStatus::UnderReview,
        ComplaintStatus::Inspection,
        ComplaintStatus::Deliberation,
        ComplaintStatus::Closed,
    ];

    /// Zero-based position of this step in the workflow.
    pub fn step(self) -> usize {
        Self::WORKFLOW
            .iter()
            .position(|s| *s == self)
            .unwrap_or(usize::MAX)
    }

    /// The step that follows this one, if any.
    pub fn next(self) -> Option<ComplaintStatus> {
        Self::WORKFLOW.get(self.step() + 1).copied()
    }

    /// Whether advancing from `self` to `target` is a legal transition.
    ///
    /// Only single forward steps are legal; skips and regressions are
    /// rejected.
    pub fn can_advance_to(self, target: ComplaintStatus) -> bool {
        self.next() == Some(target)
    }

    /// Human-readable label shown in status views.
    pub fn label(self) -> &'static str {
        match self {
            ComplaintStatus::Registered => "Registrada",
            ComplaintStatus::UnderReview => "Em análise",
            ComplaintStatus::Inspection => "Em vistoria",
            ComplaintStatus::Deliberation => "Em deliberação",
            ComplaintStatus::Closed => "Concluída",
        }
    }
}

// =============================================================================
// CLUSTER B: COUNCIL
// =============================================================================

/// A scheduled or past council meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    /// Row identifier.
    pub id: Uuid,
    /// Protocol number string (`REU-NNN/YYYY`).
    pub protocol: String,
    /// Meeting title/agenda summary.
    pub title: String,
    /// Scheduled start.
    pub scheduled_at: DateTime<Utc>,
    /// Physical or virtual venue.
    pub venue: String,
    /// Whether minutes have been approved for this meeting.
    pub minutes_approved: bool,
}

/// A council resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Row identifier.
    pub id: Uuid,
    /// Protocol number string (`RES-NNN/YYYY`).
    pub protocol: String,
    /// Resolution title.
    pub title: String,
    /// Body text summary.
    pub summary: String,
    /// Publication timestamp, if published.
    pub published_at: Option<DateTime<Utc>>,
}

/// A council member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Councillor {
    /// Row identifier.
    pub id: Uuid,
    /// Full name.
    pub name: String,
    /// Entity the councillor represents (civil society, government body).
    pub represents: String,
    /// Whether the seat is currently active.
    pub active: bool,
}

// =============================================================================
// CLUSTER C: ARCHIVE
// =============================================================================

/// A document held in the council archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedDocument {
    /// Row identifier.
    pub id: Uuid,
    /// Protocol number string assigned at creation.
    pub protocol: String,
    /// Document kind code (`ATA`, `RES`, `DOC`, ...).
    pub kind: String,
    /// Document title.
    pub title: String,
    /// Publication state.
    pub status: DocumentStatus,
    /// Calendar year the document belongs to.
    pub year: u16,
    /// Object-storage key of the uploaded file, if any.
    pub storage_key: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Publication state of an archived document.
///
/// Legal transitions: `Draft -> Published -> Archived`. Anything else is
/// a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    /// Not yet visible outside the council.
    Draft,
    /// Publicly visible.
    Published,
    /// Retired from the public listing but retained.
    Archived,
}

impl DocumentStatus {
    /// Whether moving from `self` to `target` is a legal transition.
    pub fn can_transition_to(self, target: DocumentStatus) -> bool {
        matches!(
            (self, target),
            (DocumentStatus::Draft, DocumentStatus::Published)
                | (DocumentStatus::Published, DocumentStatus::Archived)
        )
    }

    /// Status label used in filters and views.
    pub fn label(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "Rascunho",
            DocumentStatus::Published => "Publicado",
            DocumentStatus::Archived => "Arquivado",
        }
    }
}

// =============================================================================
// CLUSTER D: NOTIFICATION
// =============================================================================

/// Delivery channel for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
}

/// Council event kinds that can trigger notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    MeetingScheduled,
    ComplaintRegistered,
    ResolutionPublished,
    DocumentArchived,
}

/// A configured notification rule: which event reaches whom, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRule {
    /// Rule identifier.
    pub id: Uuid,
    /// Event this rule fires on.
    pub event: EventKind,
    /// Channels the notification goes out on.
    pub channels: Vec<NotificationChannel>,
    /// Roles that receive the notification.
    pub recipient_roles: Vec<Role>,
    /// Disabled rules are kept but never fire.
    pub enabled: bool,
}

/// A council event submitted for notification dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilEvent {
    /// What happened.
    pub kind: EventKind,
    /// Subject line material (meeting title, complaint subject, ...).
    pub subject: String,
    /// Protocol number of the record involved, when one exists.
    pub protocol: Option<String>,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
}

/// User roles recognized by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Platform administrator; may reset counters and edit rules.
    Admin,
    /// Seated council member.
    Councillor,
    /// Registered citizen (mobile/ombudsman access).
    Citizen,
}

/// An authenticated session as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Authenticated user id.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Role attribute on the user profile.
    pub role: Role,
}
