//! # Mobile API Service
//!
//! Aggregates multiple backend queries into the dashboard shape the
//! mobile client renders, and registers ombudsman complaints with a
//! generator-issued protocol number.

use std::sync::Arc;

use cdm_01_protocol::{
    Clock, ProtocolError, ProtocolGeneratorApi, ProtocolType, SequenceStats,
};
use cdm_backend::{AuthProvider, TableStore};
use serde::{Deserialize, Serialize};
use shared_types::{
    BackendError, Complaint, ComplaintStatus, Councillor, Meeting, Page, Paginated, QueryFilter,
    Resolution, Session, SortOrder,
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors surfaced by the mobile API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MobileApiError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Complaints per workflow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// The mobile client's home-screen payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileDashboard {
    /// Complaints not yet closed.
    pub open_complaints: usize,
    /// Complaints per workflow step, workflow order.
    pub complaints_by_status: Vec<StatusCount>,
    /// Next scheduled meetings, soonest first.
    pub next_meetings: Vec<Meeting>,
    /// Most recently published resolutions.
    pub recent_resolutions: Vec<Resolution>,
    /// Protocol counters for the current year.
    pub protocol_totals: Vec<SequenceStats>,
}

/// A complaint being registered from the mobile client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComplaint {
    pub reporter_id: Uuid,
    pub subject: String,
    pub description: String,
    pub locality: Option<String>,
}

/// Registration result: the stored complaint plus a degraded-number flag
/// so the client can warn that the protocol may be renumbered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredComplaint {
    pub complaint: Complaint,
    /// True when the protocol number came from the degraded local
    /// fallback and awaits reconciliation.
    pub degraded_protocol: bool,
}

/// How many upcoming meetings and recent resolutions the dashboard shows.
const DASHBOARD_LIST_LIMIT: usize = 5;

/// Mobile API aggregation service.
pub struct MobileApiService {
    tables: Arc<dyn TableStore>,
    auth: Arc<dyn AuthProvider>,
    protocols: Arc<dyn ProtocolGeneratorApi>,
    clock: Arc<dyn Clock>,
}

impl MobileApiService {
    pub fn new(
        tables: Arc<dyn TableStore>,
        auth: Arc<dyn AuthProvider>,
        protocols: Arc<dyn ProtocolGeneratorApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tables,
            auth,
            protocols,
            clock,
        }
    }

    /// Resolve the client's bearer token to an authenticated session.
    pub async fn sign_in(&self, token: &str) -> Result<Session, MobileApiError> {
        Ok(self.auth.session(token).await?)
    }

    /// Build the home-screen dashboard from four backend reads.
    pub async fn dashboard(&self) -> Result<MobileDashboard, MobileApiError> {
        let complaints = self
            .tables
            .list_complaints(
                QueryFilter::any(),
                SortOrder::NewestFirst,
                Page {
                    offset: 0,
                    limit: usize::MAX,
                },
            )
            .await?;

        let mut complaints_by_status: Vec<StatusCount> = ComplaintStatus::WORKFLOW
            .iter()
            .map(|status| StatusCount {
                status: status.label().to_string(),
                count: 0,
            })
            .collect();
        let mut open_complaints = 0;
        for complaint in &complaints.rows {
            complaints_by_status[complaint.status.step()].count += 1;
            if complaint.status != ComplaintStatus::Closed {
                open_complaints += 1;
            }
        }

        let next_meetings = self
            .tables
            .upcoming_meetings(self.clock.now_unix(), DASHBOARD_LIST_LIMIT)
            .await?;
        let recent_resolutions = self
            .tables
            .recent_resolutions(DASHBOARD_LIST_LIMIT)
            .await?;
        let protocol_totals = self.protocols.statistics(None).await?;

        Ok(MobileDashboard {
            open_complaints,
            complaints_by_status,
            next_meetings,
            recent_resolutions,
            protocol_totals,
        })
    }

    /// Complaints registered by one user, newest first.
    pub async fn my_complaints(&self, user_id: Uuid) -> Result<Vec<Complaint>, MobileApiError> {
        Ok(self.tables.complaints_for_user(user_id).await?)
    }

    /// Full meeting agenda, soonest first.
    pub async fn agenda(&self, page: Page) -> Result<Paginated<Meeting>, MobileApiError> {
        Ok(self
            .tables
            .list_meetings(QueryFilter::any(), SortOrder::OldestFirst, page)
            .await?)
    }

    /// Resolution listing, newest first.
    pub async fn resolutions(&self, page: Page) -> Result<Paginated<Resolution>, MobileApiError> {
        Ok(self
            .tables
            .list_resolutions(QueryFilter::any(), SortOrder::NewestFirst, page)
            .await?)
    }

    /// Seated council members for the directory screen.
    pub async fn council_members(&self) -> Result<Vec<Councillor>, MobileApiError> {
        Ok(self.tables.list_councillors(true).await?)
    }

    /// Register a complaint: issue an OUV protocol number, insert the row.
    ///
    /// A degraded (fallback) protocol number does not block registration;
    /// it is flagged in the response so the client can warn the citizen.
    pub async fn register_complaint(
        &self,
        new: NewComplaint,
    ) -> Result<RegisteredComplaint, MobileApiError> {
        let issued = self.protocols.generate(ProtocolType::Ombudsman).await?;
        let now = chrono::DateTime::from_timestamp(self.clock.now_unix(), 0)
            .unwrap_or_else(chrono::Utc::now);

        let complaint = Complaint {
            id: Uuid::new_v4(),
            protocol: issued.number.formatted(),
            reporter_id: new.reporter_id,
            subject: new.subject,
            description: new.description,
            status: ComplaintStatus::Registered,
            locality: new.locality,
            created_at: now,
            updated_at: now,
        };
        self.tables.insert_complaint(complaint.clone()).await?;
        info!(
            protocol = %complaint.protocol,
            degraded = issued.is_degraded(),
            "complaint registered"
        );
        Ok(RegisteredComplaint {
            complaint,
            degraded_protocol: issued.is_degraded(),
        })
    }
}
