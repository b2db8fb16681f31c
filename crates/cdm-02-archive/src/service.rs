//! # Archive Service
//!
//! Table-backed document operations plus object-store uploads. All
//! collaborators are constructor-injected.

use std::sync::Arc;

use cdm_backend::{ObjectStore, TableStore};
use chrono::Utc;
use shared_types::{
    ArchivedDocument, BackendError, DocumentStatus, Page, Paginated, QueryFilter, SortOrder,
};
use tracing::info;
use uuid::Uuid;

use crate::dashboard::{summarize, ArchiveDashboard};

/// Metadata for a document being stored.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Protocol number string already issued for this document.
    pub protocol: String,
    /// Kind code (`ATA`, `RES`, `DOC`, ...).
    pub kind: String,
    /// Document title.
    pub title: String,
    /// Year the document belongs to.
    pub year: u16,
    /// Content type of the uploaded bytes.
    pub content_type: String,
}

/// Archive document service.
pub struct ArchiveService {
    tables: Arc<dyn TableStore>,
    objects: Arc<dyn ObjectStore>,
}

impl ArchiveService {
    pub fn new(tables: Arc<dyn TableStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { tables, objects }
    }

    /// List documents matching `filter`.
    pub async fn list(
        &self,
        filter: QueryFilter,
        sort: SortOrder,
        page: Page,
    ) -> Result<Paginated<ArchivedDocument>, BackendError> {
        self.tables.list_documents(filter, sort, page).await
    }

    /// Fetch one document row.
    pub async fn get(&self, id: Uuid) -> Result<ArchivedDocument, BackendError> {
        self.tables.get_document(id).await
    }

    /// Upload a file and insert its document row as a draft.
    pub async fn store_document(
        &self,
        meta: NewDocument,
        bytes: Vec<u8>,
    ) -> Result<ArchivedDocument, BackendError> {
        let id = Uuid::new_v4();
        let storage_key = format!("documents/{}/{}", meta.year, id);
        self.objects
            .put_document(&storage_key, bytes, &meta.content_type)
            .await?;

        let now = Utc::now();
        let document = ArchivedDocument {
            id,
            protocol: meta.protocol,
            kind: meta.kind,
            title: meta.title,
            status: DocumentStatus::Draft,
            year: meta.year,
            storage_key: Some(storage_key),
            created_at: now,
            updated_at: now,
        };
        self.tables.insert_document(document.clone()).await?;
        info!(id = %document.id, protocol = %document.protocol, "document stored");
        Ok(document)
    }

    /// Move a draft to published.
    pub async fn publish(&self, id: Uuid) -> Result<ArchivedDocument, BackendError> {
        self.transition(id, DocumentStatus::Published).await
    }

    /// Retire a published document to the archive.
    pub async fn archive(&self, id: Uuid) -> Result<ArchivedDocument, BackendError> {
        self.transition(id, DocumentStatus::Archived).await
    }

    async fn transition(
        &self,
        id: Uuid,
        target: DocumentStatus,
    ) -> Result<ArchivedDocument, BackendError> {
        let mut document = self.tables.get_document(id).await?;
        if !document.status.can_transition_to(target) {
            return Err(BackendError::Conflict {
                message: format!(
                    "illegal transition {} -> {}",
                    document.status.label(),
                    target.label()
                ),
            });
        }
        document.status = target;
        document.updated_at = Utc::now();
        self.tables.update_document(document.clone()).await?;
        info!(id = %document.id, status = document.status.label(), "document status changed");
        Ok(document)
    }

    /// Download URL for a document's stored file.
    pub async fn document_url(&self, id: Uuid) -> Result<String, BackendError> {
        let key = self.storage_key(id).await?;
        self.objects.document_url(&key).await
    }

    /// Raw bytes of a document's stored file.
    pub async fn download(&self, id: Uuid) -> Result<Vec<u8>, BackendError> {
        let key = self.storage_key(id).await?;
        self.objects.get_document(&key).await
    }

    async fn storage_key(&self, id: Uuid) -> Result<String, BackendError> {
        let document = self.tables.get_document(id).await?;
        document.storage_key.ok_or_else(|| BackendError::NotFound {
            entity: format!("stored file for document {id}"),
        })
    }

    /// Dashboard summary for one year.
    pub async fn dashboard(&self, year: u16) -> Result<ArchiveDashboard, BackendError> {
        let all = self
            .tables
            .list_documents(
                QueryFilter::for_year(year),
                SortOrder::NewestFirst,
                Page {
                    offset: 0,
                    limit: usize::MAX,
                },
            )
            .await?;
        Ok(summarize(year, &all.rows))
    }
}
