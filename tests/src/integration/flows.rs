//! # Integration Test Flows
//!
//! Cross-subsystem flows over one shared in-memory backend: protocol
//! issuance end to end, the degraded fallback with reconciliation,
//! audited resets, and the mobile → notification → archive choreography.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    // Shared infrastructure
    use cdm_backend::{InMemoryBackend, TableStore};
    use shared_types::{
        ComplaintStatus, CouncilEvent, EventKind, NotificationChannel, NotificationRule, Role,
        Session,
    };

    // Subsystem 1: Protocol Generator
    use cdm_01_protocol::{
        parse_protocol, validate_format, FixedClock, ProtocolGeneratorApi, ProtocolService,
        ProtocolType, RpcSequenceCounter,
    };

    // Subsystem 2: Archive
    use cdm_02_archive::{ArchiveService, NewDocument};

    // Subsystem 3: Notification
    use cdm_03_notification::NotificationService;

    // Subsystem 4: Mobile API
    use cdm_04_mobile_api::{MobileApiService, NewComplaint};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    // 2025-06-15T12:00:00Z
    const MID_2025: i64 = 1_749_988_800;

    struct Fixture {
        backend: Arc<InMemoryBackend>,
        clock: Arc<FixedClock>,
        protocols: Arc<ProtocolService>,
    }

    fn fixture() -> Fixture {
        crate::init_tracing();
        let backend = Arc::new(InMemoryBackend::new());
        backend.set_now_unix(MID_2025);
        let clock = Arc::new(FixedClock::new(MID_2025));
        let protocols = Arc::new(ProtocolService::new(
            Arc::new(RpcSequenceCounter::new(Arc::clone(&backend) as _)),
            Arc::clone(&clock) as _,
        ));
        Fixture {
            backend,
            clock,
            protocols,
        }
    }

    fn admin_session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            name: "Secretaria Executiva".into(),
            role: Role::Admin,
        }
    }

    // =============================================================================
    // PROTOCOL GENERATION END TO END
    // =============================================================================

    /// Three resolutions in the same year number 001, 002, 003 in
    /// issuance order.
    #[tokio::test]
    async fn test_three_resolutions_number_in_order() {
        let fx = fixture();

        let mut formatted = Vec::new();
        for _ in 0..3 {
            let issued = fx.protocols.generate(ProtocolType::Resolution).await.unwrap();
            formatted.push(issued.number.formatted());
        }
        assert_eq!(
            formatted,
            vec!["RES-001/2025", "RES-002/2025", "RES-003/2025"]
        );

        // Every issued string is canonical and parses back to its fields
        for (i, s) in formatted.iter().enumerate() {
            assert!(validate_format(s));
            let parsed = parse_protocol(s).unwrap();
            assert_eq!(parsed.protocol_type, ProtocolType::Resolution);
            assert_eq!(parsed.year, 2025);
            assert_eq!(parsed.sequence, i as u32 + 1);
        }
    }

    /// Outage: generate falls back to a provisional number; after the
    /// backend returns, reconcile replaces it with a permanent one.
    #[tokio::test]
    async fn test_degraded_issue_then_reconcile() {
        let fx = fixture();

        // A permanent number exists before the outage
        fx.protocols.generate(ProtocolType::Ombudsman).await.unwrap();

        fx.backend.set_available(false);
        let degraded = fx.protocols.generate(ProtocolType::Ombudsman).await.unwrap();
        assert!(degraded.is_degraded());
        assert!(degraded.number.formatted().ends_with("-P"));
        // Provisional strings are parseable but never format-canonical
        assert!(parse_protocol(&degraded.number.formatted()).is_some());
        assert!(!validate_format(&degraded.number.formatted()));

        fx.backend.set_available(true);
        let reconciled = fx.protocols.reconcile().await;
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].provisional, degraded.number);
        // The replacement continues the backend sequence
        assert_eq!(reconciled[0].permanent.formatted(), "OUV-002/2025");
        assert!(fx.protocols.pending_reconciliation().is_empty());
    }

    /// Reset: audited, admin-only, next issue restarts at 001.
    #[tokio::test]
    async fn test_reset_flow_restarts_numbering() {
        let fx = fixture();

        fx.protocols.generate(ProtocolType::Process).await.unwrap();
        fx.protocols.generate(ProtocolType::Process).await.unwrap();
        fx.protocols.generate(ProtocolType::Process).await.unwrap();

        let audit = fx
            .protocols
            .reset_sequence(ProtocolType::Process, None, &admin_session())
            .await
            .unwrap();
        assert_eq!(audit.previous_sequence, 3);

        let issued = fx.protocols.generate(ProtocolType::Process).await.unwrap();
        assert_eq!(issued.number.formatted(), "PROC-001/2025");

        // Statistics still remember the full issuance history
        let stats = fx.protocols.statistics(Some(2025)).await.unwrap();
        let proc = stats
            .iter()
            .find(|s| s.protocol_type == ProtocolType::Process)
            .unwrap();
        assert_eq!(proc.total_issued, 4);
        assert_eq!(proc.last_sequence, 1);
    }

    /// Year rollover: the new year starts at 001, the old year's counter
    /// and statistics stay intact.
    #[tokio::test]
    async fn test_year_rollover_flow() {
        let fx = fixture();

        fx.protocols.generate(ProtocolType::Minutes).await.unwrap();
        fx.protocols.generate(ProtocolType::Minutes).await.unwrap();

        // 2026-01-02T00:00:00Z
        fx.clock.set(1_767_312_000);
        let first_2026 = fx.protocols.generate(ProtocolType::Minutes).await.unwrap();
        assert_eq!(first_2026.number.formatted(), "ATA-001/2026");

        let stats_2025 = fx.protocols.statistics(Some(2025)).await.unwrap();
        assert_eq!(stats_2025[0].last_sequence, 2);
    }

    // =============================================================================
    // CROSS-SUBSYSTEM CHOREOGRAPHY
    // =============================================================================

    /// Mobile registration → workflow advance → notification dispatch.
    #[tokio::test]
    async fn test_complaint_lifecycle_with_notifications() {
        let fx = fixture();
        let mobile = MobileApiService::new(
            Arc::clone(&fx.backend) as _,
            Arc::clone(&fx.backend) as _,
            Arc::clone(&fx.protocols) as _,
            Arc::clone(&fx.clock) as _,
        );
        let notifications = NotificationService::new(
            Arc::clone(&fx.backend) as _,
            Arc::clone(&fx.backend) as _,
        );

        // Admin signs in and wires a rule: complaint registrations reach
        // councillors
        fx.backend.register_session("tok-admin", admin_session());
        let admin = mobile.sign_in("tok-admin").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        notifications
            .upsert_rule(
                NotificationRule {
                    id: Uuid::new_v4(),
                    event: EventKind::ComplaintRegistered,
                    channels: vec![NotificationChannel::Email],
                    recipient_roles: vec![Role::Councillor],
                    enabled: true,
                },
                &admin,
            )
            .await
            .unwrap();

        // Citizen registers a complaint from the mobile client
        let registered = mobile
            .register_complaint(NewComplaint {
                reporter_id: Uuid::new_v4(),
                subject: "Desmatamento em nascente".into(),
                description: "Corte raso próximo à nascente do ribeirão".into(),
                locality: Some("Distrito Norte".into()),
            })
            .await
            .unwrap();
        assert_eq!(registered.complaint.protocol, "OUV-001/2025");

        // The registration event goes out to the configured recipients
        let report = notifications
            .notify(&CouncilEvent {
                kind: EventKind::ComplaintRegistered,
                subject: registered.complaint.subject.clone(),
                protocol: Some(registered.complaint.protocol.clone()),
                occurred_at: Utc::now(),
            })
            .await
            .unwrap();
        assert_eq!(report.matched_rules, 1);
        assert!(!report.has_failures());

        let dispatched = fx.backend.dispatched();
        assert_eq!(dispatched.len(), 1);
        assert!(dispatched[0].body.contains("OUV-001/2025"));

        // The workflow advances one step at a time
        let advanced = fx
            .backend
            .update_complaint_status(registered.complaint.id, ComplaintStatus::UnderReview)
            .await
            .unwrap();
        assert_eq!(advanced.status, ComplaintStatus::UnderReview);
    }

    /// Archive a set of minutes: protocol issue, upload, publish,
    /// dashboard visibility.
    #[tokio::test]
    async fn test_minutes_archival_flow() {
        let fx = fixture();
        let archive = ArchiveService::new(
            Arc::clone(&fx.backend) as _,
            Arc::clone(&fx.backend) as _,
        );

        let issued = fx.protocols.generate(ProtocolType::Minutes).await.unwrap();
        let stored = archive
            .store_document(
                NewDocument {
                    protocol: issued.number.formatted(),
                    kind: "ATA".into(),
                    title: "Ata da 7ª reunião ordinária".into(),
                    year: 2025,
                    content_type: "application/pdf".into(),
                },
                b"%PDF-1.7 ata".to_vec(),
            )
            .await
            .unwrap();

        archive.publish(stored.id).await.unwrap();

        let dashboard = archive.dashboard(2025).await.unwrap();
        assert_eq!(dashboard.total, 1);
        assert_eq!(dashboard.by_kind[0].kind, "ATA");

        let url = archive.document_url(stored.id).await.unwrap();
        assert!(url.contains("documents/2025"));
    }
}
