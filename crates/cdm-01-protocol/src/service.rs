//! # Protocol Service
//!
//! Orchestrates the generator operations over the outbound ports:
//! backend-first generation with the degraded local fallback, the
//! provisional reconciliation queue, statistics mapping, and audited
//! resets.

use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::{Role, Session};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    IssuedProtocol, ProtocolError, ProtocolNumber, ProtocolType, Provenance, Reconciliation,
    ResetAudit, SequenceStats, FALLBACK_MODULUS, MAX_SEQUENCE,
};
use crate::ports::{Clock, ProtocolGeneratorApi, SequenceCounter};

/// Protocol generator service.
///
/// All collaborators are constructor-injected; there is no ambient
/// backend handle. Share via `Arc`.
pub struct ProtocolService {
    counter: Arc<dyn SequenceCounter>,
    clock: Arc<dyn Clock>,
    /// Fallback-issued numbers awaiting a backend replacement.
    pending: Mutex<Vec<ProtocolNumber>>,
    /// Audit trail of counter resets, newest last.
    audits: Mutex<Vec<ResetAudit>>,
}

impl ProtocolService {
    pub fn new(counter: Arc<dyn SequenceCounter>, clock: Arc<dyn Clock>) -> Self {
        Self {
            counter,
            clock,
            pending: Mutex::new(Vec::new()),
            audits: Mutex::new(Vec::new()),
        }
    }

    /// Provisional numbers still awaiting reconciliation.
    pub fn pending_reconciliation(&self) -> Vec<ProtocolNumber> {
        self.pending.lock().clone()
    }

    /// Reset audit records, oldest first.
    pub fn reset_audit_log(&self) -> Vec<ResetAudit> {
        self.audits.lock().clone()
    }

    /// Derive the degraded fallback sequence from the current timestamp.
    ///
    /// Timestamp modulo 1000, clamped away from zero so the result is a
    /// valid sequence. Not collision-free across clients; the caller
    /// marks the number provisional.
    fn fallback_sequence(&self) -> u32 {
        let seq = self.clock.now_unix().rem_euclid(FALLBACK_MODULUS);
        seq.max(1) as u32
    }
}

#[async_trait::async_trait]
impl ProtocolGeneratorApi for ProtocolService {
    async fn generate(
        &self,
        protocol_type: ProtocolType,
    ) -> Result<IssuedProtocol, ProtocolError> {
        let year = self.clock.current_year();
        match self.counter.next(protocol_type.code(), year).await {
            Ok(sequence) => {
                if sequence > MAX_SEQUENCE {
                    return Err(ProtocolError::SequenceExhausted {
                        protocol_type,
                        year,
                        max: MAX_SEQUENCE,
                    });
                }
                let number = ProtocolNumber::permanent(protocol_type, year, sequence);
                info!(protocol = %number, "protocol issued");
                Ok(IssuedProtocol {
                    number,
                    provenance: Provenance::Backend,
                })
            }
            Err(err) => {
                let number =
                    ProtocolNumber::provisional(protocol_type, year, self.fallback_sequence());
                warn!(
                    protocol = %number,
                    error = %err,
                    "backend unavailable, issued provisional fallback number"
                );
                self.pending.lock().push(number);
                Ok(IssuedProtocol {
                    number,
                    provenance: Provenance::LocalFallback,
                })
            }
        }
    }

    async fn peek_next(
        &self,
        protocol_type: ProtocolType,
    ) -> Result<ProtocolNumber, ProtocolError> {
        let year = self.clock.current_year();
        let sequence = self.counter.peek(protocol_type.code(), year).await?;
        if sequence > MAX_SEQUENCE {
            return Err(ProtocolError::SequenceExhausted {
                protocol_type,
                year,
                max: MAX_SEQUENCE,
            });
        }
        Ok(ProtocolNumber::permanent(protocol_type, year, sequence))
    }

    async fn statistics(&self, year: Option<u16>) -> Result<Vec<SequenceStats>, ProtocolError> {
        let year = year.or(Some(self.clock.current_year()));
        let rows = self.counter.stats(year).await?;
        let mut stats: Vec<SequenceStats> = rows
            .into_iter()
            .filter_map(|row| {
                // Rows with codes outside the recognized set are skipped,
                // not errors: old data may predate the current type list.
                let protocol_type = ProtocolType::from_code(&row.type_code)?;
                Some(SequenceStats {
                    protocol_type,
                    year: row.year,
                    total_issued: row.total_issued,
                    last_sequence: row.last_sequence,
                    last_updated: row.last_updated,
                })
            })
            .collect();
        stats.sort_by(|a, b| {
            (a.year, a.protocol_type.code()).cmp(&(b.year, b.protocol_type.code()))
        });
        Ok(stats)
    }

    async fn reset_sequence(
        &self,
        protocol_type: ProtocolType,
        year: Option<u16>,
        requested_by: &Session,
    ) -> Result<ResetAudit, ProtocolError> {
        if requested_by.role != Role::Admin {
            return Err(ProtocolError::NotAuthorized {
                action: format!("reset {} sequence", protocol_type.code()),
            });
        }
        let year = year.unwrap_or_else(|| self.clock.current_year());
        let previous_sequence = self.counter.reset(protocol_type.code(), year).await?;
        let audit = ResetAudit {
            audit_id: Uuid::new_v4(),
            protocol_type,
            year,
            previous_sequence,
            requested_by: requested_by.user_id,
            requested_by_name: requested_by.name.clone(),
            at: self.clock.now_unix(),
        };
        info!(
            audit_id = %audit.audit_id,
            type_code = protocol_type.code(),
            year,
            previous_sequence,
            requested_by = %requested_by.name,
            "sequence counter reset"
        );
        self.audits.lock().push(audit.clone());
        Ok(audit)
    }

    async fn reconcile(&self) -> Vec<Reconciliation> {
        let queued: Vec<ProtocolNumber> = std::mem::take(&mut *self.pending.lock());
        if queued.is_empty() {
            return Vec::new();
        }

        let mut done = Vec::new();
        let mut still_pending = Vec::new();

        for provisional in queued {
            // The backend number is authoritative; a provisional number
            // is never promoted, only replaced. The replacement is drawn
            // from the provisional's own year so a number issued in
            // December does not migrate into January's counter.
            match self
                .counter
                .next(provisional.protocol_type.code(), provisional.year)
                .await
            {
                Ok(sequence) if sequence <= MAX_SEQUENCE => {
                    let permanent = ProtocolNumber::permanent(
                        provisional.protocol_type,
                        provisional.year,
                        sequence,
                    );
                    info!(
                        provisional = %provisional,
                        permanent = %permanent,
                        "provisional protocol reconciled"
                    );
                    done.push(Reconciliation {
                        provisional,
                        permanent,
                    });
                }
                Ok(_) => {
                    warn!(provisional = %provisional, "counter exhausted, left for manual review");
                    still_pending.push(provisional);
                }
                Err(err) => {
                    warn!(provisional = %provisional, error = %err, "reconciliation deferred");
                    still_pending.push(provisional);
                }
            }
        }

        if !still_pending.is_empty() {
            self.pending.lock().extend(still_pending);
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FixedClock;
    use crate::ports::CounterSnapshot;
    use shared_types::BackendError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Counter double with a switchable failure mode.
    struct TestCounter {
        counters: Mutex<HashMap<(String, u16), u32>>,
        available: AtomicBool,
    }

    impl TestCounter {
        fn new() -> Self {
            Self {
                counters: Mutex::new(HashMap::new()),
                available: AtomicBool::new(true),
            }
        }

        fn set_available(&self, available: bool) {
            self.available.store(available, Ordering::SeqCst);
        }

        /// Force a counter to `value`, for exhaustion tests.
        fn seed(&self, type_code: &str, year: u16, value: u32) {
            self.counters
                .lock()
                .insert((type_code.to_string(), year), value);
        }

        fn check(&self) -> Result<(), BackendError> {
            if self.available.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(BackendError::Unavailable {
                    message: "test counter offline".into(),
                })
            }
        }
    }

    #[async_trait::async_trait]
    impl SequenceCounter for TestCounter {
        async fn next(&self, type_code: &str, year: u16) -> Result<u32, BackendError> {
            self.check()?;
            let mut counters = self.counters.lock();
            let seq = counters.entry((type_code.to_string(), year)).or_insert(0);
            *seq += 1;
            Ok(*seq)
        }

        async fn peek(&self, type_code: &str, year: u16) -> Result<u32, BackendError> {
            self.check()?;
            let counters = self.counters.lock();
            Ok(counters
                .get(&(type_code.to_string(), year))
                .copied()
                .unwrap_or(0)
                + 1)
        }

        async fn stats(&self, year: Option<u16>) -> Result<Vec<CounterSnapshot>, BackendError> {
            self.check()?;
            let counters = self.counters.lock();
            Ok(counters
                .iter()
                .filter(|((_, y), _)| year.map(|w| *y == w).unwrap_or(true))
                .map(|((code, y), seq)| CounterSnapshot {
                    type_code: code.clone(),
                    year: *y,
                    total_issued: u64::from(*seq),
                    last_sequence: *seq,
                    last_updated: 0,
                })
                .collect())
        }

        async fn reset(&self, type_code: &str, year: u16) -> Result<u32, BackendError> {
            self.check()?;
            let mut counters = self.counters.lock();
            let seq = counters.entry((type_code.to_string(), year)).or_insert(0);
            let previous = *seq;
            *seq = 0;
            Ok(previous)
        }
    }

    fn service_with(counter: Arc<TestCounter>, clock: Arc<FixedClock>) -> ProtocolService {
        ProtocolService::new(counter, clock)
    }

    fn admin_session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            name: "Admin".into(),
            role: Role::Admin,
        }
    }

    // 2025-06-15T12:00:00Z
    const MID_2025: i64 = 1_749_988_800;

    #[tokio::test]
    async fn test_serial_generation_is_gap_free() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(counter, Arc::new(FixedClock::new(MID_2025)));

        for expected in 1..=5u32 {
            let issued = service.generate(ProtocolType::Resolution).await.unwrap();
            assert_eq!(issued.number.sequence, expected);
            assert_eq!(issued.provenance, Provenance::Backend);
        }
    }

    #[tokio::test]
    async fn test_generate_round_trips_through_parse() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(counter, Arc::new(FixedClock::new(MID_2025)));

        let issued = service.generate(ProtocolType::Minutes).await.unwrap();
        let parsed = crate::domain::parse_protocol(&issued.number.formatted()).unwrap();
        assert_eq!(parsed.protocol_type, ProtocolType::Minutes);
        assert_eq!(parsed.year, 2025);
        assert_eq!(parsed, issued.number);
    }

    #[tokio::test]
    async fn test_peek_does_not_advance() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(counter, Arc::new(FixedClock::new(MID_2025)));

        let peeked = service.peek_next(ProtocolType::Process).await.unwrap();
        assert_eq!(peeked.formatted(), "PROC-001/2025");
        let peeked_again = service.peek_next(ProtocolType::Process).await.unwrap();
        assert_eq!(peeked_again.sequence, 1);

        let issued = service.generate(ProtocolType::Process).await.unwrap();
        assert_eq!(issued.number.sequence, 1);
    }

    #[tokio::test]
    async fn test_fallback_is_provisional_and_queued() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(Arc::clone(&counter), Arc::new(FixedClock::new(MID_2025)));
        counter.set_available(false);

        let issued = service.generate(ProtocolType::Ombudsman).await.unwrap();
        assert!(issued.is_degraded());
        assert!(issued.number.provisional);
        assert!(issued.number.formatted().ends_with("-P"));
        assert_eq!(service.pending_reconciliation().len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_replaces_provisional_with_backend_number() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(Arc::clone(&counter), Arc::new(FixedClock::new(MID_2025)));

        counter.set_available(false);
        let degraded = service.generate(ProtocolType::Ombudsman).await.unwrap();
        counter.set_available(true);

        let reconciled = service.reconcile().await;
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].provisional, degraded.number);
        assert!(!reconciled[0].permanent.provisional);
        assert_eq!(reconciled[0].permanent.formatted(), "OUV-001/2025");
        assert!(service.pending_reconciliation().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_keeps_unserved_numbers_queued() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(Arc::clone(&counter), Arc::new(FixedClock::new(MID_2025)));

        counter.set_available(false);
        service.generate(ProtocolType::Ombudsman).await.unwrap();

        // Backend still down: nothing reconciles, queue intact
        let reconciled = service.reconcile().await;
        assert!(reconciled.is_empty());
        assert_eq!(service.pending_reconciliation().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_fails_past_max_sequence() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(Arc::clone(&counter), Arc::new(FixedClock::new(MID_2025)));

        counter.seed("PROC", 2025, MAX_SEQUENCE);
        let err = service.generate(ProtocolType::Process).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::SequenceExhausted { year: 2025, .. }
        ));
        // Exhaustion is not an outage: nothing gets a fallback number
        assert!(service.pending_reconciliation().is_empty());
    }

    #[tokio::test]
    async fn test_peek_fails_past_max_sequence() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(Arc::clone(&counter), Arc::new(FixedClock::new(MID_2025)));

        counter.seed("PROC", 2025, MAX_SEQUENCE);
        let err = service.peek_next(ProtocolType::Process).await.unwrap_err();
        assert!(matches!(err, ProtocolError::SequenceExhausted { .. }));
    }

    #[tokio::test]
    async fn test_reconcile_leaves_provisional_when_counter_exhausted() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(Arc::clone(&counter), Arc::new(FixedClock::new(MID_2025)));

        counter.set_available(false);
        service.generate(ProtocolType::Ombudsman).await.unwrap();
        counter.set_available(true);
        counter.seed("OUV", 2025, MAX_SEQUENCE);

        // The backend answers but cannot serve a valid number: the
        // provisional stays queued for manual review.
        let reconciled = service.reconcile().await;
        assert!(reconciled.is_empty());
        assert_eq!(service.pending_reconciliation().len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_stays_in_the_provisional_year() {
        let counter = Arc::new(TestCounter::new());
        let clock = Arc::new(FixedClock::new(MID_2025));
        let service = service_with(Arc::clone(&counter), Arc::clone(&clock));

        counter.set_available(false);
        let degraded = service.generate(ProtocolType::Ombudsman).await.unwrap();
        assert_eq!(degraded.number.year, 2025);

        // Rollover happens before the backend comes back
        // (2026-01-02T00:00:00Z)
        clock.set(1_767_312_000);
        counter.set_available(true);

        let reconciled = service.reconcile().await;
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].permanent.year, 2025);
        assert_eq!(reconciled[0].permanent.formatted(), "OUV-001/2025");
        // The new year's counter was never touched
        let stats_2026 = service.statistics(Some(2026)).await.unwrap();
        assert!(stats_2026.is_empty());
    }

    #[tokio::test]
    async fn test_reset_requires_admin() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(counter, Arc::new(FixedClock::new(MID_2025)));

        let citizen = Session {
            user_id: Uuid::new_v4(),
            name: "Citizen".into(),
            role: Role::Citizen,
        };
        let err = service
            .reset_sequence(ProtocolType::Process, None, &citizen)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::NotAuthorized { .. }));
    }

    #[tokio::test]
    async fn test_reset_restarts_at_one_and_audits() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(counter, Arc::new(FixedClock::new(MID_2025)));

        service.generate(ProtocolType::Meeting).await.unwrap();
        service.generate(ProtocolType::Meeting).await.unwrap();

        let audit = service
            .reset_sequence(ProtocolType::Meeting, None, &admin_session())
            .await
            .unwrap();
        assert_eq!(audit.previous_sequence, 2);
        assert_eq!(audit.year, 2025);

        let issued = service.generate(ProtocolType::Meeting).await.unwrap();
        assert_eq!(issued.number.formatted(), "REU-001/2025");
        assert_eq!(service.reset_audit_log().len(), 1);
    }

    #[tokio::test]
    async fn test_year_rollover_starts_fresh_counter() {
        let counter = Arc::new(TestCounter::new());
        let clock = Arc::new(FixedClock::new(MID_2025));
        let service = service_with(Arc::clone(&counter), Arc::clone(&clock));

        service.generate(ProtocolType::Process).await.unwrap();
        service.generate(ProtocolType::Process).await.unwrap();

        // 2026-01-02T00:00:00Z
        clock.set(1_767_312_000);
        let issued = service.generate(ProtocolType::Process).await.unwrap();
        assert_eq!(issued.number.year, 2026);
        assert_eq!(issued.number.sequence, 1);

        // The 2025 counter is untouched
        let stats_2025 = service.statistics(Some(2025)).await.unwrap();
        assert_eq!(stats_2025.len(), 1);
        assert_eq!(stats_2025[0].last_sequence, 2);
    }

    #[tokio::test]
    async fn test_statistics_default_to_current_year() {
        let counter = Arc::new(TestCounter::new());
        let service = service_with(counter, Arc::new(FixedClock::new(MID_2025)));

        service.generate(ProtocolType::Process).await.unwrap();
        service.generate(ProtocolType::Resolution).await.unwrap();
        service.generate(ProtocolType::Resolution).await.unwrap();

        let stats = service.statistics(None).await.unwrap();
        assert_eq!(stats.len(), 2);
        // Ordered by type code: PROC before RES
        assert_eq!(stats[0].protocol_type, ProtocolType::Process);
        assert_eq!(stats[1].protocol_type, ProtocolType::Resolution);
        assert_eq!(stats[1].last_sequence, 2);
    }
}
