//! # Concurrency Tests
//!
//! Verifies the numbering uniqueness guarantee against the backend's
//! atomic increment, not the client fallback: concurrent generate calls
//! over a shared backend must never return the same formatted string.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use cdm_01_protocol::{
        FixedClock, ProtocolGeneratorApi, ProtocolService, ProtocolType, Provenance,
        RpcSequenceCounter,
    };
    use cdm_backend::InMemoryBackend;

    // 2025-06-15T12:00:00Z
    const MID_2025: i64 = 1_749_988_800;

    fn shared_service(backend: &Arc<InMemoryBackend>) -> Arc<ProtocolService> {
        crate::init_tracing();
        Arc::new(ProtocolService::new(
            Arc::new(RpcSequenceCounter::new(Arc::clone(backend) as _)),
            Arc::new(FixedClock::new(MID_2025)),
        ))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_generate_never_duplicates() {
        const TASKS: usize = 64;

        let backend = Arc::new(InMemoryBackend::new());
        let service = shared_service(&backend);

        let mut handles = Vec::with_capacity(TASKS);
        for _ in 0..TASKS {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.generate(ProtocolType::Process).await.unwrap()
            }));
        }

        let mut formatted = HashSet::new();
        let mut sequences = Vec::new();
        for handle in handles {
            let issued = handle.await.unwrap();
            assert_eq!(issued.provenance, Provenance::Backend);
            assert!(
                formatted.insert(issued.number.formatted()),
                "duplicate protocol issued: {}",
                issued.number
            );
            sequences.push(issued.number.sequence);
        }

        // Gap-free across the whole concurrent batch
        sequences.sort_unstable();
        let expected: Vec<u32> = (1..=TASKS as u32).collect();
        assert_eq!(sequences, expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_generate_across_types_stays_scoped() {
        const PER_TYPE: usize = 20;

        let backend = Arc::new(InMemoryBackend::new());
        let service = shared_service(&backend);

        let mut handles = Vec::new();
        for protocol_type in [
            ProtocolType::Process,
            ProtocolType::Resolution,
            ProtocolType::Ombudsman,
        ] {
            for _ in 0..PER_TYPE {
                let service = Arc::clone(&service);
                handles.push(tokio::spawn(async move {
                    service.generate(protocol_type).await.unwrap()
                }));
            }
        }

        let mut by_type: std::collections::HashMap<&str, Vec<u32>> =
            std::collections::HashMap::new();
        for handle in handles {
            let issued = handle.await.unwrap();
            by_type
                .entry(issued.number.protocol_type.code())
                .or_default()
                .push(issued.number.sequence);
        }

        // Each type got its own contiguous 1..=PER_TYPE range
        for (code, mut sequences) in by_type {
            sequences.sort_unstable();
            let expected: Vec<u32> = (1..=PER_TYPE as u32).collect();
            assert_eq!(sequences, expected, "sequence gap for type {code}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_peek_and_generate_interleaved() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = shared_service(&backend);

        let mut generate_handles = Vec::new();
        let mut peek_handles = Vec::new();
        for _ in 0..16 {
            let s = Arc::clone(&service);
            generate_handles.push(tokio::spawn(async move {
                s.generate(ProtocolType::Minutes).await.unwrap()
            }));
            let s = Arc::clone(&service);
            peek_handles.push(tokio::spawn(async move {
                s.peek_next(ProtocolType::Minutes).await.unwrap()
            }));
        }

        let mut formatted = HashSet::new();
        for handle in generate_handles {
            let issued = handle.await.unwrap();
            assert!(formatted.insert(issued.number.formatted()));
        }
        // Peeks never consumed a sequence: exactly 16 were issued
        for handle in peek_handles {
            handle.await.unwrap();
        }
        let next = service.peek_next(ProtocolType::Minutes).await.unwrap();
        assert_eq!(next.sequence, 17);
    }
}
