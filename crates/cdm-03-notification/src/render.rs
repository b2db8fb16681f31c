//! # Message Rendering
//!
//! Pure, localized rendering of a council event into a (subject, body)
//! pair. Templates are fixed per event kind; the protocol number, when
//! present, is always included so the recipient can reference the record.

use shared_types::{CouncilEvent, EventKind};

/// Subject prefix per event kind.
fn subject_prefix(kind: EventKind) -> &'static str {
    match kind {
        EventKind::MeetingScheduled => "Reunião agendada",
        EventKind::ComplaintRegistered => "Nova denúncia registrada",
        EventKind::ResolutionPublished => "Resolução publicada",
        EventKind::DocumentArchived => "Documento arquivado",
    }
}

/// Render an event into a `(subject, body)` pair.
pub fn render_message(event: &CouncilEvent) -> (String, String) {
    let subject = format!("{}: {}", subject_prefix(event.kind), event.subject);
    let body = match &event.protocol {
        Some(protocol) => format!(
            "{} — protocolo {}. Registrado em {}.",
            event.subject,
            protocol,
            event.occurred_at.format("%d/%m/%Y %H:%M")
        ),
        None => format!(
            "{}. Registrado em {}.",
            event.subject,
            event.occurred_at.format("%d/%m/%Y %H:%M")
        ),
    };
    (subject, body)
}
