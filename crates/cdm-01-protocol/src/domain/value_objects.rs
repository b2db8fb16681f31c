//! # Value Objects
//!
//! Immutable protocol-number value objects and the pure parsing,
//! formatting, and validation logic behind them.

use serde::{Deserialize, Serialize};

/// Highest sequence the generator will issue for one `(type, year)`.
///
/// Three-digit formatting widens to four digits past 999; past this
/// bound the generator refuses to issue instead of wrapping.
pub const MAX_SEQUENCE: u32 = 9999;

/// Modulus for the degraded local fallback (timestamp-derived).
pub const FALLBACK_MODULUS: i64 = 1000;

/// Suffix marking a fallback-issued, not-yet-reconciled number.
const PROVISIONAL_SUFFIX: &str = "-P";

/// Recognized protocol type codes.
///
/// The set is closed: a string with an unknown code parses to `None`
/// even when it matches the general pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolType {
    /// Administrative process (`PROC`).
    #[serde(rename = "PROC")]
    Process,
    /// Council resolution (`RES`).
    #[serde(rename = "RES")]
    Resolution,
    /// Ombudsman complaint (`OUV`).
    #[serde(rename = "OUV")]
    Ombudsman,
    /// Council meeting (`REU`).
    #[serde(rename = "REU")]
    Meeting,
    /// Meeting minutes (`ATA`).
    #[serde(rename = "ATA")]
    Minutes,
    /// Meeting convocation (`CONV`).
    #[serde(rename = "CONV")]
    Convocation,
    /// Generic document (`DOC`).
    #[serde(rename = "DOC")]
    Document,
    /// Project (`PROJ`).
    #[serde(rename = "PROJ")]
    Project,
    /// Report (`REL`).
    #[serde(rename = "REL")]
    Report,
    /// Notification (`NOT`).
    #[serde(rename = "NOT")]
    Notification,
}

impl ProtocolType {
    /// Every recognized type, in code order.
    pub const ALL: [ProtocolType; 10] = [
        ProtocolType::Minutes,
        ProtocolType::Convocation,
        ProtocolType::Document,
        ProtocolType::Notification,
        ProtocolType::Ombudsman,
        ProtocolType::Process,
        ProtocolType::Project,
        ProtocolType::Report,
        ProtocolType::Resolution,
        ProtocolType::Meeting,
    ];

    /// The wire code for this type.
    pub fn code(self) -> &'static str {
        match self {
            ProtocolType::Process => "PROC",
            ProtocolType::Resolution => "RES",
            ProtocolType::Ombudsman => "OUV",
            ProtocolType::Meeting => "REU",
            ProtocolType::Minutes => "ATA",
            ProtocolType::Convocation => "CONV",
            ProtocolType::Document => "DOC",
            ProtocolType::Project => "PROJ",
            ProtocolType::Report => "REL",
            ProtocolType::Notification => "NOT",
        }
    }

    /// Look up a type by its wire code.
    pub fn from_code(code: &str) -> Option<ProtocolType> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }
}

impl std::fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A structured protocol number.
///
/// Immutable once constructed; `formatted()` is the canonical string
/// representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolNumber {
    /// Recognized type code.
    pub protocol_type: ProtocolType,
    /// Four-digit calendar year.
    pub year: u16,
    /// Positive sequence within the `(type, year)` counter.
    pub sequence: u32,
    /// Whether this number came from the degraded local fallback and has
    /// not been reconciled against the backend.
    pub provisional: bool,
}

impl ProtocolNumber {
    /// A backend-issued (permanent) number.
    pub fn permanent(protocol_type: ProtocolType, year: u16, sequence: u32) -> Self {
        Self {
            protocol_type,
            year,
            sequence,
            provisional: false,
        }
    }

    /// A fallback-issued provisional number.
    pub fn provisional(protocol_type: ProtocolType, year: u16, sequence: u32) -> Self {
        Self {
            protocol_type,
            year,
            sequence,
            provisional: true,
        }
    }

    /// Canonical string form: `TYPE-NNN/YYYY`, zero-padded to three
    /// digits (widening naturally past 999), with the reserved `-P`
    /// suffix on provisional numbers.
    pub fn formatted(&self) -> String {
        let base = format!(
            "{}-{:03}/{:04}",
            self.protocol_type.code(),
            self.sequence,
            self.year
        );
        if self.provisional {
            format!("{base}{PROVISIONAL_SUFFIX}")
        } else {
            base
        }
    }
}

impl std::fmt::Display for ProtocolNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// Where an issued number came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Issued by the backend's atomic counter; unique by construction.
    Backend,
    /// Issued by the degraded local fallback; uniqueness not guaranteed,
    /// queued for reconciliation.
    LocalFallback,
}

/// The result of a generate call: the number plus where it came from.
///
/// Callers that care about the degraded path check [`Self::is_degraded`]
/// and warn; callers that only need the string use the number directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedProtocol {
    /// The issued number.
    pub number: ProtocolNumber,
    /// Backend or local fallback.
    pub provenance: Provenance,
}

impl IssuedProtocol {
    /// True when this number came from the local fallback and may need
    /// manual deduplication before being treated as permanent.
    pub fn is_degraded(&self) -> bool {
        self.provenance == Provenance::LocalFallback
    }
}

/// Pure syntactic check of the canonical wire pattern
/// `TYPE-NNN/YYYY` (2-4 uppercase letters, exactly three digits, four
/// digit year).
///
/// Independent of type recognition: `XYZ-001/2025` is format-valid even
/// though `XYZ` is not a recognized type. Provisional `-P` strings are
/// deliberately not canonical and return false.
pub fn validate_format(input: &str) -> bool {
    let Some((code, rest)) = input.split_once('-') else {
        return false;
    };
    let Some((sequence, year)) = rest.split_once('/') else {
        return false;
    };
    (2..=4).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_uppercase())
        && sequence.len() == 3
        && sequence.bytes().all(|b| b.is_ascii_digit())
        && year.len() == 4
        && year.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a protocol string back into structured fields.
///
/// Stricter than [`validate_format`] on the type (it must be recognized)
/// and looser on the sequence (3-4 digits, so field-widened numbers past
/// 999 round-trip). Accepts the provisional `-P` suffix. Returns `None`
/// on any mismatch; never panics.
pub fn parse_protocol(input: &str) -> Option<ProtocolNumber> {
    let (body, provisional) = match input.strip_suffix(PROVISIONAL_SUFFIX) {
        Some(body) => (body, true),
        None => (input, false),
    };
    let (code, rest) = body.split_once('-')?;
    let (sequence, year) = rest.split_once('/')?;

    if !(2..=4).contains(&code.len()) || !code.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    if !(3..=4).contains(&sequence.len()) || !sequence.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let protocol_type = ProtocolType::from_code(code)?;
    let sequence: u32 = sequence.parse().ok()?;
    let year: u16 = year.parse().ok()?;
    if sequence == 0 || sequence > MAX_SEQUENCE {
        return None;
    }

    Some(ProtocolNumber {
        protocol_type,
        year,
        sequence,
        provisional,
    })
}
