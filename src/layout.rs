// 📋 Layout Registry - Portaria 671 / Portaria 1510 record tables
// Each regulatory layout is a static LayoutSpec value: record codes, minimum lengths
// and field offsets. Validators read these tables instead of branching per layout.

use crate::error::AfdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CONSTANTS
// ============================================================================

/// NSR (número sequencial de registro) width at the start of every line
pub const NSR_LEN: usize = 9;

/// Offset of the record type code
pub const TYPE_OFFSET: usize = 9;

/// NSR value carried by every header record
pub const HEADER_SENTINEL: &str = "000000000";

/// NSR value carried by the trailer record
pub const TRAILER_SENTINEL: &str = "999999999";

// ============================================================================
// FIELD
// ============================================================================

/// Fixed-width field: byte offset + byte length inside a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub start: usize,
    pub len: usize,
}

impl Field {
    pub const fn new(start: usize, len: usize) -> Self {
        Field { start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Exact slice, or None when the line is too short (or the range splits a character)
    pub fn slice<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.get(self.start..self.end())
    }

    /// Clamped extraction: short lines yield a truncated (possibly empty) value
    pub fn extract(&self, line: &str) -> String {
        let bytes = line.as_bytes();
        let start = self.start.min(bytes.len());
        let end = self.end().min(bytes.len());
        String::from_utf8_lossy(&bytes[start..end]).into_owned()
    }

    /// True when the field is fully present and made of ASCII digits only
    pub fn is_digits(&self, line: &str) -> bool {
        self.slice(line)
            .map(|s| s.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(false)
    }
}

/// Concatenate several fields (e.g. date + time) and trim the result
pub fn join_fields(line: &str, fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.extract(line))
        .collect::<String>()
        .trim()
        .to_string()
}

// ============================================================================
// RECORD KINDS
// ============================================================================

/// Structural role of a record, independent of the layout's code alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Header,
    Company,
    Punch,
    ClockAdjustment,
    EmployeeChange,
    SensitiveEvent,
    Trailer,
}

impl RecordKind {
    /// Human-readable name (pt-BR, as printed on AFD reports)
    pub fn label(&self) -> &str {
        match self {
            RecordKind::Header => "Cabeçalho",
            RecordKind::Company => "Identificação da empresa no REP",
            RecordKind::Punch => "Marcação de ponto",
            RecordKind::ClockAdjustment => "Ajuste do relógio",
            RecordKind::EmployeeChange => "Inclusão, alteração ou exclusão de empregado no REP",
            RecordKind::SensitiveEvent => "Eventos sensíveis do REP",
            RecordKind::Trailer => "Trailer",
        }
    }
}

/// One entry of the code table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpec {
    pub code: char,
    pub kind: RecordKind,
    pub min_len: usize,
}

/// How NSR ordering is enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencePolicy {
    /// Every line must be exactly previous + 1, headers included
    Strict,
    /// Lines may repeat or skip numbers but never go backwards; headers are exempt
    NonDecreasing,
}

// ============================================================================
// PER-RECORD FIELD LAYOUTS
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct HeaderLayout {
    /// Fixed marker that must read "1"
    pub marker: Field,
    pub employer_id: Field,
    pub serial: Field,
    pub start_date: Field,
    pub end_date: Field,
    pub generated_at: &'static [Field],
}

/// Sub-code that tells which offset holds the employer id (1 = CNPJ, 2 = CPF)
#[derive(Debug, Clone, Copy)]
pub struct EmployerIdRule {
    pub sub_code: Field,
    pub choices: &'static [(char, usize)],
    pub id_len: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct CompanyLayout {
    pub recorded_at: &'static [Field],
    pub employer_id: Field,
    pub name: Field,
    pub id_rule: Option<EmployerIdRule>,
}

#[derive(Debug, Clone, Copy)]
pub struct PunchLayout {
    pub timestamp: &'static [Field],
    pub worker_id: Field,
    /// Layout B stores ddmmyyyy + hhmm as plain digits and validates them
    pub numeric_timestamp: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ClockAdjustmentLayout {
    pub before: &'static [Field],
    pub after: &'static [Field],
}

#[derive(Debug, Clone, Copy)]
pub struct EmployeeChangeLayout {
    pub timestamp: &'static [Field],
    pub operation: Field,
    pub worker_id: Field,
    pub name: Field,
}

#[derive(Debug, Clone, Copy)]
pub struct SensitiveEventLayout {
    pub timestamp: &'static [Field],
    pub event_code: Field,
}

#[derive(Debug, Clone, Copy)]
pub struct TrailerLayout {
    /// The trailer's own type marker sits after the counters, not at TYPE_OFFSET
    pub code_offset: usize,
    pub counters: [(RecordKind, Field); 4],
}

// ============================================================================
// LAYOUT SPEC
// ============================================================================

#[derive(Debug)]
pub struct LayoutSpec {
    pub layout: Layout,
    pub records: &'static [RecordSpec],
    pub sequence: SequencePolicy,
    pub header: HeaderLayout,
    pub company: CompanyLayout,
    pub punch: PunchLayout,
    pub clock_adjustment: ClockAdjustmentLayout,
    pub employee_change: EmployeeChangeLayout,
    pub sensitive_event: Option<SensitiveEventLayout>,
    pub trailer: Option<TrailerLayout>,
}

impl LayoutSpec {
    pub fn record(&self, code: char) -> Option<&RecordSpec> {
        self.records.iter().find(|r| r.code == code)
    }

    pub fn kind_of(&self, code: char) -> Option<RecordKind> {
        self.record(code).map(|r| r.kind)
    }

    pub fn code_of(&self, kind: RecordKind) -> Option<char> {
        self.records.iter().find(|r| r.kind == kind).map(|r| r.code)
    }

    /// Codes in table order (used to pre-populate the register buckets)
    pub fn codes(&self) -> impl Iterator<Item = char> + '_ {
        self.records.iter().map(|r| r.code)
    }
}

/// Portaria 671 (layout A): codes 1-6, strict NSR, no trailer
static PORTARIA_671: LayoutSpec = LayoutSpec {
    layout: Layout::Portaria671,
    records: &[
        RecordSpec { code: '1', kind: RecordKind::Header, min_len: 250 },
        RecordSpec { code: '2', kind: RecordKind::Company, min_len: 227 },
        RecordSpec { code: '3', kind: RecordKind::Punch, min_len: 46 },
        RecordSpec { code: '4', kind: RecordKind::ClockAdjustment, min_len: 58 },
        RecordSpec { code: '5', kind: RecordKind::EmployeeChange, min_len: 99 },
        RecordSpec { code: '6', kind: RecordKind::SensitiveEvent, min_len: 36 },
    ],
    sequence: SequencePolicy::Strict,
    header: HeaderLayout {
        marker: Field::new(10, 1),
        employer_id: Field::new(11, 14),
        serial: Field::new(189, 17),
        start_date: Field::new(206, 10),
        end_date: Field::new(216, 10),
        generated_at: &[Field::new(226, 24)],
    },
    company: CompanyLayout {
        recorded_at: &[Field::new(10, 24)],
        employer_id: Field::new(49, 14),
        name: Field::new(77, 150),
        id_rule: None,
    },
    punch: PunchLayout {
        timestamp: &[Field::new(10, 24)],
        worker_id: Field::new(34, 12),
        numeric_timestamp: false,
    },
    clock_adjustment: ClockAdjustmentLayout {
        before: &[Field::new(10, 24)],
        after: &[Field::new(34, 24)],
    },
    employee_change: EmployeeChangeLayout {
        timestamp: &[Field::new(10, 24)],
        operation: Field::new(34, 1),
        worker_id: Field::new(35, 12),
        name: Field::new(47, 52),
    },
    sensitive_event: Some(SensitiveEventLayout {
        timestamp: &[Field::new(10, 24)],
        event_code: Field::new(34, 2),
    }),
    trailer: None,
};

/// Portaria 1510 (layout B): codes 1-5 and 9, non-decreasing NSR, trailer with counters
static PORTARIA_1510: LayoutSpec = LayoutSpec {
    layout: Layout::Portaria1510,
    records: &[
        RecordSpec { code: '1', kind: RecordKind::Header, min_len: 232 },
        RecordSpec { code: '2', kind: RecordKind::Company, min_len: 299 },
        RecordSpec { code: '3', kind: RecordKind::Punch, min_len: 34 },
        RecordSpec { code: '4', kind: RecordKind::ClockAdjustment, min_len: 34 },
        RecordSpec { code: '5', kind: RecordKind::EmployeeChange, min_len: 87 },
        RecordSpec { code: '9', kind: RecordKind::Trailer, min_len: 46 },
    ],
    sequence: SequencePolicy::NonDecreasing,
    header: HeaderLayout {
        marker: Field::new(10, 1),
        employer_id: Field::new(11, 14),
        serial: Field::new(187, 17),
        start_date: Field::new(204, 8),
        end_date: Field::new(212, 8),
        generated_at: &[Field::new(220, 8), Field::new(228, 4)],
    },
    company: CompanyLayout {
        recorded_at: &[Field::new(10, 8), Field::new(18, 4)],
        employer_id: Field::new(23, 14),
        name: Field::new(49, 150),
        id_rule: Some(EmployerIdRule {
            sub_code: Field::new(22, 1),
            choices: &[('1', 23), ('2', 23)],
            id_len: 14,
        }),
    },
    punch: PunchLayout {
        timestamp: &[Field::new(10, 8), Field::new(18, 4)],
        worker_id: Field::new(22, 12),
        numeric_timestamp: true,
    },
    clock_adjustment: ClockAdjustmentLayout {
        before: &[Field::new(10, 8), Field::new(18, 4)],
        after: &[Field::new(22, 8), Field::new(30, 4)],
    },
    employee_change: EmployeeChangeLayout {
        timestamp: &[Field::new(10, 8), Field::new(18, 4)],
        operation: Field::new(22, 1),
        worker_id: Field::new(23, 12),
        name: Field::new(35, 52),
    },
    sensitive_event: None,
    trailer: Some(TrailerLayout {
        code_offset: 45,
        counters: [
            (RecordKind::Company, Field::new(9, 9)),
            (RecordKind::Punch, Field::new(18, 9)),
            (RecordKind::ClockAdjustment, Field::new(27, 9)),
            (RecordKind::EmployeeChange, Field::new(36, 9)),
        ],
    }),
};

// ============================================================================
// LAYOUT SELECTOR
// ============================================================================

/// Layout - which regulatory format a file is processed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Portaria 671 (layout A)
    Portaria671,
    /// Portaria 1510 (layout B)
    Portaria1510,
}

impl Layout {
    pub fn spec(&self) -> &'static LayoutSpec {
        match self {
            Layout::Portaria671 => &PORTARIA_671,
            Layout::Portaria1510 => &PORTARIA_1510,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Layout::Portaria671 => "Portaria 671",
            Layout::Portaria1510 => "Portaria 1510",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Layout {
    type Err = AfdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "671" | "a" | "portaria671" => Ok(Layout::Portaria671),
            "1510" | "b" | "portaria1510" => Ok(Layout::Portaria1510),
            _ => Err(AfdError::UnknownLayout(s.to_string())),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
