// 📐 Shape Layer - Record Validation
// Structural and semantic checks per record type, driven by the layout tables

use crate::layout::{
    Field, LayoutSpec, RecordKind, HEADER_SENTINEL, TRAILER_SENTINEL,
};
use crate::parser::ClassifiedLine;
use crate::sequence::SequenceViolation;
use serde::{Deserialize, Serialize};

// ============================================================================
// EMPLOYEE OPERATION
// ============================================================================

/// Operation carried by an employee-change record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Inclusion,
    Amendment,
    Exclusion,
}

impl Operation {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "I" => Some(Operation::Inclusion),
            "A" => Some(Operation::Amendment),
            "E" => Some(Operation::Exclusion),
            _ => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Operation::Inclusion => "Inclusão",
            Operation::Amendment => "Alteração",
            Operation::Exclusion => "Exclusão",
        }
    }
}

// ============================================================================
// REJECTION REASONS
// ============================================================================

/// Why a line ended up in the invalid list. Always line-local, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    Sequence(SequenceViolation),
    UnknownType(Option<char>),
    TooShort { code: char, len: usize, min_len: usize },
    HeaderSentinel(String),
    HeaderMarker(String),
    EmployerIdKind(String),
    EmployerId(String),
    WorkerId(String),
    PunchTimestamp(String),
    Operation(String),
    TrailerSentinel(String),
    SerialNumber(String),
    TrailerMismatch,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Sequence(v) => write!(f, "{}", v),
            Rejection::UnknownType(Some(c)) => write!(f, "unknown record type '{}'", c),
            Rejection::UnknownType(None) => write!(f, "missing record type"),
            Rejection::TooShort { code, len, min_len } => write!(
                f,
                "type {} line has {} bytes (min {})",
                code, len, min_len
            ),
            Rejection::HeaderSentinel(v) => write!(f, "header NSR must be {}, got '{}'", HEADER_SENTINEL, v),
            Rejection::HeaderMarker(v) => write!(f, "header marker must be 1, got '{}'", v),
            Rejection::EmployerIdKind(v) => write!(f, "unknown employer id kind '{}'", v),
            Rejection::EmployerId(v) => write!(f, "employer id must be 14 digits, got '{}'", v),
            Rejection::WorkerId(v) => write!(f, "worker id must be 12 digits, got '{}'", v),
            Rejection::PunchTimestamp(v) => write!(f, "punch date/time must be ddmmyyyyhhmm, got '{}'", v),
            Rejection::Operation(v) => write!(f, "operation must be I, A or E, got '{}'", v),
            Rejection::TrailerSentinel(v) => write!(f, "trailer NSR must be {}, got '{}'", TRAILER_SENTINEL, v),
            Rejection::SerialNumber(v) => write!(f, "equipment serial must be 17 digits, got '{}'", v),
            Rejection::TrailerMismatch => write!(f, "trailer counters do not match accepted records"),
        }
    }
}

// ============================================================================
// RECORD VALIDATOR
// ============================================================================

pub struct RecordValidator {
    spec: &'static LayoutSpec,
}

impl RecordValidator {
    pub fn new(spec: &'static LayoutSpec) -> Self {
        RecordValidator { spec }
    }

    /// Decide acceptance of a line that already passed the NSR check
    pub fn validate(&self, line: &str, classified: &ClassifiedLine<'_>) -> Result<RecordKind, Rejection> {
        let code = classified
            .type_code
            .ok_or(Rejection::UnknownType(None))?;

        let record = self
            .spec
            .record(code)
            .ok_or(Rejection::UnknownType(Some(code)))?;

        if line.len() < record.min_len {
            return Err(Rejection::TooShort {
                code,
                len: line.len(),
                min_len: record.min_len,
            });
        }

        match record.kind {
            RecordKind::Header => self.validate_header(line, classified)?,
            RecordKind::Company => self.validate_company(line)?,
            RecordKind::Punch => self.validate_punch(line)?,
            RecordKind::EmployeeChange => self.validate_employee_change(line)?,
            RecordKind::Trailer => self.validate_trailer(classified)?,
            RecordKind::ClockAdjustment | RecordKind::SensitiveEvent => {}
        }

        Ok(record.kind)
    }

    fn validate_header(&self, line: &str, classified: &ClassifiedLine<'_>) -> Result<(), Rejection> {
        if classified.token != HEADER_SENTINEL {
            return Err(Rejection::HeaderSentinel(classified.token.to_string()));
        }

        let marker = self.spec.header.marker.extract(line);
        if marker != "1" {
            return Err(Rejection::HeaderMarker(marker));
        }
        Ok(())
    }

    fn validate_company(&self, line: &str) -> Result<(), Rejection> {
        let Some(rule) = &self.spec.company.id_rule else {
            return Ok(());
        };

        let sub_code = rule.sub_code.extract(line);
        let offset = rule
            .choices
            .iter()
            .find(|(code, _)| sub_code.len() == 1 && sub_code.starts_with(*code))
            .map(|(_, offset)| *offset)
            .ok_or_else(|| Rejection::EmployerIdKind(sub_code.clone()))?;

        let field = Field::new(offset, rule.id_len);
        if !field.is_digits(line) {
            return Err(Rejection::EmployerId(field.extract(line)));
        }
        Ok(())
    }

    fn validate_punch(&self, line: &str) -> Result<(), Rejection> {
        let punch = &self.spec.punch;

        if !punch.worker_id.is_digits(line) {
            return Err(Rejection::WorkerId(punch.worker_id.extract(line)));
        }

        if punch.numeric_timestamp && !punch.timestamp.iter().all(|f| f.is_digits(line)) {
            let raw: String = punch.timestamp.iter().map(|f| f.extract(line)).collect();
            return Err(Rejection::PunchTimestamp(raw));
        }
        Ok(())
    }

    fn validate_employee_change(&self, line: &str) -> Result<(), Rejection> {
        let change = &self.spec.employee_change;

        if !change.worker_id.is_digits(line) {
            return Err(Rejection::WorkerId(change.worker_id.extract(line)));
        }

        let operation = change.operation.extract(line);
        if Operation::from_code(&operation).is_none() {
            return Err(Rejection::Operation(operation));
        }
        Ok(())
    }

    fn validate_trailer(&self, classified: &ClassifiedLine<'_>) -> Result<(), Rejection> {
        if classified.token != TRAILER_SENTINEL {
            return Err(Rejection::TrailerSentinel(classified.token.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::parser::classify;

    fn validate(layout: Layout, line: &str) -> Result<RecordKind, Rejection> {
        let spec = layout.spec();
        let classified = classify(line, spec);
        RecordValidator::new(spec).validate(line, &classified)
    }

    fn pad(line: &str, len: usize) -> String {
        format!("{:<width$}", line, width = len)
    }

    #[test]
    fn test_unknown_type_rejected() {
        let line = pad("0000000017", 60);
        assert_eq!(
            validate(Layout::Portaria671, &line),
            Err(Rejection::UnknownType(Some('7')))
        );
        assert_eq!(
            validate(Layout::Portaria671, "000000001"),
            Err(Rejection::UnknownType(None))
        );
        // Sensitive events only exist in Portaria 671
        let event = pad("0000000016", 40);
        assert_eq!(
            validate(Layout::Portaria1510, &event),
            Err(Rejection::UnknownType(Some('6')))
        );
        assert_eq!(validate(Layout::Portaria671, &event), Ok(RecordKind::SensitiveEvent));
    }

    #[test]
    fn test_too_short_rejected() {
        let line = "0000000013010220240830";
        assert_eq!(
            validate(Layout::Portaria1510, line),
            Err(Rejection::TooShort {
                code: '3',
                len: 22,
                min_len: 34
            })
        );
    }

    #[test]
    fn test_punch_worker_id_must_be_12_digits() {
        let ok = "0000000013010220240830123456789012";
        assert_eq!(validate(Layout::Portaria1510, ok), Ok(RecordKind::Punch));

        let bad = "00000000130102202408301234567890AB";
        assert!(matches!(
            validate(Layout::Portaria1510, bad),
            Err(Rejection::WorkerId(_))
        ));

        // Extra length never rescues a bad id
        let bad_long = format!("{}{}", bad, "0".repeat(40));
        assert!(matches!(
            validate(Layout::Portaria1510, &bad_long),
            Err(Rejection::WorkerId(_))
        ));
    }

    #[test]
    fn test_punch_timestamp_pattern_layout_b() {
        let bad = "000000001301022024083X123456789012";
        assert!(matches!(
            validate(Layout::Portaria1510, bad),
            Err(Rejection::PunchTimestamp(_))
        ));
    }

    #[test]
    fn test_punch_layout_a() {
        let ok = "0000000013".to_string() + "2024-02-01T08:30:00-0300" + "012345678901" + "ABCD";
        assert_eq!(validate(Layout::Portaria671, &ok), Ok(RecordKind::Punch));

        let bad = "0000000013".to_string() + "2024-02-01T08:30:00-0300" + "0123456789  " + "ABCD";
        assert!(matches!(
            validate(Layout::Portaria671, &bad),
            Err(Rejection::WorkerId(_))
        ));
    }

    #[test]
    fn test_employee_change_operation() {
        let base = |op: &str| pad(&format!("0000000015010220240830{}123456789012FULANO", op), 87);

        assert_eq!(validate(Layout::Portaria1510, &base("I")), Ok(RecordKind::EmployeeChange));
        assert_eq!(validate(Layout::Portaria1510, &base("E")), Ok(RecordKind::EmployeeChange));
        assert_eq!(
            validate(Layout::Portaria1510, &base("X")),
            Err(Rejection::Operation("X".to_string()))
        );
    }

    #[test]
    fn test_header_checks() {
        let ok = pad("00000000011", 232);
        assert_eq!(validate(Layout::Portaria1510, &ok), Ok(RecordKind::Header));

        let bad_marker = pad("00000000012", 232);
        assert_eq!(
            validate(Layout::Portaria1510, &bad_marker),
            Err(Rejection::HeaderMarker("2".to_string()))
        );

        let bad_nsr = pad("00000000511", 232);
        assert!(matches!(
            validate(Layout::Portaria1510, &bad_nsr),
            Err(Rejection::HeaderSentinel(_))
        ));
    }

    #[test]
    fn test_company_employer_id_layout_b() {
        let ok = pad("0000000012010220240830112345678000199", 299);
        assert_eq!(validate(Layout::Portaria1510, &ok), Ok(RecordKind::Company));

        let bad_kind = pad("0000000012010220240830312345678000199", 299);
        assert_eq!(
            validate(Layout::Portaria1510, &bad_kind),
            Err(Rejection::EmployerIdKind("3".to_string()))
        );

        let bad_id = pad("00000000120102202408301123456780001", 299);
        assert!(matches!(
            validate(Layout::Portaria1510, &bad_id),
            Err(Rejection::EmployerId(_))
        ));
    }

    #[test]
    fn test_company_layout_a_only_checks_length() {
        let ok = pad("0000000012", 227);
        assert_eq!(validate(Layout::Portaria671, &ok), Ok(RecordKind::Company));
    }

    #[test]
    fn test_trailer_sentinel() {
        let ok = format!("999999999{:09}{:09}{:09}{:09}9", 1, 2, 0, 1);
        assert_eq!(validate(Layout::Portaria1510, &ok), Ok(RecordKind::Trailer));

        // Code 9 at the type offset with a regular NSR
        let bad = pad("0000000079", 46);
        assert!(matches!(
            validate(Layout::Portaria1510, &bad),
            Err(Rejection::TrailerSentinel(_))
        ));
    }

    #[test]
    fn test_operation_labels() {
        assert_eq!(Operation::from_code("A"), Some(Operation::Amendment));
        assert_eq!(Operation::Amendment.label(), "Alteração");
        assert_eq!(Operation::from_code(""), None);
    }
}
