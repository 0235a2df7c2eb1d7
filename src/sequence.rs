// 🔢 Sequence Validator - NSR ordering per layout
//
// Portaria 671: every line must be exactly previous + 1 (no exemptions).
// Portaria 1510: non-decreasing, gaps tolerated, header lines exempt.
// The two policies differ on purpose; do not unify them.

use crate::layout::{RecordKind, SequencePolicy};
use crate::parser::ClassifiedLine;
use serde::{Deserialize, Serialize};

/// Why a line failed the NSR check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceViolation {
    /// Strict policy: the NSR was not previous + 1
    OutOfOrder { expected: u64, found: u64 },
    /// Strict policy: NSR is not a number at all
    NonNumeric,
    /// Non-decreasing policy: NSR went backwards
    Regressed { last: u64, found: u64 },
}

/// SequenceValidator - carries the last accepted NSR through one run
#[derive(Debug, Clone)]
pub struct SequenceValidator {
    policy: SequencePolicy,
    last_accepted: Option<u64>,
}

impl SequenceValidator {
    pub fn new(policy: SequencePolicy) -> Self {
        SequenceValidator {
            policy,
            last_accepted: None,
        }
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted
    }

    /// Check one line and advance the state when it passes.
    /// A rejected line never moves the state.
    pub fn check(
        &mut self,
        line: &ClassifiedLine<'_>,
        kind: Option<RecordKind>,
    ) -> Result<(), SequenceViolation> {
        match self.policy {
            SequencePolicy::Strict => self.check_strict(line.number),
            SequencePolicy::NonDecreasing => self.check_non_decreasing(line.number, kind),
        }
    }

    fn check_strict(&mut self, number: Option<u64>) -> Result<(), SequenceViolation> {
        let Some(found) = number else {
            return Err(SequenceViolation::NonNumeric);
        };

        if let Some(last) = self.last_accepted {
            let expected = last.saturating_add(1);
            if found != expected {
                return Err(SequenceViolation::OutOfOrder { expected, found });
            }
        }

        self.last_accepted = Some(found);
        Ok(())
    }

    fn check_non_decreasing(
        &mut self,
        number: Option<u64>,
        kind: Option<RecordKind>,
    ) -> Result<(), SequenceViolation> {
        // Textual NSRs are neither compared nor stored
        let Some(found) = number else {
            return Ok(());
        };

        // Headers resynchronise the sequence
        if kind != Some(RecordKind::Header) {
            if let Some(last) = self.last_accepted {
                if found < last {
                    return Err(SequenceViolation::Regressed { last, found });
                }
            }
        }

        self.last_accepted = Some(found);
        Ok(())
    }
}

impl std::fmt::Display for SequenceViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceViolation::OutOfOrder { expected, found } => {
                write!(f, "NSR {} out of order (expected {})", found, expected)
            }
            SequenceViolation::NonNumeric => write!(f, "NSR is not numeric"),
            SequenceViolation::Regressed { last, found } => {
                write!(f, "NSR {} is lower than previous {}", found, last)
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
