// ⚖️ Reconciliation Engine - Trailer counters vs accepted records
//
// The Portaria 1510 trailer declares how many type 2, 3, 4 and 5 records the file holds.
// Every counter must match the number of records actually accepted:
//
//   declared(kind) == accepted(kind)   for kind in {company, punch, clock adjustment, employee}
//
// A single mismatch invalidates the trailer; the rest of the file is untouched.

use crate::layout::LayoutSpec;
use crate::register::RegisterSet;
use serde::{Deserialize, Serialize};

// ============================================================================
// RECONCILIATION RESULT
// ============================================================================

/// One counter comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterCheck {
    #[serde(rename = "tipo")]
    pub code: char,

    /// Declared value; None when the field is not a number
    #[serde(rename = "declarado")]
    pub declared: Option<u64>,

    #[serde(rename = "encontrado")]
    pub found: usize,
}

impl CounterCheck {
    pub fn matches(&self) -> bool {
        self.declared == Some(self.found as u64)
    }
}

/// TrailerReconciliation - outcome for the accepted trailer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailerReconciliation {
    #[serde(rename = "conciliado")]
    pub balanced: bool,

    #[serde(rename = "contadores")]
    pub counters: Vec<CounterCheck>,
}

impl TrailerReconciliation {
    pub fn is_balanced(&self) -> bool {
        self.balanced
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &CounterCheck> {
        self.counters.iter().filter(|c| !c.matches())
    }

    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .counters
            .iter()
            .map(|c| {
                let declared = c
                    .declared
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "?".to_string());
                format!("tipo {}: {}/{}", c.code, declared, c.found)
            })
            .collect();

        format!(
            "Trailer {} ({})",
            if self.balanced { "conciliado" } else { "divergente" },
            parts.join(", ")
        )
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    spec: &'static LayoutSpec,
}

impl ReconciliationEngine {
    pub fn new(spec: &'static LayoutSpec) -> Self {
        ReconciliationEngine { spec }
    }

    /// Compare the trailer's counters against the register buckets.
    /// Returns None when the layout has no trailer.
    pub fn reconcile(&self, trailer: &str, registers: &RegisterSet) -> Option<TrailerReconciliation> {
        let layout = self.spec.trailer.as_ref()?;

        let counters: Vec<CounterCheck> = layout
            .counters
            .iter()
            .filter_map(|(kind, field)| {
                let code = self.spec.code_of(*kind)?;
                let declared = field
                    .slice(trailer)
                    .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
                    .and_then(|s| s.parse::<u64>().ok());

                Some(CounterCheck {
                    code,
                    declared,
                    found: registers.count(code),
                })
            })
            .collect();

        let balanced = counters.iter().all(|c| c.matches());

        Some(TrailerReconciliation { balanced, counters })
    }
}

// ============================================================================
// TESTS
// ============================================================================
