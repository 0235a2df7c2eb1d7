// AFD Expert - Core Library
// Record classification and validation for AFD (Arquivo Fonte de Dados) files.
// Exposes all modules for use in the CLI and tests

pub mod config;
pub mod engine;
pub mod error;
pub mod interpret;      // Line interpretation + CSV export
pub mod layout;         // Layout registry: Portaria 671 / 1510 as data
pub mod metadata;       // Header and company-change extraction
pub mod parser;         // Trimming, line splitting, NSR/type classification
pub mod reconciliation; // Trailer counters vs. accepted records
pub mod register;       // Accepted lines bucketed by type code
pub mod schema;         // Per-type structural validation
pub mod sequence;       // NSR ordering policies
pub mod source;         // Size ceiling + text decoding
pub mod summary;        // Per-file details and fingerprint

// Re-export commonly used types
pub use config::Config;
pub use engine::{
    AfdEngine, AfdReport, InvalidLine, RunStage, ValidationContext,
    process_portaria_671, process_portaria_1510,
};
pub use error::{AfdError, ConfigError};
pub use interpret::{InterpretedLine, interpret_line, interpret_report, write_csv};
pub use layout::{Layout, LayoutSpec, RecordKind, SequencePolicy};
pub use metadata::{CompanyChangeInfo, FileMetadata};
pub use reconciliation::{CounterCheck, ReconciliationEngine, TrailerReconciliation};
pub use register::RegisterSet;
pub use schema::{Operation, RecordValidator, Rejection};
pub use sequence::{SequenceValidator, SequenceViolation};
pub use summary::FileDetails;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
