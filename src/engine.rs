// ✅ AFD Validation Engine - classify, validate and aggregate one file
//
// Start → Streaming (one line at a time, file order) → Finalizing (header serial,
// company snapshot, trailer counters) → Done.
// A bad line never stops the stream; only a read failure aborts a run.

use crate::error::AfdError;
use crate::layout::{Layout, LayoutSpec, RecordKind};
use crate::metadata::{
    extract_company_change, extract_file_metadata, header_serial, is_valid_serial,
    CompanyChangeInfo, FileMetadata,
};
use crate::parser::{classify, normalize_newlines, physical_lines, trim_line};
use crate::reconciliation::{ReconciliationEngine, TrailerReconciliation};
use crate::register::RegisterSet;
use crate::schema::{RecordValidator, Rejection};
use crate::sequence::SequenceValidator;
use crate::source;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// REPORT
// ============================================================================

/// Rejected line together with the reason it was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidLine {
    pub line: String,
    pub reason: Rejection,
}

/// AfdReport - the structured result of one validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfdReport {
    #[serde(rename = "layout")]
    pub layout: Layout,

    #[serde(rename = "registros")]
    pub registers: RegisterSet,

    #[serde(rename = "linhasInvalidas")]
    pub invalid_lines: Vec<String>,

    #[serde(rename = "totalLinhas")]
    pub total_lines: usize,

    #[serde(flatten)]
    pub metadata: FileMetadata,

    #[serde(rename = "ultimaAlteracaoEmpresa")]
    pub last_company_change: Option<CompanyChangeInfo>,

    #[serde(rename = "reconciliacaoTrailer")]
    pub trailer_reconciliation: Option<TrailerReconciliation>,

    /// Reasons, index-aligned with `invalid_lines`
    #[serde(skip)]
    pub rejections: Vec<Rejection>,
}

impl AfdReport {
    pub fn accepted_count(&self) -> usize {
        self.registers.total()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid_lines.len()
    }

    /// Invalid lines paired with their rejection reasons
    pub fn invalid_with_reasons(&self) -> impl Iterator<Item = (&str, Option<&Rejection>)> {
        self.invalid_lines
            .iter()
            .enumerate()
            .map(move |(i, line)| (line.as_str(), self.rejections.get(i)))
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} lines, {} accepted, {} invalid",
            self.layout,
            self.total_lines,
            self.accepted_count(),
            self.invalid_count()
        )
    }
}

// ============================================================================
// RUN STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Start,
    Streaming,
    Finalizing,
    Done,
}

/// ValidationContext - everything one run accumulates.
/// Owned by a single run; nothing is shared between files.
pub struct ValidationContext {
    spec: &'static LayoutSpec,
    stage: RunStage,
    sequence: SequenceValidator,
    validator: RecordValidator,
    registers: RegisterSet,
    invalid: Vec<InvalidLine>,
    total_lines: usize,
}

impl ValidationContext {
    pub fn new(spec: &'static LayoutSpec) -> Self {
        ValidationContext {
            spec,
            stage: RunStage::Start,
            sequence: SequenceValidator::new(spec.sequence),
            validator: RecordValidator::new(spec),
            registers: RegisterSet::new(spec),
            invalid: Vec::new(),
            total_lines: 0,
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Feed one physical line (untrimmed, possibly empty)
    pub fn consume(&mut self, raw: &str) {
        self.stage = RunStage::Streaming;
        self.total_lines += 1;

        let line = trim_line(raw);
        if line.is_empty() {
            return;
        }

        let classified = classify(line, self.spec);
        let kind = classified.type_code.and_then(|c| self.spec.kind_of(c));

        if let Err(violation) = self.sequence.check(&classified, kind) {
            self.reject(line, Rejection::Sequence(violation));
            return;
        }

        match self.validator.validate(line, &classified) {
            Ok(kind) => self.accept(kind, line),
            Err(rejection) => self.reject(line, rejection),
        }
    }

    fn accept(&mut self, kind: RecordKind, line: &str) {
        match self.spec.code_of(kind) {
            Some(code) => self.registers.push(code, line),
            None => self.reject(line, Rejection::UnknownType(None)),
        }
    }

    fn reject(&mut self, line: &str, reason: Rejection) {
        debug!(nsr = %line.get(..9).unwrap_or(line), %reason, "line rejected");
        self.invalid.push(InvalidLine {
            line: line.to_string(),
            reason,
        });
    }

    /// Header/trailer post-checks and metadata extraction
    pub fn finalize(mut self) -> AfdReport {
        self.stage = RunStage::Finalizing;

        let metadata = self.finalize_header();

        let last_company_change = self
            .spec
            .code_of(RecordKind::Company)
            .and_then(|code| self.registers.last(code))
            .map(|line| extract_company_change(line, self.spec));

        let trailer_reconciliation = self.finalize_trailer();

        self.stage = RunStage::Done;

        let (invalid_lines, rejections): (Vec<String>, Vec<Rejection>) = self
            .invalid
            .into_iter()
            .map(|i| (i.line, i.reason))
            .unzip();

        let report = AfdReport {
            layout: self.spec.layout,
            registers: self.registers,
            invalid_lines,
            total_lines: self.total_lines,
            metadata,
            last_company_change,
            trailer_reconciliation,
            rejections,
        };

        info!("{}", report.summary());
        report
    }

    fn finalize_header(&mut self) -> FileMetadata {
        let Some(code) = self.spec.code_of(RecordKind::Header) else {
            return FileMetadata::default();
        };
        let Some(header) = self.registers.first(code) else {
            return FileMetadata::default();
        };

        let serial = header_serial(header, self.spec);
        if is_valid_serial(&serial) {
            return extract_file_metadata(header, self.spec);
        }

        let evicted = self.registers.drain(code);
        warn!(%serial, headers = evicted.len(), "header serial is not 17 digits, evicting headers");
        // Every header goes, reported against the serial that failed
        for line in evicted {
            self.reject(&line, Rejection::SerialNumber(serial.clone()));
        }
        FileMetadata::default()
    }

    fn finalize_trailer(&mut self) -> Option<TrailerReconciliation> {
        let code = self.spec.code_of(RecordKind::Trailer)?;
        let trailer = self.registers.first(code)?;

        let reconciliation =
            ReconciliationEngine::new(self.spec).reconcile(trailer, &self.registers)?;

        if !reconciliation.is_balanced() {
            let evicted = self.registers.drain(code);
            warn!(trailers = evicted.len(), "{}, evicting trailers", reconciliation.summary());
            for line in evicted {
                self.reject(&line, Rejection::TrailerMismatch);
            }
        }

        Some(reconciliation)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// AfdEngine - entry point bound to one layout
#[derive(Debug, Clone, Copy)]
pub struct AfdEngine {
    spec: &'static LayoutSpec,
}

impl AfdEngine {
    pub fn new(layout: Layout) -> Self {
        AfdEngine {
            spec: layout.spec(),
        }
    }

    pub fn layout(&self) -> Layout {
        self.spec.layout
    }

    /// Validate already-decoded text. Never fails.
    pub fn process(&self, text: &str) -> AfdReport {
        let text = normalize_newlines(text);
        let mut ctx = ValidationContext::new(self.spec);

        for raw in physical_lines(&text) {
            ctx.consume(raw);
        }

        ctx.finalize()
    }

    /// Read, decode and validate a source. Read failures abort the run.
    pub fn process_reader<R: Read>(
        &self,
        reader: R,
        max_bytes: Option<u64>,
    ) -> Result<AfdReport, AfdError> {
        let text = source::read_source(reader, max_bytes)?;
        Ok(self.process(&text))
    }

    pub fn process_path(&self, path: &Path, max_bytes: Option<u64>) -> Result<AfdReport, AfdError> {
        let text = source::read_path(path, max_bytes)?;
        Ok(self.process(&text))
    }
}

/// Validate a Portaria 671 file
pub fn process_portaria_671(text: &str) -> AfdReport {
    AfdEngine::new(Layout::Portaria671).process(text)
}

/// Validate a Portaria 1510 file
pub fn process_portaria_1510(text: &str) -> AfdReport {
    AfdEngine::new(Layout::Portaria1510).process(text)
}

// ============================================================================
// TESTS
// ============================================================================
