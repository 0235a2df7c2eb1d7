// 📊 File Details - per-file summary of a validation run
// Header fields, record counts per type and the SHA-256 of the source bytes.

use crate::engine::AfdReport;
use crate::interpret::{format_date, format_timestamp, UNAVAILABLE};
use crate::layout::{Layout, RecordKind};
use crate::metadata::CompanyChangeInfo;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct TypeCount {
    pub code: char,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileDetails {
    pub layout: Layout,
    pub serial: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub generated_at: Option<String>,
    pub employer_id: Option<String>,
    pub last_company_change: Option<CompanyChangeInfo>,
    pub counts: Vec<TypeCount>,
    pub invalid_count: usize,
    pub total_lines: usize,
    pub trailer_balanced: Option<bool>,
    pub sha256: String,
}

/// Hex SHA-256 of the raw source
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

impl FileDetails {
    pub fn from_report(report: &AfdReport, source: &[u8]) -> Self {
        let spec = report.layout.spec();

        // Header is reported through metadata, not as a count
        let counts = spec
            .records
            .iter()
            .filter(|r| r.kind != RecordKind::Header)
            .map(|r| TypeCount {
                code: r.code,
                label: r.kind.label().to_string(),
                count: report.registers.count(r.code),
            })
            .collect();

        let meta = &report.metadata;

        FileDetails {
            layout: report.layout,
            serial: meta.serial.clone(),
            start_date: meta.start_date.clone(),
            end_date: meta.end_date.clone(),
            generated_at: meta.generated_at.clone(),
            employer_id: meta.employer_id.clone(),
            last_company_change: report.last_company_change.clone(),
            counts,
            invalid_count: report.invalid_count(),
            total_lines: report.total_lines,
            trailer_balanced: report.trailer_reconciliation.as_ref().map(|t| t.balanced),
            sha256: fingerprint(source),
        }
    }
}

fn or_unavailable(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNAVAILABLE)
}

impl fmt::Display for FileDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layout: {}", self.layout)?;
        writeln!(f, "Número de série do REP: {}", or_unavailable(&self.serial))?;
        writeln!(
            f,
            "Data inicial: {}",
            self.start_date.as_deref().map(format_date).as_deref().unwrap_or(UNAVAILABLE)
        )?;
        writeln!(
            f,
            "Data final: {}",
            self.end_date.as_deref().map(format_date).as_deref().unwrap_or(UNAVAILABLE)
        )?;
        writeln!(
            f,
            "Geração do arquivo: {}",
            self.generated_at
                .as_deref()
                .map(format_timestamp)
                .as_deref()
                .unwrap_or(UNAVAILABLE)
        )?;
        writeln!(f, "CNPJ/CPF do empregador: {}", or_unavailable(&self.employer_id))?;

        match &self.last_company_change {
            Some(company) => {
                writeln!(f, "Última alteração da empresa:")?;
                writeln!(
                    f,
                    "  Data e hora da gravação: {}",
                    format_timestamp(&company.recorded_at)
                )?;
                writeln!(f, "  CNPJ/CPF do empregador: {}", company.employer_id)?;
                writeln!(f, "  Razão social: {}", company.company_name)?;
            }
            None => writeln!(f, "Última alteração da empresa: {}", UNAVAILABLE)?,
        }

        for count in &self.counts {
            writeln!(
                f,
                "Quantidade de registros Tipo {} ({}): {}",
                count.code, count.label, count.count
            )?;
        }

        if let Some(balanced) = self.trailer_balanced {
            writeln!(f, "Trailer conciliado: {}", if balanced { "sim" } else { "não" })?;
        }

        writeln!(f, "Linhas inválidas: {}", self.invalid_count)?;
        writeln!(f, "Total de linhas: {}", self.total_lines)?;
        write!(f, "SHA-256: {}", self.sha256)
    }
}

// ============================================================================
// TESTS
// ============================================================================
