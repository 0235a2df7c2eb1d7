// 🏷️ Metadata Extractor
// File-level scalars from the first header and the latest company identification record

use crate::layout::{join_fields, LayoutSpec};
use serde::{Deserialize, Serialize};

/// Width of the equipment serial (número de fabricação do REP)
pub const SERIAL_LEN: usize = 17;

// ============================================================================
// TYPES
// ============================================================================

/// FileMetadata - header-derived scalars; None means "unavailable"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(rename = "dataInicio")]
    pub start_date: Option<String>,

    #[serde(rename = "dataFim")]
    pub end_date: Option<String>,

    #[serde(rename = "dataHoraGeracao")]
    pub generated_at: Option<String>,

    #[serde(rename = "serialEquipamento")]
    pub serial: Option<String>,

    #[serde(rename = "cnpjCpfEmpregador")]
    pub employer_id: Option<String>,
}

impl FileMetadata {
    pub fn is_available(&self) -> bool {
        self.serial.is_some()
    }
}

/// CompanyChangeInfo - snapshot of the last accepted company record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyChangeInfo {
    #[serde(rename = "dataHoraGravacao")]
    pub recorded_at: String,

    #[serde(rename = "cnpjCpfEmpregador")]
    pub employer_id: String,

    #[serde(rename = "razaoSocial")]
    pub company_name: String,
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Raw serial field of a header line
pub fn header_serial(header: &str, spec: &LayoutSpec) -> String {
    spec.header.serial.extract(header)
}

/// Serial must be exactly 17 ASCII digits
pub fn is_valid_serial(serial: &str) -> bool {
    serial.len() == SERIAL_LEN && serial.bytes().all(|b| b.is_ascii_digit())
}

/// Metadata from an accepted header whose serial already passed `is_valid_serial`
pub fn extract_file_metadata(header: &str, spec: &LayoutSpec) -> FileMetadata {
    let layout = &spec.header;

    FileMetadata {
        start_date: Some(layout.start_date.extract(header).trim().to_string()),
        end_date: Some(layout.end_date.extract(header).trim().to_string()),
        generated_at: Some(join_fields(header, layout.generated_at)),
        serial: Some(header_serial(header, spec)),
        employer_id: Some(layout.employer_id.extract(header).trim().to_string()),
    }
}

pub fn extract_company_change(company: &str, spec: &LayoutSpec) -> CompanyChangeInfo {
    let layout = &spec.company;

    CompanyChangeInfo {
        recorded_at: join_fields(company, layout.recorded_at),
        employer_id: layout.employer_id.extract(company).trim().to_string(),
        company_name: clean_company_name(&layout.name.extract(company)),
    }
}

/// Normalise a razão social field:
/// trim, drop a leading digit run (and the whitespace after it), drop control characters.
pub fn clean_company_name(raw: &str) -> String {
    let trimmed = raw.trim();

    let name = trimmed
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start();

    name.chars().filter(|c| !is_control(*c)).collect()
}

fn is_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1F}' | '\u{7F}')
}

// ============================================================================
// TESTS
// ============================================================================
