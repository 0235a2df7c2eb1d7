// 🔎 Line Interpretation - human-readable decoding of accepted records
// Decodes each accepted line into NSR, record type and a one-line description,
// listed in NSR order. Also exports the result as CSV.

use crate::engine::AfdReport;
use crate::layout::{join_fields, LayoutSpec, RecordKind, TRAILER_SENTINEL};
use crate::metadata::clean_company_name;
use crate::parser::{classify, parse_nsr};
use crate::schema::Operation;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::io::Write;

/// Placeholder for fields that cannot be rendered
pub const UNAVAILABLE: &str = "Não disponível";

// ============================================================================
// DATE FORMATTING
// ============================================================================

/// ddmmyyyy (1510) or yyyy-mm-dd (671) → dd/mm/yyyy
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%d%m%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| UNAVAILABLE.to_string())
}

/// ddmmyyyyhhmm (1510) or ISO-8601 with offset (671) → dd/mm/yyyy hh:mm
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%d%m%Y%H%M") {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    UNAVAILABLE.to_string()
}

// ============================================================================
// INTERPRETED LINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpretedLine {
    #[serde(rename = "nsr")]
    pub nsr: String,

    #[serde(rename = "tipo")]
    pub code: char,

    #[serde(skip)]
    pub kind: RecordKind,

    #[serde(rename = "descricao")]
    pub description: String,
}

impl std::fmt::Display for InterpretedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NSR: {} - Tipo: {}", self.nsr, self.description)
    }
}

/// Decode one accepted line. Unknown codes yield None.
pub fn interpret_line(line: &str, spec: &LayoutSpec) -> Option<InterpretedLine> {
    let classified = classify(line, spec);
    let code = classified.type_code?;
    let kind = spec.kind_of(code)?;

    let description = match kind {
        RecordKind::Header => {
            let h = &spec.header;
            format!(
                "Cabeçalho - Data Início: {} | Data Fim: {} | Serial: {}",
                format_date(&h.start_date.extract(line)),
                format_date(&h.end_date.extract(line)),
                h.serial.extract(line).trim()
            )
        }
        RecordKind::Company => {
            let c = &spec.company;
            format!(
                "Alteração Empresa - Razão Social: {} | CNPJ/CPF: {}",
                clean_company_name(&c.name.extract(line)),
                c.employer_id.extract(line).trim()
            )
        }
        RecordKind::Punch => {
            let p = &spec.punch;
            format!(
                "Marcação Ponto - Data: {} | PIS/CPF: {}",
                format_timestamp(&join_fields(line, p.timestamp)),
                p.worker_id.extract(line).trim()
            )
        }
        RecordKind::ClockAdjustment => {
            let a = &spec.clock_adjustment;
            format!(
                "Ajuste Relógio - Antes: {} | Depois: {}",
                format_timestamp(&join_fields(line, a.before)),
                format_timestamp(&join_fields(line, a.after))
            )
        }
        RecordKind::EmployeeChange => {
            let e = &spec.employee_change;
            let operation = Operation::from_code(&e.operation.extract(line))
                .map(|op| op.label().to_string())
                .unwrap_or_else(|| UNAVAILABLE.to_string());
            format!(
                "{} Funcionário - Nome: {} | PIS/CPF: {} | Data: {}",
                operation,
                e.name.extract(line).trim(),
                e.worker_id.extract(line).trim(),
                format_timestamp(&join_fields(line, e.timestamp))
            )
        }
        RecordKind::SensitiveEvent => match &spec.sensitive_event {
            Some(ev) => format!(
                "Evento Sensível - Tipo {} | {}",
                ev.event_code.extract(line).trim(),
                format_timestamp(&join_fields(line, ev.timestamp))
            ),
            None => "Evento Sensível".to_string(),
        },
        RecordKind::Trailer => match &spec.trailer {
            Some(t) => {
                let counts: Vec<String> = t
                    .counters
                    .iter()
                    .filter_map(|(kind, field)| {
                        let code = spec.code_of(*kind)?;
                        let value = parse_nsr(&field.extract(line))
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| "?".to_string());
                        Some(format!("Tipo {}: {}", code, value))
                    })
                    .collect();
                format!("Trailer - {}", counts.join(" | "))
            }
            None => "Trailer".to_string(),
        },
    };

    Some(InterpretedLine {
        nsr: classified.token.trim().to_string(),
        code,
        kind,
        description,
    })
}

/// Interpret every accepted record of a report, sorted by NSR.
/// The trailer sorts last; records with textual NSRs keep file order after it.
pub fn interpret_report(report: &AfdReport) -> Vec<InterpretedLine> {
    let spec = report.layout.spec();

    let mut lines: Vec<InterpretedLine> = report
        .registers
        .lines()
        .filter_map(|line| interpret_line(line, spec))
        .collect();

    lines.sort_by_key(|l| match parse_nsr(&l.nsr) {
        Some(n) if l.nsr != TRAILER_SENTINEL => (0, n),
        Some(n) => (1, n),
        None => (2, 0),
    });
    lines
}

// ============================================================================
// CSV EXPORT
// ============================================================================

pub fn write_csv<W: Write>(lines: &[InterpretedLine], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for line in lines {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::process_portaria_1510;
    use crate::layout::Layout;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("01022024"), "01/02/2024");
        assert_eq!(format_date("2024-02-01"), "01/02/2024");
        assert_eq!(format_date("99999999"), UNAVAILABLE);
        assert_eq!(format_date(""), UNAVAILABLE);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("010220240830"), "01/02/2024 08:30");
        assert_eq!(format_timestamp("2024-02-01T08:30:00-0300"), "01/02/2024 08:30");
        assert_eq!(format_timestamp("garbage"), UNAVAILABLE);
    }

    #[test]
    fn test_interpret_punch_1510() {
        let spec = Layout::Portaria1510.spec();
        let line = "0000000053010220240830123456789012";
        let interpreted = interpret_line(line, spec).unwrap();

        assert_eq!(interpreted.nsr, "000000005");
        assert_eq!(interpreted.kind, RecordKind::Punch);
        assert_eq!(
            interpreted.description,
            "Marcação Ponto - Data: 01/02/2024 08:30 | PIS/CPF: 123456789012"
        );
        assert!(interpreted.to_string().starts_with("NSR: 000000005 - Tipo: Marcação"));
    }

    #[test]
    fn test_interpret_employee_change_671() {
        let spec = Layout::Portaria671.spec();
        let line = format!(
            "{}{}{}{}{}{:<52}",
            "000000004", "5", "2024-02-01T08:30:00-0300", "A", "012345678901", "MARIA SILVA"
        );
        let interpreted = interpret_line(&line, spec).unwrap();

        assert!(interpreted.description.starts_with("Alteração Funcionário - Nome: MARIA SILVA"));
        assert!(interpreted.description.contains("PIS/CPF: 012345678901"));
    }

    #[test]
    fn test_interpret_trailer() {
        let spec = Layout::Portaria1510.spec();
        let line = format!("999999999{:09}{:09}{:09}{:09}9", 1, 2, 0, 1);
        let interpreted = interpret_line(&line, spec).unwrap();

        assert_eq!(
            interpreted.description,
            "Trailer - Tipo 2: 1 | Tipo 3: 2 | Tipo 4: 0 | Tipo 5: 1"
        );
    }

    #[test]
    fn test_interpret_report_sorted_by_nsr() {
        let text = [
            "0000000023010220240830123456789012",
            "0000000023010220240831123456789012",
            "0000000043010220240900123456789012",
        ]
        .join("\n");
        let report = process_portaria_1510(&text);
        let lines = interpret_report(&report);

        let nsrs: Vec<&str> = lines.iter().map(|l| l.nsr.as_str()).collect();
        assert_eq!(nsrs, vec!["000000002", "000000002", "000000004"]);
    }

    #[test]
    fn test_write_csv() {
        let spec = Layout::Portaria1510.spec();
        let line = interpret_line("0000000053010220240830123456789012", spec).unwrap();

        let mut out = Vec::new();
        write_csv(&[line], &mut out).unwrap();
        let csv_text = String::from_utf8(out).unwrap();

        assert!(csv_text.starts_with("nsr,tipo,descricao\n"));
        assert!(csv_text.contains("000000005,3,"));
    }
}
