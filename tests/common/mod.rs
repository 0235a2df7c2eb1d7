#![allow(dead_code)]

// Full-length AFD lines for both layouts

pub const SERIAL: &str = "00004004330012345";
pub const CNPJ: &str = "12345678000199";

fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

// ---------------------------------------------------------------------------
// Portaria 1510
// ---------------------------------------------------------------------------

pub fn header_1510(serial: &str) -> String {
    let line = format!(
        "{}{}{}{}{}{}",
        pad(&format!("0000000001{}{}{}", "1", CNPJ, "000000000000"), 187),
        serial,
        "01022024",
        "29022024",
        "01032024",
        "1200"
    );
    assert_eq!(line.len(), 232);
    line
}

pub fn company_1510(nsr: u64, name: &str) -> String {
    let line = format!(
        "{:09}2{}1{}{}{}{}",
        nsr,
        "010220240800",
        CNPJ,
        "000000000000",
        pad(name, 150),
        format!("{:<92}{}", "RUA DAS FLORES 100", "01310100")
    );
    assert_eq!(line.len(), 299);
    line
}

pub fn punch_1510(nsr: u64, pis: &str) -> String {
    format!("{:09}3010220240830{}", nsr, pis)
}

pub fn trailer_1510(companies: u64, punches: u64, adjustments: u64, changes: u64) -> String {
    format!(
        "999999999{:09}{:09}{:09}{:09}9",
        companies, punches, adjustments, changes
    )
}

/// Header, one company record, two punches and a matching trailer
pub fn valid_file_1510() -> String {
    [
        header_1510(SERIAL),
        company_1510(1, "ACME LTDA"),
        punch_1510(2, "123456789012"),
        punch_1510(3, "210987654321"),
        trailer_1510(1, 2, 0, 0),
    ]
    .join("\r\n")
}

// ---------------------------------------------------------------------------
// Portaria 671
// ---------------------------------------------------------------------------

pub const TIMESTAMP_671: &str = "2024-02-01T08:30:00-0300";

pub fn header_671(serial: &str) -> String {
    let line = format!(
        "{}{}{}{}{}",
        pad(&format!("0000000001{}{}", "1", CNPJ), 189),
        serial,
        "2024-02-01",
        "2024-02-29",
        "2024-03-01T12:00:00-0300"
    );
    assert_eq!(line.len(), 250);
    line
}

pub fn company_671(nsr: u64, name: &str) -> String {
    let line = format!(
        "{}{}{}{}",
        pad(&format!("{:09}2{}", nsr, TIMESTAMP_671), 49),
        pad(CNPJ, 28),
        pad(name, 150),
        "RUA DAS FLORES 100"
    );
    assert_eq!(line.len(), 245);
    line
}

pub fn punch_671(nsr: u64, pis: &str) -> String {
    let line = format!("{:09}3{}{}", nsr, TIMESTAMP_671, pis);
    assert_eq!(line.len(), 46);
    line
}

/// Header (NSR 0) followed by a company record and two punches
pub fn valid_file_671() -> String {
    [
        header_671(SERIAL),
        company_671(1, "ACME LTDA"),
        punch_671(2, "123456789012"),
        punch_671(3, "210987654321"),
    ]
    .join("\n")
}

/// Non-empty trimmed lines, the quantity every accepted/invalid split must add up to
pub fn non_empty_lines(text: &str) -> usize {
    text.replace('\r', "")
        .split('\n')
        .filter(|l| !l.trim().is_empty())
        .count()
}
