//! Test data factories

/// One language row in the counting engine's JSON schema
pub struct SccRow {
    pub name: &'static str,
    pub count: u64,
    pub lines: u64,
    pub blank: u64,
    pub comment: u64,
    pub code: u64,
}

pub fn row(name: &'static str, count: u64, lines: u64, blank: u64, comment: u64, code: u64) -> SccRow {
    SccRow {
        name,
        count,
        lines,
        blank,
        comment,
        code,
    }
}

/// Render rows the way `scc -f json` prints them
pub fn scc_report(rows: &[SccRow]) -> Vec<u8> {
    let rows: Vec<serde_json::Value> = rows
        .iter()
        .map(|r| {
            serde_json::json!({
                "Name": r.name,
                "Bytes": r.lines * 32,
                "CodeBytes": 0,
                "Lines": r.lines,
                "Code": r.code,
                "Comment": r.comment,
                "Blank": r.blank,
                "Complexity": 0,
                "Count": r.count,
                "WeightedComplexity": 0,
                "Files": []
            })
        })
        .collect();
    serde_json::to_vec(&rows).unwrap()
}

/// Small repository: 80% Rust, 20% TOML
pub fn two_language_report() -> Vec<u8> {
    scc_report(&[row("Rust", 8, 800, 90, 60, 650), row("TOML", 2, 200, 20, 10, 170)])
}

/// Ten-file single-language tree
pub fn single_language_report() -> Vec<u8> {
    scc_report(&[row("Go", 10, 1000, 100, 50, 850)])
}

/// Minimal multipart body with one file field
pub fn multipart_body(boundary: &str, field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
