//! Per-language aggregation

use super::entities::{LanguageRecordIn, LanguageRecordOut};

/// Name of the synthetic row appended after every language.
pub const TOTAL_LANGUAGE: &str = "Total";

/// Rename every engine row into the public schema and append a `Total` row.
///
/// Input order is preserved; nothing is sorted or merged. The result always
/// has `records.len() + 1` entries and the last one is the field-wise sum.
pub fn aggregate(records: &[LanguageRecordIn]) -> Vec<LanguageRecordOut> {
    let mut total = LanguageRecordOut {
        language: TOTAL_LANGUAGE.to_string(),
        files: 0,
        lines: 0,
        blanks: 0,
        comments: 0,
        lines_of_code: 0,
    };

    let mut out = Vec::with_capacity(records.len() + 1);
    for record in records {
        total.files += record.files;
        total.lines += record.lines;
        total.blanks += record.blanks;
        total.comments += record.comments;
        total.lines_of_code += record.code;
        out.push(LanguageRecordOut::from(record));
    }
    out.push(total);
    out
}
