//! File name derivation for downloaded PDFs.

use std::path::{Component, Path, PathBuf};

/// Maximum number of title characters kept in a PDF file name.
pub const MAX_TITLE_CHARS: usize = 50;

/// Builds `<first 50 chars of title>.pdf` with `/` and `\` replaced by `_`.
///
/// Truncation counts characters, not bytes, so multi-byte titles never split
/// inside a code point.
#[must_use]
pub fn pdf_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .take(MAX_TITLE_CHARS)
        .map(|c| match c {
            '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{stem}.pdf")
}

/// Joins `filename` onto `output_dir`, refusing anything but a single plain segment.
#[must_use]
pub fn output_path(output_dir: &Path, filename: &str) -> Option<PathBuf> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(output_dir.join(filename)),
        _ => None,
    }
}
