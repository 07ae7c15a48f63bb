/// Collapse runs of whitespace (including the hard line breaks arXiv puts in
/// titles and abstracts) into single spaces.
pub fn clean_summary(summary: &str) -> String {
    summary.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The arXiv id is the final path segment of the entry id URL,
/// e.g. `http://arxiv.org/abs/2301.01234v2` -> `2301.01234v2`.
pub fn arxiv_id_from_entry_id(entry_id: &str) -> String {
    entry_id
        .trim()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Fallback PDF location when the feed carries no explicit pdf link.
pub fn pdf_url_from_entry_id(entry_id: &str) -> String {
    entry_id.trim().replacen("/abs/", "/pdf/", 1)
}
