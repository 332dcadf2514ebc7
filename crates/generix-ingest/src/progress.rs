//! Progress bar utilities for CLI operations

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{msg}\n\
    {spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})";

/// Create a progress bar counting ontologies
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Format a term count for summaries, e.g. "1 term" or "412 terms"
pub fn format_terms(count: usize) -> String {
    if count == 1 {
        "1 term".to_string()
    } else {
        format!("{} terms", count)
    }
}
