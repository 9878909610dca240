//! Live page host binding
//!
//! Drives Chrome through `headless_chrome`, runs the capture script in the
//! page and hands the resulting [`SnapshotNode`](crate::dom::SnapshotNode)
//! tree to the evaluator.

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;

use std::path::Path;

/// Turn user input into a URL the browser can open
///
/// Existing local files become `file://` URLs, bare hosts get a scheme.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();

    let has_scheme = ["http://", "https://", "file://", "data:", "about:", "chrome://"]
        .iter()
        .any(|scheme| trimmed.starts_with(scheme));
    if has_scheme {
        return trimmed.to_string();
    }

    let path = Path::new(trimmed);
    if path.exists() {
        if let Ok(absolute) = path.canonicalize() {
            return format!("file://{}", absolute.display());
        }
    }

    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}
