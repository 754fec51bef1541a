//! Server-rendered dashboard page: input form, metrics and charts.

pub mod charts;
mod form;
mod page;

pub use form::{FormInput, FormValues};
pub use page::{DashboardView, render_page};

/// Escapes text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
