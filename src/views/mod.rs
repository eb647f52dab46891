//! Pure mappings from API payloads to markup. Same input, same tree.

pub mod prescriptions;
pub mod users;

use chrono::{DateTime, Utc};

use crate::markup::{el, Node};

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

pub fn loading(message: &str) -> Node {
    Node::Fragment(vec![
        el("div").class("loading-spinner").into(),
        el("p").text(message).into(),
    ])
}

pub fn error_message(message: &str) -> Node {
    el("div").class("error-message").text(message).into()
}

pub fn empty_state(heading: &str, body: &str) -> Node {
    el("div")
        .class("empty-state")
        .child(el("h3").text(heading))
        .child(el("p").text(body))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_dates_like_the_browser_locale() {
        let at = Utc
            .with_ymd_and_hms(2024, 1, 8, 0, 0, 5)
            .single()
            .expect("valid timestamp");
        assert_eq!(format_date(at), "1/8/2024");
        assert_eq!(format_timestamp(at), "1/8/2024, 12:00:05 AM");
    }
}
