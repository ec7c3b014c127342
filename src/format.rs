//! Display helpers used by the page renderers. Every function here is total:
//! bad input maps to a fixed fallback, never an error.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const NO_DATE: &str = "No date";

const GRAVATAR_BASE: &str = "https://www.gravatar.com/avatar";

static LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ar", "Arabic"),
        ("bn", "Bengali"),
        ("ca", "Catalan"),
        ("cn", "Cantonese"),
        ("cs", "Czech"),
        ("da", "Danish"),
        ("de", "German"),
        ("el", "Greek"),
        ("en", "English"),
        ("es", "Spanish"),
        ("et", "Estonian"),
        ("fa", "Persian"),
        ("fi", "Finnish"),
        ("fr", "French"),
        ("he", "Hebrew"),
        ("hi", "Hindi"),
        ("hu", "Hungarian"),
        ("id", "Indonesian"),
        ("is", "Icelandic"),
        ("it", "Italian"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("ml", "Malayalam"),
        ("ms", "Malay"),
        ("nl", "Dutch"),
        ("no", "Norwegian"),
        ("pl", "Polish"),
        ("pt", "Portuguese"),
        ("ro", "Romanian"),
        ("ru", "Russian"),
        ("sk", "Slovak"),
        ("sr", "Serbian"),
        ("sv", "Swedish"),
        ("ta", "Tamil"),
        ("te", "Telugu"),
        ("th", "Thai"),
        ("tl", "Tagalog"),
        ("tr", "Turkish"),
        ("uk", "Ukrainian"),
        ("vi", "Vietnamese"),
        ("zh", "Chinese"),
    ])
});

/// USD amount with en-US grouping, e.g. `1000` -> `$1,000.00`.
pub fn format_currency(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}.00")
}

/// `2023-07-19` (or an RFC 3339 timestamp) -> `July 19, 2023`; `2023-07` and `2023`
/// are read as the first day. Anything else -> `No date`.
pub fn format_date(input: &str) -> String {
    parse_date(input.trim())
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| NO_DATE.to_string())
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    // Partial ISO dates start on the first day of the month or year.
    let padded = match input.len() {
        7 => format!("{input}-01"),
        4 => format!("{input}-01-01"),
        _ => return None,
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d").ok()
}

/// ISO 639-1 code to English name; unknown codes come back unchanged.
pub fn language_name(code: &str) -> String {
    LANGUAGES
        .get(code.trim().to_ascii_lowercase().as_str())
        .map(|name| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// `top_rated` -> `Top Rated`.
pub fn format_label(label: &str) -> String {
    label
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn release_year(date: &str) -> Option<&str> {
    date.get(..4)
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
}

pub fn format_vote_average(value: f64) -> String {
    format!("{value:.2}")
}

/// Review avatars come either as a gravatar hash path or as `/https://...`.
pub fn avatar_url(path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    let stripped = path.trim_start_matches('/');
    if stripped.starts_with("http://") || stripped.starts_with("https://") {
        return Some(stripped.to_string());
    }
    Some(format!("{GRAVATAR_BASE}/{stripped}"))
}
