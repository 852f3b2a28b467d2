use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

// @module: Plan titles, dates and file names

/// Title used when a plan carries no `mon_title` element
pub const UNKNOWN_TITLE: &str = "Unbekannter Plan";

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(".mon_title").unwrap());

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})").unwrap());

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9A-Za-z]+").unwrap());

/// Trimmed text of the first `mon_title` element
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
}

/// First `D.M.YYYY` date in a title
pub fn extract_date(title: &str) -> Option<NaiveDate> {
    let caps = DATE_REGEX.captures(title)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// File name a plan with this title is stored under
pub fn plan_file_name(title: &str) -> String {
    let leading_date = title
        .split_whitespace()
        .next()
        .and_then(|token| NaiveDate::parse_from_str(token, "%d.%m.%Y").ok());

    match leading_date {
        Some(date) => format!("{}.html", date.format("%Y-%m-%d")),
        None => format!("{}.html", UNSAFE_CHARS.replace_all(title, "_")),
    }
}
