/*!
 * Common test utilities for the dsb_bot test suite
 */

use anyhow::Result;
use scraper::{Html, Selector};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use dsb_bot::converter::Template;

// Re-export the mock collaborators module
pub mod mocks;

/// Header used by the conversion fixtures
pub const TEST_HEADER: &str = "<html>\n<head><meta charset=\"utf-8\"><title>Vertretungsplan</title></head>\n<body>\n";

/// Header row as printed on teacher plans
pub const TEACHER_HEADERS: [&str; 9] = [
    "Vertreter", "Stunde", "Klasse(n)", "Fach", "Raum", "(Lehrer)", "(Raum)", "Art", "Text",
];

/// Initialise logging once for tests that want to see log output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Template built from [`TEST_HEADER`]
pub fn test_template() -> Template {
    Template::from_header(TEST_HEADER)
}

/// A teacher table row with the given class and kind
pub fn row(class: &str, kind: &str) -> Vec<String> {
    ["Meier", "2", class, "Deutsch", "A101", "Schulz", "", kind, ""]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Build a row from nine explicit cells
pub fn full_row(cells: [&str; 9]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

/// One `<body>` fragment holding a titled `mon_list` table
pub fn teacher_day(title: &str, rows: &[Vec<String>]) -> String {
    let mut html = String::from("<body>\n<center>\n");
    html.push_str(&format!("<div class=\"mon_title\">{}</div>\n", title));
    html.push_str("<table class=\"mon_list\" >\n<tr class='list'>");
    for header in TEACHER_HEADERS {
        html.push_str(&format!("<th class=\"list\" align=\"center\">{}</th>", header));
    }
    html.push_str("</tr>\n");
    for (i, cells) in rows.iter().enumerate() {
        let class = if i % 2 == 0 { "list odd" } else { "list even" };
        html.push_str(&format!("<tr class='{}'>", class));
        for cell in cells {
            html.push_str(&format!("<td class=\"list\" align=\"center\">{}</td>", cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n</center>\n</body>\n");
    html
}

/// A teacher plan: one `<body>` per day, concatenated as the vendor does
pub fn teacher_plan(days: &[(&str, Vec<Vec<String>>)]) -> String {
    let mut html = String::from("<html>\n<head><title>Lehrer</title></head>\n");
    for (title, rows) in days {
        html.push_str(&teacher_day(title, rows));
    }
    html.push_str("</html>\n");
    html
}

/// A single student document wrapped in the test template
pub fn student_document(title: &str, rows: &[Vec<String>]) -> String {
    let day = teacher_day(title, rows);
    let inner = day
        .trim()
        .trim_start_matches("<body>")
        .trim_end_matches("</body>");
    test_template().wrap(inner)
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Cell texts of every row of the `mon_list` table, header first
pub fn table_rows(html: &str) -> Vec<Vec<String>> {
    let document = Html::parse_document(html);
    let Some(table) = document.select(&selector("table.mon_list")).next() else {
        return Vec::new();
    };
    table
        .select(&selector("tr"))
        .map(|tr| {
            tr.select(&selector("td, th"))
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect()
        })
        .collect()
}

/// `class` attribute of every data row of the `mon_list` table
pub fn data_row_classes(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&selector("table.mon_list tr"))
        .skip(1)
        .map(|tr| tr.value().attr("class").unwrap_or_default().to_string())
        .collect()
}

/// Number of elements matching `css`
pub fn count(html: &str, css: &str) -> usize {
    Html::parse_document(html).select(&selector(css)).count()
}
