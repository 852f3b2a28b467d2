use html_escape::{encode_double_quoted_attribute, encode_text};
use log::{debug, warn};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::row::{sort_rows, SubstitutionRow, COLUMN_MAP, NEW_HEADERS, SOURCE_COLUMNS};
use crate::errors::ConvertError;

// @module: Rebuilding the mon_list substitution table

/// Styling class of even-indexed data rows (index 0 included)
pub const ROW_CLASS_ODD: &str = "list odd";

/// Styling class of odd-indexed data rows
pub const ROW_CLASS_EVEN: &str = "list even";

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("table.mon_list").unwrap());

/// Outcome of restructuring one student document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restructure {
    /// The substitution table was rebuilt
    Restructured(String),
    /// The document had no substitution table or could not be processed
    Unchanged(String),
}

impl Restructure {
    pub fn as_html(&self) -> &str {
        match self {
            Self::Restructured(html) | Self::Unchanged(html) => html,
        }
    }

    pub fn into_html(self) -> String {
        match self {
            Self::Restructured(html) | Self::Unchanged(html) => html,
        }
    }

    pub fn is_restructured(&self) -> bool {
        matches!(self, Self::Restructured(_))
    }
}

/// Rebuild the `mon_list` table of a student document.
///
/// Documents without the table, and documents that fail to process, come
/// back unchanged.
pub fn restructure_table(html: &str) -> Restructure {
    restructure_or_keep(html, try_restructure)
}

/// Run `restructure` on `html`, degrading any error to `Unchanged(html)`
fn restructure_or_keep<F>(html: &str, restructure: F) -> Restructure
where
    F: FnOnce(&str) -> Result<Restructure, ConvertError>,
{
    match restructure(html) {
        Ok(result) => result,
        Err(e) => {
            warn!("Restructuring failed, keeping original document: {}", e);
            Restructure::Unchanged(html.to_string())
        }
    }
}

/// Fallible core of [`restructure_table`]
pub fn try_restructure(html: &str) -> Result<Restructure, ConvertError> {
    let document = Html::parse_document(html);
    let Some(table) = document.select(&TABLE_SELECTOR).next() else {
        debug!("No mon_list table found, leaving document as is");
        return Ok(Restructure::Unchanged(html.to_string()));
    };

    let table_data = table_rows(table);
    let rows = valid_rows(&table_data);
    debug!("Kept {} of {} substitution rows", rows.len(), table_data.len().saturating_sub(1));

    let new_table = render_table(table, &rows);

    // Both strings come from the same serializer, so the table's own
    // serialization is a substring of the document's.
    let serialized = document.html();
    let original_table = table.html();
    if !serialized.contains(&original_table) {
        return Err(ConvertError::TableNotLocated);
    }

    Ok(Restructure::Restructured(serialized.replacen(&original_table, &new_table, 1)))
}

/// Trimmed cell texts of every row of `table`, header included.
///
/// Only the table's own rows and cells are read: rows directly under the
/// table or its `thead`/`tbody`/`tfoot`, and their direct `td`/`th` cells.
/// The html5ever parser already places bare `<tr>` children into an
/// implicit `<tbody>`.
fn table_rows(table: ElementRef<'_>) -> Vec<Vec<String>> {
    child_elements(table)
        .flat_map(|child| match child.value().name() {
            "tr" => vec![child],
            "thead" | "tbody" | "tfoot" => child_elements(child)
                .filter(|row| row.value().name() == "tr")
                .collect(),
            _ => Vec::new(),
        })
        .map(|row| {
            child_elements(row)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(cell_text)
                .collect()
        })
        .collect()
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element.children().filter_map(ElementRef::wrap)
}

/// Trimmed text of a cell, leaving out tables nested inside it
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut text = String::new();
    push_own_text(cell, &mut text);
    text.trim().to_string()
}

fn push_own_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if child.value().name() != "table" {
                push_own_text(child, out);
            }
        }
    }
}

/// Data rows that survive filtering, sorted by class
fn valid_rows(table_data: &[Vec<String>]) -> Vec<SubstitutionRow> {
    // Required by the column remap. Always satisfied once a row carries
    // SOURCE_COLUMNS cells, kept as an explicit guard.
    let min_len = COLUMN_MAP.iter().copied().max().unwrap_or(0) + 1;

    let mut rows: Vec<SubstitutionRow> = table_data
        .iter()
        .skip(1)
        .filter(|cells| cells.len() >= SOURCE_COLUMNS)
        .filter(|cells| cells.len() >= min_len)
        .filter_map(|cells| SubstitutionRow::from_cells(cells))
        .collect();

    sort_rows(&mut rows);
    rows
}

fn render_table(table: ElementRef<'_>, rows: &[SubstitutionRow]) -> String {
    let mut out = String::from("<table");
    for (name, value) in table.value().attrs() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push_str("><tbody>");

    out.push_str("<tr class=\"list\">");
    for (i, header) in NEW_HEADERS.iter().enumerate() {
        out.push_str("<th class=\"list\" align=\"center\">");
        push_cell_text(&mut out, header, i == 0);
        out.push_str("</th>");
    }
    out.push_str("</tr>");

    for (index, row) in rows.iter().enumerate() {
        let class = if index % 2 == 0 { ROW_CLASS_ODD } else { ROW_CLASS_EVEN };
        out.push_str("<tr class=\"");
        out.push_str(class);
        out.push_str("\">");
        for (i, cell) in row.student_cells().iter().enumerate() {
            out.push_str("<td class=\"list\" align=\"center\">");
            push_cell_text(&mut out, cell, i == 0);
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }

    out.push_str("</tbody></table>");
    out
}

fn push_cell_text(out: &mut String, text: &str, bold: bool) {
    if bold {
        out.push_str("<b>");
        out.push_str(&encode_text(text));
        out.push_str("</b>");
    } else {
        out.push_str(&encode_text(text));
    }
}
