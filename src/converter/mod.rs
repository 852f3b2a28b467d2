/*!
 * Teacher-to-student substitution plan conversion.
 *
 * A teacher plan is one HTML blob holding several `<body>` fragments, one per
 * day. Conversion happens in two steps:
 *
 * - `split`: every fragment is wrapped into a standalone document using the
 *   header from `plan_style.html`
 * - `table`: the `mon_list` table of each document is rebuilt with the student
 *   column layout, filtered and sorted by class
 *
 * Typed rows and the class sort order live in `row`.
 */

use std::path::{Path, PathBuf};

use log::{debug, error};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

pub use self::row::{
    ClassSortKey, SubstitutionKind, SubstitutionRow, COLUMN_MAP, NEW_HEADERS, SPECIAL_CLASSES,
};
pub use self::table::{restructure_table, try_restructure, Restructure, ROW_CLASS_EVEN, ROW_CLASS_ODD};
pub use self::template::{Template, TEMPLATE_FOOTER};

use crate::errors::ConvertError;

pub mod row;
pub mod table;
pub mod template;

/// Template looked up relative to the working directory
pub const DEFAULT_TEMPLATE_PATH: &str = "plan_style.html";

static BODY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<body.*?>(.*?)</body>").unwrap());

static DEFAULT_CONVERTER: Lazy<PlanConverter> = Lazy::new(|| PlanConverter::new(DEFAULT_TEMPLATE_PATH));

/// Split a teacher plan into one document per `<body>` fragment
pub fn split_bodies(teacher_html: &str, template: &Template) -> Vec<String> {
    BODY_REGEX
        .captures_iter(teacher_html)
        .filter_map(|caps| caps.get(1))
        .map(|content| template.wrap(content.as_str()))
        .collect()
}

/// Convert with the process-wide converter bound to `plan_style.html`
pub fn convert_teacher_to_student(teacher_html: &str) -> Vec<String> {
    DEFAULT_CONVERTER.convert(teacher_html)
}

/// Converts teacher plans into per-day student plans.
///
/// The template is read on first use and kept for the lifetime of the
/// converter. A failed read is not cached, so a template that appears later
/// is picked up by the next call.
#[derive(Debug)]
pub struct PlanConverter {
    template_path: PathBuf,
    template: OnceCell<Template>,
}

impl PlanConverter {
    pub fn new<P: AsRef<Path>>(template_path: P) -> Self {
        Self {
            template_path: template_path.as_ref().to_path_buf(),
            template: OnceCell::new(),
        }
    }

    /// Converter with an already loaded template
    pub fn with_template(template: Template) -> Self {
        Self {
            template_path: PathBuf::new(),
            template: OnceCell::with_value(template),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    fn template(&self) -> Result<&Template, ConvertError> {
        self.template.get_or_try_init(|| Template::load(&self.template_path))
    }

    /// Split the teacher plan into standalone student documents
    pub fn split(&self, teacher_html: &str) -> Result<Vec<String>, ConvertError> {
        let template = self.template()?;
        Ok(split_bodies(teacher_html, template))
    }

    /// Split and restructure a teacher plan.
    ///
    /// An empty result means either no `<body>` fragment was found or the
    /// template is unavailable; the latter is logged as an error.
    pub fn convert(&self, teacher_html: &str) -> Vec<String> {
        let documents = match self.split(teacher_html) {
            Ok(documents) => documents,
            Err(e) => {
                error!("Teacher plan conversion unavailable: {}", e);
                return Vec::new();
            }
        };

        debug!("Split teacher plan into {} document(s)", documents.len());

        documents
            .iter()
            .map(|document| restructure_table(document).into_html())
            .collect()
    }
}
