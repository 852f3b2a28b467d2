use std::fs;
use std::path::Path;

use crate::errors::ConvertError;

/// Closing tags appended after every extracted body fragment
pub const TEMPLATE_FOOTER: &str = "\n\n</body>\n</html>";

/// Header and footer wrapped around each extracted day fragment.
///
/// The header is expected to contain everything up to and including the
/// opening `<body>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub header: String,
    pub footer: String,
}

impl Template {
    /// Build a template from an in-memory header
    pub fn from_header(header: &str) -> Self {
        Self {
            header: header.trim().to_string(),
            footer: TEMPLATE_FOOTER.to_string(),
        }
    }

    /// Read the header from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let header = fs::read_to_string(path).map_err(|e| ConvertError::TemplateUnavailable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_header(&header))
    }

    /// Wrap a fragment into a standalone document
    pub fn wrap(&self, content: &str) -> String {
        let mut document = String::with_capacity(self.header.len() + content.len() + self.footer.len());
        document.push_str(&self.header);
        document.push_str(content.trim());
        document.push_str(&self.footer);
        document
    }
}
