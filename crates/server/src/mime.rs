//! Extension to content-type mapping.
//!
//! The table is an ordered list. A file name matches an entry when it ends with
//! `.` followed by the entry's extension; the longest matching extension wins, and
//! the earlier entry wins between equally long ones. There is no substring
//! matching: `page.phtml` does not match `html`.

use http::HeaderValue;
use mime::Mime;

use crate::config::ConfigError;

/// The built-in table, in lookup order.
pub const DEFAULT_MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("ico", "image/ico"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("pdf", "application/pdf"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
];

#[derive(Debug, Clone)]
pub struct MimeEntry {
    extension: String,
    mime: Mime,
    header_value: HeaderValue,
}

impl MimeEntry {
    /// Creates an entry; a leading `.` on `extension` is ignored.
    ///
    /// # Errors
    ///
    /// Fails when the extension is empty or `content_type` is not a valid media type.
    pub fn new(extension: &str, content_type: &str) -> Result<Self, ConfigError> {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        if extension.is_empty() {
            return Err(ConfigError::invalid_mime_entry(extension, "extension is empty"));
        }

        let mime = content_type.parse::<Mime>().map_err(|e| ConfigError::invalid_mime_entry(extension, e))?;
        let header_value = HeaderValue::from_str(mime.as_ref()).map_err(|e| ConfigError::invalid_mime_entry(extension, e))?;

        Ok(Self { extension: extension.to_string(), mime, header_value })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn mime(&self) -> &Mime {
        &self.mime
    }

    /// The content type, ready to be sent as a `Content-Type` header value.
    pub fn header_value(&self) -> &HeaderValue {
        &self.header_value
    }

    fn matches(&self, file_name: &str) -> bool {
        file_name
            .strip_suffix(self.extension.as_str())
            .and_then(|stem| stem.strip_suffix('.'))
            .is_some_and(|stem| !stem.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct MimeTable {
    entries: Vec<MimeEntry>,
}

impl MimeTable {
    pub fn new(entries: Vec<MimeEntry>) -> Self {
        Self { entries }
    }

    /// Builds a table from `(extension, content type)` pairs, keeping their order.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self, ConfigError> {
        let entries = pairs.iter().map(|(extension, content_type)| MimeEntry::new(extension, content_type)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[MimeEntry] {
        &self.entries
    }

    /// Finds the entry for `file_name`, see the module docs for the matching rule.
    pub fn lookup(&self, file_name: &str) -> Option<&MimeEntry> {
        let mut found: Option<&MimeEntry> = None;
        for entry in self.entries.iter().filter(|entry| entry.matches(file_name)) {
            if found.is_none_or(|current| entry.extension.len() > current.extension.len()) {
                found = Some(entry);
            }
        }
        found
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_MIME_TYPES).expect("built-in mime table is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type<'a>(table: &'a MimeTable, file_name: &str) -> Option<&'a str> {
        table.lookup(file_name).map(|entry| entry.mime().as_ref())
    }

    #[test]
    fn default_table_keeps_order() {
        let table = MimeTable::default();
        let extensions = table.entries().iter().map(MimeEntry::extension).collect::<Vec<_>>();

        assert_eq!(extensions, ["jpg", "jpeg", "png", "ico", "txt", "html", "css", "pdf", "pptx"]);
        assert_eq!(content_type(&table, "index.html"), Some("text/html"));
        assert_eq!(content_type(&table, "deck.pptx"), Some(DEFAULT_MIME_TYPES[8].1));
        assert_eq!(table.lookup("logo.png").unwrap().header_value(), "image/png");
    }

    #[test]
    fn suffix_match_is_exact() {
        let table = MimeTable::default();

        assert_eq!(content_type(&table, "page.phtml"), None);
        assert_eq!(content_type(&table, "notes.txt.bak"), None);
        assert_eq!(content_type(&table, "photo.jpegx"), None);
        assert_eq!(content_type(&table, "html"), None);
        assert_eq!(content_type(&table, ".html"), None);
        assert_eq!(content_type(&table, "INDEX.HTML"), None);
        assert_eq!(content_type(&table, "archive.v1.css"), Some("text/css"));
    }

    #[test]
    fn longest_suffix_wins_regardless_of_order() {
        let table = MimeTable::from_pairs(&[("gz", "application/gzip"), ("tar.gz", "application/x-tgz"), ("htm", "text/html")]).unwrap();

        assert_eq!(content_type(&table, "backup.tar.gz"), Some("application/x-tgz"));
        assert_eq!(content_type(&table, "backup.gz"), Some("application/gzip"));
        assert_eq!(content_type(&table, "page.html"), None);
    }

    #[test]
    fn first_entry_wins_between_equal_extensions() {
        let table = MimeTable::from_pairs(&[("txt", "text/plain"), (".txt", "text/markdown")]).unwrap();

        assert_eq!(content_type(&table, "a.txt"), Some("text/plain"));
    }

    #[test]
    fn invalid_entries_are_rejected() {
        assert!(MimeEntry::new("", "text/plain").is_err());
        assert!(MimeEntry::new(".", "text/plain").is_err());
        assert!(MimeEntry::new("txt", "not a mime").is_err());
    }
}
