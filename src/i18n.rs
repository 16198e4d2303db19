//! Translation lookup
//!
//! Label text is addressed by a label id within a (package key, source name)
//! pair, mirroring how translation catalogs are usually shipped per package.
//! The built-in catalog covers the labels the login flow itself needs; an
//! optional TOML catalog file can override or extend them.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

/// Package key used by the built-in catalog and as configuration default
pub const DEFAULT_PACKAGE_KEY: &str = "vestibule";
/// Source name used by the built-in catalog and as configuration default
pub const DEFAULT_SOURCE_NAME: &str = "Main";

/// Resolves label ids to translated text.
///
/// Implementations must not fall back to the label id on a miss: a missing
/// label is an infrastructure error and propagates unchanged.
#[cfg_attr(test, mockall::automock)]
pub trait Translator: Send + Sync {
    /// Look up `label_id` in the catalog identified by `source_name` and
    /// `package_key`.
    fn translate_by_id(
        &self,
        label_id: &str,
        source_name: &str,
        package_key: &str,
    ) -> Result<String, AppError>;
}

/// In-memory label catalog keyed by (package key, source name, label id)
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    labels: HashMap<String, String>,
}

/// On-disk catalog file layout
///
/// ```toml
/// [[label]]
/// package = "vestibule"
/// source = "Main"
/// id = "authentication.failure.title"
/// text = "Login not successful"
/// ```
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    label: Vec<LabelEntry>,
}

#[derive(Debug, Deserialize)]
struct LabelEntry {
    package: String,
    source: String,
    id: String,
    text: String,
}

impl MessageCatalog {
    /// Catalog holding the labels shipped with the application.
    pub fn builtin() -> Self {
        Self::default()
            .with_label(
                DEFAULT_PACKAGE_KEY,
                DEFAULT_SOURCE_NAME,
                "authentication.failure.title",
                "Login not successful",
            )
            .with_label(
                DEFAULT_PACKAGE_KEY,
                DEFAULT_SOURCE_NAME,
                "authentication.failure.message",
                "The entered username or password was wrong",
            )
    }

    /// Add or replace a single label.
    pub fn with_label(
        mut self,
        package_key: &str,
        source_name: &str,
        label_id: &str,
        text: &str,
    ) -> Self {
        self.labels
            .insert(key(package_key, source_name, label_id), text.to_string());
        self
    }

    /// Merge labels from a TOML catalog file over the current ones.
    ///
    /// # Errors
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn merge_file(mut self, path: &Path) -> Result<Self, AppError> {
        use config::{Config, File};

        let file: CatalogFile = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        for entry in file.label {
            self.labels
                .insert(key(&entry.package, &entry.source, &entry.id), entry.text);
        }

        Ok(self)
    }
}

impl Translator for MessageCatalog {
    fn translate_by_id(
        &self,
        label_id: &str,
        source_name: &str,
        package_key: &str,
    ) -> Result<String, AppError> {
        self.labels
            .get(&key(package_key, source_name, label_id))
            .cloned()
            .ok_or_else(|| {
                AppError::Translation(format!(
                    "no label '{label_id}' in catalog {package_key}:{source_name}"
                ))
            })
    }
}

fn key(package_key: &str, source_name: &str, label_id: &str) -> String {
    format!("{package_key}:{source_name}:{label_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_resolves_failure_labels() {
        let catalog = MessageCatalog::builtin();

        let title = catalog
            .translate_by_id(
                "authentication.failure.title",
                DEFAULT_SOURCE_NAME,
                DEFAULT_PACKAGE_KEY,
            )
            .unwrap();
        assert_eq!(title, "Login not successful");

        let message = catalog
            .translate_by_id(
                "authentication.failure.message",
                DEFAULT_SOURCE_NAME,
                DEFAULT_PACKAGE_KEY,
            )
            .unwrap();
        assert_eq!(message, "The entered username or password was wrong");
    }

    #[test]
    fn lookup_honors_package_and_source() {
        let catalog = MessageCatalog::builtin().with_label(
            "acme",
            "Frontend",
            "authentication.failure.title",
            "Anmeldung fehlgeschlagen",
        );

        let title = catalog
            .translate_by_id("authentication.failure.title", "Frontend", "acme")
            .unwrap();
        assert_eq!(title, "Anmeldung fehlgeschlagen");

        // Built-in label is untouched
        let default_title = catalog
            .translate_by_id(
                "authentication.failure.title",
                DEFAULT_SOURCE_NAME,
                DEFAULT_PACKAGE_KEY,
            )
            .unwrap();
        assert_eq!(default_title, "Login not successful");
    }

    #[test]
    fn unknown_label_is_an_error() {
        let catalog = MessageCatalog::builtin();

        let error = catalog
            .translate_by_id("no.such.label", DEFAULT_SOURCE_NAME, DEFAULT_PACKAGE_KEY)
            .expect_err("missing labels must not resolve");
        assert!(matches!(
            error,
            AppError::Translation(message) if message.contains("no.such.label")
        ));
    }

    #[test]
    fn catalog_file_overrides_builtin_labels() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[[label]]
package = "vestibule"
source = "Main"
id = "authentication.failure.title"
text = "Sign-in failed"
"#
        )
        .unwrap();

        let catalog = MessageCatalog::builtin().merge_file(&path).unwrap();

        let title = catalog
            .translate_by_id(
                "authentication.failure.title",
                DEFAULT_SOURCE_NAME,
                DEFAULT_PACKAGE_KEY,
            )
            .unwrap();
        assert_eq!(title, "Sign-in failed");

        // Labels not mentioned in the file survive the merge
        assert!(
            catalog
                .translate_by_id(
                    "authentication.failure.message",
                    DEFAULT_SOURCE_NAME,
                    DEFAULT_PACKAGE_KEY,
                )
                .is_ok()
        );
    }
}
