use crate::io;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Role names with a fixed meaning in a [`FileMap`].
pub const CODE: &str = "code";
pub const TRAIN: &str = "train";
pub const DEFAULT_TRAIN: &str = "train";

/// Logical file roles mapped to paths, plus the `code` entry selecting the
/// reader backend and an optional default `train` tag.
///
/// ```toml
/// code = "vasp"
/// density = "run/CHGCAR"
/// structure = "run/POSCAR"
/// energy = "run/OUTCAR"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FileMap(BTreeMap<String, String>);

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(role.into(), value.into())
    }

    pub fn with(mut self, role: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(role, value);
        self
    }

    pub fn get(&self, role: &str) -> Option<&str> {
        self.0.get(role).map(String::as_str)
    }

    pub fn code(&self) -> Option<&str> {
        self.get(CODE)
    }

    /// Path registered under `role`.
    pub fn path(&self, role: &str) -> Result<&Path, io::Error> {
        self.get(role)
            .map(Path::new)
            .ok_or_else(|| io::Error::MissingPath {
                role: role.to_string(),
            })
    }

    /// Default training-source tag.
    pub fn train(&self) -> &str {
        self.get(TRAIN).unwrap_or(DEFAULT_TRAIN)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_flat_table() {
        let files: FileMap = toml::from_str("code = \"qe\"\ndensity = \"rho.cube\"\n").unwrap();
        assert_eq!(files.code(), Some("qe"));
        assert_eq!(files.path("density").unwrap(), Path::new("rho.cube"));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn missing_role_is_missing_path() {
        let files = FileMap::new().with("code", "vasp");
        let err = files.path("energy").unwrap_err();
        assert!(matches!(err, io::Error::MissingPath { role } if role == "energy"));
    }

    #[test]
    fn train_defaults_to_literal() {
        assert_eq!(FileMap::new().train(), "train");
        let files: FileMap = [("train", "validation")].into_iter().collect();
        assert_eq!(files.train(), "validation");
    }
}
