use crate::domain::model::{Unit, UnitDefinition};
use crate::utils::error::{ConvertError, Result};
use serde::Deserialize;
use std::path::Path;

const BASIC_UNITS: [(&str, f64); 5] = [
    ("m", 1000.0),
    ("cm", 10.0),
    ("in", 25.4),
    ("ft", 304.8),
    ("yd", 914.4),
];

const EXTENSION_UNITS: [(&str, f64); 5] = [
    ("mm", 1.0),
    ("km", 1_000_000.0),
    ("mi", 1_609_344.0),
    ("cu", 457.2),
    ("my", 829.66),
];

/// 擴充目錄中單一 TOML 檔的格式
#[derive(Debug, Deserialize)]
struct ExtensionFile {
    #[serde(default)]
    units: Vec<UnitDefinition>,
}

/// Ordered set of units with distinct names.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: Vec<Unit>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metre, centimetre, inch, foot and yard.
    pub fn basic() -> Self {
        let mut catalog = Self::new();
        catalog.extend_builtin(&BASIC_UNITS);
        catalog
    }

    /// The basic units followed by mm, km, mi, cu (cubit) and my (megalithic yard).
    pub fn extended() -> Self {
        let mut catalog = Self::basic();
        catalog.extend_builtin(&EXTENSION_UNITS);
        catalog
    }

    fn extend_builtin(&mut self, table: &[(&str, f64)]) {
        for (name, millimetres) in table {
            self.units.push(Unit::builtin(name, *millimetres));
        }
    }

    /// Appends `unit` unless a unit with the same name is already present.
    /// The first registration of a name wins.
    pub fn register(&mut self, unit: Unit) -> bool {
        if self.get(unit.name()).is_some() {
            tracing::warn!("⚠️ Unit '{}' already registered, ignoring duplicate", unit.name());
            return false;
        }
        tracing::debug!("Registered unit '{}' ({} mm)", unit.name(), unit.millimetres());
        self.units.push(unit);
        true
    }

    /// Validates every definition before registering any of them.
    /// Returns how many were actually added.
    pub fn register_definitions(&mut self, definitions: &[UnitDefinition]) -> Result<usize> {
        let units = definitions
            .iter()
            .map(Unit::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(units
            .into_iter()
            .map(|unit| self.register(unit))
            .filter(|added| *added)
            .count())
    }

    /// Registers the `[[units]]` of every `*.toml` file in `dir`, in file name order.
    ///
    /// A missing directory is not an error; it simply contributes nothing.
    pub fn load_extensions_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            tracing::debug!("Extensions directory {} not found, skipping", dir.display());
            return Ok(0);
        }

        let mut files = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        files.retain(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("toml"));
        files.sort();

        let mut added = 0;
        for path in files {
            let content = std::fs::read_to_string(&path)?;
            let parsed: ExtensionFile =
                toml::from_str(&content).map_err(|e| ConvertError::ConfigValidationError {
                    field: path.display().to_string(),
                    message: format!("TOML parsing error: {}", e),
                })?;
            let count = self.register_definitions(&parsed.units)?;
            tracing::info!("🧩 Loaded {} unit(s) from {}", count, path.display());
            added += count;
        }

        Ok(added)
    }

    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.units.iter().map(|u| u.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_basic_catalog_order() {
        let catalog = UnitCatalog::basic();
        assert_eq!(catalog.names(), vec!["m", "cm", "in", "ft", "yd"]);
    }

    #[test]
    fn test_extended_catalog_has_ten_units() {
        let catalog = UnitCatalog::extended();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.get("my").unwrap().millimetres(), 829.66);
        assert_eq!(catalog.get("mi").unwrap().millimetres(), 1_609_344.0);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = UnitCatalog::basic();
        assert!(catalog.get("cm").is_some());
        assert!(catalog.get("CM").is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut catalog = UnitCatalog::basic();
        assert!(!catalog.register(Unit::new("m", 1.0).unwrap()));
        assert_eq!(catalog.get("m").unwrap().millimetres(), 1000.0);
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_register_definitions_is_all_or_nothing() {
        let mut catalog = UnitCatalog::basic();
        let defs = vec![
            UnitDefinition {
                name: "ch".to_string(),
                millimetres: 20116.8,
            },
            UnitDefinition {
                name: "bad".to_string(),
                millimetres: -1.0,
            },
        ];
        assert!(catalog.register_definitions(&defs).is_err());
        assert!(catalog.get("ch").is_none());
    }

    #[test]
    fn test_load_extensions_dir() {
        let dir = TempDir::new().unwrap();

        let mut b = std::fs::File::create(dir.path().join("b.toml")).unwrap();
        b.write_all(b"[[units]]\nname = \"fur\"\nmillimetres = 201168.0\n")
            .unwrap();
        let mut a = std::fs::File::create(dir.path().join("a.toml")).unwrap();
        a.write_all(b"[[units]]\nname = \"ch\"\nmillimetres = 20116.8\n\n[[units]]\nname = \"m\"\nmillimetres = 1.0\n")
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut catalog = UnitCatalog::basic();
        let added = catalog.load_extensions_dir(dir.path()).unwrap();

        assert_eq!(added, 2);
        assert_eq!(
            catalog.names(),
            vec!["m", "cm", "in", "ft", "yd", "ch", "fur"]
        );
    }

    #[test]
    fn test_missing_extensions_dir_is_empty() {
        let mut catalog = UnitCatalog::basic();
        let added = catalog
            .load_extensions_dir("/definitely/not/a/real/dir")
            .unwrap();
        assert_eq!(added, 0);
    }

    #[test]
    fn test_invalid_extension_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.toml"), "[[units]\nname=").unwrap();

        let mut catalog = UnitCatalog::basic();
        assert!(matches!(
            catalog.load_extensions_dir(dir.path()),
            Err(ConvertError::ConfigValidationError { .. })
        ));
    }
}
