/// Disease reference catalog
///
/// Structured background data keyed by disease label, used to flesh out the
/// generated reports and the assessment response. The catalog is advisory: a
/// missing or unreadable file degrades to an empty catalog so predictions
/// still work, just without detail sections.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Reference record for one disease
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiseaseInfo {
    #[serde(default)]
    pub definition: Vec<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub causes: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub treatment: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
}

/// Catalog of disease reference records
pub struct DiseaseCatalog {
    entries: HashMap<String, DiseaseInfo>,
}

impl DiseaseCatalog {
    /// Load the catalog from a JSON document mapping label -> record
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        let entries = match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Invalid disease reference file {:?}: {}", path, e);
                    HashMap::new()
                }
            },
            Err(e) => {
                tracing::warn!("Disease reference file {:?} not readable: {}", path, e);
                HashMap::new()
            }
        };

        Self { entries }
    }

    /// Reference record for a disease label, if known
    pub fn get(&self, disease: &str) -> Option<&DiseaseInfo> {
        self.entries.get(disease)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"Influenza": {"definition": ["A viral infection"], "treatment": ["Rest"]}}"#,
        )
        .unwrap();

        let catalog = DiseaseCatalog::load(file.path());
        let info = catalog.get("Influenza").unwrap();
        assert_eq!(info.definition, vec!["A viral infection"]);
        assert_eq!(info.treatment, vec!["Rest"]);
        assert!(info.causes.is_empty());
        assert!(catalog.get("Unknown").is_none());
    }

    #[test]
    fn test_missing_file_degrades_to_empty_catalog() {
        let catalog = DiseaseCatalog::load("/nonexistent/disease_info.json");
        assert!(catalog.get("Influenza").is_none());
    }
}
