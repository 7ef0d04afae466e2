use crate::error::{CliError, Result};
use ptmcharge::core::models::dataset::Dataset;
use ptmcharge::core::models::site::SiteModel;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// On-disk dataset layout.
///
/// ```toml
/// [[sites]]
/// id = "K12"
/// copies = 2
/// probabilities = { "-1" = 0.2, "0" = 0.6, "+1" = 0.2 }
/// ```
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DatasetFile {
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SiteEntry {
    pub id: String,
    pub copies: i64,
    pub probabilities: ChargeTable,
}

/// Charge-state probabilities keyed by signed charge strings (`"-2"`, `"0"`, `"+1"`).
#[derive(Debug, Default, PartialEq)]
pub struct ChargeTable(pub BTreeMap<i64, f64>);

/// Parses a charge key; a leading `+` is accepted.
pub fn parse_charge_key(key: &str) -> std::result::Result<i64, String> {
    key.trim()
        .parse()
        .map_err(|_| format!("invalid charge key '{}'", key))
}

pub fn format_charge_key(charge: i64) -> String {
    if charge > 0 {
        format!("+{}", charge)
    } else {
        charge.to_string()
    }
}

impl Serialize for ChargeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (&charge, p) in &self.0 {
            map.serialize_entry(&format_charge_key(charge), p)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChargeTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ChargeTableVisitor;

        impl<'de> Visitor<'de> for ChargeTableVisitor {
            type Value = ChargeTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of charge strings to probabilities")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ChargeTable, A::Error> {
                let mut table = BTreeMap::new();
                while let Some((key, p)) = access.next_entry::<String, f64>()? {
                    let charge = parse_charge_key(&key).map_err(de::Error::custom)?;
                    if table.insert(charge, p).is_some() {
                        return Err(de::Error::custom(format!("duplicate charge {}", charge)));
                    }
                }
                Ok(ChargeTable(table))
            }
        }

        deserializer.deserialize_map(ChargeTableVisitor)
    }
}

impl DatasetFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading dataset from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string(self).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates every entry into a [`Dataset`]; the first invalid site aborts.
    pub fn into_dataset(self) -> Result<Dataset> {
        let sites = self
            .sites
            .into_iter()
            .map(|entry| SiteModel::from_map(entry.id, entry.copies, &entry.probabilities.0))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Dataset::new(sites)?)
    }
}

impl From<&Dataset> for DatasetFile {
    fn from(dataset: &Dataset) -> Self {
        let sites = dataset
            .iter()
            .map(|site| SiteEntry {
                id: site.id().to_string(),
                copies: i64::from(site.copies()),
                probabilities: ChargeTable(site.states().collect()),
            })
            .collect();
        Self { sites }
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset = DatasetFile::from_file(path)?.into_dataset()?;
    info!(
        sites = dataset.len(),
        total_copies = dataset.total_copies(),
        support = %dataset.theoretical_support(),
        "Dataset loaded."
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptmcharge::core::models::error::ModelError;
    use ptmcharge::core::models::synthetic::SyntheticDatasetBuilder;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
[[sites]]
id = "K12"
copies = 2
probabilities = { "-1" = 0.2, "0" = 0.6, "+1" = 0.2 }

[[sites]]
id = "S40"
copies = 1
probabilities = { "0" = 0.3, "-2" = 0.7 }
"#;

    #[test]
    fn charge_keys_accept_explicit_plus_sign() {
        assert_eq!(parse_charge_key("+1"), Ok(1));
        assert_eq!(parse_charge_key("-2"), Ok(-2));
        assert_eq!(parse_charge_key(" 0 "), Ok(0));
        assert!(parse_charge_key("+-1").is_err());
        assert!(parse_charge_key("one").is_err());
    }

    #[test]
    fn charge_keys_format_with_sign() {
        assert_eq!(format_charge_key(2), "+2");
        assert_eq!(format_charge_key(0), "0");
        assert_eq!(format_charge_key(-3), "-3");
    }

    #[test]
    fn sample_file_parses_into_dataset_with_filled_gaps() {
        let file: DatasetFile = toml::from_str(SAMPLE).unwrap();
        let dataset = file.into_dataset().unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.total_copies(), 3);

        let s40 = &dataset.sites()[1];
        assert_eq!(s40.min_charge(), -2);
        assert_eq!(s40.state_count(), 3);
        assert_eq!(s40.probability_at(-1), 0.0);
    }

    #[test]
    fn invalid_site_is_reported_by_name() {
        let content = r#"
[[sites]]
id = "BAD"
copies = 1
probabilities = { "0" = 0.5, "1" = 0.4 }
"#;
        let file: DatasetFile = toml::from_str(content).unwrap();
        match file.into_dataset() {
            Err(CliError::Model(ModelError::InvalidSiteProbabilities { site, .. })) => {
                assert_eq!(site, "BAD")
            }
            other => panic!("expected invalid site error, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_charges_are_rejected() {
        let content = r#"
[[sites]]
id = "DUP"
copies = 1
probabilities = { "1" = 0.5, "+1" = 0.5 }
"#;
        assert!(toml::from_str::<DatasetFile>(content).is_err());
    }

    #[test]
    fn empty_file_is_an_empty_dataset() {
        let file: DatasetFile = toml::from_str("").unwrap();
        assert!(file.into_dataset().unwrap().is_empty());
    }

    #[test]
    fn generated_dataset_survives_a_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.toml");
        let dataset = SyntheticDatasetBuilder::new(4).seed(1).build().unwrap();

        DatasetFile::from(&dataset).write_to(&path).unwrap();
        let loaded = load_dataset(&path).unwrap();

        assert_eq!(loaded.len(), 4);
        for (a, b) in dataset.iter().zip(loaded.iter()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.support(), b.support());
            for (p, q) in a.probabilities().iter().zip(b.probabilities()) {
                assert!((p - q).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_dataset(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
