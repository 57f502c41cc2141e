//! Load the datasheet tables from a data directory. `images.csv` is optional.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::data::tables::Tables;

pub const DEFAULT_DATA_DIR: &str = "data";

pub const UNITS_FILE: &str = "units.csv";
pub const WEAPONS_FILE: &str = "weapons.csv";
pub const KEYWORDS_FILE: &str = "keywords.csv";
pub const IMAGES_FILE: &str = "images.csv";

#[derive(Debug)]
pub enum DataError {
    Missing(PathBuf),
    Csv { path: PathBuf, source: csv::Error },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "table not found: {}", path.display()),
            Self::Csv { path, source } => {
                write!(f, "failed to read table {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Missing(_) => None,
            Self::Csv { source, .. } => Some(source),
        }
    }
}

/// Normalize a string for lookup: lowercase, collapse spaces/underscores.
pub fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    if !path.is_file() {
        return Err(DataError::Missing(path.to_path_buf()));
    }
    let csv_error = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_error)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_error)
}

pub fn load_tables(data_dir: impl AsRef<Path>) -> Result<Tables, DataError> {
    let dir = data_dir.as_ref();
    let units = read_table(&dir.join(UNITS_FILE))?;
    let weapons = read_table(&dir.join(WEAPONS_FILE))?;
    let keywords = read_table(&dir.join(KEYWORDS_FILE))?;
    let images = match read_table(&dir.join(IMAGES_FILE)) {
        Err(DataError::Missing(path)) => {
            log::info!("(load_tables) no image table at {}", path.display());
            Vec::new()
        }
        other => other?,
    };

    log::info!(
        "(load_tables) loaded {} units, {} weapons, {} keywords, {} images from {}",
        units.len(),
        weapons.len(),
        keywords.len(),
        images.len(),
        dir.display()
    );
    Ok(Tables {
        units,
        weapons,
        keywords,
        images,
    })
}

impl Tables {
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, DataError> {
        load_tables(data_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir(name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("datasheets-{name}-{stamp}"))
    }

    #[test]
    fn normalize_lookup_collapses_case_and_separators() {
        assert_eq!(normalize_lookup("Intercessor  Squad"), "intercessor_squad");
        assert_eq!(normalize_lookup("intercessor_squad"), "intercessor_squad");
        assert_eq!(normalize_lookup(" Boyz "), "boyz");
    }

    #[test]
    fn missing_directory_reports_the_units_table() {
        let err = load_tables("does/not/exist").unwrap_err();
        assert!(matches!(err, DataError::Missing(ref p) if p.ends_with(UNITS_FILE)));
    }

    #[test]
    fn missing_images_table_loads_as_empty() {
        let dir = unique_temp_dir("no-images");
        fs::create_dir_all(&dir).expect("temp dir should be created");
        for file in [UNITS_FILE, WEAPONS_FILE, KEYWORDS_FILE] {
            fs::copy(Path::new(DEFAULT_DATA_DIR).join(file), dir.join(file))
                .expect("bundled table should copy");
        }

        let tables = load_tables(&dir).expect("tables without images should load");
        assert_eq!(tables.units.len(), 5);
        assert!(!tables.weapons.is_empty());
        assert!(tables.images.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }
}
