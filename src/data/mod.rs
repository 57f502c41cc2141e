//! Local data provider: the four datasheet tables, loaded once from CSV.

pub mod images;
pub mod keywords;
pub mod loader;
pub mod roster;
pub mod tables;
pub mod validate;

pub use images::{datasheet_image, image_key, DatasheetImage, ImageError};
pub use keywords::{normalize_keyword, KeywordEntry};
pub use loader::{load_tables, normalize_lookup, DataError, DEFAULT_DATA_DIR};
pub use roster::{Datasheet, NumericStat, TextStat};
pub use tables::{ImageRecord, KeywordRecord, Tables, UnitRecord, WeaponRecord};
pub use validate::{validate_tables, ValidationDiagnostic, ValidationReport, ValidationSeverity};
