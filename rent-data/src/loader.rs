use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rent_core::{SuburbDirectory, SuburbRecord};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading a suburb directory.
#[derive(Debug, Error)]
pub enum DirectoryLoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported directory format '{0}' (expected .csv or .json)")]
    UnsupportedFormat(String),

    #[error("CSV parse error at record {record}: {message}")]
    Csv { record: usize, message: String },

    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("Record {record} ({name}) has a negative distance: {distance}")]
    NegativeDistance {
        record: usize,
        name: String,
        distance: Decimal,
    },
}

impl From<serde_json::Error> for DirectoryLoadError {
    fn from(err: serde_json::Error) -> Self {
        DirectoryLoadError::Json(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryFormat {
    Csv,
    Json,
}

impl DirectoryFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, DirectoryLoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(DirectoryLoadError::UnsupportedFormat(ext)),
        }
    }
}

/// One directory record as found on disk.
///
/// Two column schemas are in circulation: the descriptive one
/// (`Suburb`, `Town`, `Municipality`, `Distance_km`) and the census one
/// (`SP_NAME`, `MP_NAME`, `DC_NAME`, `DIST_KM`). Both carry `Province`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SuburbRow {
    #[serde(alias = "Suburb", alias = "SP_NAME")]
    pub name: String,
    #[serde(alias = "Town", alias = "MP_NAME")]
    pub town: String,
    #[serde(alias = "Municipality", alias = "DC_NAME")]
    pub municipality: String,
    #[serde(alias = "Province", default)]
    pub province: String,
    #[serde(
        alias = "Distance_km",
        alias = "DIST_KM",
        deserialize_with = "deserialize_distance"
    )]
    pub distance_km: Decimal,
}

impl SuburbRow {
    fn into_record(
        self,
        record: usize,
    ) -> Result<SuburbRecord, DirectoryLoadError> {
        let name = self.name.trim().to_string();
        if self.distance_km.is_sign_negative() && !self.distance_km.is_zero() {
            return Err(DirectoryLoadError::NegativeDistance {
                record,
                name,
                distance: self.distance_km,
            });
        }

        Ok(SuburbRecord {
            name,
            town: self.town.trim().to_string(),
            municipality: self.municipality.trim().to_string(),
            province: self.province.trim().to_string(),
            distance_km: self.distance_km,
        })
    }
}

/// Accepts the distance either as a number or as a numeric string.
fn deserialize_distance<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    struct DistanceVisitor;

    impl Visitor<'_> for DistanceVisitor {
        type Value = Decimal;

        fn expecting(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            f.write_str("a distance in kilometres")
        }

        fn visit_u64<E: de::Error>(
            self,
            v: u64,
        ) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_i64<E: de::Error>(
            self,
            v: i64,
        ) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_f64<E: de::Error>(
            self,
            v: f64,
        ) -> Result<Decimal, E> {
            Decimal::from_str(&v.to_string()).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(
            self,
            v: &str,
        ) -> Result<Decimal, E> {
            let trimmed = v.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| E::custom(format!("invalid distance '{v}'")))
        }
    }

    deserializer.deserialize_any(DistanceVisitor)
}

/// Parses suburb records from CSV, in file order.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<SuburbRecord>, DirectoryLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, result) in csv_reader.deserialize::<SuburbRow>().enumerate() {
        let record = idx + 1;
        let row = result.map_err(|e| DirectoryLoadError::Csv {
            record,
            message: e.to_string(),
        })?;
        records.push(row.into_record(record)?);
    }

    Ok(records)
}

/// Parses suburb records from a JSON array of objects, in array order.
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<SuburbRecord>, DirectoryLoadError> {
    let rows: Vec<SuburbRow> = serde_json::from_reader(reader)?;
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| row.into_record(idx + 1))
        .collect()
}

pub fn load_from_str(
    content: &str,
    format: DirectoryFormat,
) -> Result<SuburbDirectory, DirectoryLoadError> {
    let records = match format {
        DirectoryFormat::Csv => parse_csv(content.as_bytes())?,
        DirectoryFormat::Json => parse_json(content.as_bytes())?,
    };
    Ok(SuburbDirectory::new(records))
}

/// Loads a directory file, choosing the parser from its extension.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<SuburbDirectory, DirectoryLoadError> {
    let path = path.as_ref();
    let format = DirectoryFormat::from_path(path)?;
    let file = File::open(path).map_err(|source| DirectoryLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = match format {
        DirectoryFormat::Csv => parse_csv(file)?,
        DirectoryFormat::Json => parse_json(file)?,
    };
    info!(path = %path.display(), suburbs = records.len(), "loaded suburb directory");
    Ok(SuburbDirectory::new(records))
}
