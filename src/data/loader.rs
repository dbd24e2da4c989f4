//! Wildfire Log Loader Module
//! Reads the semicolon-delimited log with Polars and normalizes it into a `FireTable`.

use crate::data::processor::{DataProcessor, ProcessorError};
use crate::data::schema::fire;
use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Duplicate event number: {0}")]
    DuplicateEventNumber(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl From<ProcessorError> for LoaderError {
    fn from(err: ProcessorError) -> Self {
        match err {
            ProcessorError::MissingColumn(_) | ProcessorError::ColumnClash(_) => {
                LoaderError::Schema(err.to_string())
            }
            ProcessorError::InvalidValue { .. } => LoaderError::Parse(err.to_string()),
            ProcessorError::PolarsError(e) => LoaderError::Polars(e),
        }
    }
}

/// Configuration for the `FireLoader`.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Raw banner lines to skip before the header line
    pub skip_lines: usize,
    /// Field separator
    pub separator: u8,
    /// Fail the load when two rows share an event number
    pub unique_event_numbers: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            skip_lines: 2,
            separator: b';',
            unique_event_numbers: false,
        }
    }
}

/// Normalized wildfire table, indexed by event number.
///
/// `index` and `data` are row-aligned. The event number lives only in the
/// index; `data` holds the remaining canonical and derived columns.
#[derive(Debug, Clone)]
pub struct FireTable {
    index: Column,
    data: DataFrame,
}

impl FireTable {
    /// Build a table from an already-normalized frame, promoting `number` to the index.
    pub fn from_normalized(mut data: DataFrame) -> PolarsResult<Self> {
        let index = data.drop_in_place(fire::NUMBER)?;
        Ok(Self { index, data })
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Event numbers, row-aligned with `data()`.
    pub fn index(&self) -> &Column {
        &self.index
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Event numbers seen more than once, in first-repeat order.
    pub fn duplicate_event_numbers(&self) -> PolarsResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for number in self.index.str()?.into_iter().flatten() {
            if !seen.insert(number) && reported.insert(number) {
                duplicates.push(number.to_string());
            }
        }
        Ok(duplicates)
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> PolarsResult<Vec<i32>> {
        let years: BTreeSet<i32> = self
            .data
            .column(fire::YEAR)?
            .i32()?
            .into_iter()
            .flatten()
            .collect();
        Ok(years.into_iter().collect())
    }

    /// Distinct department codes present, ascending.
    pub fn departments(&self) -> PolarsResult<Vec<String>> {
        let departments: BTreeSet<&str> = self
            .data
            .column(fire::DEPARTMENT)?
            .str()?
            .into_iter()
            .flatten()
            .collect();
        Ok(departments.into_iter().map(str::to_string).collect())
    }
}

/// Loads the wildfire log and runs the normalization pipeline.
pub struct FireLoader {
    config: LoaderConfig,
}

impl Default for FireLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FireLoader {
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load and normalize a wildfire log.
    pub fn load(&self, file_path: impl AsRef<Path>) -> Result<FireTable, LoaderError> {
        let path = file_path.as_ref();
        let raw = self.read_raw(path)?;
        info!(
            "Read {} rows x {} columns from {}",
            raw.height(),
            raw.width(),
            path.display()
        );

        let table = self.normalize(raw)?;
        if table.is_empty() {
            warn!("{} holds no fire events", path.display());
        } else {
            info!("Normalized {} fire events", table.height());
        }
        Ok(table)
    }

    /// Read every column as text so department codes keep their leading zeros.
    ///
    /// Polars pads short records with nulls, so field counts are checked on
    /// the raw text first.
    fn read_raw(&self, path: &Path) -> Result<DataFrame, LoaderError> {
        let parse_err = |e: PolarsError| LoaderError::Parse(format!("{}: {}", path.display(), e));

        let bytes = fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| LoaderError::Parse(format!("{}: {}", path.display(), e)))?;
        check_field_counts(text, self.config.skip_lines, self.config.separator)
            .map_err(|msg| LoaderError::Parse(format!("{}: {}", path.display(), msg)))?;

        LazyCsvReader::new(path)
            .with_skip_lines(self.config.skip_lines)
            .with_has_header(true)
            .with_separator(self.config.separator)
            .with_encoding(CsvEncoding::Utf8)
            .with_infer_schema_length(Some(0))
            .finish()
            .map_err(parse_err)?
            .collect()
            .map_err(parse_err)
    }

    /// Run the normalization steps over a raw text frame.
    pub fn normalize(&self, mut df: DataFrame) -> Result<FireTable, LoaderError> {
        DataProcessor::rename_to_canonical(&mut df)?;
        DataProcessor::parse_i32(&mut df, fire::YEAR)?;
        DataProcessor::parse_f64(&mut df, fire::SURFACE)?;
        let mut df = DataProcessor::with_surface_ha(df)?;

        DataProcessor::title_case_column(&mut df, fire::CITIES)?;
        DataProcessor::title_case_column(&mut df, fire::LOCATION)?;
        DataProcessor::split_alert_column(&mut df)?;

        let table = FireTable::from_normalized(df)?;

        let duplicates = table.duplicate_event_numbers()?;
        if !duplicates.is_empty() {
            if self.config.unique_event_numbers {
                return Err(LoaderError::DuplicateEventNumber(duplicates.join(", ")));
            }
            warn!(
                "{} event numbers appear more than once (first: {})",
                duplicates.len(),
                duplicates[0]
            );
        }
        debug!("Columns: {:?}", table.data().get_column_names());

        Ok(table)
    }
}

/// Every record after the header must have as many fields as the header.
///
/// The first `skip_lines` raw lines are ignored. Separators and newlines inside
/// double quotes do not count; blank lines are ignored.
fn check_field_counts(text: &str, skip_lines: usize, separator: u8) -> Result<(), String> {
    let separator = separator as char;
    let body = text.splitn(skip_lines + 1, '\n').nth(skip_lines).unwrap_or("");

    let mut expected = None;
    let mut fields = 1;
    let mut in_quotes = false;
    let mut blank = true;
    let mut line = skip_lines + 1;
    let mut record_line = line;

    for c in body.chars().chain(std::iter::once('\n')) {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                blank = false;
            }
            '\n' if !in_quotes => {
                if !blank {
                    match expected {
                        None => expected = Some(fields),
                        Some(n) if n != fields => {
                            return Err(format!(
                                "line {}: expected {} fields, found {}",
                                record_line, n, fields
                            ));
                        }
                        Some(_) => {}
                    }
                }
                fields = 1;
                blank = true;
                line += 1;
                record_line = line;
            }
            '\n' => line += 1,
            '\r' => {}
            c if c == separator && !in_quotes => {
                fields += 1;
                blank = false;
            }
            _ => blank = false,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Année;Numéro;Type de feu;Département;Code INSEE;Commune;Lieu-dit;Code du carreau DFCI;Alerte;Origine de l'alerte;Surface parcourue (m2)";

    fn write_log(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Base de Données sur les Incendies de Forêts en France").unwrap();
        writeln!(file, "Export du 01/01/2024").unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn sample_log() -> NamedTempFile {
        write_log(&[
            "2022;101;Forêt;06;06004;ANTIBES;cap d'antibes;NC22;2022-07-01 14:05:00;Vigie;10000",
            "2022;102;Forêt;06;06088;nice;;NC23;2022-07-02 09:30:00;Public;20000",
            "2022;103;Autre;13;13001;;LA CRAU;KD11;2022-08-15;Patrouille;5000",
            "2023;104;Forêt;2A;2A004;AJACCIO;le ricanto;LB14;2023-06-20 18:00:00;Vigie;",
        ])
    }

    fn floats(table: &FireTable, name: &str) -> Vec<Option<f64>> {
        table.data().column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    fn strings(table: &FireTable, name: &str) -> Vec<Option<String>> {
        table
            .data()
            .column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_load_normalizes_schema() {
        let file = sample_log();
        let table = FireLoader::new().load(file.path()).unwrap();

        assert_eq!(table.height(), 4);
        let names: Vec<String> = table
            .data()
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(!names.iter().any(|n| n == "number" || n == "alert"));
        for expected in ["year", "department", "surface", "surface_ha", "date", "time"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }

        let index: Vec<Option<&str>> = table.index().str().unwrap().into_iter().collect();
        assert_eq!(index, vec![Some("101"), Some("102"), Some("103"), Some("104")]);
    }

    #[test]
    fn test_load_keeps_department_codes_as_text() {
        let file = sample_log();
        let table = FireLoader::new().load(file.path()).unwrap();
        assert_eq!(table.departments().unwrap(), vec!["06", "13", "2A"]);
        assert_eq!(table.years().unwrap(), vec![2022, 2023]);
    }

    #[test]
    fn test_surface_ha_is_surface_over_ten_thousand() {
        let file = sample_log();
        let table = FireLoader::new().load(file.path()).unwrap();
        let surface = floats(&table, "surface");
        let surface_ha = floats(&table, "surface_ha");
        for (m2, ha) in surface.iter().zip(surface_ha.iter()) {
            match (m2, ha) {
                (Some(m2), Some(ha)) => assert!((m2 / 10_000.0 - ha).abs() < 1e-12),
                (None, None) => {}
                other => panic!("null mismatch: {:?}", other),
            }
        }
        assert_eq!(surface_ha[3], None);
    }

    #[test]
    fn test_text_cleaning_keeps_missing_rows() {
        let file = sample_log();
        let table = FireLoader::new().load(file.path()).unwrap();
        assert_eq!(
            strings(&table, "cities"),
            vec![
                Some("Antibes".to_string()),
                Some("Nice".to_string()),
                None,
                Some("Ajaccio".to_string())
            ]
        );
        assert_eq!(strings(&table, "location")[0].as_deref(), Some("Cap D'Antibes"));
        assert_eq!(strings(&table, "location")[1], None);
    }

    #[test]
    fn test_alert_split_round_trips() {
        let file = sample_log();
        let table = FireLoader::new().load(file.path()).unwrap();
        let dates = strings(&table, "date");
        let times = strings(&table, "time");
        let originals = [
            "2022-07-01 14:05:00",
            "2022-07-02 09:30:00",
            "2022-08-15",
            "2023-06-20 18:00:00",
        ];
        for ((date, time), original) in dates.iter().zip(times.iter()).zip(originals) {
            let date = date.as_deref().unwrap();
            match time {
                Some(time) => assert_eq!(format!("{} {}", date, time), original),
                None => assert_eq!(date, original),
            }
        }
        assert_eq!(times[2], None);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "banner\nbanner").unwrap();
        writeln!(file, "Année;Numéro;Département").unwrap();
        writeln!(file, "2022;1;06").unwrap();
        file.flush().unwrap();

        let err = FireLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::Schema(_)), "{err}");
    }

    #[test]
    fn test_unparseable_year_is_parse_error() {
        let file = write_log(&["20x2;1;Forêt;06;06004;A;B;C;2022-07-01 10:00;Vigie;100"]);
        let err = FireLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::Parse(_)), "{err}");
    }

    #[test]
    fn test_short_row_is_parse_error() {
        let file = write_log(&[
            "2022;1;Forêt;06;06004;A;B;C;2022-07-01 10:00;Vigie;100",
            "2022;2;F;06",
        ]);
        let err = FireLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(&err, LoaderError::Parse(msg) if msg.contains("line 5")), "{err}");
    }

    #[test]
    fn test_long_row_is_parse_error() {
        let file = write_log(&["2022;1;Forêt;06;06004;A;B;C;2022-07-01 10:00;Vigie;100;x;y"]);
        let err = FireLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::Parse(_)), "{err}");
    }

    #[test]
    fn test_banner_lines_skipped_verbatim() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\"Liste des incendies").unwrap();
        writeln!(file, "b2").unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "2022;1;Forêt;06;06004;A;B;C;2022-07-01 10:00;Vigie;100").unwrap();
        file.flush().unwrap();

        let table = FireLoader::new().load(file.path()).unwrap();
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_field_counts_respect_quotes() {
        assert!(check_field_counts("banner\na;b\n\"x;y\";z\n\r\n", 1, b';').is_ok());
        assert!(check_field_counts("a;b\n\"x\ny\";z\n", 0, b';').is_ok());
        let err = check_field_counts("a;b;c\n1;2;3\n1;2\n", 0, b';').unwrap_err();
        assert_eq!(err, "line 3: expected 3 fields, found 2");
    }

    #[test]
    fn test_non_utf8_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "b1\nb2\n{}", HEADER).unwrap();
        file.write_all(b"2022;1;For\xeat;06;06004;A;B;C;2022-07-01;Vigie;100\n").unwrap();
        file.flush().unwrap();
        let err = FireLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::Parse(_)), "{err}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FireLoader::new()
            .load("/nonexistent/wildfires.csv")
            .unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }

    #[test]
    fn test_duplicate_event_numbers() {
        let file = write_log(&[
            "2022;7;Forêt;06;06004;A;B;C;2022-07-01 10:00;Vigie;100",
            "2022;7;Forêt;06;06004;A;B;C;2022-07-02 10:00;Vigie;200",
        ]);

        let table = FireLoader::new().load(file.path()).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.duplicate_event_numbers().unwrap(), vec!["7"]);

        let strict = FireLoader::with_config(LoaderConfig {
            unique_event_numbers: true,
            ..LoaderConfig::default()
        });
        let err = strict.load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::DuplicateEventNumber(n) if n == "7"));
    }
}
