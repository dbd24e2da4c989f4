//! Data Processor Module
//! Cleaning and normalization steps applied to the raw wildfire log.

use crate::data::schema::{fire, M2_PER_HECTARE, RENAMES};
use log::debug;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Column '{0}' already exists and would be overwritten")]
    ColumnClash(String),
    #[error("Invalid value '{value}' in column '{column}' (row {row})")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
}

/// Normalization steps for the wildfire table.
pub struct DataProcessor;

impl DataProcessor {
    /// Rename the known source headers to their canonical names.
    ///
    /// Every source header must be present. Columns outside the mapping pass
    /// through untouched, but they may not already use a canonical or derived
    /// name.
    pub fn rename_to_canonical(df: &mut DataFrame) -> Result<(), ProcessorError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for (source, _) in RENAMES {
            if !names.iter().any(|n| n == source) {
                return Err(ProcessorError::MissingColumn(source.to_string()));
            }
        }

        let is_source = |n: &str| RENAMES.iter().any(|(source, _)| *source == n);
        let reserved = RENAMES
            .iter()
            .map(|(_, target)| *target)
            .chain(fire::DERIVED);
        for target in reserved {
            if names.iter().any(|n| n == target && !is_source(n.as_str())) {
                return Err(ProcessorError::ColumnClash(target.to_string()));
            }
        }

        for (source, target) in RENAMES {
            df.rename(source, target.into())?;
        }
        debug!("Renamed {} columns to canonical names", RENAMES.len());
        Ok(())
    }

    /// Parse a text column into `Int32`, strictly. Empty cells stay null.
    pub fn parse_i32(df: &mut DataFrame, name: &str) -> Result<(), ProcessorError> {
        let values = Self::parse_column(df, name, |s| s.parse::<i32>().ok())?;
        df.with_column(Column::new(name.into(), values))?;
        Ok(())
    }

    /// Parse a text column into finite `Float64`, strictly. Empty cells stay null.
    pub fn parse_f64(df: &mut DataFrame, name: &str) -> Result<(), ProcessorError> {
        let values = Self::parse_column(df, name, |s| {
            s.parse::<f64>().ok().filter(|v| v.is_finite())
        })?;
        df.with_column(Column::new(name.into(), values))?;
        Ok(())
    }

    fn parse_column<T>(
        df: &DataFrame,
        name: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Vec<Option<T>>, ProcessorError> {
        let ca = df.column(name)?.str()?;
        ca.into_iter()
            .enumerate()
            .map(|(row, value)| match value.map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => parse(text).map(Some).ok_or_else(|| ProcessorError::InvalidValue {
                    column: name.to_string(),
                    row,
                    value: text.to_string(),
                }),
            })
            .collect()
    }

    /// Add `surface_ha` = `surface` / 10 000. Null surfaces stay null.
    pub fn with_surface_ha(df: DataFrame) -> Result<DataFrame, ProcessorError> {
        let df = df
            .lazy()
            .with_column((col(fire::SURFACE) / lit(M2_PER_HECTARE)).alias(fire::SURFACE_HA))
            .collect()?;
        Ok(df)
    }

    /// Title-case a text column in place. Missing values are skipped, never dropped.
    pub fn title_case_column(df: &mut DataFrame, name: &str) -> Result<(), ProcessorError> {
        let values: Vec<Option<String>> = df
            .column(name)?
            .str()?
            .into_iter()
            .map(|v| v.map(title_case))
            .collect();
        df.with_column(Column::new(name.into(), values))?;
        Ok(())
    }

    /// Replace the `alert` column with `date` and `time`.
    pub fn split_alert_column(df: &mut DataFrame) -> Result<(), ProcessorError> {
        let alert = df.drop_in_place(fire::ALERT)?;
        let (dates, times): (Vec<Option<String>>, Vec<Option<String>>) = alert
            .str()?
            .into_iter()
            .map(|v| match v.map(split_alert) {
                Some((date, time)) => (Some(date.to_string()), time.map(str::to_string)),
                None => (None, None),
            })
            .unzip();

        df.with_column(Column::new(fire::DATE.into(), dates))?;
        df.with_column(Column::new(fire::TIME.into(), times))?;
        Ok(())
    }
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A word starts after any character that is not a letter, so
/// `"SAINT-JEAN d'arves"` becomes `"Saint-Jean D'Arves"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Split an alert timestamp on its first whitespace into (date, time).
pub fn split_alert(alert: &str) -> (&str, Option<&str>) {
    match alert.split_once(char::is_whitespace) {
        Some((date, time)) => (date, Some(time)),
        None => (alert, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        df![
            "Année" => ["2022", "2023"],
            "Numéro" => ["1", "2"],
            "Type de feu" => ["Forêt", "Forêt"],
            "Département" => ["06", "2A"],
            "Code INSEE" => ["06004", "2A004"],
            "Commune" => ["ANTIBES", "ajaccio"],
            "Lieu-dit" => ["cap d'antibes", "LE RICANTO"],
            "Code du carreau DFCI" => ["NC22", "LB14"],
            "Alerte" => ["2022-07-01 14:05:00", "2023-08-12"],
            "Origine de l'alerte" => ["Vigie", "Public"],
            "Surface parcourue (m2)" => ["10000", ""],
            "Extra" => ["a", "b"],
        ]
        .unwrap()
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ANTIBES"), "Antibes");
        assert_eq!(title_case("saint-jean d'arves"), "Saint-Jean D'Arves");
        assert_eq!(title_case("le  grand bois"), "Le  Grand Bois");
        assert_eq!(title_case("écluse"), "Écluse");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_split_alert_first_whitespace_only() {
        assert_eq!(
            split_alert("2022-07-01 14:05:00"),
            ("2022-07-01", Some("14:05:00"))
        );
        assert_eq!(split_alert("01/07/2022 14:05 UTC"), ("01/07/2022", Some("14:05 UTC")));
        assert_eq!(split_alert("2022-07-01"), ("2022-07-01", None));
    }

    #[test]
    fn test_rename_keeps_passthrough_columns() {
        let mut df = raw_frame();
        DataProcessor::rename_to_canonical(&mut df).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        for (_, target) in RENAMES {
            assert!(names.iter().any(|n| n == target), "missing {target}");
        }
        assert!(names.iter().any(|n| n == "Extra"));
        assert!(!names.iter().any(|n| n == "Année"));
    }

    #[test]
    fn test_rename_missing_column() {
        let mut df = raw_frame().drop("Lieu-dit").unwrap();
        let err = DataProcessor::rename_to_canonical(&mut df).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn(c) if c == "Lieu-dit"));
    }

    #[test]
    fn test_rename_target_clash() {
        let mut df = raw_frame();
        df.with_column(Column::new("surface_ha".into(), ["x", "y"]))
            .unwrap();
        let err = DataProcessor::rename_to_canonical(&mut df).unwrap_err();
        assert!(matches!(err, ProcessorError::ColumnClash(c) if c == "surface_ha"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let mut df = df!["year" => ["2022", "20x2"]].unwrap();
        let err = DataProcessor::parse_i32(&mut df, "year").unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidValue { row: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_non_finite_surface() {
        for bad in ["NaN", "inf", "-infinity"] {
            let mut df = df!["surface" => ["100", bad]].unwrap();
            let err = DataProcessor::parse_f64(&mut df, "surface").unwrap_err();
            assert!(
                matches!(&err, ProcessorError::InvalidValue { row: 1, value, .. } if value == bad),
                "{err}"
            );
        }
    }

    #[test]
    fn test_surface_ha_keeps_nulls() {
        let mut df = df!["surface" => [Some("25000"), None, Some(" 500 ")]].unwrap();
        DataProcessor::parse_f64(&mut df, "surface").unwrap();
        let df = DataProcessor::with_surface_ha(df).unwrap();
        let ha: Vec<Option<f64>> = df.column("surface_ha").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(ha, vec![Some(2.5), None, Some(0.05)]);
    }

    #[test]
    fn test_split_alert_column_drops_alert() {
        let mut df = df!["alert" => [Some("2022-07-01 14:05:00"), Some("2023-08-12"), None]].unwrap();
        DataProcessor::split_alert_column(&mut df).unwrap();
        assert!(df.column("alert").is_err());
        let dates: Vec<Option<&str>> = df.column("date").unwrap().str().unwrap().into_iter().collect();
        let times: Vec<Option<&str>> = df.column("time").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(dates, vec![Some("2022-07-01"), Some("2023-08-12"), None]);
        assert_eq!(times, vec![Some("14:05:00"), None, None]);
    }
}
