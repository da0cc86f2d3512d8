use crate::models::CityRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

const NAME_COLUMNS: &[&str] = &["name", "nom", "city"];
const LATITUDE_COLUMNS: &[&str] = &["latitude", "lat"];
const LONGITUDE_COLUMNS: &[&str] = &["longitude", "lon", "lng"];

/// Errors that make the catalog source unusable
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog source: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog source is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Catalog source has no usable rows ({dropped} dropped)")]
    Empty { dropped: usize },
}

/// Why a source row was left out of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Latitude or longitude missing or not numeric
    InvalidCoordinate,
    /// Numeric coordinate outside [-90, 90] x [-180, 180]
    OutOfRange,
    MissingName,
    /// Row the CSV parser could not decode
    Malformed,
}

/// Outcome of a catalog load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    #[serde(rename = "rawRows")]
    pub raw_rows: usize,
    pub kept: usize,
    #[serde(rename = "invalidCoordinate")]
    pub invalid_coordinate: usize,
    #[serde(rename = "outOfRange")]
    pub out_of_range: usize,
    #[serde(rename = "missingName")]
    pub missing_name: usize,
    pub malformed: usize,
}

impl LoadReport {
    pub fn dropped(&self) -> usize {
        self.invalid_coordinate + self.out_of_range + self.missing_name + self.malformed
    }

    fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::InvalidCoordinate => self.invalid_coordinate += 1,
            DropReason::OutOfRange => self.out_of_range += 1,
            DropReason::MissingName => self.missing_name += 1,
            DropReason::Malformed => self.malformed += 1,
        }
    }
}

/// Immutable table of cities, built once and shared read-only
#[derive(Debug, Clone)]
pub struct Catalog {
    cities: Vec<CityRecord>,
    first_by_name: HashMap<String, usize>,
    sorted_names: Vec<String>,
    report: LoadReport,
}

impl Catalog {
    /// Load a comma-delimited catalog file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Self::load_with_delimiter(path, b',')
    }

    pub fn load_with_delimiter<P: AsRef<Path>>(
        path: P,
        delimiter: u8,
    ) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        tracing::debug!("Loading city catalog from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader_with_delimiter(file, delimiter)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Self::from_reader_with_delimiter(reader, b',')
    }

    /// Parse a delimited source with a header row
    ///
    /// Rows whose coordinates do not coerce to finite in-range numbers are
    /// dropped and counted in the [`LoadReport`]. Unreadable sources and
    /// missing columns are errors.
    pub fn from_reader_with_delimiter<R: Read>(
        reader: R,
        delimiter: u8,
    ) -> Result<Self, CatalogError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let name_idx = find_column(&headers, NAME_COLUMNS).ok_or(CatalogError::MissingColumn("name"))?;
        let lat_idx = find_column(&headers, LATITUDE_COLUMNS)
            .ok_or(CatalogError::MissingColumn("latitude"))?;
        let lon_idx = find_column(&headers, LONGITUDE_COLUMNS)
            .ok_or(CatalogError::MissingColumn("longitude"))?;

        let mut report = LoadReport::default();
        let mut cities = Vec::new();

        for result in rdr.records() {
            report.raw_rows += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    tracing::trace!("Skipping malformed catalog row: {}", e);
                    report.record_drop(DropReason::Malformed);
                    continue;
                }
            };

            match parse_row(&record, name_idx, lat_idx, lon_idx) {
                Ok(city) => cities.push(city),
                Err(reason) => report.record_drop(reason),
            }
        }

        report.kept = cities.len();

        if cities.is_empty() {
            return Err(CatalogError::Empty {
                dropped: report.dropped(),
            });
        }

        if report.dropped() > 0 {
            tracing::warn!(
                "Dropped {} of {} catalog rows (invalid coordinate: {}, out of range: {}, missing name: {}, malformed: {})",
                report.dropped(),
                report.raw_rows,
                report.invalid_coordinate,
                report.out_of_range,
                report.missing_name,
                report.malformed
            );
        }

        Ok(Self::with_report(cities, report))
    }

    /// Build a catalog from records already in memory
    ///
    /// Records with invalid coordinates are dropped like rows of a file.
    pub fn from_records(records: Vec<CityRecord>) -> Self {
        let mut report = LoadReport {
            raw_rows: records.len(),
            ..LoadReport::default()
        };

        let cities: Vec<CityRecord> = records
            .into_iter()
            .filter(|city| {
                let reason = if city.name.trim().is_empty() {
                    Some(DropReason::MissingName)
                } else if !city.latitude.is_finite() || !city.longitude.is_finite() {
                    Some(DropReason::InvalidCoordinate)
                } else if !city.has_valid_coordinates() {
                    Some(DropReason::OutOfRange)
                } else {
                    None
                };
                match reason {
                    Some(reason) => {
                        report.record_drop(reason);
                        false
                    }
                    None => true,
                }
            })
            .collect();

        report.kept = cities.len();
        Self::with_report(cities, report)
    }

    fn with_report(cities: Vec<CityRecord>, report: LoadReport) -> Self {
        let mut first_by_name = HashMap::with_capacity(cities.len());
        for (idx, city) in cities.iter().enumerate() {
            first_by_name.entry(city.name.clone()).or_insert(idx);
        }

        let mut sorted_names: Vec<String> = first_by_name.keys().cloned().collect();
        sorted_names.sort();

        Self {
            cities,
            first_by_name,
            sorted_names,
            report,
        }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn cities(&self) -> &[CityRecord] {
        &self.cities
    }

    /// First record carrying this name, in catalog order
    pub fn find(&self, name: &str) -> Option<&CityRecord> {
        self.first_by_name
            .get(name.trim())
            .map(|&idx| &self.cities[idx])
    }

    /// Distinct city names, sorted
    pub fn city_names(&self) -> &[String] {
        &self.sorted_names
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim().trim_start_matches('\u{feff}');
        aliases.iter().any(|alias| header.eq_ignore_ascii_case(alias))
    })
}

fn parse_row(
    record: &csv::StringRecord,
    name_idx: usize,
    lat_idx: usize,
    lon_idx: usize,
) -> Result<CityRecord, DropReason> {
    let name = record.get(name_idx).unwrap_or("").trim();
    if name.is_empty() {
        return Err(DropReason::MissingName);
    }

    let latitude = parse_coordinate(record.get(lat_idx))?;
    let longitude = parse_coordinate(record.get(lon_idx))?;

    let city = CityRecord::new(name, latitude, longitude);
    if !city.has_valid_coordinates() {
        return Err(DropReason::OutOfRange);
    }

    Ok(city)
}

fn parse_coordinate(raw: Option<&str>) -> Result<f64, DropReason> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or(DropReason::InvalidCoordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
nom,code_postal,latitude,longitude
Paris,75000,48.8566,2.3522
Lyon,69000,45.7640,4.8357
Ghost,00000,N/A,2.0
Marseille,13000,43.2965,5.3698
";

    #[test]
    fn test_load_drops_non_numeric_rows() {
        let catalog = Catalog::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.report().raw_rows, 4);
        assert_eq!(catalog.report().invalid_coordinate, 1);
        assert_eq!(catalog.len(), catalog.report().raw_rows - catalog.report().dropped());
        assert!(catalog.find("Ghost").is_none());
    }

    #[test]
    fn test_missing_column_is_error() {
        let src = "name,latitude\nParis,48.8566\n";
        let err = Catalog::from_reader(src.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn("longitude")));
    }

    #[test]
    fn test_all_rows_invalid_is_error() {
        let src = "name,latitude,longitude\nA,x,y\nB,,\n";
        let err = Catalog::from_reader(src.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::Empty { dropped: 2 }));
    }

    #[test]
    fn test_rejects_nan_and_out_of_range() {
        let src = "name,lat,lng\nA,NaN,1.0\nB,95.0,1.0\nC,inf,1\nD, 10.5 , 20.25 \n,1,1\n";
        let catalog = Catalog::from_reader(src.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.cities()[0], CityRecord::new("D", 10.5, 20.25));
        assert_eq!(catalog.report().invalid_coordinate, 2);
        assert_eq!(catalog.report().out_of_range, 1);
        assert_eq!(catalog.report().missing_name, 1);
    }

    #[test]
    fn test_short_row_counts_as_invalid() {
        let src = "name,latitude,longitude\nParis,48.8566\nLyon,45.764,4.8357\n";
        let catalog = Catalog::from_reader(src.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.report().invalid_coordinate, 1);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let src = "Name;Latitude;Longitude\nNice;43.7102;7.2620\n";
        let catalog = Catalog::from_reader_with_delimiter(src.as_bytes(), b';').unwrap();
        assert_eq!(catalog.find("Nice").map(|c| c.latitude), Some(43.7102));
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let src = "name,latitude,longitude\nSaint-Denis,48.9362,2.3574\nSaint-Denis,-20.8823,55.4504\n";
        let catalog = Catalog::from_reader(src.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.city_names(), &["Saint-Denis".to_string()]);
        assert_eq!(catalog.find("Saint-Denis").map(|c| c.latitude), Some(48.9362));
    }

    #[test]
    fn test_city_names_sorted() {
        let catalog = Catalog::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(catalog.city_names(), &["Lyon", "Marseille", "Paris"]);
    }

    #[test]
    fn test_from_records_filters_invalid() {
        let catalog = Catalog::from_records(vec![
            CityRecord::new("Paris", 48.8566, 2.3522),
            CityRecord::new("Nowhere", f64::NAN, 0.0),
            CityRecord::new("Beyond", 0.0, 200.0),
        ]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.report().dropped(), 2);
    }
}
