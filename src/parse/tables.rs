//! CSV ingestion and column validation for the three input tables.

use std::fmt;
use std::io;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::Warning;
use crate::model::{Borehole, Layer, SurfacePoint};

/// Which of the three inputs a table is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    Surface,
    Boreholes,
    Layers,
}

impl TableRole {
    pub const ALL: [Self; 3] = [Self::Surface, Self::Boreholes, Self::Layers];

    /// Columns that must be present, matched exactly and case-sensitively.
    #[must_use]
    pub const fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::Surface => &[EASTING, NORTHING, ELEVATION],
            Self::Boreholes => &[BH_ID, EASTING, NORTHING],
            Self::Layers => &[BH, FROM, TO, SOIL_TYPE],
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Surface => "Surface CSV",
            Self::Boreholes => "Boreholes CSV",
            Self::Layers => "BH Details CSV",
        }
    }
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const EASTING: &str = "Easting";
const NORTHING: &str = "Northing";
const ELEVATION: &str = "Elevation";
const BH_ID: &str = "BH ID";
const BH: &str = "BH";
const FROM: &str = "FROM";
const TO: &str = "TO";
const SOIL_TYPE: &str = "SOIL TYPE";

/// A table lacks required columns. Always fatal for that input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{role} is missing columns: {}", .missing.join(", "))]
pub struct SchemaError {
    pub role: TableRole,
    pub missing: Vec<String>,
}

#[derive(Debug, Error)]
pub enum TableError {
    /// The bytes could not be read as CSV.
    #[error("{role} could not be read: {source}")]
    Csv {
        role: TableRole,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Untyped table as read from CSV: a header row plus string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub role: TableRole,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    #[must_use]
    pub fn new(role: TableRole, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            role,
            headers,
            rows,
        }
    }

    /// Read a CSV stream whose first record is the header row.
    pub fn from_csv_reader<R: io::Read>(role: TableRole, reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let to_table_error = |source| TableError::Csv { role, source };

        let headers = reader
            .headers()
            .map_err(to_table_error)?
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                if idx == 0 {
                    h.trim_start_matches('\u{feff}').to_owned()
                } else {
                    h.to_owned()
                }
            })
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(to_table_error)?;
            rows.push(record.iter().map(str::to_owned).collect());
        }

        log::debug!("{role}: read {} data rows", rows.len());
        Ok(Self::new(role, headers, rows))
    }

    pub fn from_csv_str(role: TableRole, input: &str) -> Result<Self, TableError> {
        Self::from_csv_reader(role, input.as_bytes())
    }

    pub fn from_csv_path(role: TableRole, path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path).map_err(|err| TableError::Csv {
            role,
            source: csv::Error::from(err),
        })?;
        Self::from_csv_reader(role, io::BufReader::new(file))
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn indices<const N: usize>(&self, names: [&str; N]) -> Result<[usize; N], SchemaError> {
        let mut missing = Vec::new();
        let mut found = [0; N];
        for (slot, name) in found.iter_mut().zip(names) {
            match self.column_index(name) {
                Some(idx) => *slot = idx,
                None => missing.push(name.to_owned()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(SchemaError {
                role: self.role,
                missing,
            })
        }
    }
}

/// Check `table` for the `required` columns. Extra columns are ignored.
pub fn validate_columns(table: RawTable, required: &[&str]) -> Result<RawTable, SchemaError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| table.column_index(name).is_none())
        .map(|name| (*name).to_owned())
        .collect();

    if missing.is_empty() {
        Ok(table)
    } else {
        log::warn!("{} is missing columns: {missing:?}", table.role);
        Err(SchemaError {
            role: table.role,
            missing,
        })
    }
}

/// [`validate_columns`] against the columns required for the table's role.
pub fn validate(table: RawTable) -> Result<RawTable, SchemaError> {
    let required = table.role.required_columns();
    validate_columns(table, required)
}

/// Typed rows extracted from a table, plus the rows that had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub rows: Vec<T>,
    pub warnings: Vec<Warning>,
}

impl<T> Default for Extracted<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

struct RowReader<'a> {
    role: TableRole,
    row: usize,
    cells: &'a [String],
}

impl RowReader<'_> {
    fn text(&self, idx: usize, column: &str) -> Result<&str, Warning> {
        let value = self.cells.get(idx).map_or("", |cell| cell.trim());
        if value.is_empty() {
            Err(self.invalid(format!("`{column}` is empty")))
        } else {
            Ok(value)
        }
    }

    fn number(&self, idx: usize, column: &str) -> Result<f64, Warning> {
        let text = self.text(idx, column)?;
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(_) => Err(self.invalid(format!("`{column}` is not finite: {text}"))),
            Err(_) => Err(self.invalid(format!("`{column}` is not a number: {text}"))),
        }
    }

    fn invalid(&self, message: String) -> Warning {
        Warning::InvalidRow {
            role: self.role,
            row: self.row,
            message,
        }
    }
}

fn extract<T, const N: usize>(
    table: &RawTable,
    columns: [&str; N],
    mut read: impl FnMut(&RowReader<'_>, [usize; N]) -> Result<T, Warning>,
) -> Result<Extracted<T>, SchemaError> {
    let indices = table.indices(columns)?;
    let mut out = Extracted::default();
    for (offset, cells) in table.rows.iter().enumerate() {
        let reader = RowReader {
            role: table.role,
            row: offset + 1,
            cells,
        };
        match read(&reader, indices) {
            Ok(row) => out.rows.push(row),
            Err(warning) => out.warnings.push(warning),
        }
    }
    Ok(out)
}

pub fn surface_points(table: &RawTable) -> Result<Extracted<SurfacePoint>, SchemaError> {
    extract(table, [EASTING, NORTHING, ELEVATION], |row, [e, n, z]| {
        Ok(SurfacePoint::new(
            row.number(e, EASTING)?,
            row.number(n, NORTHING)?,
            row.number(z, ELEVATION)?,
        ))
    })
}

/// Borehole locations. A repeated id keeps its first location.
pub fn boreholes(table: &RawTable) -> Result<Extracted<Borehole>, SchemaError> {
    let mut extracted = extract(table, [BH_ID, EASTING, NORTHING], |row, [id, e, n]| {
        Ok(Borehole::new(
            row.text(id, BH_ID)?,
            row.number(e, EASTING)?,
            row.number(n, NORTHING)?,
        ))
    })?;

    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::with_capacity(extracted.rows.len());
    for borehole in extracted.rows {
        if seen.insert(borehole.id.clone()) {
            unique.push(borehole);
        } else {
            extracted.warnings.push(Warning::DuplicateBorehole {
                borehole_id: borehole.id,
            });
        }
    }
    extracted.rows = unique;
    Ok(extracted)
}

/// Layer rows, unsorted. Interval sanity is checked by the column builder.
pub fn layers(table: &RawTable) -> Result<Extracted<Layer>, SchemaError> {
    extract(table, [BH, FROM, TO, SOIL_TYPE], |row, [bh, from, to, soil]| {
        Ok(Layer::new(
            row.text(bh, BH)?,
            row.number(from, FROM)?,
            row.number(to, TO)?,
            row.text(soil, SOIL_TYPE)?,
        ))
    })
}

/// The three validated, typed inputs of one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTables {
    pub surface: Vec<SurfacePoint>,
    pub boreholes: Vec<Borehole>,
    pub layers: Vec<Layer>,
}

impl InputTables {
    /// Validate all three tables first, then extract typed rows.
    ///
    /// The first table with missing columns aborts with its [`SchemaError`];
    /// row-level problems come back as warnings.
    pub fn from_raw(
        surface: RawTable,
        boreholes: RawTable,
        layers: RawTable,
    ) -> Result<(Self, Vec<Warning>), SchemaError> {
        let surface = validate(surface)?;
        let boreholes = validate(boreholes)?;
        let layers = validate(layers)?;

        let mut warnings = Vec::new();
        let mut surface = self::surface_points(&surface)?;
        let mut boreholes = self::boreholes(&boreholes)?;
        let mut layers = self::layers(&layers)?;
        warnings.append(&mut surface.warnings);
        warnings.append(&mut boreholes.warnings);
        warnings.append(&mut layers.warnings);

        Ok((
            Self {
                surface: surface.rows,
                boreholes: boreholes.rows,
                layers: layers.rows,
            },
            warnings,
        ))
    }
}
