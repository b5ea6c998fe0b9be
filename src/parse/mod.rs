//! Input table parsing.

pub mod tables;

pub use tables::{
    Extracted, InputTables, RawTable, SchemaError, TableError, TableRole, boreholes, layers,
    surface_points, validate, validate_columns,
};
