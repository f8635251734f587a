//! Address book access: typed row decoding and the flat contact export.

use std::path::Path;

use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, Row};
use tracing::{debug, info};

use crate::error::{ExtractError, Result};
use crate::file_writer::write_table;
use crate::models::{ContactRecord, NullableField, OutputFormat};
use crate::schema::contacts;

/// Storage class a column is decoded as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Untyped column read as text; numeric cells are rendered in decimal
    Text,
    /// INTEGER column, rendered in decimal
    Integer,
}

/// One exported address book column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name in the source table
    pub name: &'static str,
    /// Header in the export
    pub header: &'static str,
    /// How the column is decoded
    pub kind: ColumnKind,
}

/// Columns read from the full-text search table, in export order
pub const CONTACT_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec { name: contacts::FIRST, header: "First name", kind: ColumnKind::Text },
    ColumnSpec { name: contacts::LAST, header: "Last name", kind: ColumnKind::Text },
    ColumnSpec { name: contacts::MIDDLE, header: "Middle", kind: ColumnKind::Text },
    ColumnSpec { name: contacts::ORGANIZATION, header: "Organization", kind: ColumnKind::Text },
    ColumnSpec { name: contacts::PHONE, header: "Phone number", kind: ColumnKind::Text },
    ColumnSpec { name: contacts::EMAIL, header: "E-mail address", kind: ColumnKind::Text },
    ColumnSpec { name: contacts::ADDRESS, header: "Address", kind: ColumnKind::Text },
];

/// Export header, in column order
#[must_use]
pub fn contact_header() -> Vec<&'static str> {
    CONTACT_COLUMNS.iter().map(|c| c.header).collect()
}

fn contact_query() -> String {
    let columns = CONTACT_COLUMNS
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {columns} FROM {} ORDER BY rowid", contacts::TABLE)
}

/// Decode one cell according to its declared kind
///
/// NULL decodes to [`NullableField::Null`] for either kind. The address
/// book columns carry no type affinity, so a `Text` column also takes
/// INTEGER and REAL cells and renders them in decimal. BLOB cells, and
/// non-integer cells in an `Integer` column, are decode errors.
pub fn decode_cell(row: &Row, idx: usize, kind: ColumnKind) -> rusqlite::Result<NullableField<String>> {
    let value = row.get_ref(idx)?;
    let cell = match (kind, value) {
        (_, ValueRef::Null) => None,
        (ColumnKind::Text, ValueRef::Text(_)) => Some(
            value
                .as_str()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?
                .to_string(),
        ),
        (ColumnKind::Text, ValueRef::Real(number)) => Some(number.to_string()),
        (_, ValueRef::Integer(number)) => Some(number.to_string()),
        (_, other) => return Err(rusqlite::Error::InvalidColumnType(idx, column_name(row, idx), other.data_type())),
    };
    Ok(cell.into())
}

fn column_name(row: &Row, idx: usize) -> String {
    row.as_ref()
        .column_name(idx)
        .map_or_else(|_| String::new(), ToString::to_string)
}

fn map_contact(row: &Row) -> rusqlite::Result<ContactRecord> {
    let mut cells = Vec::with_capacity(CONTACT_COLUMNS.len());
    for (idx, column) in CONTACT_COLUMNS.iter().enumerate() {
        cells.push(decode_cell(row, idx, column.kind)?);
    }

    let mut cells = cells.into_iter();
    let mut next = || cells.next().unwrap_or_default();
    Ok(ContactRecord {
        first: next(),
        last: next(),
        middle: next(),
        organization: next(),
        phone_raw: next(),
        email: next(),
        address: next(),
    })
}

/// Read every row of the full-text search table
pub fn load_contacts(conn: &Connection) -> Result<Vec<ContactRecord>> {
    let unavailable = |e| ExtractError::catalog("contacts", e);

    let mut stmt = conn.prepare(&contact_query()).map_err(unavailable)?;
    let rows = stmt.query_map([], map_contact).map_err(unavailable)?;

    let mut records = Vec::new();
    for record in rows {
        records.push(record.map_err(unavailable)?);
    }

    debug!(count = records.len(), "Loaded contacts");
    Ok(records)
}

/// Cells of one contact, in export order
#[must_use]
pub fn contact_cells(record: &ContactRecord) -> Vec<String> {
    [
        &record.first,
        &record.last,
        &record.middle,
        &record.organization,
        &record.phone_raw,
        &record.email,
        &record.address,
    ]
    .iter()
    .map(|field| field.to_cell())
    .collect()
}

/// Write every contact to `path`, returning the number of rows written
pub fn export_contacts(conn: &Connection, path: &Path, format: OutputFormat) -> Result<usize> {
    let records = load_contacts(conn)?;
    let rows: Vec<Vec<String>> = records.iter().map(contact_cells).collect();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_table(path, format, &contact_header(), &rows)?;

    info!(count = rows.len(), path = %path.display(), "Exported contacts");
    Ok(rows.len())
}
