//! Reading and writing of delimiter-separated tables.
//!
//! Rows are plain string records, so any `ToString` cell type can be exported. The title row is
//! optional on both ends.

use std::{fs::File, path::Path};

use csv::{ReaderBuilder, WriterBuilder};

/// Read all rows of the table at `path`. If `ignore_title` is set, the first row is dropped.
pub fn read_csv(
    path: impl AsRef<Path>,
    ignore_title: bool,
    delimiter: u8,
) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(ignore_title)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path.as_ref())?;

    reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect()
}

/// Write `rows` to the table at `path`, truncating an existing file. The `title` row is written
/// first unless `ignore_title` is set.
pub fn write_csv<T, R, C>(
    path: impl AsRef<Path>,
    title: &[T],
    rows: R,
    ignore_title: bool,
    delimiter: u8,
) -> Result<(), csv::Error>
where
    T: AsRef<str>,
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: ToString,
{
    log::debug!("Writing table to {:?}", path.as_ref());
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(File::create(path.as_ref())?);

    if !ignore_title {
        writer.write_record(title.iter().map(AsRef::as_ref))?;
    }
    for row in rows {
        writer.write_record(row.into_iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;

    Ok(())
}
