use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::types::CourseRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Every course collected during a crawl, in department visitation order and
/// then page order. Cross-listed courses may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseCollection {
    records: Vec<CourseRecord>,
}

impl CourseCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend_department(&mut self, records: Vec<CourseRecord>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[CourseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes one row per record. The header row goes out with the first
    /// record, so an empty collection produces no output at all.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut reader = csv::Reader::from_reader(reader);
        let records = reader
            .deserialize()
            .collect::<Result<Vec<CourseRecord>, _>>()?;
        Ok(Self { records })
    }

    /// Persists the collection to `path`. An empty collection writes nothing
    /// and returns `false`.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<bool, StoreError> {
        let path = path.as_ref();
        if self.is_empty() {
            log::warn!("No course information collected; not writing {}", path.display());
            return Ok(false);
        }
        self.to_writer(File::create(path)?)?;
        log::info!(
            "Course information written to {} ({} records)",
            path.display(),
            self.len()
        );
        Ok(true)
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        log::info!("Loading course table from {}", path.display());
        Self::from_reader(File::open(path)?)
    }
}

impl From<Vec<CourseRecord>> for CourseCollection {
    fn from(records: Vec<CourseRecord>) -> Self {
        Self { records }
    }
}
