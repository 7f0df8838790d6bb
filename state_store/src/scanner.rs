use std::sync::Arc;

use anyhow::Result;
use data_model::{FileId, FileRecord};
use rocksdb::IteratorMode;

use crate::{
    serializer::{JsonEncode, JsonEncoder},
    state_machine::FileShareObjectsColumns,
    StateDb,
};

pub struct StateReader {
    db: Arc<StateDb>,
}

impl StateReader {
    pub fn new(db: Arc<StateDb>) -> Self {
        Self { db }
    }

    /// Every persisted file record, in key order.
    pub fn all_files(&self) -> Result<Vec<FileRecord>> {
        let cf = FileShareObjectsColumns::FileRecords.cf_db(&self.db);
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);
        let mut files = Vec::new();
        for kv in iter {
            let (_, value) = kv?;
            files.push(JsonEncoder::decode(&value)?);
        }
        Ok(files)
    }

    pub fn file_by_id(&self, id: &FileId) -> Result<Option<FileRecord>> {
        let cf = FileShareObjectsColumns::FileRecords.cf_db(&self.db);
        let value = self.db.get_cf(&cf, id.to_string().as_bytes())?;
        value.map(|v| JsonEncoder::decode(&v)).transpose()
    }
}
