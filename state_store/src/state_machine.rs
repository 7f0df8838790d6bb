use std::sync::Arc;

use anyhow::{anyhow, Result};
use rocksdb::BoundColumnFamily;
use strum::AsRefStr;
use tracing::info;

use crate::{
    requests::{CreateFileRequest, DeleteFileRequest, UpdateFileRequest},
    serializer::{JsonEncode, JsonEncoder},
    StateDb,
};

#[derive(AsRefStr, strum::Display, strum::EnumIter)]
pub enum FileShareObjectsColumns {
    FileRecords, //  file id -> FileRecord
}

impl FileShareObjectsColumns {
    pub fn cf_db<'a>(&'a self, db: &'a StateDb) -> Arc<BoundColumnFamily<'a>> {
        db.cf_handle(self.as_ref())
            .unwrap_or_else(|| panic!("failed to get column family handle for {}", self.as_ref()))
    }
}

pub(crate) fn create_file(db: Arc<StateDb>, req: &CreateFileRequest) -> Result<()> {
    if req.file.filename.is_empty() || req.file.path.is_empty() {
        return Err(anyhow!(
            "refusing to persist file record without filename and path"
        ));
    }
    let serialized = JsonEncoder::encode(&req.file)?;
    let txn = db.transaction();
    txn.put_cf(
        &FileShareObjectsColumns::FileRecords.cf_db(&db),
        req.file.id.to_string().as_bytes(),
        &serialized,
    )?;
    txn.commit()?;
    info!("created file record: {}", req.file.id);
    Ok(())
}

pub(crate) fn update_file(db: Arc<StateDb>, req: &UpdateFileRequest) -> Result<()> {
    let txn = db.transaction();
    let cf = FileShareObjectsColumns::FileRecords.cf_db(&db);
    let key = req.id.to_string();
    let existing = txn
        .get_for_update_cf(&cf, key.as_bytes(), true)?
        .ok_or_else(|| anyhow!("file record not found: {}", req.id))?;
    let mut file: data_model::FileRecord = JsonEncoder::decode(&existing)?;
    if let Some(title) = &req.title {
        file.title = Some(title.clone());
    }
    if let Some(description) = &req.description {
        file.description = Some(description.clone());
    }
    txn.put_cf(&cf, key.as_bytes(), JsonEncoder::encode(&file)?)?;
    txn.commit()?;
    Ok(())
}

pub(crate) fn delete_file(db: Arc<StateDb>, req: &DeleteFileRequest) -> Result<()> {
    let txn = db.transaction();
    let cf = FileShareObjectsColumns::FileRecords.cf_db(&db);
    let key = req.id.to_string();
    txn.get_for_update_cf(&cf, key.as_bytes(), true)?
        .ok_or_else(|| anyhow!("file record not found: {}", req.id))?;
    txn.delete_cf(&cf, key.as_bytes())?;
    txn.commit()?;
    info!("deleted file record: {}", req.id);
    Ok(())
}
