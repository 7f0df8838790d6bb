use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use requests::{RequestPayload, StateMachineUpdateRequest};
use rocksdb::{ColumnFamilyDescriptor, MultiThreaded, Options, TransactionDB, TransactionDBOptions};
use scanner::StateReader;
use state_machine::FileShareObjectsColumns;
use strum::IntoEnumIterator;
use tracing::info;

pub mod requests;
pub mod scanner;
pub mod serializer;
pub mod state_machine;

/// Metadata store for file records, backed by rocksdb with one column family
/// per object kind. Opened once at startup and shared by the HTTP handlers.
pub type StateDb = TransactionDB<MultiThreaded>;

pub struct FileShareState {
    pub db: Arc<StateDb>,
}

impl FileShareState {
    pub fn new(path: PathBuf) -> Result<Arc<Self>> {
        fs::create_dir_all(path.clone())
            .map_err(|e| anyhow!("failed to create state store dir: {}", e))?;
        let column_families = FileShareObjectsColumns::iter()
            .map(|cf| ColumnFamilyDescriptor::new(cf.to_string(), Options::default()));
        let mut db_opts = Options::default();
        db_opts.create_missing_column_families(true);
        db_opts.create_if_missing(true);
        let db: Arc<StateDb> = Arc::new(
            TransactionDB::open_cf_descriptors(
                &db_opts,
                &TransactionDBOptions::default(),
                path,
                column_families,
            )
            .map_err(|e| anyhow!("failed to open db: {}", e))?,
        );
        info!("initialized file metadata store");
        Ok(Arc::new(Self { db }))
    }

    pub async fn write(&self, request: StateMachineUpdateRequest) -> Result<()> {
        match &request.payload {
            RequestPayload::CreateFile(req) => state_machine::create_file(self.db.clone(), req),
            RequestPayload::UpdateFile(req) => state_machine::update_file(self.db.clone(), req),
            RequestPayload::DeleteFile(req) => state_machine::delete_file(self.db.clone(), req),
        }
    }

    pub fn reader(&self) -> StateReader {
        StateReader::new(self.db.clone())
    }
}
