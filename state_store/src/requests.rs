use data_model::{FileId, FileRecord};

pub struct StateMachineUpdateRequest {
    pub payload: RequestPayload,
}

pub enum RequestPayload {
    CreateFile(CreateFileRequest),
    UpdateFile(UpdateFileRequest),
    DeleteFile(DeleteFileRequest),
}

pub struct CreateFileRequest {
    pub file: FileRecord,
}

/// Patch for a stored record. Only the display fields are mutable; the
/// storage identity of a record (`filename`, `path`) never changes after
/// upload.
pub struct UpdateFileRequest {
    pub id: FileId,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub struct DeleteFileRequest {
    pub id: FileId,
}
