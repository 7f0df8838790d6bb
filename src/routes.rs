use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Multipart, Path, Request, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json,
    Router,
};
use blob_store::{BlobStorage, PutResult};
use bytes::Bytes;
use data_model::{storage_filename, FileId, FileRecordBuilder};
use fileshare_utils::get_epoch_time_in_ms;
use state_store::{
    requests::{
        CreateFileRequest,
        DeleteFileRequest,
        RequestPayload,
        StateMachineUpdateRequest,
        UpdateFileRequest,
    },
    FileShareState,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

mod download;
use download::download_file;

use crate::http_objects::{File, FileShareAPIError, FileUpdate};

#[derive(OpenApi)]
#[openapi(
        paths(
            upload_file,
            list_files,
            download::download_file,
            update_file,
            delete_file,
        ),
        components(
            schemas(
                FileShareAPIError,
                File,
                FileUpdate,
                UploadFileType,
            )
        ),
        tags(
            (name = "fileshare", description = "File sharing API")
        )
    )]
struct ApiDoc;

#[derive(Clone)]
pub struct RouteState {
    pub state: Arc<FileShareState>,
    pub blob_storage: Arc<BlobStorage>,
}

pub fn create_routes(route_state: RouteState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/docs/swagger").url("/docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(index))
        .route(
            "/upload",
            post(upload_file).with_state(route_state.clone()),
        )
        .route("/files", get(list_files).with_state(route_state.clone()))
        .route(
            "/download/{filename}",
            get(download_file).with_state(route_state.clone()),
        )
        .route(
            "/update/{id}",
            put(update_file).with_state(route_state.clone()),
        )
        .route(
            "/delete/{id}",
            delete(delete_file).with_state(route_state.clone()),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    let method = req.method();
                    let uri = req.uri();

                    let matched_path = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::debug_span!("request", %method, %uri, matched_path)
                })
                .on_failure(()),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn index() -> &'static str {
    "Fileshare Server"
}

#[allow(dead_code)]
#[derive(ToSchema)]
struct UploadFileType {
    #[schema(format = "binary")]
    file: String,
}

/// Upload a file
#[utoipa::path(
    post,
    path = "/upload",
    tag = "fileshare",
    request_body(content_type = "multipart/form-data", content = inline(UploadFileType)),
    responses(
        (status = 201, description = "File stored and record created", body = File),
        (status = BAD_REQUEST, description = "No file part in the request"),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to persist file")
    ),
)]
async fn upload_file(
    State(state): State<RouteState>,
    mut form: Multipart,
) -> Result<impl IntoResponse, FileShareAPIError> {
    let mut saved: Option<(String, PutResult)> = None;
    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| FileShareAPIError::new(e.status(), &e.to_string()))?
    {
        let Some(name) = field.name() else {
            continue;
        };
        // other form fields carry no record data, the original server drops
        // them too
        if name != "file" || saved.is_some() {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        // buffered before the blob write so a body-limit failure leaves
        // nothing behind
        let data = field
            .bytes()
            .await
            .map_err(|e| FileShareAPIError::new(e.status(), &e.to_string()))?;
        let filename = storage_filename(get_epoch_time_in_ms(), &original_name);
        let put_result = state
            .blob_storage
            .put(
                &filename,
                futures::stream::iter(vec![Ok::<Bytes, anyhow::Error>(data)]),
            )
            .await
            .map_err(FileShareAPIError::internal_error)?;
        saved = Some((filename, put_result));
    }

    let Some((filename, put_result)) = saved else {
        return Err(FileShareAPIError::bad_request("no file uploaded"));
    };

    let file = FileRecordBuilder::default()
        .filename(filename)
        .path(put_result.url.clone())
        .build()
        .map_err(|e| FileShareAPIError::internal_error_str(&e.to_string()))?;
    state
        .state
        .write(StateMachineUpdateRequest {
            payload: RequestPayload::CreateFile(CreateFileRequest { file: file.clone() }),
        })
        .await
        .map_err(FileShareAPIError::internal_error)?;
    info!(
        filename = %file.filename,
        size_bytes = put_result.size_bytes,
        sha256 = %put_result.sha256_hash,
        "file uploaded"
    );
    Ok((StatusCode::CREATED, Json(File::from(file))))
}

/// List all file records
#[utoipa::path(
    get,
    path = "/files",
    tag = "fileshare",
    responses(
        (status = 200, description = "All file records", body = [File]),
        (status = INTERNAL_SERVER_ERROR, description = "Unable to list files")
    ),
)]
async fn list_files(
    State(state): State<RouteState>,
) -> Result<Json<Vec<File>>, FileShareAPIError> {
    let files = state
        .state
        .reader()
        .all_files()
        .map_err(FileShareAPIError::internal_error)?;
    Ok(Json(files.into_iter().map(File::from).collect()))
}

/// Update a file record's display fields
#[utoipa::path(
    put,
    path = "/update/{id}",
    tag = "fileshare",
    request_body = FileUpdate,
    responses(
        (status = 200, description = "Updated file record", body = File),
        (status = BAD_REQUEST, description = "Unknown record or malformed body")
    ),
)]
async fn update_file(
    Path(id): Path<String>,
    State(state): State<RouteState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<File>, FileShareAPIError> {
    let update: FileUpdate = serde_json::from_value(body)?;
    let id = FileId::from(id.as_str());
    state
        .state
        .write(StateMachineUpdateRequest {
            payload: RequestPayload::UpdateFile(UpdateFileRequest {
                id: id.clone(),
                title: update.title,
                description: update.description,
            }),
        })
        .await
        .map_err(|e| FileShareAPIError::bad_request(&e.to_string()))?;
    let file = state
        .state
        .reader()
        .file_by_id(&id)
        .map_err(|e| FileShareAPIError::bad_request(&e.to_string()))?
        .ok_or_else(|| FileShareAPIError::bad_request(&format!("file record not found: {id}")))?;
    Ok(Json(File::from(file)))
}

/// Delete a file record. The stored blob is left in place.
#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = "fileshare",
    responses(
        (status = 200, description = "Removed record's last snapshot", body = File),
        (status = BAD_REQUEST, description = "Unknown record")
    ),
)]
async fn delete_file(
    Path(id): Path<String>,
    State(state): State<RouteState>,
) -> Result<Json<File>, FileShareAPIError> {
    let id = FileId::from(id.as_str());
    let file = state
        .state
        .reader()
        .file_by_id(&id)
        .map_err(|e| FileShareAPIError::bad_request(&e.to_string()))?
        .ok_or_else(|| FileShareAPIError::bad_request(&format!("file record not found: {id}")))?;
    state
        .state
        .write(StateMachineUpdateRequest {
            payload: RequestPayload::DeleteFile(DeleteFileRequest { id: id.clone() }),
        })
        .await
        .map_err(|e| FileShareAPIError::bad_request(&e.to_string()))?;
    info!(id = %id, filename = %file.filename, "file record deleted, blob retained");
    Ok(Json(File::from(file)))
}
