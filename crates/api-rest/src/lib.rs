//! # API REST
//!
//! REST API implementation for MedWise.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request/response bodies and `medwise-core` for all data operations.
//! The router is built around an already opened [`RecordStore`]; configuration is resolved
//! by the binary before the router exists.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    CaptureRecordReq, ChatHistoryRes, ChatMessageRes, DeleteRecordRes, HealthRes, HealthService,
    ManualEntryReq, NewChatMessageReq, ProfileRes, RecordRes, RecordsRes, SaveProfileReq,
    SuccessRes, UpdateRecordReq,
};
use medwise_core::{
    ChatMessage, ManualEntry, MedicalRecord, NonEmptyText, RecordPatch, RecordStore, StoreError,
};

type ApiError = (StatusCode, &'static str);

/// Application state shared across REST API handlers.
#[derive(Clone)]
struct AppState {
    store: RecordStore,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_records,
        capture_record,
        create_manual_entry,
        get_record,
        update_record,
        delete_record,
        get_profile,
        save_profile,
        get_chat_history,
        append_chat_message,
        clear_chat_history,
        clear_all_data,
    ),
    components(schemas(
        HealthRes,
        RecordsRes,
        RecordRes,
        CaptureRecordReq,
        ManualEntryReq,
        UpdateRecordReq,
        DeleteRecordRes,
        ProfileRes,
        SaveProfileReq,
        ChatHistoryRes,
        NewChatMessageReq,
        ChatMessageRes,
        SuccessRes,
    ))
)]
struct ApiDoc;

/// Builds the REST router over `store`.
///
/// Swagger UI is served at `/swagger-ui` with the OpenAPI document at `/api-docs/openapi.json`.
pub fn router(store: RecordStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/records", get(list_records).post(capture_record))
        .route("/records/manual", post(create_manual_entry))
        .route(
            "/records/:id",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .route("/profile", get(get_profile).put(save_profile))
        .route(
            "/chat",
            get(get_chat_history)
                .post(append_chat_message)
                .delete(clear_chat_history),
        )
        .route("/data", delete(clear_all_data))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState { store })
}

/// Maps a store failure onto a status code and logs it.
fn store_error(operation: &str, err: StoreError) -> ApiError {
    tracing::error!("{} error: {:?}", operation, err);
    match err {
        StoreError::InvalidInput(_) | StoreError::Text(_) => {
            (StatusCode::BAD_REQUEST, "Bad request")
        }
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    }
}

// ============================================================================
// HEALTH
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

// ============================================================================
// RECORDS
// ============================================================================

#[utoipa::path(
    get,
    path = "/records",
    responses(
        (status = 200, description = "All records in insertion order", body = RecordsRes),
        (status = 500, description = "Internal server error")
    )
)]
/// List all medical records
///
/// # Errors
/// Returns `500 Internal Server Error` if the stored collection cannot be read or parsed.
#[axum::debug_handler]
async fn list_records(State(state): State<AppState>) -> Result<Json<RecordsRes>, ApiError> {
    match state.store.get_medical_records().await {
        Ok(records) => Ok(Json(RecordsRes { records })),
        Err(e) => Err(store_error("List records", e)),
    }
}

#[utoipa::path(
    post,
    path = "/records",
    request_body = CaptureRecordReq,
    responses(
        (status = 201, description = "Record captured", body = RecordRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Capture a record from a photographed or picked document
///
/// The server assigns the id and date. The description defaults to a placeholder prompting
/// the user to fill it in.
///
/// # Errors
/// Returns `500 Internal Server Error` if the record cannot be saved.
#[axum::debug_handler]
async fn capture_record(
    State(state): State<AppState>,
    Json(req): Json<CaptureRecordReq>,
) -> Result<(StatusCode, Json<RecordRes>), ApiError> {
    let mut record = MedicalRecord::captured(
        state.store.new_record_id(),
        Utc::now(),
        req.record_type,
        req.file_uri,
    );
    if let Some(title) = req.title.filter(|t| !t.trim().is_empty()) {
        record.title = title;
    }
    if let Some(description) = req.description.filter(|d| !d.trim().is_empty()) {
        record.description = Some(description);
    }

    match state.store.save_medical_record(record.clone()).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(RecordRes { record }))),
        Err(e) => Err(store_error("Capture record", e)),
    }
}

#[utoipa::path(
    post,
    path = "/records/manual",
    request_body = ManualEntryReq,
    responses(
        (status = 201, description = "Manual entry committed", body = RecordRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Commit a manual entry
///
/// Runs the three wizard steps in order and commits the result, applying the same parsing
/// as the interactive wizard (lenient numbers, comma-separated medications).
///
/// # Errors
/// Returns `500 Internal Server Error` if the record cannot be saved.
#[axum::debug_handler]
async fn create_manual_entry(
    State(state): State<AppState>,
    Json(req): Json<ManualEntryReq>,
) -> Result<(StatusCode, Json<RecordRes>), ApiError> {
    let entry = ManualEntry::new()
        .submit(req.basic_info)
        .submit(req.healthcare_info);

    match entry.commit(req.vital_signs, &state.store).await {
        Ok((record, _)) => Ok((StatusCode::CREATED, Json(RecordRes { record }))),
        Err(failure) => Err(store_error("Manual entry", failure.error)),
    }
}

#[utoipa::path(
    get,
    path = "/records/{id}",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "The record", body = RecordRes),
        (status = 404, description = "No record with that id"),
        (status = 500, description = "Internal server error")
    )
)]
/// Fetch one record by id
///
/// # Errors
/// Returns `404 Not Found` if no record has the id, `500` if the collection cannot be read.
#[axum::debug_handler]
async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordRes>, ApiError> {
    match state.store.get_medical_record(&id).await {
        Ok(Some(record)) => Ok(Json(RecordRes { record })),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Not found")),
        Err(e) => Err(store_error("Get record", e)),
    }
}

#[utoipa::path(
    patch,
    path = "/records/{id}",
    params(("id" = String, Path, description = "Record id")),
    request_body = UpdateRecordReq,
    responses(
        (status = 200, description = "Record updated", body = RecordRes),
        (status = 400, description = "Empty patch or blank title"),
        (status = 404, description = "No record with that id"),
        (status = 500, description = "Internal server error")
    )
)]
/// Update fields of an existing record in place
///
/// # Errors
/// Returns `400 Bad Request` for an empty patch or a blank title, `404 Not Found` for an
/// unknown id, `500` otherwise.
#[axum::debug_handler]
async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRecordReq>,
) -> Result<Json<RecordRes>, ApiError> {
    let patch = RecordPatch::from(req);
    match state.store.update_medical_record(&id, &patch).await {
        Ok(record) => Ok(Json(RecordRes { record })),
        Err(e) => Err(store_error("Update record", e)),
    }
}

#[utoipa::path(
    delete,
    path = "/records/{id}",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Number of records removed", body = DeleteRecordRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Delete every record with the given id
///
/// Deleting an unknown id is not an error; `removed` is zero.
///
/// # Errors
/// Returns `500 Internal Server Error` if the collection cannot be read or written.
#[axum::debug_handler]
async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteRecordRes>, ApiError> {
    match state.store.delete_medical_record(&id).await {
        Ok(removed) => Ok(Json(DeleteRecordRes { removed })),
        Err(e) => Err(store_error("Delete record", e)),
    }
}

// ============================================================================
// PROFILE
// ============================================================================

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The stored profile, or null", body = ProfileRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Fetch the user profile
#[axum::debug_handler]
async fn get_profile(State(state): State<AppState>) -> Result<Json<ProfileRes>, ApiError> {
    match state.store.get_user_profile().await {
        Ok(profile) => Ok(Json(ProfileRes { profile })),
        Err(e) => Err(store_error("Get profile", e)),
    }
}

#[utoipa::path(
    put,
    path = "/profile",
    request_body = SaveProfileReq,
    responses(
        (status = 200, description = "Profile replaced", body = SuccessRes),
        (status = 400, description = "Profile failed validation"),
        (status = 500, description = "Internal server error")
    )
)]
/// Replace the user profile
///
/// # Errors
/// Returns `400 Bad Request` when a required field is blank, the age is zero or the blood
/// type is unknown.
#[axum::debug_handler]
async fn save_profile(
    State(state): State<AppState>,
    Json(req): Json<SaveProfileReq>,
) -> Result<Json<SuccessRes>, ApiError> {
    match state.store.save_user_profile(&req.profile).await {
        Ok(()) => Ok(Json(SuccessRes { success: true })),
        Err(e) => Err(store_error("Save profile", e)),
    }
}

// ============================================================================
// CHAT
// ============================================================================

#[utoipa::path(
    get,
    path = "/chat",
    responses(
        (status = 200, description = "Chat history in order", body = ChatHistoryRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Fetch the assistant chat history
#[axum::debug_handler]
async fn get_chat_history(
    State(state): State<AppState>,
) -> Result<Json<ChatHistoryRes>, ApiError> {
    match state.store.get_chat_history().await {
        Ok(messages) => Ok(Json(ChatHistoryRes { messages })),
        Err(e) => Err(store_error("Get chat history", e)),
    }
}

#[utoipa::path(
    post,
    path = "/chat",
    request_body = NewChatMessageReq,
    responses(
        (status = 201, description = "Message appended", body = ChatMessageRes),
        (status = 400, description = "Blank message text"),
        (status = 500, description = "Internal server error")
    )
)]
/// Append a message to the chat history
///
/// # Errors
/// Returns `400 Bad Request` if the text is blank.
#[axum::debug_handler]
async fn append_chat_message(
    State(state): State<AppState>,
    Json(req): Json<NewChatMessageReq>,
) -> Result<(StatusCode, Json<ChatMessageRes>), ApiError> {
    let text = NonEmptyText::new(&req.text)
        .map_err(|e| store_error("Append chat message", StoreError::from(e)))?;

    let mut message = ChatMessage::text(
        state.store.new_record_id(),
        text.into_string(),
        req.is_user,
        Utc::now(),
    );
    if let Some(image_uri) = req.image_uri {
        message = message.with_image(image_uri);
    }

    match state.store.append_chat_message(message.clone()).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(ChatMessageRes { message }))),
        Err(e) => Err(store_error("Append chat message", e)),
    }
}

#[utoipa::path(
    delete,
    path = "/chat",
    responses(
        (status = 200, description = "Chat history cleared", body = SuccessRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Clear the chat history
#[axum::debug_handler]
async fn clear_chat_history(State(state): State<AppState>) -> Result<Json<SuccessRes>, ApiError> {
    match state.store.clear_chat_history().await {
        Ok(()) => Ok(Json(SuccessRes { success: true })),
        Err(e) => Err(store_error("Clear chat history", e)),
    }
}

// ============================================================================
// DATA
// ============================================================================

#[utoipa::path(
    delete,
    path = "/data",
    responses(
        (status = 200, description = "Records, profile and chat history removed", body = SuccessRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Remove all stored data
///
/// Records, the profile and the chat history are all removed. This cannot be undone.
#[axum::debug_handler]
async fn clear_all_data(State(state): State<AppState>) -> Result<Json<SuccessRes>, ApiError> {
    match state.store.clear_all_data().await {
        Ok(()) => Ok(Json(SuccessRes { success: true })),
        Err(e) => Err(store_error("Clear all data", e)),
    }
}
