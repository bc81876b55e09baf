use axum::{
    extract::{multipart::Field, Extension, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{
    AmountDto, Category, ExpenseForm, ExpenseResponse, PageParams, PageResponse, Photo, Principal,
    SavedPhoto,
};
use crate::services::{authz, ExpenseFilter};
use crate::AppState;

// Helper struct to hold form data during multipart processing
struct ExpenseUpload {
    form: Option<ExpenseForm>,
    photos: Vec<SavedPhoto>,
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<PageParams>,
) -> AppResult<Response> {
    let filter = visible_filter(&principal, None);
    page_response(&state, filter, &params).await
}

pub async fn list_expenses_by_category(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(category): Path<Category>,
    Query(params): Query<PageParams>,
) -> AppResult<Response> {
    let filter = visible_filter(&principal, Some(category));
    page_response(&state, filter, &params).await
}

pub async fn create_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let upload = process_multipart_form(&mut multipart, &state.config.upload.upload_dir).await?;
    let form = upload
        .form
        .ok_or_else(|| AppError::Validation("missing expense payload".into()))?;

    let expense = state.store.create_expense(principal.id, &form).await?;
    let photos = state.store.add_photos(expense.id, &upload.photos).await?;

    tracing::info!(
        "member {} created expense {} with {} photo(s)",
        principal.username,
        expense.id,
        photos.len()
    );
    Ok((
        StatusCode::CREATED,
        Json(ExpenseResponse::from_parts(expense, photos)),
    )
        .into_response())
}

pub async fn get_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let expense = state
        .store
        .get_expense(id)
        .await?
        .ok_or(AppError::NotFound("expense"))?;

    // Reads answer 404 for records the caller may not see, so an
    // unauthorized member cannot probe which ids exist.
    if !authz::can_mutate(&principal, &expense) {
        return Err(AppError::NotFound("expense"));
    }

    let photos = state.store.photos_for_expense(expense.id).await?;
    Ok(Json(ExpenseResponse::from_parts(expense, photos)).into_response())
}

pub async fn update_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let expense = state
        .store
        .get_expense(id)
        .await?
        .ok_or(AppError::NotFound("expense"))?;
    if !authz::can_mutate(&principal, &expense) {
        tracing::warn!(
            "member {} denied update of expense {}",
            principal.username,
            expense.id
        );
        return Err(AppError::Forbidden);
    }

    let upload = process_multipart_form(&mut multipart, &state.config.upload.upload_dir).await?;
    let form = upload
        .form
        .ok_or_else(|| AppError::Validation("missing expense payload".into()))?;

    let updated = state.store.update_expense(id, &form).await?;

    // New files replace the existing attachments; no files keeps them.
    if !upload.photos.is_empty() {
        let removed = state.store.replace_photos(id, &upload.photos).await?;
        remove_photo_files(&removed);
    }

    let photos = state.store.photos_for_expense(id).await?;
    tracing::info!("member {} updated expense {}", principal.username, id);
    Ok(Json(ExpenseResponse::from_parts(updated, photos)).into_response())
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let expense = state
        .store
        .get_expense(id)
        .await?
        .ok_or(AppError::NotFound("expense"))?;
    if !authz::can_delete(&principal, &expense) {
        tracing::warn!(
            "member {} denied delete of expense {}",
            principal.username,
            expense.id
        );
        return Err(AppError::Forbidden);
    }

    let removed = state.store.delete_expense(id).await?;
    remove_photo_files(&removed);

    tracing::info!("member {} deleted expense {}", principal.username, id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Server-side amount summation, so clients never total prices themselves.
pub async fn total_amount(Json(amounts): Json<Vec<AmountDto>>) -> AppResult<Response> {
    let total: f64 = amounts.iter().map(|a| a.amount).sum();
    Ok(Json(total).into_response())
}

fn visible_filter(principal: &Principal, category: Option<Category>) -> ExpenseFilter {
    ExpenseFilter {
        owner: if authz::can_list_all(principal) {
            None
        } else {
            Some(principal.id)
        },
        category,
    }
}

async fn page_response(
    state: &AppState,
    filter: ExpenseFilter,
    params: &PageParams,
) -> AppResult<Response> {
    let (expenses, total) = state
        .store
        .list_expenses(filter, params.page, params.size)
        .await?;

    let mut content = Vec::with_capacity(expenses.len());
    for expense in expenses {
        let photos = state.store.photos_for_expense(expense.id).await?;
        content.push(ExpenseResponse::from_parts(expense, photos));
    }

    Ok(Json(PageResponse::new(content, params, total)).into_response())
}

// Helper function to process multipart form data: one optional `expense`
// JSON part plus any number of `files` parts.
async fn process_multipart_form(
    multipart: &mut Multipart,
    upload_dir: &str,
) -> AppResult<ExpenseUpload> {
    let mut upload = ExpenseUpload {
        form: None,
        photos: Vec::new(),
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("failed to get next field from multipart form: {}", e);
        AppError::Upload(format!("failed to process form field: {e}"))
    })? {
        match field.name().unwrap_or("") {
            "expense" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Upload(format!("failed to read expense part: {e}")))?;
                upload.form = Some(
                    serde_json::from_slice(&data)
                        .map_err(|e| AppError::Validation(format!("invalid expense payload: {e}")))?,
                );
            }
            "files" => {
                let photo = save_photo_file(field, upload_dir).await?;
                tracing::debug!("stored uploaded photo at {}", photo.file_path);
                upload.photos.push(photo);
            }
            field_name => {
                tracing::warn!("unexpected form field: {}", field_name);
            }
        }
    }

    Ok(upload)
}

// Helper function to write one uploaded file into the upload directory.
// The stored name is prefixed with a UUID so concurrent uploads of the same
// filename never collide.
async fn save_photo_file(field: Field<'_>, upload_dir: &str) -> AppResult<SavedPhoto> {
    let file_name = field
        .file_name()
        .ok_or_else(|| AppError::Upload("missing filename in upload".into()))?
        .to_string();
    let file_type = field.content_type().map(|t| t.to_string());

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Upload(format!("failed to read uploaded file: {e}")))?;

    tokio::fs::create_dir_all(upload_dir).await?;
    let file_path = format!("{}/{}_{}", upload_dir, Uuid::new_v4(), file_name);
    tokio::fs::write(&file_path, &data).await?;

    Ok(SavedPhoto {
        file_name,
        file_path,
        file_type,
        file_size: data.len() as i64,
    })
}

// Best-effort cleanup of files whose photo rows are gone.
fn remove_photo_files(photos: &[Photo]) {
    for photo in photos {
        if let Err(e) = std::fs::remove_file(&photo.file_path) {
            tracing::warn!("failed to delete photo file {}: {}", photo.file_path, e);
        }
    }
}
