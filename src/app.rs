use axum::{
    Json, Router,
    extract::{Multipart, Query, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::chart::{self, ChartOptions};
use crate::config::Config;
use crate::csv::CsvStore;
use crate::drive::DriveUploader;
use crate::error::AppError;
use crate::query;
use crate::record::{Category, GeoPoint};
use crate::sheets::SheetsStore;
use crate::store::{CachedRecords, RecordStore};
use crate::validate::{self, NewSubmission};

pub struct AppState {
    repo: CachedRecords,
    uploader: Option<DriveUploader>,
    /// The point last clicked on the map. Starts unset; validation reads
    /// it; a successful submission clears it along with the form.
    picked: Mutex<Option<GeoPoint>>,
}

#[derive(Deserialize)]
struct LocationUpdate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct SearchQuery {
    author: String,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
    message: Option<String>,
}

impl ApiResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            status: "ok".to_string(),
            message: None,
        })
    }
}

/// Map an error onto the inline JSON shape the page renders. Every failure
/// path ends up here; nothing is swallowed.
fn api_error(err: &AppError) -> Response {
    let status = match err {
        AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Form(_) => StatusCode::BAD_REQUEST,
        AppError::Remote { .. } | AppError::Http(_) => StatusCode::BAD_GATEWAY,
        AppError::StoreFormat { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    match err {
        AppError::Validation(_) | AppError::Form(_) => warn!("{err}"),
        _ => error!("{err}"),
    }
    (
        status,
        Json(ApiResponse {
            status: "error".to_string(),
            message: Some(err.to_string()),
        }),
    )
        .into_response()
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store: Box<dyn RecordStore> = match &config.csv_path {
        Some(path) => Box::new(CsvStore::new(path)),
        None => Box::new(SheetsStore::new(&config)),
    };

    let app_state = Arc::new(AppState {
        repo: CachedRecords::new(store),
        uploader: DriveUploader::from_config(&config),
        picked: Mutex::new(None),
    });

    let app = Router::new()
        .route("/", get(serve_index))
        .route("/api/location", post(pick_location))
        .route("/api/records", get(get_records))
        .route("/api/search", get(search_records))
        .route("/api/histogram", get(get_histogram))
        .route("/api/submit", post(submit_complaint))
        .with_state(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    println!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn pick_location(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LocationUpdate>,
) -> Response {
    match GeoPoint::new(payload.lat, payload.lon) {
        Some(point) => {
            *state.picked.lock().await = Some(point);
            Json(serde_json::json!({
                "status": "ok",
                "lat": point.lat,
                "lon": point.lon,
            }))
            .into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse {
                status: "error".to_string(),
                message: Some(format!(
                    "coordinates ({}, {}) are out of range",
                    payload.lat, payload.lon
                )),
            }),
        )
            .into_response(),
    }
}

async fn get_records(State(state): State<Arc<AppState>>) -> Response {
    let records = match state.repo.records().await {
        Ok(records) => records,
        Err(e) => return api_error(&e),
    };
    let listing = query::chronological(&records);
    Json(serde_json::json!({
        "status": "ok",
        "count": listing.len(),
        "records": listing,
    }))
    .into_response()
}

async fn search_records(
    Query(params): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let records = match state.repo.records().await {
        Ok(records) => records,
        Err(e) => return api_error(&e),
    };
    let hits = query::search_by_author(&records, &params.author);
    Json(serde_json::json!({
        "status": "ok",
        "count": hits.len(),
        "records": hits,
    }))
    .into_response()
}

async fn get_histogram(State(state): State<Arc<AppState>>) -> Response {
    let records = match state.repo.records().await {
        Ok(records) => records,
        Err(e) => return api_error(&e),
    };
    let series = query::daily_counts(&records);
    // A chart failure stays inside this view; the other views keep
    // rendering from the same record set.
    match chart::histogram_png(&series, &ChartOptions::default()) {
        Ok(png) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image/png")
            .body(axum::body::Body::from(png))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => api_error(&e),
    }
}

/// Fields collected from the multipart submission form.
#[derive(Debug, Default)]
struct SubmitForm {
    author: String,
    content: String,
    date: String,
    category: Option<String>,
    attachment: Option<(String, String, Vec<u8>)>,
}

async fn read_form(multipart: &mut Multipart) -> Result<SubmitForm, AppError> {
    // A body that cannot be read fails the whole submission with a visible
    // message; a half-read attachment must never submit as "no attachment".
    let form_err = |e: MultipartError| AppError::form(e.to_string());

    let mut form = SubmitForm::default();
    while let Some(field) = multipart.next_field().await.map_err(form_err)? {
        let name = field.name().unwrap_or("unknown").to_string();
        match name.as_str() {
            "author" => form.author = field.text().await.map_err(form_err)?,
            "content" => form.content = field.text().await.map_err(form_err)?,
            "date" => form.date = field.text().await.map_err(form_err)?,
            "category" => form.category = Some(field.text().await.map_err(form_err)?),
            "attachment" => {
                let filename = field.file_name().unwrap_or("attachment").to_string();
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(form_err)?.to_vec();
                if !bytes.is_empty() {
                    form.attachment = Some((filename, mime, bytes));
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn submit_complaint(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => return api_error(&e),
    };

    // Location first, then field completeness: the variant tells the user
    // the next thing to fix.
    let picked = *state.picked.lock().await;
    let point = match validate::validate_submission(
        picked,
        &form.author,
        &form.content,
        form.category.as_deref(),
    ) {
        Ok(point) => point,
        Err(e) => return api_error(&AppError::Validation(e)),
    };

    let attachment = match form.attachment {
        Some((filename, mime, bytes)) => match &state.uploader {
            Some(uploader) => match uploader.upload(&filename, &mime, bytes).await {
                Ok(url) => Some(url),
                Err(e) => return api_error(&e),
            },
            None => {
                warn!("attachment submitted but no upload folder is configured");
                None
            }
        },
        None => None,
    };

    let date = if form.date.trim().is_empty() {
        Local::now().date_naive().format("%Y-%m-%d").to_string()
    } else {
        form.date.trim().to_string()
    };

    let submission = NewSubmission {
        author: form.author.trim().to_string(),
        content: form.content.trim().to_string(),
        date,
        category: form.category.as_deref().and_then(Category::parse),
        attachment,
    };

    if let Err(e) = state.repo.append(&submission.into_record(point)).await {
        return api_error(&e);
    }

    // The submission stuck; clear the picked point with the form.
    *state.picked.lock().await = None;
    ApiResponse::ok().into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn validation_errors_map_to_unprocessable_entity() {
        let response = api_error(&AppError::Validation(ValidationError::MissingLocation));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn remote_errors_map_to_bad_gateway() {
        let response = api_error(&AppError::remote_transient("quota"));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn form_errors_map_to_bad_request() {
        let response = api_error(&AppError::form("unexpected end of body"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn truncated_attachment_body_fails_the_submission() {
        use axum::extract::FromRequest;

        // An attachment part that ends without its closing boundary: the
        // body read must surface as a form error, not an empty attachment.
        let body = "--BOUND\r\n\
            Content-Disposition: form-data; name=\"attachment\"; filename=\"a.png\"\r\n\
            Content-Type: image/png\r\n\r\n\
            half of the file";
        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "multipart/form-data; boundary=BOUND")
            .body(axum::body::Body::from(body))
            .unwrap();

        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        let err = read_form(&mut multipart).await.unwrap_err();
        assert!(matches!(err, AppError::Form(_)));
    }
}
