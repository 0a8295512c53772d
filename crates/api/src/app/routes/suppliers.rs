use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::debug;

use supplyhub_core::version::{format_etag, parse_etag};
use supplyhub_core::{AggregateRoot, SearchCriteria, SupplierId};
use supplyhub_suppliers::FetchPlan;

use crate::app::errors::{self, ProblemType};
use crate::app::dto;
use crate::Operations;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/names/:prefix", get(list_names))
}

/// Malformed ids cannot name an existing supplier.
fn parse_id(raw: &str, instance: &str) -> Result<SupplierId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::problem(
            StatusCode::NOT_FOUND,
            ProblemType::NotFound,
            format!("no supplier with id {raw}"),
            instance,
        )
    })
}

fn bad_body(rejection: JsonRejection, instance: &str) -> axum::response::Response {
    errors::problem(
        StatusCode::BAD_REQUEST,
        ProblemType::BadRequest,
        rejection.body_text(),
        instance,
    )
}

/// Header value as text; a non-UTF-8 value is kept as an empty (malformed) tag.
fn header_text<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).map(|v| v.to_str().unwrap_or(""))
}

pub async fn list_suppliers(
    Extension(ops): Extension<Operations>,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> axum::response::Response {
    let criteria: SearchCriteria = params.into_iter().collect();
    debug!(%criteria, "list suppliers");

    match ops.find(&criteria).await {
        Ok(found) => (
            StatusCode::OK,
            Json(dto::SupplierListResponse::from_suppliers(&found)),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e, uri.path()),
    }
}

pub async fn get_supplier(
    Extension(ops): Extension<Operations>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id, uri.path()) {
        Ok(id) => id,
        Err(res) => return res,
    };

    let supplier = match ops.find_by_id(id, FetchPlan::WithDeliveries).await {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e, uri.path()),
    };

    let etag = format_etag(supplier.version());
    if header_text(&headers, header::IF_NONE_MATCH) == Some(etag.as_str()) {
        debug!(supplier_id = %id, "not modified");
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    (
        StatusCode::OK,
        [(header::ETAG, etag)],
        Json(dto::SupplierResponse::from(&supplier)),
    )
        .into_response()
}

pub async fn list_names(
    Extension(ops): Extension<Operations>,
    uri: Uri,
    Path(prefix): Path<String>,
) -> axum::response::Response {
    match ops.find_names_by_prefix(&prefix).await {
        Ok(names) => (StatusCode::OK, Json(names)).into_response(),
        Err(e) => errors::domain_error_to_response(e, uri.path()),
    }
}

pub async fn create_supplier(
    Extension(ops): Extension<Operations>,
    uri: Uri,
    body: Result<Json<dto::SupplierRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_body(rejection, uri.path()),
    };

    match ops.create(body.into_draft()).await {
        Ok(created) => {
            let id = created.id().to_string();
            (
                StatusCode::CREATED,
                [
                    (header::LOCATION, format!("/suppliers/{id}")),
                    (header::ETAG, format_etag(created.version())),
                ],
                Json(dto::CreatedResponse { id }),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e, uri.path()),
    }
}

pub async fn update_supplier(
    Extension(ops): Extension<Operations>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<dto::SupplierRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id, uri.path()) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let version = match parse_etag(header_text(&headers, header::IF_MATCH)) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e, uri.path()),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_body(rejection, uri.path()),
    };

    match ops.update(body.into_draft(), id, version).await {
        Ok(updated) => (
            StatusCode::NO_CONTENT,
            [(header::ETAG, format_etag(updated.version()))],
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e, uri.path()),
    }
}

pub async fn delete_supplier(
    Extension(ops): Extension<Operations>,
    uri: Uri,
    Path(id): Path<String>,
) -> axum::response::Response {
    // nothing to delete under a malformed id
    let Ok(id) = id.parse::<SupplierId>() else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match ops.delete_by_id(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e, uri.path()),
    }
}
