//! REST routes for customer records.
//!
//! - `POST   /clientes`        — create a customer
//! - `GET    /clientes`        — list all customers
//! - `GET    /clientes/{id}`   — fetch one customer
//! - `PATCH  /clientes/{id}`   — partial update
//! - `DELETE /clientes/{id}`   — delete, returning the prior state
//!
//! Payloads are structurally validated against the schemas in
//! `clientes_core::validation` before the directory service runs; business
//! failures map to 400 (duplicates) or 404 (not found).

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use clientes_core::domain::cliente::{AtualizaCliente, Cliente, ClienteId, NovoCliente};
use clientes_core::errors::{ClienteError, ValidationError, Violation};
use clientes_core::validation;
use clientes_core::ClienteService;
use clientes_db::{DbPool, SqlClienteRepository};

#[derive(Clone)]
pub struct ClientesState {
    directory: Arc<ClienteService<SqlClienteRepository>>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl ApiError {
    fn message(error: impl Into<String>) -> Self {
        Self { error: error.into(), violations: Vec::new() }
    }
}

pub fn router(db_pool: DbPool) -> Router {
    let directory = Arc::new(ClienteService::new(SqlClienteRepository::new(db_pool)));

    Router::new()
        .route("/clientes", get(list_clientes).post(create_cliente))
        .route(
            "/clientes/{id}",
            get(get_cliente).patch(update_cliente).delete(delete_cliente),
        )
        .with_state(ClientesState { directory })
}

async fn create_cliente(
    State(state): State<ClientesState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Cliente>), (StatusCode, Json<ApiError>)> {
    validation::CREATE.check(&payload).map_err(invalid_payload)?;
    let input: NovoCliente = serde_json::from_value(payload).map_err(malformed_payload)?;

    let cliente = state.directory.create(input).await.map_err(business_error)?;
    Ok((StatusCode::CREATED, Json(cliente)))
}

async fn list_clientes(
    State(state): State<ClientesState>,
) -> Result<Json<Vec<Cliente>>, (StatusCode, Json<ApiError>)> {
    let clientes = state.directory.find_all().await.map_err(business_error)?;
    Ok(Json(clientes))
}

async fn get_cliente(
    State(state): State<ClientesState>,
    Path(id): Path<String>,
) -> Result<Json<Cliente>, (StatusCode, Json<ApiError>)> {
    let id = parse_id(&id)?;
    let cliente = state.directory.find_one(&id).await.map_err(business_error)?;
    Ok(Json(cliente))
}

async fn update_cliente(
    State(state): State<ClientesState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Cliente>, (StatusCode, Json<ApiError>)> {
    let id = parse_id(&id)?;
    validation::UPDATE.check(&payload).map_err(invalid_payload)?;
    let patch: AtualizaCliente = serde_json::from_value(payload).map_err(malformed_payload)?;

    let cliente = state.directory.update(&id, patch).await.map_err(business_error)?;
    Ok(Json(cliente))
}

async fn delete_cliente(
    State(state): State<ClientesState>,
    Path(id): Path<String>,
) -> Result<Json<Cliente>, (StatusCode, Json<ApiError>)> {
    let id = parse_id(&id)?;
    let cliente = state.directory.remove(&id).await.map_err(business_error)?;
    Ok(Json(cliente))
}

/// A malformed id cannot match any record, so it reads as not-found rather
/// than bad-request, matching the behavior of looking up an unassigned id.
fn parse_id(raw: &str) -> Result<ClienteId, (StatusCode, Json<ApiError>)> {
    Uuid::parse_str(raw).map(ClienteId).map_err(|_| {
        (StatusCode::NOT_FOUND, Json(ApiError::message(ClienteError::NotFound.to_string())))
    })
}

fn invalid_payload(error: ValidationError) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError { error: error.to_string(), violations: error.violations }),
    )
}

fn malformed_payload(error: serde_json::Error) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError::message(format!("payload inválido: {error}"))))
}

fn business_error(error: ClienteError) -> (StatusCode, Json<ApiError>) {
    match &error {
        ClienteError::NotFound => {
            (StatusCode::NOT_FOUND, Json(ApiError::message(error.to_string())))
        }
        ClienteError::DuplicateCpfCnpj | ClienteError::DuplicateEmail => {
            (StatusCode::BAD_REQUEST, Json(ApiError::message(error.to_string())))
        }
        ClienteError::Store(store_error) => {
            // Storage detail stays in the log.
            error!(
                event_name = "clientes.storage_error",
                error = %store_error,
                "cliente operation failed in storage"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::message("erro interno ao processar a requisição")),
            )
        }
    }
}
