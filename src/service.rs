use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::builder::{build_virtual_machine, generate_password};
use crate::cluster::ClusterClient;
use crate::dto::{
    CreateVmRequest, CreateVmResponse, DeleteVmRequest, DeleteVmResponse, VmTerminalRequest,
    VmTerminalResponse,
};
use crate::error::ApiError;
use crate::names;

fn checked_vm_name(name: &str) -> Result<(), ApiError> {
    if names::is_valid_vm_name(name) {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "vm_name {:?} is not a valid DNS-1123 label",
            name
        )))
    }
}

pub fn routes() -> Router {
    async fn ping() -> impl IntoResponse {
        Json(json!({ "message": "pong" }))
    }

    async fn create_vm(
        req: Result<Json<CreateVmRequest>, JsonRejection>,
        Extension(cluster): Extension<ClusterClient>,
    ) -> Result<impl IntoResponse, ApiError> {
        let Json(req) = req.map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        checked_vm_name(&req.vm_name)?;
        let password = req.password.clone().unwrap_or_else(generate_password);
        let vm = build_virtual_machine(
            &req.vm_name,
            &req.image_name,
            &req.memory,
            &password,
            cluster.namespace(),
        )?;
        let vm_name = cluster.create_vm(&vm).await?;
        Ok(Json(CreateVmResponse { vm_name, password }))
    }

    async fn delete_vm(
        req: Result<Json<DeleteVmRequest>, JsonRejection>,
        Extension(cluster): Extension<ClusterClient>,
    ) -> Result<impl IntoResponse, ApiError> {
        let Json(req) = req.map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        checked_vm_name(&req.vm_name)?;
        cluster.delete_vm(&req.vm_name).await?;
        Ok(Json(DeleteVmResponse {
            vm_name: req.vm_name,
        }))
    }

    async fn vm_terminal(
        req: Result<Json<VmTerminalRequest>, JsonRejection>,
        Extension(cluster): Extension<ClusterClient>,
    ) -> Result<impl IntoResponse, ApiError> {
        let Json(req) = req.map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        checked_vm_name(&req.vm_name)?;
        let url = cluster.expose_terminal(&req.vm_name).await?;
        Ok(Json(VmTerminalResponse { url }))
    }

    Router::new()
        .route("/ping", get(ping))
        .route("/vm", post(create_vm).delete(delete_vm))
        .route("/vm/terminal", post(vm_terminal))
}
