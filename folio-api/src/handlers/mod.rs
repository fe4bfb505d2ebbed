//! HTTP handlers. Every JSON reply is wrapped as `{"data": ...}`, list
//! endpoints add `"meta"`.

pub mod about;
pub mod auth;
pub mod blog;
pub mod contact;
pub mod dashboard;
pub mod health;
pub mod messages;
pub mod projects;
pub mod public;
pub mod site;
pub mod upload;

use crate::error::ApiError;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct Page<T, M> {
    pub data: T,
    pub meta: M,
}

#[derive(Debug, Serialize)]
pub struct Total {
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct Reordered {
    pub success: bool,
    pub count: usize,
}

pub fn ok<T>(data: T) -> Json<Data<T>> {
    Json(Data { data })
}

pub fn created<T>(data: T) -> (StatusCode, Json<Data<T>>) {
    (StatusCode::CREATED, Json(Data { data }))
}

pub fn page<T, M>(data: T, meta: M) -> Json<Page<T, M>> {
    Json(Page { data, meta })
}

pub fn success() -> Json<Data<Success>> {
    ok(Success { success: true })
}

pub type JsonResult<T> = Result<Json<Data<T>>, ApiError>;
