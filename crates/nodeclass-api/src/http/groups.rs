//! Group handlers.

use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
};
use nodeclass_core::{Group, Operation, Principal};
use nodeclass_data::CollectionKind;

use crate::http::auth::authorize;
use crate::http::errors::ApiError;
use crate::http::form::FormFields;
use crate::http::response::Yaml;
use crate::state::ApiState;

pub(crate) async fn list_groups(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Yaml<Vec<String>>, ApiError> {
    authorize(&principal, Operation::ListGroups, None)?;
    Ok(Yaml(state.classifier.list_groups()))
}

pub(crate) async fn get_group(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<Yaml<Group>, ApiError> {
    authorize(&principal, Operation::GetGroup, Some(&name))?;
    Ok(Yaml(state.classifier.get_group(&name)?))
}

pub(crate) async fn create_group(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Yaml<Group>, ApiError> {
    authorize(&principal, Operation::CreateGroup, None)?;
    let form = FormFields::new(pairs);
    let result = state
        .classifier
        .create_group(form.first("name"), form.first("data"))
        .await;
    state.record_write(CollectionKind::Groups, &result);
    Ok(Yaml(result?))
}

pub(crate) async fn update_group(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Yaml<Group>, ApiError> {
    authorize(&principal, Operation::UpdateGroup, Some(&name))?;
    let directives = FormFields::new(pairs).directives();
    let result = state.classifier.update_group(&name, &directives).await;
    state.record_write(CollectionKind::Groups, &result);
    Ok(Yaml(result?))
}

pub(crate) async fn delete_group(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, Operation::DeleteGroup, Some(&name))?;
    let result = state.classifier.delete_group(&name).await;
    state.record_write(CollectionKind::Groups, &result);
    result?;
    Ok(StatusCode::NO_CONTENT)
}
