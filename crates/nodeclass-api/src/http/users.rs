//! User handlers. Responses never carry the stored password hash.

use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
};
use nodeclass_core::{Operation, Principal, UserView};
use nodeclass_data::CollectionKind;

use crate::http::auth::authorize;
use crate::http::errors::ApiError;
use crate::http::form::FormFields;
use crate::http::response::Yaml;
use crate::state::ApiState;

/// Role values may be submitted as repeated `role` or `roles` fields.
fn role_values(form: &FormFields) -> Vec<String> {
    let mut values = form.all("role");
    values.extend(form.all("roles"));
    values
}

pub(crate) async fn list_users(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Yaml<Vec<String>>, ApiError> {
    authorize(&principal, Operation::ListUsers, None)?;
    Ok(Yaml(state.classifier.list_users()))
}

pub(crate) async fn get_user(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Path(username): Path<String>,
) -> Result<Yaml<UserView>, ApiError> {
    authorize(&principal, Operation::GetUser, Some(&username))?;
    Ok(Yaml(state.classifier.get_user(&username)?))
}

pub(crate) async fn create_user(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Yaml<UserView>, ApiError> {
    authorize(&principal, Operation::CreateUser, None)?;
    let form = FormFields::new(pairs);
    let result = state
        .classifier
        .create_user(
            form.first("username"),
            form.first("password"),
            &role_values(&form),
        )
        .await;
    state.record_write(CollectionKind::Users, &result);
    Ok(Yaml(result?))
}

pub(crate) async fn update_user(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Path(username): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Yaml<UserView>, ApiError> {
    authorize(&principal, Operation::UpdateUser, Some(&username))?;
    let form = FormFields::new(pairs);
    let result = state
        .classifier
        .update_user(&username, form.optional("password"), &role_values(&form))
        .await;
    state.record_write(CollectionKind::Users, &result);
    Ok(Yaml(result?))
}

pub(crate) async fn delete_user(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, Operation::DeleteUser, Some(&username))?;
    let result = state.classifier.delete_user(&username).await;
    state.record_write(CollectionKind::Users, &result);
    result?;
    Ok(StatusCode::NO_CONTENT)
}
