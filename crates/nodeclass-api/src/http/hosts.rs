//! Host handlers.

use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
};
use nodeclass_core::{EffectiveConfig, Host, Operation, Principal};
use nodeclass_data::CollectionKind;

use crate::http::auth::authorize;
use crate::http::errors::ApiError;
use crate::http::form::FormFields;
use crate::http::response::Yaml;
use crate::state::ApiState;

pub(crate) async fn list_hosts(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Yaml<Vec<String>>, ApiError> {
    authorize(&principal, Operation::ListHosts, None)?;
    Ok(Yaml(state.classifier.list_hosts()))
}

/// Effective configuration for the node, or an empty document when nothing
/// applies.
pub(crate) async fn get_host(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Path(fqdn): Path<String>,
) -> Result<Yaml<Option<EffectiveConfig>>, ApiError> {
    authorize(&principal, Operation::GetHost, Some(&fqdn))?;
    let resolution = state.classifier.classify(&fqdn);
    let source = resolution
        .as_ref()
        .map_or("none", |found| found.source.label());
    state.telemetry.inc_resolution(source);
    Ok(Yaml(resolution.map(|found| found.config)))
}

pub(crate) async fn create_host(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Yaml<Host>, ApiError> {
    authorize(&principal, Operation::CreateHost, None)?;
    let form = FormFields::new(pairs);
    let result = state
        .classifier
        .create_host(form.first("fqdn"), form.first("data"))
        .await;
    state.record_write(CollectionKind::Hosts, &result);
    Ok(Yaml(result?))
}

pub(crate) async fn update_host(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Path(fqdn): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Yaml<Host>, ApiError> {
    authorize(&principal, Operation::UpdateHost, Some(&fqdn))?;
    let directives = FormFields::new(pairs).directives();
    let result = state.classifier.update_host(&fqdn, &directives).await;
    state.record_write(CollectionKind::Hosts, &result);
    Ok(Yaml(result?))
}

pub(crate) async fn delete_host(
    State(state): State<Arc<ApiState>>,
    Extension(principal): Extension<Principal>,
    Path(fqdn): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, Operation::DeleteHost, Some(&fqdn))?;
    let result = state.classifier.delete_host(&fqdn).await;
    state.record_write(CollectionKind::Hosts, &result);
    result?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use nodeclass_core::{Classifier, ParamValue, Role};
    use nodeclass_telemetry::Metrics;
    use nodeclass_test_support::MemoryBackend;
    use nodeclass_test_support::fixtures::{GROUPS_DOCUMENT, HOSTS_DOCUMENT};

    async fn state() -> Result<Arc<ApiState>> {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_document(CollectionKind::Hosts, HOSTS_DOCUMENT)
                .with_document(CollectionKind::Groups, GROUPS_DOCUMENT),
        );
        let classifier = Classifier::open(backend).await?;
        Ok(Arc::new(ApiState::new(Arc::new(classifier), Metrics::new()?)))
    }

    fn pairs(values: &[(&str, &str)]) -> Form<Vec<(String, String)>> {
        Form(
            values
                .iter()
                .map(|(field, value)| ((*field).to_string(), (*value).to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn editors_update_hosts_and_counts_are_recorded() -> Result<()> {
        let state = state().await?;
        let editor = Principal::new("carol", vec![Role::User]);

        let Yaml(updated) = update_host(
            State(Arc::clone(&state)),
            Extension(editor.clone()),
            Path("web01.example.com".to_string()),
            pairs(&[("tier", "db"), ("classes", "-nginx")]),
        )
        .await
        .expect("update");
        assert_eq!(updated.parameters["tier"], ParamValue::scalar("db"));
        assert!(updated.classes.is_empty());

        let denied = delete_host(
            State(Arc::clone(&state)),
            Extension(editor),
            Path("web01.example.com".to_string()),
        )
        .await
        .expect_err("admin only");
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let rendered = state.telemetry.render()?;
        assert!(rendered.contains("outcome=\"committed\""));
        Ok(())
    }

    #[tokio::test]
    async fn lookups_record_the_resolution_source() -> Result<()> {
        let state = state().await?;
        let viewer = Principal::new("bob", vec![Role::Viewer]);

        let Yaml(found) = get_host(
            State(Arc::clone(&state)),
            Extension(viewer.clone()),
            Path("www7.example.com".to_string()),
        )
        .await
        .expect("lookup");
        assert_eq!(found.and_then(|config| config.environment).as_deref(), Some("web"));

        let created = create_host(
            State(Arc::clone(&state)),
            Extension(viewer),
            pairs(&[("fqdn", "new.example.com"), ("data", "environment: x\n")]),
        )
        .await
        .expect_err("viewers cannot create");
        assert_eq!(created.status, StatusCode::FORBIDDEN);

        let rendered = state.telemetry.render()?;
        assert!(rendered.contains("resolutions_total{source=\"group\"} 1"));
        Ok(())
    }
}
