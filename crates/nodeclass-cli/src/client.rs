//! Shared client utilities, credentials and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Basic-auth credentials supplied through flags or the environment.
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    pub(crate) username: String,
    pub(crate) password: String,
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) credentials: Option<Credentials>,
}

impl AppContext {
    /// Build the HTTP client, tagging every request with `request_id`.
    pub(crate) fn new(
        base_url: Url,
        credentials: Option<Credentials>,
        timeout_secs: u64,
        request_id: &str,
    ) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(request_id).map_err(|_| {
            CliError::failure(anyhow!("request identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Resolve `path` against the server URL.
    pub(crate) fn url(&self, path: &str) -> CliResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))
    }

    /// Attach credentials to `request`, failing when none were configured.
    pub(crate) fn authorized(&self, request: RequestBuilder) -> CliResult<RequestBuilder> {
        let creds = self.credentials.as_ref().ok_or_else(|| {
            CliError::validation(
                "credentials are required (pass --user/--password or set NODECLASS_USER/NODECLASS_PASSWORD)",
            )
        })?;
        Ok(request.basic_auth(&creds.username, Some(&creds.password)))
    }
}

/// Build credentials from optional flag values.
pub(crate) fn parse_credentials(
    username: Option<String>,
    password: Option<String>,
) -> CliResult<Option<Credentials>> {
    match (username, password) {
        (None, None) => Ok(None),
        (Some(username), Some(password)) => {
            if username.trim().is_empty() {
                return Err(CliError::validation("username cannot be empty"));
            }
            Ok(Some(Credentials {
                username: username.trim().to_string(),
                password,
            }))
        }
        _ => Err(CliError::validation(
            "username and password must be supplied together",
        )),
    }
}

/// Parse the server URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Split a `field=value` update directive.
pub(crate) fn parse_directive(input: &str) -> Result<(String, String), String> {
    let (field, value) = input
        .split_once('=')
        .ok_or_else(|| format!("directive '{input}' must be written as field=value"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("directive '{input}' has an empty field name"));
    }
    Ok((field.to_string(), value.to_string()))
}

/// Send `request` and return the body of a successful response.
pub(crate) async fn send(request: RequestBuilder, label: &str) -> CliResult<String> {
    tracing::debug!(request = label, "sending request");
    let response = request
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to {label} failed: {err}")))?;
    if !response.status().is_success() {
        return Err(classify_problem(response).await);
    }
    response
        .text()
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to read {label} response: {err}")))
}

#[derive(Debug, Deserialize)]
struct ProblemDocument {
    title: String,
    status: u16,
    #[serde(default)]
    detail: Option<String>,
}

/// Turn a failed response into a CLI error, preferring the problem detail.
pub(crate) async fn classify_problem(response: reqwest::Response) -> CliError {
    let status = response.status();
    let body_text = response.text().await.unwrap_or_default();
    let problem = serde_yaml::from_str::<ProblemDocument>(&body_text).ok();

    let message = problem
        .as_ref()
        .and_then(|p| p.detail.clone())
        .unwrap_or_else(|| {
            problem
                .as_ref()
                .map_or_else(|| body_text.trim().to_string(), |p| p.title.clone())
        });

    if matches!(status, StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND) {
        CliError::validation(message)
    } else {
        let detail = if let Some(problem) = problem {
            format!("{} (status {})", message, problem.status)
        } else if !body_text.trim().is_empty() {
            format!("{message} (status {status})")
        } else {
            format!("request failed with status {status}")
        };
        CliError::failure(anyhow!(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;

    #[test]
    fn exit_codes_separate_validation_from_failure() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("down")).exit_code(), 3);
        assert_eq!(CliError::validation("bad").display_message(), "bad");
    }

    #[test]
    fn directives_split_on_the_first_equals() {
        assert_eq!(
            parse_directive("motd=a=b"),
            Ok(("motd".to_string(), "a=b".to_string()))
        );
        assert_eq!(
            parse_directive("classes=-ntp"),
            Ok(("classes".to_string(), "-ntp".to_string()))
        );
        assert!(parse_directive("novalue").is_err());
        assert!(parse_directive("=x").is_err());
    }

    #[test]
    fn credentials_require_both_parts() {
        assert!(matches!(parse_credentials(None, None), Ok(None)));
        assert!(parse_credentials(Some("alice".into()), None).is_err());
        let creds = parse_credentials(Some(" alice ".into()), Some("pw".into()))
            .ok()
            .flatten()
            .expect("credentials");
        assert_eq!(creds.username, "alice");
    }

    #[tokio::test]
    async fn problem_documents_become_messages() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/groups/missing");
            then.status(404)
                .header("content-type", "text/yaml")
                .body("type: https://nodeclass.dev/problems/not-found\ntitle: resource not found\nstatus: 404\ndetail: missing not found in groups\n");
        });
        server.mock(|when, then| {
            when.method(DELETE).path("/hosts/web01");
            then.status(500).body("");
        });

        let response = reqwest::get(server.url("/groups/missing")).await?;
        let err = classify_problem(response).await;
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "missing not found in groups");

        let response = Client::new()
            .delete(server.url("/hosts/web01"))
            .send()
            .await?;
        let err = classify_problem(response).await;
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("status 500"));
        Ok(())
    }
}
