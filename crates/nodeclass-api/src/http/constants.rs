//! Shared HTTP constants (headers, problem URIs, content types).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const AUTH_REALM_CHALLENGE: &str = "Basic realm=\"nodeclass\"";
pub(crate) const CONTENT_TYPE_YAML: &str = "text/yaml; charset=utf-8";
pub(crate) const CONTENT_TYPE_METRICS: &str = "text/plain; version=0.0.4";

pub(crate) const PROBLEM_INTERNAL: &str = "https://nodeclass.dev/problems/internal";
pub(crate) const PROBLEM_UNAUTHORIZED: &str = "https://nodeclass.dev/problems/unauthorized";
pub(crate) const PROBLEM_FORBIDDEN: &str = "https://nodeclass.dev/problems/forbidden";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://nodeclass.dev/problems/bad-request";
pub(crate) const PROBLEM_NOT_FOUND: &str = "https://nodeclass.dev/problems/not-found";
