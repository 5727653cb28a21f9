//! Environment/runtime helpers
//!
//! Detection of serverless platforms, whose filesystem cannot hold the prize file.

/// Variables set by the serverless platforms we know about.
pub const SERVERLESS_MARKERS: &[&str] = &["VERCEL", "AWS_LAMBDA_FUNCTION_NAME", "NETLIFY"];

/// True when any platform marker is present and non-empty.
pub fn is_serverless() -> bool {
    SERVERLESS_MARKERS.iter().any(|k| marker_set(std::env::var(k).ok().as_deref()))
}

fn marker_set(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}
