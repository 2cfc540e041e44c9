//! Dashboard routes
//!
//! Dashboard links look like `https://host/report/<id>`. These helpers
//! turn such links (or plain paths and bare ids) back into report ids.

/// A dashboard location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Demo,
    Report(String),
}

impl Route {
    /// Match a URL path; unknown paths fall back to the landing page
    pub fn from_path(path: &str) -> Self {
        if let Some(id) = report_id_from_path(path) {
            return Route::Report(id);
        }
        match path.trim_end_matches('/') {
            "/demo" => Route::Demo,
            _ => Route::Landing,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Demo => "/demo".to_string(),
            Route::Report(id) => format!("/report/{}", urlencoding::encode(id)),
        }
    }
}

fn report_id_from_path(path: &str) -> Option<String> {
    let re = regex::Regex::new(r"^/report/([^/?#]+)").ok()?;
    let raw = re.captures(path)?.get(1)?.as_str();
    let id = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(id).filter(|id| !id.trim().is_empty())
}

/// Accept a report id, a `/report/<id>` path or a full dashboard URL
pub fn resolve_report_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = url::Url::parse(input) {
        if matches!(url.scheme(), "http" | "https") {
            return report_id_from_path(url.path());
        }
    }

    if input.starts_with('/') {
        return report_id_from_path(input);
    }

    (!input.contains('/')).then(|| input.to_string())
}
