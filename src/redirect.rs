use url::Url;

/// Returns `candidate` as a same-origin path, or `default` when it could leave `app_origin`.
pub fn safe_redirect(candidate: Option<&str>, app_origin: &Url, default: &str) -> String {
    let Some(candidate) = candidate.map(str::trim).filter(|c| !c.is_empty()) else {
        return default.to_string();
    };

    if !candidate.starts_with('/')
        || candidate.starts_with("//")
        || candidate.contains('\\')
        || candidate.chars().any(|c| c.is_ascii_control())
    {
        tracing::debug!("rejecting redirect target that is not a local path");
        return default.to_string();
    }

    let Ok(joined) = app_origin.join(candidate) else {
        return default.to_string();
    };

    if joined.origin() != app_origin.origin() {
        tracing::debug!("rejecting redirect target that changes origin");
        return default.to_string();
    }

    let mut location = joined.path().to_string();
    if let Some(query) = joined.query() {
        location.push('?');
        location.push_str(query);
    }
    if let Some(fragment) = joined.fragment() {
        location.push('#');
        location.push_str(fragment);
    }
    location
}
