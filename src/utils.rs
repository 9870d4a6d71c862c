use url::Url;

/// Splits a literal endpoint such as `/api/get_items` into path segments.
pub fn split_endpoint(endpoint: &str) -> Vec<String> {
    endpoint
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Appends `segments` to the base URL's path, percent-encoding each one.
pub fn endpoint_url(base: &Url, segments: &[String]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
    Some(url)
}
