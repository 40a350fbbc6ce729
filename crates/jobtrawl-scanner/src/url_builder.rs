use jobtrawl_core::SearchQuery;
use url::Url;

/// Build the result page URL for a query.
///
/// The offset parameter is only emitted past the first page; filters are
/// comma-joined numeric codes and omitted when empty.
pub fn build_search_url(
    base: &Url,
    query: &SearchQuery,
    page_index: usize,
    page_size: usize,
) -> String {
    let mut url = format!(
        "{}search?keywords={}&geoId={}&refresh=true",
        base.as_str(),
        urlencoding::encode(&query.term),
        query.location_id
    );

    if page_index > 0 {
        url.push_str(&format!("&start={}", page_index * page_size));
    }

    if !query.workplace_modes.is_empty() {
        let codes = join_codes(query.workplace_modes.iter().map(|m| m.filter_code()));
        url.push_str(&format!("&f_WT={codes}"));
    }

    if !query.seniorities.is_empty() {
        let codes = join_codes(query.seniorities.iter().map(|s| s.filter_code()));
        url.push_str(&format!("&f_E={codes}"));
    }

    url
}

fn join_codes(codes: impl Iterator<Item = u8>) -> String {
    codes.map(|c| c.to_string()).collect::<Vec<_>>().join(",")
}
