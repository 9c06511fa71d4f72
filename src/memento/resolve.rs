//! URI-R resolution for requests that are not yet mementos.

use url::{Origin, Url};

/// Resolve the URI-R a request should be replayed as.
///
/// A request issued against the replay origin came from an origin-relative
/// reference inside the replayed page, so it is re-homed onto the origin of the
/// referring page's URI-R (`scheme://host + path + query`). Any other request URL
/// is returned verbatim, as is a URL that cannot be parsed or a referring URI-R
/// without a host part.
pub fn resolve_urir(request_url: &str, ref_urir: &str, replay_origin: &Origin) -> String {
    let Ok(url) = Url::parse(request_url) else {
        return request_url.to_string();
    };
    if &url.origin() != replay_origin {
        return request_url.to_string();
    }
    let Some(origin) = urir_origin(ref_urir) else {
        tracing::debug!(request_url, ref_urir, "Referring URI-R has no origin, keeping request URL");
        return request_url.to_string();
    };

    let mut urir = format!("{origin}{}", url.path());
    if let Some(query) = url.query() {
        urir.push('?');
        urir.push_str(query);
    }
    urir
}

/// Origin prefix of a URI-R, with the scheme when it has one.
fn urir_origin(urir: &str) -> Option<&str> {
    let host_start = ["https://", "http://"]
        .iter()
        .find(|scheme| urir.starts_with(*scheme))
        .map_or(0, |scheme| scheme.len());
    let host_len = urir[host_start..].find('/').unwrap_or(urir.len() - host_start);
    if host_len == 0 {
        return None;
    }
    Some(&urir[..host_start + host_len])
}
