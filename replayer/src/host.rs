use crate::error::Error;
use hyper::Uri;

/// Points `original_url` at `new_host`, keeping scheme, userinfo, port, path and query as they are.
///
/// On error the caller still owns the untouched original url and decides
/// whether to replay against it.
pub fn rewrite_host(original_url: &str, new_host: &str) -> Result<String, Error> {
    let uri: Uri = original_url
        .parse()
        .map_err(|_| Error::UrlParse(original_url.into()))?;

    if new_host.is_empty() {
        return Err(Error::MissingTargetHost);
    }

    let authority = uri
        .authority()
        .ok_or_else(|| Error::UrlParse(original_url.into()))?;

    let authority_start = original_url
        .find("://")
        .map(|index| index + 3)
        .ok_or_else(|| Error::UrlParse(original_url.into()))?;
    let authority_end = authority_start + authority.as_str().len();

    if original_url.get(authority_start..authority_end) != Some(authority.as_str()) {
        return Err(Error::UrlParse(original_url.into()));
    }

    let host_start = authority_start
        + authority
            .as_str()
            .rfind('@')
            .map(|index| index + 1)
            .unwrap_or(0);
    let host_end = host_start + authority.host().len();

    let new_host = if new_host.contains(':') && !new_host.starts_with('[') {
        format!("[{}]", new_host)
    } else {
        String::from(new_host)
    };

    Ok(format!(
        "{}{}{}",
        &original_url[..host_start],
        new_host,
        &original_url[host_end..]
    ))
}
