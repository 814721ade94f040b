//! Argument validation shared by the commands.

use url::Url;
use uuid::Uuid;

use crate::errors::Error;

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;

fn is_sharepoint_host(url: &Url) -> bool {
    url.host_str()
        .map(|host| host.to_ascii_lowercase().contains(".sharepoint."))
        .unwrap_or(false)
}

/// Parses `value` as an absolute `https` URL on a SharePoint Online host.
pub fn validate_sharepoint_url(value: &str) -> Result<Url, Error> {
    let invalid = || {
        Error::InvalidArguments(format!(
            "{} is not a valid SharePoint Online site URL",
            value
        ))
    };

    let url = Url::parse(value).map_err(|_| invalid())?;
    if url.scheme() != "https" || !is_sharepoint_host(&url) {
        return Err(invalid());
    }
    Ok(url)
}

pub fn validate_guid(value: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(value)
        .map_err(|_| Error::InvalidArguments(format!("{} is not a valid GUID", value)))
}

/// Checks that `value` points at a tenant admin site, e.g. `https://contoso-admin.sharepoint.com`.
pub fn ensure_tenant_admin_site(value: &str) -> Result<Url, Error> {
    let url = Url::parse(value).map_err(|_| Error::NotTenantAdminSite(value.to_string()))?;
    let is_admin = url
        .host_str()
        .map(|host| host.to_ascii_lowercase().contains("-admin.sharepoint."))
        .unwrap_or(false);

    if !is_admin {
        return Err(Error::NotTenantAdminSite(value.to_string()));
    }
    Ok(url)
}

/// Requires exactly one of two mutually exclusive options.
pub fn exactly_one<T>(
    first: Option<T>,
    second: Option<T>,
    first_name: &str,
    second_name: &str,
) -> Result<Either<T>, Error> {
    match (first, second) {
        (Some(value), None) => Ok(Either::First(value)),
        (None, Some(value)) => Ok(Either::Second(value)),
        (Some(_), Some(_)) => Err(Error::InvalidArguments(format!(
            "Specify {} or {}, but not both",
            first_name, second_name
        ))),
        (None, None) => Err(Error::InvalidArguments(format!(
            "Specify {} or {}, one is required",
            first_name, second_name
        ))),
    }
}

/// Which of two mutually exclusive options was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Either<T> {
    First(T),
    Second(T),
}
