//! Lists external users of the tenant or of one site collection.
//!
//! Requires the configured connection to point at the tenant admin site.
//!
//! # Examples
//!
//! ```bash
//! # First page of 10 tenant external users
//! spo-batch externaluser list
//!
//! # All external users of one site whose name matches "Vesa", newest e-mail first
//! spo-batch externaluser list --site-url https://contoso.sharepoint.com --filter Vesa --sort-order desc --all
//! ```

use std::sync::Arc;

use clap::{Args, Subcommand};
use client_query::paging::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use client_query::{
    BatchRunner, ClientContext, ExternalUser, ExternalUserPager, ExternalUserQuery, SortOrder,
};
use futures::TryStreamExt;
use tracing::{debug, instrument};

use crate::errors::Error;
use crate::validation::{ensure_tenant_admin_site, validate_sharepoint_url};

#[cfg(test)]
#[path = "externaluser_list_cmd_tests.rs"]
mod tests;

#[derive(Subcommand, Debug, Clone)]
pub enum ExternalUserCommands {
    /// List external users in the tenant
    List(ExternalUserListArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExternalUserListArgs {
    /// Only return users with this text in their name or e-mail
    #[arg(long)]
    pub filter: Option<String>,

    /// Number of users per page, between 1 and 50. Default 10
    #[arg(long, allow_negative_numbers = true)]
    pub page_size: Option<i32>,

    /// Position of the page to return. Default 0
    #[arg(long, allow_negative_numbers = true)]
    pub position: Option<i32>,

    /// Sort order by e-mail: asc or desc. Default asc
    #[arg(long)]
    pub sort_order: Option<String>,

    /// URL of the site collection whose external users to list
    #[arg(long)]
    pub site_url: Option<String>,

    /// Fetch every page instead of only the requested one
    #[arg(long)]
    pub all: bool,
}

impl ExternalUserListArgs {
    /// Checks the arguments and converts them to an [`ExternalUserQuery`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArguments` describing the first invalid argument.
    pub fn validate(&self) -> Result<ExternalUserQuery, Error> {
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::InvalidArguments(format!(
                "pageSize must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }

        let position = self.position.unwrap_or(0);
        if position < 0 {
            return Err(Error::InvalidArguments(format!(
                "position must be a positive number, got {}",
                position
            )));
        }

        let sort_order = match self.sort_order.as_deref() {
            None | Some("asc") => SortOrder::Ascending,
            Some("desc") => SortOrder::Descending,
            Some(other) => {
                return Err(Error::InvalidArguments(format!(
                    "{} is not a valid sortOrder value. Allowed values asc|desc",
                    other
                )))
            }
        };

        if let Some(url) = &self.site_url {
            validate_sharepoint_url(url)?;
        }

        Ok(ExternalUserQuery {
            site_url: self.site_url.clone(),
            position,
            page_size,
            filter: self.filter.clone(),
            sort_order,
        })
    }
}

/// Validates `args` and lists the users through the tenant admin site at `admin_url`.
///
/// # Errors
///
/// - `Error::Config` if no admin site is configured
/// - `Error::NotTenantAdminSite` if `admin_url` is not a tenant admin site
/// - `Error::Client` if a round trip fails
pub async fn execute(
    args: &ExternalUserListArgs,
    runner: Arc<dyn BatchRunner>,
    admin_url: Option<&str>,
    application_name: &str,
) -> Result<Vec<ExternalUser>, Error> {
    let admin_url = admin_url.ok_or_else(|| {
        Error::Config(
            "No tenant admin site configured. Set connection.admin_url and try again".to_string(),
        )
    })?;
    let admin_url = ensure_tenant_admin_site(admin_url)?;
    let query = args.validate()?;

    let context = ClientContext::new(admin_url, application_name);
    list_external_users(runner, context, query, args.all).await
}

/// Fetches one page, or every page when `all` is set.
#[instrument(skip(runner, context), fields(site = %context.site_url))]
pub async fn list_external_users(
    runner: Arc<dyn BatchRunner>,
    context: ClientContext,
    query: ExternalUserQuery,
    all: bool,
) -> Result<Vec<ExternalUser>, Error> {
    let mut pager = ExternalUserPager::new(runner, context, query);

    let users: Vec<ExternalUser> = if all {
        pager.into_stream().try_collect().await?
    } else {
        pager
            .next_page()
            .await?
            .map(|page| page.users)
            .unwrap_or_default()
    };

    debug!(users = users.len(), "Listed external users");
    Ok(users)
}
