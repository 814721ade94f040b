//! Reads one webhook subscription of a list.
//!
//! # Examples
//!
//! ```bash
//! spo-batch list webhook get --web-url https://contoso.sharepoint.com/sites/ninja \
//!     --list-title Documents --id cc27a922-8224-4296-90a5-ebbc54da2e85
//! ```

use clap::{Args, Subcommand};
use client_query::objects::ObjectSelector;
use client_query::{ClientContext, ClientQueryClient, Error as ClientError, ListSubscription};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use crate::errors::Error;
use crate::validation::{exactly_one, validate_guid, validate_sharepoint_url, Either};

#[cfg(test)]
#[path = "list_webhook_get_cmd_tests.rs"]
mod tests;

#[derive(Subcommand, Debug, Clone)]
pub enum ListCommands {
    /// Manage list webhooks
    #[command(subcommand)]
    Webhook(WebhookCommands),
}

#[derive(Subcommand, Debug, Clone)]
pub enum WebhookCommands {
    /// Get a webhook subscription of a list
    Get(ListWebhookGetArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListWebhookGetArgs {
    /// URL of the site where the list is located
    #[arg(long)]
    pub web_url: String,

    /// Id of the list. Specify either list id or list title
    #[arg(long)]
    pub list_id: Option<String>,

    /// Title of the list. Specify either list id or list title
    #[arg(long)]
    pub list_title: Option<String>,

    /// Id of the subscription
    #[arg(long)]
    pub id: String,
}

/// Validated form of [`ListWebhookGetArgs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListWebhookGetOptions {
    pub web_url: Url,
    pub list: ObjectSelector,
    pub id: Uuid,
}

impl ListWebhookGetArgs {
    /// Checks the arguments and converts them to [`ListWebhookGetOptions`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArguments` describing the first invalid argument.
    pub fn validate(&self) -> Result<ListWebhookGetOptions, Error> {
        let web_url = validate_sharepoint_url(&self.web_url)?;

        let list = match exactly_one(
            self.list_id.as_deref(),
            self.list_title.as_deref(),
            "listId",
            "listTitle",
        )? {
            Either::First(id) => ObjectSelector::Id(validate_guid(id)?),
            Either::Second(title) => ObjectSelector::Title(title.to_string()),
        };

        let id = validate_guid(&self.id)?;

        Ok(ListWebhookGetOptions { web_url, list, id })
    }
}

/// Validates `args` and fetches the subscription.
pub async fn execute(
    args: &ListWebhookGetArgs,
    client: &ClientQueryClient,
    application_name: &str,
) -> Result<Option<ListSubscription>, Error> {
    let options = args.validate()?;
    let context = ClientContext::new(options.web_url.clone(), application_name);
    get_webhook(client, &context, &options).await
}

/// Fetches the subscription described by `options` from the site in `context`.
///
/// Returns `None` when the service answers with an empty object.
///
/// # Errors
///
/// - `Error::Client` carrying the service's rejection verbatim
/// - `Error::Client` with `MalformedResponse` if the subscription cannot be read
#[instrument(skip(client, context), fields(site = %context.site_url))]
pub async fn get_webhook(
    client: &ClientQueryClient,
    context: &ClientContext,
    options: &ListWebhookGetOptions,
) -> Result<Option<ListSubscription>, Error> {
    let path = subscription_path(&options.list, &options.id);
    let body = client.get_json(context, &path).await?;

    if is_empty_object(&body) {
        debug!("No webhook subscription returned");
        return Ok(None);
    }

    let subscription = serde_json::from_value::<ListSubscription>(body).map_err(|e| {
        ClientError::MalformedResponse(format!("unreadable subscription: {}", e))
    })?;
    Ok(Some(subscription))
}

/// REST path of one subscription, relative to the site.
pub fn subscription_path(list: &ObjectSelector, id: &Uuid) -> String {
    let list = match list {
        ObjectSelector::Id(list_id) => format!("lists(guid'{}')", list_id),
        ObjectSelector::Title(title) | ObjectSelector::InternalNameOrTitle(title) => {
            format!("lists/GetByTitle('{}')", encode_title(title))
        }
    };
    format!("_api/web/{}/Subscriptions('{}')", list, id)
}

// Everything outside unreserved characters and the OData literal punctuation is escaped, so
// `Url::parse` cannot reinterpret a title character as a path separator.
const TITLE_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// Quotes are doubled for the OData literal before the title is escaped.
fn encode_title(title: &str) -> String {
    let quoted = title.replace('\'', "''");
    utf8_percent_encode(&quoted, TITLE_SEGMENT).to_string()
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().map(|o| o.is_empty()).unwrap_or(false)
}
