//! Updates the properties of a site or list column.
//!
//! # Examples
//!
//! ```bash
//! # Update a site column by name
//! spo-batch field set --web-url https://contoso.sharepoint.com --name MyColumn --property Description="My column"
//!
//! # Update a list column by id and push the change to lists using the site column
//! spo-batch field set --web-url https://contoso.sharepoint.com --list-title "My List" \
//!     --id 5d021339-4d62-4fe9-9d2a-c99bc56a157a --property Title="My column" --update-existing-lists
//! ```

use clap::{Args, Subcommand};
use client_query::objects::{
    resolve_object, update_and_push_changes, ObjectRoot, ObjectSelector, RESOLVED_OBJECT,
};
use client_query::{BatchRunner, ClientContext};
use tracing::{debug, info, instrument};
use url::Url;

use crate::commands::parse_key_val;
use crate::errors::Error;
use crate::validation::{exactly_one, validate_guid, validate_sharepoint_url, Either};

#[cfg(test)]
#[path = "field_set_cmd_tests.rs"]
mod tests;

#[derive(Subcommand, Debug, Clone)]
pub enum FieldCommands {
    /// Update the properties of a site or list column
    Set(FieldSetArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FieldSetArgs {
    /// Absolute URL of the site where the column is located
    #[arg(long)]
    pub web_url: String,

    /// Id of the column to update. Specify either id or name
    #[arg(long)]
    pub id: Option<String>,

    /// Internal name or title of the column to update. Specify either id or name
    #[arg(long)]
    pub name: Option<String>,

    /// Id of the list where the column is located, if it is a list column
    #[arg(long)]
    pub list_id: Option<String>,

    /// Title of the list where the column is located, if it is a list column
    #[arg(long)]
    pub list_title: Option<String>,

    /// Push the update to lists that use the site column
    #[arg(long)]
    pub update_existing_lists: bool,

    /// Column property to set, as Name=Value. May be repeated
    #[arg(long = "property", value_parser = parse_key_val)]
    pub properties: Vec<(String, String)>,
}

/// Validated form of [`FieldSetArgs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSetOptions {
    pub web_url: Url,
    pub field: ObjectSelector,
    pub list: Option<ObjectSelector>,
    pub update_existing_lists: bool,
    pub properties: Vec<(String, String)>,
}

impl FieldSetArgs {
    /// Checks the arguments and converts them to [`FieldSetOptions`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArguments` describing the first invalid argument.
    pub fn validate(&self) -> Result<FieldSetOptions, Error> {
        let web_url = validate_sharepoint_url(&self.web_url)?;

        let field = match exactly_one(self.id.as_deref(), self.name.as_deref(), "id", "name")? {
            Either::First(id) => ObjectSelector::Id(validate_guid(id)?),
            Either::Second(name) => ObjectSelector::InternalNameOrTitle(name.to_string()),
        };

        let list = match (self.list_id.as_deref(), self.list_title.as_deref()) {
            (None, None) => None,
            (list_id, list_title) => Some(
                match exactly_one(list_id, list_title, "listId", "listTitle")? {
                    Either::First(id) => ObjectSelector::Id(validate_guid(id)?),
                    Either::Second(title) => ObjectSelector::Title(title.to_string()),
                },
            ),
        };

        Ok(FieldSetOptions {
            web_url,
            field,
            list,
            update_existing_lists: self.update_existing_lists,
            properties: self.properties.clone(),
        })
    }
}

/// Validates `args` and updates the column.
pub async fn execute(
    args: &FieldSetArgs,
    runner: &dyn BatchRunner,
    application_name: &str,
) -> Result<(), Error> {
    let options = args.validate()?;
    let context = ClientContext::new(options.web_url.clone(), application_name);
    set_field(runner, &context, &options).await
}

/// Resolves the column, then sets its properties in a second round trip.
///
/// A list column takes one more round trip up front to resolve the list.
#[instrument(skip(runner, context, options), fields(site = %context.site_url))]
pub async fn set_field(
    runner: &dyn BatchRunner,
    context: &ClientContext,
    options: &FieldSetOptions,
) -> Result<(), Error> {
    let root = match &options.list {
        Some(list) => {
            debug!(list = ?list, "Resolving list");
            let identity =
                resolve_identity(runner, context, &ObjectRoot::CurrentWeb, "Lists", list).await?;
            ObjectRoot::Identity(identity)
        }
        None => ObjectRoot::CurrentWeb,
    };

    debug!(field = ?options.field, "Resolving field");
    let field = resolve_identity(runner, context, &root, "Fields", &options.field).await?;

    let request = update_and_push_changes(
        &field,
        &options.properties,
        options.update_existing_lists,
    );
    runner.run_batch(context, &request).await?;

    info!(
        properties = options.properties.len(),
        update_existing_lists = options.update_existing_lists,
        "Field updated"
    );
    Ok(())
}

async fn resolve_identity(
    runner: &dyn BatchRunner,
    context: &ClientContext,
    root: &ObjectRoot,
    collection: &str,
    selector: &ObjectSelector,
) -> Result<String, Error> {
    let request = resolve_object(root, collection, selector);
    let results = runner.run_batch(context, &request).await?;
    let identity = results.require(RESOLVED_OBJECT)?.object_identity()?;
    Ok(identity.to_string())
}
