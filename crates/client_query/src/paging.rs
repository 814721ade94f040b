//! # Paging
//!
//! Enumerates external users one page per round trip.
//!
//! Each page's request depends on the position the previous page reported, so pages are fetched
//! strictly one after another. A pager is single use: once it reaches [`PagingState::Done`] or
//! [`PagingState::Failed`] a fresh pager is needed to start over.

use std::sync::Arc;

use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, instrument, warn};

use crate::client::{BatchRunner, ClientContext};
use crate::models::{ExternalUser, ExternalUsersPage};
use crate::request::{
    Action, ClientQueryRequest, ObjectPath, ParameterValue, QuerySelection,
    OFFICE365_TENANT_TYPE_ID,
};
use crate::Error;

#[cfg(test)]
#[path = "paging_tests.rs"]
mod tests;

/// Logical name of the page result in a request built by [`ExternalUserQuery::to_request`].
pub const EXTERNAL_USERS_PAGE: &str = "page";

/// Default number of users per page.
pub const DEFAULT_PAGE_SIZE: i32 = 10;

/// Largest page the service accepts.
pub const MAX_PAGE_SIZE: i32 = 50;

/// Ordering applied by the server to the returned users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    fn value(self) -> i32 {
        match self {
            SortOrder::Ascending => 0,
            SortOrder::Descending => 1,
        }
    }
}

// Object path and action ids for each variant of the call.
struct QueryIds {
    tenant: u32,
    method: u32,
    object_path: u32,
    query: u32,
}

const TENANT_IDS: QueryIds = QueryIds {
    tenant: 105,
    method: 108,
    object_path: 109,
    query: 110,
};

const SITE_IDS: QueryIds = QueryIds {
    tenant: 131,
    method: 134,
    object_path: 135,
    query: 136,
};

/// Parameters of an external user enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalUserQuery {
    /// Restricts the results to users of one site collection
    pub site_url: Option<String>,
    /// Position of the first page to fetch
    pub position: i32,
    pub page_size: i32,
    /// Substring matched against the user's name or e-mail
    pub filter: Option<String>,
    pub sort_order: SortOrder,
}

impl Default for ExternalUserQuery {
    fn default() -> Self {
        Self {
            site_url: None,
            position: 0,
            page_size: DEFAULT_PAGE_SIZE,
            filter: None,
            sort_order: SortOrder::Ascending,
        }
    }
}

impl ExternalUserQuery {
    /// Builds the request for the page at `position`.
    pub fn to_request(&self, position: i32) -> ClientQueryRequest {
        let (ids, method, mut parameters) = match &self.site_url {
            Some(site_url) => (
                SITE_IDS,
                "GetExternalUsersForSite",
                vec![ParameterValue::string(site_url.as_str())],
            ),
            None => (TENANT_IDS, "GetExternalUsers", Vec::new()),
        };
        parameters.extend([
            ParameterValue::Int32(position),
            ParameterValue::Int32(self.page_size),
            ParameterValue::string(self.filter.as_deref().unwrap_or_default()),
            ParameterValue::Enum(self.sort_order.value()),
        ]);

        let mut request = ClientQueryRequest::new();
        request
            .add_action(Action::object_path(ids.object_path, ids.method))
            .add_named_action(
                EXTERNAL_USERS_PAGE,
                Action::query(ids.query, ids.method, external_users_selection()),
            )
            .add_object_path(ObjectPath::method(ids.method, ids.tenant, method, parameters))
            .add_object_path(ObjectPath::constructor(ids.tenant, OFFICE365_TENANT_TYPE_ID));
        request
    }
}

fn external_users_selection() -> QuerySelection {
    let user = QuerySelection::new()
        .scalar("DisplayName")
        .scalar("InvitedAs")
        .scalar("UniqueId")
        .scalar("AcceptedAs")
        .scalar("WhenCreated")
        .scalar("InvitedBy");

    QuerySelection::new()
        .scalar("TotalUserCount")
        .scalar("UserCollectionPosition")
        .object("ExternalUserCollection", QuerySelection::new(), Some(user))
}

/// Where a pager is in its enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingState {
    /// No page has been requested yet
    Start,
    /// The next call fetches the page at `position`
    FetchPage { position: i32 },
    /// The server reported that no further page exists
    Done,
    /// A round trip failed; the error was returned to the caller
    Failed,
}

/// Drives repeated batch round trips through all pages of an [`ExternalUserQuery`].
pub struct ExternalUserPager {
    runner: Arc<dyn BatchRunner>,
    context: ClientContext,
    query: ExternalUserQuery,
    state: PagingState,
}

impl ExternalUserPager {
    pub fn new(
        runner: Arc<dyn BatchRunner>,
        context: ClientContext,
        query: ExternalUserQuery,
    ) -> Self {
        Self {
            runner,
            context,
            query,
            state: PagingState::Start,
        }
    }

    pub fn state(&self) -> PagingState {
        self.state
    }

    /// Fetches the next page.
    ///
    /// Returns `Ok(None)` once the pager is in a terminal state.
    ///
    /// # Errors
    ///
    /// Any error of the round trip, after which the pager is [`PagingState::Failed`].
    /// A reported position that is not past the requested one fails with `Error::MalformedResponse`.
    #[instrument(skip(self), fields(state = ?self.state))]
    pub async fn next_page(&mut self) -> Result<Option<ExternalUsersPage>, Error> {
        let position = match self.state {
            PagingState::Start => self.query.position,
            PagingState::FetchPage { position } => position,
            PagingState::Done | PagingState::Failed => return Ok(None),
        };
        self.state = PagingState::FetchPage { position };

        match self.fetch(position).await {
            Ok((page, next)) => {
                self.state = next;
                Ok(Some(page))
            }
            Err(e) => {
                warn!(position = position, error = %e, "Fetching external users failed");
                self.state = PagingState::Failed;
                Err(e)
            }
        }
    }

    async fn fetch(&self, position: i32) -> Result<(ExternalUsersPage, PagingState), Error> {
        let request = self.query.to_request(position);
        let results = self.runner.run_batch(&self.context, &request).await?;
        let page = ExternalUsersPage::try_from(results.require(EXTERNAL_USERS_PAGE)?)?;

        debug!(
            position = position,
            users = page.users.len(),
            total = page.total_user_count,
            next = page.user_collection_position,
            "Fetched external users page"
        );

        // An empty page ends the enumeration even if the server reports a further position.
        if !page.has_more() || page.users.is_empty() {
            return Ok((page, PagingState::Done));
        }

        let next = i32::try_from(page.user_collection_position).map_err(|_| {
            Error::MalformedResponse(format!(
                "user collection position {} is out of range",
                page.user_collection_position
            ))
        })?;
        // Positions only move forward; anything else would revisit pages without end.
        if next <= position {
            return Err(Error::MalformedResponse(format!(
                "user collection position {} did not advance past {}",
                next, position
            )));
        }

        Ok((page, PagingState::FetchPage { position: next }))
    }

    /// Turns the pager into a lazy stream of users across all remaining pages.
    ///
    /// A page is only requested once the users of the previous one have been consumed.
    pub fn into_stream(self) -> impl Stream<Item = Result<ExternalUser, Error>> + Send {
        stream::try_unfold(self, |mut pager| async move {
            let page = pager.next_page().await?;
            Ok(page.map(|page| {
                let users = stream::iter(page.users.into_iter().map(Ok::<_, Error>));
                (users, pager)
            }))
        })
        .try_flatten()
    }
}
