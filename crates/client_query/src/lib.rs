//! Batch client for the SharePoint "process query" protocol.
//!
//! A batch is an XML document declaring a graph of object paths and a list of actions against
//! them. The server executes the whole batch in one round trip and answers with a JSON array
//! holding a diagnostic record followed by one `(marker, value)` pair per result-producing action.
//!
//! ```rust,ignore
//! use client_query::objects::{resolve_object, ObjectRoot, ObjectSelector, RESOLVED_OBJECT};
//! use client_query::BatchRunner;
//!
//! let request = resolve_object(
//!     &ObjectRoot::CurrentWeb,
//!     "Fields",
//!     &ObjectSelector::InternalNameOrTitle("MyColumn".to_string()),
//! );
//! let results = client.run_batch(&context, &request).await?;
//! let identity = results.require(RESOLVED_OBJECT)?.object_identity()?;
//! ```

pub mod client;
pub mod date;
pub mod errors;
pub mod models;
pub mod objects;
pub mod paging;
pub mod providers;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{BatchRunner, ClientContext, ClientQueryClient, PROCESS_QUERY_PATH};
pub use errors::Error;
pub use models::{ClientObject, ExternalUser, ExternalUsersPage, ListSubscription};
pub use paging::{ExternalUserPager, ExternalUserQuery, PagingState, SortOrder};
pub use providers::{DigestProvider, TokenProvider};
pub use request::{Action, ClientQueryRequest, ObjectPath, ParameterValue, QuerySelection};
pub use response::{ActionResult, BatchResults, ResponseElement};
pub use transport::{HttpTransport, ReqwestTransport};
