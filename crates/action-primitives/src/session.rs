//! Browser session abstraction
//!
//! The session is an external collaborator: the core never launches or tears
//! it down, it receives a ready, authenticated session by reference and must
//! not retain it past the call that received it.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::{errors::ActionError, types::Query};

/// Live, non-owned reference into the remote document.
///
/// Any element is only trustworthy until the next DOM mutation; operations
/// on a detached element fail with [`ActionError::StaleElement`].
pub type Element = Arc<dyn DomElement>;

/// Page-level operations of a browser session
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load a URL in the current page
    async fn navigate(&self, url: &str) -> Result<(), ActionError>;

    /// Step one entry back in the page history
    async fn go_back(&self) -> Result<(), ActionError>;

    /// Current page URL
    async fn current_url(&self) -> Result<String, ActionError>;

    /// Current page title
    async fn title(&self) -> Result<String, ActionError>;

    /// All elements in the document matching `query`, in document order
    async fn find_all(&self, query: &Query) -> Result<Vec<Element>, ActionError>;

    /// First element in the document matching `query`
    async fn find(&self, query: &Query) -> Result<Option<Element>, ActionError> {
        Ok(self.find_all(query).await?.into_iter().next())
    }
}

/// Operations on a single live element
#[async_trait]
pub trait DomElement: Send + Sync + fmt::Debug {
    /// Short human-readable label used in logs
    fn describe(&self) -> String;

    /// Rendered text content, trimmed
    async fn text(&self) -> Result<String, ActionError>;

    async fn attribute(&self, name: &str) -> Result<Option<String>, ActionError>;

    async fn is_visible(&self) -> Result<bool, ActionError>;

    async fn is_enabled(&self) -> Result<bool, ActionError>;

    /// Native click; may be rejected when the element is occluded
    async fn click(&self) -> Result<(), ActionError>;

    /// Script-dispatched activation, bypassing hit testing
    async fn synthetic_click(&self) -> Result<(), ActionError>;

    async fn clear(&self) -> Result<(), ActionError>;

    async fn set_text(&self, value: &str) -> Result<(), ActionError>;

    async fn remove_attribute(&self, name: &str) -> Result<(), ActionError>;

    /// Descendants matching `query`, in document order
    async fn find_all(&self, query: &Query) -> Result<Vec<Element>, ActionError>;

    async fn find(&self, query: &Query) -> Result<Option<Element>, ActionError> {
        Ok(self.find_all(query).await?.into_iter().next())
    }
}

/// Scope of a lookup: the whole document or an element subtree
#[derive(Clone, Copy)]
pub enum SearchRoot<'a> {
    Document,
    Element(&'a Element),
}

impl<'a> SearchRoot<'a> {
    pub fn describe(&self) -> String {
        match self {
            SearchRoot::Document => "document".to_string(),
            SearchRoot::Element(element) => element.describe(),
        }
    }

    /// Run `query` against this root
    pub async fn find_all(
        &self,
        session: &dyn BrowserSession,
        query: &Query,
    ) -> Result<Vec<Element>, ActionError> {
        if query.is_empty() {
            return Err(ActionError::InvalidQuery(format!("empty query: {}", query)));
        }
        match self {
            SearchRoot::Document => session.find_all(query).await,
            SearchRoot::Element(element) => element.find_all(query).await,
        }
    }
}

impl fmt::Debug for SearchRoot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SearchRoot({})", self.describe())
    }
}
