//! Opaque, stack-based pagination state.
//!
//! A [`Bag`] is a stack of [`PageState`] frames. The host only ever sees the
//! encoded form: versioned JSON, base64url without padding. A bag without an
//! active frame encodes to the empty string, which the host reads as "no more
//! pages".

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;
use crate::error::{ConnectorError, ConnectorResult};

const BAG_VERSION: u32 = 1;

/// Page token handed to a syncer by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageToken {
    /// Opaque token returned by the previous call, empty on the first call.
    pub token: String,
    /// Requested page size; 0 lets the connector choose.
    pub size: u32,
}

impl PageToken {
    /// Token for the first page.
    pub fn first() -> Self {
        Self::default()
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            size: 0,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn is_first(&self) -> bool {
        self.token.is_empty()
    }
}

/// One page of results plus the token for the next call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Empty when the listing is exhausted.
    pub next_page_token: String,
    pub annotations: Annotations,
}

impl<T> Page<T> {
    /// A final page: no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: String::new(),
            annotations: Annotations::new(),
        }
    }

    /// A page with a continuation token (which may be empty).
    pub fn with_next(items: Vec<T>, next_page_token: String) -> Self {
        Self {
            items,
            next_page_token,
            annotations: Annotations::new(),
        }
    }

    /// An empty, final page.
    pub fn empty() -> Self {
        Self::last(Vec::new())
    }

    pub fn has_more(&self) -> bool {
        !self.next_page_token.is_empty()
    }
}

/// A single pagination frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub resource_type_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl PageState {
    pub fn new(resource_type_id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type_id: resource_type_id.into(),
            resource_id: resource_id.into(),
            token: String::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct EncodedBag {
    version: u32,
    #[serde(default)]
    states: Vec<PageState>,
    current: Option<PageState>,
}

/// Stack of pagination frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bag {
    states: Vec<PageState>,
    current: Option<PageState>,
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a bag from its opaque form. The empty string is an empty bag.
    pub fn unmarshal(token: &str) -> ConnectorResult<Self> {
        if token.is_empty() {
            return Ok(Self::new());
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| ConnectorError::invalid_page_token(format!("not base64url: {e}")))?;

        let encoded: EncodedBag = serde_json::from_slice(&bytes)
            .map_err(|e| ConnectorError::invalid_page_token(format!("not a page state: {e}")))?;

        if encoded.version != BAG_VERSION {
            return Err(ConnectorError::invalid_page_token(format!(
                "unsupported page state version {} (expected {BAG_VERSION})",
                encoded.version
            )));
        }

        Ok(Self {
            states: encoded.states,
            current: encoded.current,
        })
    }

    /// Encode the bag. A bag without an active frame encodes to "".
    pub fn marshal(&self) -> ConnectorResult<String> {
        if self.current.is_none() {
            return Ok(String::new());
        }

        let encoded = EncodedBag {
            version: BAG_VERSION,
            states: self.states.clone(),
            current: self.current.clone(),
        };
        let json = serde_json::to_vec(&encoded)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Push a frame, making it the active one.
    pub fn push(&mut self, state: PageState) {
        if let Some(current) = self.current.take() {
            self.states.push(current);
        }
        self.current = Some(state);
    }

    /// Pop the active frame; its parent becomes active.
    pub fn pop(&mut self) -> Option<PageState> {
        let popped = self.current.take();
        self.current = self.states.pop();
        popped
    }

    /// The active frame.
    pub fn current(&self) -> Option<&PageState> {
        self.current.as_ref()
    }

    /// Token of the active frame, "" when there is none.
    pub fn page_token(&self) -> &str {
        self.current.as_ref().map_or("", |s| s.token.as_str())
    }

    /// Advance the active frame and encode the result.
    ///
    /// An empty `next` pops the active frame; otherwise it becomes the active
    /// frame's token.
    pub fn next_token(&mut self, next: &str) -> ConnectorResult<String> {
        let Some(current) = self.current.as_mut() else {
            return Err(ConnectorError::internal("no active page state to advance"));
        };

        if next.is_empty() {
            self.pop();
        } else {
            current.token = next.to_string();
        }

        self.marshal()
    }

    /// Number of frames, active one included.
    pub fn depth(&self) -> usize {
        self.states.len() + usize::from(self.current.is_some())
    }
}
