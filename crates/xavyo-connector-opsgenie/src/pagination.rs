//! Translation between Opsgenie offset paging and opaque page tokens.
//!
//! Opsgenie pages with `limit`/`offset` query parameters and returns the
//! next page as a full URL in `paging.next`. Only the numeric offset is kept
//! in the token.

use tracing::warn;
use url::Url;
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::pagination::{Bag, PageState};

/// Decode a page token and extract the stored offset.
///
/// An empty bag gets `seed` pushed so first-page calls work like any other.
/// An offset that is not a number restarts from 0.
pub fn parse_page_token(token: &str, seed: PageState) -> ConnectorResult<(Bag, u32)> {
    let mut bag = Bag::unmarshal(token)?;
    if bag.current().is_none() {
        bag.push(seed);
    }

    let raw = bag.page_token();
    let offset = if raw.is_empty() {
        0
    } else {
        raw.parse::<u32>().unwrap_or_else(|e| {
            warn!(offset = raw, error = %e, "Unparsable page offset, restarting from 0");
            0
        })
    };

    Ok((bag, offset))
}

/// Advance the bag from the upstream `paging.next` link and encode it.
///
/// A missing or empty link, or one without an `offset` parameter, ends
/// pagination and yields the empty token.
pub fn handle_next_page(bag: &mut Bag, next_link: Option<&str>) -> ConnectorResult<String> {
    let Some(link) = next_link.filter(|l| !l.is_empty()) else {
        return bag.next_token("");
    };

    let url = Url::parse(link).map_err(|e| ConnectorError::MalformedContinuation {
        link: link.to_string(),
        message: e.to_string(),
    })?;

    let offset = url
        .query_pairs()
        .find(|(key, _)| key == "offset")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();

    bag.next_token(&offset)
}
