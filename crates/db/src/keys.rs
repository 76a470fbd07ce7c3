//! Storage key layout.
//!
//! ```text
//! user:{userId}:queries:{id}
//! user:{userId}:dashboard:widgets:{id}
//! ```
//!
//! Key segments are escaped so that a user id containing `:` cannot reach
//! into another user's namespace.

use fetchboard_core::identity::Identity;

const QUERIES: &str = "queries";
const WIDGETS: &str = "dashboard:widgets";

/// Escape `%` and `:` in a key segment.
fn segment(raw: &str) -> String {
    raw.replace('%', "%25").replace(':', "%3A")
}

fn prefix(identity: &Identity, collection: &str) -> String {
    format!("user:{}:{collection}:", segment(&identity.user_id))
}

/// Prefix covering all of a user's queries.
pub fn queries_prefix(identity: &Identity) -> String {
    prefix(identity, QUERIES)
}

pub fn query_key(identity: &Identity, id: &str) -> String {
    format!("{}{}", queries_prefix(identity), segment(id))
}

/// Prefix covering all of a user's dashboard widgets.
pub fn widgets_prefix(identity: &Identity) -> String {
    prefix(identity, WIDGETS)
}

pub fn widget_key(identity: &Identity, id: &str) -> String {
    format!("{}{}", widgets_prefix(identity), segment(id))
}
