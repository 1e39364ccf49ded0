//! Follower count for a profile page.

use serde_json::{Map, Value};

use crate::count::{count_from_value, CountScale};
use crate::dom::followers_from_text;
use crate::graph::value_at;
use crate::page::PageSnapshot;
use crate::state::{default_scope, user_module, StateProbe};

/// Which source produced a follower count, as recorded in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowersSource {
    UserModule,
    UserDetail,
    PageText,
}

impl FollowersSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FollowersSource::UserModule => "userModule",
            FollowersSource::UserDetail => "userDetail",
            FollowersSource::PageText => "pageText",
        }
    }
}

fn object_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

fn first_non_null<'a>(candidates: impl IntoIterator<Item = Option<&'a Value>>) -> Option<&'a Value> {
    candidates.into_iter().flatten().find(|v| !v.is_null())
}

/// Reads the follower count of the first user in a `UserModule`.
///
/// The user's stats entry is found by cross-referencing its id in the
/// module's `stats` map, else the first entry there is used.
#[must_use]
pub fn followers_from_user_module(module: &Map<String, Value>) -> Option<u64> {
    let users = object_field(module, "users");
    let stats = object_field(module, "stats");

    let (user_key, user) = users
        .and_then(|u| u.iter().next())
        .map_or((None, None), |(k, v)| (Some(k.as_str()), Some(v)));

    let user_id = user
        .and_then(|u| first_non_null([u.get("id"), u.get("uid"), u.get("uniqueId")]))
        .and_then(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .or_else(|| {
            user_key
                .filter(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()))
                .map(str::to_string)
        });

    let stat_entry = stats.and_then(|s| {
        user_id
            .as_deref()
            .and_then(|id| s.get(id))
            .or_else(|| s.values().next())
    });

    let raw = first_non_null([
        stat_entry.and_then(|s| s.get("followerCount")),
        user.and_then(|u| value_at(u, &["stats", "followerCount"])),
        user.and_then(|u| value_at(u, &["stats", "followers"])),
    ])?;
    count_from_value(raw, CountScale::Listing)
}

fn followers_from_user_detail(data: &Value) -> Option<u64> {
    let scope = default_scope(data)?;
    let raw = value_at(
        scope,
        &["webapp.user-detail", "userInfo", "stats", "followerCount"],
    )?;
    count_from_value(raw, CountScale::Listing)
}

/// State first (each schema in priority order), then visible page text.
#[must_use]
pub fn extract_followers(
    probe: &StateProbe,
    page: &PageSnapshot,
) -> Option<(u64, FollowersSource)> {
    for (schema, data) in probe.iter() {
        if let Some(n) = user_module(schema, data).and_then(followers_from_user_module) {
            return Some((n, FollowersSource::UserModule));
        }
        if let Some(n) = followers_from_user_detail(data) {
            return Some((n, FollowersSource::UserDetail));
        }
    }
    followers_from_text(page.body_text()).map(|n| (n, FollowersSource::PageText))
}
