use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// One row of the remote table: an owning identity and the sub-mapping of
/// keys it last supplied. A record with an empty mapping still counts: its
/// owner is visible, which is what keeps that owner's keys alive locally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub owner_id: String,
    pub value: BTreeMap<String, String>,
}

impl RemoteRecord {
    pub fn new(owner_id: impl Into<String>, value: BTreeMap<String, String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            value,
        }
    }

    /// Build a record from the raw wire shape. Whatever cannot be decoded is
    /// discarded, but the owner stays visible.
    pub fn from_wire(owner_id: impl Into<String>, raw: &Value) -> Self {
        let owner_id = owner_id.into();
        let value = decode_remote_value(raw);
        Self { owner_id, value }
    }
}

/// Decode the remote `value` column: either a JSON object directly or a JSON
/// string wrapping one. Arrays, scalars, unparsable strings and non-string
/// entries all decode to nothing rather than failing the whole fetch.
pub fn decode_remote_value(raw: &Value) -> BTreeMap<String, String> {
    let object = match raw {
        Value::Object(map) => Some(map.clone()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(err) => {
                warn!(%err, "unparsable remote value, treating as empty");
                None
            }
        },
        _ => None,
    };

    let Some(object) = object else {
        return BTreeMap::new();
    };

    object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            _ => None,
        })
        .collect()
}

/// Output of a reconciliation pass: the two parallel maps, kept in lockstep.
/// A key absent from `owners` is locally original.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub merged: BTreeMap<String, String>,
    pub owners: BTreeMap<String, String>,
}

/// Merge remote owner-tagged records into local state.
///
/// Local keys without a recorded owner always survive; they are this
/// device's own unsynced data. Local keys whose recorded owner still appears
/// remotely are refreshed from the remote value; keys whose owner vanished
/// from the fetch are dropped, since the vanished row means access to that
/// owner's data was revoked. Remote records fold in input order, last write
/// wins for both value and owner.
pub fn reconcile(
    remote: &[RemoteRecord],
    local_values: &BTreeMap<String, String>,
    local_owners: &BTreeMap<String, String>,
) -> Reconciled {
    let visible_owners: BTreeSet<&str> = remote.iter().map(|r| r.owner_id.as_str()).collect();

    let mut merged = BTreeMap::new();
    let mut owners = BTreeMap::new();

    for (key, value) in local_values {
        match local_owners.get(key) {
            // Locally original, never touched by reconciliation.
            None => {
                merged.insert(key.clone(), value.clone());
            }
            // Owner still visible: the remote fold below supplies the fresh
            // value, or drops the key if the owner stopped publishing it.
            Some(owner) if visible_owners.contains(owner.as_str()) => {}
            // Owner gone from the fetch: revoked.
            Some(owner) => {
                debug!(key = %key, owner = %owner, "dropping revoked key");
            }
        }
    }

    for record in remote {
        for (key, value) in &record.value {
            merged.insert(key.clone(), value.clone());
            owners.insert(key.clone(), record.owner_id.clone());
        }
    }

    debug!(
        records = remote.len(),
        keys = merged.len(),
        "reconciled remote records into local state"
    );
    Reconciled { merged, owners }
}

/// The subset of local entries the given user may write back: keys with no
/// recorded owner plus keys the user owns. Another owner's merged data never
/// leaves this device.
pub fn owned_subset(
    values: &BTreeMap<String, String>,
    owners: &BTreeMap<String, String>,
    user_id: &str,
) -> BTreeMap<String, String> {
    values
        .iter()
        .filter(|(key, _)| owners.get(*key).is_none_or(|owner| owner == user_id))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
