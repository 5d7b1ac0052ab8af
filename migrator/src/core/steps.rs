//! Historical migration steps, one per structural change of the state shape.
//!
//! Every step is total. Old data may lack a field or hold the wrong type, so a
//! step defaults what it cannot read instead of failing the chain.

use serde_json::{Value, json};

use super::types::State;

/// Granular services superseded by the master service list in v2.
const LEGACY_SERVICE_IDS: [&str; 6] = [
    "s-print-1",
    "s-print-2",
    "s-av-1",
    "s-av-2",
    "s-ent-1",
    "s-ent-2",
];

/// User ids that belonged to the administrator account before v4.
const ADMIN_USER_IDS: [&str; 2] = ["u1", "u_admin"];

/// v2: drop services replaced by the master service list.
///
/// A missing or non-list `services` becomes an empty list.
pub fn remove_legacy_services(mut state: State) -> State {
    match state.get_mut("services") {
        Some(Value::Array(services)) => services.retain(|service| !is_legacy_service(service)),
        _ => {
            state.insert("services".to_string(), Value::Array(Vec::new()));
        }
    }
    state
}

fn is_legacy_service(service: &Value) -> bool {
    service
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| LEGACY_SERVICE_IDS.contains(&id))
}

/// v3: move permissions from each user to a top-level `roles` table.
///
/// An existing `roles` value is kept.
pub fn introduce_roles(mut state: State) -> State {
    if !state.get("roles").is_some_and(is_truthy) {
        state.insert("roles".to_string(), default_roles());
    }
    if let Some(Value::Array(users)) = state.get_mut("users") {
        for user in users {
            if let Value::Object(fields) = user {
                fields.shift_remove("permissions");
            }
        }
    }
    state
}

fn default_roles() -> Value {
    json!({
        "Admin": {
            "canCreateEvents": true,
            "canManageServices": true,
            "canViewFinancials": true,
            "canManageUsers": true,
            "canManageRFQs": true,
        },
        "Sales": {
            "canCreateEvents": true,
            "canManageServices": false,
            "canViewFinancials": false,
            "canManageUsers": false,
            "canManageRFQs": true,
        },
        "Operations": {
            "canCreateEvents": false,
            "canManageServices": true,
            "canViewFinancials": true,
            "canManageUsers": false,
            "canManageRFQs": false,
        },
    })
}

/// v4: normalize the display name of legacy admin accounts.
pub fn rename_admin_users(mut state: State) -> State {
    if let Some(Value::Array(users)) = state.get_mut("users") {
        for user in users {
            let Value::Object(fields) = user else {
                continue;
            };
            let is_admin = fields
                .get("userId")
                .and_then(Value::as_str)
                .is_some_and(|id| ADMIN_USER_IDS.contains(&id));
            if is_admin {
                fields.insert("name".to_string(), Value::from("System Admin"));
            }
        }
    }
    state
}

/// v5: replace the user list with the two seed accounts.
pub fn reset_users(mut state: State) -> State {
    state.insert(
        "users".to_string(),
        json!([
            {
                "userId": "u_admin",
                "name": "System Admin",
                "role": "Admin",
                "commissionRate": 0,
            },
            {
                "userId": "u_sales",
                "name": "Sales Representative",
                "role": "Sales",
                "commissionRate": 15,
            },
        ]),
    );
    state.insert("currentUserId".to_string(), Value::from("u_sales"));
    state
}

/// v8: every event carries a `tasks` list.
pub fn default_event_tasks(state: State) -> State {
    default_list_field(state, "events", "tasks")
}

/// v9: every RFQ carries an `items` list.
pub fn default_rfq_items(state: State) -> State {
    default_list_field(state, "rfqs", "items")
}

/// Ensure each object in `state[collection]` has a truthy `field`, defaulting
/// to an empty list.
///
/// A falsy or absent collection becomes an empty list. A truthy non-list
/// collection is left as is.
fn default_list_field(mut state: State, collection: &str, field: &str) -> State {
    if !state.get(collection).is_some_and(is_truthy) {
        state.insert(collection.to_string(), Value::Array(Vec::new()));
    }
    if let Some(Value::Array(items)) = state.get_mut(collection) {
        for item in items {
            if let Value::Object(fields) = item
                && !fields.get(field).is_some_and(is_truthy)
            {
                fields.insert(field.to_string(), Value::Array(Vec::new()));
            }
        }
    }
    state
}

/// Truthiness of persisted values: `null`, `false`, `0` and `""` count as unset.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
