//! Default-state template merge applied after migration.
//!
//! Migration steps only populate the fields they touch. Anything the current
//! schema expects but old data never had is filled from a template.

use serde_json::Value;

use super::types::State;

/// Fill fields absent from `state` with the template's value.
///
/// Objects present on both sides merge recursively. Any other value already in
/// `state` wins, including `null`.
pub fn merge_defaults(mut state: State, template: &State) -> State {
    merge_into(&mut state, template);
    state
}

fn merge_into(target: &mut State, template: &State) {
    for (key, default) in template {
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), default.clone());
            }
            Some(Value::Object(existing)) => {
                if let Value::Object(nested) = default {
                    merge_into(existing, nested);
                }
            }
            Some(_) => {}
        }
    }
}
