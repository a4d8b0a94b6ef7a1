//! Translation keys used by a text-component tree.
//!
//! Web clients have no access to the game's language files, so every chat
//! message can ship the localized strings its translatable segments need.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::identity::ClientContext;

/// Collect every translation key referenced by `component`.
///
/// A translatable segment is an object with a string `translate` field. Its
/// `with` arguments are walked too; plain string arguments are kept as
/// potential keys. `extra` siblings are walked regardless of the segment type.
pub fn collect_translation_keys(component: &Value) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    collect_into(component, &mut keys);
    keys
}

fn collect_into(component: &Value, keys: &mut BTreeSet<String>) {
    match component {
        Value::Object(obj) => {
            if let Some(Value::String(key)) = obj.get("translate") {
                keys.insert(key.clone());

                if let Some(Value::Array(args)) = obj.get("with") {
                    for arg in args {
                        match arg {
                            Value::String(s) => {
                                keys.insert(s.clone());
                            }
                            other => collect_into(other, keys),
                        }
                    }
                }
            }

            if let Some(Value::Array(siblings)) = obj.get("extra") {
                for sibling in siblings {
                    collect_into(sibling, keys);
                }
            }
        }
        // A bare array is a component list: first element plus siblings.
        Value::Array(parts) => {
            for part in parts {
                collect_into(part, keys);
            }
        }
        _ => {}
    }
}

/// Map every key used by `component` to its localized string, falling back
/// to the key itself when the client has no translation.
pub fn extract_translations<C: ClientContext + ?Sized>(
    component: &Value,
    ctx: &C,
) -> BTreeMap<String, String> {
    collect_translation_keys(component)
        .into_iter()
        .map(|key| {
            let value = ctx.translate(&key).unwrap_or_else(|| key.clone());
            (key, value)
        })
        .collect()
}
