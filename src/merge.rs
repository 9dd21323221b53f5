//! Generic JSON deep merge.
//!
//! Builds minimal partial-update payloads: `patch` fields override or extend
//! `base` without discarding unrelated `base` fields. The wire format mixes
//! structured sub-objects (merge-friendly) with flat scalar leaves
//! (replace-only), and PATCH requests must not re-send server-only fields,
//! so the walk is driven by the fields present in `patch`.

use serde_json::Value;

/// Merge `patch` into `base` in place.
///
/// For every field present in `patch`:
/// - both sides hold an array: the base array is extended with any extra
///   trailing patch elements, then each overlapping element pair is merged
///   recursively;
/// - both sides hold an object: recurse;
/// - otherwise the patch value replaces the base value outright.
///
/// An empty `patch` object leaves `base` untouched.
pub fn merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_field(base_value, patch_value),
                    None => {
                        base_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

fn merge_field(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Array(base_items), Value::Array(patch_items)) => {
            for (i, patch_item) in patch_items.iter().enumerate() {
                match base_items.get_mut(i) {
                    Some(base_item) => merge_field(base_item, patch_item),
                    None => base_items.push(patch_item.clone()),
                }
            }
        }
        (base @ Value::Object(_), patch @ Value::Object(_)) => merge(base, patch),
        (base, patch) => *base = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_patch_is_identity() {
        let mut base = json!({"a": 1, "b": {"c": [1, 2]}});
        let expected = base.clone();
        merge(&mut base, &json!({}));
        assert_eq!(base, expected);
    }

    #[test]
    fn test_scalar_replacement() {
        let mut base = json!({"a": 1, "b": "x"});
        merge(&mut base, &json!({"b": "y"}));
        assert_eq!(base, json!({"a": 1, "b": "y"}));
    }

    #[test]
    fn test_object_recursion_keeps_unrelated_fields() {
        let mut base = json!({"name": {"givenName": "A", "familyName": "B"}});
        merge(&mut base, &json!({"name": {"givenName": "Z"}}));
        assert_eq!(base, json!({"name": {"givenName": "Z", "familyName": "B"}}));
    }

    #[test]
    fn test_array_extension_loses_no_element() {
        let mut base = json!({"a": [{"x": 1}]});
        merge(&mut base, &json!({"a": [{"x": 1}, {"y": 2}]}));
        assert_eq!(base, json!({"a": [{"x": 1}, {"y": 2}]}));
    }

    #[test]
    fn test_array_element_pairs_merge_recursively() {
        let mut base = json!({"a": [{"x": 1, "keep": true}]});
        merge(&mut base, &json!({"a": [{"x": 2}]}));
        assert_eq!(base, json!({"a": [{"x": 2, "keep": true}]}));
    }

    #[test]
    fn test_scalar_array_replaced_when_base_not_array() {
        let mut base = json!({"a": "scalar"});
        merge(&mut base, &json!({"a": [1, 2, 3]}));
        assert_eq!(base, json!({"a": [1, 2, 3]}));
    }

    #[test]
    fn test_new_fields_are_added() {
        let mut base = json!({"userName": "u1"});
        merge(&mut base, &json!({"urn:x:extension": {"attr": "v"}}));
        assert_eq!(
            base,
            json!({"userName": "u1", "urn:x:extension": {"attr": "v"}})
        );
    }
}
