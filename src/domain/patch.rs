//! Helpers for shallow-merge patch structs
//!
//! Patch fields are `Option<T>` (leave unchanged when `None`). Fields that are
//! optional on the target use `Option<Option<T>>` so a patch can distinguish
//! "leave alone" (field absent) from "clear" (`null`).

use serde::{Deserialize, Deserializer};

/// Deserializes a present field (including `null`) as `Some(..)`
///
/// Use together with `#[serde(default)]` so an absent field stays `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Overwrites `target` if the patch carries a value
pub fn merge<T>(target: &mut T, patch: Option<T>) {
    if let Some(value) = patch {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "double_option")]
        badge: Option<Option<String>>,
    }

    #[test]
    fn absent_field_is_none() {
        let s: Sample = serde_json::from_str("{}").unwrap();
        assert_eq!(s.badge, None);
    }

    #[test]
    fn null_field_clears() {
        let s: Sample = serde_json::from_str(r#"{"badge": null}"#).unwrap();
        assert_eq!(s.badge, Some(None));
    }

    #[test]
    fn value_field_sets() {
        let s: Sample = serde_json::from_str(r#"{"badge": "New"}"#).unwrap();
        assert_eq!(s.badge, Some(Some("New".to_string())));
    }

    #[test]
    fn merge_keeps_value_without_patch() {
        let mut title = "Old".to_string();
        merge(&mut title, None);
        assert_eq!(title, "Old");
        merge(&mut title, Some("New".to_string()));
        assert_eq!(title, "New");
    }
}
