//! Flattening the collector's aggregation into one ordered list.

use crate::error::MergeError;
use crate::inventory::EntityKind;
use crate::vars::{shape_of, Vars};
use serde::Deserialize;
use serde_json::Value;

/// Options for [`merge_vars`], all optional.
///
/// Derives `Deserialize` with per-field defaults so an options mapping
/// taken from a configuration document deserializes directly.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeOptions {
    /// Seed values placed at the front of the result. Must be a list.
    #[serde(default = "default_initial")]
    pub initial: Value,
    /// Append the key's ordinary resolved value, as one element, before the
    /// aggregated values.
    #[serde(default)]
    pub include_existing: bool,
    /// Include the host-kind aggregation.
    #[serde(default = "default_true")]
    pub host_vars: bool,
    /// Include the group-kind aggregation.
    #[serde(default = "default_true")]
    pub group_vars: bool,
}

fn default_initial() -> Value {
    Value::Array(Vec::new())
}

fn default_true() -> bool {
    true
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            initial: default_initial(),
            include_existing: false,
            host_vars: true,
            group_vars: true,
        }
    }
}

/// Assemble the ordered value list for one key from the aggregations the
/// collector published into `variables`.
///
/// `terms` carries the positional arguments of the lookup-style call and
/// must be exactly one string, the key. The result is ordered: the
/// `initial` seed, then the key's ordinary resolved value when
/// `include_existing` is set, then the host-kind aggregated values in
/// file-discovery order, then the group-kind ones. Nothing is deduplicated
/// or sorted, and nested structures are never flattened.
///
/// Fails with [`MergeError::InvalidArgument`] on a bad term shape and
/// [`MergeError::InvalidConfiguration`] when `initial` is not a list, in
/// both cases before any data is touched.
pub fn merge_vars(
    terms: &[Value],
    variables: &Vars,
    options: &MergeOptions,
) -> Result<Vec<Value>, MergeError> {
    let key = match terms {
        [Value::String(key)] => key.as_str(),
        [other] => {
            return Err(MergeError::InvalidArgument {
                reason: format!("the term is {}, not a string", shape_of(other)),
            })
        }
        [] => {
            return Err(MergeError::InvalidArgument { reason: "no term was given".to_string() })
        }
        _ => {
            return Err(MergeError::InvalidArgument {
                reason: format!("{} terms were given", terms.len()),
            })
        }
    };

    let mut result = match &options.initial {
        Value::Array(seed) => seed.clone(),
        other => {
            return Err(MergeError::InvalidConfiguration { got: shape_of(other).to_string() })
        }
    };

    if options.include_existing {
        // The whole resolved value is one element; collections are not
        // expanded. An explicit null counts as absent.
        if let Some(existing) = variables.get(key) {
            if !existing.is_null() {
                result.push(existing.clone());
            }
        }
    }

    for kind in EntityKind::ALL {
        let enabled = match kind {
            EntityKind::Host => options.host_vars,
            EntityKind::Group => options.group_vars,
        };
        if !enabled {
            continue;
        }
        let aggregated = variables
            .get(kind.merged_key())
            .and_then(Value::as_object)
            .and_then(|merged| merged.get(key));
        match aggregated {
            Some(Value::Array(values)) => result.extend(values.iter().cloned()),
            // The collector only publishes arrays; anything else was put
            // there by hand and is carried as a single opaque element.
            Some(other) => result.push(other.clone()),
            None => {}
        }
    }

    Ok(result)
}
