use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

pub mod cli_models;
pub mod flow;
pub mod inventory;
pub mod settings;
pub mod topology;

/// Name of the lab configuration file looked up in the current folder when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "odl-lab.json";

/// Restconf sometimes sends `null` where a list is expected, treat it the same as a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list whose items are read one by one. An item that does not fit `T` becomes `T::default()`
/// instead of failing the whole document, so the list always keeps the controller's length.
pub(crate) fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let items = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items.into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}
