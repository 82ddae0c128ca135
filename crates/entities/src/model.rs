use serde_json::{Map, Value};
use std::sync::Arc;
use teamleader_client::Connection;

/// Attribute map of a record, in API field order.
pub type Attributes = Map<String, Value>;

/// A record type exposed by the API.
///
/// Implementors only provide storage; every helper here works on the
/// attribute map and the constants.
pub trait Entity: Sized + Send + Sync {
    /// Endpoint prefix, e.g. `contacts` for `contacts.list`.
    const ENDPOINT: &'static str;
    /// Keys a caller may assign through [`Entity::set`] and [`Entity::fill`].
    const FILLABLE: &'static [&'static str];

    /// Build a model from attributes as returned by the API, unfiltered.
    fn from_attributes(connection: Arc<Connection>, attributes: Attributes) -> Self;
    fn connection(&self) -> &Arc<Connection>;
    fn attributes(&self) -> &Attributes;
    fn attributes_mut(&mut self) -> &mut Attributes;

    /// An empty, unsaved record.
    fn new(connection: Arc<Connection>) -> Self {
        Self::from_attributes(connection, Attributes::new())
    }

    /// Build a model from the `data` object of an API response.
    fn from_response(connection: Arc<Connection>, response: Value) -> Self {
        let attributes = match response {
            Value::Object(mut body) => match body.remove("data") {
                Some(Value::Object(data)) => data,
                _ => Attributes::new(),
            },
            _ => Attributes::new(),
        };
        Self::from_attributes(connection, attributes)
    }

    /// `{endpoint}.{action}`
    #[must_use]
    fn endpoint(action: &str) -> String {
        format!("{}.{action}", Self::ENDPOINT)
    }

    fn id(&self) -> Option<&str> {
        self.attributes().get("id").and_then(Value::as_str)
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.attributes().get(key)
    }

    /// Assign `key` if it is fillable. Returns whether it was assigned.
    fn set(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if !Self::FILLABLE.contains(&key) {
            tracing::debug!(endpoint = Self::ENDPOINT, key, "ignoring non-fillable attribute");
            return false;
        }
        self.attributes_mut().insert(key.to_string(), value.into());
        true
    }

    /// Assign every fillable key of `attributes`, skipping the rest.
    fn fill(&mut self, attributes: Attributes) {
        for (key, value) in attributes {
            self.set(&key, value);
        }
    }
}
