//! Capability traits a model opts into.
//!
//! Each capability is a default method over the model's endpoint and its
//! shared connection; `impl FindById for Contact {}` is enough to enable it.

use crate::model::{Attributes, Entity};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use teamleader_client::{Connection, Params};
use teamleader_types::{Result, TeamleaderError};

/// `GET {endpoint}.info?id=..`
#[async_trait]
pub trait FindById: Entity {
    /// # Errors
    ///
    /// Returns the connection's classified error.
    async fn find(connection: Arc<Connection>, id: &str) -> Result<Self> {
        let mut params = Params::new();
        params.insert("id".to_string(), Value::String(id.to_string()));
        let response = connection.get(&Self::endpoint("info"), params).await?;
        Ok(Self::from_response(connection, response))
    }
}

/// `GET {endpoint}.list`, following every page.
#[async_trait]
pub trait FindAll: Entity {
    /// # Errors
    ///
    /// Returns the connection's classified error; no partial list is returned.
    async fn all(connection: Arc<Connection>, params: Params) -> Result<Vec<Self>> {
        let response = connection.get_all(&Self::endpoint("list"), params).await?;
        let records = match response {
            Value::Object(mut body) => match body.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(records
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(attributes) => {
                    Some(Self::from_attributes(Arc::clone(&connection), attributes))
                }
                _ => None,
            })
            .collect())
    }
}

/// `POST {endpoint}.add` for new records, `POST {endpoint}.update` otherwise.
#[async_trait]
pub trait Storable: Entity {
    /// Persist the fillable attributes. A newly added record takes the id the
    /// API assigns.
    ///
    /// # Errors
    ///
    /// Returns the connection's classified error.
    async fn save(&mut self) -> Result<()> {
        let body = Value::Object(fillable_attributes(&*self));
        if self.id().is_some() {
            self.connection()
                .post(&Self::endpoint("update"), &body)
                .await?;
            return Ok(());
        }

        let response = self.connection().post(&Self::endpoint("add"), &body).await?;
        if let Some(id) = response.pointer("/data/id").cloned() {
            self.attributes_mut().insert("id".to_string(), id);
        }
        Ok(())
    }
}

/// `POST {endpoint}.delete`
#[async_trait]
pub trait Deletable: Entity {
    /// # Errors
    ///
    /// Returns [`TeamleaderError::Api`] when the record has never been saved,
    /// otherwise the connection's classified error.
    async fn delete(self) -> Result<()> {
        let id = require_id(&self, "delete")?;
        self.connection()
            .post(&Self::endpoint("delete"), &json!({ "id": id }))
            .await?;
        Ok(())
    }
}

/// The record's id, or an error naming the action that needed it.
pub(crate) fn require_id<E: Entity>(entity: &E, action: &str) -> Result<String> {
    entity.id().map(str::to_string).ok_or_else(|| {
        TeamleaderError::api(format!(
            "cannot {action} a {} record without an id",
            E::ENDPOINT
        ))
    })
}

/// Attributes for a request body: the record's fillable keys only.
#[must_use]
pub fn fillable_attributes<E: Entity>(entity: &E) -> Attributes {
    entity
        .attributes()
        .iter()
        .filter(|(key, _)| E::FILLABLE.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
