use crate::actions::{Deletable, FindAll, FindById, Storable, require_id};
use crate::model::{Attributes, Entity};
use serde_json::{Value, json};
use std::sync::Arc;
use teamleader_client::Connection;
use teamleader_types::Result;

/// A person in the CRM.
pub struct Contact {
    connection: Arc<Connection>,
    attributes: Attributes,
}

impl Entity for Contact {
    const ENDPOINT: &'static str = "contacts";
    const FILLABLE: &'static [&'static str] = &[
        "id",
        "first_name",
        "last_name",
        "salutation",
        "emails",
        "telephones",
        "website",
        "addresses",
        "language",
        "gender",
        "birthdate",
        "iban",
        "bic",
        "remarks",
        "tags",
        "custom_fields",
        "marketing_mails_consent",
    ];

    fn from_attributes(connection: Arc<Connection>, attributes: Attributes) -> Self {
        Self {
            connection,
            attributes,
        }
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}

impl FindById for Contact {}
impl FindAll for Contact {}
impl Storable for Contact {}
impl Deletable for Contact {}

impl Contact {
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.attributes.get("first_name").and_then(Value::as_str)
    }

    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.attributes.get("last_name").and_then(Value::as_str)
    }

    /// `POST contacts.linkToCompany` for this contact.
    ///
    /// # Errors
    ///
    /// Fails without a request when the contact has no id; otherwise returns
    /// the connection's classified error.
    pub async fn link_to_company(
        &self,
        company_id: &str,
        position: Option<&str>,
        decision_maker: bool,
    ) -> Result<Value> {
        let id = require_id(self, "link")?;
        let body = json!({
            "id": id,
            "company_id": company_id,
            "position": position.unwrap_or_default(),
            "decision_maker": decision_maker,
        });
        self.connection
            .post(&Self::endpoint("linkToCompany"), &body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::connection;
    use teamleader_types::TeamleaderError;

    #[tokio::test]
    async fn test_set_only_accepts_fillable_keys() {
        let (conn, _) = connection().await;
        let mut contact = Contact::new(conn);
        assert!(contact.set("first_name", "Ada"));
        assert!(!contact.set("added_at", "2024-01-01"));
        assert_eq!(contact.first_name(), Some("Ada"));
        assert!(contact.get("added_at").is_none());
    }

    #[tokio::test]
    async fn test_fill_skips_unknown_keys() {
        let (conn, _) = connection().await;
        let mut contact = Contact::new(conn);
        let attrs = json!({"first_name": "Ada", "last_name": "Byron", "status": "x"});
        contact.fill(attrs.as_object().cloned().unwrap());
        assert_eq!(contact.last_name(), Some("Byron"));
        assert_eq!(contact.attributes().len(), 2);
    }

    #[tokio::test]
    async fn test_link_to_company() {
        let (conn, transport) = connection().await;
        transport.push_text(204, "");

        let mut contact = Contact::new(conn);
        contact.set("id", "c-1");
        let result = contact
            .link_to_company("co-1", Some("CEO"), true)
            .await
            .unwrap();
        assert_eq!(result, Value::Null);

        let req = &transport.requests()[0];
        assert_eq!(req.url, "https://api.example/contacts.linkToCompany");
        let sent: Value = serde_json::from_str(&req.body_text()).unwrap();
        assert_eq!(
            sent,
            json!({"id": "c-1", "company_id": "co-1", "position": "CEO", "decision_maker": true})
        );
    }

    #[tokio::test]
    async fn test_link_without_id_fails_locally() {
        let (conn, transport) = connection().await;
        let err = Contact::new(conn)
            .link_to_company("co-1", None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, TeamleaderError::Api { status: None, .. }));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_from_response_without_data_is_empty() {
        let (conn, _) = connection().await;
        let contact = Contact::from_response(conn, json!({"meta": {}}));
        assert!(contact.attributes().is_empty());
        assert!(contact.id().is_none());
    }
}
