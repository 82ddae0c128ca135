use crate::actions::{Deletable, FindAll, FindById, Storable};
use crate::model::{Attributes, Entity};
use serde_json::Value;
use std::sync::Arc;
use teamleader_client::Connection;

/// An organisation in the CRM.
pub struct Company {
    connection: Arc<Connection>,
    attributes: Attributes,
}

impl Entity for Company {
    const ENDPOINT: &'static str = "companies";
    const FILLABLE: &'static [&'static str] = &[
        "id",
        "name",
        "business_type_id",
        "vat_number",
        "national_identification_number",
        "emails",
        "telephones",
        "website",
        "addresses",
        "iban",
        "bic",
        "language",
        "responsible_user_id",
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

impl FindById for Company {}
impl FindAll for Company {}
impl Storable for Company {}
impl Deletable for Company {}

impl Company {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }
}
