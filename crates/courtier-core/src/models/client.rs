use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::resource::Resource;

use super::validate::{Checker, Validate};

/// A customer of the brokerage, attached to one agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Client {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
    pub agency: i64,
    /// Read-only, filled in by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
}

impl Client {
    /// "Last First", the way the back office lists people.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ClientForm {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
    pub agency: i64,
}

impl Resource for Client {
    type Form = ClientForm;
    const ENDPOINT: &'static str = "/clients";
}

impl Validate for ClientForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut check = Checker::new();
        check.required("first_name", &self.first_name);
        check.required("last_name", &self.last_name);
        check.required("phone", &self.phone);
        check.email("email", &self.email);
        check.positive_id("agency", self.agency);
        check.finish()
    }
}

impl From<&Client> for ClientForm {
    fn from(client: &Client) -> Self {
        Self {
            first_name: client.first_name.clone(),
            last_name: client.last_name.clone(),
            phone: client.phone.clone(),
            email: client.email.clone(),
            agency: client.agency,
        }
    }
}
