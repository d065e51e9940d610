use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::resource::Resource;

use super::validate::{Checker, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Agency {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub city: String,
}

/// Fields sent when creating or updating an agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AgencyForm {
    pub name: String,
    pub city: String,
}

impl Resource for Agency {
    type Form = AgencyForm;
    const ENDPOINT: &'static str = "/agencies";
}

impl Validate for AgencyForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut check = Checker::new();
        check.required("name", &self.name);
        check.required("city", &self.city);
        check.finish()
    }
}

impl From<&Agency> for AgencyForm {
    fn from(agency: &Agency) -> Self {
        Self {
            name: agency.name.clone(),
            city: agency.city.clone(),
        }
    }
}
