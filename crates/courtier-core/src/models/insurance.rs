use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::error::ApiError;
use crate::api::resource::Resource;

use super::validate::{Checker, Validate};

/// Digits allowed before the decimal point (12 total, 2 after)
const MAX_AMOUNT_INTEGER_DIGITS: usize = 10;
const MAX_AMOUNT_DECIMAL_PLACES: usize = 2;

/// An insurance policy held by a client through an agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Insurance {
    pub id: i64,
    pub insurance_type: String,
    /// Decimal amount as text, e.g. "1200.00"
    #[serde(deserialize_with = "decimal_text")]
    pub amount: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub start_date: NaiveDate,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub end_date: NaiveDate,
    pub client: i64,
    pub agency: i64,
    /// Read-only, filled in by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_full_name: Option<String>,
}

impl Insurance {
    /// Whether the policy covers `date` (start inclusive, end exclusive).
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date < self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct InsuranceForm {
    pub insurance_type: String,
    #[serde(deserialize_with = "decimal_text")]
    pub amount: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub start_date: NaiveDate,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub end_date: NaiveDate,
    pub client: i64,
    pub agency: i64,
}

impl Resource for Insurance {
    type Form = InsuranceForm;
    const ENDPOINT: &'static str = "/insurances";
}

impl Validate for InsuranceForm {
    fn validate(&self) -> Result<(), ApiError> {
        let mut check = Checker::new();
        check.required("insurance_type", &self.insurance_type);
        if !is_valid_amount(&self.amount) {
            check.fail("amount", "Montant invalide");
        }
        if self.end_date <= self.start_date {
            check.fail("end_date", "La date de fin doit être postérieure à la date de début");
        }
        check.positive_id("client", self.client);
        check.positive_id("agency", self.agency);
        check.finish()
    }
}

impl From<&Insurance> for InsuranceForm {
    fn from(insurance: &Insurance) -> Self {
        Self {
            insurance_type: insurance.insurance_type.clone(),
            amount: insurance.amount.clone(),
            start_date: insurance.start_date,
            end_date: insurance.end_date,
            client: insurance.client,
            agency: insurance.agency,
        }
    }
}

/// Non-negative decimal with at most 10 integer digits and 2 decimals.
fn is_valid_amount(amount: &str) -> bool {
    let amount = amount.trim();
    let (integer, fraction) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };
    !integer.is_empty()
        && integer.len() <= MAX_AMOUNT_INTEGER_DIGITS
        && fraction.len() <= MAX_AMOUNT_DECIMAL_PLACES
        && integer.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit())
        && !(amount.contains('.') && fraction.is_empty())
}

/// The server sends decimals as strings; older versions send numbers.
fn decimal_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DecimalRepr {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match DecimalRepr::deserialize(deserializer)? {
        DecimalRepr::Text(text) => text,
        DecimalRepr::Number(number) => number.to_string(),
    })
}
