use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of applicant slots printed on the booking form.
pub const MAX_APPLICANTS: usize = 3;

/// Opaque reference to a stored photograph or signature (data URI or storage key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Residential status options printed as a checkbox group.
///
/// Stored values are the option captions and are matched by exact string equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResidentialStatus {
    Resident,
    NonResident,
    ForeignNationalOfIndianOrigin,
}

impl ResidentialStatus {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::Resident,
            Self::NonResident,
            Self::ForeignNationalOfIndianOrigin,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Resident => "Resident",
            Self::NonResident => "Non-Resident",
            Self::ForeignNationalOfIndianOrigin => "Foreign National of Indian Origin",
        }
    }

    /// Exact match against the stored caption; anything else leaves every box unchecked.
    pub fn from_stored(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == value)
    }
}

/// Apartment configuration offered on the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "3bhk")]
    ThreeBhk,
    #[serde(rename = "4bhk")]
    FourBhk,
}

impl UnitType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ThreeBhk => "3 BHK",
            Self::FourBhk => "4 BHK",
        }
    }

    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::ThreeBhk => "3bhk",
            Self::FourBhk => "4bhk",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "3bhk" => Some(Self::ThreeBhk),
            "4bhk" => Some(Self::FourBhk),
            _ => None,
        }
    }

    /// Display string for an optional unit type; unset renders empty.
    pub fn display(unit_type: Option<Self>) -> &'static str {
        unit_type.map(Self::label).unwrap_or("")
    }
}

/// One applicant's form data as collected by the booking front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicantRecord {
    pub title: String,
    pub name: String,
    pub relation: String,
    pub nationality: String,
    pub age: String,
    pub date_of_birth: String,
    pub profession: String,
    pub national_id: String,
    pub residential_status: String,
    pub tax_id: String,
    pub tax_ward: String,
    pub address: String,
    pub phone: String,
    pub mobile: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photograph: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<ImageRef>,
}

impl ApplicantRecord {
    /// Any non-empty name, whitespace included, puts the applicant on the form.
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Title and name as printed in the first applicant row.
    pub fn display_name(&self) -> String {
        let title = self.title.trim();
        let name = self.name.trim();
        match (title.is_empty(), name.is_empty()) {
            (true, _) => name.to_string(),
            (false, true) => title.to_string(),
            (false, false) => format!("{title} {name}"),
        }
    }

    pub fn residential_status(&self) -> Option<ResidentialStatus> {
        ResidentialStatus::from_stored(&self.residential_status)
    }
}

/// Apartment, pricing and declaration block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationRecord {
    pub tower: String,
    pub apartment_number: String,
    #[serde(
        deserialize_with = "deserialize_unit_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit_type: Option<UnitType>,
    pub floor: String,
    pub carpet_area_sq_meter: String,
    pub carpet_area_sq_feet: String,
    pub unit_price: String,
    pub total_price: String,
    pub declaration_date: String,
    pub declaration_place: String,
}

/// Top-level aggregate rendered by the layout compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDataset {
    pub applicants: Vec<ApplicantRecord>,
    pub application: ApplicationRecord,
    #[serde(deserialize_with = "deserialize_count_hint")]
    pub applicant_count: u8,
}

impl FormDataset {
    /// Applicant at `index`, if one was supplied.
    pub fn applicant(&self, index: usize) -> Option<&ApplicantRecord> {
        self.applicants.get(index)
    }

    /// Number of slots that will actually render: the primary slot plus named joint slots.
    pub fn active_applicant_count(&self) -> usize {
        let joint = self
            .applicants
            .iter()
            .take(MAX_APPLICANTS)
            .skip(1)
            .filter(|applicant| applicant.has_name())
            .count();
        1 + joint
    }

    /// Compare the stored count hint with name presence. Name presence always wins.
    pub fn reconcile_applicant_count(&self) -> ApplicantCountReconciliation {
        ApplicantCountReconciliation {
            hinted: self.applicant_count,
            rendered: self.active_applicant_count(),
        }
    }

    /// Boundary validation applied before a dataset is persisted.
    pub fn validate(&self) -> Result<(), DatasetError> {
        match self.applicants.len() {
            0 => Err(DatasetError::MissingPrimaryApplicant),
            count if count > MAX_APPLICANTS => Err(DatasetError::TooManyApplicants { count }),
            _ => Ok(()),
        }
    }
}

/// Result of comparing the applicant-count hint with named slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplicantCountReconciliation {
    pub hinted: u8,
    pub rendered: usize,
}

impl ApplicantCountReconciliation {
    pub fn agrees(&self) -> bool {
        usize::from(self.hinted) == self.rendered
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("form data must include the sole or first applicant")]
    MissingPrimaryApplicant,
    #[error("form data supports at most three applicants, received {count}")]
    TooManyApplicants { count: usize },
}

fn deserialize_unit_type<'de, D>(deserializer: D) -> Result<Option<UnitType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(UnitType::from_wire))
}

/// The count is only a display hint: out-of-range numbers clamp and anything
/// unreadable becomes zero instead of rejecting the submission.
fn deserialize_count_hint<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match raw {
        Some(serde_json::Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value as i64)),
        Some(serde_json::Value::String(text)) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(number.map_or(0, |value| value.clamp(0, i64::from(u8::MAX)) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_form_payload() {
        let payload = json!({
            "applicants": [
                { "title": "Ms.", "name": "Asha Rao", "residentialStatus": "Resident" },
                { "name": "" }
            ],
            "application": { "tower": "B", "unitType": "3bhk", "unitPrice": "₹12,34,567" },
            "applicantCount": 2
        });

        let dataset: FormDataset = serde_json::from_value(payload).expect("dataset parses");

        assert_eq!(dataset.applicants.len(), 2);
        assert_eq!(dataset.applicants[0].display_name(), "Ms. Asha Rao");
        assert_eq!(
            dataset.applicants[0].residential_status(),
            Some(ResidentialStatus::Resident)
        );
        assert_eq!(dataset.application.unit_type, Some(UnitType::ThreeBhk));
        assert_eq!(dataset.applicant_count, 2);
    }

    #[test]
    fn count_hint_outside_byte_range_is_clamped() {
        for (raw, expected) in [
            (json!(300), 255),
            (json!(-1), 0),
            (json!("2"), 2),
            (json!(2.0), 2),
            (json!(null), 0),
            (json!("three"), 0),
        ] {
            let dataset: FormDataset = serde_json::from_value(json!({
                "applicants": [{ "name": "Asha Rao" }],
                "applicantCount": raw
            }))
            .expect("dataset parses");
            assert_eq!(dataset.applicant_count, expected, "hint {raw}");
        }
    }

    #[test]
    fn unknown_or_empty_unit_type_is_unset() {
        for raw in [json!(""), json!("studio"), json!(null)] {
            let dataset: ApplicationRecord =
                serde_json::from_value(json!({ "unitType": raw })).expect("record parses");
            assert_eq!(dataset.unit_type, None);
        }
        assert_eq!(UnitType::display(None), "");
        assert_eq!(UnitType::display(Some(UnitType::FourBhk)), "4 BHK");
    }

    #[test]
    fn residential_status_requires_exact_caption() {
        assert_eq!(
            ResidentialStatus::from_stored("Non-Resident"),
            Some(ResidentialStatus::NonResident)
        );
        assert_eq!(ResidentialStatus::from_stored("resident"), None);
        assert_eq!(ResidentialStatus::from_stored(" Resident"), None);
        assert_eq!(ResidentialStatus::from_stored(""), None);
    }

    #[test]
    fn reconciliation_trusts_name_presence() {
        let dataset = FormDataset {
            applicants: vec![
                ApplicantRecord::default(),
                ApplicantRecord::default(),
                ApplicantRecord {
                    name: "Ravi".to_string(),
                    ..ApplicantRecord::default()
                },
            ],
            application: ApplicationRecord::default(),
            applicant_count: 2,
        };

        let reconciliation = dataset.reconcile_applicant_count();
        assert_eq!(reconciliation.rendered, 2);
        assert!(reconciliation.agrees());

        let hint_too_low = FormDataset {
            applicant_count: 1,
            ..dataset
        };
        assert!(!hint_too_low.reconcile_applicant_count().agrees());
    }

    #[test]
    fn validate_rejects_empty_and_oversized_applicant_lists() {
        let mut dataset = FormDataset::default();
        assert_eq!(
            dataset.validate(),
            Err(DatasetError::MissingPrimaryApplicant)
        );

        dataset.applicants = vec![ApplicantRecord::default(); 4];
        assert_eq!(
            dataset.validate(),
            Err(DatasetError::TooManyApplicants { count: 4 })
        );

        dataset.applicants.truncate(3);
        assert!(dataset.validate().is_ok());
    }
}
