use chrono::NaiveDate;
use serde::{
    de::{DeserializeOwned, Error as _},
    Deserialize, Deserializer, Serialize,
};
use serde_json::Value;

/// Structured resume produced by the model.
///
/// Every field is best effort: absent, `null` or blank values decode to a blank
/// string or an empty list, and all fields are always serialized. Keys outside
/// this schema are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedResume {
    #[serde(rename = "phoneNumber", default, deserialize_with = "lenient_string")]
    pub phone_number: String,

    #[serde(
        rename = "educationalQualification",
        default,
        deserialize_with = "lenient_list"
    )]
    pub educational_qualification: Vec<EducationalQualification>,

    #[serde(
        rename = "EmpProfessionalExperience",
        default,
        deserialize_with = "lenient_list"
    )]
    pub professional_experience: Vec<ProfessionalExperience>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationalQualification {
    #[serde(default, deserialize_with = "lenient_string")]
    pub institution_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country_of_institution: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: String,
    /// The model is asked for an integer but often answers with a string.
    #[serde(default, deserialize_with = "lenient_string")]
    pub year_of_graduation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalExperience {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub work_start_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub work_end_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position_title: String,
}

impl ExtractedResume {
    /// Rewrites work dates into `DD/MM/YYYY` where the model left another format.
    pub fn normalize_dates(&mut self) {
        for entry in &mut self.professional_experience {
            entry.work_start_date = normalize_date(&entry.work_start_date);
            entry.work_end_date = normalize_date(&entry.work_end_date);
        }
    }
}

/// Best-effort conversion of a resume date to `DD/MM/YYYY`.
///
/// Handles `DD/MM/YYYY`, `YYYY-MM-DD`, `Month YYYY` and `MM/YYYY`; a month-only
/// date is pinned to the first of the month. Anything else ("Present", blank) is
/// returned trimmed but otherwise unchanged.
pub fn normalize_date(raw: &str) -> String {
    const OUTPUT: &str = "%d/%m/%Y";

    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format(OUTPUT).to_string();
    }

    // chrono accepts short years for %Y; insist on a four-digit year.
    let has_full_year = trimmed
        .chars()
        .rev()
        .take(4)
        .filter(char::is_ascii_digit)
        .count()
        == 4;
    if !has_full_year {
        return trimmed.to_string();
    }

    let candidates = [
        (trimmed.to_string(), OUTPUT),
        (format!("01 {trimmed}"), "%d %B %Y"),
        (format!("01/{trimmed}"), OUTPUT),
    ];
    candidates
        .iter()
        .find_map(|(input, fmt)| NaiveDate::parse_from_str(input, fmt).ok())
        .map(|date| date.format(OUTPUT).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

/// A blank string stands for an empty list, and blank or `null` elements are skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a list, found {other}"
            )))
        }
    };

    items
        .into_iter()
        .filter(|item| !is_blank(item))
        .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
