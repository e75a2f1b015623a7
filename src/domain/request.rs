use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Status, effort};

/// Maximum length of a request name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Identifier assigned to a request by the store when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u32);

impl RequestId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The identifier following this one, or `None` past [`u32::MAX`].
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = std::num::ParseIntError;

    /// Accepts `12` or `#12`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

/// Effort hours per phase.
///
/// Fields missing from stored data read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hours {
    /// Business analysis.
    #[serde(rename = "analystHours", default)]
    pub analyst: f64,
    /// Development.
    #[serde(rename = "developerHours", default)]
    pub developer: f64,
    /// KKT (acceptance testing).
    #[serde(rename = "kktHours", default)]
    pub acceptance_test: f64,
    /// Pre-production. Kept for older records.
    #[serde(rename = "preprodHours", default)]
    pub preprod: f64,
}

impl Hours {
    /// Sum of all phases.
    #[must_use]
    pub fn total(&self) -> f64 {
        effort::total_hours(self)
    }

    fn fields(&self) -> [(&'static str, f64); 4] {
        [
            ("analyst", self.analyst),
            ("developer", self.developer),
            ("acceptance test", self.acceptance_test),
            ("preprod", self.preprod),
        ]
    }

    /// Checks that every phase is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.fields() {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteHours { field });
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeHours { field, value });
            }
        }
        Ok(())
    }
}

/// Request priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Düşük.
    Low,
    /// Orta.
    #[default]
    Medium,
    /// Yüksek.
    High,
    /// Kritik.
    Critical,
}

impl Priority {
    /// Every priority, lowest first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Numeric code used by older data files.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Maps a numeric code back to a priority, defaulting to
    /// [`Priority::Medium`].
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        Self::ALL
            .into_iter()
            .find(|priority| priority.code() == code)
            .unwrap_or_default()
    }

    /// Variant name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Display text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Düşük",
            Self::Medium => "Orta",
            Self::High => "Yüksek",
            Self::Critical => "Kritik",
        }
    }

    /// Parses a variant name or label, defaulting to [`Priority::Medium`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|priority| {
                priority.name().eq_ignore_ascii_case(name) || priority.label() == name
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stored form of an enum value: older files hold the numeric code,
/// newer ones the variant name.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum EnumRepr {
    Code(i64),
    Name(String),
}

impl From<EnumRepr> for Priority {
    fn from(repr: EnumRepr) -> Self {
        match repr {
            EnumRepr::Code(code) => Self::from_code(code),
            EnumRepr::Name(name) => Self::from_name(&name),
        }
    }
}

impl From<Priority> for EnumRepr {
    fn from(priority: Priority) -> Self {
        Self::Name(priority.name().to_string())
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EnumRepr::from(*self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        EnumRepr::deserialize(deserializer).map(Self::from)
    }
}

/// A work request.
///
/// Derived figures (total hours, size, risk) are never stored; see
/// [`compute_derived`](crate::domain::compute_derived).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Store-assigned identifier.
    pub id: RequestId,
    /// Short name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Lifecycle state.
    #[serde(default)]
    pub status: Status,
    /// Priority.
    #[serde(default)]
    pub priority: Priority,
    /// Effort hours per phase.
    #[serde(flatten)]
    pub hours: Hours,
    /// Delivery deadline.
    #[serde(
        default,
        deserialize_with = "wire_date::deserialize_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,
    /// Deadline for the KKT phase.
    #[serde(
        default,
        rename = "kktDeadline",
        deserialize_with = "wire_date::deserialize_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub kkt_deadline: Option<NaiveDate>,
    /// When the store created the request.
    #[serde(deserialize_with = "wire_date::deserialize_timestamp")]
    pub created_date: DateTime<Utc>,
    /// When the store last saved a change.
    #[serde(deserialize_with = "wire_date::deserialize_timestamp")]
    pub last_modified: DateTime<Utc>,
    /// Who created the request.
    #[serde(default)]
    pub created_by: String,
    /// Who made the last change.
    #[serde(default)]
    pub last_modified_by: String,
}

impl Request {
    /// Sum of all effort phases.
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.hours.total()
    }

    /// Whether the deadline lies before `today`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.deadline.is_some_and(|deadline| deadline < today)
    }

    /// Overdue and still open.
    ///
    /// This is the rule used for dashboard overdue counts: completed and
    /// cancelled requests are never reported as overdue there.
    #[must_use]
    pub fn is_overdue_and_open(&self, today: NaiveDate) -> bool {
        self.is_overdue(today) && !self.status.is_completed()
    }

    /// Checks the user-editable fields.
    ///
    /// # Errors
    ///
    /// Fails if the name is blank or too long, or if any hour field is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        self.hours.validate()
    }
}

/// Dates in stored records.
///
/// Older data files hold deadlines as full timestamps
/// (`2025-07-08T00:00:00+03:00`) and creation times without an offset.
/// Deadlines keep the calendar date as written; timestamps without an offset
/// are read as UTC. Records are always written back as plain dates and
/// RFC 3339 timestamps.
mod wire_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    const DATE: &str = "%Y-%m-%d";
    const LOCAL_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        parse_date(text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date '{text}'")))
    }

    pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(text.trim())
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{text}'")))
    }

    fn parse_date(text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, DATE)
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|timestamp| timestamp.date_naive())
            })
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, LOCAL_DATETIME)
                    .ok()
                    .map(|timestamp| timestamp.date())
            })
    }

    fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc))
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, LOCAL_DATETIME)
                    .ok()
                    .map(|timestamp| timestamp.and_utc())
            })
    }
}

/// The caller-supplied fields of a request that does not exist yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewRequest {
    /// Short name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Priority.
    pub priority: Priority,
    /// Effort hours per phase.
    pub hours: Hours,
    /// Delivery deadline.
    pub deadline: Option<NaiveDate>,
    /// Deadline for the KKT phase.
    pub kkt_deadline: Option<NaiveDate>,
    /// Who is creating the request.
    pub created_by: String,
}

impl NewRequest {
    /// A request with only a name set.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Checks the user-editable fields.
    ///
    /// # Errors
    ///
    /// See [`Request::validate`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        self.hours.validate()
    }

    /// Builds the stored record. New requests always start in
    /// [`Status::New`].
    #[must_use]
    pub fn into_request(self, id: RequestId, now: DateTime<Utc>) -> Request {
        Request {
            id,
            name: self.name.trim().to_string(),
            description: self.description,
            status: Status::New,
            priority: self.priority,
            hours: self.hours,
            deadline: self.deadline,
            kkt_deadline: self.kkt_deadline,
            created_date: now,
            last_modified: now,
            last_modified_by: self.created_by.clone(),
            created_by: self.created_by,
        }
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            length,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// A request field holds a value that cannot be stored.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    /// The name is empty or only whitespace.
    #[error("request name is required")]
    EmptyName,

    /// The name exceeds [`MAX_NAME_LENGTH`].
    #[error("request name is {length} characters long (maximum {max})")]
    NameTooLong {
        /// Actual length in characters.
        length: usize,
        /// Allowed length.
        max: usize,
    },

    /// An hour field is below zero.
    #[error("{field} hours cannot be negative (got {value})")]
    NegativeHours {
        /// Which phase.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An hour field is NaN or infinite.
    #[error("{field} hours must be a finite number")]
    NonFiniteHours {
        /// Which phase.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn request_id_parses_with_or_without_hash() {
        assert_eq!("12".parse::<RequestId>().unwrap(), RequestId::new(12));
        assert_eq!("#7".parse::<RequestId>().unwrap(), RequestId::new(7));
        assert!("seven".parse::<RequestId>().is_err());
        assert_eq!(RequestId::new(7).to_string(), "#7");
    }

    #[test]
    fn request_id_next_stops_at_max() {
        assert_eq!(RequestId::new(41).next(), Some(RequestId::new(42)));
        assert_eq!(RequestId::new(u32::MAX).next(), None);
    }

    #[test]
    fn new_request_starts_as_new() {
        let mut new = NewRequest::named("  Login page  ");
        new.created_by = "koray".to_string();
        let request = new.into_request(RequestId::new(3), now());

        assert_eq!(request.status, Status::New);
        assert_eq!(request.name, "Login page");
        assert_eq!(request.created_date, request.last_modified);
        assert_eq!(request.last_modified_by, "koray");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            NewRequest::named("   ").validate(),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn long_name_is_rejected() {
        let name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert_eq!(
            NewRequest::named(name).validate(),
            Err(ValidationError::NameTooLong {
                length: MAX_NAME_LENGTH + 1,
                max: MAX_NAME_LENGTH
            })
        );
    }

    #[test]
    fn negative_hours_are_rejected() {
        let mut new = NewRequest::named("Report");
        new.hours.developer = -1.0;
        assert_eq!(
            new.validate(),
            Err(ValidationError::NegativeHours {
                field: "developer",
                value: -1.0
            })
        );
    }

    #[test]
    fn nan_hours_are_rejected() {
        let hours = Hours {
            preprod: f64::NAN,
            ..Hours::default()
        };
        assert_eq!(
            hours.validate(),
            Err(ValidationError::NonFiniteHours { field: "preprod" })
        );
    }

    #[test]
    fn missing_hour_fields_read_as_zero() {
        let json = r#"{
            "id": 4,
            "name": "Legacy",
            "status": 2,
            "priority": 3,
            "developerHours": 12.5,
            "createdDate": "2024-01-10T08:00:00Z",
            "lastModified": "2024-01-11T08:00:00Z"
        }"#;
        let request: Request = serde_json::from_str(json).unwrap();

        assert_eq!(request.hours.analyst, 0.0);
        assert!((request.total_hours() - 12.5).abs() < 1e-9);
        assert_eq!(request.status, Status::InProgress);
        assert_eq!(request.priority, Priority::High);
        assert_eq!(request.deadline, None);
    }

    #[test]
    fn enums_serialize_by_name() {
        let request = NewRequest::named("Export").into_request(RequestId::new(1), now());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["status"], "New");
        assert_eq!(value["priority"], "Medium");
        assert_eq!(value["kktHours"], 0.0);
        assert!(value.get("deadline").is_none());
    }

    #[test]
    fn unknown_priority_defaults_to_medium() {
        assert_eq!(Priority::from_code(9), Priority::Medium);
        assert_eq!(Priority::from_name("urgent"), Priority::Medium);
        assert_eq!(Priority::from_name("Kritik"), Priority::Critical);
    }

    #[test]
    fn overdue_only_with_past_deadline() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut request = NewRequest::named("Audit").into_request(RequestId::new(1), now());
        assert!(!request.is_overdue(today));

        request.deadline = NaiveDate::from_ymd_opt(2024, 3, 10);
        assert!(!request.is_overdue(today));

        request.deadline = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert!(request.is_overdue(today));
        assert!(request.is_overdue_and_open(today));

        request.status = Status::Cancelled;
        assert!(!request.is_overdue_and_open(today));
    }

    #[test]
    fn timestamped_deadlines_keep_their_calendar_date() {
        let json = r#"{
            "id": 1,
            "name": "Kullanıcı Giriş Sistemi",
            "status": 2,
            "deadline": "2025-07-08T00:00:00+03:00",
            "kktDeadline": "2025-07-01T00:00:00",
            "createdDate": "2025-06-26T14:22:10.1234567+03:00",
            "lastModified": "2025-06-30T09:00:00"
        }"#;
        let request: Request = serde_json::from_str(json).unwrap();

        assert_eq!(request.deadline, NaiveDate::from_ymd_opt(2025, 7, 8));
        assert_eq!(request.kkt_deadline, NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(
            request.created_date,
            Utc.with_ymd_and_hms(2025, 6, 26, 11, 22, 10).unwrap()
                + chrono::Duration::nanoseconds(123_456_700)
        );
        assert_eq!(
            request.last_modified,
            Utc.with_ymd_and_hms(2025, 6, 30, 9, 0, 0).unwrap()
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["deadline"], "2025-07-08");
        assert_eq!(value["kktDeadline"], "2025-07-01");
    }

    #[test]
    fn blank_or_null_deadline_reads_as_none() {
        for deadline in ["null", "\"\""] {
            let json = format!(
                r#"{{"id": 1, "name": "x", "deadline": {deadline},
                    "createdDate": "2024-01-10T08:00:00Z", "lastModified": "2024-01-10T08:00:00Z"}}"#
            );
            let request: Request = serde_json::from_str(&json).unwrap();
            assert_eq!(request.deadline, None);
        }
    }

    #[test]
    fn malformed_deadline_is_rejected() {
        let json = r#"{"id": 1, "name": "x", "deadline": "next week",
            "createdDate": "2024-01-10T08:00:00Z", "lastModified": "2024-01-10T08:00:00Z"}"#;
        assert!(serde_json::from_str::<Request>(json).is_err());
    }
}
