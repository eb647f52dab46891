use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Teacher,
    Counselor,
    Staff,
    Student,
    Parent,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Counselor => "Counselor",
            Role::Staff => "Staff",
            Role::Student => "Student",
            Role::Parent => "Parent",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Admin" => Role::Admin,
            "Teacher" => Role::Teacher,
            "Counselor" => Role::Counselor,
            "Staff" => Role::Staff,
            "Student" => Role::Student,
            "Parent" => Role::Parent,
            _ => Role::Other(name),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl UserProfile {
    /// Name shown in the header: full name, then username.
    pub fn display_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.username.as_deref().filter(|name| !name.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub department: String,
    pub password: String,
    pub require_password_change: bool,
}

/// Severity as rated by the model. Unknown ratings are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Other(rating) => rating,
        }
    }
}

impl From<String> for Severity {
    fn from(rating: String) -> Self {
        match rating.as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Other(rating),
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionStep {
    pub title: String,
    #[serde(default)]
    pub steps: Vec<String>,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub severity: Severity,
    pub root_cause: String,
    #[serde(default)]
    pub solutions: Vec<SolutionStep>,
    pub quick_wins: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub week: u32,
    pub year: i32,
    pub issue: String,
    pub timestamp: DateTime<Utc>,
    pub solution: Solution,
    #[serde(default)]
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeUntilNext {
    pub next_monday: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityStatus {
    pub allowed: bool,
    pub time_until_next: Option<TimeUntilNext>,
    pub last_prescription_date: Option<DateTime<Utc>>,
    pub current_week: Option<WeekRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThisWeek {
    #[serde(default)]
    pub success: bool,
    pub prescription: Option<PrescriptionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub prescriptions: Vec<PrescriptionRecord>,
    #[serde(default)]
    pub total: usize,
}

/// Optional structured context. Unset fields are left out of the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescribeContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_cases: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PrescribeContext {
    pub fn from_fields(
        affected_grade: &str,
        number_of_cases: &str,
        trend: &str,
        category: &str,
    ) -> Self {
        Self {
            affected_grade: specified(affected_grade),
            number_of_cases: specified(number_of_cases),
            trend: specified(trend),
            category: specified(category),
        }
    }
}

fn specified(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribeRequest {
    pub issue: String,
    pub context: PrescribeContext,
}

/// Decoded `POST /ai-prescriptions/prescribe` reply. On success the record
/// fields sit next to `success` in the same object.
#[derive(Debug, Clone, PartialEq)]
pub enum PrescribeReply {
    Created(PrescriptionRecord),
    Blocked { message: String },
    Failed { error: Option<String> },
}

impl PrescribeReply {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let flag = |key: &str| value.get(key).and_then(|v| v.as_bool()).unwrap_or(false);
        let text = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        if flag("success") {
            return Ok(PrescribeReply::Created(serde_json::from_value(value)?));
        }
        if flag("blocked") {
            return Ok(PrescribeReply::Blocked {
                message: text("message").unwrap_or_default(),
            });
        }
        Ok(PrescribeReply::Failed {
            error: text("error"),
        })
    }
}
