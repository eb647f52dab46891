//! Sample payloads shared by the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use schooldesk_portal::models::{PrescriptionRecord, UserRecord};

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .expect("valid timestamp")
}

pub fn record_json(week: u32, issue: &str) -> Value {
    json!({
        "week": week,
        "year": 2024,
        "issue": issue,
        "timestamp": "2024-01-09T08:30:00Z",
        "solution": {
            "severity": "high",
            "root_cause": "Unsupervised corridors between periods",
            "solutions": [{
                "title": "Corridor monitors",
                "steps": ["Assign staff to corridors", "Rotate weekly"],
                "impact": "Fewer incidents between classes"
            }],
            "quick_wins": ["Announce the new rota at assembly"]
        },
        "cost": 0.0123
    })
}

pub fn record(week: u32, issue: &str) -> PrescriptionRecord {
    serde_json::from_value(record_json(week, issue)).expect("sample record should decode")
}

pub fn user_json(id: &str, name: &str, role: &str, active: bool) -> Value {
    json!({
        "_id": id,
        "fullName": name,
        "username": name.to_lowercase().replace(' ', "."),
        "email": format!("{}@school.test", id),
        "role": role,
        "department": "Science",
        "isActive": active,
        "createdAt": "2024-02-01T09:00:00Z"
    })
}

pub fn user(id: &str, name: &str, role: &str, active: bool) -> UserRecord {
    serde_json::from_value(user_json(id, name, role, active)).expect("sample user should decode")
}
