use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, Result};

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://192.168.56.1:8080")
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let parsed = url::Url::parse(&base_url).map_err(|e| {
            ApiError::Configuration(format!("Invalid backend URL {}: {}", base_url, e))
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ApiError::Configuration(format!(
                    "Unsupported URL scheme: {}",
                    other
                )))
            }
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Sign-in request body. Not persisted anywhere.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response from `POST /auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
}

/// Agenda entry from `GET /api/tasks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Catalog entry from `GET /api/gamification/achievements`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Path relative to the backend base URL
    pub icon: String,
    pub xp_reward: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: i64,
    pub name: String,
}

/// Response from `GET /api/profile/me`. Only the fields the client reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub badges: Vec<Badge>,
}

/// Roster entry from `GET /api/chamada/my-group-members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Body of `POST /api/chamada/submit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamadaSubmission {
    pub date: NaiveDate,
    pub present_user_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body the backend sends with non-success statuses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_reads_wire_date_and_time() {
        let task: Task = serde_json::from_value(json!({
            "id": 7,
            "title": "Acampamento",
            "description": null,
            "date": "2024-03-09",
            "time": "08:30:00"
        }))
        .unwrap();
        assert_eq!(task.date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(task.time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(task.description, None);
    }

    #[test]
    fn task_without_date_is_rejected() {
        let result = serde_json::from_value::<Task>(json!({
            "id": 7,
            "title": "Acampamento",
            "time": "08:30:00"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn submission_uses_camel_case() {
        let body = serde_json::to_value(ChamadaSubmission {
            date: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            present_user_ids: vec![1, 3],
        })
        .unwrap();
        assert_eq!(body, json!({ "date": "2024-05-04", "presentUserIds": [1, 3] }));
    }

    #[test]
    fn config_rejects_relative_urls() {
        assert!(ClientConfig::new("localhost:8080").is_err());
        assert!(ClientConfig::new("ftp://example.com").is_err());

        let config = ClientConfig::new("http://localhost:8080/").unwrap();
        assert_eq!(config.url_for("/api/profile/me"), "http://localhost:8080/api/profile/me");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("a@b.com", "pw"));
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("\"pw\""));
    }
}
