//! Typed bindings for the backend endpoints the app consumes.

use chrono::NaiveDate;
use tracing::info;

use crate::{
    client::ApiClient,
    errors::{ApiError, Result},
    models::{Achievement, ChamadaSubmission, Credentials, Member, SubmitAck, Task, UserProfile},
    token::Role,
};

pub const TASKS_PATH: &str = "/api/tasks";
pub const ACHIEVEMENTS_PATH: &str = "/api/gamification/achievements";
pub const PROFILE_PATH: &str = "/api/profile/me";
pub const GROUP_MEMBERS_PATH: &str = "/api/chamada/my-group-members";
pub const CHAMADA_SUBMIT_PATH: &str = "/api/chamada/submit";

impl ApiClient {
    /// Sign in through the shared session store.
    pub async fn login(&self, credentials: Credentials) -> Result<Role> {
        self.session().sign_in(self, credentials).await
    }

    /// Tasks scheduled in `month` (1-12) of `year`, in backend order.
    pub async fn tasks_for_month(&self, year: i32, month: u32) -> Result<Vec<Task>> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::InvalidRequest(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        let path = format!("{}?year={}&month={}", TASKS_PATH, year, month);
        self.get_json(&path).await
    }

    pub async fn achievements(&self) -> Result<Vec<Achievement>> {
        self.get_json(ACHIEVEMENTS_PATH).await
    }

    pub async fn my_profile(&self) -> Result<UserProfile> {
        self.get_json(PROFILE_PATH).await
    }

    pub async fn group_members(&self) -> Result<Vec<Member>> {
        self.get_json(GROUP_MEMBERS_PATH).await
    }

    pub async fn submit_chamada(
        &self,
        date: NaiveDate,
        present_user_ids: Vec<i64>,
    ) -> Result<Option<SubmitAck>> {
        let submission = ChamadaSubmission {
            date,
            present_user_ids,
        };
        info!(
            "Submitting roll call for {} with {} present",
            submission.date,
            submission.present_user_ids.len()
        );
        self.post_json(CHAMADA_SUBMIT_PATH, &submission).await
    }
}
