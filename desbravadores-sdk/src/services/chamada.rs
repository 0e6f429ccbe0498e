//! Roll call ("chamada"): a leader marks which group members attended on a
//! given date and submits the list.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    access::{self, Feature},
    client::ApiClient,
    errors::Result,
    models::Member,
};

#[derive(Debug, Clone)]
pub struct RollCall {
    date: NaiveDate,
    members: Vec<Member>,
    present: BTreeSet<i64>,
}

impl RollCall {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            members: Vec::new(),
            present: BTreeSet::new(),
        }
    }

    /// Fetch the group roster. Needs a MONITOR or DIRETOR session.
    pub async fn load_members(&mut self, client: &ApiClient) -> Result<&[Member]> {
        access::require(client.session().role().await, Feature::RollCallView)?;

        match client.group_members().await {
            Ok(members) => {
                info!("Loaded {} group members", members.len());
                self.members = members;
                Ok(&self.members)
            }
            Err(e) => {
                warn!("Failed to load group members: {}", e);
                self.members.clear();
                Err(e)
            }
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Flip a member's attendance, returning whether they are now present.
    pub fn toggle(&mut self, member_id: i64) -> bool {
        if self.present.remove(&member_id) {
            false
        } else {
            self.present.insert(member_id);
            true
        }
    }

    pub fn is_present(&self, member_id: i64) -> bool {
        self.present.contains(&member_id)
    }

    /// Present ids, ascending
    pub fn present_ids(&self) -> Vec<i64> {
        self.present.iter().copied().collect()
    }

    /// Submit attendance for the selected date. Only a MONITOR may submit.
    /// Returns the backend's confirmation, or a default one.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<String> {
        access::require(client.session().role().await, Feature::RollCallSubmit)?;

        let ack = client.submit_chamada(self.date, self.present_ids()).await?;
        self.present.clear();

        let message = ack
            .and_then(|ack| ack.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Chamada para {} registrada com sucesso!", self.date));
        Ok(message)
    }
}
