//! Role-gated view selection.

use std::fmt;

use serde::Serialize;

use crate::{
    errors::{ApiError, Result},
    token::Role,
};

/// Screens and actions whose availability depends on the session role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Feature {
    Home,
    Agenda,
    Achievements,
    Profile,
    /// See the group roster on the roll-call screen
    RollCallView,
    /// Submit a roll call
    RollCallSubmit,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Home => "home",
            Feature::Agenda => "agenda",
            Feature::Achievements => "achievements",
            Feature::Profile => "profile",
            Feature::RollCallView => "roll call",
            Feature::RollCallSubmit => "roll call submission",
        };
        f.write_str(name)
    }
}

impl Role {
    pub fn can_access(self, feature: Feature) -> bool {
        match (self, feature) {
            (Role::Unauthenticated, _) => false,
            (
                Role::Desbravador | Role::Monitor | Role::Diretor,
                Feature::Home | Feature::Agenda | Feature::Achievements | Feature::Profile,
            ) => true,
            (Role::Monitor | Role::Diretor, Feature::RollCallView) => true,
            (Role::Desbravador, Feature::RollCallView) => false,
            (Role::Monitor, Feature::RollCallSubmit) => true,
            (Role::Desbravador | Role::Diretor, Feature::RollCallSubmit) => false,
        }
    }
}

pub fn require(role: Role, feature: Feature) -> Result<()> {
    if role.can_access(feature) {
        Ok(())
    } else {
        Err(ApiError::AccessDenied { role, feature })
    }
}
