//! Method definitions for the Auth activation

use crate::hub::{params_schema, MethodSchema, NoParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Status,
    Refresh,
}

impl AuthMethod {
    pub const ALL: [AuthMethod; 2] = [AuthMethod::Status, AuthMethod::Refresh];

    pub fn name(&self) -> &'static str {
        match self {
            AuthMethod::Status => "status",
            AuthMethod::Refresh => "refresh",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            AuthMethod::Status => {
                "Show which authentication mechanism is configured and whether the cached token is valid"
            }
            AuthMethod::Refresh => {
                "Discard the cached token and obtain a new one with the configured username and password"
            }
        }
    }

    pub fn schema(&self) -> MethodSchema {
        MethodSchema::new(self.name(), self.description(), params_schema::<NoParams>())
    }
}
