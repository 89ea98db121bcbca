use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    Offline,
    Metered,
    Unmetered,
}

impl Connectivity {
    pub fn is_online(&self) -> bool {
        !matches!(self, Connectivity::Offline)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Connectivity::Offline => "offline",
            Connectivity::Metered => "metered",
            Connectivity::Unmetered => "unmetered",
        }
    }
}
