use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Holiday {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, name: None }
    }

    pub fn named(date: NaiveDate, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            date,
            name: if name.trim().is_empty() {
                None
            } else {
                Some(name)
            },
        }
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("Holiday")
    }
}
