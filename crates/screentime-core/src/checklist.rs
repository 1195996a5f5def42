//! The fixed daily checklist.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four daily habit tasks. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistItem {
    Preparation,
    Homework,
    Bedtime,
    Departure,
}

impl ChecklistItem {
    pub const ALL: [ChecklistItem; 4] = [
        ChecklistItem::Preparation,
        ChecklistItem::Homework,
        ChecklistItem::Bedtime,
        ChecklistItem::Departure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistItem::Preparation => "preparation",
            ChecklistItem::Homework => "homework",
            ChecklistItem::Bedtime => "bedtime",
            ChecklistItem::Departure => "departure",
        }
    }
}

impl fmt::Display for ChecklistItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecklistItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ChecklistItem::ALL
            .into_iter()
            .find(|item| item.as_str() == needle)
            .ok_or_else(|| format!("unknown checklist item: {s}"))
    }
}

/// Completion state of the daily checklist.
///
/// Serialized flat (one boolean per item) so it can be flattened into a
/// [`DailyRecord`](crate::DailyRecord).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(default)]
    pub preparation: bool,
    #[serde(default)]
    pub homework: bool,
    #[serde(default)]
    pub bedtime: bool,
    #[serde(default)]
    pub departure: bool,
}

impl Checklist {
    pub fn is_checked(&self, item: ChecklistItem) -> bool {
        match item {
            ChecklistItem::Preparation => self.preparation,
            ChecklistItem::Homework => self.homework,
            ChecklistItem::Bedtime => self.bedtime,
            ChecklistItem::Departure => self.departure,
        }
    }

    pub fn set(&mut self, item: ChecklistItem, checked: bool) {
        let slot = match item {
            ChecklistItem::Preparation => &mut self.preparation,
            ChecklistItem::Homework => &mut self.homework,
            ChecklistItem::Bedtime => &mut self.bedtime,
            ChecklistItem::Departure => &mut self.departure,
        };
        *slot = checked;
    }

    /// Flip one item and return its new value.
    pub fn toggle(&mut self, item: ChecklistItem) -> bool {
        let next = !self.is_checked(item);
        self.set(item, next);
        next
    }

    pub fn is_complete(&self) -> bool {
        ChecklistItem::ALL.iter().all(|item| self.is_checked(*item))
    }

    pub fn completed_count(&self) -> usize {
        ChecklistItem::ALL
            .iter()
            .filter(|item| self.is_checked(**item))
            .count()
    }
}
