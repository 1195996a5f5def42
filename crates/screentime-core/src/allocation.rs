//! Allowance policy: how many minutes a day's checklist earns.

use crate::checklist::Checklist;
use crate::storage::Settings;

/// Pure mapping from checklist state and day type to earned minutes.
pub struct AllocationPolicy;

impl AllocationPolicy {
    /// Full-completion minutes of the weekday or weekend bucket when every
    /// item is checked, that bucket's fallback minutes otherwise.
    pub fn compute(checklist: &Checklist, settings: &Settings, is_weekend: bool) -> u32 {
        settings.allowance_minutes(is_weekend, checklist.is_complete())
    }
}
