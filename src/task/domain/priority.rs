//! Task priorities and the priority-driven due-date table.

use super::TaskDomainError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Normalised priority code (trimmed, upper-case ASCII).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PriorityCode(String);

impl PriorityCode {
    /// Most pressing priority.
    pub const URGENT: &'static str = "URGENT";
    /// High priority.
    pub const HIGH: &'static str = "HIGH";
    /// Priority assigned when none is requested.
    pub const MEDIUM: &'static str = "MEDIUM";
    /// Low priority.
    pub const LOW: &'static str = "LOW";

    /// Creates a normalised priority code.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyPriorityCode`] when the value is blank.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let normalized = value.as_ref().trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyPriorityCode);
        }
        Ok(Self(normalized))
    }

    /// Returns the priority used when a request does not name one.
    #[must_use]
    pub fn medium() -> Self {
        Self(Self::MEDIUM.to_owned())
    }

    /// Returns the code as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PriorityCode {
    fn default() -> Self {
        Self::medium()
    }
}

impl TryFrom<String> for PriorityCode {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PriorityCode> for String {
    fn from(value: PriorityCode) -> Self {
        value.0
    }
}

impl fmt::Display for PriorityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Days-to-due per priority, persisted as the settings blob.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use workboard::task::domain::{DueDateSettings, PriorityCode};
///
/// let settings = DueDateSettings::default();
/// let created = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default();
/// let high = PriorityCode::new("high").unwrap_or_default();
/// assert_eq!(
///     settings.due_date_for(&high, created),
///     NaiveDate::from_ymd_opt(2026, 3, 4)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DueDateSettings {
    days_by_priority: BTreeMap<PriorityCode, u32>,
}

impl Default for DueDateSettings {
    fn default() -> Self {
        let days_by_priority = [
            (PriorityCode::URGENT, 1),
            (PriorityCode::HIGH, 3),
            (PriorityCode::MEDIUM, 7),
            (PriorityCode::LOW, 14),
        ]
        .into_iter()
        .map(|(code, days)| (PriorityCode(code.to_owned()), days))
        .collect();
        Self { days_by_priority }
    }
}

impl DueDateSettings {
    /// Creates settings from an explicit table.
    #[must_use]
    pub const fn new(days_by_priority: BTreeMap<PriorityCode, u32>) -> Self {
        Self { days_by_priority }
    }

    /// Sets the days-to-due for one priority.
    #[must_use]
    pub fn with_days(mut self, priority: PriorityCode, days: u32) -> Self {
        self.days_by_priority.insert(priority, days);
        self
    }

    /// Returns the configured days for `priority`.
    #[must_use]
    pub fn days_for(&self, priority: &PriorityCode) -> Option<u32> {
        self.days_by_priority.get(priority).copied()
    }

    /// Returns the configured table.
    #[must_use]
    pub const fn days_by_priority(&self) -> &BTreeMap<PriorityCode, u32> {
        &self.days_by_priority
    }

    /// Computes the due date for a task of `priority` created on `from`.
    ///
    /// Returns `None` for priorities without a configured entry or when the
    /// date would overflow the calendar.
    #[must_use]
    pub fn due_date_for(&self, priority: &PriorityCode, from: NaiveDate) -> Option<NaiveDate> {
        let days = self.days_for(priority)?;
        from.checked_add_days(Days::new(u64::from(days)))
    }
}
