//! Status catalog: the ordered set of task status definitions and their legal
//! transitions.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Normalised status code (trimmed, upper-case ASCII).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusCode(String);

impl StatusCode {
    /// Creates a normalised status code.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyStatusCode`] when the value is blank.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let normalized = value.as_ref().trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyStatusCode);
        }
        Ok(Self(normalized))
    }

    /// Returns the code as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StatusCode {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StatusCode> for String {
    fn from(value: StatusCode) -> Self {
        value.0
    }
}

impl AsRef<str> for StatusCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of a [`StatusCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    code: StatusCode,
    label: String,
    color: String,
    is_final: bool,
    is_default: bool,
    allowed_transitions: Vec<StatusCode>,
    active: bool,
}

impl StatusDefinition {
    /// Creates an active, non-final, non-default definition with no outgoing
    /// transitions.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the code or label is blank.
    pub fn new(code: impl AsRef<str>, label: impl Into<String>) -> Result<Self, TaskDomainError> {
        let status_code = StatusCode::new(code)?;
        let raw_label = label.into();
        let trimmed = raw_label.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyStatusLabel(status_code));
        }
        Ok(Self {
            code: status_code,
            label: trimmed.to_owned(),
            color: String::new(),
            is_final: false,
            is_default: false,
            allowed_transitions: Vec::new(),
            active: true,
        })
    }

    /// Sets the display color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Marks the status as final.
    #[must_use]
    pub const fn final_status(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Marks the status as the catalog default.
    #[must_use]
    pub const fn default_status(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Sets the codes reachable from this status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyStatusCode`] when any code is blank.
    pub fn with_transitions<I, S>(mut self, codes: I) -> Result<Self, TaskDomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut transitions = Vec::new();
        for code in codes {
            let parsed = StatusCode::new(code)?;
            if !transitions.contains(&parsed) {
                transitions.push(parsed);
            }
        }
        self.allowed_transitions = transitions;
        Ok(self)
    }

    /// Returns the status code.
    #[must_use]
    pub const fn code(&self) -> &StatusCode {
        &self.code
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the display color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Returns whether the status is final.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.is_final
    }

    /// Returns whether the status is the catalog default.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.is_default
    }

    /// Returns whether the status is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the codes reachable from this status.
    #[must_use]
    pub fn allowed_transitions(&self) -> &[StatusCode] {
        &self.allowed_transitions
    }

    /// Returns whether `target` is listed as reachable.
    #[must_use]
    pub fn allows(&self, target: &StatusCode) -> bool {
        self.allowed_transitions.contains(target)
    }
}

/// Ordered, validated set of status definitions.
///
/// Declaration order is significant: transition sets are reported in
/// catalog order. Inactive entries stay in the catalog so historical tasks
/// keep resolving their labels. Deserialised catalogs are validated the
/// same way as built ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredCatalog")]
pub struct StatusCatalog {
    definitions: Vec<StatusDefinition>,
    done_code: StatusCode,
    cancelled_code: StatusCode,
}

impl StatusCatalog {
    /// Canonical code for completed work.
    pub const DONE: &'static str = "DONE";
    /// Canonical code for abandoned work.
    pub const CANCELLED: &'static str = "CANCELLED";

    /// Builds a catalog using the canonical `DONE` and `CANCELLED` codes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when codes repeat, a transition
    /// references an undefined code, more than one default is declared, or
    /// the canonical codes are not defined.
    pub fn new(definitions: Vec<StatusDefinition>) -> Result<Self, TaskDomainError> {
        Self::with_terminal_codes(
            definitions,
            StatusCode::new(Self::DONE)?,
            StatusCode::new(Self::CANCELLED)?,
        )
    }

    /// Builds a catalog with explicit done and cancelled codes.
    ///
    /// # Errors
    ///
    /// See [`StatusCatalog::new`].
    pub fn with_terminal_codes(
        definitions: Vec<StatusDefinition>,
        done_code: StatusCode,
        cancelled_code: StatusCode,
    ) -> Result<Self, TaskDomainError> {
        validate_definitions(&definitions)?;
        let catalog = Self {
            definitions,
            done_code,
            cancelled_code,
        };
        for code in [&catalog.done_code, &catalog.cancelled_code] {
            if catalog.find(code).is_none() {
                return Err(TaskDomainError::UnknownStatus(code.clone()));
            }
        }
        Ok(catalog)
    }

    /// Returns all definitions in declaration order, including inactive ones.
    #[must_use]
    pub fn definitions(&self) -> &[StatusDefinition] {
        &self.definitions
    }

    /// Looks up a definition regardless of its active flag.
    #[must_use]
    pub fn find(&self, code: &StatusCode) -> Option<&StatusDefinition> {
        self.definitions.iter().find(|def| def.code() == code)
    }

    /// Looks up an active definition.
    #[must_use]
    pub fn find_active(&self, code: &StatusCode) -> Option<&StatusDefinition> {
        self.find(code).filter(|def| def.is_active())
    }

    /// Returns the active default status, if any.
    #[must_use]
    pub fn default_status(&self) -> Option<&StatusDefinition> {
        self.definitions
            .iter()
            .find(|def| def.is_default() && def.is_active())
    }

    /// Returns the canonical done code.
    #[must_use]
    pub const fn done_code(&self) -> &StatusCode {
        &self.done_code
    }

    /// Returns the canonical cancelled code.
    #[must_use]
    pub const fn cancelled_code(&self) -> &StatusCode {
        &self.cancelled_code
    }

    /// Returns whether `code` is the canonical done code.
    #[must_use]
    pub fn is_done(&self, code: &StatusCode) -> bool {
        &self.done_code == code
    }

    /// Returns whether `code` is done or cancelled.
    #[must_use]
    pub fn is_terminal(&self, code: &StatusCode) -> bool {
        &self.done_code == code || &self.cancelled_code == code
    }

    /// Returns whether `code` names a final status.
    #[must_use]
    pub fn is_final(&self, code: &StatusCode) -> bool {
        self.find(code).is_some_and(StatusDefinition::is_final)
    }

    /// Returns the label for `code`, falling back to the code itself.
    #[must_use]
    pub fn label_for(&self, code: &StatusCode) -> String {
        self.find(code)
            .map_or_else(|| code.to_string(), |def| def.label().to_owned())
    }

    /// Appends a definition.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the resulting catalog would violate
    /// its invariants. The catalog is unchanged on error.
    pub fn add(&mut self, definition: StatusDefinition) -> Result<(), TaskDomainError> {
        let mut candidate = self.definitions.clone();
        candidate.push(definition);
        validate_definitions(&candidate)?;
        self.definitions = candidate;
        Ok(())
    }

    /// Soft-deletes a status. Tasks already in it keep resolving their label.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownStatus`] when the code is not
    /// defined.
    pub fn deactivate(&mut self, code: &StatusCode) -> Result<(), TaskDomainError> {
        self.definition_mut(code)?.active = false;
        Ok(())
    }

    /// Restores a soft-deleted status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownStatus`] when the code is not
    /// defined.
    pub fn activate(&mut self, code: &StatusCode) -> Result<(), TaskDomainError> {
        self.definition_mut(code)?.active = true;
        Ok(())
    }

    /// Makes `code` the only default status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownStatus`] when the code is not
    /// defined.
    pub fn set_default(&mut self, code: &StatusCode) -> Result<(), TaskDomainError> {
        if self.find(code).is_none() {
            return Err(TaskDomainError::UnknownStatus(code.clone()));
        }
        for def in &mut self.definitions {
            def.is_default = def.code() == code;
        }
        Ok(())
    }

    fn definition_mut(
        &mut self,
        code: &StatusCode,
    ) -> Result<&mut StatusDefinition, TaskDomainError> {
        self.definitions
            .iter_mut()
            .find(|def| def.code() == code)
            .ok_or_else(|| TaskDomainError::UnknownStatus(code.clone()))
    }
}

#[derive(Deserialize)]
struct StoredCatalog {
    definitions: Vec<StatusDefinition>,
    done_code: StatusCode,
    cancelled_code: StatusCode,
}

impl TryFrom<StoredCatalog> for StatusCatalog {
    type Error = TaskDomainError;

    fn try_from(stored: StoredCatalog) -> Result<Self, Self::Error> {
        Self::with_terminal_codes(stored.definitions, stored.done_code, stored.cancelled_code)
    }
}

fn validate_definitions(definitions: &[StatusDefinition]) -> Result<(), TaskDomainError> {
    let mut seen = HashSet::new();
    let mut default_code: Option<&StatusCode> = None;
    for def in definitions {
        if !seen.insert(def.code()) {
            return Err(TaskDomainError::DuplicateStatus(def.code().clone()));
        }
        if def.is_default() {
            if let Some(first) = default_code {
                return Err(TaskDomainError::MultipleDefaults {
                    first: first.clone(),
                    second: def.code().clone(),
                });
            }
            default_code = Some(def.code());
        }
    }

    for def in definitions {
        if let Some(dangling) = def
            .allowed_transitions()
            .iter()
            .find(|target| !seen.contains(target))
        {
            return Err(TaskDomainError::DanglingTransition {
                from: def.code().clone(),
                to: dangling.clone(),
            });
        }
    }
    Ok(())
}

impl Default for StatusCatalog {
    /// The stock workflow: to do, in progress, on hold, in review, done and
    /// cancelled.
    fn default() -> Self {
        let entries: [(&str, &str, &str, &[&str]); 6] = [
            ("TODO", "To Do", "gray", &["INPROGRESS", "ONHOLD", "CANCELLED"]),
            (
                "INPROGRESS",
                "In Progress",
                "blue",
                &["ONHOLD", "REVIEW", "DONE", "CANCELLED"],
            ),
            ("ONHOLD", "On Hold", "yellow", &["TODO", "INPROGRESS", "CANCELLED"]),
            ("REVIEW", "In Review", "purple", &["INPROGRESS", "DONE", "CANCELLED"]),
            ("DONE", "Done", "green", &[]),
            ("CANCELLED", "Cancelled", "red", &[]),
        ];

        let definitions = entries
            .into_iter()
            .map(|(code, label, color, transitions)| StatusDefinition {
                code: StatusCode(code.to_owned()),
                label: label.to_owned(),
                color: color.to_owned(),
                is_final: transitions.is_empty(),
                is_default: code == "TODO",
                allowed_transitions: transitions
                    .iter()
                    .map(|target| StatusCode((*target).to_owned()))
                    .collect(),
                active: true,
            })
            .collect();

        Self {
            definitions,
            done_code: StatusCode(Self::DONE.to_owned()),
            cancelled_code: StatusCode(Self::CANCELLED.to_owned()),
        }
    }
}
