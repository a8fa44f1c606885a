//! Deidentification policy configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Toggles controlling what the deidentifier touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeidentifyOptions {
    pub remove_patient_name: bool,
    #[serde(rename = "removePatientID", alias = "removePatientId")]
    pub remove_patient_id: bool,
    pub remove_dates: bool,
    pub shift_dates: bool,
    pub remove_institution: bool,
    pub remove_physicians: bool,
    #[serde(rename = "anonymizeUIDs", alias = "anonymizeUids")]
    pub anonymize_uids: bool,
    pub keep_series_info: bool,
    /// Days subtracted from every date when `shift_dates` is set
    pub date_shift_days: i64,
}

impl Default for DeidentifyOptions {
    fn default() -> Self {
        Self {
            remove_patient_name: true,
            remove_patient_id: true,
            remove_dates: true,
            shift_dates: false,
            remove_institution: true,
            remove_physicians: true,
            anonymize_uids: true,
            keep_series_info: true,
            date_shift_days: 0,
        }
    }
}

/// A single reason an options value should not be used as is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("removeDates and shiftDates are mutually exclusive")]
    ConflictingDateOptions,

    #[error("shiftDates is enabled but dateShiftDays is not set")]
    MissingShiftDays,

    #[error("dateShiftDays must be positive (got {0})")]
    NonPositiveShiftDays(i64),
}

/// Advisory rejection of an options value, carrying every violation found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeidentificationPolicyInvalid(pub Vec<PolicyViolation>);

impl fmt::Display for DeidentificationPolicyInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid deidentification options: ")?;
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DeidentificationPolicyInvalid {}

/// Partial change to a [`DeidentifyOptions`]; `None` leaves a field alone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsUpdate {
    pub remove_patient_name: Option<bool>,
    #[serde(rename = "removePatientID", alias = "removePatientId")]
    pub remove_patient_id: Option<bool>,
    pub remove_dates: Option<bool>,
    pub shift_dates: Option<bool>,
    pub remove_institution: Option<bool>,
    pub remove_physicians: Option<bool>,
    #[serde(rename = "anonymizeUIDs", alias = "anonymizeUids")]
    pub anonymize_uids: Option<bool>,
    pub keep_series_info: Option<bool>,
    pub date_shift_days: Option<i64>,
}

impl DeidentifyOptions {
    /// List human-readable problems with this options value
    #[must_use]
    pub fn validate(&self) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();
        if self.remove_dates && self.shift_dates {
            violations.push(PolicyViolation::ConflictingDateOptions);
        }
        if self.shift_dates && self.date_shift_days == 0 {
            violations.push(PolicyViolation::MissingShiftDays);
        }
        if self.date_shift_days < 0 {
            violations.push(PolicyViolation::NonPositiveShiftDays(self.date_shift_days));
        }
        violations
    }

    /// [`validate`](Self::validate) as a `Result`
    pub fn check(&self) -> Result<(), DeidentificationPolicyInvalid> {
        let violations = self.validate();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DeidentificationPolicyInvalid(violations))
        }
    }

    /// Apply a partial update. Enabling `remove_dates` clears `shift_dates`
    /// and the other way round; enabling both in one update keeps
    /// `remove_dates`.
    pub fn apply(&mut self, update: &OptionsUpdate) {
        let OptionsUpdate {
            remove_patient_name,
            remove_patient_id,
            remove_dates,
            shift_dates,
            remove_institution,
            remove_physicians,
            anonymize_uids,
            keep_series_info,
            date_shift_days,
        } = *update;

        if let Some(v) = remove_patient_name {
            self.remove_patient_name = v;
        }
        if let Some(v) = remove_patient_id {
            self.remove_patient_id = v;
        }
        if let Some(v) = remove_institution {
            self.remove_institution = v;
        }
        if let Some(v) = remove_physicians {
            self.remove_physicians = v;
        }
        if let Some(v) = anonymize_uids {
            self.anonymize_uids = v;
        }
        if let Some(v) = keep_series_info {
            self.keep_series_info = v;
        }
        if let Some(v) = date_shift_days {
            self.date_shift_days = v;
        }

        if let Some(v) = shift_dates {
            self.shift_dates = v;
            if v {
                self.remove_dates = false;
            }
        }
        if let Some(v) = remove_dates {
            self.remove_dates = v;
            if v {
                self.shift_dates = false;
            }
        }
    }

    /// Shift to apply to dates, if any. Removal takes precedence.
    #[must_use]
    pub fn effective_date_shift(&self) -> Option<i64> {
        (self.shift_dates && !self.remove_dates).then_some(self.date_shift_days)
    }
}
