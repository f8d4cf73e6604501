//! Work-type models.
//!
//! A day's work is described two ways: a single [`WorkType`] tag chosen by
//! priority, and [`WorkTypeMetadata`], which keeps the extended, holiday and
//! night flags independently.

use serde::{Deserialize, Serialize};

/// The single wage-rule category of a day's work.
///
/// # Example
///
/// ```
/// use payroll_engine::models::WorkType;
///
/// let json = serde_json::to_string(&WorkType::Overtime).unwrap();
/// assert_eq!(json, "\"overtime\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Ordinary weekday daytime work.
    Regular,
    /// Extended hours beyond the regular day.
    Overtime,
    /// Night work.
    Night,
    /// Work on a public holiday or a Sunday.
    Holiday,
}

impl std::fmt::Display for WorkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkType::Regular => write!(f, "regular"),
            WorkType::Overtime => write!(f, "overtime"),
            WorkType::Night => write!(f, "night"),
            WorkType::Holiday => write!(f, "holiday"),
        }
    }
}

/// Independent work-type flags stored alongside a work record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkTypeMetadata {
    /// The worker stayed beyond regular hours.
    #[serde(default)]
    pub extended: bool,
    /// The day was a holiday or a Sunday.
    #[serde(default)]
    pub holiday: bool,
    /// The work happened at night.
    #[serde(default)]
    pub night: bool,
}

impl WorkTypeMetadata {
    /// Collapses the flags into one tag: holiday > night > overtime > regular.
    ///
    /// ```
    /// use payroll_engine::models::{WorkType, WorkTypeMetadata};
    ///
    /// let flags = WorkTypeMetadata { extended: true, holiday: false, night: true };
    /// assert_eq!(flags.primary_work_type(), WorkType::Night);
    /// ```
    pub fn primary_work_type(&self) -> WorkType {
        if self.holiday {
            WorkType::Holiday
        } else if self.night {
            WorkType::Night
        } else if self.extended {
            WorkType::Overtime
        } else {
            WorkType::Regular
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_work_type_priority() {
        let all = WorkTypeMetadata {
            extended: true,
            holiday: true,
            night: true,
        };
        assert_eq!(all.primary_work_type(), WorkType::Holiday);

        let extended_only = WorkTypeMetadata {
            extended: true,
            ..Default::default()
        };
        assert_eq!(extended_only.primary_work_type(), WorkType::Overtime);

        assert_eq!(
            WorkTypeMetadata::default().primary_work_type(),
            WorkType::Regular
        );
    }

    #[test]
    fn test_work_type_display() {
        assert_eq!(WorkType::Holiday.to_string(), "holiday");
        assert_eq!(WorkType::Regular.to_string(), "regular");
    }

    #[test]
    fn test_metadata_missing_flags_default_false() {
        let flags: WorkTypeMetadata = serde_json::from_str(r#"{"night": true}"#).unwrap();
        assert!(flags.night);
        assert!(!flags.extended);
        assert!(!flags.holiday);
    }
}
