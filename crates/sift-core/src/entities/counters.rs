use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Running PRISMA flow-diagram totals for one project.
///
/// A project without a stored record reads as all zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PrismaCounters {
    pub identified: u64,
    pub duplicates: u64,
    pub without_abstract: u64,
    pub screened: u64,
    pub included: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A relation between counters that is expected but not enforced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CounterAnomaly {
    /// `duplicates + without_abstract` exceeds `identified`.
    RejectedExceedIdentified { rejected: u64, identified: u64 },
    /// `screened` exceeds `identified`.
    ScreenedExceedsIdentified { screened: u64, identified: u64 },
    /// `included` exceeds `screened`.
    IncludedExceedsScreened { included: u64, screened: u64 },
}

impl PrismaCounters {
    /// Records that survived identification (not duplicate, had an abstract).
    #[must_use]
    pub const fn eligible_for_screening(&self) -> u64 {
        self.identified
            .saturating_sub(self.duplicates)
            .saturating_sub(self.without_abstract)
    }

    /// Screened records that were not included.
    #[must_use]
    pub const fn excluded(&self) -> u64 {
        self.screened.saturating_sub(self.included)
    }

    /// List every expected relation the counters currently violate.
    ///
    /// The ledger never rejects a delta for these; callers decide whether a
    /// violation is worth surfacing.
    #[must_use]
    pub fn anomalies(&self) -> Vec<CounterAnomaly> {
        let mut found = Vec::new();
        let rejected = self.duplicates + self.without_abstract;
        if rejected > self.identified {
            found.push(CounterAnomaly::RejectedExceedIdentified {
                rejected,
                identified: self.identified,
            });
        }
        if self.screened > self.identified {
            found.push(CounterAnomaly::ScreenedExceedsIdentified {
                screened: self.screened,
                identified: self.identified,
            });
        }
        if self.included > self.screened {
            found.push(CounterAnomaly::IncludedExceedsScreened {
                included: self.included,
                screened: self.screened,
            });
        }
        found
    }
}

/// Signed increments applied to [`PrismaCounters`] in one ledger update.
///
/// Absent deltas are zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PrismaDelta {
    #[serde(default)]
    pub identified: i64,
    #[serde(default)]
    pub duplicates: i64,
    #[serde(default)]
    pub without_abstract: i64,
    #[serde(default)]
    pub screened: i64,
    #[serde(default)]
    pub included: i64,
}

impl PrismaDelta {
    /// True when applying this delta would change nothing.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.identified == 0
            && self.duplicates == 0
            && self.without_abstract == 0
            && self.screened == 0
            && self.included == 0
    }

    /// Field-wise sum of two deltas.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        Self {
            identified: self.identified + other.identified,
            duplicates: self.duplicates + other.duplicates,
            without_abstract: self.without_abstract + other.without_abstract,
            screened: self.screened + other.screened,
            included: self.included + other.included,
        }
    }
}
