//! Domain types representing budget periods.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;
use crate::errors::{BudgetError, Result};

/// A date range over which a family's budget limits apply.
///
/// Periods for the same family may overlap and may all be non-archived at
/// once; that is accepted data, and the resolver disambiguates. Archiving is
/// a soft disable; hard deletion removes the period while leaving its
/// categories behind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetPeriod {
    pub id: Uuid,
    pub family_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl BudgetPeriod {
    pub fn new(
        family_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        if end_date < start_date {
            return Err(BudgetError::InvalidArgument(
                "period end date must not precede its start date".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            family_id: family_id.into(),
            start_date,
            end_date,
            is_archived: false,
            created_at: Utc::now(),
        })
    }

    /// Date-only containment check; both bounds are inclusive, so the end
    /// date counts through 23:59:59 of that day.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

impl Identifiable for BudgetPeriod {
    fn id(&self) -> Uuid {
        self.id
    }
}
