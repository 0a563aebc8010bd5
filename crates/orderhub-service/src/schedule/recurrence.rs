//! Next-run computation for recurring schedules.

use chrono::{DateTime, Days, Months, Utc};

use orderhub_core::error::AppError;
use orderhub_core::result::AppResult;
use orderhub_entity::schedule::Recurrence;

/// When a schedule that was due at `previous` should fire next.
///
/// `None` for one-shot schedules. The step is taken from the previous due
/// time, not from when it actually ran. Monthly steps clamp to the end of
/// shorter months (Jan 31 -> Feb 29 in a leap year).
///
/// Only the previous due time is stored, so a clamped day is not recovered
/// later: a schedule anchored on the 31st runs Jan 31, Feb 29, Mar 29 and
/// stays on the 29th from then on.
pub fn next_occurrence(
    recurrence: Recurrence,
    previous: DateTime<Utc>,
) -> AppResult<Option<DateTime<Utc>>> {
    let next = match recurrence {
        Recurrence::Once => return Ok(None),
        Recurrence::Daily => previous.checked_add_days(Days::new(1)),
        Recurrence::Weekly => previous.checked_add_days(Days::new(7)),
        Recurrence::Monthly => previous.checked_add_months(Months::new(1)),
    };
    next.map(Some).ok_or_else(|| {
        AppError::validation(format!(
            "Cannot advance {recurrence:?} schedule past {previous}: out of range"
        ))
    })
}
