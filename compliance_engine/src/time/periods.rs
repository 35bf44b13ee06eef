//! Rolling-window start resolution.
//!
//! "Value for window X on day D" means "aggregate over qualifying events
//! with `start_time >= window_start(X, D)`". Anchors follow calendar
//! semantics in UTC: ISO weeks start on Monday, months on the 1st, years on
//! January 1.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};

use crate::error::{EngineError, EngineResult};
use crate::models::WindowKind;

/// Midnight UTC of a calendar day.
pub fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Compute the start timestamp of a rolling window for an evaluation date.
///
/// `program_start` anchors the PROGRAM_DURATION window; resolving that
/// window without one fails with [`EngineError::MissingProgramStartDate`].
/// Pure function, no I/O.
pub fn window_start(
    window: WindowKind,
    evaluation_date: NaiveDate,
    program_start: Option<NaiveDate>,
) -> EngineResult<DateTime<Utc>> {
    let anchor = match window {
        WindowKind::Day => evaluation_date,
        WindowKind::Week => evaluation_date.week(Weekday::Mon).first_day(),
        WindowKind::Month => evaluation_date.with_day(1).unwrap_or(evaluation_date),
        WindowKind::Year => {
            NaiveDate::from_ymd_opt(evaluation_date.year(), 1, 1).unwrap_or(evaluation_date)
        }
        WindowKind::ProgramDuration => {
            program_start.ok_or(EngineError::MissingProgramStartDate)?
        }
    };
    Ok(midnight(anchor))
}
