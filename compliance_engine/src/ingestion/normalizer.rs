//! Day-boundary normalization of raw dispatch instructions.
//!
//! The store only holds day-bounded dispatch events, so an instruction that
//! straddles midnight is split at each boundary and its totals are
//! time-weighted proportionally to each segment's share of the interval.
//! Summing the emitted events' `cumulative_duration_minutes`, `total_energy`
//! and `command_value` reproduces the single-interval totals.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{DispatchEvent, RawDispatchInstruction};
use crate::time::midnight;

const SECONDS_PER_MINUTE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Normalize one raw instruction into day-aligned dispatch events.
///
/// Always returns a non-empty ordered sequence whose `[start, end)` intervals
/// exactly reconstruct the input interval. A zero-length or inverted interval
/// fails with [`EngineError::InvalidDispatchInterval`].
///
/// Whether the interval crosses a boundary is decided on `end - 1s`, so an
/// exact midnight-to-midnight instruction stays a single full-day event.
pub fn normalize(instruction: &RawDispatchInstruction) -> EngineResult<Vec<DispatchEvent>> {
    let start = timestamp(instruction.start_time)?;
    let end = timestamp(instruction.end_time)?;
    if start >= end {
        return Err(EngineError::InvalidDispatchInterval { start, end });
    }

    let total_seconds = Decimal::from((end - start).num_seconds());
    let duration_minutes = minutes(total_seconds);
    let total_energy = instruction.command_value * duration_minutes;

    // "End minus one second", not end itself: 00:00 -> 00:00 next day is a
    // single full-day event.
    let last_day = (end - Duration::seconds(1)).date_naive();
    if start.date_naive() == last_day {
        return Ok(vec![segment(
            instruction,
            start,
            end,
            instruction.command_value,
            duration_minutes,
            total_energy,
        )]);
    }

    let mut boundaries = vec![start];
    let mut day = start.date_naive().succ_opt();
    while let Some(d) = day {
        if d > last_day {
            break;
        }
        boundaries.push(midnight(d));
        day = d.succ_opt();
    }
    boundaries.push(end);

    // Duration and energy come from each segment's own length, not from a
    // fraction of the totals: seconds / 60 is exact for second-aligned
    // boundaries, while fraction-weighting a whole day would round it to
    // 1439.999... minutes. Only the command-value share needs the fraction.
    let mut events = Vec::with_capacity(boundaries.len() - 1);
    for pair in boundaries.windows(2) {
        let (seg_start, seg_end) = (pair[0], pair[1]);
        let seg_seconds = Decimal::from((seg_end - seg_start).num_seconds());
        let seg_minutes = minutes(seg_seconds);
        events.push(segment(
            instruction,
            seg_start,
            seg_end,
            instruction.command_value * (seg_seconds / total_seconds),
            seg_minutes,
            instruction.command_value * seg_minutes,
        ));
    }
    Ok(events)
}

fn minutes(seconds: Decimal) -> Decimal {
    seconds / SECONDS_PER_MINUTE
}

fn timestamp(epoch_seconds: i64) -> EngineResult<DateTime<Utc>> {
    // Out-of-range epochs are rejected the same way as inverted intervals.
    DateTime::from_timestamp(epoch_seconds, 0).ok_or(EngineError::InvalidDispatchInterval {
        start: DateTime::UNIX_EPOCH,
        end: DateTime::UNIX_EPOCH,
    })
}

fn segment(
    instruction: &RawDispatchInstruction,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    command_value: Decimal,
    duration_minutes: Decimal,
    total_energy: Decimal,
) -> DispatchEvent {
    DispatchEvent {
        event_id: instruction.event_id.clone(),
        contract_id: instruction.contract_id,
        control_id: instruction.control_id.clone(),
        start_time: start,
        end_time: end,
        command_value,
        cumulative_duration_minutes: duration_minutes,
        total_energy,
        status: instruction.status.clone(),
        control_type: instruction.control_type.clone(),
    }
}
