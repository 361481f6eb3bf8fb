use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// The timeline windows of a hackathon.
///
/// Newer hackathons carry explicit start/end pairs per phase. Older rows
/// only have the three single deadlines; every gate falls back to those when
/// a window is not configured. On write the legacy fields are re-derived
/// from the windows (see [`Timeline::normalize`]) so the two representations
/// cannot drift apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub team_joining_start: Option<DateTime<Utc>>,
    pub team_joining_end: Option<DateTime<Utc>>,
    pub submission_start: Option<DateTime<Utc>>,
    pub submission_end: Option<DateTime<Utc>>,
    pub mentor_assignment_start: Option<DateTime<Utc>>,
    pub mentor_assignment_end: Option<DateTime<Utc>>,
    pub judging_start: Option<DateTime<Utc>>,
    pub judging_end: Option<DateTime<Utc>>,

    pub team_deadline: Option<DateTime<Utc>>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub judging_deadline: Option<DateTime<Utc>>,
}

/// The outcome of evaluating a gate at a point in time.
///
/// Gates return a variant rather than a bare boolean so callers don't each
/// re-derive which boundary was violated when building an error message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Gate {
    Open,
    NotStarted { opens_at: DateTime<Utc> },
    Ended { ended_at: DateTime<Utc> },
    /// Between the end of submissions and the start of judging.
    Gap { until: DateTime<Utc> },
    /// No window and no legacy deadline configured. Fails closed.
    Unscheduled,
}

impl Gate {
    pub fn is_open(&self) -> bool {
        matches!(self, Gate::Open)
    }

    /// Map a non-open gate to a timeline violation naming the action, so
    /// every call site reports boundary diagnostics the same way.
    pub fn require_open(&self, action: &str) -> Result<()> {
        match self {
            Gate::Open => Ok(()),
            Gate::NotStarted { opens_at } => Err(AppError::Timeline(format!(
                "{} has not started yet (opens {})",
                action,
                opens_at.to_rfc3339()
            ))),
            Gate::Ended { ended_at } => Err(AppError::Timeline(format!(
                "{} has ended ({})",
                action,
                ended_at.to_rfc3339()
            ))),
            Gate::Gap { until } => Err(AppError::Timeline(format!(
                "{} is locked during the gap period until judging begins ({})",
                action,
                until.to_rfc3339()
            ))),
            Gate::Unscheduled => Err(AppError::Timeline(format!(
                "{} window is not configured for this hackathon",
                action
            ))),
        }
    }
}

/// Single derived phase, computed from timestamps only. The persisted
/// `status` column is a publish flag and plays no part here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Upcoming,
    Registration,
    Submission,
    /// Gap between submission close and judging start; submissions frozen.
    Locked,
    Judging,
    Finished,
}

impl Timeline {
    /// Evaluate a `[start, end]` window, falling back to a legacy
    /// "open until" deadline when the window is not fully configured.
    fn window(
        now: DateTime<Utc>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        legacy_deadline: Option<DateTime<Utc>>,
    ) -> Gate {
        match (start, end) {
            (Some(start), Some(end)) => {
                if now < start {
                    Gate::NotStarted { opens_at: start }
                } else if now > end {
                    Gate::Ended { ended_at: end }
                } else {
                    Gate::Open
                }
            }
            _ => match legacy_deadline {
                Some(deadline) if now <= deadline => Gate::Open,
                Some(deadline) => Gate::Ended { ended_at: deadline },
                None => Gate::Unscheduled,
            },
        }
    }

    pub fn team_joining(&self, now: DateTime<Utc>) -> Gate {
        Self::window(
            now,
            self.team_joining_start,
            self.team_joining_end,
            self.team_deadline,
        )
    }

    /// The submission gate. An `Ended` result is refined to `Gap` while
    /// judging has not yet started: submissions are frozen in that window
    /// rather than merely closed, and callers report it differently.
    pub fn submission(&self, now: DateTime<Utc>) -> Gate {
        let gate = Self::window(
            now,
            self.submission_start,
            self.submission_end,
            self.submission_deadline,
        );
        match (gate, self.judging_start) {
            (Gate::Ended { .. }, Some(judging_start)) if now < judging_start => {
                Gate::Gap { until: judging_start }
            }
            (gate, _) => gate,
        }
    }

    /// True when `now` falls after the submission window but before judging.
    pub fn in_submission_judging_gap(&self, now: DateTime<Utc>) -> bool {
        matches!(self.submission(now), Gate::Gap { .. })
    }

    /// Mentors retain access to their teams up until judging starts, not
    /// just during the assignment window itself. On legacy rows judging
    /// starts at the submission deadline (its alias), so the extension
    /// falls back to that, then to the judging close.
    pub fn mentor_access(&self, now: DateTime<Utc>) -> Gate {
        let gate = Self::window(
            now,
            self.mentor_assignment_start,
            self.mentor_assignment_end,
            self.team_deadline,
        );
        if gate.is_open() {
            return gate;
        }
        let judging_from = self
            .judging_start
            .or(self.submission_deadline)
            .or_else(|| self.judging_close());
        match judging_from {
            Some(start) if now < start => Gate::Open,
            Some(start) => Gate::Ended { ended_at: start },
            None => gate,
        }
    }

    pub fn judging(&self, now: DateTime<Utc>) -> Gate {
        Self::window(
            now,
            self.judging_start,
            self.judging_end,
            self.judging_deadline,
        )
    }

    /// Moment after which judges may be assigned to teams: submissions must
    /// have closed. Prefers the window end, falls back to the legacy field.
    pub fn submission_close(&self) -> Option<DateTime<Utc>> {
        self.submission_end.or(self.submission_deadline)
    }

    /// Final judging cutoff.
    pub fn judging_close(&self) -> Option<DateTime<Utc>> {
        self.judging_end.or(self.judging_deadline)
    }

    /// Derive the single lifecycle phase from the timestamps.
    pub fn phase(&self, now: DateTime<Utc>) -> Phase {
        if self.team_joining(now).is_open() {
            return Phase::Registration;
        }
        if self.submission(now).is_open() {
            return Phase::Submission;
        }
        if self.in_submission_judging_gap(now) {
            return Phase::Locked;
        }
        match self.judging(now) {
            Gate::Open => Phase::Judging,
            Gate::NotStarted { .. } | Gate::Unscheduled => {
                // Nothing open yet and judging not reached.
                if self
                    .team_joining_start
                    .or(self.submission_start)
                    .map(|start| now < start)
                    .unwrap_or(false)
                {
                    Phase::Upcoming
                } else {
                    Phase::Locked
                }
            }
            Gate::Ended { .. } | Gate::Gap { .. } => Phase::Finished,
        }
    }

    /// Re-derive the legacy deadline aliases from the window boundaries.
    /// Called by the hackathon service on every write; a window set without
    /// its alias would make old and new gating logic diverge.
    pub fn normalize(&mut self) {
        if let Some(at) = self.mentor_assignment_start {
            self.team_deadline = Some(at);
        }
        if let Some(at) = self.judging_start {
            self.submission_deadline = Some(at);
        }
        if let Some(at) = self.judging_end {
            self.judging_deadline = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(hours: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(hours)
    }

    fn windowed() -> Timeline {
        Timeline {
            team_joining_start: Some(at(0)),
            team_joining_end: Some(at(24)),
            submission_start: Some(at(24)),
            submission_end: Some(at(72)),
            mentor_assignment_start: Some(at(24)),
            mentor_assignment_end: Some(at(72)),
            judging_start: Some(at(120)),
            judging_end: Some(at(144)),
            ..Default::default()
        }
    }

    #[test]
    fn legacy_only_team_joining_matches_deadline() {
        let timeline = Timeline {
            team_deadline: Some(at(10)),
            ..Default::default()
        };
        assert!(timeline.team_joining(at(9)).is_open());
        assert!(timeline.team_joining(at(10)).is_open());
        assert_eq!(
            timeline.team_joining(at(11)),
            Gate::Ended { ended_at: at(10) }
        );
    }

    #[test]
    fn windowed_team_joining_ignores_legacy_fields() {
        let mut timeline = windowed();
        // Conflicting legacy value must be ignored once the window is set.
        timeline.team_deadline = Some(at(500));
        assert_eq!(
            timeline.team_joining(at(-1)),
            Gate::NotStarted { opens_at: at(0) }
        );
        assert!(timeline.team_joining(at(0)).is_open());
        assert!(timeline.team_joining(at(24)).is_open());
        assert_eq!(
            timeline.team_joining(at(25)),
            Gate::Ended { ended_at: at(24) }
        );
    }

    #[test]
    fn unscheduled_window_fails_closed() {
        let timeline = Timeline::default();
        assert_eq!(timeline.team_joining(at(0)), Gate::Unscheduled);
        assert!(timeline.team_joining(at(0)).require_open("Team joining").is_err());
    }

    #[test]
    fn submission_gap_between_close_and_judging() {
        // submission_end = T, judging_start = T+48h; at T+1h the gate must
        // report the gap, not a plain close.
        let timeline = windowed();
        assert!(timeline.submission(at(72)).is_open());
        assert_eq!(
            timeline.submission(at(73)),
            Gate::Gap { until: at(120) }
        );
        assert!(timeline.in_submission_judging_gap(at(73)));
        let err = timeline.submission(at(73)).require_open("Submission").unwrap_err();
        assert!(err.to_string().contains("gap period"));
        // Once judging starts it is a plain Ended again.
        assert_eq!(
            timeline.submission(at(121)),
            Gate::Ended { ended_at: at(72) }
        );
    }

    #[test]
    fn legacy_submission_deadline_also_gaps_before_judging() {
        let timeline = Timeline {
            submission_deadline: Some(at(72)),
            judging_start: Some(at(120)),
            judging_end: Some(at(144)),
            ..Default::default()
        };
        assert!(timeline.submission(at(71)).is_open());
        assert_eq!(timeline.submission(at(73)), Gate::Gap { until: at(120) });
    }

    #[test]
    fn mentor_access_extends_to_judging_start() {
        let timeline = windowed();
        assert!(timeline.mentor_access(at(50)).is_open());
        // Past the assignment window but before judging: still open.
        assert!(timeline.mentor_access(at(100)).is_open());
        assert_eq!(
            timeline.mentor_access(at(121)),
            Gate::Ended { ended_at: at(120) }
        );
    }

    #[test]
    fn mentor_access_on_legacy_rows_lasts_until_the_submission_deadline() {
        let timeline = Timeline {
            team_deadline: Some(at(24)),
            submission_deadline: Some(at(120)),
            judging_deadline: Some(at(144)),
            ..Default::default()
        };
        assert!(timeline.mentor_access(at(20)).is_open());
        // Past the team deadline but judging (= the submission deadline
        // alias) not yet reached: still open.
        assert!(timeline.mentor_access(at(50)).is_open());
        assert_eq!(
            timeline.mentor_access(at(121)),
            Gate::Ended { ended_at: at(120) }
        );
    }

    #[test]
    fn phase_progression() {
        let timeline = windowed();
        assert_eq!(timeline.phase(at(-5)), Phase::Upcoming);
        assert_eq!(timeline.phase(at(5)), Phase::Registration);
        assert_eq!(timeline.phase(at(48)), Phase::Submission);
        assert_eq!(timeline.phase(at(100)), Phase::Locked);
        assert_eq!(timeline.phase(at(130)), Phase::Judging);
        assert_eq!(timeline.phase(at(200)), Phase::Finished);
    }

    #[test]
    fn normalize_rederives_legacy_aliases() {
        let mut timeline = windowed();
        timeline.normalize();
        assert_eq!(timeline.team_deadline, Some(at(24)));
        assert_eq!(timeline.submission_deadline, Some(at(120)));
        assert_eq!(timeline.judging_deadline, Some(at(144)));
    }

    #[test]
    fn judging_gate_uses_window_then_legacy() {
        let timeline = windowed();
        assert_eq!(
            timeline.judging(at(100)),
            Gate::NotStarted { opens_at: at(120) }
        );
        assert!(timeline.judging(at(130)).is_open());

        let legacy = Timeline {
            judging_deadline: Some(at(144)),
            ..Default::default()
        };
        assert!(legacy.judging(at(100)).is_open());
        assert_eq!(legacy.judging(at(145)), Gate::Ended { ended_at: at(144) });
    }
}
