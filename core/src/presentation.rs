//! Report reveal animations.
//!
//! Pure state machines advanced by the host's tick. Nothing here owns a timer,
//! so non-interactive callers can [`ReportPresentation::skip`] straight to the
//! final frame. None of it touches the record store.

use std::time::Duration;

use crate::advisory::AdvisoryReport;
use crate::config::PresentationConfig;

/// Integer count-up from `start` to `end` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTween {
    start: u8,
    end: u8,
    duration: Duration,
}

impl ScoreTween {
    pub fn new(start: u8, end: u8, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
        }
    }

    /// `floor(progress * (end - start) + start)`.
    pub fn value_at(&self, elapsed: Duration) -> u8 {
        if self.duration.is_zero() {
            return self.end;
        }
        let progress = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        let start = f64::from(self.start);
        let end = f64::from(self.end);
        (progress * (end - start) + start).floor() as u8
    }

    pub fn is_done(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// Character-by-character text reveal. The first character shows at once,
/// then one more per `interval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typewriter {
    text: String,
    total: usize,
    revealed: usize,
    interval: Duration,
    carry: Duration,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, interval: Duration) -> Self {
        let mut typewriter = Self {
            text: String::new(),
            total: 0,
            revealed: 0,
            interval,
            carry: Duration::ZERO,
        };
        typewriter.restart(text);
        typewriter
    }

    /// Start over with new text.
    pub fn restart(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.total = self.text.chars().count();
        self.revealed = self.total.min(1);
        self.carry = Duration::ZERO;
    }

    /// Advance by `delta`. Returns whether more text became visible.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if self.is_done() {
            return false;
        }
        if self.interval.is_zero() {
            self.skip();
            return true;
        }
        self.carry += delta;
        let interval = self.interval.as_nanos();
        let steps = self.carry.as_nanos() / interval;
        self.carry = Duration::from_nanos((self.carry.as_nanos() % interval) as u64);
        let before = self.revealed;
        self.revealed = self
            .total
            .min(self.revealed.saturating_add(usize::try_from(steps).unwrap_or(usize::MAX)));
        self.revealed != before
    }

    pub fn skip(&mut self) {
        self.revealed = self.total;
        self.carry = Duration::ZERO;
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.total
    }

    /// The revealed prefix.
    pub fn visible(&self) -> &str {
        let end = self
            .text
            .char_indices()
            .nth(self.revealed)
            .map_or(self.text.len(), |(index, _)| index);
        &self.text[..end]
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Colour class of a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictTone {
    Positive,
    Negative,
}

impl VerdictTone {
    pub fn for_score(score: u8) -> Self {
        if score > 60 {
            VerdictTone::Positive
        } else {
            VerdictTone::Negative
        }
    }
}

/// Everything the detail view animates for one finished report.
#[derive(Debug, Clone)]
pub struct ReportPresentation {
    report: AdvisoryReport,
    tween: ScoreTween,
    typewriter: Typewriter,
    elapsed: Duration,
}

impl ReportPresentation {
    pub fn new(report: AdvisoryReport, config: &PresentationConfig) -> Self {
        let tween = ScoreTween::new(0, report.score, config.score_animation());
        let typewriter = Typewriter::new(report.summary.clone(), config.typing_interval());
        Self {
            report,
            tween,
            typewriter,
            elapsed: Duration::ZERO,
        }
    }

    pub fn tick(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
        self.typewriter.tick(delta);
    }

    /// Jump to the final frame.
    pub fn skip(&mut self) {
        self.elapsed = self.elapsed.max(self.tween.duration);
        self.typewriter.skip();
    }

    pub fn is_done(&self) -> bool {
        self.tween.is_done(self.elapsed) && self.typewriter.is_done()
    }

    pub fn score(&self) -> u8 {
        self.tween.value_at(self.elapsed)
    }

    pub fn verdict(&self) -> &str {
        &self.report.verdict
    }

    pub fn tone(&self) -> VerdictTone {
        VerdictTone::for_score(self.report.score)
    }

    pub fn summary(&self) -> &str {
        self.typewriter.visible()
    }

    pub fn report(&self) -> &AdvisoryReport {
        &self.report
    }
}
