//! Guided cooking: instructions as navigable steps plus one countdown.
//!
//! The countdown is driven by one-second ticks the shell delivers. Every start
//! or stop bumps `generation`; a tick only counts if it carries the current
//! generation, so at most one countdown is ever live.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::RecipeId;
use crate::DEFAULT_TIMER_MINUTES;

/// Split free-text instructions into non-blank, trimmed lines.
#[must_use]
pub fn parse_steps(instructions: &str) -> Vec<String> {
    instructions
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

const MINUTE_UNITS: [&str; 2] = ["min", "dakika"];

fn starts_with_unit(rest: &str) -> bool {
    MINUTE_UNITS.iter().any(|unit| {
        rest.get(..unit.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(unit))
    })
}

/// First `<integer> min` / `<integer> minute(s)` / `<integer> dakika` in `text`.
///
/// Numbers too large to represent fall back to [`DEFAULT_TIMER_MINUTES`]; a
/// zero-minute mention is not a suggestion.
#[must_use]
pub fn detect_minutes(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let digits = &text[start..i];
        let rest = text[i..].trim_start();
        if starts_with_unit(rest) {
            let minutes = digits.parse::<u32>().unwrap_or(DEFAULT_TIMER_MINUTES);
            return (minutes > 0).then_some(minutes);
        }
    }
    None
}

/// `MM:SS`, minutes grow past two digits when needed.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub initial_seconds: u32,
    pub running: bool,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale generation or idle timer.
    Ignored,
    /// Schedule the next tick for this generation.
    Continue(u64),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookingSession {
    recipe_id: RecipeId,
    title: String,
    steps: Vec<String>,
    current: usize,
    timer: TimerState,
    keep_screen_on: bool,
}

impl CookingSession {
    #[must_use]
    pub fn new(recipe_id: RecipeId, title: impl Into<String>, instructions: &str) -> Self {
        Self {
            recipe_id,
            title: title.into(),
            steps: parse_steps(instructions),
            current: 0,
            timer: TimerState::default(),
            keep_screen_on: true,
        }
    }

    #[must_use]
    pub fn recipe_id(&self) -> &RecipeId {
        &self.recipe_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    #[must_use]
    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&str> {
        self.steps.get(self.current).map(String::as_str)
    }

    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    /// Fraction of steps reached, `0.0` when there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f32 {
        if self.steps.is_empty() {
            0.0
        } else {
            (self.current + 1) as f32 / self.steps.len() as f32
        }
    }

    pub fn next_step(&mut self) {
        if self.current + 1 < self.steps.len() {
            self.current += 1;
        }
    }

    pub fn previous_step(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    #[must_use]
    pub fn timer(&self) -> TimerState {
        self.timer
    }

    #[must_use]
    pub fn keep_screen_on(&self) -> bool {
        self.keep_screen_on
    }

    pub fn toggle_keep_screen_on(&mut self) {
        self.keep_screen_on = !self.keep_screen_on;
    }

    /// Replaces any running countdown. Returns the generation whose first tick
    /// must be scheduled, or `None` for a zero-length timer.
    pub fn start_timer(&mut self, minutes: u32) -> Option<u64> {
        if minutes == 0 {
            warn!(recipe_id = %self.recipe_id, "ignoring zero-minute timer");
            return None;
        }
        let seconds = minutes.saturating_mul(60);
        self.timer = TimerState {
            remaining_seconds: seconds,
            initial_seconds: seconds,
            running: true,
            generation: self.timer.generation.wrapping_add(1),
        };
        debug!(generation = self.timer.generation, seconds, "timer started");
        Some(self.timer.generation)
    }

    /// Returns the generation that was cancelled, if a countdown was live.
    pub fn stop_timer(&mut self) -> Option<u64> {
        if !self.timer.running {
            return None;
        }
        let cancelled = self.timer.generation;
        self.timer.running = false;
        self.timer.generation = cancelled.wrapping_add(1);
        debug!(generation = cancelled, "timer stopped");
        Some(cancelled)
    }

    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if !self.timer.running || generation != self.timer.generation {
            debug!(generation, current = self.timer.generation, "stale timer tick");
            return TickOutcome::Ignored;
        }
        self.timer.remaining_seconds = self.timer.remaining_seconds.saturating_sub(1);
        if self.timer.remaining_seconds == 0 {
            self.timer.running = false;
            TickOutcome::Finished
        } else {
            TickOutcome::Continue(generation)
        }
    }

    /// Duration hinted by the current step, offered only while idle.
    #[must_use]
    pub fn suggested_minutes(&self) -> Option<u32> {
        if self.timer.running {
            return None;
        }
        self.current_step().and_then(detect_minutes)
    }
}
