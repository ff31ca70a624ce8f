//! Tween timelines over named targets.
//!
//! A [`Timeline`] holds tweens placed at absolute times. Rendering the
//! timeline at a given time folds every tween, in insertion order, over the
//! base style of its target. Timelines can be scrubbed with
//! [`Timeline::set_progress`] or driven by a clock through [`Timeline::tick`].

use std::collections::BTreeMap;

use super::easing::Ease;
use super::style::{Style, StyleProps};

/// What a tween animates and how
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenVars {
    pub props: StyleProps,
    /// Seconds
    pub duration: f64,
    pub ease: Ease,
    /// Seconds between the starts of consecutive targets
    pub stagger: f64,
    /// Seconds added to the tween's position
    pub delay: f64,
}

impl TweenVars {
    pub fn new(props: StyleProps, duration: f64, ease: Ease) -> Self {
        TweenVars {
            props,
            duration,
            ease,
            stagger: 0.0,
            delay: 0.0,
        }
    }

    pub fn stagger(mut self, stagger: f64) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Where a tween is inserted
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    /// After everything already on the timeline
    #[default]
    End,
    /// At an absolute time in seconds
    At(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone)]
struct Tween {
    target: String,
    start: f64,
    duration: f64,
    ease: Ease,
    from: StyleProps,
    to: StyleProps,
    /// `from` tweens show their start values before they begin
    render_before_start: bool,
}

impl Tween {
    fn local_progress(&self, time: f64) -> Option<f64> {
        if time < self.start {
            return self.render_before_start.then_some(0.0);
        }
        if self.duration <= 0.0 || time >= self.end() {
            return Some(1.0);
        }
        Some(((time - self.start) / self.duration).min(1.0))
    }

    fn end(&self) -> f64 {
        self.start + self.duration.max(0.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    base: BTreeMap<String, Style>,
    tweens: Vec<Tween>,
    time: f64,
    playing: Option<Direction>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set properties of a target immediately, outside of any tween
    pub fn set(&mut self, target: &str, props: StyleProps) -> &mut Self {
        self.base
            .entry(target.to_string())
            .or_default()
            .apply(&props);
        self
    }

    /// Tween each target from its current values to `vars.props`
    pub fn to<S: AsRef<str>>(&mut self, targets: &[S], vars: TweenVars, at: Position) -> &mut Self {
        self.insert(targets, vars, at, false)
    }

    /// Tween each target from `vars.props` to its current values
    pub fn from<S: AsRef<str>>(
        &mut self,
        targets: &[S],
        vars: TweenVars,
        at: Position,
    ) -> &mut Self {
        self.insert(targets, vars, at, true)
    }

    fn insert<S: AsRef<str>>(
        &mut self,
        targets: &[S],
        vars: TweenVars,
        at: Position,
        reversed: bool,
    ) -> &mut Self {
        let origin = match at {
            Position::End => self.duration(),
            Position::At(t) => t.max(0.0),
        } + vars.delay;

        for (i, target) in targets.iter().enumerate() {
            let target = target.as_ref();
            let current = vars.props.sample(&self.settled_style(target));
            let (from, to) = if reversed {
                (vars.props, current)
            } else {
                (current, vars.props)
            };
            self.tweens.push(Tween {
                target: target.to_string(),
                start: origin + vars.stagger * i as f64,
                duration: vars.duration,
                ease: vars.ease,
                from,
                to,
                render_before_start: reversed,
            });
        }
        self
    }

    /// Style of a target once every tween on it has finished
    fn settled_style(&self, target: &str) -> Style {
        let mut style = self.base.get(target).copied().unwrap_or_default();
        for tween in self.tweens.iter().filter(|t| t.target == target) {
            style.apply(&tween.to);
        }
        style
    }

    /// Total length in seconds
    pub fn duration(&self) -> f64 {
        self.tweens.iter().map(Tween::end).fold(0.0, f64::max)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration <= 0.0 {
            return 0.0;
        }
        self.time / duration
    }

    /// Jump to a point in the timeline; `p` is clamped to `[0, 1]`
    pub fn set_progress(&mut self, p: f64) {
        let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        self.time = p * self.duration();
    }

    pub fn seek(&mut self, time: f64) {
        self.time = time.clamp(0.0, self.duration());
    }

    pub fn play(&mut self) {
        self.playing = Some(Direction::Forward);
    }

    pub fn reverse(&mut self) {
        self.playing = Some(Direction::Backward);
    }

    pub fn pause(&mut self) {
        self.playing = None;
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// Advance a playing timeline by `dt` seconds. Returns whether it is
    /// still playing afterwards.
    pub fn tick(&mut self, dt: f64) -> bool {
        let Some(direction) = self.playing else {
            return false;
        };
        let duration = self.duration();
        match direction {
            Direction::Forward => {
                self.time = (self.time + dt).min(duration);
                if self.time >= duration {
                    self.playing = None;
                }
            }
            Direction::Backward => {
                self.time = (self.time - dt).max(0.0);
                if self.time <= 0.0 {
                    self.playing = None;
                }
            }
        }
        self.playing.is_some()
    }

    /// Names of every target on the timeline
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self
            .base
            .keys()
            .map(String::as_str)
            .chain(self.tweens.iter().map(|t| t.target.as_str()))
            .collect();
        names.sort_unstable();
        names.dedup();
        names.into_iter()
    }

    /// Style of one target at the current time
    pub fn style_of(&self, target: &str) -> Style {
        let mut style = self.base.get(target).copied().unwrap_or_default();
        for tween in self.tweens.iter().filter(|t| t.target == target) {
            if let Some(p) = tween.local_progress(self.time) {
                style.blend(&tween.from, &tween.to, tween.ease.apply(p));
            }
        }
        style
    }

    /// Styles of every target at the current time
    pub fn render(&self) -> BTreeMap<String, Style> {
        self.targets()
            .map(|target| (target.to_string(), self.style_of(target)))
            .collect()
    }

    /// Drop every tween and base style
    pub fn kill(&mut self) {
        self.base.clear();
        self.tweens.clear();
        self.time = 0.0;
        self.playing = None;
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.tweens.is_empty()
    }
}
