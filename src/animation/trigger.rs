//! Scroll triggers: map a scroll position to progress through an element.

use std::str::FromStr;

use crate::error::Error;

/// Vertical extent of an element in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Bounds { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Fraction of the element inside a viewport of `viewport_height`
    /// scrolled to `scroll_y`
    pub fn visible_fraction(&self, scroll_y: f64, viewport_height: f64) -> f64 {
        if self.height <= 0.0 {
            return 0.0;
        }
        let top = self.top.max(scroll_y);
        let bottom = self.bottom().min(scroll_y + viewport_height);
        ((bottom - top) / self.height).clamp(0.0, 1.0)
    }
}

/// A position measured either as a fraction of a length or in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
    Fraction(f64),
    Pixels(f64),
}

impl Offset {
    fn resolve(&self, length: f64) -> f64 {
        match *self {
            Offset::Fraction(f) => f * length,
            Offset::Pixels(px) => px,
        }
    }
}

impl FromStr for Offset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::Validation(format!("invalid trigger offset: {}", s));
        match s {
            "top" => Ok(Offset::Fraction(0.0)),
            "center" => Ok(Offset::Fraction(0.5)),
            "bottom" => Ok(Offset::Fraction(1.0)),
            _ => {
                if let Some(pct) = s.strip_suffix('%') {
                    let pct: f64 = pct.parse().map_err(|_| invalid())?;
                    Ok(Offset::Fraction(pct / 100.0))
                } else {
                    let px = s.strip_suffix("px").unwrap_or(s);
                    px.parse().map(Offset::Pixels).map_err(|_| invalid())
                }
            }
        }
    }
}

/// "When this point of the element meets that point of the viewport",
/// written as in `"top 85%"` or `"bottom top"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerPoint {
    pub element: Offset,
    pub viewport: Offset,
}

impl TriggerPoint {
    /// Scroll position at which the point is reached
    pub fn scroll_position(&self, bounds: &Bounds, viewport_height: f64) -> f64 {
        bounds.top + self.element.resolve(bounds.height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for TriggerPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), Some(viewport), None) => Ok(TriggerPoint {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            (Some(element), None, None) => Ok(TriggerPoint {
                element: element.parse()?,
                viewport: Offset::Fraction(0.0),
            }),
            _ => Err(Error::Validation(format!("invalid trigger point: {}", s))),
        }
    }
}

/// End of a trigger's range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerEnd {
    Point(TriggerPoint),
    /// A fixed scroll position in pixels
    Absolute(f64),
}

impl Default for TriggerEnd {
    fn default() -> Self {
        TriggerEnd::Point(TriggerPoint {
            element: Offset::Fraction(1.0),
            viewport: Offset::Fraction(0.0),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    #[default]
    Before,
    Active,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerEvent {
    /// Scrolled forward past the start
    Enter,
    /// Scrolled forward past the end
    Leave,
    /// Scrolled backward past the end
    EnterBack,
    /// Scrolled backward past the start
    LeaveBack,
    /// Progress through the range changed
    Update(f64),
}

#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    bounds: Bounds,
    start_point: TriggerPoint,
    end_point: TriggerEnd,
    once: bool,
    start: f64,
    end: f64,
    state: TriggerState,
    progress: f64,
    entered: bool,
    killed: bool,
}

impl ScrollTrigger {
    pub fn new(bounds: Bounds, start: TriggerPoint, end: TriggerEnd, viewport_height: f64) -> Self {
        let mut trigger = ScrollTrigger {
            bounds,
            start_point: start,
            end_point: end,
            once: false,
            start: 0.0,
            end: 0.0,
            state: TriggerState::Before,
            progress: 0.0,
            entered: false,
            killed: false,
        };
        trigger.refresh(viewport_height);
        trigger
    }

    /// Fire `Enter` at most once and stop listening after the end is reached
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Recompute the scroll range for a new viewport height
    pub fn refresh(&mut self, viewport_height: f64) {
        self.start = self.start_point.scroll_position(&self.bounds, viewport_height);
        self.end = match self.end_point {
            TriggerEnd::Point(point) => point.scroll_position(&self.bounds, viewport_height),
            TriggerEnd::Absolute(px) => px,
        }
        .max(self.start);
    }

    pub fn range(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn kill(&mut self) {
        self.killed = true;
    }

    fn state_at(&self, scroll_y: f64) -> TriggerState {
        if scroll_y < self.start {
            TriggerState::Before
        } else if scroll_y > self.end {
            TriggerState::After
        } else {
            TriggerState::Active
        }
    }

    fn progress_at(&self, scroll_y: f64) -> f64 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if scroll_y >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll_y - self.start) / span).clamp(0.0, 1.0)
    }

    /// Move to `scroll_y` and report what happened on the way
    pub fn update(&mut self, scroll_y: f64) -> Vec<TriggerEvent> {
        use TriggerState::*;

        let mut events = Vec::new();
        if self.killed {
            return events;
        }

        let next = self.state_at(scroll_y);
        match (self.state, next) {
            (Before, Active) => events.push(TriggerEvent::Enter),
            (Before, After) => events.extend([TriggerEvent::Enter, TriggerEvent::Leave]),
            (Active, After) => events.push(TriggerEvent::Leave),
            (After, Active) => events.push(TriggerEvent::EnterBack),
            (After, Before) => events.extend([TriggerEvent::EnterBack, TriggerEvent::LeaveBack]),
            (Active, Before) => events.push(TriggerEvent::LeaveBack),
            _ => {}
        }
        if self.once && self.entered {
            events.retain(|e| *e != TriggerEvent::Enter);
        }
        if events.contains(&TriggerEvent::Enter) {
            self.entered = true;
        }

        let progress = self.progress_at(scroll_y);
        if progress != self.progress {
            self.progress = progress;
            events.push(TriggerEvent::Update(progress));
        }

        self.state = next;
        if self.once && next == After {
            self.killed = true;
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: f64 = 1000.0;

    fn point(s: &str) -> TriggerPoint {
        s.parse().unwrap()
    }

    #[test]
    fn parse_trigger_points() {
        assert_eq!(
            point("top 85%"),
            TriggerPoint {
                element: Offset::Fraction(0.0),
                viewport: Offset::Fraction(0.85)
            }
        );
        assert_eq!(point("top -80").viewport, Offset::Pixels(-80.0));
        assert_eq!(point("bottom top").element, Offset::Fraction(1.0));
        assert_eq!(point("top bottom").viewport, Offset::Fraction(1.0));
        assert!("top 85% extra".parse::<TriggerPoint>().is_err());
        assert!("middle 10%".parse::<TriggerPoint>().is_err());
    }

    #[test]
    fn card_range_and_progress() {
        let bounds = Bounds::new(2000.0, 400.0);
        let mut trigger = ScrollTrigger::new(
            bounds,
            point("top 85%"),
            TriggerEnd::Point(point("bottom 15%")),
            VIEWPORT,
        );
        assert_eq!(trigger.range(), (1150.0, 2250.0));

        assert!(trigger.update(0.0).is_empty());
        let events = trigger.update(1700.0);
        assert_eq!(events, vec![TriggerEvent::Enter, TriggerEvent::Update(0.5)]);
        assert_eq!(
            trigger.update(3000.0),
            vec![TriggerEvent::Leave, TriggerEvent::Update(1.0)]
        );
        assert_eq!(
            trigger.update(2250.0),
            vec![TriggerEvent::EnterBack]
        );
        assert_eq!(
            trigger.update(0.0),
            vec![TriggerEvent::LeaveBack, TriggerEvent::Update(0.0)]
        );
    }

    #[test]
    fn jumping_over_the_range_fires_both_edges() {
        let mut trigger = ScrollTrigger::new(
            Bounds::new(500.0, 100.0),
            point("top bottom"),
            TriggerEnd::default(),
            VIEWPORT,
        );
        assert_eq!(trigger.range(), (-500.0, 600.0));
        let events = trigger.update(5000.0);
        assert_eq!(
            events,
            vec![TriggerEvent::Enter, TriggerEvent::Leave, TriggerEvent::Update(1.0)]
        );
    }

    #[test]
    fn once_triggers_die_after_the_end() {
        let mut trigger = ScrollTrigger::new(
            Bounds::new(1000.0, 200.0),
            point("top 90%"),
            TriggerEnd::default(),
            VIEWPORT,
        )
        .once();
        assert!(trigger.update(200.0).contains(&TriggerEvent::Enter));
        trigger.update(0.0);
        assert!(!trigger.update(200.0).contains(&TriggerEvent::Enter));
        trigger.update(5000.0);
        assert!(trigger.is_killed());
        assert!(trigger.update(0.0).is_empty());
    }

    #[test]
    fn navigation_threshold_uses_absolute_end() {
        let mut trigger = ScrollTrigger::new(
            Bounds::new(0.0, 0.0),
            point("top -80"),
            TriggerEnd::Absolute(99999.0),
            VIEWPORT,
        );
        assert_eq!(trigger.range().0, 80.0);
        assert!(trigger.update(40.0).is_empty());
        assert_eq!(trigger.update(120.0)[0], TriggerEvent::Enter);
        assert_eq!(trigger.state(), TriggerState::Active);
    }

    #[test]
    fn visible_fraction_of_partially_shown_element() {
        let bounds = Bounds::new(900.0, 200.0);
        assert_eq!(bounds.visible_fraction(0.0, VIEWPORT), 0.5);
        assert_eq!(bounds.visible_fraction(2000.0, VIEWPORT), 0.0);
        assert_eq!(bounds.visible_fraction(800.0, VIEWPORT), 1.0);
    }
}
