//! Pointer micro-interactions: card hover lift, magnetic pull and click ripples.

use super::easing::Ease;
use super::style::StyleProps;
use super::timeline::TweenVars;

pub const HOVER_DURATION: f64 = 0.3;
pub const MAGNETIC_STRENGTH: f64 = 0.3;
pub const MAGNETIC_RELEASE_DURATION: f64 = 0.5;
pub const RIPPLE_SIZE: f64 = 10.0;
/// Seconds a ripple stays in the DOM
pub const RIPPLE_DURATION: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An element's box in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point {
            x: self.left + self.width / 2.0,
            y: self.top + self.height / 2.0,
        }
    }
}

/// Lift a card under the pointer
pub fn hover_enter() -> TweenVars {
    TweenVars::new(
        StyleProps::default().y(-15.0).scale(1.02).shadow(1.0),
        HOVER_DURATION,
        Ease::Power2Out,
    )
}

/// Settle a card back when the pointer leaves
pub fn hover_leave() -> TweenVars {
    TweenVars::new(
        StyleProps::default().y(0.0).scale(1.0).shadow(0.0),
        HOVER_DURATION,
        Ease::Power2Out,
    )
}

/// Follow the pointer: offset from the element's centre scaled by `strength`
pub fn magnetic_offset(rect: &Rect, pointer: Point, strength: f64) -> TweenVars {
    let center = rect.center();
    TweenVars::new(
        StyleProps::default()
            .x((pointer.x - center.x) * strength)
            .y((pointer.y - center.y) * strength),
        HOVER_DURATION,
        Ease::Power2Out,
    )
}

/// Spring back to rest after the pointer leaves a magnetic element
pub fn magnetic_release() -> TweenVars {
    TweenVars::new(
        StyleProps::default().x(0.0).y(0.0),
        MAGNETIC_RELEASE_DURATION,
        Ease::ElasticOut {
            amplitude: 1.0,
            period: 0.3,
        },
    )
}

/// A click ripple, positioned relative to the clicked element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Seconds until the ripple is removed
    pub lifetime: f64,
}

impl Ripple {
    pub fn at(rect: &Rect, click: Point) -> Self {
        Ripple {
            x: click.x - rect.left,
            y: click.y - rect.top,
            size: RIPPLE_SIZE,
            lifetime: RIPPLE_DURATION,
        }
    }

    pub fn to_css(&self) -> String {
        format!(
            "position: absolute; border-radius: 50%; background: rgba(255, 255, 255, 0.6); \
             transform: scale(0); animation: ripple {}s linear; left: {}px; top: {}px; \
             width: {}px; height: {}px; margin-left: {}px; margin-top: {}px; pointer-events: none;",
            self.lifetime,
            self.x,
            self.y,
            self.size,
            self.size,
            -self.size / 2.0,
            -self.size / 2.0
        )
    }
}
