use serde::{Deserialize, Serialize};

/// The animated properties of one element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub opacity: f64,
    /// Horizontal offset in px
    pub x: f64,
    /// Vertical offset in px
    pub y: f64,
    /// Vertical offset as a percentage of the element's height
    pub y_percent: f64,
    pub scale: f64,
    /// Tilt in degrees
    pub rotation_x: f64,
    /// Drop shadow strength, 0 (none) to 1 (card lift)
    pub shadow: f64,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            opacity: 1.0,
            x: 0.0,
            y: 0.0,
            y_percent: 0.0,
            scale: 1.0,
            rotation_x: 0.0,
            shadow: 0.0,
        }
    }
}

/// A partial [`Style`]: the properties a tween touches
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<f64>,
}

impl StyleProps {
    pub fn opacity(mut self, v: f64) -> Self {
        self.opacity = Some(v);
        self
    }

    pub fn x(mut self, v: f64) -> Self {
        self.x = Some(v);
        self
    }

    pub fn y(mut self, v: f64) -> Self {
        self.y = Some(v);
        self
    }

    pub fn y_percent(mut self, v: f64) -> Self {
        self.y_percent = Some(v);
        self
    }

    pub fn scale(mut self, v: f64) -> Self {
        self.scale = Some(v);
        self
    }

    pub fn rotation_x(mut self, v: f64) -> Self {
        self.rotation_x = Some(v);
        self
    }

    pub fn shadow(mut self, v: f64) -> Self {
        self.shadow = Some(v);
        self
    }

    /// The values `style` currently has for the properties set here
    pub fn sample(&self, style: &Style) -> StyleProps {
        StyleProps {
            opacity: self.opacity.map(|_| style.opacity),
            x: self.x.map(|_| style.x),
            y: self.y.map(|_| style.y),
            y_percent: self.y_percent.map(|_| style.y_percent),
            scale: self.scale.map(|_| style.scale),
            rotation_x: self.rotation_x.map(|_| style.rotation_x),
            shadow: self.shadow.map(|_| style.shadow),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t == 1.0 { b } else { a + (b - a) * t }
}

impl Style {
    /// Overwrite the properties set in `props`
    pub fn apply(&mut self, props: &StyleProps) {
        self.blend(props, props, 1.0);
    }

    /// Set each property present in both `from` and `to` to their interpolation at `t`
    pub fn blend(&mut self, from: &StyleProps, to: &StyleProps, t: f64) {
        fn mix(slot: &mut f64, from: Option<f64>, to: Option<f64>, t: f64) {
            if let (Some(a), Some(b)) = (from, to) {
                *slot = lerp(a, b, t);
            }
        }
        mix(&mut self.opacity, from.opacity, to.opacity, t);
        mix(&mut self.x, from.x, to.x, t);
        mix(&mut self.y, from.y, to.y, t);
        mix(&mut self.y_percent, from.y_percent, to.y_percent, t);
        mix(&mut self.scale, from.scale, to.scale, t);
        mix(&mut self.rotation_x, from.rotation_x, to.rotation_x, t);
        mix(&mut self.shadow, from.shadow, to.shadow, t);
    }

    /// Inline CSS for this style
    pub fn to_css(&self) -> String {
        let mut transform = format!("translate3d({:.2}px, {:.2}px, 0)", self.x, self.y);
        if self.y_percent != 0.0 {
            transform.push_str(&format!(" translateY({:.2}%)", self.y_percent));
        }
        if self.scale != 1.0 {
            transform.push_str(&format!(" scale({:.4})", self.scale));
        }
        if self.rotation_x != 0.0 {
            transform.push_str(&format!(" rotateX({:.2}deg)", self.rotation_x));
        }
        let mut css = format!("opacity: {:.3}; transform: {};", self.opacity, transform);
        if self.shadow > 0.0 {
            css.push_str(&format!(
                " box-shadow: 0 25px 50px -12px rgba(0, 0, 0, {:.3});",
                0.25 * self.shadow
            ));
        }
        css
    }
}
