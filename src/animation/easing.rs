use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default overshoot of `back.out`
pub const BACK_OVERSHOOT: f64 = 1.70158;

/// Easing curves used by the site's animations
///
/// Names and curves follow the usual web animation vocabulary, so
/// `"back.out(1.7)"` here behaves like it does in the browser library the
/// markup was designed against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Ease {
    None,
    /// Cubic ease-out
    #[default]
    Power2Out,
    /// Quartic ease-out
    Power3Out,
    BackOut(f64),
    ElasticOut { amplitude: f64, period: f64 },
}

impl Ease {
    /// Map linear progress in `[0, 1]` to eased progress
    pub fn apply(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Ease::None => t,
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::Power3Out => 1.0 - (1.0 - t).powi(4),
            Ease::BackOut(s) => {
                let u = t - 1.0;
                u * u * ((s + 1.0) * u + s) + 1.0
            }
            Ease::ElasticOut { amplitude, period } => {
                let p1 = amplitude.max(1.0);
                let p3 = period / amplitude.min(1.0);
                let p2 = p3 / TAU * (1.0 / p1).asin();
                p1 * 2f64.powf(-10.0 * t) * ((t - p2) * (TAU / p3)).sin() + 1.0
            }
        }
    }
}

fn parse_args(args: &str) -> Result<Vec<f64>, Error> {
    args.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| {
            a.parse::<f64>()
                .map_err(|_| Error::Validation(format!("invalid ease argument: {}", a)))
        })
        .collect()
}

impl FromStr for Ease {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, args) = match s.find('(') {
            Some(open) if s.ends_with(')') => (&s[..open], parse_args(&s[open + 1..s.len() - 1])?),
            Some(_) => return Err(Error::Validation(format!("unknown ease: {}", s))),
            None => (s, Vec::new()),
        };

        match name {
            "none" | "linear" => Ok(Ease::None),
            "power2.out" => Ok(Ease::Power2Out),
            "power3.out" => Ok(Ease::Power3Out),
            "back.out" => Ok(Ease::BackOut(args.first().copied().unwrap_or(BACK_OVERSHOOT))),
            "elastic.out" => Ok(Ease::ElasticOut {
                amplitude: args.first().copied().unwrap_or(1.0),
                period: args.get(1).copied().unwrap_or(0.3),
            }),
            _ => Err(Error::Validation(format!("unknown ease: {}", s))),
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::None => write!(f, "none"),
            Ease::Power2Out => write!(f, "power2.out"),
            Ease::Power3Out => write!(f, "power3.out"),
            Ease::BackOut(s) => write!(f, "back.out({})", s),
            Ease::ElasticOut { amplitude, period } => {
                write!(f, "elastic.out({}, {})", amplitude, period)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn every_curve_starts_at_zero_and_ends_at_one() {
        let curves = [
            Ease::None,
            Ease::Power2Out,
            Ease::Power3Out,
            Ease::BackOut(1.7),
            Ease::ElasticOut {
                amplitude: 1.0,
                period: 0.3,
            },
        ];
        for ease in curves {
            assert!(ease.apply(0.0).abs() < EPS, "{} at 0", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < EPS, "{} at 1", ease);
        }
    }

    #[test]
    fn back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Ease::BackOut(1.7).apply(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0);
        assert!(Ease::Power3Out.apply(0.5) > Ease::Power2Out.apply(0.5));
    }

    #[test]
    fn parse_names_and_arguments() {
        assert_eq!("back.out(1.7)".parse::<Ease>().unwrap(), Ease::BackOut(1.7));
        assert_eq!("back.out".parse::<Ease>().unwrap(), Ease::BackOut(BACK_OVERSHOOT));
        assert_eq!(
            "elastic.out(1, 0.3)".parse::<Ease>().unwrap(),
            Ease::ElasticOut {
                amplitude: 1.0,
                period: 0.3
            }
        );
        assert_eq!("none".parse::<Ease>().unwrap(), Ease::None);
        assert!("bounce.in".parse::<Ease>().is_err());
        assert!("back.out(x)".parse::<Ease>().is_err());
    }

    #[test]
    fn display_round_trips() {
        let ease = Ease::ElasticOut {
            amplitude: 1.0,
            period: 0.3,
        };
        assert_eq!(ease.to_string().parse::<Ease>().unwrap(), ease);
    }
}
