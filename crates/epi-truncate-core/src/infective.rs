//! Infective records: one individual's infection, notification and removal times.

use std::fmt;

/// Identifier shared by trace records and contact elements
pub type Label = i64;

/// One line of an epidemic trace: `label I N R`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Infective {
    pub label: Label,
    pub infection_time: f64,
    pub notification_time: f64,
    pub removal_time: f64,
}

impl Infective {
    pub fn new(label: Label, infection_time: f64, notification_time: f64, removal_time: f64) -> Self {
        Self {
            label,
            infection_time,
            notification_time,
            removal_time,
        }
    }

    /// Parse a whitespace-delimited record.
    ///
    /// Only the first four fields are read; anything after them is ignored.
    /// The error is a human-readable reason, the caller adds file context.
    pub fn parse_record(line: &str) -> Result<Self, String> {
        let mut fields = line.split_whitespace();
        let mut next = |name: &str| {
            fields
                .next()
                .ok_or_else(|| format!("missing {} field (expected `label I N R`)", name))
        };

        let label_tok = next("label")?;
        let i_tok = next("infection time")?;
        let n_tok = next("notification time")?;
        let r_tok = next("removal time")?;

        let label = label_tok
            .parse::<Label>()
            .map_err(|_| format!("label {:?} is not an integer", label_tok))?;

        Ok(Self::new(
            label,
            parse_time("infection time", i_tok)?,
            parse_time("notification time", n_tok)?,
            parse_time("removal time", r_tok)?,
        ))
    }

    /// Whether the individual had been notified by `cutoff`
    pub fn is_notified_by(&self, cutoff: f64) -> bool {
        self.notification_time <= cutoff
    }

    /// Right-censor the removal time at `cutoff`.
    ///
    /// Returns the censored record and whether the removal time changed.
    pub fn censored_at(self, cutoff: f64) -> (Self, bool) {
        if self.removal_time > cutoff {
            (
                Self {
                    removal_time: cutoff,
                    ..self
                },
                true,
            )
        } else {
            (self, false)
        }
    }
}

fn parse_time(name: &str, token: &str) -> Result<f64, String> {
    match token.parse::<f64>() {
        Ok(value) if value.is_nan() => Err(format!("{} is NaN", name)),
        Ok(value) => Ok(value),
        Err(_) => Err(format!("{} {:?} is not a number", name, token)),
    }
}

/// Shortest round-trip form (`5.0`, `0.25`). Very small or large magnitudes
/// use exponent notation (`1e-5`, `2e16`), which parses back to the same value.
pub(crate) fn format_time(value: f64) -> String {
    format!("{:?}", value)
}

impl fmt::Display for Infective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.label,
            format_time(self.infection_time),
            format_time(self.notification_time),
            format_time(self.removal_time)
        )
    }
}
