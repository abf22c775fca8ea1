// PY_SOURCE: src/delta_debugging/outcome.py:Outcome

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Verdict of one oracle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The candidate no longer shows the failure.
    Pass,
    /// The candidate still shows the failure.
    Fail,
    /// The candidate could not be judged (crash elsewhere, timeout, ...).
    Unresolved,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Pass, Outcome::Fail, Outcome::Unresolved];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Unresolved => "unresolved",
        }
    }

    pub fn is_fail(self) -> bool {
        self == Outcome::Fail
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pass" => Ok(Outcome::Pass),
            "fail" => Ok(Outcome::Fail),
            "unresolved" => Ok(Outcome::Unresolved),
            other => Err(Error::Parse(format!("unknown outcome '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_forms_round_trip_through_serde() {
        for outcome in Outcome::ALL {
            let json = serde_json::to_string(&outcome).expect("serialize");
            assert_eq!(json, format!("\"{outcome}\""));
            assert_eq!(outcome.as_str().parse::<Outcome>().expect("parse"), outcome);
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!("FAIL".parse::<Outcome>().expect("parse"), Outcome::Fail);
        assert!("maybe".parse::<Outcome>().is_err());
    }
}
