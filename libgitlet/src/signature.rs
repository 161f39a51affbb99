use crate::error::GitletGenericError;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// an absolute point in time, stored as unix-epoch seconds (§3 "timestamp").
/// the initial commit's timestamp is the epoch itself (`Timestamp::EPOCH`).
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    pub fn new(unix_seconds: i64) -> Self {
        Self(unix_seconds)
    }

    pub fn now() -> Self {
        // for tests we want a fixed, reproducible clock
        if cfg!(test) {
            Self::EPOCH
        } else {
            Self(Utc::now().timestamp())
        }
    }

    pub fn unix_seconds(self) -> i64 {
        self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Timestamp {
    type Err = GitletGenericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// renders the commit print format's `Date:` line: `EEE MMM d HH:mm:ss yyyy Z`
/// in the US locale (§6), e.g. `Thu Jan 1 00:00:00 1970 +0000`.
pub fn format_date(ts: Timestamp) -> String {
    let utc: DateTime<Utc> = Utc.timestamp(ts.unix_seconds(), 0);
    let local: DateTime<Local> = DateTime::from(utc);
    // chrono's "%e" pads the day with a space rather than a zero, matching gitlet's
    // `d` (no leading zero) formatting token
    local.format("%a %b %e %H:%M:%S %Y %z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_formats_to_unix_epoch_instant() {
        let s = format_date(Timestamp::EPOCH);
        assert!(s.contains("1970"));
    }

    #[test]
    fn roundtrips_through_string() {
        let ts = Timestamp::new(1_616_061_862);
        assert_eq!(Timestamp::from_str(&ts.to_string()).unwrap(), ts);
    }
}
