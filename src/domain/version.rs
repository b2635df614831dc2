use crate::error::{Result, StamperError};
use std::fmt;

/// How many components a version was written with (`3`, `3.3`, `3.3.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Major,
    Minor,
    Patch,
}

/// Version string of one to three dot-separated non-negative integers.
///
/// Components are parsed as integers, so `03.1` reads as `3.1`. Display keeps
/// the written precision; every bump produces a full three-part version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    precision: Precision,
}

impl Version {
    /// Create a full three-part version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
            precision: Precision::Patch,
        }
    }

    /// Parse `MAJOR[.MINOR[.PATCH]]`, with an optional leading `v`/`V`
    pub fn parse(text: &str) -> Result<Self> {
        let clean = text.trim().trim_start_matches('v').trim_start_matches('V');

        let parts: Vec<&str> = clean.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(StamperError::version(format!(
                "Invalid version format: '{}' - expected X[.Y[.Z]]",
                text
            )));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(StamperError::version(format!(
                    "Invalid version component '{}' in '{}'",
                    part, text
                )));
            }
            *slot = part.parse::<u32>().map_err(|_| {
                StamperError::version(format!("Version component out of range: {}", part))
            })?;
        }

        let precision = match parts.len() {
            1 => Precision::Major,
            2 => Precision::Minor,
            _ => Precision::Patch,
        };

        Ok(Version {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            precision,
        })
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Same version written with all three components (`3.3` -> `3.3.0`)
    pub fn normalized(&self) -> Self {
        Version::new(self.major, self.minor, self.patch)
    }

    /// Bump version according to bump type.
    ///
    /// Short versions are normalized to three components first, so `3.3`
    /// bumps to `3.3.1`, `3.4.0` or `4.0.0`. Fails when the bumped
    /// component is already `u32::MAX`.
    pub fn bump(&self, bump_type: VersionBump) -> Result<Self> {
        let v = self.normalized();
        let next = |component: u32| {
            component.checked_add(1).ok_or_else(|| {
                StamperError::version(format!(
                    "cannot apply a {} bump to {}: component out of range",
                    bump_type, self
                ))
            })
        };
        Ok(match bump_type {
            VersionBump::Major => Version::new(next(v.major)?, 0, 0),
            VersionBump::Minor => Version::new(v.major, next(v.minor)?, 0),
            VersionBump::Patch => Version::new(v.major, v.minor, next(v.patch)?),
        })
    }

    /// Three-part semver view, used to order versions
    pub fn to_semver(&self) -> semver::Version {
        semver::Version::new(self.major as u64, self.minor as u64, self.patch as u64)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            Precision::Major => write!(f, "{}", self.major),
            Precision::Minor => write!(f, "{}.{}", self.major, self.minor),
            Precision::Patch => write!(f, "{}.{}.{}", self.major, self.minor, self.patch),
        }
    }
}

/// Increment class derived from the change percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionBump {
    Patch,
    Minor,
    Major,
}

impl VersionBump {
    pub fn label(&self) -> &'static str {
        match self {
            VersionBump::Major => "MAJOR",
            VersionBump::Minor => "MINOR",
            VersionBump::Patch => "PATCH",
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a change percentage to an increment class.
///
/// Each band includes its lower bound: with the default thresholds 50.0 is
/// Major, 10.0 is Minor and anything below 10.0 is Patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncrementPolicy {
    major_threshold: f64,
    minor_threshold: f64,
}

impl IncrementPolicy {
    pub fn new(major_threshold: f64, minor_threshold: f64) -> Self {
        IncrementPolicy {
            major_threshold,
            minor_threshold,
        }
    }

    pub fn from_config(config: &crate::config::ThresholdConfig) -> Self {
        IncrementPolicy::new(config.major, config.minor)
    }

    pub fn major_threshold(&self) -> f64 {
        self.major_threshold
    }

    pub fn minor_threshold(&self) -> f64 {
        self.minor_threshold
    }

    pub fn decide(&self, percentage: f64) -> VersionBump {
        if percentage >= self.major_threshold {
            VersionBump::Major
        } else if percentage >= self.minor_threshold {
            VersionBump::Minor
        } else {
            VersionBump::Patch
        }
    }
}

impl Default for IncrementPolicy {
    fn default() -> Self {
        IncrementPolicy::new(50.0, 10.0)
    }
}
