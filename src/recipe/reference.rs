// src/recipe/reference.rs

//! Fully qualified package references
//!
//! A reference names one published package with the format:
//! `name/version@user/channel`
//!
//! Examples:
//! - `ProtocolStateMachine/0.1.2@joystream/stable`
//! - `zlib/1.2.11@conan/stable`
//!
//! References are declared statically by a recipe and resolved by the host
//! before the Build stage runs; this module only parses and prints them.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A `name/version@user/channel` package reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageReference {
    pub name: String,
    pub version: String,
    /// Publishing namespace (user or organization)
    pub user: String,
    /// Release channel within the namespace (e.g. `stable`, `testing`)
    pub channel: String,
}

impl PackageReference {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        user: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            user: user.into(),
            channel: channel.into(),
        }
    }

    /// Parse a reference from `name/version@user/channel`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (package, namespace) = s
            .split_once('@')
            .ok_or_else(|| Error::InvalidReference(format!("missing '@' in {}", s)))?;

        let (name, version) = package
            .split_once('/')
            .ok_or_else(|| Error::InvalidReference(format!("missing version in {}", s)))?;
        let (user, channel) = namespace
            .split_once('/')
            .ok_or_else(|| Error::InvalidReference(format!("missing channel in {}", s)))?;

        for (what, part) in [
            ("name", name),
            ("version", version),
            ("user", user),
            ("channel", channel),
        ] {
            if part.is_empty() {
                return Err(Error::InvalidReference(format!("empty {} in {}", what, s)));
            }
            if !part.chars().all(valid_char) {
                return Err(Error::InvalidReference(format!(
                    "invalid characters in {} '{}'",
                    what, part
                )));
            }
        }

        Ok(Self::new(name, version, user, channel))
    }

    /// `name/version` without the namespace
    pub fn short(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

fn valid_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}/{}",
            self.name, self.version, self.user, self.channel
        )
    }
}

impl FromStr for PackageReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PackageReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
