use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_PROFILE_NAME_LENGTH: usize = 50;

/// Work style a rule table is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coder,
    Artist,
    Gamer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Coder, Role::Artist, Role::Gamer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coder => "coder",
            Role::Artist => "artist",
            Role::Gamer => "gamer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| anyhow!("unknown role '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handedness {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Handedness::Left),
            "right" => Ok(Handedness::Right),
            _ => Err(anyhow!("unknown handedness '{value}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub handedness: Handedness,
    pub created_at: DateTime<Utc>,
}

/// Trim and validate a profile name. Returns the trimmed name.
pub fn validate_profile_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("Profile name cannot be empty");
    }
    if trimmed.chars().count() > MAX_PROFILE_NAME_LENGTH {
        bail!(
            "Profile name must be at most {} characters",
            MAX_PROFILE_NAME_LENGTH
        );
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || c.is_whitespace() || "-_.".contains(c);
    if !trimmed.chars().all(allowed) {
        bail!("Profile name may only contain letters, digits, spaces, '-', '_' and '.'");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_lookup_ignores_case() {
        assert_eq!("CODER".parse::<Role>().unwrap(), Role::Coder);
        assert_eq!(" Gamer".parse::<Role>().unwrap(), Role::Gamer);
        assert!("designer".parse::<Role>().is_err());
    }

    #[test]
    fn profile_names_are_validated() {
        assert_eq!(validate_profile_name("  Ada L. ").unwrap(), "Ada L.");
        assert!(validate_profile_name("   ").is_err());
        assert!(validate_profile_name("bad/name").is_err());
        assert!(validate_profile_name(&"x".repeat(51)).is_err());
    }
}
