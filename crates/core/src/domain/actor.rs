use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::ParseEnumError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
    Admin,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            "admin" => Ok(Self::Admin),
            other => Err(ParseEnumError { expected: "role", got: other.to_string() }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: ActorId(id.into()), role }
    }
}

#[cfg(test)]
mod tests {
    use super::{Actor, Role};

    #[test]
    fn role_parses_from_text_ignoring_case_and_whitespace() {
        assert_eq!(" Agent ".parse::<Role>(), Ok(Role::Agent));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("USER".parse::<Role>(), Ok(Role::User));
    }

    #[test]
    fn unknown_role_is_rejected_with_the_offending_value() {
        let error = "supervisor".parse::<Role>().expect_err("supervisor is not a role");
        assert_eq!(error.to_string(), "invalid role: `supervisor`");
    }

    #[test]
    fn actor_constructor_wraps_the_identifier() {
        let actor = Actor::new("u-100", Role::Agent);
        assert_eq!(actor.id.0, "u-100");
        assert_eq!(actor.role.as_str(), "agent");
    }
}
