//! Tripulación de un viaje: conductor y acompañante

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;

/// Rol dentro de la tripulación - mapea al ENUM crew_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, Default)]
#[sqlx(type_name = "crew_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CrewRole {
    #[default]
    Driver,
    Attendant,
}

impl CrewRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrewRole::Driver => "driver",
            CrewRole::Attendant => "attendant",
        }
    }
}

impl fmt::Display for CrewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Miembro concreto de la tripulación; se serializa como `<rol>:<id>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrewMember {
    pub role: CrewRole,
    pub id: Uuid,
}

impl CrewMember {
    pub fn driver(id: Uuid) -> Self {
        Self { role: CrewRole::Driver, id }
    }

    pub fn attendant(id: Uuid) -> Self {
        Self { role: CrewRole::Attendant, id }
    }
}

impl fmt::Display for CrewMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid crew member '{0}', expected <driver|attendant>:<uuid>")]
pub struct ParseCrewMemberError(String);

impl FromStr for CrewMember {
    type Err = ParseCrewMemberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCrewMemberError(s.to_string());
        let (role, id) = s.split_once(':').ok_or_else(err)?;
        let role = match role {
            "driver" => CrewRole::Driver,
            "attendant" => CrewRole::Attendant,
            _ => return Err(err()),
        };
        let id = Uuid::parse_str(id).map_err(|_| err())?;
        Ok(Self { role, id })
    }
}
