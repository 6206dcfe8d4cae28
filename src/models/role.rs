use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Employee,
    Management,
    Client,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Employee, Role::Management, Role::Client, Role::Admin];

    /// Human-readable label shown in the directory.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Management => "Management",
            Role::Client => "Client",
            Role::Admin => "Administrator",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Management => "management",
            Role::Client => "client",
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
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "management" => Ok(Role::Management),
            "client" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            _ => Err(format!(
                "Invalid role '{}'. Valid options: employee, management, client, admin",
                s
            )),
        }
    }
}

/// Department an employee belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Engineering,
    Marketing,
    Sales,
    Finance,
    #[serde(rename = "HR")]
    HumanResources,
    Operations,
    Executive,
}

/// Badge colour used when rendering a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Blue,
    Purple,
    Green,
    Yellow,
    Pink,
    Orange,
    Red,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::Engineering,
        Department::Marketing,
        Department::Sales,
        Department::Finance,
        Department::HumanResources,
        Department::Operations,
        Department::Executive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Department::Engineering => "Engineering",
            Department::Marketing => "Marketing",
            Department::Sales => "Sales",
            Department::Finance => "Finance",
            Department::HumanResources => "HR",
            Department::Operations => "Operations",
            Department::Executive => "Executive",
        }
    }

    pub fn badge(&self) -> Badge {
        match self {
            Department::Engineering => Badge::Blue,
            Department::Marketing => Badge::Purple,
            Department::Sales => Badge::Green,
            Department::Finance => Badge::Yellow,
            Department::HumanResources => Badge::Pink,
            Department::Operations => Badge::Orange,
            Department::Executive => Badge::Red,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid department '{}'. Valid options: {}",
                    s,
                    Department::ALL.map(|d| d.label()).join(", ")
                )
            })
    }
}
