use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value:?} is not a valid {key} value (expected one of {})", .allowed.join(", "))]
pub struct PropertyValueError {
    pub key: &'static str,
    pub value: String,
    pub allowed: Vec<&'static str>,
}

macro_rules! symbolic_value {
    ($(#[$meta:meta])* $name:ident, $key:literal, { $($variant:ident => $symbol:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const KEY: &'static str = $key;
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn symbol(self) -> &'static str {
                match self {
                    $(Self::$variant => $symbol),+
                }
            }

            pub fn symbols() -> Vec<&'static str> {
                Self::ALL.iter().map(|value| value.symbol()).collect()
            }
        }

        impl FromStr for $name {
            type Err = PropertyValueError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let trimmed = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.symbol().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| PropertyValueError {
                        key: $key,
                        value: trimmed.to_string(),
                        allowed: Self::symbols(),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = PropertyValueError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.symbol().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.symbol())
            }
        }
    };
}

symbolic_value!(
    /// Whether the property is essential to all of its instances.
    Rigidity, "R", {
        Rigid => "+R",
        NonRigid => "-R",
        AntiRigid => "~R",
    }
);

symbolic_value!(
    /// Whether the property carries an identity condition.
    Identity, "I", {
        Carries => "+I",
        Lacks => "-I",
    }
);

symbolic_value!(
    /// Whether the property supplies its own identity condition.
    OwnIdentity, "O", {
        Supplies => "+O",
        Lacks => "-O",
    }
);

symbolic_value!(
    /// Whether instances are integrated wholes.
    Unity, "U", {
        Unifying => "+U",
        NonUnifying => "-U",
        AntiUnity => "~U",
    }
);

symbolic_value!(
    Dependence, "D", {
        Dependent => "+D",
        Independent => "-D",
    }
);

/// The fixed set of OntoClean meta-property keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Rigidity,
    Identity,
    OwnIdentity,
    Unity,
    Dependence,
}

impl Property {
    pub const ALL: [Self; 5] = [
        Self::Rigidity,
        Self::Identity,
        Self::OwnIdentity,
        Self::Unity,
        Self::Dependence,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Rigidity => "rigidity",
            Self::Identity => "identity",
            Self::OwnIdentity => "own_identity",
            Self::Unity => "unity",
            Self::Dependence => "dependence",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Rigidity => Rigidity::KEY,
            Self::Identity => Identity::KEY,
            Self::OwnIdentity => OwnIdentity::KEY,
            Self::Unity => Unity::KEY,
            Self::Dependence => Dependence::KEY,
        }
    }

    pub fn allowed_symbols(self) -> Vec<&'static str> {
        match self {
            Self::Rigidity => Rigidity::symbols(),
            Self::Identity => Identity::symbols(),
            Self::OwnIdentity => OwnIdentity::symbols(),
            Self::Unity => Unity::symbols(),
            Self::Dependence => Dependence::symbols(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|property| property.name() == name)
    }
}

/// Meta-properties of one term. Absent keys stay `None`.
///
/// Serialized with the short keys of the gold format (`R`, `I`, `O`, `U`, `D`);
/// long names are accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaProperties {
    #[serde(
        rename = "R",
        alias = "rigidity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rigidity: Option<Rigidity>,
    #[serde(
        rename = "I",
        alias = "identity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub identity: Option<Identity>,
    #[serde(
        rename = "O",
        alias = "own_identity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub own_identity: Option<OwnIdentity>,
    #[serde(
        rename = "U",
        alias = "unity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unity: Option<Unity>,
    #[serde(
        rename = "D",
        alias = "dependence",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dependence: Option<Dependence>,
}

impl MetaProperties {
    pub fn symbol(&self, property: Property) -> Option<&'static str> {
        match property {
            Property::Rigidity => self.rigidity.map(Rigidity::symbol),
            Property::Identity => self.identity.map(Identity::symbol),
            Property::OwnIdentity => self.own_identity.map(OwnIdentity::symbol),
            Property::Unity => self.unity.map(Unity::symbol),
            Property::Dependence => self.dependence.map(Dependence::symbol),
        }
    }

    /// Sets one property from its symbol, rejecting values outside the closed set.
    pub fn set(&mut self, property: Property, symbol: &str) -> Result<(), PropertyValueError> {
        match property {
            Property::Rigidity => self.rigidity = Some(symbol.parse()?),
            Property::Identity => self.identity = Some(symbol.parse()?),
            Property::OwnIdentity => self.own_identity = Some(symbol.parse()?),
            Property::Unity => self.unity = Some(symbol.parse()?),
            Property::Dependence => self.dependence = Some(symbol.parse()?),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        Property::ALL
            .into_iter()
            .all(|property| self.symbol(property).is_none())
    }

    /// Compact `R=+R, I=-I, ...` rendering for prompts and reports.
    pub fn describe(&self) -> String {
        let parts = Property::ALL
            .into_iter()
            .filter_map(|property| {
                self.symbol(property)
                    .map(|symbol| format!("{}={}", property.key(), symbol))
            })
            .collect::<Vec<_>>();
        if parts.is_empty() {
            "unknown".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// OntoClean entity kind implied by the properties; the first matching rule wins.
    pub fn classify(&self) -> &'static str {
        use Identity as I;
        use Rigidity as R;

        match (self.rigidity, self.identity) {
            (Some(R::Rigid), Some(I::Carries))
                if self.own_identity == Some(OwnIdentity::Supplies) =>
            {
                "Sortal (Rigid, supplies identity)"
            }
            (Some(R::Rigid), Some(I::Carries)) => "Sortal (Rigid, carries identity)",
            (Some(R::AntiRigid), _) if self.dependence == Some(Dependence::Dependent) => {
                "Role (Anti-rigid, dependent)"
            }
            (Some(R::AntiRigid), _) => "Role or Phase (Anti-rigid)",
            (Some(R::NonRigid), Some(I::Lacks)) => "Attribution (Non-rigid, no identity)",
            (Some(R::NonRigid), _) => "Category or Mixin (Non-rigid)",
            (_, Some(I::Lacks)) => "Attribution or Quality",
            _ => "Complex Type (see properties for details)",
        }
    }
}
