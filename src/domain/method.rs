use std::fmt;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};

use crate::domain::type_ref::TypeRef;

/// Method identity: declaring type's full name plus the method's metadata token.
///
/// Textual form is `Namespace.Type#token`; the token may be written in decimal or as `0x..` hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MethodId {
    pub declaring_type: String,
    pub token: u32,
}

impl MethodId {
    pub fn new(declaring_type: impl Into<String>, token: u32) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            token,
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.declaring_type, self.token)
    }
}

impl FromStr for MethodId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (declaring_type, token) = s
            .rsplit_once('#')
            .ok_or_else(|| anyhow!("Malformed method id (expected Type#token): {s}"))?;
        if declaring_type.is_empty() {
            return Err(anyhow!("Malformed method id (empty type name): {s}"));
        }
        let token = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => token.parse(),
        }
        .with_context(|| format!("Malformed method token in: {s}"))?;
        Ok(Self::new(declaring_type, token))
    }
}

impl TryFrom<String> for MethodId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MethodId> for String {
    fn from(value: MethodId) -> Self {
        value.to_string()
    }
}

/// A declared method, as the metadata loader sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub id: MethodId,
    pub name: String,
    pub is_virtual: bool,
    pub return_type: TypeRef,
    pub parameters: Vec<TypeRef>,
    /// Direct references to the slots this method explicitly implements.
    pub explicit_overrides: Vec<MethodId>,
}

impl MethodSig {
    /// Non-virtual method returning `System.Void` with no parameters.
    pub fn new(declaring_type: impl Into<String>, token: u32, name: impl Into<String>) -> Self {
        Self {
            id: MethodId::new(declaring_type, token),
            name: name.into(),
            is_virtual: false,
            return_type: TypeRef::named("System.Void"),
            parameters: Vec::new(),
            explicit_overrides: Vec::new(),
        }
    }

    pub fn with_virtual(mut self, is_virtual: bool) -> Self {
        self.is_virtual = is_virtual;
        self
    }

    pub fn returning(mut self, return_type: TypeRef) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn with_param(mut self, param: TypeRef) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn overriding(mut self, target: MethodId) -> Self {
        self.explicit_overrides.push(target);
        self
    }

    pub fn declaring_type(&self) -> &str {
        &self.id.declaring_type
    }

    /// `Name(P1,P2)` rendering used in logs and query output.
    pub fn display_signature(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(ToString::to_string).collect();
        format!("{} {}({})", self.return_type, self.name, params.join(","))
    }
}
