//! Transaction policies
//!
//! A policy tells the interceptor whether a call needs a transaction of its
//! own. Raw metadata carries integer codes (1, 2, 3); configuration files use
//! the kebab-case names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Transaction policy attached to a method or class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Policy {
    /// No transaction is opened; the call runs in the outer context, if any.
    NotRequired = 1,
    /// A transaction is opened only when none is active; otherwise the call
    /// joins the active one.
    #[default]
    Required = 2,
    /// A transaction is always begun. When one is already active this only
    /// increases the nesting level of the resource, which may map it to a
    /// savepoint.
    Nested = 3,
}

impl Policy {
    /// All policies, in code order
    pub const ALL: [Policy; 3] = [Policy::NotRequired, Policy::Required, Policy::Nested];

    /// Integer code used in raw metadata
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse a raw integer code
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPolicy` if the code is not 1, 2 or 3.
    pub fn from_code(code: i64) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|p| i64::from(p.code()) == code)
            .ok_or_else(|| {
                CoreError::invalid_policy(code, &Self::ALL.map(|p| p.code()))
            })
    }

    /// Configuration name (`not-required`, `required`, `nested`)
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::NotRequired => "not-required",
            Policy::Required => "required",
            Policy::Nested => "nested",
        }
    }

    /// Human-readable name used in log lines
    pub fn label(self) -> &'static str {
        match self {
            Policy::NotRequired => "not required",
            Policy::Required => "required",
            Policy::Nested => "nested",
        }
    }

    /// Whether a call with this policy must begin a transaction
    ///
    /// `Nested` always does; `Required` only when nothing is active yet.
    pub fn requires_transaction(self, transaction_active: bool) -> bool {
        match self {
            Policy::NotRequired => false,
            Policy::Required => !transaction_active,
            Policy::Nested => true,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::invalid_policy(s, &Self::ALL.map(|p| p.as_str())))
    }
}

impl TryFrom<i64> for Policy {
    type Error = CoreError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Policy::from_code(code)
    }
}
