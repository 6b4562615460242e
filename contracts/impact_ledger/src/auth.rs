//! Authorization predicate for privileged operations.
//!
//! Only `release_funds` is privileged. The ledger asks an [`Authorizer`]
//! before it looks at the donation, so a refused caller learns nothing about
//! whether the donation exists.

use serde::{Deserialize, Serialize};

use crate::types::Principal;

pub trait Authorizer {
    fn is_authorized(&self, caller: &Principal) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&Principal) -> bool,
{
    fn is_authorized(&self, caller: &Principal) -> bool {
        self(caller)
    }
}

/// Who may release escrowed donations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Any caller may release.
    #[default]
    Open,
    /// Only the contract owner may release.
    Owner(Principal),
}

impl Authorizer for ReleasePolicy {
    fn is_authorized(&self, caller: &Principal) -> bool {
        match self {
            Self::Open => true,
            Self::Owner(owner) => owner == caller,
        }
    }
}
