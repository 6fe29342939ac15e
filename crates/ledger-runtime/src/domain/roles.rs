//! Owner, operator and fee-account identities.

use super::errors::LedgerError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ZERO_ADDRESS};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Operator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Operator => write!(f, "operator"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub owner: Address,
    pub operator: Address,
    /// Receives withdrawal and settlement fees.
    pub fee_account: Address,
}

impl Roles {
    pub fn new(owner: Address, operator: Address, fee_account: Address) -> Result<Self, LedgerError> {
        non_zero("owner", owner)?;
        non_zero("operator", operator)?;
        non_zero("fee account", fee_account)?;
        Ok(Self {
            owner,
            operator,
            fee_account,
        })
    }

    pub fn require_owner(&self, caller: &Address) -> Result<(), LedgerError> {
        require(Role::Owner, &self.owner, caller)
    }

    pub fn require_operator(&self, caller: &Address) -> Result<(), LedgerError> {
        require(Role::Operator, &self.operator, caller)
    }
}

fn require(role: Role, holder: &Address, caller: &Address) -> Result<(), LedgerError> {
    if holder != caller {
        return Err(LedgerError::Unauthorized {
            caller: *caller,
            role,
        });
    }
    Ok(())
}

/// Reject the zero address for `what`.
pub fn non_zero(what: &'static str, address: Address) -> Result<Address, LedgerError> {
    if address == ZERO_ADDRESS {
        return Err(LedgerError::ZeroAddress(what));
    }
    Ok(address)
}
