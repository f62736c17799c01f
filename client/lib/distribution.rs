//! Parsed recipient lists and their totals.

use serde::{Deserialize, Serialize};

use disperse_types::{Address, U256};

use crate::error::{Error, Result};

/// One recipient and the amount they receive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientEntry {
    /// Receiving address.
    pub address: Address,
    /// The amount as entered by the operator.
    pub display_amount: String,
    /// `display_amount` in base units at the list's unit count.
    pub base_units: U256,
}

/// An ordered, fully validated list of recipients.
///
/// Only [`parse`](crate::parsing::parse) creates these, and only if every line was valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecipientList {
    entries: Vec<RecipientEntry>,
    unit_count: u8,
}

impl RecipientList {
    pub(crate) fn new(entries: Vec<RecipientEntry>, unit_count: u8) -> Self {
        RecipientList {
            entries,
            unit_count,
        }
    }

    /// The recipients in input order.
    pub fn entries(&self) -> &[RecipientEntry] {
        &self.entries
    }

    /// Unit count the amounts were converted with.
    pub fn unit_count(&self) -> u8 {
        self.unit_count
    }

    /// Number of recipients.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list has no recipients.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Receiving addresses in order.
    pub fn receivers(&self) -> Vec<Address> {
        self.entries.iter().map(|entry| entry.address).collect()
    }

    /// Base-unit amounts in order.
    pub fn amounts(&self) -> Vec<U256> {
        self.entries.iter().map(|entry| entry.base_units).collect()
    }
}

/// Sums the base-unit amounts of all entries.
pub fn total(list: &RecipientList) -> Result<U256> {
    list.entries.iter().try_fold(U256::zero(), |sum, entry| {
        sum.checked_add(entry.base_units)
            .ok_or(Error::AmountOverflow)
    })
}

/// What the operator sees before submitting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DistributionSummary {
    /// Symbol of the asset, if known.
    pub symbol: Option<String>,
    /// Number of recipients.
    pub recipients: usize,
    /// Total in base units.
    pub total: U256,
    /// Total as a decimal string.
    pub display_total: String,
    /// Known allowance for token distributions.
    pub allowance: Option<U256>,
    /// Known allowance as a decimal string.
    pub display_allowance: Option<String>,
    /// Whether an authorization must be confirmed before the transfer.
    pub needs_authorization: bool,
}
