//! Phone number → contact name lookup, keyed the way message handles are.
//!
//! The address book's full-text search table stores every phone number of a
//! person as one space-separated string holding several spellings of each
//! number (international, national, local, bare digits, ...). Which token is
//! the one that matches a message handle is a property of the address book
//! version, not something that can be parsed generically, so it is captured
//! as a [`PhoneDialect`].

use std::collections::HashMap;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::contacts::load_contacts;
use crate::error::Result;
use crate::models::{ContactRecord, FirstLast};

/// Layout of the concatenated phone column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneDialect {
    /// iOS address book as of the `ABPersonFullTextSearch` schema: the
    /// handle-compatible number is the 4th token from the end, and a
    /// usable string has at least 5 tokens.
    #[default]
    AddressBookV1,
}

impl PhoneDialect {
    /// Position of the handle-compatible token, counted from the end (1 = last)
    #[must_use]
    pub const fn offset_from_end(self) -> usize {
        match self {
            Self::AddressBookV1 => 4,
        }
    }

    /// Fewest tokens a phone string must split into to be usable
    #[must_use]
    pub const fn min_tokens(self) -> usize {
        match self {
            Self::AddressBookV1 => 5,
        }
    }

    /// Extract the handle key (`+<digits>`) from a raw phone string
    #[must_use]
    pub fn normalize(self, phone_raw: &str) -> Option<String> {
        let tokens: Vec<&str> = phone_raw.split(' ').collect();
        if tokens.len() < self.min_tokens() {
            return None;
        }

        let token = tokens[tokens.len() - self.offset_from_end()].trim_start_matches('+');
        if token.is_empty() {
            return None;
        }
        Some(format!("+{token}"))
    }
}

/// Immutable lookup from message handle to contact name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneIndex {
    entries: HashMap<String, FirstLast>,
}

impl PhoneIndex {
    /// Build the index from contact records
    ///
    /// Records without a first name or with too few phone tokens are
    /// skipped. When two contacts share a number the later one wins.
    #[must_use]
    pub fn build<'a, I>(records: I, dialect: PhoneDialect) -> Self
    where
        I: IntoIterator<Item = &'a ContactRecord>,
    {
        let mut entries = HashMap::new();
        let mut skipped = 0usize;

        for record in records {
            let first = match record.first.as_option() {
                Some(first) if !first.is_empty() => first,
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let Some(key) = record.phone_raw.as_option().and_then(|p| dialect.normalize(p)) else {
                skipped += 1;
                continue;
            };

            entries.insert(
                key,
                FirstLast {
                    first: first.clone(),
                    last: record.last.to_cell(),
                },
            );
        }

        debug!(entries = entries.len(), skipped, "Built phone index");
        Self { entries }
    }

    /// Look up a message handle
    #[must_use]
    pub fn lookup(&self, handle: &str) -> Option<&FirstLast> {
        self.entries.get(handle)
    }

    /// Number of distinct handles
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no contact could be indexed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load contacts and build the phone index in one step
pub fn build_phone_index(conn: &Connection, dialect: PhoneDialect) -> Result<PhoneIndex> {
    let contacts = load_contacts(conn)?;
    let index = PhoneIndex::build(&contacts, dialect);
    info!(contacts = contacts.len(), indexed = index.len(), "Identity directory ready");
    Ok(index)
}
