use rand::{distr::Alphanumeric, Rng};
use rusqlite::ffi;

/// Length of the public app alias.
pub const ALIAS_LEN: usize = 4;

/// Attempt cap for the alias insert loop. The alias space (62^4) is large
/// relative to any plausible app table, so hitting this means the generator
/// or the table is broken.
pub const MAX_ALIAS_ATTEMPTS: u32 = 64;

/// Source of candidate aliases for newly created apps.
pub trait AliasSource: Send {
    fn next_alias(&mut self) -> String;
}

/// Default source: uniform random alphanumeric strings.
pub struct RandomAlias {
    len: usize,
}

impl RandomAlias {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Default for RandomAlias {
    fn default() -> Self {
        Self::new(ALIAS_LEN)
    }
}

impl AliasSource for RandomAlias {
    fn next_alias(&mut self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.len)
            .map(char::from)
            .collect()
    }
}

/// Whether `err` is a unique-constraint failure on the `app.alias` column.
///
/// Only that exact column is recoverable by regenerating the alias; a
/// unique violation anywhere else must surface to the caller.
pub(crate) fn is_alias_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, Some(message)) => {
            (code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || code.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
                && message.contains("app.alias")
        }
        _ => false,
    }
}
