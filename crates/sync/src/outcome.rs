// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

/// Result of a single remote call.
///
/// `Success` and `Failure` are definitive: the unit of work is resolved and
/// will not be retried. `NoResponse` (unreachable, timeout) leaves all local
/// state untouched so the same unit is attempted again next episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Failure(String),
    NoResponse,
}

impl<T> Outcome<T> {
    pub fn failure(reason: impl Into<String>) -> Self {
        Outcome::Failure(reason.into())
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(reason) => Outcome::Failure(reason),
            Outcome::NoResponse => Outcome::NoResponse,
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
