use crate::scope::{ExclusionScope, ExclusionScopes, is_date_key};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

/// Upper bound on the forward search performed by [`ExclusionSet::next_available`].
pub const MAX_LOOKAHEAD_DAYS: i64 = 366;

/// Union of the non-working dates declared by the business, commerce and queue
/// scopes of a single query. Entries are `YYYY-MM-DD` keys kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    dates: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn collect(
        business: Option<&ExclusionScope>,
        commerce: Option<&ExclusionScope>,
        queue: Option<&ExclusionScope>,
    ) -> Self {
        let mut dates = BTreeSet::new();
        for scope in [business, commerce, queue].into_iter().flatten() {
            for date in scope.declared_dates() {
                if is_date_key(date) {
                    dates.insert(date.clone());
                } else {
                    log::debug!("ignoring malformed non-working date '{date}'");
                }
            }
        }
        log::debug!("aggregated {} non-working dates", dates.len());
        Self { dates }
    }

    pub fn from_scopes(scopes: &ExclusionScopes) -> Self {
        Self::collect(
            scopes.business.as_ref(),
            scopes.commerce.as_ref(),
            scopes.queue.as_ref(),
        )
    }

    pub fn contains(&self, date: &str) -> bool {
        !date.is_empty() && self.dates.contains(date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.dates.iter().map(String::as_str)
    }

    /// Dates whose key starts with the zero-padded `YYYY-MM` prefix.
    pub fn in_month(&self, year: i32, month: u32) -> Vec<String> {
        let prefix = format!("{year:04}-{month:02}");
        self.dates
            .iter()
            .filter(|date| date.starts_with(&prefix))
            .cloned()
            .collect()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.dates.into_iter().collect()
    }

    /// Check if a calendar day can be booked
    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.dates.contains(&date_key(date))
    }

    /// First bookable day strictly after `from`
    pub fn next_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from;
        for _ in 0..MAX_LOOKAHEAD_DAYS {
            current = current.checked_add_signed(Duration::days(1))?;
            if self.is_available(current) {
                return Some(current);
            }
        }
        None
    }

    /// Bookable days between `start` and `end`, inclusive
    pub fn available_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;
        while current <= end {
            if self.is_available(current) {
                days.push(current);
            }
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        days
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Sorted, deduplicated union of the three scopes' non-working dates.
pub fn collect_exclusion_dates(
    business: Option<&ExclusionScope>,
    commerce: Option<&ExclusionScope>,
    queue: Option<&ExclusionScope>,
) -> Vec<String> {
    ExclusionSet::collect(business, commerce, queue).into_vec()
}

pub fn is_excluded(
    date: &str,
    business: Option<&ExclusionScope>,
    commerce: Option<&ExclusionScope>,
    queue: Option<&ExclusionScope>,
) -> bool {
    if date.is_empty() {
        return false;
    }
    ExclusionSet::collect(business, commerce, queue).contains(date)
}

/// Drops excluded candidates, keeping input order and duplicates.
/// A missing candidate list yields an empty result.
pub fn filter_available<S>(
    candidates: Option<&[S]>,
    business: Option<&ExclusionScope>,
    commerce: Option<&ExclusionScope>,
    queue: Option<&ExclusionScope>,
) -> Vec<S>
where
    S: AsRef<str> + Clone,
{
    let Some(candidates) = candidates else {
        return Vec::new();
    };
    let excluded = ExclusionSet::collect(business, commerce, queue);
    candidates
        .iter()
        .filter(|candidate| !excluded.contains(candidate.as_ref()))
        .cloned()
        .collect()
}

pub fn exclusions_for_month(
    year: i32,
    month: u32,
    business: Option<&ExclusionScope>,
    commerce: Option<&ExclusionScope>,
    queue: Option<&ExclusionScope>,
) -> Vec<String> {
    ExclusionSet::collect(business, commerce, queue).in_month(year, month)
}

impl ExclusionScopes {
    pub fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::from_scopes(self)
    }

    pub fn collect_exclusion_dates(&self) -> Vec<String> {
        self.exclusion_set().into_vec()
    }

    pub fn is_excluded(&self, date: &str) -> bool {
        self.exclusion_set().contains(date)
    }

    pub fn filter_available<S>(&self, candidates: Option<&[S]>) -> Vec<S>
    where
        S: AsRef<str> + Clone,
    {
        filter_available(
            candidates,
            self.business.as_ref(),
            self.commerce.as_ref(),
            self.queue.as_ref(),
        )
    }

    pub fn exclusions_for_month(&self, year: i32, month: u32) -> Vec<String> {
        self.exclusion_set().in_month(year, month)
    }
}
