//! Calendar-day view of rental windows and the overlap rule.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use super::RentalWindow;

/// Maps instants onto the marketplace's calendar days.
///
/// Overlap and "today" decisions are made on dates in this calendar, so
/// intra-day timestamps and client time zones never split a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingCalendar {
    offset: FixedOffset,
}

impl Default for BookingCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl BookingCalendar {
    /// Calendar whose days begin at UTC midnight.
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Calendar anchored at a fixed UTC offset.
    pub const fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar date on which `instant` falls.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// First and last calendar day touched by `window`.
    pub fn day_span(&self, window: &RentalWindow) -> (NaiveDate, NaiveDate) {
        (self.date_of(window.start()), self.date_of(window.end()))
    }

    /// Whether a candidate `[start, end]` collides with an existing window.
    ///
    /// Bounds are inclusive at day granularity: a rental returning on day N
    /// conflicts with one collected on day N.
    ///
    /// # Examples
    /// ```
    /// use carshare_backend::domain::{BookingCalendar, RentalWindow};
    /// use chrono::{TimeZone, Utc};
    ///
    /// let at = |d, h| Utc.with_ymd_and_hms(2025, 6, d, h, 0, 0).unwrap();
    /// let calendar = BookingCalendar::utc();
    /// let existing = RentalWindow::new(at(1, 9), at(4, 9));
    /// assert!(calendar.overlaps(&existing, at(4, 18), at(6, 9)));
    /// assert!(!calendar.overlaps(&existing, at(5, 0), at(6, 9)));
    /// ```
    pub fn overlaps(
        &self,
        existing: &RentalWindow,
        candidate_start: DateTime<Utc>,
        candidate_end: DateTime<Utc>,
    ) -> bool {
        let (existing_start, existing_end) = self.day_span(existing);
        let start = self.date_of(candidate_start);
        let end = self.date_of(candidate_end);

        let start_inside = existing_start <= start && start <= existing_end;
        let end_inside = existing_start <= end && end <= existing_end;
        let encloses = start <= existing_start && existing_end <= end;

        start_inside || end_inside || encloses
    }

    /// [`Self::overlaps`] for two windows.
    pub fn windows_overlap(&self, existing: &RentalWindow, candidate: &RentalWindow) -> bool {
        self.overlaps(existing, candidate.start(), candidate.end())
    }
}
