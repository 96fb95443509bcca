//! Module: csn
//! Responsibility: change-sequence-number values and their generator.
//! Does not own: deciding when an entry needs stamping (façade concern).

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::{self, Display};

///
/// Csn
///
/// A change sequence number in the standard entryCSN rendering:
/// `<utc-timestamp>#<change-count>#<replica-id>#<operation-number>`.
/// Ordering follows the rendered form, so newer CSNs sort later.
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Csn {
    time: DateTime<Utc>,
    change_count: u32,
    replica_id: u16,
    operation_number: u32,
}

impl Csn {
    #[must_use]
    pub const fn new(
        time: DateTime<Utc>,
        change_count: u32,
        replica_id: u16,
        operation_number: u32,
    ) -> Self {
        Self {
            time,
            change_count,
            replica_id,
            operation_number,
        }
    }

    #[must_use]
    pub const fn replica_id(&self) -> u16 {
        self.replica_id
    }
}

impl Display for Csn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{:06x}#{:03x}#{:06x}",
            self.time.format("%Y%m%d%H%M%S%.6fZ"),
            self.change_count,
            self.replica_id,
            self.operation_number
        )
    }
}

///
/// CsnFactory
///
/// Produces strictly increasing CSNs for one replica. Single-writer like the
/// store itself, so no internal locking.
///

#[derive(Debug)]
pub struct CsnFactory {
    replica_id: u16,
    last_millis: i64,
    change_count: u32,
}

impl CsnFactory {
    #[must_use]
    pub const fn new(replica_id: u16) -> Self {
        Self {
            replica_id,
            last_millis: 0,
            change_count: 0,
        }
    }

    /// Next CSN: wall clock when it moved forward, otherwise the previous
    /// tick with a bumped change count.
    pub fn next(&mut self) -> Csn {
        let now = Utc::now().timestamp_millis();

        if now > self.last_millis {
            self.last_millis = now;
            self.change_count = 0;
        } else {
            self.change_count += 1;
        }

        let time = Utc
            .timestamp_millis_opt(self.last_millis)
            .single()
            .unwrap_or_else(Utc::now);

        Csn::new(time, self.change_count, self.replica_id, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csns_are_strictly_increasing() {
        let mut factory = CsnFactory::new(1);
        let mut previous = factory.next();

        for _ in 0..100 {
            let next = factory.next();
            assert!(next > previous, "{next} !> {previous}");
            previous = next;
        }
    }

    #[test]
    fn rendering_matches_the_standard_shape() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let csn = Csn::new(time, 7, 3, 0);

        assert_eq!(csn.to_string(), "20240102030405.000000Z#000007#003#000000");
    }
}
