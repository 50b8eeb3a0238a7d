use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    room::{Room, room_order},
    status::{BaseStatus, CompositeStatus},
};

/// Dashboard buckets. A room may belong to several of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RoomFilter {
    /// Every room.
    All,
    /// Someone is staying in the room.
    Occupied,
    /// A guest is expected today.
    Arrival,
    /// Housekeeping is done.
    Cleaned,
    /// Housekeeping is pending.
    NotCleaned,
    /// Inspected and ready.
    Checked,
    /// Due out, guest not gone yet.
    NotDeparted,
}

impl RoomFilter {
    /// Whether a room in `status` belongs to this bucket.
    pub fn matches(self, status: CompositeStatus) -> bool {
        use BaseStatus::*;

        let base = status.base();
        match self {
            RoomFilter::All => true,
            RoomFilter::Occupied => matches!(base, Od | Oc | Dnd | Nn),
            RoomFilter::Arrival => status.has_arrival(),
            RoomFilter::Cleaned => matches!(base, Oc | Vc),
            RoomFilter::NotCleaned => matches!(base, Vd | Od | Dnd | Nn | Do),
            RoomFilter::Checked => base == Ip,
            RoomFilter::NotDeparted => base == Do,
        }
    }
}

/// Number of rooms per dashboard bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CounterSet {
    /// Every room.
    pub all: usize,
    /// od, oc, dnd, nn.
    pub occupied: usize,
    /// Any status with the arrival flag.
    pub arrival: usize,
    /// oc, vc, vc/arr.
    pub cleaned: usize,
    /// vd, od, dnd, nn, do (with or without arrival).
    #[serde(rename = "not-cleaned")]
    pub not_cleaned: usize,
    /// ip.
    pub checked: usize,
    /// do, do/arr.
    #[serde(rename = "not-departed")]
    pub not_departed: usize,
}

impl CounterSet {
    fn record(&mut self, status: CompositeStatus) {
        let bump = |slot: &mut usize, filter: RoomFilter| {
            if filter.matches(status) {
                *slot += 1;
            }
        };

        bump(&mut self.all, RoomFilter::All);
        bump(&mut self.occupied, RoomFilter::Occupied);
        bump(&mut self.arrival, RoomFilter::Arrival);
        bump(&mut self.cleaned, RoomFilter::Cleaned);
        bump(&mut self.not_cleaned, RoomFilter::NotCleaned);
        bump(&mut self.checked, RoomFilter::Checked);
        bump(&mut self.not_departed, RoomFilter::NotDeparted);
    }
}

/// Count rooms per bucket in a single pass.
pub fn compute_counters<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> CounterSet {
    let mut counters = CounterSet::default();
    for room in rooms {
        counters.record(room.status());
    }
    counters
}

/// Rooms belonging to `filter`, in dashboard order.
pub fn filter_rooms(rooms: &[Room], filter: RoomFilter) -> Vec<&Room> {
    let mut selected: Vec<&Room> = rooms
        .iter()
        .filter(|room| filter.matches(room.status()))
        .collect();
    selected.sort_by(|a, b| room_order(a.room_no(), b.room_no()));
    selected
}

/// Number of rooms per composite status, listed in base status order with the
/// arrival variant right after its base. Statuses with no room are omitted.
pub fn status_statistics(rooms: &[Room]) -> IndexMap<CompositeStatus, usize> {
    let mut stats: IndexMap<CompositeStatus, usize> = BaseStatus::ALL
        .into_iter()
        .flat_map(|base| {
            let plain = std::iter::once(CompositeStatus::plain(base));
            let arrival = base
                .can_have_arrival()
                .then(|| CompositeStatus::new(base, true));
            plain.chain(arrival)
        })
        .map(|status| (status, 0))
        .collect();

    for room in rooms {
        *stats.entry(room.status()).or_default() += 1;
    }
    stats.retain(|_, count| *count > 0);
    stats
}

/// Rooms grouped by floor, floors and rooms in ascending order.
pub fn group_by_floor(rooms: &[Room]) -> IndexMap<String, Vec<&Room>> {
    let mut sorted: Vec<&Room> = rooms.iter().collect();
    sorted.sort_by(|a, b| room_order(a.room_no(), b.room_no()));

    let mut floors: IndexMap<String, Vec<&Room>> = IndexMap::new();
    for room in sorted {
        floors.entry(room.floor()).or_default().push(room);
    }
    floors.sort_by(|a, _, b, _| room_order(a, b));
    floors
}

#[cfg(test)]
mod tests {
    use super::*;
    use BaseStatus::*;

    fn room(no: &str, base: BaseStatus, arrival: bool) -> Room {
        Room::new(no, CompositeStatus::new(base, arrival))
    }

    fn sample() -> Vec<Room> {
        vec![
            room("101", Od, false),
            room("102", Oc, false),
            room("103", Vc, true),
            room("104", Do, true),
            room("201", Vd, false),
            room("202", Ip, false),
            room("203", Dnd, false),
            room("1001", Lock, false),
        ]
    }

    #[test]
    fn buckets_overlap() {
        let counters = compute_counters(&sample());
        assert_eq!(
            counters,
            CounterSet {
                all: 8,
                occupied: 3,
                arrival: 2,
                cleaned: 2,
                not_cleaned: 4,
                checked: 1,
                not_departed: 1,
            }
        );

        // vc/arr counts as both arrival and cleaned.
        let single = compute_counters(&[room("9", Vc, true)]);
        assert_eq!(single.arrival, 1);
        assert_eq!(single.cleaned, 1);
    }

    #[test]
    fn bucket_membership_table() {
        use RoomFilter::{Arrival, Checked, NotCleaned, NotDeparted, Occupied};

        let cases: [(CompositeStatus, &[RoomFilter]); 5] = [
            (CompositeStatus::new(Vd, true), &[Arrival, NotCleaned]),
            (CompositeStatus::new(Do, true), &[Arrival, NotCleaned, NotDeparted]),
            (CompositeStatus::plain(Nn), &[Occupied, NotCleaned]),
            (CompositeStatus::plain(Ip), &[Checked]),
            (CompositeStatus::plain(Lock), &[]),
        ];
        let filters = [
            RoomFilter::Occupied,
            RoomFilter::Arrival,
            RoomFilter::Cleaned,
            RoomFilter::NotCleaned,
            RoomFilter::Checked,
            RoomFilter::NotDeparted,
        ];

        for (status, expected) in cases {
            for filter in filters {
                assert_eq!(
                    filter.matches(status),
                    expected.contains(&filter),
                    "{status} in {filter:?}"
                );
            }
        }
    }

    #[test]
    fn counters_serialize_with_dashboard_keys() {
        let value = serde_json::to_value(CounterSet::default()).unwrap();
        assert!(value.get("not-cleaned").is_some());
        assert!(value.get("not-departed").is_some());
    }

    #[test]
    fn filter_sorts_numerically() {
        let rooms = sample();
        let numbers: Vec<_> = filter_rooms(&rooms, RoomFilter::NotCleaned)
            .into_iter()
            .map(Room::room_no)
            .collect();
        assert_eq!(numbers, vec!["101", "104", "201", "203"]);
    }

    #[test]
    fn statistics_in_display_order() {
        let mut rooms = sample();
        rooms.push(room("105", Od, false));
        let stats = status_statistics(&rooms);
        let keys: Vec<_> = stats.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["vd", "vc/arr", "do/arr", "od", "oc", "dnd", "lock", "ip"]);
        assert_eq!(stats[&CompositeStatus::plain(Od)], 2);
    }

    #[test]
    fn floors_are_grouped_in_order() {
        let rooms = sample();
        let floors = group_by_floor(&rooms);
        let labels: Vec<_> = floors.keys().cloned().collect();
        assert_eq!(labels, vec!["1", "2", "10"]);
        assert_eq!(floors["1"].len(), 4);
    }
}
