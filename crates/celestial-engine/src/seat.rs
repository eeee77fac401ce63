//! Per-seat storage.

use std::ops::{Index, IndexMut};

use celestial_protocol::{Seat, Tally};

/// One value per seat, indexed by [`Seat`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerSeat<T>([T; 2]);

impl<T> PerSeat<T> {
    pub fn new(first: T, second: T) -> Self {
        Self([first, second])
    }

    /// Builds both entries from a factory that receives the seat.
    pub fn from_fn(mut f: impl FnMut(Seat) -> T) -> Self {
        Self([f(Seat::First), f(Seat::Second)])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        Seat::BOTH.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Seat, &mut T)> {
        Seat::BOTH.into_iter().zip(self.0.iter_mut())
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerSeat<U> {
        PerSeat([f(&self.0[0]), f(&self.0[1])])
    }

    /// Reorders both entries around `viewer`.
    pub fn relative_to(&self, viewer: Seat) -> Tally<T>
    where
        T: Clone,
    {
        Tally {
            me: self[viewer].clone(),
            opponent: self[viewer.other()].clone(),
        }
    }
}

impl<T> Index<Seat> for PerSeat<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &T {
        &self.0[seat.index()]
    }
}

impl<T> IndexMut<Seat> for PerSeat<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.0[seat.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_by_seat() {
        let mut wins = PerSeat::new(0u32, 0u32);
        wins[Seat::Second] += 2;
        assert_eq!(wins[Seat::First], 0);
        assert_eq!(wins[Seat::Second], 2);
    }

    #[test]
    fn test_relative_to_flips_for_second_seat() {
        let scores = PerSeat::new(3, 7);
        let t = scores.relative_to(Seat::Second);
        assert_eq!(t.me, 7);
        assert_eq!(t.opponent, 3);
    }

    #[test]
    fn test_from_fn_and_iter_follow_table_order() {
        let seats = PerSeat::from_fn(|s| s.index());
        let collected: Vec<_> = seats.iter().map(|(s, v)| (s, *v)).collect();
        assert_eq!(collected, vec![(Seat::First, 0), (Seat::Second, 1)]);
    }
}
