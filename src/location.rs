use serde::*;

/// Compact signed cell coordinate.
///
/// Unlocked areas can extend left/up of the origin, so both axes are signed.
/// The two `i16` halves are packed into a single `u32` so the type is `Copy`,
/// hashes cheaply and serializes as one integer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct Location {
    packed: u32,
}

impl Location {
    pub fn from_coords(x: i32, y: i32) -> Self {
        debug_assert!(i16::try_from(x).is_ok() && i16::try_from(y).is_ok());
        Location {
            packed: (((x as i16 as u16) as u32) << 16) | ((y as i16 as u16) as u32),
        }
    }

    #[inline]
    pub fn x(self) -> i32 {
        ((self.packed >> 16) as u16) as i16 as i32
    }

    #[inline]
    pub fn y(self) -> i32 {
        (self.packed as u16) as i16 as i32
    }

    #[inline]
    pub fn packed_repr(self) -> u32 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u32) -> Self {
        Location { packed }
    }

    /// Chebyshev distance.
    pub fn distance_to(self, other: Self) -> i32 {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        dx.abs().max(dy.abs())
    }

    /// Manhattan distance (road adjacency uses this; diagonals don't connect).
    pub fn manhattan_distance_to(self, other: Self) -> i32 {
        (self.x() - other.x()).abs() + (self.y() - other.y()).abs()
    }
}

impl std::ops::Add<(i32, i32)> for Location {
    type Output = Self;
    fn add(self, other: (i32, i32)) -> Self {
        Location::from_coords(self.x() + other.0, self.y() + other.1)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x(), self.y())
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Location::from_packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_round_trip_negative_coords() {
        for &(x, y) in &[(0, 0), (5, 7), (-3, 12), (-1, -1), (199, -40)] {
            let loc = Location::from_coords(x, y);
            assert_eq!(loc.x(), x);
            assert_eq!(loc.y(), y);
            let back = Location::from_packed(loc.packed_repr());
            assert_eq!(back, loc);
        }
    }

    #[test]
    fn distances() {
        let a = Location::from_coords(-2, 3);
        let b = Location::from_coords(1, 1);
        assert_eq!(a.distance_to(b), 3);
        assert_eq!(a.manhattan_distance_to(b), 5);
    }
}
