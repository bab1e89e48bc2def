use std::ops::Sub;

use nalgebra::{ClosedAddAssign, ClosedDivAssign, Point, Scalar};

use super::{FloatType, WorldBox, WorldPoint};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl<T: Scalar + ClosedAddAssign + ClosedDivAssign + From<u8>, const D: usize> AABB<Point<T, D>> {
    pub fn center(&self) -> Point<T, D> {
        let two = T::from(2u8);
        let avg_coords = (&self.min.coords + &self.max.coords) / two;
        Point::from(avg_coords)
    }
}

impl WorldBox {
    /// Box covering the whole space, used for unbounded surfaces.
    pub fn infinite() -> WorldBox {
        WorldBox::new(
            WorldPoint::from([FloatType::NEG_INFINITY; 3]),
            WorldPoint::from([FloatType::INFINITY; 3]),
        )
    }

    /// Smallest box containing all the points, None if the iterator is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> Option<WorldBox> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(WorldBox::new(*first, *first), |b, p| b.union_point(p)))
    }

    pub fn union_point(&self, p: &WorldPoint) -> WorldBox {
        WorldBox::new(self.min.inf(p), self.max.sup(p))
    }

    pub fn union(&self, other: &WorldBox) -> WorldBox {
        WorldBox::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// True if no coordinate of the box is infinite or NaN.
    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|x| x.is_finite())
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &WorldPoint) -> bool {
        (0..3).all(|axis| self.min[axis] <= p[axis] && p[axis] <= self.max[axis])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::{assert, let_assert};

    #[test]
    fn from_points_covers_all() {
        let points = [
            WorldPoint::new(1.0, -2.0, 3.0),
            WorldPoint::new(-1.0, 5.0, 0.0),
            WorldPoint::new(0.0, 0.0, 7.0),
        ];
        let_assert!(Some(b) = WorldBox::from_points(&points));
        assert!(b.min == WorldPoint::new(-1.0, -2.0, 0.0));
        assert!(b.max == WorldPoint::new(1.0, 5.0, 7.0));
        assert!(points.iter().all(|p| b.contains(p)));
    }

    #[test]
    fn from_no_points() {
        assert!(WorldBox::from_points(&[]).is_none());
    }

    #[test]
    fn center_and_size() {
        let b = WorldBox::new(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(2.0, 4.0, 6.0));
        assert!(b.center() == WorldPoint::new(1.0, 2.0, 3.0));
        assert!(b.size() == nalgebra::Vector3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn infinite_box_is_not_finite() {
        assert!(!WorldBox::infinite().is_finite());
        let b = WorldBox::new(WorldPoint::origin(), WorldPoint::new(1.0, 1.0, 1.0));
        assert!(b.is_finite());
        assert!(!b.union(&WorldBox::infinite()).is_finite());
    }

    #[test]
    fn contains_is_inclusive() {
        let b = WorldBox::new(WorldPoint::origin(), WorldPoint::new(1.0, 1.0, 1.0));
        assert!(b.contains(&WorldPoint::new(1.0, 0.0, 0.5)));
        assert!(!b.contains(&WorldPoint::new(1.0 + 1e-9, 0.0, 0.5)));
    }
}
