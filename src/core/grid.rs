use generic_array::{ArrayLength, GenericArray};
use std::ops::{Deref, Index, IndexMut};

/// Index struct to access elements in the [`Grid`].
/// Row 0 is the top row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridIndex {
    row: usize,
    col: usize,
}

impl From<(usize, usize)> for GridIndex {
    fn from(value: (usize, usize)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl GridIndex {
    /// Constructs a new [`GridIndex`].
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns value of `self.col`
    pub fn col(&self) -> usize {
        self.col
    }

    /// Returns value of `self.row`
    pub fn row(&self) -> usize {
        self.row
    }
}

/// Two-dimensional fixed-length array that stores values and allows to mutate them.
/// Length of array is defined by generic parameters `R` and `C`.
#[derive(Clone, Debug)]
pub struct Grid<T, R: ArrayLength, C: ArrayLength> {
    contents: GenericArray<GenericArray<T, C>, R>,
}

impl<T: Default, R: ArrayLength, C: ArrayLength> Default for Grid<T, R, C> {
    fn default() -> Self {
        Self {
            contents: Default::default(),
        }
    }
}

impl<T, R: ArrayLength, C: ArrayLength> Deref for Grid<T, R, C> {
    type Target = [GenericArray<T, C>];

    fn deref(&self) -> &Self::Target {
        self.contents.as_slice()
    }
}

impl<T, R: ArrayLength, C: ArrayLength> Index<GridIndex> for Grid<T, R, C> {
    type Output = T;

    fn index(&self, index: GridIndex) -> &Self::Output {
        &self.contents[index.row()][index.col()]
    }
}

impl<T, R: ArrayLength, C: ArrayLength> IndexMut<GridIndex> for Grid<T, R, C> {
    fn index_mut(&mut self, index: GridIndex) -> &mut Self::Output {
        &mut self.contents[index.row()][index.col()]
    }
}

impl<T, R: ArrayLength, C: ArrayLength> Grid<T, R, C> {
    /// Returns an iterator to indexed grid elements row by row
    pub fn all_indexed(&self) -> impl Iterator<Item = (GridIndex, &T)> {
        (0..self.contents.len()).flat_map(move |i| self.right_iter((i, 0).into()).indexed())
    }

    /// Returns an iterator with rightwards direction that starts with a `pos`.
    pub fn right_iter(&self, pos: GridIndex) -> GridIterator<'_, T, R, C> {
        GridIterator::new(self, pos, Direction::Right)
    }

    /// Returns an iterator with upwards direction that starts with a `pos`.
    pub fn top_iter(&self, pos: GridIndex) -> GridIterator<'_, T, R, C> {
        GridIterator::new(self, pos, Direction::Top)
    }

    /// Returns an iterator with downwards direction that starts with a `pos`.
    pub fn bottom_iter(&self, pos: GridIndex) -> GridIterator<'_, T, R, C> {
        GridIterator::new(self, pos, Direction::Bottom)
    }

    /// Returns a diagonal iterator with bottom-right direction that starts with a `pos`.
    pub fn bottom_right_iter(&self, pos: GridIndex) -> GridIterator<'_, T, R, C> {
        GridIterator::new(self, pos, Direction::BottomRight)
    }

    /// Returns a diagonal iterator with bottom-left direction that starts with a `pos`.
    pub fn bottom_left_iter(&self, pos: GridIndex) -> GridIterator<'_, T, R, C> {
        GridIterator::new(self, pos, Direction::BottomLeft)
    }
}

/// Step applied to a [`GridIndex`] on every iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Direction {
    Right,
    Top,
    Bottom,
    BottomRight,
    BottomLeft,
}

impl Direction {
    fn step(self, index: GridIndex) -> Option<GridIndex> {
        let GridIndex { row, col } = index;
        match self {
            Direction::Right => Some(GridIndex::new(row, col + 1)),
            Direction::Top => row.checked_sub(1).map(|row| GridIndex::new(row, col)),
            Direction::Bottom => Some(GridIndex::new(row + 1, col)),
            Direction::BottomRight => Some(GridIndex::new(row + 1, col + 1)),
            Direction::BottomLeft => col.checked_sub(1).map(|col| GridIndex::new(row + 1, col)),
        }
    }
}

/// An iterator that walks the [`Grid`] in a fixed [`Direction`].
/// Stops when underlying [`GridIndex`] goes out of [`Grid`] scope.
pub struct GridIterator<'a, T, R: ArrayLength, C: ArrayLength> {
    current: Option<GridIndex>,
    direction: Direction,
    grid: &'a Grid<T, R, C>,
}

impl<'a, T, R: ArrayLength, C: ArrayLength> GridIterator<'a, T, R, C> {
    fn new(grid: &'a Grid<T, R, C>, pos: GridIndex, direction: Direction) -> Self {
        Self {
            current: Some(pos),
            direction,
            grid,
        }
    }

    fn in_bounds(index: GridIndex) -> bool {
        index.row < R::to_usize() && index.col < C::to_usize()
    }

    /// Returns current [`GridIndex`] if it is valid, otherwise [`None`].
    fn get_index(&self) -> Option<GridIndex> {
        self.current.filter(|&index| Self::in_bounds(index))
    }

    /// Returns an iterator which gives the current iteration [`GridIndex`]
    /// as well as the next value.
    pub fn indexed(self) -> IndexedGridIterator<'a, T, R, C> {
        IndexedGridIterator { it: self }
    }
}

impl<'a, T, R: ArrayLength, C: ArrayLength> Iterator for GridIterator<'a, T, R, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.get_index()?;
        self.current = self.direction.step(current);
        Some(&self.grid[current])
    }
}

/// An iterator that yields the current [`GridIndex`] and the element during iteration.
pub struct IndexedGridIterator<'a, T, R: ArrayLength, C: ArrayLength> {
    it: GridIterator<'a, T, R, C>,
}

impl<'a, T, R: ArrayLength, C: ArrayLength> Iterator for IndexedGridIterator<'a, T, R, C> {
    type Item = (GridIndex, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.it.get_index()?;
        self.it.next().map(|item| (index, item))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use generic_array::typenum;

    type SmallGrid = Grid<usize, typenum::U2, typenum::U3>;

    #[test]
    fn test_all_indexed() {
        let mut grid = Grid::<usize, typenum::U2, typenum::U2>::default();
        grid[(1, 1).into()] = 1;
        itertools::assert_equal(
            grid.all_indexed(),
            [
                ((0, 0).into(), &0),
                ((0, 1).into(), &0),
                ((1, 0).into(), &0),
                ((1, 1).into(), &1),
            ]
            .into_iter(),
        );
    }

    #[test]
    fn test_iterators_stop_at_edges() {
        let mut grid = SmallGrid::default();
        for (i, (row, col)) in [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
            .into_iter()
            .enumerate()
        {
            grid[(row, col).into()] = i;
        }

        itertools::assert_equal(grid.right_iter((0, 1).into()), &[1, 2]);
        itertools::assert_equal(grid.bottom_iter((0, 2).into()), &[2, 5]);
        itertools::assert_equal(grid.top_iter((1, 0).into()), &[3, 0]);
        itertools::assert_equal(grid.bottom_right_iter((0, 0).into()), &[0, 4]);
        itertools::assert_equal(grid.bottom_right_iter((0, 2).into()), &[2]);
        itertools::assert_equal(grid.bottom_left_iter((0, 2).into()), &[2, 4]);
        itertools::assert_equal(grid.bottom_left_iter((0, 0).into()), &[0]);
    }

    #[test]
    fn test_out_of_bounds_start_is_empty() {
        let grid = SmallGrid::default();
        assert_eq!(grid.right_iter((2, 0).into()).count(), 0);
        assert_eq!(grid.top_iter((0, 3).into()).count(), 0);
    }

    #[test]
    fn test_indexed_top_iter() {
        let grid = SmallGrid::default();
        itertools::assert_equal(
            grid.top_iter((1, 1).into()).indexed().map(|(index, _)| index),
            [GridIndex::new(1, 1), GridIndex::new(0, 1)],
        );
    }
}
