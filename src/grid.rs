//! Square lattice road network.
//!
//! The grid is an undirected graph whose nodes are cells and whose edges
//! connect 4-adjacent cells. Routes are recomputed on demand with A*; the
//! topology never changes after construction.

use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::error::ConfigError;
use crate::types::Cell;

/// Undirected 4-connected grid of `size × size` cells.
#[derive(Debug, Clone)]
pub struct GridGraph {
    size: usize,
    graph: UnGraph<Cell, ()>,
}

impl GridGraph {
    /// Builds the lattice.
    ///
    /// Nodes are inserted column by column, so cell `(x, y)` has node index
    /// `x * size + y`.
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }

        let n_edges = 2 * size * (size - 1);
        let mut graph = UnGraph::with_capacity(size * size, n_edges);
        for x in 0..size {
            for y in 0..size {
                graph.add_node(Cell::new(x, y));
            }
        }

        for x in 0..size {
            for y in 0..size {
                let here = NodeIndex::new(x * size + y);
                if x + 1 < size {
                    graph.add_edge(here, NodeIndex::new((x + 1) * size + y), ());
                }
                if y + 1 < size {
                    graph.add_edge(here, NodeIndex::new(x * size + y + 1), ());
                }
            }
        }

        Ok(Self { size, graph })
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells.
    pub fn n_cells(&self) -> usize {
        self.graph.node_count()
    }

    /// Total number of undirected edges.
    pub fn n_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the cell is part of the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.is_within(self.size)
    }

    /// Iterates over all cells in node order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.graph.node_weights().copied()
    }

    /// Returns the `index`-th cell in node order, if any.
    pub fn cell_at(&self, index: usize) -> Option<Cell> {
        self.graph.node_weight(NodeIndex::new(index)).copied()
    }

    fn node_of(&self, cell: Cell) -> Option<NodeIndex> {
        self.contains(cell)
            .then(|| NodeIndex::new(cell.x * self.size + cell.y))
    }

    /// Cells adjacent to `cell`.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        match self.node_of(cell) {
            Some(node) => self.graph.neighbors(node).map(|n| self.graph[n]).collect(),
            None => Vec::new(),
        }
    }

    /// Shortest route from `from` to `to`, both endpoints included.
    ///
    /// Returns `None` if either cell is outside the grid. A route from a cell
    /// to itself is the single-element path `[from]`.
    pub fn shortest_path(&self, from: Cell, to: Cell) -> Option<Vec<Cell>> {
        let start = self.node_of(from)?;
        let goal = self.node_of(to)?;
        let (_, nodes) = astar(
            &self.graph,
            start,
            |n| n == goal,
            |_| 1usize,
            |n| self.graph[n].manhattan_to(&to),
        )?;
        Some(nodes.into_iter().map(|n| self.graph[n]).collect())
    }

    /// Length (edge count) of the shortest route between two cells.
    pub fn distance(&self, from: Cell, to: Cell) -> Option<usize> {
        self.shortest_path(from, to).map(|path| path.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(GridGraph::new(0).unwrap_err(), ConfigError::ZeroGridSize);
    }

    #[test]
    fn lattice_shape() {
        let grid = GridGraph::new(5).unwrap();
        assert_eq!(grid.n_cells(), 25);
        assert_eq!(grid.n_edges(), 40);
        assert_eq!(grid.cell_at(7), Some(Cell::new(1, 2)));
        assert_eq!(grid.cell_at(25), None);
    }

    #[test]
    fn single_cell_grid() {
        let grid = GridGraph::new(1).unwrap();
        assert_eq!(grid.n_cells(), 1);
        assert_eq!(grid.n_edges(), 0);
        assert_eq!(grid.distance(Cell::origin(), Cell::origin()), Some(0));
    }

    #[test]
    fn corner_has_two_neighbors() {
        let grid = GridGraph::new(5).unwrap();
        let mut n = grid.neighbors(Cell::new(0, 0));
        n.sort();
        assert_eq!(n, vec![Cell::new(0, 1), Cell::new(1, 0)]);
        assert_eq!(grid.neighbors(Cell::new(2, 2)).len(), 4);
    }

    #[test]
    fn shortest_path_is_manhattan() {
        let grid = GridGraph::new(5).unwrap();
        let from = Cell::new(0, 0);
        let to = Cell::new(4, 4);
        let path = grid.shortest_path(from, to).unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_to(&pair[1]), 1);
        }
        assert_eq!(grid.distance(Cell::new(1, 3), Cell::new(4, 0)), Some(6));
    }

    #[test]
    fn path_to_self_is_single_cell() {
        let grid = GridGraph::new(5).unwrap();
        let c = Cell::new(2, 3);
        assert_eq!(grid.shortest_path(c, c), Some(vec![c]));
    }

    #[test]
    fn out_of_grid_has_no_path() {
        let grid = GridGraph::new(3).unwrap();
        assert_eq!(grid.shortest_path(Cell::new(0, 0), Cell::new(3, 0)), None);
        assert!(!grid.contains(Cell::new(0, 3)));
    }
}
