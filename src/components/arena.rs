use chrono::NaiveDate;
use log::debug;
use shrinkwraprs::Shrinkwrap;
use std::collections::HashMap;
use uuid::Uuid;

use crate::components::{grid::RasterGrid, DataType};

/// Handle of a grid stored in a [GridArena].
#[derive(
    Shrinkwrap, Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize,
)]
pub struct GridId(Uuid);

impl GridId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for GridId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug)]
struct Node<T: DataType> {
    grid: RasterGrid<T>,
    parent: Option<GridId>,
    children: Vec<GridId>,
}

/// Flat store of grids and their parent/child links.
///
/// Grids inserted with children are split into one entry per grid, so every
/// derived grid can be addressed on its own.
#[derive(Debug)]
pub struct GridArena<T: DataType> {
    nodes: HashMap<GridId, Node<T>>,
    order: Vec<GridId>,
}

impl<T: DataType> Default for GridArena<T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: DataType> GridArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `grid` and, recursively, its children.
    pub fn insert(&mut self, grid: RasterGrid<T>) -> GridId {
        self.attach(grid, None)
    }

    fn attach(&mut self, mut grid: RasterGrid<T>, parent: Option<GridId>) -> GridId {
        let id = GridId::new();
        self.order.push(id);
        let children = grid
            .take_children()
            .into_iter()
            .map(|child| self.attach(child, Some(id)))
            .collect();
        debug!("stored grid {id} under {parent:?}");
        self.nodes.insert(
            id,
            Node {
                grid,
                parent,
                children,
            },
        );
        id
    }

    pub fn get(&self, id: GridId) -> Option<&RasterGrid<T>> {
        self.nodes.get(&id).map(|node| &node.grid)
    }

    pub fn get_mut(&mut self, id: GridId) -> Option<&mut RasterGrid<T>> {
        self.nodes.get_mut(&id).map(|node| &mut node.grid)
    }

    /// Takes a grid and its descendants out of the arena.
    ///
    /// The returned grid carries its descendants as children again.
    pub fn remove(&mut self, id: GridId) -> Option<RasterGrid<T>> {
        let parent = self.nodes.get(&id)?.parent;
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.retain(|child| *child != id);
        }
        let grid = self.detach(id)?;
        self.order.retain(|stored| self.nodes.contains_key(stored));
        debug!("removed grid {id}");
        Some(grid)
    }

    fn detach(&mut self, id: GridId) -> Option<RasterGrid<T>> {
        let node = self.nodes.remove(&id)?;
        let children = node
            .children
            .into_iter()
            .filter_map(|child| self.detach(child))
            .collect();
        let (profile, bands, metadata, _) = node.grid.into_parts();
        Some(RasterGrid::init(profile, bands, metadata, children))
    }

    pub fn parent_of(&self, id: GridId) -> Option<GridId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Direct children in insertion order, empty for unknown ids.
    pub fn children_of(&self, id: GridId) -> &[GridId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Grids without a parent.
    pub fn roots(&self) -> impl Iterator<Item = GridId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|id| self.parent_of(*id).is_none())
    }

    /// Every stored grid, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (GridId, &RasterGrid<T>)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|node| (*id, &node.grid)))
    }

    /// Grids acquired between `start` and `end`, both included.
    pub fn acquired_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = (GridId, &RasterGrid<T>)> + '_ {
        self.iter().filter(move |(_, grid)| {
            grid.metadata()
                .acquired
                .is_some_and(|acquired| start <= acquired && acquired <= end)
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
