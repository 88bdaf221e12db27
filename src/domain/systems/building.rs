use crate::domain::geometry::{GridCell, Rect};
use crate::domain::state::{EntityId, PlayerId, SimBlock};
use std::collections::{BTreeMap, HashMap};

/// Why a placement request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// The cell is not fully inside the map (or the aim point was not a number).
    OutOfBounds,
    /// A player's box overlaps the cell.
    BlockedByPlayer,
    /// Another block already occupies the cell.
    CellOccupied,
}

/// Blocks keyed by id, plus an index that keeps each grid cell to a single block.
///
/// Ids are handed out in increasing order, so iteration follows creation order.
#[derive(Default)]
pub struct BlockGrid {
    blocks: BTreeMap<EntityId, SimBlock>,
    cells: HashMap<GridCell, EntityId>,
}

impl BlockGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimBlock> {
        self.blocks.values()
    }

    #[cfg(test)]
    pub fn at(&self, cell: GridCell) -> Option<&SimBlock> {
        self.cells.get(&cell).and_then(|id| self.blocks.get(id))
    }

    /// Inserts a block at `cell` unless a player box overlaps it or the cell is taken.
    pub fn place<'a>(
        &mut self,
        id: EntityId,
        owner_id: PlayerId,
        cell: GridCell,
        grid_size: f32,
        occupants: impl IntoIterator<Item = &'a Rect>,
    ) -> Result<&SimBlock, BuildError> {
        let rect = cell.rect(grid_size);
        if occupants.into_iter().any(|o| rect.intersects(o)) {
            return Err(BuildError::BlockedByPlayer);
        }
        if self.cells.contains_key(&cell) {
            return Err(BuildError::CellOccupied);
        }

        self.cells.insert(cell, id);
        let block = self.blocks.entry(id).or_insert(SimBlock {
            id,
            owner_id,
            cell,
            rect,
        });
        Ok(block)
    }

    pub fn remove_at(&mut self, cell: GridCell) -> Option<SimBlock> {
        let id = self.cells.remove(&cell)?;
        self.blocks.remove(&id)
    }

    /// Removes the first block (in creation order) overlapping `rect`.
    pub fn remove_first_hit(&mut self, rect: &Rect) -> Option<SimBlock> {
        let cell = self.iter().find(|b| b.rect.intersects(rect))?.cell;
        self.remove_at(cell)
    }

    pub fn remove_owned_by(&mut self, owner_id: PlayerId) -> Vec<SimBlock> {
        let owned: Vec<GridCell> = self
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .map(|b| b.cell)
            .collect();
        owned
            .into_iter()
            .filter_map(|cell| self.remove_at(cell))
            .collect()
    }
}
