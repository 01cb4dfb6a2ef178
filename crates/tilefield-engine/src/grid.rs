//! Grid (spec §4.A): spatial store of objects, tick counter, global
//! variables, dirty-cell set.
//!
//! Objects are owned exclusively by the grid's [`Arena`]; every other
//! component addresses them through an [`ObjectHandle`] plus generation,
//! replacing the source's reference-counted, cyclic owner/observer graph
//! (design note in spec §9).

use std::collections::{BTreeMap, HashMap, HashSet};

use tilefield_ecs::arena::Arena;

use crate::error::EngineError;
use crate::object::{Location, Object, ObjectHandle, Orientation, PlayerId};

/// Spatial store of objects, tick counter, global variables, and the
/// per-tick dirty-cell set.
///
/// `Clone` backs the pre-tick snapshot `perform_actions` takes so a
/// `CascadeOverflow` can roll the whole tick back (spec §7).
#[derive(Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    objects: Arena<Object>,
    cells: HashMap<Location, BTreeMap<u32, ObjectHandle>>,
    tick: u64,
    globals: HashMap<String, HashMap<PlayerId, i32>>,
    dirty: HashSet<Location>,
    initialized: bool,
}

impl Grid {
    /// An empty, uninitialized grid. Call [`Grid::init`] before use.
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            objects: Arena::new(),
            cells: HashMap::new(),
            tick: 0,
            globals: HashMap::new(),
            dirty: HashSet::new(),
            initialized: false,
        }
    }

    /// Set extents, clear cells, reset tick and dirty set. Fails if the grid
    /// was already initialized (use [`Grid::reinit`] to reuse one).
    pub fn init(&mut self, width: i32, height: i32) -> Result<(), EngineError> {
        if self.initialized {
            return Err(EngineError::AlreadyInitialized);
        }
        self.reinit(width, height);
        Ok(())
    }

    /// Re-initialize an already-initialized grid (used by
    /// [`crate::process::GameProcess::reset`], which is allowed to
    /// re-generate grid contents from the level template).
    pub fn reinit(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.objects = Arena::new();
        self.cells.clear();
        self.tick = 0;
        self.globals.clear();
        self.dirty.clear();
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn in_bounds(&self, (x, y): Location) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Place `object` into the grid at its own `location`/`layer`. Fails if
    /// the cell is out of bounds or already occupied at that layer.
    pub fn add_object(&mut self, object: Object) -> Result<ObjectHandle, EngineError> {
        let location = object.location;
        let layer = object.layer;
        if !self.in_bounds(location) {
            return Err(EngineError::OutOfBounds(location.0, location.1));
        }
        if self
            .cells
            .get(&location)
            .is_some_and(|layers| layers.contains_key(&layer))
        {
            return Err(EngineError::CellOccupied(location.0, location.1, layer));
        }
        let handle = self.objects.insert(object);
        self.cells.entry(location).or_default().insert(layer, handle);
        self.dirty.insert(location);
        Ok(handle)
    }

    /// Remove an object from the cell map and live set; marks the vacated
    /// cell dirty.
    pub fn remove_object(&mut self, handle: ObjectHandle) -> Result<Object, EngineError> {
        let object = self
            .objects
            .remove(handle)
            .map_err(|_| EngineError::InvalidLevel("stale object handle".to_owned()))?;
        if let Some(layers) = self.cells.get_mut(&object.location) {
            layers.remove(&object.layer);
            if layers.is_empty() {
                self.cells.remove(&object.location);
            }
        }
        self.dirty.insert(object.location);
        Ok(object)
    }

    /// Move a live object to `new_location`. Fails if the destination is out
    /// of bounds or occupied at the object's layer; marks both cells dirty.
    pub fn move_object(
        &mut self,
        handle: ObjectHandle,
        new_location: Location,
    ) -> Result<(), EngineError> {
        if !self.in_bounds(new_location) {
            return Err(EngineError::OutOfBounds(new_location.0, new_location.1));
        }
        let layer = self
            .objects
            .get(handle)
            .ok_or_else(|| EngineError::InvalidLevel("stale object handle".to_owned()))?
            .layer;
        if self
            .cells
            .get(&new_location)
            .is_some_and(|layers| layers.contains_key(&layer))
        {
            return Err(EngineError::CellOccupied(
                new_location.0,
                new_location.1,
                layer,
            ));
        }

        let old_location = {
            let object = self.objects.get_mut(handle).expect("checked above");
            let old = object.location;
            object.location = new_location;
            old
        };
        if let Some(layers) = self.cells.get_mut(&old_location) {
            layers.remove(&layer);
            if layers.is_empty() {
                self.cells.remove(&old_location);
            }
        }
        self.cells
            .entry(new_location)
            .or_default()
            .insert(layer, handle);
        self.dirty.insert(old_location);
        self.dirty.insert(new_location);
        Ok(())
    }

    /// Change an object's orientation in place. Not itself a relocation, so
    /// it does not dirty any cell.
    pub fn set_orientation(
        &mut self,
        handle: ObjectHandle,
        orientation: Orientation,
    ) -> Result<(), EngineError> {
        let object = self
            .objects
            .get_mut(handle)
            .ok_or_else(|| EngineError::InvalidLevel("stale object handle".to_owned()))?;
        object.orientation = orientation;
        Ok(())
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&Object> {
        self.objects.get(handle)
    }

    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut Object> {
        self.objects.get_mut(handle)
    }

    /// Mark `location` dirty without relocating anything. Used by commands
    /// that mutate an object's observable state in place (parameter
    /// increments, kind changes) rather than its position.
    pub fn mark_dirty(&mut self, location: Location) {
        self.dirty.insert(location);
    }

    /// Live handles occupying `(x, y)`, in ascending layer order.
    pub fn cell_at(&self, x: i32, y: i32) -> Vec<ObjectHandle> {
        self.cells
            .get(&(x, y))
            .map(|layers| layers.values().copied().collect())
            .unwrap_or_default()
    }

    /// The handle occupying `(x, y)` at `layer`, if any.
    pub fn object_at_layer(&self, location: Location, layer: u32) -> Option<ObjectHandle> {
        self.cells.get(&location)?.get(&layer).copied()
    }

    /// All live objects in insertion order (used for deterministic rendering
    /// and for `StateInfo::objectInfo`).
    pub fn iter_objects(&self) -> impl Iterator<Item = (ObjectHandle, &Object)> {
        self.objects.iter()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Count of live objects of a given kind, used by `ObjectCount`
    /// termination operands.
    pub fn count_kind(&self, kind: &str) -> i64 {
        self.objects.iter().filter(|(_, o)| o.kind == kind).count() as i64
    }

    /// Cells mutated since the last pull, then clear the set.
    pub fn take_updated_locations(&mut self) -> HashSet<Location> {
        std::mem::take(&mut self.dirty)
    }

    /// Advance the tick counter by one. Only the game process calls this.
    pub fn tick(&mut self) {
        self.tick += 1;
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn global(&self, name: &str, player_id: PlayerId) -> i64 {
        self.globals
            .get(name)
            .and_then(|by_player| by_player.get(&player_id))
            .copied()
            .unwrap_or(0) as i64
    }

    pub fn set_global(&mut self, name: &str, player_id: PlayerId, value: i32) {
        self.globals
            .entry(name.to_owned())
            .or_default()
            .insert(player_id, value);
    }

    pub fn global_variables(&self) -> &HashMap<String, HashMap<PlayerId, i32>> {
        &self.globals
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(location: Location, layer: u32) -> Object {
        Object::new("k", 1, location, Orientation::North, layer, HashMap::new())
    }

    #[test]
    fn add_then_cell_at_returns_handle() {
        let mut grid = Grid::new();
        grid.init(4, 4).unwrap();
        let h = grid.add_object(object((1, 1), 0)).unwrap();
        assert_eq!(grid.cell_at(1, 1), vec![h]);
    }

    #[test]
    fn add_out_of_bounds_fails() {
        let mut grid = Grid::new();
        grid.init(2, 2).unwrap();
        let err = grid.add_object(object((5, 5), 0)).unwrap_err();
        assert!(matches!(err, EngineError::OutOfBounds(5, 5)));
    }

    #[test]
    fn add_occupied_layer_fails() {
        let mut grid = Grid::new();
        grid.init(2, 2).unwrap();
        grid.add_object(object((0, 0), 0)).unwrap();
        let err = grid.add_object(object((0, 0), 0)).unwrap_err();
        assert!(matches!(err, EngineError::CellOccupied(0, 0, 0)));
    }

    #[test]
    fn move_updates_both_cells_and_dirty_set() {
        let mut grid = Grid::new();
        grid.init(4, 4).unwrap();
        let h = grid.add_object(object((0, 0), 0)).unwrap();
        grid.take_updated_locations();
        grid.move_object(h, (1, 0)).unwrap();
        assert!(grid.cell_at(0, 0).is_empty());
        assert_eq!(grid.cell_at(1, 0), vec![h]);
        let dirty = grid.take_updated_locations();
        assert_eq!(dirty, HashSet::from([(0, 0), (1, 0)]));
    }

    #[test]
    fn remove_clears_cell_and_marks_dirty() {
        let mut grid = Grid::new();
        grid.init(2, 2).unwrap();
        let h = grid.add_object(object((1, 1), 0)).unwrap();
        grid.take_updated_locations();
        grid.remove_object(h).unwrap();
        assert!(grid.cell_at(1, 1).is_empty());
        assert_eq!(grid.take_updated_locations(), HashSet::from([(1, 1)]));
    }

    #[test]
    fn init_twice_fails() {
        let mut grid = Grid::new();
        grid.init(2, 2).unwrap();
        assert!(matches!(
            grid.init(2, 2),
            Err(EngineError::AlreadyInitialized)
        ));
    }

    #[test]
    fn globals_default_to_zero() {
        let grid = Grid::new();
        assert_eq!(grid.global("score", 1), 0);
    }
}
