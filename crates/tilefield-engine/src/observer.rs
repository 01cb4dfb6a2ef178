//! Observer Contract (spec §4.H): the contract Game Process consumes for
//! producing observations on reset and update, plus a minimal in-repo
//! reference implementation.
//!
//! Concrete pixel-producing observers (shape rasterizers, sprite atlases)
//! are an excluded external collaborator; [`VectorObserver`] is the minimal
//! non-pixel observer needed to exercise and test the contract, in the
//! spirit of Griddly's own `VectorObserver` (one numeric layer per object
//! kind rather than rendered pixels).

use crate::grid::Grid;
use crate::kind::KindRegistry;
use crate::object::PlayerId;

/// An opaque observation frame. Shape is observer-defined; the engine only
/// guarantees correspondence between dirty cells and the regions `data`
/// covers for that observer's encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// `(channels, height, width)`.
    pub shape: (usize, usize, usize),
    pub data: Vec<u8>,
}

/// The contract Game Process calls on reset and after every tick.
///
/// `update` is called at most once per tick; between calls the grid's dirty
/// set accumulates exactly the cells whose contents changed, available via
/// [`Grid::take_updated_locations`]. Implementations are free to use it for
/// incremental rendering; `reset` must always produce a full frame.
pub trait Observer {
    fn init(&mut self, grid_width: i32, grid_height: i32);
    fn reset(&mut self, grid: &mut Grid, kinds: &KindRegistry) -> Frame;
    fn update(&mut self, player_id: PlayerId, grid: &mut Grid, kinds: &KindRegistry) -> Frame;
}

/// One `i32` channel per registered kind, encoded little-endian, `1` where
/// that kind occupies a cell and `0` elsewhere. Channel order follows kind
/// declaration order (the same order layers are assigned in).
pub struct VectorObserver {
    width: i32,
    height: i32,
}

impl VectorObserver {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
        }
    }

    fn render(&self, grid: &Grid, kinds: &KindRegistry) -> Frame {
        let kind_names: Vec<&str> = kinds.kinds().map(|k| k.name.as_str()).collect();
        let channels = kind_names.len();
        let (w, h) = (self.width as usize, self.height as usize);
        let mut data = vec![0u8; channels * h * w * std::mem::size_of::<i32>()];

        for (_, object) in grid.iter_objects() {
            let Some(channel) = kind_names.iter().position(|&n| n == object.kind) else {
                continue;
            };
            let (x, y) = object.location;
            if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
                continue;
            }
            let cell_index = channel * h * w + y as usize * w + x as usize;
            let byte_offset = cell_index * std::mem::size_of::<i32>();
            data[byte_offset..byte_offset + 4].copy_from_slice(&1i32.to_le_bytes());
        }

        Frame {
            shape: (channels, h, w),
            data,
        }
    }
}

impl Default for VectorObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for VectorObserver {
    fn init(&mut self, grid_width: i32, grid_height: i32) {
        self.width = grid_width;
        self.height = grid_height;
    }

    fn reset(&mut self, grid: &mut Grid, kinds: &KindRegistry) -> Frame {
        grid.take_updated_locations();
        self.render(grid, kinds)
    }

    fn update(&mut self, _player_id: PlayerId, grid: &mut Grid, kinds: &KindRegistry) -> Frame {
        grid.take_updated_locations();
        self.render(grid, kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Object, Orientation};
    use std::collections::HashMap;
    use tilefield_manifest::Description;

    fn registry() -> KindRegistry {
        let desc = Description::from_yaml(
            r#"
Version: "0.1"
Environment: { Levels: ["HM"] }
Objects:
  - {Name: harvester, MapCharacter: H}
  - {Name: minerals, MapCharacter: M}
"#,
        )
        .unwrap();
        KindRegistry::compile(&desc).unwrap()
    }

    #[test]
    fn reset_produces_full_frame_with_one_channel_per_kind() {
        let kinds = registry();
        let mut grid = Grid::new();
        grid.init(2, 1).unwrap();
        grid.add_object(Object::new(
            "harvester",
            1,
            (0, 0),
            Orientation::North,
            0,
            HashMap::new(),
        ))
        .unwrap();

        let mut observer = VectorObserver::new();
        observer.init(2, 1);
        let frame = observer.reset(&mut grid, &kinds);
        assert_eq!(frame.shape, (2, 1, 2));
        assert_eq!(frame.data.len(), 2 * 1 * 2 * 4);
    }

    #[test]
    fn update_consumes_dirty_set() {
        let kinds = registry();
        let mut grid = Grid::new();
        grid.init(2, 1).unwrap();
        let h = grid
            .add_object(Object::new(
                "harvester",
                1,
                (0, 0),
                Orientation::North,
                0,
                HashMap::new(),
            ))
            .unwrap();
        let mut observer = VectorObserver::new();
        observer.init(2, 1);
        observer.reset(&mut grid, &kinds);
        grid.move_object(h, (1, 0)).unwrap();
        observer.update(1, &mut grid, &kinds);
        assert!(grid.take_updated_locations().is_empty());
    }
}
