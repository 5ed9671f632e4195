use itertools::izip;

use super::{row_major_radices, unravel_index, AxisSlab, Selection, SelectionError};

impl Selection {
    /// Broadcast data with `target_shape` across this selection.
    ///
    /// Axes are matched from the last backwards, skipping scalar axes.
    /// A matched axis of `target_shape` must either equal the block count of the selection axis, or be 1,
    /// in which case the data is tiled along that axis. Leading axes of `target_shape` beyond the selection must be 1.
    ///
    /// Returns one selection per tile, in row-major order.
    /// If no tiling is required, the only returned selection is this selection.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Broadcast`] if `target_shape` cannot be broadcast across this selection.
    pub fn broadcast(&self, target_shape: &[u64]) -> Result<Vec<Selection>, SelectionError> {
        let broadcast_error = || SelectionError::Broadcast {
            target_shape: target_shape.to_vec(),
            selection_shape: self.logical_shape(),
        };

        let mut remaining = target_shape.to_vec();
        let mut tile_shape = Vec::with_capacity(self.dimensionality());
        for axis in self.axes().iter().rev() {
            if axis.scalar {
                tile_shape.push(1);
                continue;
            }
            match remaining.pop() {
                None => tile_shape.push(1),
                Some(length) if length == 1 || length == axis.count => tile_shape.push(length),
                Some(_) => return Err(broadcast_error()),
            }
        }
        if remaining.iter().any(|&length| length > 1) {
            return Err(broadcast_error());
        }
        tile_shape.reverse();

        let tiles: Vec<u64> = std::iter::zip(self.axes(), &tile_shape)
            .map(|(axis, &size)| axis.count.checked_div(size).unwrap_or(1))
            .collect();
        let num_tiles: u64 = tiles.iter().product();
        if num_tiles == 1 {
            return Ok(vec![self.clone()]);
        }

        let radices = row_major_radices(&tiles);
        Ok((0..num_tiles)
            .map(|tile_index| {
                let tile = unravel_index(tile_index, &radices);
                let axes = izip!(self.axes(), &tile_shape, &tile)
                    .map(|(axis, &size, &position)| AxisSlab {
                        start: axis.start + position * size * axis.stride,
                        count: size,
                        ..*axis
                    })
                    .collect();
                Selection {
                    array_shape: self.array_shape().to_vec(),
                    axes,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::selection::{AxisSelector, Selection, SelectionError};

    #[test]
    fn broadcast_exact() {
        let selection = Selection::new(&[4, 6], &[AxisSelector::from(1..3)]).unwrap();
        let tiles = selection.broadcast(&[2, 6]).unwrap();
        assert_eq!(tiles, vec![selection.clone()]);
        let tiles = selection.broadcast(&[1, 1, 2, 6]).unwrap();
        assert_eq!(tiles, vec![selection]);
    }

    #[test]
    fn broadcast_tiles_row_major() {
        let selection = Selection::all(&[3, 4]);
        let tiles = selection.broadcast(&[1, 4]).unwrap();
        let placements: Vec<(Vec<u64>, Vec<u64>)> = tiles
            .iter()
            .map(|tile| (tile.start(), tile.logical_shape()))
            .collect();
        assert_eq!(
            placements,
            vec![
                (vec![0, 0], vec![1, 4]),
                (vec![1, 0], vec![1, 4]),
                (vec![2, 0], vec![1, 4]),
            ]
        );

        let tiles = selection.broadcast(&[1]).unwrap();
        assert_eq!(tiles.len(), 12);
        assert_eq!(tiles[1].start(), vec![0, 1]);
        assert_eq!(tiles[4].start(), vec![1, 0]);
        assert_eq!(tiles[11].start(), vec![2, 3]);
        assert!(tiles.iter().all(|tile| tile.num_elements() == 1));
    }

    #[test]
    fn broadcast_strided() {
        let selection = Selection::new(
            &[10, 3],
            &[AxisSelector::Range {
                start: Some(1),
                stop: None,
                step: Some(3),
            }],
        )
        .unwrap();
        let tiles = selection.broadcast(&[3]).unwrap();
        let starts: Vec<Vec<u64>> = tiles.iter().map(Selection::start).collect();
        assert_eq!(starts, vec![vec![1, 0], vec![4, 0], vec![7, 0]]);
    }

    #[test]
    fn broadcast_skips_scalar_axes() {
        let selection = Selection::new(&[4, 5, 6], &[AxisSelector::Full, AxisSelector::Index(2)])
            .unwrap();
        assert_eq!(selection.broadcast(&[4, 6]).unwrap().len(), 1);
        let tiles = selection.broadcast(&[6]).unwrap();
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|tile| tile.logical_shape() == vec![1, 6]));
    }

    #[test]
    fn broadcast_scalar_selection() {
        let selection =
            Selection::new(&[4, 5], &[AxisSelector::Index(1), AxisSelector::Index(2)]).unwrap();
        assert_eq!(selection.broadcast(&[]).unwrap(), vec![selection.clone()]);
        assert_eq!(selection.broadcast(&[1, 1]).unwrap(), vec![selection.clone()]);
        assert!(selection.broadcast(&[2]).is_err());
    }

    #[test]
    fn broadcast_mismatch() {
        let selection = Selection::all(&[4, 6]);
        assert_eq!(
            selection.broadcast(&[3, 6]),
            Err(SelectionError::Broadcast {
                target_shape: vec![3, 6],
                selection_shape: vec![4, 6]
            })
        );
        assert!(selection.broadcast(&[2, 4, 6]).is_err());
    }
}
