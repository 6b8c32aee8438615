//! Linear caret offsets over an [`EditableRegion`].
//!
//! The line store only knows flat text. The region may spread that text over several nodes,
//! so the caret has to be carried across a re-render as a plain char count.

use crate::editor::region::{locate, BoundaryPoint, EditableRegion, Selection};

/// Chars between the region start and the selection start; 0 without a selection.
pub fn capture_offset(region: &EditableRegion) -> usize {
    region
        .selection_range()
        .map(|range| range.start)
        .unwrap_or(0)
}

/// Collapses the selection at `offset`, see [`point_for_offset`].
pub fn restore_offset(region: &mut EditableRegion, offset: usize) {
    let point = point_for_offset(region, offset);
    region.set_selection(Some(Selection::collapsed(point)));
}

/// Boundary point for a linear offset.
///
/// Walks text nodes depth-first and picks the first one whose cumulative length reaches
/// `offset`. Past the end the point falls back to the region end when the region has
/// children, or to the region start when it is empty.
pub fn point_for_offset(region: &EditableRegion, offset: usize) -> BoundaryPoint {
    if let Some(point) = locate(region.nodes(), offset) {
        return point;
    }
    if region.nodes().is_empty() {
        BoundaryPoint::root(0)
    } else {
        BoundaryPoint::root(region.nodes().len())
    }
}

/// Linear offset of an arbitrary boundary point; 0 for a point that no longer exists.
pub fn offset_of(region: &EditableRegion, point: &BoundaryPoint) -> usize {
    region.resolve(point).unwrap_or(0)
}

/// Collapsed caret after the last char of the region.
pub fn caret_at_end(region: &EditableRegion) -> Selection {
    Selection::collapsed(point_for_offset(region, region.char_len()))
}

#[cfg(test)]
mod tests {
    use super::{capture_offset, caret_at_end, offset_of, point_for_offset, restore_offset};
    use crate::editor::region::{BoundaryPoint, EditableRegion, RegionNode, Selection};

    fn nested() -> EditableRegion {
        EditableRegion::with_nodes(vec![
            RegionNode::text("ab"),
            RegionNode::element(vec![RegionNode::text("cd"), RegionNode::element(vec![])]),
            RegionNode::text("ef"),
        ])
    }

    #[test]
    fn capture_without_selection_is_zero() {
        assert_eq!(capture_offset(&nested()), 0);
    }

    #[test]
    fn capture_uses_selection_start() {
        let mut region = nested();
        region.set_selection(Some(Selection {
            anchor: BoundaryPoint::new(vec![2], 1),
            focus: BoundaryPoint::new(vec![1, 0], 1),
        }));
        assert_eq!(capture_offset(&region), 3);
    }

    #[test]
    fn restore_walks_nodes_depth_first() {
        let mut region = nested();
        restore_offset(&mut region, 3);
        assert_eq!(
            region.selection(),
            Some(&Selection::collapsed(BoundaryPoint::new(vec![1, 0], 1)))
        );
        restore_offset(&mut region, 2);
        assert_eq!(
            region.selection(),
            Some(&Selection::collapsed(BoundaryPoint::new(vec![0], 2)))
        );
    }

    #[test]
    fn restore_past_end_falls_back_to_region_end() {
        let mut region = nested();
        restore_offset(&mut region, 99);
        assert_eq!(
            region.selection(),
            Some(&Selection::collapsed(BoundaryPoint::root(3)))
        );
        assert_eq!(capture_offset(&region), 6);
    }

    #[test]
    fn restore_on_empty_region_falls_back_to_start() {
        let mut region = EditableRegion::new();
        restore_offset(&mut region, 4);
        assert_eq!(
            region.selection(),
            Some(&Selection::collapsed(BoundaryPoint::root(0)))
        );
    }

    #[test]
    fn round_trip_keeps_every_offset() {
        let mut region = nested();
        for offset in 0..=region.char_len() {
            restore_offset(&mut region, offset);
            assert_eq!(capture_offset(&region), offset);
            let captured = capture_offset(&region);
            restore_offset(&mut region, captured);
            assert_eq!(capture_offset(&region), offset);
        }
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let mut region = EditableRegion::with_nodes(vec![RegionNode::text("日本語")]);
        restore_offset(&mut region, 2);
        assert_eq!(
            region.selection(),
            Some(&Selection::collapsed(BoundaryPoint::new(vec![0], 2)))
        );
    }

    #[test]
    fn helpers_resolve_points_and_end() {
        let region = nested();
        assert_eq!(offset_of(&region, &BoundaryPoint::new(vec![2], 2)), 6);
        assert_eq!(offset_of(&region, &BoundaryPoint::new(vec![9], 0)), 0);
        assert_eq!(point_for_offset(&region, 6), BoundaryPoint::new(vec![2], 2));
        assert_eq!(
            caret_at_end(&region),
            Selection::collapsed(BoundaryPoint::new(vec![2], 2))
        );
    }
}
