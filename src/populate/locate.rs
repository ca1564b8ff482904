//! Shape Locator.

use crate::pptx::{GroupShape, Shape, ShapePath};

/// Find the first shape called `name` (ASCII case-insensitive, otherwise
/// exact) among `root`'s shapes, looking one level into groups.
///
/// Traversal order is document order: a top-level shape is checked before
/// the members of the group it may be.
pub fn find_shape(root: &GroupShape, name: &str) -> Option<ShapePath> {
    for (i, shape) in root.shapes().enumerate() {
        if matches(shape, name) {
            return Some(ShapePath::top(i));
        }
        if let Some(group) = shape.as_group() {
            if let Some(j) = group.shapes().position(|s| matches(s, name)) {
                return Some(ShapePath::nested(i, j));
            }
        }
    }
    None
}

/// [`find_shape`] returning the shape itself.
pub fn find_shape_mut<'a>(root: &'a mut GroupShape, name: &str) -> Option<&'a mut Shape> {
    let path = find_shape(root, name)?;
    root.get_mut(path)
}

fn matches(shape: &Shape, name: &str) -> bool {
    shape.name().eq_ignore_ascii_case(name)
}
