use ndarray::Array2;

/// Opening (erosion then dilation) with a 3x3 square element. Removes
/// specular glints and thin structures without shrinking the panel.
pub fn morphological_opening(mask: &Array2<bool>) -> Array2<bool> {
    let eroded = apply_3x3(mask, Op::Erode);
    apply_3x3(&eroded, Op::Dilate)
}

#[derive(Clone, Copy)]
enum Op {
    /// True only if every neighbor is true; outside the image counts as false.
    Erode,
    /// True if any neighbor is true.
    Dilate,
}

fn apply_3x3(mask: &Array2<bool>, op: Op) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        let mut neighbors = (-1..=1_isize).flat_map(|dr| (-1..=1_isize).map(move |dc| (dr, dc)));
        let value_at = |(dr, dc): (isize, isize)| {
            let r = row as isize + dr;
            let c = col as isize + dc;
            r >= 0 && c >= 0 && r < h as isize && c < w as isize && mask[[r as usize, c as usize]]
        };
        match op {
            Op::Erode => neighbors.all(value_at),
            Op::Dilate => neighbors.any(value_at),
        }
    })
}
