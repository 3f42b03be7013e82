use crate::Point;

/// Star-point offset from the edge: 3-3 points on 9x9, 4-4 on larger boards.
fn hoshi_offset(size: u8) -> u8 {
    if size == 9 { 2 } else { 3 }
}

/// Fixed handicap placement points for the supported board sizes, in
/// placement order: corners first, then sides and center. Unsupported sizes
/// have no handicap points.
pub fn handicap_points(size: u8) -> Vec<Point> {
    if size != 9 && size != 13 && size != 19 {
        return Vec::new();
    }

    let off = hoshi_offset(size);
    let far = size - 1 - off;
    let mid = size / 2;

    let tl = (off, off);
    let tr = (far, off);
    let bl = (off, far);
    let br = (far, far);
    let cc = (mid, mid);

    let left = (off, mid);
    let right = (far, mid);
    let top = (mid, off);
    let bottom = (mid, far);

    if size == 9 {
        vec![br, tl, bl, tr, cc, left, right, bottom, top]
    } else {
        vec![br, tl, bl, tr, right, left, bottom, top, cc]
    }
}

/// The opening points the move selector seeds on a nearly empty board:
/// center plus the four corner star points. Defined for every size.
pub fn opening_points(size: u8) -> Vec<Point> {
    let off = hoshi_offset(size).min(size.saturating_sub(1) / 2);
    let far = size - 1 - off;
    let mid = size / 2;
    vec![(mid, mid), (off, off), (far, off), (off, far), (far, far)]
}
