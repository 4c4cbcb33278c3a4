//! Integer line rasterization

/// Visit every pixel of the 8-connected line between `from` and `to`, both
/// endpoints included, and return the number of visited pixels.
///
/// Endpoints are ordered before walking, so a line and its reverse visit the
/// same pixels. Out-of-image pixels are visited too; callers clip.
pub fn rasterize_line<F>(from: (i64, i64), to: (i64, i64), mut visit: F) -> usize
where
    F: FnMut(i64, i64),
{
    let ((mut x, mut y), (x1, y1)) = if from <= to { (from, to) } else { (to, from) };

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut count = 0;

    loop {
        visit(x, y);
        count += 1;
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    count
}
