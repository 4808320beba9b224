use cone_track_core::Rect;

/// Bounding boxes of the 8-connected regions of a binary mask.
///
/// Results are sorted by ascending top edge, then left edge, so the output is
/// deterministic regardless of how the flood fill visits the mask. This
/// replaces the unspecified traversal order of external-contour extraction.
pub fn connected_regions(mask: &[bool], width: usize, height: usize) -> Vec<Rect> {
    debug_assert_eq!(mask.len(), width * height);
    let mut visited = vec![false; mask.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut regions = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if !mask[idx] || visited[idx] {
                continue;
            }

            let (mut min_x, mut max_x) = (x, x);
            let (mut min_y, mut max_y) = (y, y);
            visited[idx] = true;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);

                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = cx as i32 + dx;
                        let ny = cy as i32 + dy;
                        if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                            continue;
                        }
                        let nidx = ny as usize * width + nx as usize;
                        if mask[nidx] && !visited[nidx] {
                            visited[nidx] = true;
                            stack.push((nx as usize, ny as usize));
                        }
                    }
                }
            }

            regions.push(Rect::new(
                min_x as i32,
                min_y as i32,
                (max_x - min_x + 1) as i32,
                (max_y - min_y + 1) as i32,
            ));
        }
    }

    regions.sort_by_key(|r| (r.y, r.x));
    regions
}
