use crate::layout_engine::RectDelta;
use crate::layout_engine::gaps::Gaps;
use crate::sys::geometry::Rect;

/// Smallest extent a split may be squeezed to while adjusting.
const MIN_PART_LENGTH: i32 = 1;

pub fn clip<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Moves `value` to the next multiple of `step` in the direction of `step`.
pub fn slide(value: f64, step: f64) -> f64 {
    if step == 0.0 {
        return value;
    }
    (value / step + 1.000001).floor() * step
}

/// Splits the segment `[begin, begin + length)` into parts proportional to
/// `weights`, separated by `gap`. Returns `(begin, length)` per part.
pub fn split_weighted(begin: i32, length: i32, weights: &[f64], gap: i32) -> Vec<(i32, i32)> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let actual = f64::from(length - (n as i32 - 1) * gap);
    let sum: f64 = weights.iter().sum();
    let equal = sum <= 0.0 || !sum.is_finite();
    let sum = if equal { n as f64 } else { sum };

    // Parts end where the next one starts, so no pixel is lost to rounding.
    let mut acc = 0.0;
    weights
        .iter()
        .enumerate()
        .map(|(i, &weight)| {
            let weight = if equal { 1.0 } else { weight };
            let start = (actual * acc / sum).floor() as i32;
            acc += weight;
            let end = (actual * acc / sum).floor() as i32;
            (begin + start + i as i32 * gap, end - start)
        })
        .collect()
}

pub fn split_area_weighted(area: Rect, weights: &[f64], gap: i32, horizontal: bool) -> Vec<Rect> {
    let (begin, length) = if horizontal {
        (area.x, area.width)
    } else {
        (area.y, area.height)
    };
    split_weighted(begin, length, weights, gap)
        .into_iter()
        .map(|(b, l)| {
            if horizontal {
                Rect::new(b, area.y, l, area.height)
            } else {
                Rect::new(area.x, b, area.width, l)
            }
        })
        .collect()
}

pub fn split_area_half_weighted(area: Rect, weight: f64, gap: i32, horizontal: bool) -> (Rect, Rect) {
    let parts = split_area_weighted(area, &[weight, 1.0 - weight], gap, horizontal);
    (parts[0], parts[1])
}

/// Normalised weights of the given parts.
pub fn calculate_weights(parts: &[(i32, i32)]) -> Vec<f64> {
    let total: i32 = parts.iter().map(|&(_, len)| len).sum();
    if total <= 0 {
        return vec![1.0 / parts.len().max(1) as f64; parts.len()];
    }
    parts.iter().map(|&(_, len)| f64::from(len) / f64::from(total)).collect()
}

/// Moves the edges of part `target` by `delta_fw` (trailing edge) and
/// `delta_bw` (leading edge), taking the difference from the neighbours.
/// Neither side can be squeezed below one pixel.
pub fn adjust_weights(
    begin: i32,
    length: i32,
    weights: &[f64],
    gap: i32,
    target: usize,
    delta_fw: i32,
    delta_bw: i32,
) -> Vec<f64> {
    let mut parts = split_weighted(begin, length, weights, gap);
    if target >= parts.len() {
        return calculate_weights(&parts);
    }

    if target > 0 && delta_bw != 0 {
        let (target_base, target_len) = parts[target];
        let (neighbor_base, neighbor_len) = parts[target - 1];
        let delta = clip(
            delta_bw,
            MIN_PART_LENGTH - target_len,
            neighbor_len - MIN_PART_LENGTH,
        );
        parts[target] = (target_base - delta, target_len + delta);
        parts[target - 1] = (neighbor_base, neighbor_len - delta);
    }

    if target + 1 < parts.len() && delta_fw != 0 {
        let (target_base, target_len) = parts[target];
        let (neighbor_base, neighbor_len) = parts[target + 1];
        let delta = clip(
            delta_fw,
            MIN_PART_LENGTH - target_len,
            neighbor_len - MIN_PART_LENGTH,
        );
        parts[target] = (target_base, target_len + delta);
        parts[target + 1] = (neighbor_base + delta, neighbor_len - delta);
    }

    calculate_weights(&parts)
}

pub fn adjust_area_weights(
    area: Rect,
    weights: &[f64],
    gap: i32,
    target: usize,
    delta: RectDelta,
    horizontal: bool,
) -> Vec<f64> {
    if horizontal {
        adjust_weights(area.x, area.width, weights, gap, target, delta.east, delta.west)
    } else {
        adjust_weights(area.y, area.height, weights, gap, target, delta.south, delta.north)
    }
}

pub fn adjust_area_half_weights(
    area: Rect,
    weight: f64,
    gap: i32,
    target: usize,
    delta: RectDelta,
    horizontal: bool,
) -> f64 {
    adjust_area_weights(area, &[weight, 1.0 - weight], gap, target, delta, horizontal)[0]
}

/// Working area minus the outer gaps.
pub fn compute_tiling_area(working_area: Rect, gaps: &Gaps) -> Rect {
    working_area.gap(gaps.left, gaps.right, gaps.top, gaps.bottom)
}

/// Shrinks `area` to the given percentages, keeping it centred.
pub fn shrink_centered(area: Rect, width_percent: f64, height_percent: f64) -> Rect {
    let width = (f64::from(area.width) * width_percent / 100.0).floor() as i32;
    let height = (f64::from(area.height) * height_percent / 100.0).floor() as i32;
    let h_gap = (area.width - width) / 2;
    let v_gap = (area.height - height) / 2;
    area.gap(h_gap, h_gap, v_gap, v_gap)
}
