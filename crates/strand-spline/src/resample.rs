//! Arc-length resampling of a Catmull-Rom path.
//!
//! Each control-point segment is walked in fixed parameter steps; the chord
//! lengths between consecutive curve samples are accumulated and an output
//! point is emitted every `segment_length` of accumulated distance, placed by
//! stepping back from the curve sample along the chord by the overshoot.

use strand_core::spline::{catmull_rom, segment_controls};
use strand_core::Vec3;

/// Parameter step per curve sample (10 samples per control segment)
pub const CURVE_STEP: f32 = 0.1;

/// A final point closer than this fraction of `segment_length` to the last
/// control point is replaced by it instead of adding a near-zero segment.
const ENDPOINT_SNAP: f32 = 1e-3;

/// Resample `points` into a sequence spaced `segment_length` apart along the curve.
///
/// The output starts with the first control point and ends with the last
/// one exactly. Fewer than two points or a non-positive `segment_length`
/// produce an empty list.
pub fn resample(points: &[Vec3], segment_length: f32) -> Vec<Vec3> {
    if points.len() < 2 || !(segment_length > 0.0) {
        return Vec::new();
    }

    let mut output = vec![points[0]];
    let mut previous = points[0];
    let mut distance_since_last = 0.0_f32;

    for i in 0..points.len() - 1 {
        let [p0, p1, p2, p3] = segment_controls(points, i);

        // t = 0 is never sampled; the previous segment's t = 1 covers it
        let mut t = 0.0_f32;
        while t < 1.0 {
            t += CURVE_STEP;

            let p = catmull_rom(p0, p1, p2, p3, t);
            distance_since_last += previous.distance(&p);

            while distance_since_last >= segment_length {
                let overshoot = distance_since_last - segment_length;
                let back = (previous - p).normalized();

                let even = p + back * overshoot;
                output.push(even);

                distance_since_last = overshoot;
                previous = even;
            }

            previous = p;
        }
    }

    let last = points[points.len() - 1];
    let tail = output.len() - 1;
    if tail > 0 && output[tail].distance(&last) < segment_length * ENDPOINT_SNAP {
        output[tail] = last;
    } else {
        output.push(last);
    }

    output
}
