//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// How the output size of every image in a batch is decided.
///
/// `max_dimension` wins over `width`/`height` when both are present. A value
/// of `0` anywhere means "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizePolicy {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub max_dimension: Option<u32>,
}

impl SizePolicy {
    /// Bound the longer edge, preserving aspect ratio.
    pub fn max_dimension(max: u32) -> Self {
        Self {
            max_dimension: Some(max),
            ..Self::default()
        }
    }

    /// Explicit per-axis sizes; `None` keeps the source value on that axis.
    pub fn exact(width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            width,
            height,
            max_dimension: None,
        }
    }
}

/// Largest edge, in pixels, a batch may ask for. Matches the 16-bit
/// dimension fields of JPEG and GIF.
pub const MAX_TARGET_EDGE: u32 = 65_535;

fn set(value: Option<u32>) -> Option<u32> {
    value.filter(|&v| v > 0)
}

/// Scale `shorter` by `max / longer`, truncating toward zero.
fn scale_edge(max: u32, longer: u32, shorter: u32) -> u32 {
    let scaled = (max as f64 / longer as f64) * shorter as f64;
    (scaled as u32).max(1)
}

/// Calculate the output dimensions for one source image.
///
/// # Arguments
/// * `original` - Source dimensions (width, height)
/// * `policy` - Batch-wide sizing policy
///
/// # Returns
/// * `(width, height)` - Target dimensions
///
/// With a max dimension the longer edge becomes exactly `max` and the other
/// edge is scaled by the same ratio and truncated. Square sources take the
/// width branch and come out `max × max`. Without one, each axis falls back
/// to the source value independently, so a single explicit axis stretches
/// or squashes the image.
///
/// # Examples
/// ```
/// # use batch_resize::imaging::{SizePolicy, compute_target_size};
/// assert_eq!(compute_target_size((1920, 1080), &SizePolicy::max_dimension(800)), (800, 450));
/// assert_eq!(compute_target_size((300, 200), &SizePolicy::exact(Some(150), None)), (150, 200));
/// ```
pub fn compute_target_size(original: (u32, u32), policy: &SizePolicy) -> (u32, u32) {
    let (orig_w, orig_h) = original;

    if let Some(max) = set(policy.max_dimension) {
        return if orig_w == orig_h {
            (max, max)
        } else if orig_w > orig_h {
            // Landscape: width is the bounded edge
            (max, scale_edge(max, orig_w, orig_h))
        } else {
            // Portrait: height is the bounded edge
            (scale_edge(max, orig_h, orig_w), max)
        };
    }

    (
        set(policy.width).unwrap_or(orig_w),
        set(policy.height).unwrap_or(orig_h),
    )
}
