//! EXIF orientation normalization.
//!
//! Maps between the decoder's physical pixel coordinates and the viewer's
//! logical (orientation-corrected) coordinates. Two pure operations carry
//! the whole contract: [`to_physical`] locates a logical rectangle within
//! the full physical image, and [`physical_to_logical`] describes how to
//! re-orient a decoded physical region's own pixels once they're in hand.

use crate::error::TilerError;
use crate::geometry::Rect;

/// One of the eight EXIF orientation codes.
///
/// Ordinal order matches EXIF values 1..8; [`Orientation::exif`] and
/// [`Orientation::from_exif`] round-trip for every `k` in `1..=8` — this is
/// asserted both by a unit test and by a `debug_assert!` at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal = 1,
    MirrorHorizontal = 2,
    Rotate180 = 3,
    MirrorVertical = 4,
    Transpose = 5,
    Rotate90 = 6,
    Transverse = 7,
    Rotate270 = 8,
}

impl Orientation {
    /// Default orientation used when EXIF metadata is absent or unreadable.
    pub const DEFAULT: Orientation = Orientation::Normal;

    /// Construct from a raw EXIF orientation tag value (1..8).
    pub fn from_exif(code: u16) -> Result<Self, TilerError> {
        let o = match code {
            1 => Orientation::Normal,
            2 => Orientation::MirrorHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::MirrorVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            other => {
                return Err(TilerError::Internal(format!(
                    "impossible EXIF orientation code: {other}"
                )))
            }
        };
        debug_assert_eq!(o.exif(), code);
        Ok(o)
    }

    /// The raw EXIF tag value, 1..8.
    pub fn exif(&self) -> u16 {
        *self as u16
    }

    /// Rotation component, in degrees: one of 0, 90, 180, 270.
    pub fn rotation_deg(&self) -> u32 {
        match self {
            Orientation::Normal | Orientation::MirrorHorizontal => 0,
            Orientation::Rotate180 | Orientation::MirrorVertical => 180,
            Orientation::Transpose | Orientation::Rotate90 => 90,
            Orientation::Transverse | Orientation::Rotate270 => 270,
        }
    }

    /// Whether this orientation mirrors the source horizontally (in
    /// addition to any rotation).
    pub fn mirrored(&self) -> bool {
        matches!(
            self,
            Orientation::MirrorHorizontal
                | Orientation::MirrorVertical
                | Orientation::Transpose
                | Orientation::Transverse
        )
    }

    /// `true` when logical dimensions swap width/height relative to
    /// physical dimensions (a 90°/270° rotation).
    pub fn swaps_dimensions(&self) -> bool {
        self.rotation_deg() % 180 != 0
    }
}

/// Logical `(width, height)` for a source whose physical dimensions are
/// `(physical_width, physical_height)` and whose EXIF orientation is `o`.
pub fn logical_dimensions(physical_width: u32, physical_height: u32, o: Orientation) -> (u32, u32) {
    if o.swaps_dimensions() {
        (physical_height, physical_width)
    } else {
        (physical_width, physical_height)
    }
}

/// Map a rectangle in logical coordinates to the corresponding rectangle in
/// the decoder's physical coordinate space, given the source's logical
/// dimensions `(wl, hl)`.
///
/// Each orientation has an explicit closed-form formula; an orientation
/// outside `1..8` can't reach this function (`Orientation` is a closed
/// enum), so there is no fallback branch to fall through to.
pub fn to_physical(wl: u32, hl: u32, rect: Rect, o: Orientation) -> Rect {
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);

    match o {
        Orientation::Normal => Rect::new(x, y, w, h),
        Orientation::MirrorHorizontal => Rect::new(wl - x - w, y, w, h),
        Orientation::Rotate180 => Rect::new(wl - x - w, hl - y - h, w, h),
        Orientation::MirrorVertical => Rect::new(x, hl - y - h, w, h),
        Orientation::Transpose => Rect::new(y, x, h, w),
        Orientation::Rotate90 => Rect::new(y, wl - x - w, h, w),
        Orientation::Transverse => Rect::new(hl - y - h, wl - x - w, h, w),
        Orientation::Rotate270 => Rect::new(hl - y - h, x, h, w),
    }
}

/// A 2×3 affine transform mapping physical pixel coordinates (as floats) to
/// logical pixel coordinates: `(x, y) -> (a*x + b*y + c, d*x + e*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }

    /// Inverse transform. The transforms this module produces are always
    /// invertible (orthogonal linear part), but this stays total over the
    /// algebra rather than assuming that at the type level.
    pub fn invert(&self) -> Option<AffineTransform> {
        let det = self.a * self.e - self.b * self.d;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv_a = self.e / det;
        let inv_b = -self.b / det;
        let inv_d = -self.d / det;
        let inv_e = self.a / det;
        let inv_c = -(inv_a * self.c + inv_b * self.f);
        let inv_f = -(inv_d * self.c + inv_e * self.f);
        Some(AffineTransform {
            a: inv_a,
            b: inv_b,
            c: inv_c,
            d: inv_d,
            e: inv_e,
            f: inv_f,
        })
    }
}

/// The affine transform that, applied to a decoded physical region of
/// dimensions `(w, h)`, yields pixels correctly oriented in logical
/// coordinates. Returns `None` for the identity orientation (EXIF 1) — no
/// resampling pass is needed.
///
/// `w`/`h` are the *physical* region's own width/height (post dimension
/// swap), matching the region the caller just decoded; the transform is
/// local to that buffer and carries no dependency on where the region sits
/// within the full image.
pub fn physical_to_logical(o: Orientation, w: u32, h: u32) -> Option<AffineTransform> {
    let (w, h) = (w as f64, h as f64);
    let t = match o {
        Orientation::Normal => return None,
        Orientation::MirrorHorizontal => AffineTransform {
            a: -1.0,
            b: 0.0,
            c: w,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        },
        Orientation::Rotate180 => AffineTransform {
            a: -1.0,
            b: 0.0,
            c: w,
            d: 0.0,
            e: -1.0,
            f: h,
        },
        Orientation::MirrorVertical => AffineTransform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: -1.0,
            f: h,
        },
        Orientation::Transpose => AffineTransform {
            a: 0.0,
            b: 1.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        },
        Orientation::Rotate90 => AffineTransform {
            a: 0.0,
            b: -1.0,
            c: h,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        },
        Orientation::Transverse => AffineTransform {
            a: 0.0,
            b: -1.0,
            c: h,
            d: -1.0,
            e: 0.0,
            f: w,
        },
        Orientation::Rotate270 => AffineTransform {
            a: 0.0,
            b: 1.0,
            c: 0.0,
            d: -1.0,
            e: 0.0,
            f: w,
        },
    };
    Some(t)
}
