//! Conversion between 1d and 3d voxel indices.
//!
//! The first axis varies fastest. Everything is generic over the integer
//! type: voxel lookups run in `i64`, so that positions outside the tabulated
//! envelope linearize to harmless non-matching indices instead of wrapping.

use std::ops::{Add, Div, Mul, Rem};

pub fn index3_to_1<T>([ix, iy, iz]: [T; 3], [nx, ny, _nz]: [T; 3]) -> T
where
    T: Mul<Output = T> + Add<Output = T>
{
    ix + (iy + iz * ny) * nx
}

#[allow(clippy::many_single_char_names)]
pub fn index1_to_3<T>(i: T, [nx, ny, _nz]: [T; 3]) -> [T; 3]
where
    T: Mul<Output = T> +
    Div<Output = T> +
    Rem<Output = T> +
    Copy
{
    let z = i / (nx * ny);
    let r = i % (nx * ny);
    let y = r / nx;
    let x = r % nx;
    [x,y,z]
}
