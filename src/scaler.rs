use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source index for every destination column and row
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_y: Vec::new(),
        }
    }

    /// Destination size this table was built for.
    pub fn dims(&self) -> (usize, usize) {
        (self.src_x.len(), self.src_y.len())
    }
}

/// Internal buffer size for a window: height stays fixed, width follows the
/// window aspect, rounded to even and never narrower than 160.
pub fn internal_size(dst_w: usize, dst_h: usize, target_h: usize) -> (usize, usize) {
    let aspect = if dst_h > 0 {
        dst_w as f32 / dst_h as f32
    } else {
        1.0
    };

    let mut target_w = ((target_h as f32 * aspect).round() as usize).max(160);
    if target_w % 2 != 0 {
        target_w += 1;
    }
    (target_w, target_h)
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    let src_x = (0..dst_w)
        .map(|x| (x * src_w / dst_w.max(1)).min(src_w.saturating_sub(1)))
        .collect();
    let src_y = (0..dst_h)
        .map(|y| (y * src_h / dst_h.max(1)).min(src_h.saturating_sub(1)))
        .collect();

    ScaleLut { src_x, src_y }
}

/// Parallel nearest-neighbour stretch
/// Rows are processed in parallel for cache friendly writes
pub fn blit_nearest_stretch(dst: &mut [u32], dw: usize, src: &[u32], sw: usize, lut: &ScaleLut) {
    if dw == 0 {
        return;
    }
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let Some(&sy) = lut.src_y.get(y) else {
            return;
        };
        let row = &src[sy * sw..(sy + 1) * sw];
        for (d, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
            *d = row[sx];
        }
    });
}
