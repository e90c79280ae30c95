// Tue Jan 13 2026 - Alex

use crate::config::BitmapConfig;
use crate::hprof::{FieldValue, Id};
use crate::model::ObjectIndex;
use crate::query::AnalysisContext;
use rayon::prelude::*;
use serde::Serialize;

const DEFAULT_BYTES_PER_PIXEL: u64 = 4;

/// Pixel formats by `Bitmap.Config.nativeInt`.
pub fn pixel_format(native_int: i64) -> Option<(&'static str, u64)> {
    Some(match native_int {
        1 => ("ALPHA_8", 1),
        3 => ("RGB_565", 2),
        4 => ("ARGB_4444", 2),
        5 => ("ARGB_8888", 4),
        6 => ("RGBA_F16", 8),
        7 => ("HARDWARE", 4),
        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitmapInfo {
    pub object_id: Id,
    pub class_name: String,
    pub width: u32,
    pub height: u32,
    pub format: Option<&'static str>,
    pub bytes_per_pixel: u64,
    pub size_bytes: u64,
    pub retained_size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BitmapReport {
    pub total_count: usize,
    pub total_bytes: u64,
    pub threshold: u64,
    /// Bitmaps above the threshold, largest first.
    pub oversized: Vec<BitmapInfo>,
}

/// The format field is either the native int itself or a reference to a
/// `Bitmap.Config` enum constant carrying `nativeInt`.
fn format_code(ctx: &AnalysisContext<'_>, index: ObjectIndex, field: &str) -> Option<i64> {
    let decoder = ctx.decoder();
    match decoder.read_field(index, field)? {
        FieldValue::Object(_) => {
            let config = decoder.read_reference(index, field)?;
            decoder.read_int(config, "nativeInt")
        }
        value => value.as_i64(),
    }
}

fn bitmap_info(ctx: &AnalysisContext<'_>, index: ObjectIndex, config: &BitmapConfig) -> Option<BitmapInfo> {
    let decoder = ctx.decoder();
    let width = decoder.read_int(index, &config.width_field)?.clamp(0, u32::MAX as i64) as u32;
    let height = decoder.read_int(index, &config.height_field)?.clamp(0, u32::MAX as i64) as u32;
    let format = format_code(ctx, index, &config.format_field).and_then(pixel_format);
    let bytes_per_pixel = format.map(|(_, bpp)| bpp).unwrap_or(DEFAULT_BYTES_PER_PIXEL);
    Some(BitmapInfo {
        object_id: ctx.object_id(index),
        class_name: ctx.class_name(index),
        width,
        height,
        format: format.map(|(name, _)| name),
        bytes_per_pixel,
        size_bytes: width as u64 * height as u64 * bytes_per_pixel,
        retained_size: ctx.retained(index),
    })
}

pub fn analyze_bitmaps(ctx: &AnalysisContext<'_>, config: &BitmapConfig) -> BitmapReport {
    let class_ids = ctx.classes_where(|name| name == config.class_name);
    let bitmaps: Vec<BitmapInfo> = ctx
        .live_instances_of(&class_ids)
        .into_par_iter()
        .filter_map(|index| bitmap_info(ctx, index, config))
        .collect();

    let total_bytes = bitmaps.iter().map(|b| b.size_bytes).sum();
    let total_count = bitmaps.len();
    let mut oversized: Vec<BitmapInfo> = bitmaps
        .into_iter()
        .filter(|b| b.size_bytes > config.size_threshold)
        .collect();
    oversized.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes).then(a.object_id.cmp(&b.object_id)));
    log::debug!("bitmaps: {} live, {} oversized", total_count, oversized.len());

    BitmapReport {
        total_count,
        total_bytes,
        threshold: config.size_threshold,
        oversized,
    }
}
