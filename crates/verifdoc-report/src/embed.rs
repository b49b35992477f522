// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Asset embedder: decode raster evidence (heatmaps) and fit it inside the
// image bounds of a report page.

use std::collections::BTreeMap;

use image::DynamicImage;
use tracing::{debug, instrument, warn};
use verifdoc_core::config::EmbedderConfig;
use verifdoc_core::error::{Result, VerifdocError};

/// Key of a decoded image in an [`AssetStore`]; the asset reference it was
/// embedded under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetHandle(String);

impl AssetHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of embedding one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedAsset {
    pub handle: AssetHandle,
    pub intrinsic_width: u32,
    pub intrinsic_height: u32,
    pub scaled_width: f32,
    pub scaled_height: f32,
}

/// Decoded images, keyed by asset reference, ready for the PDF encoder.
#[derive(Debug, Default)]
pub struct AssetStore {
    images: BTreeMap<AssetHandle, DynamicImage>,
}

impl AssetStore {
    pub fn get_by_ref(&self, asset_ref: &str) -> Option<&DynamicImage> {
        self.images.get(&AssetHandle(asset_ref.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetHandle, &DynamicImage)> {
        self.images.iter()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Decodes assets and computes their placed size.
#[derive(Debug, Default)]
pub struct AssetEmbedder {
    allow_upscale: bool,
    store: AssetStore,
}

impl AssetEmbedder {
    pub fn new(config: &EmbedderConfig) -> Self {
        Self {
            allow_upscale: config.allow_upscale,
            store: AssetStore::default(),
        }
    }

    /// Decode `bytes` and scale the image to fit `max_width` x `max_height`
    /// points, preserving its aspect ratio.
    ///
    /// Bytes that are not a supported raster format fail with
    /// [`VerifdocError::Decode`].
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn embed(
        &mut self,
        asset_ref: &str,
        bytes: &[u8],
        max_width: f32,
        max_height: f32,
    ) -> Result<EmbeddedAsset> {
        let decoded = image::load_from_memory(bytes).map_err(|err| {
            warn!(asset_ref, %err, "asset could not be decoded");
            VerifdocError::Decode {
                asset: asset_ref.to_owned(),
                reason: err.to_string(),
            }
        })?;

        let (iw, ih) = (decoded.width(), decoded.height());
        if iw == 0 || ih == 0 {
            return Err(VerifdocError::Decode {
                asset: asset_ref.to_owned(),
                reason: "image has no pixels".into(),
            });
        }

        let (scaled_width, scaled_height) =
            fit_within(iw as f32, ih as f32, max_width, max_height, self.allow_upscale);
        debug!(iw, ih, scaled_width, scaled_height, "asset scaled");

        let handle = AssetHandle(asset_ref.to_owned());
        self.store.images.insert(handle.clone(), decoded);

        Ok(EmbeddedAsset {
            handle,
            intrinsic_width: iw,
            intrinsic_height: ih,
            scaled_width,
            scaled_height,
        })
    }

    /// Hand over every image decoded so far.
    pub fn into_store(self) -> AssetStore {
        self.store
    }
}

/// Scale `(width, height)` into the bounds, keeping the aspect ratio.
///
/// `scale = min(max_width / width, max_height / height)`, capped at 1.0
/// unless upscaling is allowed.
pub fn fit_within(
    width: f32,
    height: f32,
    max_width: f32,
    max_height: f32,
    allow_upscale: bool,
) -> (f32, f32) {
    let mut scale = (max_width / width).min(max_height / height);
    if !allow_upscale {
        scale = scale.min(1.0);
    }
    (width * scale, height * scale)
}
