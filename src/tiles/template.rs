// tiles/template.rs
use crate::renderer::TextureRef;
use crate::tiles::random::RandomSource;
use crate::tiles::records::TileTemplateData;

/// Per-variant probability weights of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantWeights {
    weights: Vec<f32>,
    total: f32,
}

impl VariantWeights {
    pub fn new(weights: &[f32]) -> Self {
        assert!(!weights.is_empty(), "a tile template needs at least one variant");
        assert!(
            weights.iter().all(|weight| weight.is_finite() && *weight >= 0.0),
            "variant weights {:?} must be finite and non-negative",
            weights
        );
        let total: f32 = weights.iter().sum();
        assert!(total > 0.0, "variant weights {:?} sum to zero", weights);
        assert!(
            total.is_finite(),
            "variant weights {:?} overflow f32 when summed",
            weights
        );
        Self {
            weights: weights.to_vec(),
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total(&self) -> f32 {
        self.total
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    /// Maps `draw` in `[0, total)` to a variant index.
    ///
    /// Each variant owns the half-open interval `[start, start + weight)` of
    /// the cumulative weights, so a draw landing exactly on a boundary picks
    /// the variant that starts there. Draws at or past `total` (float
    /// rounding) resolve to the last variant with a non-zero weight.
    pub fn select(&self, draw: f32) -> u32 {
        let mut remaining = draw;
        for (index, weight) in self.weights.iter().enumerate() {
            if remaining < *weight {
                return index as u32;
            }
            remaining -= weight;
        }
        self.weights
            .iter()
            .rposition(|weight| *weight > 0.0)
            .unwrap_or(0) as u32
    }

    pub fn sample(&self, random: &mut dyn RandomSource) -> u32 {
        self.select(random.next_unit() * self.total)
    }
}

/// Shared configuration referenced by every tile placed from it.
///
/// The sprite sheet behind `texture` is laid out as one row per variant and
/// one column per animation frame.
#[derive(Debug, Clone)]
pub struct TileTemplate {
    texture: TextureRef,
    weights: VariantWeights,
    frame_duration: f32,
    animation_frame_count: u32,
}

impl TileTemplate {
    pub fn new(
        texture: TextureRef,
        variant_weights: &[f32],
        frame_duration: f32,
        animation_frame_count: u32,
    ) -> Self {
        assert!(
            animation_frame_count > 0,
            "a tile template needs at least one animation frame"
        );
        assert!(
            frame_duration >= 0.0,
            "frame duration {} is negative",
            frame_duration
        );
        Self {
            texture,
            weights: VariantWeights::new(variant_weights),
            frame_duration,
            animation_frame_count,
        }
    }

    pub fn texture(&self) -> TextureRef {
        self.texture
    }

    pub fn weights(&self) -> &VariantWeights {
        &self.weights
    }

    pub fn variant_count(&self) -> u32 {
        self.weights.len() as u32
    }

    pub fn animation_frame_count(&self) -> u32 {
        self.animation_frame_count
    }

    pub fn frame_duration(&self) -> f32 {
        self.frame_duration
    }

    pub fn random_variant(&self, random: &mut dyn RandomSource) -> u32 {
        self.weights.sample(random)
    }

    pub fn gpu_record(&self) -> TileTemplateData {
        TileTemplateData {
            texture_slot: self.texture.slot,
            variant_count: self.variant_count(),
            animation_frame_count: self.animation_frame_count,
            frame_duration: self.frame_duration,
        }
    }
}
