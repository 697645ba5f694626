//! Exact inner-product vector index
//!
//! Vectors are kept in one contiguous buffer in insertion order, so the
//! ordinal of a vector is the number of adds before it. Search scores every
//! vector; at the corpus sizes served here this is fast and needs no
//! accuracy tuning.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

use crate::error::{Error, Result};

/// Flat index scored by inner product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dimensions: usize,
    vectors: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimensions` floats
    pub fn build(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::config("Index dimension must be greater than zero"));
        }
        Ok(Self {
            dimensions,
            vectors: Vec::new(),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimensions
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append an embedding, returning its ordinal
    pub fn add(&mut self, embedding: &[f32]) -> Result<usize> {
        self.check_dimensions(embedding)?;
        let ordinal = self.len();
        self.vectors.extend_from_slice(embedding);
        Ok(ordinal)
    }

    /// Stored embedding at `ordinal`
    pub fn vector(&self, ordinal: usize) -> Option<&[f32]> {
        let start = ordinal.checked_mul(self.dimensions)?;
        self.vectors.get(start..start + self.dimensions)
    }

    /// Top `k` ordinals by inner product with `query`
    ///
    /// Results are sorted by descending score; equal scores keep ascending
    /// ordinal order. `k == 0` or an empty index yields an empty result.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        self.check_dimensions(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .par_chunks(self.dimensions)
            .map(|v| inner_product(query, v))
            .enumerate()
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank_order);
            scored.truncate(k);
        }
        scored.sort_by(rank_order);

        Ok(scored)
    }

    /// Write the index to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::internal(format!("Failed to encode index: {}", e)))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read an index written by [`FlatIndex::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::index_load(format!("{}: {}", path.display(), e)))?;
        let (index, _): (Self, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).map_err(
                |e| Error::index_load(format!("{}: corrupt index: {}", path.display(), e)),
            )?;

        if index.dimensions == 0 || index.vectors.len() % index.dimensions != 0 {
            return Err(Error::index_load(format!(
                "{}: vector buffer does not match dimension {}",
                path.display(),
                index.dimensions
            )));
        }
        Ok(index)
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "Vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }
        Ok(())
    }
}

/// Descending score, then ascending ordinal
fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Inner product of two equal-length vectors
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale a vector to unit L2 norm; zero vectors are returned unchanged
pub fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}
