use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::matrix::InteractionMatrix;

/// Item x item cosine similarity over per-user watch time.
///
/// Symmetric, zero diagonal, and zero wherever either item vector has zero norm.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    values: Array2<f64>,
}

impl SimilarityMatrix {
    pub fn from_interactions(interactions: &InteractionMatrix) -> Self {
        // columns of the user x item matrix are the item vectors
        let matrix = interactions.values();
        let n_items = matrix.len_of(Axis(1));
        let norms: Vec<f64> = matrix
            .axis_iter(Axis(1))
            .map(|col| col.dot(&col).sqrt())
            .collect();

        let mut values = Array2::zeros((n_items, n_items));
        for i in 0..n_items {
            for j in (i + 1)..n_items {
                let denom = norms[i] * norms[j];
                if denom == 0.0 {
                    continue;
                }
                let sim = matrix.column(i).dot(&matrix.column(j)) / denom;
                values[[i, j]] = sim;
                values[[j, i]] = sim;
            }
        }

        Self { values }
    }

    pub fn dim(&self) -> usize {
        self.values.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Similarity-weighted sum of the user's watch time for every item
    pub fn scores(&self, user_vector: ArrayView1<'_, f64>) -> Array1<f64> {
        self.values.dot(&user_vector)
    }
}
