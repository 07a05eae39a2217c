use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn new(vec: Vec<f32>) -> Self {
        Self(vec)
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn norm(&self) -> f32 {
        self.0.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Scales to unit L2 length. A zero vector stays zero.
    pub fn normalized(&self) -> Embedding {
        let norm = self.norm();
        if norm == 0.0 {
            return Embedding(vec![0.0; self.0.len()]);
        }
        Embedding(self.0.iter().map(|x| x / norm).collect())
    }

    pub fn dot(&self, other: &Embedding) -> f32 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }
}
