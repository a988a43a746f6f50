//! Vector similarity functions.

use crate::error::TopicsError;
use crate::tfidf::TfIdfVectorizer;

/// Calculate cosine similarity between two vectors.
///
/// Returns value in [-1.0, 1.0] where 1.0 = identical direction. Zero
/// vectors and mismatched dimensions score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// All-zero `n x n` matrix.
pub fn zero_matrix(n: usize) -> Vec<Vec<f32>> {
    vec![vec![0.0f32; n]; n]
}

/// Pairwise TF-IDF cosine similarity between texts.
///
/// Blank texts are left out of the model and get all-zero rows and
/// columns. With fewer than two non-blank texts the whole matrix is zero.
pub fn similarity_matrix(texts: &[String], max_features: usize) -> Result<Vec<Vec<f32>>, TopicsError> {
    let n = texts.len();
    let valid: Vec<usize> = (0..n).filter(|&i| !texts[i].trim().is_empty()).collect();
    if valid.len() < 2 {
        return Ok(zero_matrix(n));
    }

    let docs: Vec<&str> = valid.iter().map(|&i| texts[i].as_str()).collect();
    let rows = TfIdfVectorizer::new(max_features).fit_transform(&docs)?;

    let mut matrix = zero_matrix(n);
    for (a, &i) in valid.iter().enumerate() {
        for (b, &j) in valid.iter().enumerate().skip(a) {
            let sim = cosine_similarity(&rows[a], &rows[b]);
            matrix[i][j] = sim;
            matrix[j][i] = sim;
        }
    }

    Ok(matrix)
}
