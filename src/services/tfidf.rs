//! TF-IDF document vectors.
//!
//! Terms are whitespace-delimited, lower-cased tokens. IDF is smoothed as
//! `ln((1 + n) / (1 + df)) + 1` and every row is L2-normalized, so the cosine
//! similarity of two rows is their dot product.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sparse row: `(term index, weight)` sorted by term index
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    rows: Vec<SparseVector>,
    vocabulary_size: usize,
}

fn tokenize(document: &str) -> impl Iterator<Item = String> + '_ {
    document.split_whitespace().map(str::to_lowercase)
}

impl TfIdfMatrix {
    /// Fits the vocabulary and IDF weights on `documents` and vectorizes them
    pub fn fit_transform<S: AsRef<str>>(documents: &[S]) -> Self {
        let counts: Vec<BTreeMap<String, u32>> = documents
            .iter()
            .map(|document| {
                let mut terms = BTreeMap::new();
                for token in tokenize(document.as_ref()) {
                    *terms.entry(token).or_insert(0u32) += 1;
                }
                terms
            })
            .collect();

        // Sorted vocabulary keeps term indices stable across runs
        let vocabulary: HashMap<&str, usize> = counts
            .iter()
            .flat_map(|terms| terms.keys().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        // Number of documents containing each term
        let mut document_frequency = vec![0u32; vocabulary.len()];
        for terms in &counts {
            for term in terms.keys() {
                document_frequency[vocabulary[term.as_str()]] += 1;
            }
        }

        // Smoothed as if one extra document contained every term
        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .iter()
            .map(|terms| {
                let mut row: SparseVector = terms
                    .iter()
                    .map(|(term, &count)| {
                        let index = vocabulary[term.as_str()];
                        (index, count as f64 * idf[index])
                    })
                    .collect();
                // Sorted by term index for merge-joins
                row.sort_unstable_by_key(|&(index, _)| index);
                normalize(&mut row);
                row
            })
            .collect();

        Self {
            rows,
            vocabulary_size: vocabulary.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    pub fn row(&self, index: usize) -> &[(usize, f64)] {
        &self.rows[index]
    }

    /// Cosine similarity of two rows; 0 when either row is all-zero
    #[cfg(test)]
    pub(crate) fn cosine(&self, a: usize, b: usize) -> f64 {
        dot(&self.rows[a], &self.rows[b])
    }

    /// Term-major view: for each term, the `(row, weight)` pairs containing it, rows ascending
    pub fn postings(&self) -> Vec<Vec<(usize, f64)>> {
        let mut postings = vec![Vec::new(); self.vocabulary_size];
        for (row_index, row) in self.rows.iter().enumerate() {
            for &(term, weight) in row {
                postings[term].push((row_index, weight));
            }
        }
        postings
    }
}

fn normalize(row: &mut SparseVector) {
    let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, weight) in row.iter_mut() {
            *weight /= norm;
        }
    }
}

/// Merge-join dot product of two sorted sparse rows
#[cfg(test)]
fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_rows_are_unit_length() {
        let matrix = TfIdfMatrix::fit_transform(&["a b b c", "c d", "e"]);
        for i in 0..matrix.len() {
            let norm: f64 = matrix.row(i).iter().map(|(_, w)| w * w).sum();
            assert!((norm - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_identical_documents_have_cosine_one() {
        let matrix = TfIdfMatrix::fit_transform(&["x_y scifi", "x_y scifi", "other thing"]);
        assert!((matrix.cosine(0, 1) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_disjoint_documents_have_cosine_zero() {
        let matrix = TfIdfMatrix::fit_transform(&["x_y scifi", "p_q romance"]);
        assert_eq!(matrix.cosine(0, 1), 0.0);
    }

    #[test]
    fn test_blank_document_is_zero_vector() {
        let matrix = TfIdfMatrix::fit_transform(&[" ", "x_y scifi"]);
        assert!(matrix.row(0).is_empty());
        assert_eq!(matrix.cosine(0, 1), 0.0);
    }

    #[test]
    fn test_tokens_are_lowercased() {
        let matrix = TfIdfMatrix::fit_transform(&["SciFi", "scifi"]);
        assert_eq!(matrix.vocabulary_size(), 1);
        assert!((matrix.cosine(0, 1) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        // "common" appears everywhere, "rare" once
        let matrix = TfIdfMatrix::fit_transform(&["common rare", "common", "common"]);
        let row = matrix.row(0);
        let common = row[0].1;
        let rare = row[1].1;
        assert!(rare > common);
    }

    #[test]
    fn test_postings_match_rows() {
        let matrix = TfIdfMatrix::fit_transform(&["a b", "b c"]);
        let postings = matrix.postings();
        assert_eq!(postings.len(), 3);
        let b_rows: Vec<usize> = postings[1].iter().map(|&(row, _)| row).collect();
        assert_eq!(b_rows, vec![0, 1]);
    }
}
