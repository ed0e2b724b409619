//! Column-major (inverted) view of a [`VectorSpace`].
//!
//! Scoring one row walks the row's terms in ascending order and adds
//! `w_q[t] * w_c[t]` into every candidate listed under `t`. Every pair sums
//! its shared terms in the same order whichever side is the query, so
//! `score(a, b)` and `score(b, a)` are bit-identical.
use reelmatch_core::error::{Error, Result};
use reelmatch_core::types::{Position, VectorSpace};

#[derive(Debug, Clone)]
pub struct Postings {
    col_ptr: Vec<usize>,
    rows: Vec<u32>,
    values: Vec<f64>,
}

impl Postings {
    pub fn build(space: &VectorSpace) -> Result<Self> {
        let n_terms = space.n_terms();
        let mut counts = vec![0usize; n_terms];
        for p in 0..space.n_rows() {
            for &t in space.row(p)?.indices {
                counts[t as usize] += 1;
            }
        }
        let mut col_ptr = Vec::with_capacity(n_terms + 1);
        col_ptr.push(0);
        for c in &counts {
            col_ptr.push(col_ptr[col_ptr.len() - 1] + c);
        }
        let nnz = col_ptr[n_terms];
        let mut next = col_ptr[..n_terms].to_vec();
        let mut rows = vec![0u32; nnz];
        let mut values = vec![0.0f64; nnz];
        // Rows are visited in ascending order, so each column stays sorted by row.
        for p in 0..space.n_rows() {
            let row = space.row(p)?;
            for (t, w) in row.iter() {
                let slot = next[t as usize];
                rows[slot] = p as u32;
                values[slot] = w;
                next[t as usize] += 1;
            }
        }
        Ok(Self { col_ptr, rows, values })
    }

    pub fn n_terms(&self) -> usize {
        self.col_ptr.len().saturating_sub(1)
    }

    /// Rows holding `term` and their weights.
    pub fn column(&self, term: u32) -> (&[u32], &[f64]) {
        let t = term as usize;
        if t >= self.n_terms() {
            return (&[], &[]);
        }
        let (start, end) = (self.col_ptr[t], self.col_ptr[t + 1]);
        (&self.rows[start..end], &self.values[start..end])
    }

    /// Cosine similarity of `position` against every row, clamped to `[0, 1]`.
    pub fn score_row(&self, space: &VectorSpace, position: Position) -> Result<Vec<f64>> {
        let mut scores = vec![0.0f64; space.n_rows()];
        self.score_row_into(space, position, &mut scores)?;
        Ok(scores)
    }

    /// [`Postings::score_row`] written into `out`, which must hold one slot per row.
    pub fn score_row_into(
        &self,
        space: &VectorSpace,
        position: Position,
        out: &mut [f64],
    ) -> Result<()> {
        if out.len() != space.n_rows() {
            return Err(Error::InvalidArgument(format!(
                "score buffer holds {} slots for {} rows",
                out.len(),
                space.n_rows()
            )));
        }
        let query = space.row(position)?;
        out.fill(0.0);
        for (t, wq) in query.iter() {
            let (rows, weights) = self.column(t);
            for (&r, &wc) in rows.iter().zip(weights) {
                out[r as usize] += wq * wc;
            }
        }
        for s in out.iter_mut() {
            *s = clamp_score(*s);
        }
        Ok(())
    }

    pub fn heap_bytes(&self) -> usize {
        self.col_ptr.len() * std::mem::size_of::<usize>()
            + self.rows.len() * std::mem::size_of::<u32>()
            + self.values.len() * std::mem::size_of::<f64>()
    }
}

/// Rounding can push a unit-norm self product a hair past 1.0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
