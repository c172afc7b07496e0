//! Compressed sparse row structures.
//!
//! [`Csr`] stores adjacency structure together with the edge id of every
//! entry and backs neighbourhood queries. [`SparseMatrix`] stores coalesced
//! multiplicities and backs the algorithms expressed as matrix products
//! (k-hop powers, metapath reachability).

use serde::{Deserialize, Serialize};

use crate::errors::GraphIndexError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Csr {
    pub num_rows: usize,
    pub num_cols: usize,
    pub indptr: Vec<usize>,
    pub indices: Vec<usize>,
    pub edge_ids: Vec<usize>,
}

impl Csr {
    /// Builds a CSR from coordinate lists where position `i` is edge id `i`.
    /// Entries of a row stay in edge id order.
    pub(crate) fn from_coo(num_rows: usize, num_cols: usize, rows: &[usize], cols: &[usize]) -> Self {
        debug_assert_eq!(rows.len(), cols.len());
        let mut indptr = vec![0usize; num_rows + 1];
        for &row in rows {
            indptr[row + 1] += 1;
        }
        for i in 0..num_rows {
            indptr[i + 1] += indptr[i];
        }
        let mut cursor = indptr.clone();
        let mut indices = vec![0usize; rows.len()];
        let mut edge_ids = vec![0usize; rows.len()];
        for (eid, (&row, &col)) in rows.iter().zip(cols).enumerate() {
            let slot = cursor[row];
            indices[slot] = col;
            edge_ids[slot] = eid;
            cursor[row] += 1;
        }
        Self {
            num_rows,
            num_cols,
            indptr,
            indices,
            edge_ids,
        }
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn degree(&self, row: usize) -> usize {
        self.indptr[row + 1] - self.indptr[row]
    }

    pub fn neighbors(&self, row: usize) -> &[usize] {
        &self.indices[self.indptr[row]..self.indptr[row + 1]]
    }

    pub fn row_edge_ids(&self, row: usize) -> &[usize] {
        &self.edge_ids[self.indptr[row]..self.indptr[row + 1]]
    }

    /// Expands back into coordinate lists ordered by edge id.
    pub fn to_coo(&self) -> (Vec<usize>, Vec<usize>) {
        let mut rows = vec![0usize; self.nnz()];
        let mut cols = vec![0usize; self.nnz()];
        for row in 0..self.num_rows {
            for slot in self.indptr[row]..self.indptr[row + 1] {
                let eid = self.edge_ids[slot];
                rows[eid] = row;
                cols[eid] = self.indices[slot];
            }
        }
        (rows, cols)
    }

    pub fn validate(&self) -> Result<(), GraphIndexError> {
        if self.indptr.len() != self.num_rows + 1 {
            return Err(GraphIndexError::invalid_argument(format!(
                "indptr has {} entries, expected {}",
                self.indptr.len(),
                self.num_rows + 1
            )));
        }
        if self.indptr.windows(2).any(|w| w[0] > w[1]) || self.indptr[0] != 0 {
            return Err(GraphIndexError::invalid_argument("indptr must be non-decreasing from 0"));
        }
        let nnz = self.indptr[self.num_rows];
        if self.indices.len() != nnz || self.edge_ids.len() != nnz {
            return Err(GraphIndexError::invalid_argument(format!(
                "csr declares {nnz} entries but stores {} indices and {} edge ids",
                self.indices.len(),
                self.edge_ids.len()
            )));
        }
        if let Some(&col) = self.indices.iter().find(|&&col| col >= self.num_cols) {
            return Err(GraphIndexError::out_of_range(format!(
                "column {col} exceeds {} columns",
                self.num_cols
            )));
        }
        let mut seen = vec![false; nnz];
        for &eid in &self.edge_ids {
            if eid >= nnz || std::mem::replace(&mut seen[eid], true) {
                return Err(GraphIndexError::invalid_argument(
                    "edge ids must be a permutation of 0..nnz",
                ));
            }
        }
        Ok(())
    }
}

/// Count-valued sparse matrix with sorted, coalesced columns per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseMatrix {
    num_rows: usize,
    num_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<u64>,
}

impl SparseMatrix {
    /// Every coordinate pair contributes one to its entry; duplicates add up.
    pub(crate) fn from_coo(num_rows: usize, num_cols: usize, rows: &[usize], cols: &[usize]) -> Self {
        let structure = Csr::from_coo(num_rows, num_cols, rows, cols);
        let mut indptr = Vec::with_capacity(num_rows + 1);
        let mut indices = Vec::with_capacity(structure.nnz());
        let mut values = Vec::with_capacity(structure.nnz());
        indptr.push(0);
        let mut scratch = Vec::new();
        for row in 0..num_rows {
            scratch.clear();
            scratch.extend_from_slice(structure.neighbors(row));
            scratch.sort_unstable();
            for &col in &scratch {
                if indices.len() > indptr[row] && indices.last() == Some(&col) {
                    if let Some(last) = values.last_mut() {
                        *last += 1;
                    }
                } else {
                    indices.push(col);
                    values.push(1);
                }
            }
            indptr.push(indices.len());
        }
        Self {
            num_rows,
            num_cols,
            indptr,
            indices,
            values,
        }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            num_rows: n,
            num_cols: n,
            indptr: (0..=n).collect(),
            indices: (0..n).collect(),
            values: vec![1; n],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn get(&self, row: usize, col: usize) -> u64 {
        if row >= self.num_rows {
            return 0;
        }
        let cols = &self.indices[self.indptr[row]..self.indptr[row + 1]];
        match cols.binary_search(&col) {
            Ok(pos) => self.values[self.indptr[row] + pos],
            Err(_) => 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, u64)> + '_ {
        (0..self.num_rows).flat_map(move |row| {
            (self.indptr[row]..self.indptr[row + 1])
                .map(move |slot| (row, self.indices[slot], self.values[slot]))
        })
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    pub fn transpose(&self) -> Self {
        let mut rows = Vec::with_capacity(self.nnz());
        let mut cols = Vec::with_capacity(self.nnz());
        let mut values = Vec::with_capacity(self.nnz());
        for (row, col, value) in self.iter() {
            rows.push(col);
            cols.push(row);
            values.push(value);
        }
        Self::from_weighted(self.num_cols, self.num_rows, &rows, &cols, &values)
    }

    /// Product `self * other` using a dense row accumulator.
    pub fn matmul(&self, other: &SparseMatrix) -> Result<SparseMatrix, GraphIndexError> {
        if self.num_cols != other.num_rows {
            return Err(GraphIndexError::schema_mismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.num_rows, self.num_cols, other.num_rows, other.num_cols
            )));
        }
        let mut accumulator = vec![0u64; other.num_cols];
        let mut touched: Vec<usize> = Vec::new();
        let mut indptr = Vec::with_capacity(self.num_rows + 1);
        let mut indices = Vec::new();
        let mut values = Vec::new();
        indptr.push(0);
        for row in 0..self.num_rows {
            for slot in self.indptr[row]..self.indptr[row + 1] {
                let mid = self.indices[slot];
                let left = self.values[slot];
                for other_slot in other.indptr[mid]..other.indptr[mid + 1] {
                    let col = other.indices[other_slot];
                    let product = left
                        .checked_mul(other.values[other_slot])
                        .ok_or_else(|| GraphIndexError::out_of_range("walk count overflow"))?;
                    if accumulator[col] == 0 {
                        touched.push(col);
                    }
                    accumulator[col] = accumulator[col]
                        .checked_add(product)
                        .ok_or_else(|| GraphIndexError::out_of_range("walk count overflow"))?;
                }
            }
            touched.sort_unstable();
            for &col in &touched {
                indices.push(col);
                values.push(accumulator[col]);
                accumulator[col] = 0;
            }
            touched.clear();
            indptr.push(indices.len());
        }
        Ok(SparseMatrix {
            num_rows: self.num_rows,
            num_cols: other.num_cols,
            indptr,
            indices,
            values,
        })
    }

    /// `self^k` by repeated squaring; `k = 0` gives the identity.
    pub fn pow(&self, k: u32) -> Result<SparseMatrix, GraphIndexError> {
        if self.num_rows != self.num_cols {
            return Err(GraphIndexError::invalid_argument(format!(
                "matrix power needs a square matrix, got {}x{}",
                self.num_rows, self.num_cols
            )));
        }
        let mut result = SparseMatrix::identity(self.num_rows);
        let mut base = self.clone();
        let mut exponent = k;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result.matmul(&base)?;
            }
            exponent >>= 1;
            if exponent > 0 {
                base = base.matmul(&base)?;
            }
        }
        Ok(result)
    }

    /// Same sparsity pattern with every stored value set to one.
    pub fn to_boolean(&self) -> SparseMatrix {
        SparseMatrix {
            num_rows: self.num_rows,
            num_cols: self.num_cols,
            indptr: self.indptr.clone(),
            indices: self.indices.clone(),
            values: vec![1; self.values.len()],
        }
    }

    pub fn to_dense(&self) -> Vec<u64> {
        let mut dense = vec![0u64; self.num_rows * self.num_cols];
        for (row, col, value) in self.iter() {
            dense[row * self.num_cols + col] = value;
        }
        dense
    }

    fn from_weighted(
        num_rows: usize,
        num_cols: usize,
        rows: &[usize],
        cols: &[usize],
        weights: &[u64],
    ) -> Self {
        let structure = Csr::from_coo(num_rows, num_cols, rows, cols);
        let mut indptr = Vec::with_capacity(num_rows + 1);
        let mut indices = Vec::with_capacity(structure.nnz());
        let mut values = Vec::with_capacity(structure.nnz());
        indptr.push(0);
        let mut scratch: Vec<(usize, u64)> = Vec::new();
        for row in 0..num_rows {
            scratch.clear();
            scratch.extend(
                structure
                    .neighbors(row)
                    .iter()
                    .zip(structure.row_edge_ids(row))
                    .map(|(&col, &eid)| (col, weights[eid])),
            );
            scratch.sort_unstable_by_key(|entry| entry.0);
            for &(col, weight) in &scratch {
                if indices.len() > indptr[row] && indices.last() == Some(&col) {
                    if let Some(last) = values.last_mut() {
                        *last += weight;
                    }
                } else {
                    indices.push(col);
                    values.push(weight);
                }
            }
            indptr.push(indices.len());
        }
        Self {
            num_rows,
            num_cols,
            indptr,
            indices,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coo_duplicates_are_counted() {
        let m = SparseMatrix::from_coo(3, 3, &[0, 0, 2, 0], &[1, 1, 0, 2]);
        assert_eq!(m.get(0, 1), 2);
        assert_eq!(m.get(0, 2), 1);
        assert_eq!(m.get(2, 0), 1);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.total(), 4);
    }

    #[test]
    fn csr_rows_keep_edge_order() {
        let csr = Csr::from_coo(2, 3, &[1, 0, 1, 1], &[2, 0, 0, 2]);
        assert_eq!(csr.neighbors(1), &[2, 0, 2]);
        assert_eq!(csr.row_edge_ids(1), &[0, 2, 3]);
        assert_eq!(csr.to_coo(), (vec![1, 0, 1, 1], vec![2, 0, 0, 2]));
        csr.validate().unwrap();
    }

    #[test]
    fn pow_matches_repeated_product() {
        let m = SparseMatrix::from_coo(3, 3, &[0, 1, 2, 0], &[1, 2, 0, 2]);
        let cubed = m.matmul(&m).unwrap().matmul(&m).unwrap();
        assert_eq!(m.pow(3).unwrap(), cubed);
        assert_eq!(m.pow(0).unwrap(), SparseMatrix::identity(3));
    }

    #[test]
    fn transpose_swaps_entries() {
        let m = SparseMatrix::from_coo(2, 3, &[0, 0, 1], &[2, 2, 1]);
        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.get(2, 0), 2);
        assert_eq!(t.get(1, 1), 1);
    }

    #[test]
    fn mismatched_product_is_rejected() {
        let a = SparseMatrix::identity(2);
        let b = SparseMatrix::identity(3);
        assert!(matches!(a.matmul(&b), Err(GraphIndexError::SchemaMismatch(_))));
    }
}
