//! Numeric backend trait bridging the structural core with dense tensor
//! operations. The core transforms never touch floating point data; only the
//! dense outputs (`khop_adj`) and point-set inputs (k-NN graphs) go through a
//! [`TensorBackend`]. Implementations are picked at configuration time through
//! [`crate::backend_selector::BackendFactory`]; the `ndarray-backend` Cargo
//! feature (enabled by default) compiles the `ndarray` adapter in.

use serde::{Deserialize, Serialize};

use crate::{errors::GraphIndexError, sparse::SparseMatrix};

/// Row-major dense `f32` matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl DenseMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, GraphIndexError> {
        if data.len() != rows * cols {
            return Err(GraphIndexError::invalid_argument(format!(
                "{} values cannot fill a {rows}x{cols} matrix",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::zeros(n, n);
        for i in 0..n {
            matrix.data[i * n + i] = 1.0;
        }
        matrix
    }

    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, GraphIndexError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != cols) {
            return Err(GraphIndexError::invalid_argument(
                "all rows must have the same length",
            ));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Splits consecutive row blocks of the given sizes.
    pub fn split_rows(&self, segments: &[usize]) -> Result<Vec<DenseMatrix>, GraphIndexError> {
        let total: usize = segments.iter().sum();
        if total != self.rows {
            return Err(GraphIndexError::invalid_argument(format!(
                "segments sum to {total} but the matrix has {} rows",
                self.rows
            )));
        }
        let mut start = 0;
        let mut parts = Vec::with_capacity(segments.len());
        for &len in segments {
            let data = self.data[start * self.cols..(start + len) * self.cols].to_vec();
            parts.push(DenseMatrix {
                rows: len,
                cols: self.cols,
                data,
            });
            start += len;
        }
        Ok(parts)
    }
}

pub trait TensorBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn dense_from_sparse(&self, matrix: &SparseMatrix) -> DenseMatrix {
        let (rows, cols) = matrix.shape();
        let data = matrix.to_dense().into_iter().map(|v| v as f32).collect();
        DenseMatrix { rows, cols, data }
    }

    fn matmul(&self, a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix, GraphIndexError>;

    /// `out[i][j] = ||p_i - p_j||^2` over the rows of `points`.
    fn pairwise_squared_distance(&self, points: &DenseMatrix) -> DenseMatrix;

    /// Column indices of the `k` smallest entries of every row, smallest
    /// first; ties resolve to the lower column.
    fn topk_smallest(
        &self,
        matrix: &DenseMatrix,
        k: usize,
    ) -> Result<Vec<Vec<usize>>, GraphIndexError>;
}

/// Plain loops over `Vec<f32>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl TensorBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn matmul(&self, a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix, GraphIndexError> {
        check_matmul(a, b)?;
        let mut out = DenseMatrix::zeros(a.rows, b.cols);
        for i in 0..a.rows {
            for k in 0..a.cols {
                let left = a.data[i * a.cols + k];
                if left == 0.0 {
                    continue;
                }
                for j in 0..b.cols {
                    out.data[i * b.cols + j] += left * b.data[k * b.cols + j];
                }
            }
        }
        Ok(out)
    }

    fn pairwise_squared_distance(&self, points: &DenseMatrix) -> DenseMatrix {
        let n = points.rows;
        let mut out = DenseMatrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                out.data[i * n + j] = points
                    .row(i)
                    .iter()
                    .zip(points.row(j))
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
            }
        }
        out
    }

    fn topk_smallest(
        &self,
        matrix: &DenseMatrix,
        k: usize,
    ) -> Result<Vec<Vec<usize>>, GraphIndexError> {
        check_topk(matrix, k)?;
        Ok((0..matrix.rows)
            .map(|row| smallest_in_row(matrix.row(row), k))
            .collect())
    }
}

#[cfg(feature = "ndarray-backend")]
pub use self::ndarray_backend::NdarrayBackend;

#[cfg(feature = "ndarray-backend")]
mod ndarray_backend {
    use ndarray::{Array2, ArrayView2, Axis};

    use super::{DenseMatrix, TensorBackend, check_matmul, check_topk, smallest_in_row};
    use crate::errors::GraphIndexError;

    /// Adapter over `ndarray` arrays.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NdarrayBackend;

    fn view(matrix: &DenseMatrix) -> Result<ArrayView2<'_, f32>, GraphIndexError> {
        ArrayView2::from_shape((matrix.rows, matrix.cols), &matrix.data)
            .map_err(|e| GraphIndexError::invalid_argument(e.to_string()))
    }

    fn into_dense(array: Array2<f32>) -> DenseMatrix {
        let (rows, cols) = array.dim();
        DenseMatrix {
            rows,
            cols,
            data: array.iter().copied().collect(),
        }
    }

    impl TensorBackend for NdarrayBackend {
        fn name(&self) -> &'static str {
            "ndarray"
        }

        fn matmul(
            &self,
            a: &DenseMatrix,
            b: &DenseMatrix,
        ) -> Result<DenseMatrix, GraphIndexError> {
            check_matmul(a, b)?;
            Ok(into_dense(view(a)?.dot(&view(b)?)))
        }

        fn pairwise_squared_distance(&self, points: &DenseMatrix) -> DenseMatrix {
            let n = points.rows;
            let Ok(x) = view(points) else {
                return DenseMatrix::zeros(n, n);
            };
            let mut out = Array2::<f32>::zeros((n, n));
            for (i, point) in x.axis_iter(Axis(0)).enumerate() {
                let diff = &x - &point;
                let dist = diff.mapv(|v| v * v).sum_axis(Axis(1));
                out.row_mut(i).assign(&dist);
            }
            into_dense(out)
        }

        fn topk_smallest(
            &self,
            matrix: &DenseMatrix,
            k: usize,
        ) -> Result<Vec<Vec<usize>>, GraphIndexError> {
            check_topk(matrix, k)?;
            let x = view(matrix)?;
            Ok(x.axis_iter(Axis(0))
                .map(|row| match row.as_slice() {
                    Some(slice) => smallest_in_row(slice, k),
                    None => smallest_in_row(&row.to_vec(), k),
                })
                .collect())
        }
    }
}

fn check_matmul(a: &DenseMatrix, b: &DenseMatrix) -> Result<(), GraphIndexError> {
    if a.cols != b.rows {
        return Err(GraphIndexError::schema_mismatch(format!(
            "cannot multiply {}x{} by {}x{}",
            a.rows, a.cols, b.rows, b.cols
        )));
    }
    Ok(())
}

fn check_topk(matrix: &DenseMatrix, k: usize) -> Result<(), GraphIndexError> {
    if k > matrix.cols {
        return Err(GraphIndexError::invalid_argument(format!(
            "k = {k} exceeds the {} candidates per row",
            matrix.cols
        )));
    }
    Ok(())
}

fn smallest_in_row(row: &[f32], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| row[a].total_cmp(&row[b]).then(a.cmp(&b)));
    order.truncate(k);
    order
}
