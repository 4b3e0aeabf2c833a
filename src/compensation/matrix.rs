use crate::table::TableError;

/// Invert a row-major `n × n` matrix by Gauss-Jordan elimination.
///
/// The matrix is augmented with the identity to form `n × 2n`, every
/// off-diagonal entry of the left half is eliminated column by column, and
/// each row is finally divided by its diagonal. The right half is then the
/// inverse. A zero pivot is swapped with a lower row holding a nonzero entry
/// in the same column; when none exists the matrix is singular.
pub fn invert_matrix(matrix: &[f64], n: usize) -> Result<Vec<f64>, TableError> {
    if matrix.len() != n * n {
        return Err(TableError::InvalidMatrix(format!(
            "expected {} entries for a {}x{} matrix, got {}",
            n * n,
            n,
            n,
            matrix.len()
        )));
    }

    let width = 2 * n;
    let mut aug = vec![0.0; n * width];
    for row in 0..n {
        aug[row * width..row * width + n].copy_from_slice(&matrix[row * n..(row + 1) * n]);
        aug[row * width + n + row] = 1.0;
    }

    for col in 0..n {
        if aug[col * width + col] == 0.0 {
            let pivot = (col + 1..n)
                .find(|&row| aug[row * width + col] != 0.0)
                .ok_or_else(|| TableError::InvalidMatrix("matrix is singular".to_string()))?;
            swap_rows(&mut aug, width, col, pivot);
        }

        let pivot_value = aug[col * width + col];
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row * width + col] / pivot_value;
            if factor == 0.0 {
                continue;
            }
            for k in 0..width {
                aug[row * width + k] -= factor * aug[col * width + k];
            }
        }
    }

    let mut inverse = Vec::with_capacity(n * n);
    for row in 0..n {
        let diagonal = aug[row * width + row];
        if diagonal == 0.0 || !diagonal.is_finite() {
            return Err(TableError::InvalidMatrix("matrix is singular".to_string()));
        }
        inverse.extend(
            aug[row * width + n..(row + 1) * width]
                .iter()
                .map(|v| v / diagonal),
        );
    }
    Ok(inverse)
}

/// Returns true if the row-major `n × n` matrix is exactly the identity
pub fn is_identity(matrix: &[f64], n: usize) -> bool {
    matrix.len() == n * n
        && matrix.iter().enumerate().all(|(i, &v)| {
            let expected = if i / n == i % n { 1.0 } else { 0.0 };
            v == expected
        })
}

fn swap_rows(aug: &mut [f64], width: usize, a: usize, b: usize) {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    let (head, tail) = aug.split_at_mut(high * width);
    head[low * width..(low + 1) * width].swap_with_slice(&mut tail[..width]);
}
