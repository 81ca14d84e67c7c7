//! # Math Module.
//!
//! Dense column vectors and matrices of `f64` used by the trust computation.

use crate::error::TrustError;
use std::{
	fmt,
	ops::{Index, IndexMut},
};

/// A dense column vector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnVector {
	values: Vec<f64>,
}

impl ColumnVector {
	/// Creates a zero vector with `size` entries.
	pub fn new(size: usize) -> Self {
		Self { values: vec![0.0; size] }
	}

	/// Creates a vector with every entry set to `value`.
	pub fn filled(size: usize, value: f64) -> Self {
		Self { values: vec![value; size] }
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns true if the vector has no entries.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Returns the entry at `index`.
	pub fn get(&self, index: usize) -> f64 {
		self.values[index]
	}

	/// Sets the entry at `index`.
	pub fn set(&mut self, index: usize, value: f64) {
		self.values[index] = value;
	}

	/// Sets all entries to `value`.
	pub fn set_all(&mut self, value: f64) {
		self.values.iter_mut().for_each(|x| *x = value);
	}

	/// Iterates over the entries.
	pub fn iter(&self) -> impl Iterator<Item = &f64> {
		self.values.iter()
	}

	/// Borrows the entries as a slice.
	pub fn as_slice(&self) -> &[f64] {
		&self.values
	}

	/// Sum of all entries.
	pub fn sum(&self) -> f64 {
		self.values.iter().sum()
	}

	/// Sum of the absolute values of all entries (L1 norm).
	pub fn abs_sum(&self) -> f64 {
		self.values.iter().map(|x| x.abs()).sum()
	}

	/// Scales the vector so that its L1 norm is 1. A zero vector is left unchanged.
	pub fn normalize(&mut self) {
		let sum = self.abs_sum();
		if sum > 0.0 {
			self.values.iter_mut().for_each(|x| *x /= sum);
		}
	}

	/// Returns a copy multiplied by `scalar`.
	pub fn scale(&self, scalar: f64) -> Self {
		Self { values: self.values.iter().map(|x| x * scalar).collect() }
	}

	/// Element-wise addition.
	pub fn add(&self, other: &ColumnVector) -> Result<ColumnVector, TrustError> {
		self.check_size(other)?;
		let values = self.values.iter().zip(other.values.iter()).map(|(a, b)| a + b).collect();
		Ok(Self { values })
	}

	/// Element-wise multiplication.
	pub fn multiply_element_wise(&self, other: &ColumnVector) -> Result<ColumnVector, TrustError> {
		self.check_size(other)?;
		let values = self.values.iter().zip(other.values.iter()).map(|(a, b)| a * b).collect();
		Ok(Self { values })
	}

	/// L1 distance between two vectors.
	pub fn l1_distance(&self, other: &ColumnVector) -> Result<f64, TrustError> {
		self.check_size(other)?;
		Ok(self.values.iter().zip(other.values.iter()).map(|(a, b)| (a - b).abs()).sum())
	}

	fn check_size(&self, other: &ColumnVector) -> Result<(), TrustError> {
		if self.len() != other.len() {
			return Err(TrustError::invalid_argument(format!(
				"vector sizes differ: {} != {}",
				self.len(),
				other.len()
			)));
		}

		Ok(())
	}
}

impl From<Vec<f64>> for ColumnVector {
	fn from(values: Vec<f64>) -> Self {
		Self { values }
	}
}

impl Index<usize> for ColumnVector {
	type Output = f64;

	fn index(&self, index: usize) -> &f64 {
		&self.values[index]
	}
}

impl IndexMut<usize> for ColumnVector {
	fn index_mut(&mut self, index: usize) -> &mut f64 {
		&mut self.values[index]
	}
}

impl fmt::Display for ColumnVector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let entries: Vec<String> = self.values.iter().map(|x| format!("{:.3}", x)).collect();
		write!(f, "[{}]", entries.join(", "))
	}
}

/// A dense row-major matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
	rows: usize,
	cols: usize,
	values: Vec<f64>,
}

impl Matrix {
	/// Creates a zero matrix.
	pub fn new(rows: usize, cols: usize) -> Self {
		Self { rows, cols, values: vec![0.0; rows * cols] }
	}

	/// Builds a matrix from its rows. All rows must have the same length.
	pub fn from_rows(rows: Vec<ColumnVector>) -> Result<Self, TrustError> {
		let cols = rows.first().map_or(0, |row| row.len());
		let mut matrix = Self::new(rows.len(), cols);
		for (i, row) in rows.iter().enumerate() {
			if row.len() != cols {
				return Err(TrustError::invalid_argument(format!(
					"row {} has {} columns, expected {}",
					i,
					row.len(),
					cols
				)));
			}
			matrix.set_row(i, row);
		}

		Ok(matrix)
	}

	/// Number of rows.
	pub fn row_count(&self) -> usize {
		self.rows
	}

	/// Number of columns.
	pub fn column_count(&self) -> usize {
		self.cols
	}

	/// Returns the entry at `(row, col)`.
	pub fn get(&self, row: usize, col: usize) -> f64 {
		self.values[row * self.cols + col]
	}

	/// Sets the entry at `(row, col)`.
	pub fn set(&mut self, row: usize, col: usize, value: f64) {
		self.values[row * self.cols + col] = value;
	}

	/// Copies a row out of the matrix.
	pub fn row(&self, row: usize) -> ColumnVector {
		let start = row * self.cols;
		ColumnVector::from(self.values[start..start + self.cols].to_vec())
	}

	fn set_row(&mut self, row: usize, values: &ColumnVector) {
		let start = row * self.cols;
		self.values[start..start + self.cols].copy_from_slice(values.as_slice());
	}

	/// Sum of the absolute values of all entries.
	pub fn abs_sum(&self) -> f64 {
		self.values.iter().map(|x| x.abs()).sum()
	}

	/// Scales every non-zero row to unit L1 norm.
	pub fn normalize_rows(&mut self) {
		for i in 0..self.rows {
			let mut row = self.row(i);
			row.normalize();
			self.set_row(i, &row);
		}
	}

	/// Computes `self * vector`.
	pub fn multiply(&self, vector: &ColumnVector) -> Result<ColumnVector, TrustError> {
		if self.cols != vector.len() {
			return Err(TrustError::invalid_argument(format!(
				"matrix has {} columns but vector has {} entries",
				self.cols,
				vector.len()
			)));
		}

		let mut result = ColumnVector::new(self.rows);
		for i in 0..self.rows {
			let mut sum = 0.0;
			for j in 0..self.cols {
				sum += self.get(i, j) * vector[j];
			}
			result[i] = sum;
		}

		Ok(result)
	}

	/// Computes `selfᵗ * vector` without materializing the transpose.
	pub fn transpose_multiply(&self, vector: &ColumnVector) -> Result<ColumnVector, TrustError> {
		if self.rows != vector.len() {
			return Err(TrustError::invalid_argument(format!(
				"matrix has {} rows but vector has {} entries",
				self.rows,
				vector.len()
			)));
		}

		let mut result = ColumnVector::new(self.cols);
		for i in 0..self.rows {
			let weight = vector[i];
			if weight == 0.0 {
				continue;
			}

			for j in 0..self.cols {
				result[j] += self.get(i, j) * weight;
			}
		}

		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalize_uses_absolute_values() {
		let mut vector = ColumnVector::from(vec![1.0, -3.0, 4.0]);
		vector.normalize();

		assert_eq!(vector, ColumnVector::from(vec![0.125, -0.375, 0.5]));
	}

	#[test]
	fn test_zero_vector_is_not_normalized() {
		let mut vector = ColumnVector::new(3);
		vector.normalize();

		assert_eq!(vector, ColumnVector::new(3));
	}

	#[test]
	fn test_vector_size_mismatch() {
		let a = ColumnVector::new(3);
		let b = ColumnVector::new(4);

		assert!(a.add(&b).is_err());
		assert!(a.l1_distance(&b).is_err());
		assert!(a.multiply_element_wise(&b).is_err());
	}

	#[test]
	fn test_l1_distance() {
		let a = ColumnVector::from(vec![1.0, 2.0, 3.0]);
		let b = ColumnVector::from(vec![2.0, 0.0, 3.5]);

		assert_eq!(a.l1_distance(&b).unwrap(), 3.5);
	}

	#[test]
	fn test_matrix_multiplication() {
		let matrix = Matrix::from_rows(vec![
			ColumnVector::from(vec![1.0, 2.0]),
			ColumnVector::from(vec![3.0, 4.0]),
			ColumnVector::from(vec![5.0, 6.0]),
		])
		.unwrap();

		let product = matrix.multiply(&ColumnVector::from(vec![1.0, 2.0])).unwrap();
		assert_eq!(product, ColumnVector::from(vec![5.0, 11.0, 17.0]));

		let transposed = matrix.transpose_multiply(&ColumnVector::from(vec![1.0, 0.0, 2.0])).unwrap();
		assert_eq!(transposed, ColumnVector::from(vec![11.0, 14.0]));

		assert!(matrix.multiply(&ColumnVector::new(3)).is_err());
		assert!(matrix.transpose_multiply(&ColumnVector::new(2)).is_err());
	}

	#[test]
	fn test_rows_can_be_normalized() {
		let mut matrix = Matrix::from_rows(vec![
			ColumnVector::from(vec![1.0, 3.0]),
			ColumnVector::from(vec![0.0, 0.0]),
		])
		.unwrap();
		matrix.normalize_rows();

		assert_eq!(matrix.row(0), ColumnVector::from(vec![0.25, 0.75]));
		assert_eq!(matrix.row(1), ColumnVector::new(2));
		assert_eq!(matrix.abs_sum(), 1.0);
	}

	#[test]
	fn test_ragged_rows_are_rejected() {
		let result = Matrix::from_rows(vec![ColumnVector::new(2), ColumnVector::new(3)]);
		assert!(result.is_err());
	}
}
