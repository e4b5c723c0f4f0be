//! A single column of enumerated feature values.
use std::mem;
use std::ops::Index;

use crate::constants::BUFFER_SIZE;


/// One feature (column) of a [`Sample`](crate::Sample).
/// Values are enumerated codes stored as `f64`.
/// A sparse column stores only the non-zero entries;
/// every other row reads as `0`.
#[derive(Debug, Clone)]
pub enum Feature {
    /// Every row is stored.
    Dense {
        /// Column name.
        name: String,
        /// One value per row.
        vals: Vec<f64>,
    },
    /// Only the non-zero rows are stored, sorted by row index.
    Sparse {
        /// Column name.
        name: String,
        /// `(row, value)` pairs.
        vals: Vec<(usize, f64)>,
        /// Number of rows.
        size: usize,
    },
}


impl Feature {
    /// Returns the column name.
    pub fn name(&self) -> &str {
        match self {
            Self::Dense  { name, .. } => name,
            Self::Sparse { name, .. } => name,
        }
    }


    /// An empty dense column.
    pub fn dense<T: ToString>(name: T) -> Self {
        Self::Dense {
            name: name.to_string(),
            vals: Vec::with_capacity(BUFFER_SIZE),
        }
    }


    /// An empty sparse column of `size` rows.
    pub fn sparse<T: ToString>(name: T, size: usize) -> Self {
        Self::Sparse {
            name: name.to_string(),
            vals: Vec::with_capacity(BUFFER_SIZE),
            size,
        }
    }


    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Dense  { vals, .. } => vals.len(),
            Self::Sparse { size, .. } => *size,
        }
    }


    /// Returns `true` if the column holds no (non-zero) value.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Dense  { vals, .. } => vals.is_empty(),
            Self::Sparse { vals, .. } => vals.is_empty(),
        }
    }


    /// Returns `true` for [`Feature::Sparse`].
    pub fn is_sparse(&self) -> bool {
        matches!(self, Self::Sparse { .. })
    }


    /// Append the value `val` at row `ix`.
    /// Dense columns ignore `ix` and push;
    /// sparse columns drop zeros.
    pub fn append(&mut self, (ix, val): (usize, f64)) {
        match self {
            Self::Dense  { vals, .. } => vals.push(val),
            Self::Sparse { vals, .. } => {
                if val != 0f64 { vals.push((ix, val)); }
            },
        }
    }


    pub(crate) fn set_size(&mut self, size: usize) {
        let s = size;
        if let Self::Sparse { size, .. } = self { *size = s; }
    }


    pub(crate) fn replace_name<T>(&mut self, name: T) -> String
        where T: ToString,
    {
        let n = name.to_string();
        match self {
            Self::Dense  { name, .. } => mem::replace(name, n),
            Self::Sparse { name, .. } => mem::replace(name, n),
        }
    }


    /// Consume `self` and return the dense vector of values.
    pub fn into_vals(self) -> Vec<f64> {
        match self {
            Self::Dense  { vals, .. } => vals,
            Self::Sparse { vals, size, .. } => {
                let mut ret = vec![0f64; size];
                vals.into_iter()
                    .for_each(|(i, v)| { ret[i] = v; });
                ret
            },
        }
    }
}


impl Index<usize> for Feature {
    type Output = f64;
    fn index(&self, idx: usize) -> &Self::Output {
        match self {
            Self::Dense  { vals, .. } => &vals[idx],
            Self::Sparse { vals, .. } => {
                match vals.binary_search_by(|(i, _)| i.cmp(&idx)) {
                    Ok(p)  => &vals[p].1,
                    Err(_) => &0f64,
                }
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_reads_zero() {
        let mut f = Feature::sparse("rating", 6);
        f.append((1, 4.0));
        f.append((2, 0.0));
        f.append((4, 2.0));

        assert_eq!(f.len(), 6);
        let got = (0..6).map(|i| f[i]).collect::<Vec<_>>();
        assert_eq!(got, vec![0.0, 4.0, 0.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_into_vals_sparse() {
        let mut f = Feature::sparse("rating", 5);
        f.append((1, 7.0));
        f.append((3, -1.0));
        assert_eq!(f.into_vals(), vec![0.0, 7.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_replace_name() {
        let mut f = Feature::dense("old");
        let old = f.replace_name("new");
        assert_eq!(old, "old");
        assert_eq!(f.name(), "new");
    }
}
