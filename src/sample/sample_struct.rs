use std::path::Path;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::collections::HashMap;
use std::ops::Index;
use std::mem;

use polars::prelude::*;
use rayon::prelude::*;

use crate::error::{BoostError, Result};
use super::feature::*;


/// A batch of training examples for multiclass classification.
/// Columns are stored as [`Feature`]s,
/// the target as class indices in `0..n_class`.
/// The `k`-th class corresponds to the `k`-th smallest raw target value,
/// see [`Sample::classes`].
#[derive(Debug, Clone)]
pub struct Sample {
    pub(super) name_to_index: HashMap<String, usize>,
    pub(super) features: Vec<Feature>,
    pub(super) target: Vec<usize>,
    pub(super) classes: Vec<f64>,
    pub(super) n_sample: usize,
    pub(super) n_feature: usize,
}


impl Sample {
    /// Build a dense sample from row vectors and class indices.
    /// The number of classes is `max(labels) + 1`.
    ///
    /// ```
    /// use enumboost::Sample;
    ///
    /// let rows = vec![vec![0.0, 1.0], vec![1.0, 1.0]];
    /// let sample = Sample::new(rows, vec![0, 1]).unwrap();
    /// assert_eq!(sample.shape(), (2, 2));
    /// assert_eq!(sample.n_class(), 2);
    /// ```
    pub fn new(rows: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self> {
        let n_sample = rows.len();
        if n_sample != labels.len() {
            return Err(BoostError::invalid_training_set(format!(
                "{n_sample} rows but {} labels", labels.len()
            )));
        }
        let n_feature = rows.first().map(|r| r.len()).unwrap_or(0);

        let mut features = (1..=n_feature)
            .map(|j| Feature::dense(format!("Feat. [{j}]")))
            .collect::<Vec<_>>();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_feature {
                return Err(BoostError::invalid_training_set(format!(
                    "row {i} has {} values, expected {n_feature}", row.len()
                )));
            }
            for (feat, x) in features.iter_mut().zip(row) {
                feat.append((i, x));
            }
        }

        let n_class = labels.iter().max().map(|&l| l + 1).unwrap_or(0);
        let classes = (0..n_class).map(|k| k as f64).collect();
        let name_to_index = name_to_index(&features);

        Ok(Self {
            name_to_index,
            features,
            target: labels,
            classes,
            n_sample,
            n_feature,
        })
    }


    /// Read a CSV format file to [`Sample`].
    /// **Do not forget** to call [`Sample::set_target`] to
    /// assign the class label.
    pub fn from_csv<P>(file: P, has_header: bool) -> Result<Self>
        where P: AsRef<Path>,
    {
        let file = File::open(file)?;
        Self::from_reader(BufReader::new(file), has_header)
    }


    /// Read CSV rows from a [`BufReader`].
    ///
    /// If the input has no header row,
    /// this method names the columns
    /// `Feat. [1]`, `Feat. [2]`, ..., `Feat. [n]`.
    pub fn from_reader<R>(reader: BufReader<R>, mut has_header: bool)
        -> Result<Self>
        where R: Read,
    {
        let mut lines = reader.lines();

        let mut features = Vec::new();
        if has_header {
            let header = lines.next()
                .ok_or_else(|| BoostError::Parse {
                    line: 1,
                    reason: "the header row is missing".into(),
                })??;
            features = header.split(',')
                .map(|name| Feature::dense(name.trim()))
                .collect::<Vec<_>>();
        }

        let mut n_sample = 0_usize;
        let offset = if has_header { 2 } else { 1 };
        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }

            let xs = parse_csv_row(&line, i + offset)?;

            // No header: build a dummy one from the first row.
            if !has_header {
                features = (1..=xs.len())
                    .map(|j| Feature::dense(format!("Feat. [{j}]")))
                    .collect();
                has_header = true;
            }

            if xs.len() != features.len() {
                return Err(BoostError::Parse {
                    line: i + offset,
                    reason: format!(
                        "expected {} columns, got {}",
                        features.len(), xs.len(),
                    ),
                });
            }
            features.iter_mut()
                .zip(xs)
                .for_each(|(feat, x)| feat.append((n_sample, x)));

            n_sample += 1;
        }

        let n_feature = features.len();
        let name_to_index = name_to_index(&features);

        Ok(Self {
            name_to_index,
            features,
            target: Vec::new(),
            classes: Vec::new(),
            n_sample,
            n_feature,
        })
    }


    /// Move the column named `target` into the class labels.
    /// Distinct raw values are mapped, in ascending order,
    /// to the classes `0, 1, 2, ...`.
    pub fn set_target<S: AsRef<str>>(mut self, target: S) -> Result<Self> {
        let target = target.as_ref();
        let pos = self.features.iter()
            .position(|feat| feat.name() == target)
            .ok_or_else(|| BoostError::InvalidParameter {
                name: "target",
                reason: format!("the column `{target}` does not exist"),
            })?;

        let raw = self.features.remove(pos).into_vals();
        let (labels, classes) = encode_target(&raw)?;
        self.target = labels;
        self.classes = classes;
        self.n_feature -= 1;
        self.name_to_index = name_to_index(&self.features);

        Ok(self)
    }


    /// Read a SVMLight format file to `Sample`.
    ///
    /// Each line has the form
    /// ```txt
    /// y index:value index:value ...
    /// ```
    /// where `y` is the raw class label.
    /// Feature indices are used as-is and
    /// columns that never hold a non-zero value are dropped.
    pub fn from_svmlight<P: AsRef<Path>>(file: P) -> Result<Self> {
        let mut features: Vec<Feature> = Vec::new();
        let mut raw_target = Vec::new();
        let mut n_sample = 0_usize;

        let file = File::open(file)?;
        let lines = BufReader::new(file).lines();

        for (k, line) in lines.enumerate() {
            let line = line?;
            let mut words = line.split_whitespace();
            let Some(y) = words.next() else { continue; };
            let y = y.parse::<f64>()
                .map_err(|_| BoostError::Parse {
                    line: k + 1,
                    reason: format!("invalid label `{y}`"),
                })?;
            raw_target.push(y);

            for word in words {
                let (i, x) = index_and_feature(word, k + 1)?;

                while features.len() <= i {
                    let j = features.len() + 1;
                    features.push(Feature::sparse(format!("Feat. [{j}]"), 0));
                }

                features[i].append((n_sample, x));
            }
            n_sample += 1;
        }

        features.iter_mut()
            .for_each(|feat| feat.set_size(n_sample));

        let (target, classes) = encode_target(&raw_target)?;
        let n_feature = features.len();
        let name_to_index = name_to_index(&features);

        let mut sample = Self {
            name_to_index, features, target, classes, n_sample, n_feature,
        };
        sample.remove_allzero_features();

        Ok(sample)
    }


    /// Convert a `polars::DataFrame` and a target `Series` into `Sample`.
    /// Every column is cast to `f64`; null cells are rejected.
    pub fn from_dataframe(data: DataFrame, target: Series) -> Result<Self> {
        let (n_sample, n_feature) = data.shape();

        let raw = series_to_vec(&target)?;
        if raw.len() != n_sample {
            return Err(BoostError::invalid_training_set(format!(
                "{n_sample} rows but {} target values", raw.len()
            )));
        }
        let (target, classes) = encode_target(&raw)?;

        let features = data.get_columns()
            .par_iter()
            .map(|series| {
                let vals = series_to_vec(series)?;
                Ok(Feature::Dense { name: series.name().to_string(), vals })
            })
            .collect::<Result<Vec<_>>>()?;

        let name_to_index = name_to_index(&features);

        Ok(Self {
            name_to_index, features, target, classes, n_sample, n_feature,
        })
    }


    /// Removes the empty features in `self.features`.
    fn remove_allzero_features(&mut self) {
        let features = mem::take(&mut self.features);
        self.features = features.into_iter()
            .filter(|feat| !feat.is_empty())
            .collect();
        self.n_feature = self.features.len();
        self.name_to_index = name_to_index(&self.features);
    }


    /// Returns the class index of every example.
    pub fn target(&self) -> &[usize] {
        &self.target[..]
    }


    /// Returns the raw target value of each class, in class order.
    pub fn classes(&self) -> &[f64] {
        &self.classes[..]
    }


    /// Returns the number of classes.
    pub fn n_class(&self) -> usize {
        self.classes.len()
    }


    /// Returns a slice of the features.
    pub fn features(&self) -> &[Feature] {
        &self.features[..]
    }


    /// Returns the value of `feature` at `row`.
    #[inline]
    pub fn value(&self, feature: usize, row: usize) -> f64 {
        self.features[feature][row]
    }


    /// Returns the pair of the number of examples and
    /// the number of features.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_sample, self.n_feature)
    }


    /// Returns the `row`-th instance `(x, y)`.
    pub fn at(&self, row: usize) -> (Vec<f64>, usize) {
        let x = self.features.iter()
            .map(|feat| feat[row])
            .collect::<Vec<f64>>();
        (x, self.target[row])
    }


    /// Set the feature (column) names.
    /// Returns the old names.
    pub fn replace_names<S, T>(&mut self, names: T) -> Result<Vec<String>>
        where S: ToString,
              T: AsRef<[S]>,
    {
        let names = names.as_ref();
        if names.len() != self.n_feature {
            return Err(BoostError::InvalidParameter {
                name: "names",
                reason: format!(
                    "expected {} names, got {}", self.n_feature, names.len()
                ),
            });
        }

        let old_names = names.iter()
            .zip(&mut self.features[..])
            .map(|(name, feature)| feature.replace_name(name.to_string()))
            .collect();
        self.name_to_index = name_to_index(&self.features);
        Ok(old_names)
    }


    /// Check that `self` can be used to train a classifier:
    /// at least one example, one feature, and a target column.
    pub fn check_trainable(&self) -> Result<()> {
        let (n_sample, n_feature) = self.shape();
        if n_sample == 0 {
            return Err(BoostError::invalid_training_set("no examples"));
        }
        if n_feature == 0 {
            return Err(BoostError::invalid_training_set("no features"));
        }
        if self.target.len() != n_sample {
            return Err(BoostError::invalid_training_set(
                "the target column is not set; use `Sample::set_target`"
            ));
        }
        Ok(())
    }
}


fn name_to_index(features: &[Feature]) -> HashMap<String, usize> {
    features.iter()
        .enumerate()
        .map(|(i, f)| (f.name().to_string(), i))
        .collect()
}


fn parse_csv_row(line: &str, line_no: usize) -> Result<Vec<f64>> {
    line.split(',')
        .map(|x| {
            let x = x.trim();
            x.parse::<f64>()
                .map_err(|_| BoostError::Parse {
                    line: line_no,
                    reason: format!("non-numerical value `{x}`"),
                })
        })
        .collect()
}


/// Parse `index:value`, where `index: usize` and `value: f64`.
fn index_and_feature(word: &str, line: usize) -> Result<(usize, f64)> {
    let parse_error = || BoostError::Parse {
        line,
        reason: format!("expected `index:value`, got `{word}`"),
    };
    let (i, x) = word.split_once(':').ok_or_else(parse_error)?;
    let i = i.trim().parse::<usize>().map_err(|_| parse_error())?;
    let x = x.trim().parse::<f64>().map_err(|_| parse_error())?;

    Ok((i, x))
}


/// Map raw target values to class indices.
/// Returns the labels and the sorted distinct raw values.
fn encode_target(raw: &[f64]) -> Result<(Vec<usize>, Vec<f64>)> {
    if raw.iter().any(|y| y.is_nan()) {
        return Err(BoostError::invalid_training_set("the target contains NaN"));
    }
    let mut classes = raw.to_vec();
    classes.sort_by(f64::total_cmp);
    classes.dedup();

    let labels = raw.iter()
        .map(|y| {
            classes.binary_search_by(|c| c.total_cmp(y))
                .unwrap_or_default()
        })
        .collect();
    Ok((labels, classes))
}


fn series_to_vec(series: &Series) -> Result<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    let vals = casted.f64()?
        .into_iter()
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| BoostError::invalid_training_set(format!(
            "the column `{}` contains null values", series.name()
        )))?;
    Ok(vals)
}


impl<S> Index<S> for Sample
    where S: AsRef<str>
{
    type Output = Feature;

    fn index(&self, name: S) -> &Self::Output {
        let name: &str = name.as_ref();
        let k = *self.name_to_index.get(name)
            .unwrap_or_else(|| panic!("the feature `{name}` does not exist"));
        &self.features[k]
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn training_examples(bytes: &[u8], has_header: bool) -> Sample {
        let reader = BufReader::new(bytes);
        Sample::from_reader(reader, has_header)
            .unwrap()
            .set_target("class")
            .unwrap()
    }

    #[test]
    fn test_from_reader_01() {
        let bytes = b"\
            color,size,class\n\
            0,1,2\n\
            1,1,0\n\
            2,0,5\n\
            0,0,0";
        let sample = training_examples(bytes, true);

        assert_eq!(sample.shape(), (4, 2));
        assert_eq!(sample.classes(), &[0.0, 2.0, 5.0]);
        assert_eq!(sample.target(), &[1, 0, 2, 0]);
        assert_eq!(sample["size"][2], 0.0);
    }

    #[test]
    fn test_from_reader_without_header() {
        let bytes = b"1,0\n2,1\n";
        let sample = Sample::from_reader(BufReader::new(&bytes[..]), false)
            .unwrap();
        assert_eq!(sample.shape(), (2, 2));
        assert_eq!(sample.features()[0].name(), "Feat. [1]");
        assert!(sample.check_trainable().is_err());
    }

    #[test]
    fn test_from_reader_rejects_text() {
        let bytes = b"a,class\nred,1\n";
        let err = Sample::from_reader(BufReader::new(&bytes[..]), true)
            .unwrap_err();
        assert!(matches!(err, BoostError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_set_target_missing_column() {
        let bytes = b"a,b\n1,2\n";
        let err = Sample::from_reader(BufReader::new(&bytes[..]), true)
            .unwrap()
            .set_target("class")
            .unwrap_err();
        assert!(matches!(err, BoostError::InvalidParameter { .. }));
    }

    #[test]
    fn test_new_shape_mismatch() {
        let err = Sample::new(vec![vec![0.0], vec![0.0, 1.0]], vec![0, 1])
            .unwrap_err();
        assert!(matches!(err, BoostError::InvalidTrainingSet { .. }));
    }

    #[test]
    fn test_from_dataframe() {
        let data = df!(
            "color" => &[0.0, 1.0, 2.0],
            "shape" => &[1_i64, 1, 0]
        ).unwrap();
        let target = Series::new("class", &[3_i64, 1, 3]);

        let sample = Sample::from_dataframe(data, target).unwrap();
        assert_eq!(sample.shape(), (3, 2));
        assert_eq!(sample.n_class(), 2);
        assert_eq!(sample.target(), &[1, 0, 1]);
        assert_eq!(sample.value(1, 2), 0.0);
    }

    #[test]
    fn test_at() {
        let sample = Sample::new(
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec![1, 0],
        ).unwrap();
        assert_eq!(sample.at(1), (vec![3.0, 4.0], 0));
    }
}
