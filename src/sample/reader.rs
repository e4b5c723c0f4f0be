use std::path::Path;

use crate::error::{BoostError, Result};
use super::sample_struct::Sample;


/// A struct that returns [`Sample`].
/// Using this struct, one can read a CSV/SVMLight format file to [`Sample`].
///
/// # Example
/// ```no_run
/// use enumboost::SampleReader;
/// let sample = SampleReader::default()
///     .file("/path/to/votes.csv")
///     .has_header(true)
///     .target_feature("class")
///     .read()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct SampleReader<P, S> {
    file: Option<P>,
    has_header: bool,
    target: Option<S>,
}


impl<P, S> SampleReader<P, S> {
    /// Set the flag whether the file has the header row or not.
    /// Default is `false`.
    pub fn has_header(mut self, flag: bool) -> Self {
        self.has_header = flag;
        self
    }
}


impl<P, S> SampleReader<P, S>
    where P: AsRef<Path>
{
    /// Set the file name.
    pub fn file(mut self, file: P) -> Self {
        self.file = Some(file);
        self
    }
}


impl<P, S> SampleReader<P, S>
    where S: AsRef<str>
{
    /// Set the column name that is used for the class label.
    /// Only CSV files need it.
    pub fn target_feature(mut self, column: S) -> Self {
        self.target = Some(column);
        self
    }
}


impl<P, S> SampleReader<P, S>
    where P: AsRef<Path>,
          S: AsRef<str>
{
    /// Reads the file and returns the [`Sample`].
    /// A file with the `.csv` extension is read as CSV,
    /// anything else as SVMLight.
    /// This method consumes `self`.
    pub fn read(self) -> Result<Sample> {
        let file = self.file
            .ok_or_else(|| BoostError::InvalidParameter {
                name: "file",
                reason: "the file name for csv/svmlight is not set".into(),
            })?;
        let file = file.as_ref();

        if file.extension().is_some_and(|ext| ext == "csv") {
            let target = self.target
                .ok_or_else(|| BoostError::InvalidParameter {
                    name: "target",
                    reason: "the class column is not specified; \
                        use `SampleReader::target_feature`".into(),
                })?;
            Sample::from_csv(file, self.has_header)?
                .set_target(target.as_ref())
        } else {
            Sample::from_svmlight(file)
        }
    }
}
