//! Source metadata aggregation.
//!
//! A [`SourceMeta`] summarises the raw datasets feeding a virtual dataset: the frame axes, the frame height and width, and the data type.
//! It is built either by inspecting every source dataset in a store, or from an [`EmptySource`] when the sources do not exist yet.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use thiserror::Error;

use crate::{
    data_type::DataType,
    geometry::DimensionError,
    node::NodePath,
    selection::ArrayShape,
    storage::{RawDatasetDescriptor, ReadableDatasetStorageTraits, StorageError},
};

/// How the frame axes of multiple sources are aggregated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameAggregation {
    /// Every source has an identical shape and data type.
    ///
    /// The frames of the [`SourceMeta`] are the leading axes of the source shape.
    Uniform,
    /// Sources are three-dimensional with an identical frame height, width and data type, but may differ in frame count.
    ///
    /// The frames of the [`SourceMeta`] are the frame counts of each source, in file order.
    PerFile,
}

/// The shape and data type of sources that do not exist yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmptySource {
    /// The frame axes, or with [`FrameAggregation::PerFile`] the frame count of each source.
    pub frames: Vec<u64>,
    /// The frame height.
    pub height: u64,
    /// The frame width.
    pub width: u64,
    /// The data type.
    pub data_type: DataType,
}

impl EmptySource {
    /// Create a new empty source description.
    #[must_use]
    pub fn new(frames: Vec<u64>, height: u64, width: u64, data_type: DataType) -> Self {
        Self {
            frames,
            height,
            width,
            data_type,
        }
    }

    /// Describe the dataset at `node` in each of `files`.
    ///
    /// # Errors
    /// Returns [`DimensionError::EmptySourceFrames`] if `aggregation` is [`FrameAggregation::PerFile`]
    /// and there is not exactly one frame count per file.
    pub fn descriptors(
        &self,
        files: &[PathBuf],
        node: &NodePath,
        aggregation: FrameAggregation,
    ) -> Result<Vec<RawDatasetDescriptor>, DimensionError> {
        let descriptor = |file: &PathBuf, frames: &[u64]| {
            let shape = frames
                .iter()
                .copied()
                .chain([self.height, self.width])
                .collect();
            RawDatasetDescriptor::new(file, node.clone(), shape, self.data_type)
        };
        match aggregation {
            FrameAggregation::Uniform => Ok(files
                .iter()
                .map(|file| descriptor(file, &self.frames))
                .collect()),
            FrameAggregation::PerFile => {
                if self.frames.len() == files.len() {
                    Ok(std::iter::zip(files, &self.frames)
                        .map(|(file, frames)| descriptor(file, std::slice::from_ref(frames)))
                        .collect())
                } else {
                    Err(DimensionError::EmptySourceFrames {
                        frames: self.frames.clone(),
                        files: files.len(),
                    })
                }
            }
        }
    }
}

/// An attribute of a source that differs from the first source.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("source {file} has {attribute} {got}, expected {expected}")]
pub struct SourceMismatchError {
    /// The mismatching source file.
    pub file: PathBuf,
    /// The mismatching attribute.
    pub attribute: &'static str,
    /// The attribute of the first source.
    pub expected: String,
    /// The attribute of the mismatching source.
    pub got: String,
}

/// A source that does not exist.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MissingSourceError {
    /// The source file does not exist.
    #[error("source file {0} does not exist")]
    File(PathBuf),
    /// The source file exists, but has no dataset at the node.
    #[error("source file {file} has no dataset {node}")]
    Node {
        /// The source file.
        file: PathBuf,
        /// The node.
        node: NodePath,
    },
}

/// A source metadata error.
#[derive(Debug, Error)]
pub enum SourceMetaError {
    /// Sources disagree on an attribute.
    #[error(transparent)]
    SourceMismatch(#[from] SourceMismatchError),
    /// A source does not exist.
    #[error(transparent)]
    MissingSource(#[from] MissingSourceError),
    /// Sources have an unsupported number of dimensions or there are no sources.
    #[error(transparent)]
    Dimension(#[from] DimensionError),
    /// A storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The aggregated metadata of the sources of a virtual dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceMeta {
    frames: Vec<u64>,
    height: u64,
    width: u64,
    data_type: DataType,
}

impl SourceMeta {
    /// Create a new source metadata.
    #[must_use]
    pub fn new(frames: Vec<u64>, height: u64, width: u64, data_type: DataType) -> Self {
        Self {
            frames,
            height,
            width,
            data_type,
        }
    }

    /// Read the description of the dataset at `node` in each of `files`.
    ///
    /// # Errors
    /// Returns a [`MissingSourceError`] if a file or node does not exist, or a [`StorageError`] if the store fails.
    pub fn inspect<TStorage: ?Sized + ReadableDatasetStorageTraits>(
        storage: &TStorage,
        files: &[PathBuf],
        node: &NodePath,
    ) -> Result<Vec<RawDatasetDescriptor>, SourceMetaError> {
        files
            .iter()
            .map(|file| -> Result<RawDatasetDescriptor, SourceMetaError> {
                if !storage.file_exists(file)? {
                    return Err(MissingSourceError::File(file.clone()).into());
                }
                storage.dataset(file, node)?.ok_or_else(|| {
                    MissingSourceError::Node {
                        file: file.clone(),
                        node: node.clone(),
                    }
                    .into()
                })
            })
            .collect()
    }

    /// Aggregate and validate the metadata of `sources`.
    ///
    /// # Errors
    /// Returns
    ///  - [`DimensionError::NoSources`] if `sources` is empty,
    ///  - [`DimensionError::SourceDimensionality`] if a source has too few dimensions
    ///    (or, with [`FrameAggregation::PerFile`], is not three-dimensional), or
    ///  - a [`SourceMismatchError`] if the sources disagree on an attribute that must be identical.
    pub fn from_descriptors(
        sources: &[RawDatasetDescriptor],
        aggregation: FrameAggregation,
    ) -> Result<Self, SourceMetaError> {
        let Some((first, rest)) = sources.split_first() else {
            return Err(DimensionError::NoSources.into());
        };
        for source in sources {
            check_dimensionality(source, aggregation)?;
        }
        let (frames, height, width) = split_shape(&first.shape);

        for source in rest {
            if aggregation == FrameAggregation::Uniform && source.shape.len() != first.shape.len()
            {
                return Err(mismatch(
                    &source.path,
                    "shape",
                    format!("{:?}", first.shape),
                    format!("{:?}", source.shape),
                )
                .into());
            }
            let (source_frames, source_height, source_width) = split_shape(&source.shape);
            if aggregation == FrameAggregation::Uniform && source_frames != frames {
                return Err(mismatch(
                    &source.path,
                    "frames",
                    format!("{frames:?}"),
                    format!("{source_frames:?}"),
                )
                .into());
            }
            if source_height != height {
                return Err(mismatch(&source.path, "height", height, source_height).into());
            }
            if source_width != width {
                return Err(mismatch(&source.path, "width", width, source_width).into());
            }
            if source.data_type != first.data_type {
                return Err(
                    mismatch(&source.path, "data type", first.data_type, source.data_type).into(),
                );
            }
        }

        let frames = match aggregation {
            FrameAggregation::Uniform => frames.to_vec(),
            FrameAggregation::PerFile => sources.iter().map(|source| source.shape[0]).collect(),
        };
        Ok(Self::new(frames, height, width, first.data_type))
    }

    /// Return the frames.
    ///
    /// These are the leading axes of every source with [`FrameAggregation::Uniform`],
    /// or the frame count of each source with [`FrameAggregation::PerFile`].
    #[must_use]
    pub fn frames(&self) -> &[u64] {
        &self.frames
    }

    /// Return the frame height.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Return the frame width.
    #[must_use]
    pub fn width(&self) -> u64 {
        self.width
    }

    /// Return the data type.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Return the shape of a source with [`FrameAggregation::Uniform`]: the frames followed by the height and width.
    #[must_use]
    pub fn source_shape(&self) -> ArrayShape {
        self.frames
            .iter()
            .copied()
            .chain([self.height, self.width])
            .collect()
    }
}

impl core::fmt::Display for SourceMeta {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "frames ({}) of {}x{} {}",
            self.frames.iter().join(", "),
            self.height,
            self.width,
            self.data_type
        )
    }
}

fn check_dimensionality(
    source: &RawDatasetDescriptor,
    aggregation: FrameAggregation,
) -> Result<(), DimensionError> {
    let valid = match aggregation {
        FrameAggregation::Uniform => source.shape.len() >= 2,
        FrameAggregation::PerFile => source.shape.len() == 3,
    };
    if valid {
        Ok(())
    } else {
        Err(DimensionError::SourceDimensionality {
            file: source.path.clone(),
            got: source.shape.len(),
            expected: match aggregation {
                FrameAggregation::Uniform => "at least 2",
                FrameAggregation::PerFile => "3",
            },
        })
    }
}

fn split_shape(shape: &[u64]) -> (&[u64], u64, u64) {
    let (frames, frame) = shape.split_at(shape.len() - 2);
    (frames, frame[0], frame[1])
}

fn mismatch(
    file: &Path,
    attribute: &'static str,
    expected: impl ToString,
    got: impl ToString,
) -> SourceMismatchError {
    SourceMismatchError {
        file: file.to_path_buf(),
        attribute,
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{store::MemoryStore, WritableDatasetStorageTraits};

    fn raw(file: &str, shape: &[u64], data_type: DataType) -> RawDatasetDescriptor {
        RawDatasetDescriptor::new(file, NodePath::default(), shape.to_vec(), data_type)
    }

    #[test]
    fn source_meta_uniform() {
        let sources = [
            raw("stripe_1.h5", &[1, 256, 2048], DataType::UInt16),
            raw("stripe_2.h5", &[1, 256, 2048], DataType::UInt16),
        ];
        let meta = SourceMeta::from_descriptors(&sources, FrameAggregation::Uniform).unwrap();
        assert_eq!(meta, SourceMeta::new(vec![1], 256, 2048, DataType::UInt16));
        assert_eq!(meta.source_shape(), vec![1, 256, 2048]);
        assert_eq!(meta.to_string(), "frames (1) of 256x2048 uint16");

        let meta = SourceMeta::from_descriptors(
            &[raw("image.h5", &[256, 2048], DataType::Float32)],
            FrameAggregation::Uniform,
        )
        .unwrap();
        assert!(meta.frames().is_empty());
    }

    #[test]
    fn source_meta_uniform_mismatch() {
        let base = raw("stripe_1.h5", &[10, 256, 2048], DataType::UInt16);
        let cases = [
            (raw("b.h5", &[10, 256, 2048], DataType::UInt8), "data type"),
            (raw("b.h5", &[10, 256, 1024], DataType::UInt16), "width"),
            (raw("b.h5", &[10, 128, 2048], DataType::UInt16), "height"),
            (raw("b.h5", &[11, 256, 2048], DataType::UInt16), "frames"),
            (raw("b.h5", &[1, 10, 256, 2048], DataType::UInt16), "shape"),
        ];
        for (source, attribute) in cases {
            let err = SourceMeta::from_descriptors(&[base.clone(), source], FrameAggregation::Uniform)
                .unwrap_err();
            match err {
                SourceMetaError::SourceMismatch(err) => {
                    assert_eq!(err.attribute, attribute);
                    assert_eq!(err.file, PathBuf::from("b.h5"));
                }
                err => panic!("unexpected error {err}"),
            }
        }
        let err = SourceMeta::from_descriptors(
            &[base, raw("b.h5", &[10, 256, 2048], DataType::Int16)],
            FrameAggregation::Uniform,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "source b.h5 has data type int16, expected uint16"
        );
    }

    #[test]
    fn source_meta_per_file() {
        let sources = [
            raw("raw_0.h5", &[30, 4, 5], DataType::UInt16),
            raw("raw_1.h5", &[25, 4, 5], DataType::UInt16),
            raw("raw_2.h5", &[20, 4, 5], DataType::UInt16),
        ];
        let meta = SourceMeta::from_descriptors(&sources, FrameAggregation::PerFile).unwrap();
        assert_eq!(meta.frames(), &[30, 25, 20]);
        assert!(matches!(
            SourceMeta::from_descriptors(&sources, FrameAggregation::Uniform),
            Err(SourceMetaError::SourceMismatch(_))
        ));
        assert!(matches!(
            SourceMeta::from_descriptors(
                &[raw("raw_0.h5", &[2, 30, 4, 5], DataType::UInt16)],
                FrameAggregation::PerFile
            ),
            Err(SourceMetaError::Dimension(
                DimensionError::SourceDimensionality { got: 4, .. }
            ))
        ));
    }

    #[test]
    fn source_meta_no_sources() {
        assert!(matches!(
            SourceMeta::from_descriptors(&[], FrameAggregation::Uniform),
            Err(SourceMetaError::Dimension(DimensionError::NoSources))
        ));
        assert!(matches!(
            SourceMeta::from_descriptors(
                &[raw("line.h5", &[2048], DataType::UInt16)],
                FrameAggregation::Uniform
            ),
            Err(SourceMetaError::Dimension(
                DimensionError::SourceDimensionality { got: 1, .. }
            ))
        ));
    }

    #[test]
    fn source_meta_inspect() {
        let store = MemoryStore::new();
        store
            .store_raw_dataset(&raw("raw_0.h5", &[10, 4, 5], DataType::Float32))
            .unwrap();
        let node = NodePath::default();
        let descriptors =
            SourceMeta::inspect(&store, &["raw_0.h5".into()], &node).unwrap();
        assert_eq!(descriptors[0].shape, vec![10, 4, 5]);

        assert!(matches!(
            SourceMeta::inspect(&store, &["raw_0.h5".into(), "raw_1.h5".into()], &node),
            Err(SourceMetaError::MissingSource(MissingSourceError::File(_)))
        ));
        assert!(matches!(
            SourceMeta::inspect(&store, &["raw_0.h5".into()], &NodePath::new("/entry/data").unwrap()),
            Err(SourceMetaError::MissingSource(MissingSourceError::Node { .. }))
        ));
    }

    #[test]
    fn empty_source_descriptors() {
        let files: Vec<PathBuf> = vec!["raw_0.h5".into(), "raw_1.h5".into()];
        let node = NodePath::default();
        let empty = EmptySource::new(vec![30, 25], 4, 5, DataType::UInt16);
        let descriptors = empty
            .descriptors(&files, &node, FrameAggregation::PerFile)
            .unwrap();
        assert_eq!(descriptors[1].shape, vec![25, 4, 5]);
        let descriptors = empty
            .descriptors(&files, &node, FrameAggregation::Uniform)
            .unwrap();
        assert_eq!(descriptors[1].shape, vec![30, 25, 4, 5]);
        assert!(matches!(
            empty.descriptors(&files[..1], &node, FrameAggregation::PerFile),
            Err(DimensionError::EmptySourceFrames { files: 1, .. })
        ));
    }
}
