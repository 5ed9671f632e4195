use std::{error::Error, path::PathBuf, sync::Arc};

use vdsgen::{
    config::Config,
    data_type::DataType,
    generator::{SourceFiles, VdsGenerator},
    geometry::{GapFill, Interleave},
    node::NodePath,
    storage::{
        store::FilesystemStore, ListableDatasetStorageTraits, RawDatasetDescriptor,
        ReadableDatasetStorageTraits, ReadableWritableListableStorage,
        WritableDatasetStorageTraits,
    },
    virtual_dataset::VirtualDatasetDescriptor,
};

#[test]
fn filesystem_gap_fill() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let store = Arc::new(FilesystemStore::new(path.path())?);
    let node = NodePath::new("/entry/detector/data")?;
    store.store_raw_dataset(&RawDatasetDescriptor::new(
        "run/tiles.h5",
        node.clone(),
        vec![20, 4, 6],
        DataType::Int16,
    ))?;

    let mut config = Config::default();
    config.set_source_node(node);
    let generator = VdsGenerator::new(
        store.clone(),
        SourceFiles::from("run/"),
        GapFill::new(3, 2, 2, 2, vec![2, 0], vec![1, 0])?,
        config,
    )?;
    let vds = generator.generate_vds()?;
    assert_eq!(vds.shape, vec![20, 5, 8]);
    assert_eq!(vds.mappings.len(), 10 * 4);

    // the manifest is json on disk
    let output = PathBuf::from("run/vds.h5");
    assert!(path.path().join(&output).is_file());
    let json = std::fs::read_to_string(path.path().join(&output))?;
    let manifest: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(manifest["datasets"]["data"]["kind"], "virtual");

    // read back through a new store
    let store = FilesystemStore::new(path.path())?;
    let read: Option<VirtualDatasetDescriptor> =
        store.virtual_dataset(&output, &NodePath::default())?;
    assert_eq!(read, Some(vds));
    Ok(())
}

#[test]
fn filesystem_interleave_dyn_store() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let store: ReadableWritableListableStorage = Arc::new(FilesystemStore::new(path.path())?);
    for (i, frames) in [3, 3, 2].into_iter().enumerate() {
        store.store_raw_dataset(&RawDatasetDescriptor::new(
            format!("acq_{i}.h5"),
            NodePath::default(),
            vec![frames, 16, 16],
            DataType::UInt32,
        ))?;
    }
    let generator = VdsGenerator::new(
        store.clone(),
        SourceFiles::from("acq_"),
        Interleave::new(1)?,
        Config::default(),
    )?;
    let vds = generator.generate_vds()?;
    assert_eq!(vds.shape, vec![8, 16, 16]);
    assert_eq!(vds.mappings.len(), 3);
    assert_eq!(vds.mappings[2].target.stride()[0], 3);
    assert_eq!(
        store.list_files()?,
        vec![
            PathBuf::from("acq_0.h5"),
            PathBuf::from("acq_1.h5"),
            PathBuf::from("acq_2.h5"),
            PathBuf::from("acq_vds.h5"),
        ]
    );
    Ok(())
}
