//! Shared steps of the array loaders: opening a scene and stacking bands.

use std::path::PathBuf;

use datacube::{DataCube, LazyArray};
use native_parser::{ProductReader, Scene};
use tracing::debug;

use crate::error::{PluginError, Result};
use crate::locate::ResolvedProduct;

/// Open `product` through `reader`, exposing only `variables`.
pub(crate) fn open_scene(
    reader: &dyn ProductReader,
    files: &[PathBuf],
    variables: &[String],
) -> Result<Scene> {
    debug!(reader = reader.name(), files = files.len(), variables = ?variables, "Opening product");

    reader
        .open(files, variables)
        .map_err(|source| PluginError::Reader {
            reader: reader.name().to_string(),
            source,
        })
}

/// Fetch one variable of an opened scene.
pub(crate) fn scene_variable(
    scene: &Scene,
    reader: &dyn ProductReader,
    name: &str,
) -> Result<LazyArray> {
    scene
        .variable(name)
        .cloned()
        .ok_or_else(|| PluginError::MissingVariable {
            reader: reader.name().to_string(),
            variable: name.to_string(),
        })
}

/// Stack the `(y, x)` variables of a gridded scene in `bands` order.
pub(crate) fn stack_gridded(
    product: &ResolvedProduct,
    reader: &dyn ProductReader,
    scene: &Scene,
    bands: &[String],
) -> Result<DataCube> {
    let layers = bands
        .iter()
        .map(|band| Ok((band.clone(), scene_variable(scene, reader, band)?)))
        .collect::<Result<Vec<_>>>()?;

    let cube = DataCube::stack(scene.interval().midpoint(), layers)?;
    Ok(annotate(cube, product, reader))
}

/// Record where a cube came from.
pub(crate) fn annotate(
    cube: DataCube,
    product: &ResolvedProduct,
    reader: &dyn ProductReader,
) -> DataCube {
    cube.with_attr("collection_id", product.id())
        .with_attr("family", product.family.name())
        .with_attr("reader", reader.name())
}
