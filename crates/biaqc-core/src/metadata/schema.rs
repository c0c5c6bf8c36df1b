use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QcError, Result};
use crate::series::{SeriesPath, SeriesSource};

/// One metadata row per plane of an image file.
///
/// Every acquisition field is optional: files routinely omit instrument or
/// timing information, and the analyzer reports absence rather than failing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneMetadata {
    pub file_path: String,
    pub image_name: String,
    pub extension: String,
    pub instrument_model: Option<String>,
    pub instrument_serial_number: Option<String>,
    pub objective_lens_na: Option<f64>,
    pub objective_nominal_magnification: Option<f64>,
    pub significant_bits: Option<f64>,
    pub size_t: Option<f64>,
    pub size_c: Option<f64>,
    pub size_z: Option<f64>,
    pub size_x: Option<f64>,
    pub size_y: Option<f64>,
    pub physical_size_x: Option<f64>,
    pub physical_size_y: Option<f64>,
    pub physical_size_z: Option<f64>,
    pub the_t: Option<f64>,
    pub the_c: Option<f64>,
    pub the_z: Option<f64>,
    pub delta_t: Option<f64>,
    pub delta_t_unit: Option<String>,
}

/// Flatten an OME-like metadata tree into per-plane rows.
///
/// The tree must carry `instruments[0]` and `images[0].pixels.planes`;
/// detector, objective and every scalar below them are optional.
pub fn extract_plane_metadata(path: &SeriesPath, tree: &Value) -> Result<Vec<PlaneMetadata>> {
    let instrument = tree
        .get("instruments")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .ok_or_else(|| QcError::MissingMetadataField("instruments".into()))?;
    let pixels = tree
        .get("images")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .and_then(|img| img.get("pixels"))
        .ok_or_else(|| QcError::MissingMetadataField("images[0].pixels".into()))?;
    let planes = pixels
        .get("planes")
        .and_then(Value::as_array)
        .ok_or_else(|| QcError::MissingMetadataField("pixels.planes".into()))?;

    let first_of = |key: &str| {
        instrument
            .get(key)
            .and_then(Value::as_array)
            .and_then(|a| a.first())
    };
    let detector = first_of("detectors");
    let objective = first_of("objectives");

    let template = PlaneMetadata {
        file_path: path.display_path(),
        image_name: path.image_name.clone(),
        extension: path.extension.clone(),
        instrument_model: detector.and_then(|d| text(d, "model")),
        instrument_serial_number: detector.and_then(|d| text(d, "serial_number")),
        objective_lens_na: objective.and_then(|o| number(o, "lens_na")),
        objective_nominal_magnification: objective.and_then(|o| number(o, "nominal_magnification")),
        significant_bits: number(pixels, "significant_bits"),
        size_t: number(pixels, "size_t"),
        size_c: number(pixels, "size_c"),
        size_z: number(pixels, "size_z"),
        size_x: number(pixels, "size_x"),
        size_y: number(pixels, "size_y"),
        physical_size_x: number(pixels, "physical_size_x"),
        physical_size_y: number(pixels, "physical_size_y"),
        physical_size_z: number(pixels, "physical_size_z"),
        ..Default::default()
    };

    Ok(planes
        .iter()
        .map(|plane| PlaneMetadata {
            the_t: number(plane, "the_t"),
            the_c: number(plane, "the_c"),
            the_z: number(plane, "the_z"),
            delta_t: number(plane, "delta_t"),
            delta_t_unit: text(plane, "delta_t_unit"),
            ..template.clone()
        })
        .collect())
}

/// Metadata rows of an open series.
pub fn series_metadata<S: SeriesSource + ?Sized>(source: &S) -> Result<Vec<PlaneMetadata>> {
    let tree = source.metadata_tree().ok_or_else(|| {
        QcError::MissingMetadataField(format!(
            "{} carries no metadata tree",
            source.path().display_path()
        ))
    })?;
    extract_plane_metadata(source.path(), &tree)
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn number(node: &Value, key: &str) -> Option<f64> {
    let value: Option<f64> = match node.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn text(node: &Value, key: &str) -> Option<String> {
    match node.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
