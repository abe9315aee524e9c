use super::descriptor::SeriesDescriptor;
use crate::error::Result;
use crate::extraction::tags::{
    get_int_value, get_multi_f64_value, get_non_empty_string, get_string_value,
    IMAGE_ORIENTATION_PATIENT, IMAGE_POSITION_PATIENT, INSTANCE_NUMBER, MODALITY, PIXEL_DATA,
    SERIES_DATE, SERIES_DESCRIPTION, SERIES_INSTANCE_UID, SERIES_NUMBER,
};
use dicom_object::{InMemDicomObject, OpenFileOptions};
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Grouping key: a series UID restricted by series date
type SeriesKey = (String, String);

/// Per-file information needed to group and order slices
#[derive(Debug, Clone)]
struct SliceEntry {
    path: PathBuf,
    position: Option<[f64; 3]>,
    orientation: Option<[f64; 6]>,
    instance_number: Option<i32>,
    modality: String,
    description: Option<String>,
    number: Option<String>,
}

impl SliceEntry {
    fn from_dicom(path: PathBuf, dcm: &InMemDicomObject) -> Self {
        Self {
            path,
            position: get_multi_f64_value(dcm, IMAGE_POSITION_PATIENT)
                .and_then(|v| v.get(..3).map(|s| [s[0], s[1], s[2]])),
            orientation: get_multi_f64_value(dcm, IMAGE_ORIENTATION_PATIENT)
                .and_then(|v| v.get(..6).map(|s| [s[0], s[1], s[2], s[3], s[4], s[5]])),
            instance_number: get_int_value(dcm, INSTANCE_NUMBER),
            modality: get_string_value(dcm, MODALITY).unwrap_or_default(),
            description: get_non_empty_string(dcm, SERIES_DESCRIPTION),
            number: get_non_empty_string(dcm, SERIES_NUMBER),
        }
    }
}

/// Enumerates every DICOM series below `root`
///
/// The tree is walked recursively; files that are not readable DICOM, or
/// that carry no SeriesInstanceUID, are skipped. Files sharing a
/// SeriesInstanceUID but acquired on different SeriesDates form separate
/// series. Series are returned in ascending (UID, date) order.
///
/// # Errors
///
/// Returns an error if the directory cannot be walked
pub fn resolve(root: &Path) -> Result<Vec<SeriesDescriptor>> {
    let mut groups: BTreeMap<SeriesKey, Vec<SliceEntry>> = BTreeMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();

        let dcm = match OpenFileOptions::new().read_until(PIXEL_DATA).open_file(&path) {
            Ok(dcm) => dcm,
            Err(e) => {
                debug!("Skipping non-DICOM file {}: {}", path.display(), e);
                continue;
            }
        };

        let Some(uid) = get_non_empty_string(&dcm, SERIES_INSTANCE_UID) else {
            warn!("Skipping {}: no SeriesInstanceUID", path.display());
            continue;
        };
        let date = get_string_value(&dcm, SERIES_DATE).unwrap_or_default();

        groups
            .entry((uid, date))
            .or_default()
            .push(SliceEntry::from_dicom(path, &dcm));
    }

    let mut series = Vec::with_capacity(groups.len());
    for ((uid, date), mut slices) in groups {
        sort_slices(&mut slices);
        series.push(describe(uid, date, slices));
    }

    info!("Found {} series in {}", series.len(), root.display());
    Ok(series)
}

/// Builds the descriptor of one series from its sorted slices
///
/// Series-level attributes come from the first slice.
fn describe(uid: String, date: String, slices: Vec<SliceEntry>) -> SeriesDescriptor {
    let mut slices = slices.into_iter();
    let first = slices.next();
    let (modality, description, number) = match &first {
        Some(entry) => (
            entry.modality.clone(),
            entry.description.clone(),
            entry.number.clone(),
        ),
        None => (String::new(), None, None),
    };

    SeriesDescriptor {
        series_uid: uid,
        series_date: Some(date).filter(|d| !d.is_empty()),
        file_paths: first.into_iter().chain(slices).map(|s| s.path).collect(),
        modality,
        description,
        number,
    }
}

/// Orders slices along the normal of the first slice's plane
///
/// Falls back to InstanceNumber when geometry is incomplete, and keeps the
/// walk order when neither is available.
fn sort_slices(slices: &mut [SliceEntry]) {
    let normal = slices
        .first()
        .and_then(|s| s.orientation)
        .map(|o| cross([o[0], o[1], o[2]], [o[3], o[4], o[5]]));

    if let Some(normal) = normal {
        if slices.iter().all(|s| s.position.is_some()) {
            slices.sort_by(|a, b| {
                let da = a.position.map(|p| dot(p, normal)).unwrap_or(0.0);
                let db = b.position.map(|p| dot(p, normal)).unwrap_or(0.0);
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            });
            return;
        }
    }

    if slices.iter().all(|s| s.instance_number.is_some()) {
        slices.sort_by_key(|s| s.instance_number);
    }
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
