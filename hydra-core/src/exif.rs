use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Field, In, Reader, Tag};

/// Sentinel used for a present-but-unreadable tag (§6: "missing tags become
/// the literal string `ERROR`").
const TAG_ERROR: &str = "ERROR";

/// The subset of EXIF metadata the indexer and date-mover care about.
///
/// When a file has no EXIF segment at all, every field is the empty string
/// rather than `"ERROR"` — the original distinguishes "no EXIF" from
/// "EXIF present but this particular tag is missing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifFields {
    pub camera: String,
    pub lens: String,
    pub exp_time: String,
    pub exp_fnum: String,
    pub exp_iso: String,
    pub focal_length: String,
    pub flash: String,
    /// Raw `EXIF DateTimeDigitized` value (`"YYYY:MM:DD HH:MM:SS"`), if present.
    pub date_time_digitized: Option<String>,
}

/// Reads the EXIF fields from `path`. Never fails on a missing/corrupt EXIF
/// segment — that's represented as [`ExifFields::default`] (all-empty), per
/// §6: only an I/O error opening the file itself is propagated.
pub fn extract(path: &Path) -> std::io::Result<ExifFields> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(_) => return Ok(ExifFields::default()),
    };

    let field_string = |tag: Tag| -> String {
        match exif.get_field(tag, In::PRIMARY) {
            Some(field) => display_value(field),
            None => TAG_ERROR.to_string(),
        }
    };

    let lens = lens_field(&exif);

    Ok(ExifFields {
        camera: field_string(Tag::Model),
        lens,
        exp_time: field_string(Tag::ExposureTime),
        exp_fnum: field_string(Tag::FNumber),
        exp_iso: field_string(Tag::PhotographicSensitivity),
        focal_length: field_string(Tag::FocalLength),
        flash: field_string(Tag::Flash),
        date_time_digitized: exif
            .get_field(Tag::DateTimeDigitized, In::PRIMARY)
            .map(display_value),
    })
}

fn display_value(field: &Field) -> String {
    field.display_value().to_string()
}

/// Lens tag, tried in order: `MakerNote LensMinMaxFocalMaxAperture`, then
/// `EXIF LensSpecification`.
///
/// The maker-note tag is manufacturer-proprietary and not exposed as a named
/// constant by the EXIF reader this crate uses (it only decodes standard
/// IFDs); this adapter approximates the two-tag fallback by going straight
/// to `LensSpecification`, documented as a known limitation in DESIGN.md.
fn lens_field(exif: &exif::Exif) -> String {
    match exif.get_field(Tag::LensSpecification, In::PRIMARY) {
        Some(field) => display_value(field),
        None => TAG_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_without_exif_segment_is_all_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.bin");
        std::fs::write(&path, b"not an image").unwrap();

        let fields = extract(&path).unwrap();
        assert_eq!(fields, ExifFields::default());
        assert_eq!(fields.camera, "");
    }
}
