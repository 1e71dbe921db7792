use std::path::{Path, PathBuf};

/// Picks a destination path under `dir` for `basename` that does not
/// already exist, appending `_1`, `_2`, … before the extension on collision
/// (§6: "collision-resolution suffixes `_1`, `_2`, … preserving extension").
pub fn unique_destination(dir: &Path, basename: &str) -> PathBuf {
    let candidate = dir.join(basename);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = split_stem_ext(basename);
    for n in 1.. {
        let name = match &ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        let candidate = dir.join(&name);
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!("infinite suffix range always yields a free name");
}

fn split_stem_ext(basename: &str) -> (&str, Option<&str>) {
    match basename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (basename, None),
    }
}

/// Dedup's "no collision suffix" warning heuristic (§4.8): true when
/// `basename` does *not* look like a deliberate duplicate copy, i.e. it
/// lacks a `_<digits>` or ` (<digits>)` suffix before the extension.
pub fn lacks_duplicate_suffix(basename: &str) -> bool {
    let (stem, _ext) = split_stem_ext(basename);

    let underscore_digits = stem
        .rsplit_once('_')
        .map(|(_, suffix)| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false);

    let paren_digits = stem.ends_with(')')
        && stem
            .rfind(" (")
            .map(|idx| {
                let inner = &stem[idx + 2..stem.len() - 1];
                !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit())
            })
            .unwrap_or(false);

    !underscore_digits && !paren_digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_collision_returns_plain_path() {
        let dir = tempfile::tempdir().unwrap();
        let dest = unique_destination(dir.path(), "pic.jpg");
        assert_eq!(dest, dir.path().join("pic.jpg"));
    }

    #[test]
    fn collision_appends_incrementing_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pic.jpg"), b"a").unwrap();
        std::fs::write(dir.path().join("pic_1.jpg"), b"b").unwrap();

        let dest = unique_destination(dir.path(), "pic.jpg");
        assert_eq!(dest, dir.path().join("pic_2.jpg"));
    }

    #[test]
    fn suffix_heuristic_matches_underscore_and_paren_styles() {
        assert!(!lacks_duplicate_suffix("x_1.jpg"));
        assert!(!lacks_duplicate_suffix("x_12.jpg"));
        assert!(!lacks_duplicate_suffix("x (1).jpg"));
        assert!(lacks_duplicate_suffix("x.jpg"));
        assert!(lacks_duplicate_suffix("a.bin"));
    }
}
