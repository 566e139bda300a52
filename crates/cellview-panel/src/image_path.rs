//! Image path rewriting
//!
//! The dial image encodes its sector as a numeric suffix of the file stem
//! (`img/dial3.png`), and keypad buttons have a pressed variant with `_d`
//! inserted before the extension (`img/menu_d.png`). Only the file name is
//! rewritten; directories are preserved even when they contain dots.

use crate::dial::Sector;
use cellview_core::constants::PRESSED_SUFFIX;

/// Split `path` into (directory prefix including '/', stem, extension including '.')
fn split_path(path: &str) -> (&str, &str, &str) {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let (dir, name) = path.split_at(name_start);
    match name.rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, ext) = name.split_at(dot);
            (dir, stem, ext)
        }
        _ => (dir, name, ""),
    }
}

/// Rewrite the numeric suffix of the file stem to `sector`
///
/// A stem without a numeric suffix gets one appended.
pub fn sector_image(path: &str, sector: Sector) -> String {
    let (dir, stem, ext) = split_path(path);
    let base = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    format!("{}{}{}{}", dir, base, sector.get(), ext)
}

/// Pressed variant of a button image
///
/// Already pressed images are returned unchanged.
pub fn pressed_image(path: &str) -> String {
    let (dir, stem, ext) = split_path(path);
    if stem.ends_with(PRESSED_SUFFIX) {
        return path.to_string();
    }
    format!("{}{}{}{}", dir, stem, PRESSED_SUFFIX, ext)
}

/// Released variant of a button image
pub fn released_image(path: &str) -> String {
    let (dir, stem, ext) = split_path(path);
    match stem.strip_suffix(PRESSED_SUFFIX) {
        Some(base) => format!("{}{}{}", dir, base, ext),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector(n: u8) -> Sector {
        Sector::new(n).unwrap()
    }

    #[test]
    fn sector_suffix_is_rewritten() {
        assert_eq!(sector_image("/static/img/dial1.png", sector(12)), "/static/img/dial12.png");
        assert_eq!(sector_image("/static/img/dial12.png", sector(3)), "/static/img/dial3.png");
    }

    #[test]
    fn sector_suffix_is_appended_when_missing() {
        assert_eq!(sector_image("dial.png", sector(5)), "dial5.png");
        assert_eq!(sector_image("dial", sector(5)), "dial5");
    }

    #[test]
    fn dotted_directories_are_preserved() {
        assert_eq!(
            sector_image("/static/v1.2/dial4.png", sector(6)),
            "/static/v1.2/dial6.png"
        );
        assert_eq!(pressed_image("/static/v1.2/menu"), "/static/v1.2/menu_d");
    }

    #[test]
    fn pressed_and_released_variants() {
        assert_eq!(pressed_image("foo.png"), "foo_d.png");
        assert_eq!(released_image("foo_d.png"), "foo.png");
        assert_eq!(released_image("foo.png"), "foo.png");
    }

    #[test]
    fn pressing_twice_does_not_stack_suffixes() {
        let once = pressed_image("/img/preset.gif");
        assert_eq!(pressed_image(&once), "/img/preset_d.gif");
    }

    #[test]
    fn hidden_file_without_extension() {
        assert_eq!(pressed_image("/img/.dial"), "/img/.dial_d");
    }
}
