//! Subtitle satellite discovery and rename planning.
//!
//! When a media file is renamed, sibling subtitle files that follow the
//! usual `<base>.<lang>.<ext>` convention should move with it. Discovery
//! runs against the pre-rename directory state; planning preserves
//! language/track suffixes and resolves name collisions.

use archivist_common::paths::is_subtitle_file;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Base-name modifier tokens that qualify as part of a subtitle suffix.
const SUFFIX_MODIFIERS: &[&str] = &["forced", "sdh", "cc", "default", "hi"];

/// Which subtitle files count as satellites of a media file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtitlePolicy {
    /// Only subtitles whose base name matches the media file's base name,
    /// exactly or with a `.`-separated suffix. Avoids renaming unrelated
    /// subtitles in mixed-content folders.
    #[default]
    SameBaseName,
    /// Every subtitle file in the directory, regardless of base name.
    AllInFolder,
}

/// Find subtitle files in the media file's directory, per policy.
///
/// A directory read failure yields an empty list. Results are sorted so
/// rename planning is deterministic.
pub fn find_subtitles(media_path: &Path, policy: SubtitlePolicy) -> Vec<PathBuf> {
    let Some(dir) = media_path.parent() else {
        return Vec::new();
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let media_base = file_stem(media_path);

    let mut subtitles: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_subtitle_file(path))
        .filter(|path| match policy {
            SubtitlePolicy::AllInFolder => true,
            SubtitlePolicy::SameBaseName => matches_base(path, &media_base),
        })
        .collect();
    subtitles.sort();
    subtitles
}

/// Extract the language/track suffix from a subtitle filename.
///
/// Scans `.`-separated base-name components from the end; a component
/// qualifies if it is at most three characters or a known modifier token.
/// The leading component (the title itself) is never consumed.
///
/// `"Movie.en.srt"` → `".en"`, `"Movie.forced.en.srt"` → `".forced.en"`,
/// `"Movie.srt"` → `""`.
pub fn subtitle_suffix(subtitle_path: &Path) -> String {
    let base = file_stem(subtitle_path);
    let parts: Vec<&str> = base.split('.').collect();
    if parts.len() <= 1 {
        return String::new();
    }

    let mut start = parts.len();
    while start > 1 {
        let part = parts[start - 1];
        let qualifies = part.chars().count() <= 3
            || SUFFIX_MODIFIERS.contains(&part.to_lowercase().as_str());
        if !qualifies {
            break;
        }
        start -= 1;
    }

    if start == parts.len() {
        String::new()
    } else {
        format!(".{}", parts[start..].join("."))
    }
}

/// Plan satellite renames for a media file moving to `new_media_path`.
///
/// Each subtitle maps to `<new base><suffix>.<ext>` in the new media
/// file's directory. A case-insensitive collision with an already-planned
/// name gets a numeric disambiguator between suffix and extension
/// (`.2`, `.3`, …).
pub fn plan_renames(new_media_path: &Path, subtitles: &[PathBuf]) -> Vec<(PathBuf, PathBuf)> {
    let new_dir = new_media_path.parent().unwrap_or_else(|| Path::new(""));
    let new_base = file_stem(new_media_path);

    let mut used: HashSet<String> = HashSet::new();
    let mut plan = Vec::with_capacity(subtitles.len());

    for subtitle in subtitles {
        let ext = subtitle
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = subtitle_suffix(subtitle);

        let mut name = format!("{}{}.{}", new_base, suffix, ext);
        if used.contains(&name.to_lowercase()) {
            let mut index = 2;
            loop {
                let candidate = format!("{}{}.{}.{}", new_base, suffix, index, ext);
                if !used.contains(&candidate.to_lowercase()) {
                    name = candidate;
                    break;
                }
                index += 1;
            }
        }
        used.insert(name.to_lowercase());

        plan.push((subtitle.clone(), new_dir.join(name)));
    }

    plan
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn matches_base(subtitle: &Path, media_base: &str) -> bool {
    let stem = file_stem(subtitle).to_lowercase();
    let base = media_base.to_lowercase();
    stem == base || stem.starts_with(&format!("{}.", base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_suffix() {
        assert_eq!(subtitle_suffix(Path::new("/m/Movie.en.srt")), ".en");
        assert_eq!(
            subtitle_suffix(Path::new("/m/Movie.forced.en.srt")),
            ".forced.en"
        );
        assert_eq!(subtitle_suffix(Path::new("/m/Movie.sdh.srt")), ".sdh");
        assert_eq!(subtitle_suffix(Path::new("/m/Movie.srt")), "");
        // A long non-modifier component stops the scan
        assert_eq!(
            subtitle_suffix(Path::new("/m/Movie.Directors.Cut.srt")),
            ".Cut"
        );
    }

    #[test]
    fn test_subtitle_suffix_never_consumes_title() {
        // Short titles must not be swallowed as language codes
        assert_eq!(subtitle_suffix(Path::new("/m/Up.srt")), "");
        assert_eq!(subtitle_suffix(Path::new("/m/Up.en.srt")), ".en");
    }

    #[test]
    fn test_plan_renames_preserves_suffixes() {
        let plan = plan_renames(
            Path::new("/m/Show Renamed.mkv"),
            &[
                PathBuf::from("/m/Show.en.srt"),
                PathBuf::from("/m/Show.forced.en.srt"),
            ],
        );

        assert_eq!(
            plan,
            vec![
                (
                    PathBuf::from("/m/Show.en.srt"),
                    PathBuf::from("/m/Show Renamed.en.srt")
                ),
                (
                    PathBuf::from("/m/Show.forced.en.srt"),
                    PathBuf::from("/m/Show Renamed.forced.en.srt")
                ),
            ]
        );
    }

    #[test]
    fn test_plan_renames_distinct_extensions_do_not_collide() {
        let plan = plan_renames(
            Path::new("/m/Show Renamed.mkv"),
            &[
                PathBuf::from("/m/Show.en.srt"),
                PathBuf::from("/m/Show.en.vtt"),
            ],
        );

        assert_eq!(plan[0].1, PathBuf::from("/m/Show Renamed.en.srt"));
        assert_eq!(plan[1].1, PathBuf::from("/m/Show Renamed.en.vtt"));
    }

    #[test]
    fn test_plan_renames_numbers_collisions() {
        // Two subtitles from different folders mapping to the same target name
        let plan = plan_renames(
            Path::new("/m/Show Renamed.mkv"),
            &[
                PathBuf::from("/m/a/Show.en.srt"),
                PathBuf::from("/m/b/Show.en.srt"),
                PathBuf::from("/m/c/Show.en.srt"),
            ],
        );

        assert_eq!(plan[0].1, PathBuf::from("/m/Show Renamed.en.srt"));
        assert_eq!(plan[1].1, PathBuf::from("/m/Show Renamed.en.2.srt"));
        assert_eq!(plan[2].1, PathBuf::from("/m/Show Renamed.en.3.srt"));
    }

    #[test]
    fn test_plan_renames_collision_check_is_case_insensitive() {
        let plan = plan_renames(
            Path::new("/m/Show Renamed.mkv"),
            &[
                PathBuf::from("/m/a/Show.EN.srt"),
                PathBuf::from("/m/b/Show.en.srt"),
            ],
        );

        assert_eq!(plan[0].1, PathBuf::from("/m/Show Renamed.EN.srt"));
        assert_eq!(plan[1].1, PathBuf::from("/m/Show Renamed.en.2.srt"));
    }

    #[test]
    fn test_find_subtitles_same_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("Show.mkv"), b"x").unwrap();
        std::fs::write(root.join("Show.en.srt"), b"x").unwrap();
        std::fs::write(root.join("Show.srt"), b"x").unwrap();
        std::fs::write(root.join("Other.en.srt"), b"x").unwrap();
        std::fs::write(root.join("Showdown.en.srt"), b"x").unwrap();

        let found = find_subtitles(&root.join("Show.mkv"), SubtitlePolicy::SameBaseName);
        assert_eq!(found, vec![root.join("Show.en.srt"), root.join("Show.srt")]);
    }

    #[test]
    fn test_find_subtitles_all_in_folder() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("Show.mkv"), b"x").unwrap();
        std::fs::write(root.join("Show.en.srt"), b"x").unwrap();
        std::fs::write(root.join("Other.en.srt"), b"x").unwrap();

        let found = find_subtitles(&root.join("Show.mkv"), SubtitlePolicy::AllInFolder);
        assert_eq!(
            found,
            vec![root.join("Other.en.srt"), root.join("Show.en.srt")]
        );
    }

    #[test]
    fn test_find_subtitles_unreadable_directory_yields_empty() {
        let found = find_subtitles(
            Path::new("/nonexistent/dir/Show.mkv"),
            SubtitlePolicy::SameBaseName,
        );
        assert!(found.is_empty());
    }
}
