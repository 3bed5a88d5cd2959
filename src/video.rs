use anyhow::{Context, Result};
use regex::Regex;
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};
use tracing::debug;
use walkdir::WalkDir;

use crate::{catalog::Episode, error::LookupError, index::EpisodeIndex};

pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "flv", "wmv", "webm", "m4v", "srt",
];

// s01e01, s01e01e02, s01e01-e02
static EPISODE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)s(\d+)e(\d+)(?:-?e(\d+))?").expect("episode tag pattern is valid")
});

/// Season and episode numbers found in a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeTag {
    pub season: u32,
    pub episode: u32,
    /// Second episode of a combined release, same season as `episode`.
    pub second: Option<u32>,
}

impl EpisodeTag {
    pub fn parse(file_name: &str) -> Result<Self, LookupError> {
        let bad = || LookupError::BadMetadata {
            file: file_name.to_string(),
        };
        let captures = EPISODE_TAG.captures(file_name).ok_or_else(bad)?;
        let number = |i: usize| -> Result<Option<u32>, LookupError> {
            captures
                .get(i)
                .map(|m| m.as_str().parse::<u32>().map_err(|_| bad()))
                .transpose()
        };

        Ok(Self {
            season: number(1)?.ok_or_else(bad)?,
            episode: number(2)?.ok_or_else(bad)?,
            second: number(3)?,
        })
    }

    fn keys(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        std::iter::once(self.episode)
            .chain(self.second)
            .map(|number| (self.season, number))
    }
}

/// Episodes a single file resolved to, in tag order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeMatch<'a> {
    pub primary: &'a Episode,
    pub secondary: Option<&'a Episode>,
}

impl<'a> EpisodeMatch<'a> {
    pub fn episodes(&self) -> impl Iterator<Item = &'a Episode> {
        std::iter::once(self.primary).chain(self.secondary)
    }
}

/// Resolve the episode tag in `file_name` (a base name, not a path).
///
/// Fails with [`LookupError::BadMetadata`] when there is no tag and with
/// [`LookupError::UnknownEpisode`] when any tagged episode is missing from
/// `index`.
pub fn find_episodes<'a>(
    index: &'a EpisodeIndex,
    file_name: &str,
) -> Result<EpisodeMatch<'a>, LookupError> {
    debug!(file = file_name, "extracting season episode from file");
    let tag = EpisodeTag::parse(file_name)?;

    let mut found = Vec::with_capacity(2);
    for (season, number) in tag.keys() {
        debug!(season, number, "using parsed season episode for lookup");
        let episode = index
            .lookup(season, number)
            .ok_or_else(|| LookupError::UnknownEpisode {
                file: file_name.to_string(),
                season,
                number,
            })?;
        found.push(episode);
    }

    Ok(EpisodeMatch {
        primary: found[0],
        secondary: found.get(1).copied(),
    })
}

/// Lowercased extension of `path` if it is one of `allowed`.
pub fn parse_extension(path: &Path, allowed: &[String]) -> Option<String> {
    if path.is_dir() {
        return None;
    }

    let ext = path.extension()?.to_str()?.to_lowercase();
    allowed
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(&ext))
        .then_some(ext)
}

/// Extension of `path` with its leading dot, exactly as written.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Every media file below `base`, sorted by file name.
pub fn find_files(base: &Path, allowed: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = entry.with_context(|| format!("unable to find files under {base:?}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if parse_extension(entry.path(), allowed).is_some() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn episode(id: u32, number: u32, name: &str) -> Episode {
        Episode {
            id,
            url: format!("https://api.example.com/show/1/episode/{id}"),
            name: name.to_string(),
            season: 1,
            number,
            kind: "regular".to_string(),
        }
    }

    fn test_episodes() -> Vec<Episode> {
        vec![
            episode(1, 1, "Pilot"),
            episode(2, 2, "Events"),
            episode(3, 123, "Finale"),
        ]
    }

    fn media_extensions() -> Vec<String> {
        MEDIA_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    }

    #[test]
    fn test_parse_tag_single() {
        assert_eq!(
            EpisodeTag::parse("show-s01e05-name.mkv"),
            Ok(EpisodeTag {
                season: 1,
                episode: 5,
                second: None
            })
        );
    }

    #[test]
    fn test_parse_tag_unpadded_numbers_equal_padded() {
        assert_eq!(
            EpisodeTag::parse("show.S1E1.mkv"),
            EpisodeTag::parse("show.s01e01.mkv")
        );
    }

    #[test]
    fn test_parse_tag_multi() {
        let expected = Ok(EpisodeTag {
            season: 1,
            episode: 1,
            second: Some(2),
        });
        assert_eq!(EpisodeTag::parse("show-s01e01-e02-pilot.mkv"), expected);
        assert_eq!(EpisodeTag::parse("show-s01e01e02-pilot.mkv"), expected);
        assert_eq!(EpisodeTag::parse("SHOW-S01E01E02-PILOT.MKV"), expected);
    }

    #[test]
    fn test_parse_tag_no_episode_marker() {
        for name in [
            "show-season_1_episode_1-pilot.mkv",
            "show-s01-pilot.mkv",
            "video.mp4",
        ] {
            assert!(
                matches!(EpisodeTag::parse(name), Err(LookupError::BadMetadata { .. })),
                "{name} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_tag_overflowing_number() {
        assert!(matches!(
            EpisodeTag::parse("show-s01e99999999999-pilot.mkv"),
            Err(LookupError::BadMetadata { .. })
        ));
    }

    #[test]
    fn test_find_episodes_no_match_in_file_name() {
        let index = EpisodeIndex::build(test_episodes());
        let result = find_episodes(&index, "show-season_1_episode_1-pilot.mkv");
        assert_eq!(
            result,
            Err(LookupError::BadMetadata {
                file: "show-season_1_episode_1-pilot.mkv".to_string()
            })
        );
    }

    #[test]
    fn test_find_episodes_no_episode_available() {
        let index = EpisodeIndex::build(test_episodes());
        let result = find_episodes(&index, "show-s01e99-something.mkv");
        assert_eq!(
            result,
            Err(LookupError::UnknownEpisode {
                file: "show-s01e99-something.mkv".to_string(),
                season: 1,
                number: 99,
            })
        );
    }

    #[test]
    fn test_find_episodes_second_episode_missing() {
        let index = EpisodeIndex::build(test_episodes());
        let result = find_episodes(&index, "show-s01e01-e03-something.mkv");
        assert!(matches!(
            result,
            Err(LookupError::UnknownEpisode { number: 3, .. })
        ));
    }

    #[test]
    fn test_find_episodes_single() {
        let episodes = test_episodes();
        let index = EpisodeIndex::build(episodes.clone());

        for name in ["show-s01e01-pilot.mkv", "SHOW-S01E01-PILOT.MKV"] {
            let found = find_episodes(&index, name).unwrap();
            assert_eq!(found.primary, &episodes[0]);
            assert_eq!(found.secondary, None);
        }
    }

    #[test]
    fn test_find_episodes_multi_lowercase() {
        let episodes = test_episodes();
        let index = EpisodeIndex::build(episodes.clone());

        let found = find_episodes(&index, "show-s01e01-e02-pilot.mkv").unwrap();
        let found: Vec<_> = found.episodes().collect();
        assert_eq!(found, vec![&episodes[0], &episodes[1]]);
    }

    #[test]
    fn test_find_episodes_multi_uppercase() {
        let episodes = test_episodes();
        let index = EpisodeIndex::build(episodes.clone());

        let found = find_episodes(&index, "show-S01E01-E02-pilot.mkv").unwrap();
        assert_eq!(found.primary, &episodes[0]);
        assert_eq!(found.secondary, Some(&episodes[1]));
    }

    #[test]
    fn test_find_episodes_many_digit_episode_number() {
        let episodes = test_episodes();
        let index = EpisodeIndex::build(episodes.clone());

        let found = find_episodes(&index, "show-s01e123-finale.mkv").unwrap();
        assert_eq!(found.primary, &episodes[2]);
        assert_eq!(found.secondary, None);
    }

    #[test]
    fn test_parse_extension_with_valid_extensions() {
        let allowed = media_extensions();
        assert_eq!(
            parse_extension(Path::new("video.mp4"), &allowed).as_deref(),
            Some("mp4")
        );
        assert_eq!(
            parse_extension(Path::new("/path/to/movie.MKV"), &allowed).as_deref(),
            Some("mkv")
        );
        assert_eq!(
            parse_extension(Path::new("my.video.file.webm"), &allowed).as_deref(),
            Some("webm")
        );
    }

    #[test]
    fn test_parse_extension_with_invalid_extensions() {
        let allowed = media_extensions();
        assert_eq!(parse_extension(Path::new("image.jpg"), &allowed), None);
        assert_eq!(parse_extension(Path::new("document.txt"), &allowed), None);
        assert_eq!(parse_extension(Path::new("noextension"), &allowed), None);
    }

    #[test]
    fn test_parse_extension_custom_set() {
        let allowed = vec!["mkv".to_string()];
        assert_eq!(parse_extension(Path::new("video.mp4"), &allowed), None);
        assert_eq!(
            parse_extension(Path::new("video.mkv"), &allowed).as_deref(),
            Some("mkv")
        );
    }

    #[test]
    fn test_dotted_extension_is_verbatim() {
        assert_eq!(dotted_extension(Path::new("a/show.s01e01.MKV")), ".MKV");
        assert_eq!(dotted_extension(Path::new("show.s01e01.mp4")), ".mp4");
        assert_eq!(dotted_extension(Path::new("noextension")), "");
    }

    #[test]
    fn test_find_files() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        for name in [
            "s02/Show.S02E01.avi",
            "s01/Show.S01E02.mp4",
            "s01/Show.S01E01.mkv",
            "s01/Show.S01E01.nfo",
            "readme.txt",
        ] {
            let path = base.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::File::create(&path).unwrap();
        }
        fs::create_dir_all(base.join("empty.mkv")).unwrap();

        let files = find_files(base, &media_extensions()).unwrap();

        assert_eq!(
            files,
            vec![
                base.join("s01/Show.S01E01.mkv"),
                base.join("s01/Show.S01E02.mp4"),
                base.join("s02/Show.S02E01.avi"),
            ]
        );
    }

    #[test]
    fn test_find_files_missing_base() {
        let temp_dir = TempDir::new().unwrap();
        let result = find_files(&temp_dir.path().join("missing"), &media_extensions());
        assert!(result.is_err());
    }
}
