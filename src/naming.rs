use std::path::{Path, PathBuf};

use crate::{catalog::Show, video::EpisodeMatch};

/// Normalize free text for use in a file name: `It's Always: Sunny & Rain`
/// becomes `its_always_sunny_and_rain`.
pub fn sanitize(val: &str) -> String {
    let val = val
        .replace(' ', "_")
        .replace(['\'', '"', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}', ':'], "")
        .replace('&', "and")
        .to_lowercase();
    // Only characters that would split the path or end it early.
    val.replace(['/', '\0'], "")
}

pub fn season_dir(season: u32) -> String {
    format!("season_{:02}", season)
}

/// `s01e01`, or `s01e01-e02` for a two-episode file.
pub fn episode_tag(episodes: &EpisodeMatch<'_>) -> String {
    let numbers: Vec<String> = episodes
        .episodes()
        .map(|episode| format!("e{:02}", episode.number))
        .collect();
    format!("s{:02}{}", episodes.primary.season, numbers.join("-"))
}

/// Canonical destination for a file holding `episodes` of `show`.
///
/// `extension` is appended as given and should include its leading dot.
pub fn destination(
    dest: &Path,
    show: &Show,
    episodes: &EpisodeMatch<'_>,
    extension: &str,
) -> PathBuf {
    let show_name = sanitize(&show.name);
    let file_name = format!(
        "{}-{}-{}{}",
        show_name,
        episode_tag(episodes),
        sanitize(&episodes.primary.name),
        extension
    );

    dest.join(&show_name)
        .join(season_dir(episodes.primary.season))
        .join(file_name)
}
