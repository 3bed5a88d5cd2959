use anyhow::{Context, Result};
use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::{
    catalog::{Catalog, ImdbId, Show},
    error::{CatalogFetchError, LookupError},
    index::EpisodeIndex,
    naming::destination,
    video::{dotted_extension, find_episodes},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub old: PathBuf,
    pub new: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: LookupError,
}

/// Renames for every file that resolved, in input order, plus the files
/// that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub renames: Vec<Rename>,
    pub skipped: Vec<Skipped>,
}

/// Build a plan for `files` against an already fetched catalog.
///
/// Never touches the filesystem or network.
pub fn plan_renames(show: &Show, index: &EpisodeIndex, files: &[PathBuf], dest: &Path) -> Plan {
    let mut plan = Plan::default();
    let mut claimed = HashSet::new();

    for file in files {
        match plan_one(show, index, file, dest, &claimed) {
            Ok(new) => {
                claimed.insert(new.clone());
                plan.renames.push(Rename {
                    old: file.clone(),
                    new,
                });
            }
            Err(reason) => {
                warn!(file = %file.display(), error = %reason, "unable to generate new name for file");
                plan.skipped.push(Skipped {
                    path: file.clone(),
                    reason,
                });
            }
        }
    }

    plan
}

fn plan_one(
    show: &Show,
    index: &EpisodeIndex,
    file: &Path,
    dest: &Path,
    claimed: &HashSet<PathBuf>,
) -> Result<PathBuf, LookupError> {
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let episodes = find_episodes(index, &file_name)?;
    let new = destination(dest, show, &episodes, &dotted_extension(file));

    if new == file {
        return Err(LookupError::AlreadyNamed { file: file_name });
    }
    if claimed.contains(&new) {
        return Err(LookupError::DuplicateDestination {
            file: file_name,
            destination: new,
        });
    }
    Ok(new)
}

/// Plans renames against a [`Catalog`], fetching the show once per plan.
pub struct RenamePlanner<C> {
    catalog: C,
}

impl<C: Catalog> RenamePlanner<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub async fn plan(
        &self,
        files: &[PathBuf],
        dest: &Path,
        imdb: &ImdbId,
    ) -> Result<Plan, CatalogFetchError> {
        let show = self
            .catalog
            .show_by_imdb(imdb)
            .await
            .map_err(|source| CatalogFetchError::Show {
                imdb: imdb.to_string(),
                source,
            })?;

        let episodes =
            self.catalog
                .episodes(&show)
                .await
                .map_err(|source| CatalogFetchError::Episodes {
                    name: show.name.clone(),
                    id: show.id,
                    source,
                })?;

        info!(show = %show.name, id = show.id, episodes = episodes.len(), "fetched catalog");
        let index = EpisodeIndex::build(episodes);
        Ok(plan_renames(&show, &index, files, dest))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Move,
    Copy,
    Link,
}

/// Applies a plan to the filesystem when `commit` is set, logs it otherwise.
#[derive(Debug, Clone)]
pub struct Renamer {
    mode: Mode,
    commit: bool,
}

impl Renamer {
    pub fn new(mode: Mode, commit: bool) -> Self {
        Self { mode, commit }
    }

    /// Returns how many entries were written.
    pub fn apply(&self, renames: &[Rename]) -> Result<usize> {
        let mut applied = 0;
        for rename in renames {
            info!(old = %rename.old.display(), new = %rename.new.display(), "rename");
            if !self.commit {
                continue;
            }
            if rename.new.exists() {
                warn!(new = %rename.new.display(), "destination exists, not overwriting");
                continue;
            }
            self.commit_one(&rename.old, &rename.new)?;
            applied += 1;
        }
        Ok(applied)
    }

    fn commit_one(&self, old: &Path, new: &Path) -> Result<()> {
        let parent = new
            .parent()
            .with_context(|| format!("no parent directory for {new:?}"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create parent directory {parent:?}"))?;

        match self.mode {
            Mode::Copy => fs::copy(old, new).map(|_| ()),
            Mode::Link => fs::hard_link(old, new),
            Mode::Move => move_file(old, new),
        }
        .with_context(|| format!("unable to {:?} {old:?} to {new:?}", self.mode))
    }
}

fn move_file(old: &Path, new: &Path) -> io::Result<()> {
    match fs::rename(old, new) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(old, new)?;
            fs::remove_file(old)
        }
        result => result,
    }
}
