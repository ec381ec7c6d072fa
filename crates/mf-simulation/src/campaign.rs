use mf_core::level::LevelDef;
use mf_core::Campaign;

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::scene::{Scene, SceneOptions};

/// Outcome of [`LevelManager::next_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Load the chapter at this index.
    Load(usize),
    /// The last chapter was just finished.
    Completed,
    /// The campaign had already been finished; nothing to do.
    AlreadyCompleted,
}

/// Tracks the current chapter of a campaign.
#[derive(Debug, Clone)]
pub struct LevelManager {
    chapters: Vec<LevelDef>,
    current: usize,
    completed: bool,
}

impl LevelManager {
    /// A manager over the campaign's chapters, positioned at chapter 0.
    pub fn new(campaign: &Campaign) -> Self {
        Self::from_chapters(campaign.chapters.clone())
    }

    /// A manager over an explicit chapter list.
    pub fn from_chapters(chapters: Vec<LevelDef>) -> Self {
        Self {
            chapters,
            current: 0,
            completed: false,
        }
    }

    /// Number of chapters.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Whether the campaign has no chapters.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Index of the current chapter.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current chapter definition.
    pub fn current(&self) -> Option<&LevelDef> {
        self.chapters.get(self.current)
    }

    /// Whether the last chapter has been finished.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Restart from the first chapter.
    pub fn start_new_game(&mut self) -> SimResult<usize> {
        self.completed = false;
        self.load_specific_level(0)
    }

    /// Jump to a chapter. Out-of-range indices leave the manager untouched.
    pub fn load_specific_level(&mut self, index: usize) -> SimResult<usize> {
        if index >= self.chapters.len() {
            return Err(SimError::LevelOutOfRange {
                index,
                count: self.chapters.len(),
            });
        }
        self.current = index;
        self.completed = false;
        tracing::info!(chapter = index, "chapter selected");
        Ok(index)
    }

    /// Move past the current chapter.
    pub fn next_level(&mut self) -> Advance {
        if self.completed {
            return Advance::AlreadyCompleted;
        }
        let next = self.current + 1;
        if next < self.chapters.len() {
            self.current = next;
            tracing::info!(chapter = next, "chapter advanced");
            Advance::Load(next)
        } else {
            self.completed = true;
            tracing::info!("campaign completed");
            Advance::Completed
        }
    }

    /// Build a live scene for the current chapter.
    pub fn build_scene(
        &self,
        config: &SimConfig,
        options: SceneOptions,
        clock: &SimClock,
    ) -> SimResult<Scene> {
        let level = self.current().ok_or(SimError::LevelOutOfRange {
            index: self.current,
            count: self.chapters.len(),
        })?;
        Ok(Scene::new(level, self.current, config, options, clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> LevelManager {
        LevelManager::new(&Campaign::bundled().unwrap())
    }

    #[test]
    fn next_level_walks_to_completion_once() {
        let mut levels = manager();
        assert_eq!(levels.start_new_game().unwrap(), 0);
        for expected in 1..5 {
            assert_eq!(levels.next_level(), Advance::Load(expected));
        }
        assert_eq!(levels.next_level(), Advance::Completed);
        assert_eq!(levels.next_level(), Advance::AlreadyCompleted);
        assert_eq!(levels.next_level(), Advance::AlreadyCompleted);
        assert!(levels.is_completed());
    }

    #[test]
    fn out_of_range_selection_is_a_no_op() {
        let mut levels = manager();
        levels.load_specific_level(2).unwrap();
        let err = levels.load_specific_level(5).unwrap_err();
        assert!(matches!(err, SimError::LevelOutOfRange { index: 5, count: 5 }));
        assert_eq!(levels.current_index(), 2);
    }

    #[test]
    fn new_game_resets_completion() {
        let mut levels = manager();
        levels.load_specific_level(4).unwrap();
        assert_eq!(levels.next_level(), Advance::Completed);
        levels.start_new_game().unwrap();
        assert!(!levels.is_completed());
        assert_eq!(levels.current_index(), 0);
    }

    #[test]
    fn empty_campaign_cannot_start() {
        let mut levels = LevelManager::from_chapters(Vec::new());
        assert!(levels.is_empty());
        assert!(levels.start_new_game().is_err());
        let scene = levels.build_scene(
            &SimConfig::default(),
            SceneOptions::default(),
            &SimClock::default(),
        );
        assert!(scene.is_err());
    }

    #[test]
    fn build_scene_uses_current_chapter() {
        let mut levels = manager();
        levels.load_specific_level(3).unwrap();
        let scene = levels
            .build_scene(&SimConfig::default(), SceneOptions::default(), &SimClock::default())
            .unwrap();
        assert_eq!(scene.chapter(), 3);
        assert_eq!(scene.location_name(), "The Understrata");
    }
}
