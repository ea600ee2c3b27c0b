//! Settings menu sub-state
//!
//! The menu only exists while open: the controller holds an
//! `Option<SettingsMenu>` and drops it on close. Choosing a speed or aspect
//! ratio consumes the menu, so applying a choice and closing happen together.

use crate::types::{AspectRatioMode, PlaybackRate, SettingsTab};
use serde::Serialize;

/// A committed menu choice
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuChoice {
    Speed(PlaybackRate),
    AspectRatio(AspectRatioMode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsMenu {
    active_tab: SettingsTab,
    selected_speed: PlaybackRate,
    selected_aspect_ratio: AspectRatioMode,
}

impl SettingsMenu {
    /// Tab shown on every open, whatever was active last time
    pub const DEFAULT_TAB: SettingsTab = SettingsTab::AspectRatio;

    /// Open with the currently applied speed and aspect ratio highlighted
    pub fn open(speed: PlaybackRate, aspect_ratio: AspectRatioMode) -> Self {
        Self {
            active_tab: Self::DEFAULT_TAB,
            selected_speed: speed,
            selected_aspect_ratio: aspect_ratio,
        }
    }

    pub fn active_tab(&self) -> SettingsTab {
        self.active_tab
    }

    pub fn selected_speed(&self) -> PlaybackRate {
        self.selected_speed
    }

    pub fn selected_aspect_ratio(&self) -> AspectRatioMode {
        self.selected_aspect_ratio
    }

    /// Switching tabs keeps the menu open
    pub fn select_tab(&mut self, tab: SettingsTab) {
        self.active_tab = tab;
    }

    /// Commit a choice; the menu is consumed
    pub fn choose(self, choice: MenuChoice) -> MenuChoice {
        tracing::debug!(?choice, tab = ?self.active_tab, "Settings choice committed");
        choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_uses_default_tab() {
        let mut menu = SettingsMenu::open(PlaybackRate::NORMAL, AspectRatioMode::Fill);
        assert_eq!(menu.active_tab(), SettingsTab::AspectRatio);
        assert_eq!(menu.selected_aspect_ratio(), AspectRatioMode::Fill);

        menu.select_tab(SettingsTab::Speed);
        assert_eq!(menu.active_tab(), SettingsTab::Speed);

        let reopened = SettingsMenu::open(PlaybackRate::NORMAL, AspectRatioMode::Fill);
        assert_eq!(reopened.active_tab(), SettingsTab::AspectRatio);
    }

    #[test]
    fn test_choose_returns_choice() {
        let menu = SettingsMenu::open(PlaybackRate::NORMAL, AspectRatioMode::BestFit);
        let rate = PlaybackRate::try_new(1.5).unwrap();
        assert_eq!(menu.choose(MenuChoice::Speed(rate)), MenuChoice::Speed(rate));
    }
}
