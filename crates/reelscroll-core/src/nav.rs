// crates/reelscroll-core/src/nav.rs
//
// Bottom navigation tabs. Only Home has a destination; the others toggle the
// active highlight and hand back a placeholder notice.

pub const NOT_IMPLEMENTED_NOTICE: &str = "This feature is not implemented in this version";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavTab {
    Home,
    Discover,
    Inbox,
    Profile,
}

impl NavTab {
    pub const ALL: [NavTab; 4] = [NavTab::Home, NavTab::Discover, NavTab::Inbox, NavTab::Profile];

    pub fn label(self) -> &'static str {
        match self {
            NavTab::Home     => "Home",
            NavTab::Discover => "Discover",
            NavTab::Inbox    => "Inbox",
            NavTab::Profile  => "Profile",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            NavTab::Home     => "🏠",
            NavTab::Discover => "🔍",
            NavTab::Inbox    => "✉",
            NavTab::Profile  => "👤",
        }
    }

    /// The feed itself is the only destination that exists.
    pub fn is_implemented(self) -> bool {
        matches!(self, NavTab::Home)
    }
}

#[derive(Clone, Debug)]
pub struct NavBar {
    tabs:   Vec<NavTab>,
    active: usize,
}

impl Default for NavBar {
    fn default() -> Self {
        Self { tabs: NavTab::ALL.to_vec(), active: 0 }
    }
}

impl NavBar {
    pub fn tabs(&self) -> &[NavTab] { &self.tabs }

    pub fn active(&self) -> usize { self.active }

    pub fn active_tab(&self) -> NavTab { self.tabs[self.active] }

    pub fn is_active(&self, index: usize) -> bool { self.active == index }

    /// Move the active state to `index`. Returns the placeholder notice when
    /// that tab has nowhere to go. Out-of-range indices change nothing.
    pub fn select(&mut self, index: usize) -> Option<&'static str> {
        let tab = *self.tabs.get(index)?;
        self.active = index;
        (!tab.is_implemented()).then_some(NOT_IMPLEMENTED_NOTICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_is_active_by_default() {
        let nav = NavBar::default();
        assert_eq!(nav.active_tab(), NavTab::Home);
        assert_eq!(nav.tabs().iter().enumerate().filter(|(i, _)| nav.is_active(*i)).count(), 1);
    }

    #[test]
    fn selecting_moves_the_single_active_tab() {
        let mut nav = NavBar::default();
        nav.select(2);
        assert_eq!(nav.active_tab(), NavTab::Inbox);
        assert!(!nav.is_active(0));
        assert_eq!((0..nav.tabs().len()).filter(|i| nav.is_active(*i)).count(), 1);
    }

    #[test]
    fn unimplemented_tabs_return_a_notice() {
        let mut nav = NavBar::default();
        assert_eq!(nav.select(1), Some(NOT_IMPLEMENTED_NOTICE));
        assert_eq!(nav.select(0), None);
    }

    #[test]
    fn out_of_range_select_is_ignored() {
        let mut nav = NavBar::default();
        nav.select(3);
        assert_eq!(nav.select(42), None);
        assert_eq!(nav.active_tab(), NavTab::Profile);
    }
}
