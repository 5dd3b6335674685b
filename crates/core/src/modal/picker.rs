//! Domain picker overlay.

use crate::models::Domain;

/// Grid tile for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTile {
    /// Domain slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Whether this is the active domain.
    pub active: bool,
}

/// Hidden/shown flag plus the highlighted tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainPicker {
    shown: bool,
    cursor: usize,
}

impl DomainPicker {
    /// Whether the picker is visible.
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Show the picker with the cursor on `active`, if present.
    pub fn open(&mut self, domains: &[Domain], active: &str) {
        self.shown = true;
        self.cursor = domains
            .iter()
            .position(|domain| domain.slug == active)
            .unwrap_or(0);
    }

    /// Hide without changing the selection.
    pub fn close(&mut self) {
        self.shown = false;
    }

    /// Highlighted tile index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the highlight, clamped to `len` tiles.
    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    /// Tiles for every known domain.
    pub fn tiles(domains: &[Domain], active: &str) -> Vec<DomainTile> {
        domains
            .iter()
            .map(|domain| DomainTile {
                slug: domain.slug.clone(),
                name: domain.name.clone(),
                active: domain.slug == active,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains() -> Vec<Domain> {
        ["ai-ml", "fintech", "ev"]
            .into_iter()
            .map(|slug| Domain {
                slug: slug.to_string(),
                name: slug.to_uppercase(),
                competitors: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn opens_on_active_domain_and_clamps() {
        let domains = domains();
        let mut picker = DomainPicker::default();
        picker.open(&domains, "fintech");
        assert!(picker.is_shown());
        assert_eq!(picker.cursor(), 1);

        picker.move_cursor(10, domains.len());
        assert_eq!(picker.cursor(), 2);
        picker.move_cursor(-10, domains.len());
        assert_eq!(picker.cursor(), 0);

        picker.close();
        assert!(!picker.is_shown());
    }

    #[test]
    fn tiles_mark_active() {
        let tiles = DomainPicker::tiles(&domains(), "ev");
        assert_eq!(tiles.iter().filter(|tile| tile.active).count(), 1);
        assert_eq!(tiles[2].slug, "ev");
    }
}
