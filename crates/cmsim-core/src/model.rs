// ── Browsing model ──
//
// Traits that let one controller drive every screen, plus the selection and
// pagination value types it reasons about.

use std::fmt;

use cmsim_api::{Device, Instance, Station};

// ── Item traits ──────────────────────────────────────────────────────

/// A top-level entity listed in full and filtered client-side.
pub trait MasterItem: Send + Sync + 'static {
    fn id(&self) -> i64;
    /// The only field the filter matches against.
    fn display_key(&self) -> &str;
    fn enabled(&self) -> bool;
}

/// A resource owned by exactly one master item, fetched page by page.
pub trait DependentItem: Send + Sync + 'static {
    fn id(&self) -> i64;
    fn owner_id(&self) -> i64;
}

impl MasterItem for Instance {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_key(&self) -> &str {
        &self.http_ip
    }

    fn enabled(&self) -> bool {
        self.enable
    }
}

impl DependentItem for Device {
    fn id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> i64 {
        self.instance_id
    }
}

impl DependentItem for Station {
    fn id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> i64 {
        self.instance_id
    }
}

/// The paginated instance table pages instances themselves; each row is its
/// own owner.
impl DependentItem for Instance {
    fn id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> i64 {
        self.id
    }
}

// ── Selection ────────────────────────────────────────────────────────

/// Which master item constrains the dependent query.
///
/// `All` is its own variant rather than a sentinel id: an owner id of `0` is
/// a real owner and still goes on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OwnerScope {
    #[default]
    All,
    Owner(i64),
}

impl OwnerScope {
    pub fn owner_id(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Owner(id) => Some(id),
        }
    }
}

impl From<Option<i64>> for OwnerScope {
    fn from(id: Option<i64>) -> Self {
        id.map_or(Self::All, Self::Owner)
    }
}

impl fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Owner(id) => write!(f, "instance {id}"),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────

/// The current page position against the last known server total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_num: u32,
    pub page_size: u32,
    pub total: u64,
}

impl PageWindow {
    /// `max(1, ceil(total / page_size))`.
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether `page_num` is a page that exists for the current total.
    pub fn contains(&self, page_num: u32) -> bool {
        (1..=self.total_pages()).contains(&page_num)
    }

    /// 1-based inclusive row range shown on the current page, `None` when
    /// the page holds no rows.
    pub fn row_range(&self) -> Option<(u64, u64)> {
        let size = u64::from(self.page_size);
        let start = u64::from(self.page_num.saturating_sub(1)) * size + 1;
        if size == 0 || start > self.total {
            return None;
        }
        Some((start, (start + size - 1).min(self.total)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(page_num: u32, total: u64) -> PageWindow {
        PageWindow {
            page_num,
            page_size: 10,
            total,
        }
    }

    #[test]
    fn total_pages_never_below_one() {
        assert_eq!(window(1, 0).total_pages(), 1);
        assert_eq!(window(1, 10).total_pages(), 1);
        assert_eq!(window(1, 11).total_pages(), 2);
        assert_eq!(window(1, 25).total_pages(), 3);
    }

    #[test]
    fn contains_is_one_based() {
        let w = window(1, 25);
        assert!(!w.contains(0));
        assert!(w.contains(1));
        assert!(w.contains(3));
        assert!(!w.contains(4));
    }

    #[test]
    fn row_range_clips_last_page() {
        assert_eq!(window(1, 25).row_range(), Some((1, 10)));
        assert_eq!(window(3, 25).row_range(), Some((21, 25)));
        assert_eq!(window(1, 0).row_range(), None);
        assert_eq!(window(4, 25).row_range(), None);
    }

    #[test]
    fn owner_scope_from_option() {
        assert_eq!(OwnerScope::from(None), OwnerScope::All);
        assert_eq!(OwnerScope::from(Some(0)), OwnerScope::Owner(0));
        assert_eq!(OwnerScope::Owner(0).owner_id(), Some(0));
        assert_eq!(OwnerScope::Owner(3).to_string(), "instance 3");
    }
}
