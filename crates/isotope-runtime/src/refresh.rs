#![forbid(unsafe_code)]

//! Refresh scheduling after applied changes.

/// Something to re-run once state has changed, typically a view.
pub trait Refresh {
    fn refresh(&self);
}

impl<F: Fn()> Refresh for F {
    fn refresh(&self) {
        self();
    }
}

/// When an applied change triggers its refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RefreshMode {
    /// Mark a refresh pending; the host runs it with `StateCell::flush`.
    #[default]
    Deferred,
    /// Refresh before the mutating call returns.
    Immediate,
}

impl RefreshMode {
    /// Parse `deferred` or `immediate`, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deferred" => Some(Self::Deferred),
            "immediate" => Some(Self::Immediate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn closures_refresh() {
        let hits = Cell::new(0);
        let refresh = || hits.set(hits.get() + 1);
        refresh.refresh();
        refresh.refresh();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn parse_modes() {
        assert_eq!(RefreshMode::parse("Immediate"), Some(RefreshMode::Immediate));
        assert_eq!(RefreshMode::parse(" deferred "), Some(RefreshMode::Deferred));
        assert_eq!(RefreshMode::parse("later"), None);
    }
}
