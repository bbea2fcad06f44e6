//! Notification surface: loading indicator and transient banners.
//!
//! [`BannerBoard`] is the in-memory model every surface is built on. The
//! loading indicator is a counter, so nested show/hide pairs from
//! overlapping operations compose: the indicator stays up until the last
//! operation finishes. Banners stack without deduplication and expire
//! after a fixed delay.
//!
//! [`TerminalSurface`] prints each banner once to stderr and keeps a
//! [`BannerBoard`] for anything that inspects live state.

use std::io::Write;
use std::time::{Duration, Instant};

use colored::Colorize;

/// Default lifetime of a banner.
pub const DEFAULT_BANNER_TTL: Duration = Duration::from_millis(3000);

/// Side-effect-only sink the page controllers report through.
pub trait NotificationSurface {
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn is_loading(&self) -> bool;
    fn show_error(&mut self, message: &str);
    fn show_success(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub raised_at: Instant,
}

// ---------------------------------------------------------------------------
// BannerBoard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BannerBoard {
    loading: usize,
    banners: Vec<Banner>,
    ttl: Duration,
}

impl Default for BannerBoard {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_TTL)
    }
}

impl BannerBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            loading: 0,
            banners: Vec::new(),
            ttl,
        }
    }

    /// Outstanding loading requests.
    pub fn loading_depth(&self) -> usize {
        self.loading
    }

    /// Banners still visible at `now`.
    pub fn active_at(&self, now: Instant) -> Vec<&Banner> {
        self.banners
            .iter()
            .filter(|b| now.duration_since(b.raised_at) < self.ttl)
            .collect()
    }

    /// Banners still visible right now.
    pub fn active(&self) -> Vec<&Banner> {
        self.active_at(Instant::now())
    }

    /// Drop banners that have expired by `now`.
    pub fn dismiss_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.banners
            .retain(|b| now.duration_since(b.raised_at) < ttl);
    }

    /// Every banner not yet dismissed. Expired banners are dismissed when
    /// the next one is raised.
    pub fn history(&self) -> &[Banner] {
        &self.banners
    }

    pub fn errors(&self) -> Vec<&str> {
        self.messages_of(BannerKind::Error)
    }

    pub fn successes(&self) -> Vec<&str> {
        self.messages_of(BannerKind::Success)
    }

    fn messages_of(&self, kind: BannerKind) -> Vec<&str> {
        self.banners
            .iter()
            .filter(|b| b.kind == kind)
            .map(|b| b.message.as_str())
            .collect()
    }

    fn push(&mut self, kind: BannerKind, message: &str) {
        let now = Instant::now();
        self.dismiss_expired(now);
        self.banners.push(Banner {
            kind,
            message: message.to_string(),
            raised_at: now,
        });
    }
}

impl NotificationSurface for BannerBoard {
    fn show_loading(&mut self) {
        self.loading += 1;
    }

    fn hide_loading(&mut self) {
        self.loading = self.loading.saturating_sub(1);
    }

    fn is_loading(&self) -> bool {
        self.loading > 0
    }

    fn show_error(&mut self, message: &str) {
        self.push(BannerKind::Error, message);
    }

    fn show_success(&mut self, message: &str) {
        self.push(BannerKind::Success, message);
    }
}

// ---------------------------------------------------------------------------
// TerminalSurface
// ---------------------------------------------------------------------------

/// Prints banners to stderr as they are raised.
pub struct TerminalSurface {
    board: BannerBoard,
    color: bool,
}

impl TerminalSurface {
    pub fn new(ttl: Duration, color: bool) -> Self {
        Self {
            board: BannerBoard::new(ttl),
            color,
        }
    }

    pub fn board(&self) -> &BannerBoard {
        &self.board
    }

    fn emit(&self, line: String) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }
}

impl NotificationSurface for TerminalSurface {
    fn show_loading(&mut self) {
        let was_idle = !self.board.is_loading();
        self.board.show_loading();
        if was_idle {
            let line = if self.color {
                "… loading".dimmed().to_string()
            } else {
                "... loading".to_string()
            };
            self.emit(line);
        }
    }

    fn hide_loading(&mut self) {
        self.board.hide_loading();
    }

    fn is_loading(&self) -> bool {
        self.board.is_loading()
    }

    fn show_error(&mut self, message: &str) {
        self.board.show_error(message);
        let line = if self.color {
            format!("{} {}", "✗".red().bold(), message.red())
        } else {
            format!("error: {message}")
        };
        self.emit(line);
    }

    fn show_success(&mut self, message: &str) {
        self.board.show_success(message);
        let line = if self.color {
            format!("{} {}", "✓".green().bold(), message)
        } else {
            format!("ok: {message}")
        };
        self.emit(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_loading_stays_visible_until_outermost_hides() {
        let mut board = BannerBoard::default();
        board.show_loading(); // outer
        board.show_loading(); // inner
        board.hide_loading(); // inner finishes first
        assert!(board.is_loading());
        board.hide_loading();
        assert!(!board.is_loading());
    }

    #[test]
    fn unbalanced_hide_saturates_at_zero() {
        let mut board = BannerBoard::default();
        board.hide_loading();
        assert_eq!(board.loading_depth(), 0);
        board.show_loading();
        assert!(board.is_loading());
    }

    #[test]
    fn banners_stack_without_dedup() {
        let mut board = BannerBoard::default();
        board.show_error("same");
        board.show_error("same");
        board.show_success("done");
        assert_eq!(board.errors(), vec!["same", "same"]);
        assert_eq!(board.successes(), vec!["done"]);
        assert_eq!(board.active().len(), 3);
    }

    #[test]
    fn banners_expire_after_ttl() {
        let mut board = BannerBoard::new(Duration::from_millis(3000));
        board.show_error("boom");
        let later = Instant::now() + Duration::from_millis(3001);
        assert!(board.active_at(later).is_empty());
        assert_eq!(board.history().len(), 1);

        board.dismiss_expired(later);
        assert!(board.history().is_empty());
    }

    #[test]
    fn raising_a_banner_drops_expired_ones() {
        let mut board = BannerBoard::new(Duration::ZERO);
        board.show_error("first");
        board.show_success("second");
        assert_eq!(board.history().len(), 1);
        assert_eq!(board.successes(), vec!["second"]);
        assert!(board.errors().is_empty());
    }

    #[test]
    fn terminal_surface_records_on_its_board() {
        let mut surface = TerminalSurface::new(DEFAULT_BANNER_TTL, false);
        surface.show_loading();
        surface.show_success("saved");
        surface.hide_loading();
        assert!(!surface.is_loading());
        assert_eq!(surface.board().successes(), vec!["saved"]);
    }
}
