//! Scripted in-memory rendering session for integration tests
//!
//! A [`FakeWorld`] maps URLs to sequences of HTML snapshots. Clicking any
//! element that exists in the current snapshot moves to the next snapshot.
//! Sessions can be told to drop their connection on a given URL.

#![allow(dead_code)]

use async_trait::async_trait;
use scraper::{Html, Selector};
use statscrape::browser::{ElementPath, RenderedPage, SessionFactory};
use statscrape::error::{BrowserError, Error, NavigationError, Result};
use statscrape::extraction::{ColumnSpec, TableLayout};
use statscrape::target::{ScrapeTarget, TargetTiming};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted site
#[derive(Debug, Clone, Default)]
pub struct Site {
    /// Snapshots in click order
    pub pages: Vec<String>,
    /// Replaces the current snapshot on the first scroll
    pub scroll_growth: Option<String>,
    /// Controls are gone from the live page by the time they are clicked
    pub vanishing_controls: bool,
}

impl Site {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            scroll_growth: None,
            vanishing_controls: false,
        }
    }

    pub fn with_scroll_growth(mut self, html: String) -> Self {
        self.scroll_growth = Some(html);
        self
    }

    pub fn with_vanishing_controls(mut self) -> Self {
        self.vanishing_controls = true;
        self
    }
}

/// Shared state behind every fake session
#[derive(Clone, Default)]
pub struct FakeWorld {
    sites: Arc<Mutex<HashMap<String, Site>>>,
    drop_on: Arc<Mutex<HashSet<String>>>,
    visited: Arc<Mutex<Vec<String>>>,
    launches: Arc<AtomicUsize>,
    launch_limit: Arc<Mutex<Option<usize>>>,
    clicks: Arc<AtomicUsize>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn site(self, url: &str, site: Site) -> Self {
        self.sites.lock().unwrap().insert(url.to_string(), site);
        self
    }

    /// The first navigation to `url` kills the session
    pub fn drop_connection_on(self, url: &str) -> Self {
        self.drop_on.lock().unwrap().insert(url.to_string());
        self
    }

    /// Launches after the first `n` fail
    pub fn launch_limit(self, n: usize) -> Self {
        *self.launch_limit.lock().unwrap() = Some(n);
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }
}

/// [`RenderedPage`] over a [`FakeWorld`]
pub struct FakePage {
    world: FakeWorld,
    site: Site,
    index: usize,
    scrolled: bool,
    alive: bool,
}

impl FakePage {
    pub fn new(world: FakeWorld) -> Self {
        Self {
            world,
            site: Site::new(vec!["<html><body></body></html>".to_string()]),
            index: 0,
            scrolled: false,
            alive: true,
        }
    }

    fn check_alive(&self) -> Result<()> {
        if self.alive {
            Ok(())
        } else {
            Err(BrowserError::ConnectionLost.into())
        }
    }
}

#[async_trait]
impl RenderedPage for FakePage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.check_alive()?;
        self.world.visited.lock().unwrap().push(url.to_string());

        if self.world.drop_on.lock().unwrap().remove(url) {
            self.alive = false;
            return Err(Error::cdp(
                "Protocol error (Page.navigate): Target closed.",
            ));
        }

        let site = self.world.sites.lock().unwrap().get(url).cloned();
        match site {
            Some(site) => {
                self.site = site;
                self.index = 0;
                self.scrolled = false;
                Ok(())
            }
            None => Err(NavigationError::LoadFailed(format!("404 {url}")).into()),
        }
    }

    async fn wait(&mut self, _duration: Duration) {}

    async fn content(&mut self) -> Result<String> {
        self.check_alive()?;
        Ok(self.site.pages[self.index].clone())
    }

    async fn click(&mut self, path: &ElementPath) -> Result<bool> {
        self.check_alive()?;
        if self.site.vanishing_controls {
            return Ok(false);
        }
        let present = {
            let doc = Html::parse_document(&self.site.pages[self.index]);
            Selector::parse(path.as_str())
                .map(|sel| doc.select(&sel).next().is_some())
                .unwrap_or(false)
        };
        if !present {
            return Ok(false);
        }
        self.world.clicks.fetch_add(1, Ordering::SeqCst);
        if self.index + 1 < self.site.pages.len() {
            self.index += 1;
        }
        Ok(true)
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.check_alive()?;
        if !self.scrolled {
            if let Some(grown) = self.site.scroll_growth.clone() {
                self.site.pages[self.index] = grown;
            }
            self.scrolled = true;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.alive = false;
        Ok(())
    }
}

/// Launches [`FakePage`]s
#[derive(Clone)]
pub struct FakeFactory {
    pub world: FakeWorld,
    pub fail_launch: bool,
}

impl FakeFactory {
    pub fn new(world: FakeWorld) -> Self {
        Self {
            world,
            fail_launch: false,
        }
    }

    pub async fn launch_page(&self) -> FakePage {
        self.launch().await.unwrap()
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    type Page = FakePage;

    async fn launch(&self) -> Result<FakePage> {
        let limit = *self.world.launch_limit.lock().unwrap();
        if self.fail_launch || limit.is_some_and(|n| self.world.launches() >= n) {
            return Err(BrowserError::LaunchFailed("no chrome in test".to_string()).into());
        }
        self.world.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage::new(self.world.clone()))
    }
}

/// Layout used across the integration tests: rank, player, team, points
pub fn test_layout() -> TableLayout {
    TableLayout::new("test", "#stats", "player")
        .team_field("team")
        .column(ColumnSpec::rank("rank", "Rank"))
        .column(ColumnSpec::at("player", "Player", 0))
        .column(ColumnSpec::at("team", "Team", 1))
        .column(ColumnSpec::at("points", "PTS", 2))
}

/// Timing with no waits
pub fn instant_timing(page_cap: usize) -> TargetTiming {
    TargetTiming {
        settle_wait: Duration::ZERO,
        advance_wait: Duration::ZERO,
        navigation_timeout: Duration::from_secs(1),
        page_cap,
    }
}

pub fn target(label: &str, url: &str, output: &Path, page_cap: usize) -> ScrapeTarget {
    ScrapeTarget::new(label, url, Arc::new(test_layout()), output).with_timing(instant_timing(page_cap))
}

/// `(player, team, points)` rows
pub fn rows(players: &[(&str, &str, u32)]) -> String {
    players
        .iter()
        .map(|(name, team, pts)| format!("<tr><td>{name}</td><td>{team}</td><td>{pts}</td></tr>"))
        .collect()
}

/// `n` distinct players starting at `first`. Names avoid header words.
pub fn numbered_players(first: usize, n: usize) -> Vec<(String, String, u32)> {
    (first..first + n)
        .map(|i| (format!("Guard {i}"), format!("Club {}", i % 4), i as u32))
        .collect()
}

pub fn rows_owned(players: &[(String, String, u32)]) -> String {
    let borrowed: Vec<(&str, &str, u32)> = players
        .iter()
        .map(|(n, t, p)| (n.as_str(), t.as_str(), *p))
        .collect();
    rows(&borrowed)
}

/// Stats page with a header row, the body rows, and `pager` below the table
pub fn stats_page(body_rows: &str, pager: &str) -> String {
    format!(
        r#"<html><body><main>
        <table id="stats">
          <thead><tr><th>Player</th><th>Team</th><th>PTS</th></tr></thead>
          <tbody>{body_rows}</tbody>
        </table>
        {pager}
        </main></body></html>"#
    )
}

/// Numbered pager with `current` marked active
pub fn numbered_pager(current: u32, last: u32) -> String {
    let items: String = (1..=last)
        .map(|n| {
            if n == current {
                format!(r##"<li class="active"><a href="#">{n}</a></li>"##)
            } else {
                format!(r##"<li><a href="#">{n}</a></li>"##)
            }
        })
        .collect();
    format!(r#"<ul class="pagination">{items}</ul>"#)
}

/// Pager with a next control, disabled on the last page
pub fn next_pager(enabled: bool) -> String {
    if enabled {
        r#"<div class="pager"><button>Next</button></div>"#.to_string()
    } else {
        r#"<div class="pager"><button disabled>Next</button></div>"#.to_string()
    }
}
