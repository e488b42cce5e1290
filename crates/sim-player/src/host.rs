use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lectern_bridge_interface::{FrameId, FrameLocation, TabId};
use lectern_capture_core::FrameDom;
use lectern_coordinator::{FrameHost, FrameInfo, HostError};

use crate::frame::SimPlayerFrame;

struct SimFrameEntry {
    id: FrameId,
    url: String,
    frame: Arc<SimPlayerFrame>,
}

#[derive(Default)]
struct HostState {
    active_tab: Option<TabId>,
    tabs: HashMap<TabId, Vec<SimFrameEntry>>,
}

/// The browser side of the simulation: tabs, their frames, and the badge.
#[derive(Default)]
pub struct SimHost {
    state: Mutex<HostState>,
    badge: AtomicUsize,
}

impl SimHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_active_tab(&self, tab: TabId) {
        let mut state = self.state.lock().unwrap();
        state.tabs.entry(tab).or_default();
        state.active_tab = Some(tab);
    }

    pub fn add_frame(&self, tab: TabId, frame: FrameId, url: &str, player: Arc<SimPlayerFrame>) {
        self.state
            .lock()
            .unwrap()
            .tabs
            .entry(tab)
            .or_default()
            .push(SimFrameEntry {
                id: frame,
                url: url.to_string(),
                frame: player,
            });
    }

    pub fn remove_tab(&self, tab: TabId) {
        self.state.lock().unwrap().tabs.remove(&tab);
    }

    pub fn badge(&self) -> usize {
        self.badge.load(Ordering::SeqCst)
    }

    fn player_at(&self, location: FrameLocation) -> Result<Arc<SimPlayerFrame>, HostError> {
        let state = self.state.lock().unwrap();
        let frames = state
            .tabs
            .get(&location.tab)
            .ok_or(HostError::TabGone(location.tab))?;
        frames
            .iter()
            .find(|entry| entry.id == location.frame)
            .map(|entry| entry.frame.clone())
            .ok_or(HostError::FrameGone(location))
    }
}

#[async_trait::async_trait]
impl FrameHost for SimHost {
    async fn active_tab(&self) -> Option<TabId> {
        self.state.lock().unwrap().active_tab
    }

    async fn frames(&self, tab: TabId) -> Result<Vec<FrameInfo>, HostError> {
        let state = self.state.lock().unwrap();
        let frames = state.tabs.get(&tab).ok_or(HostError::TabGone(tab))?;
        Ok(frames
            .iter()
            .map(|entry| FrameInfo {
                frame: entry.id,
                url: entry.url.clone(),
            })
            .collect())
    }

    async fn frame_dom(&self, location: FrameLocation) -> Result<Arc<dyn FrameDom>, HostError> {
        Ok(self.player_at(location)? as Arc<dyn FrameDom>)
    }

    async fn reload_frame(&self, location: FrameLocation) -> Result<(), HostError> {
        self.player_at(location)?.reset();
        Ok(())
    }

    async fn reload_tab(&self, tab: TabId) -> Result<(), HostError> {
        let players: Vec<Arc<SimPlayerFrame>> = {
            let state = self.state.lock().unwrap();
            let frames = state.tabs.get(&tab).ok_or(HostError::TabGone(tab))?;
            frames.iter().map(|entry| entry.frame.clone()).collect()
        };
        for player in players {
            player.reset();
        }
        Ok(())
    }

    fn set_badge(&self, count: usize) {
        self.badge.store(count, Ordering::SeqCst);
    }
}
