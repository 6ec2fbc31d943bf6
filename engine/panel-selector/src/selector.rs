//! The demo panel state machine

use tokio::sync::watch;

use crate::error::PanelError;
use crate::types::PanelKey;
use crate::DEFAULT_PANEL;

/// Holds the active demo panel.
///
/// Every panel can move to every other panel (or itself) at any time; there is no terminal
/// state. Re-selecting the active panel changes nothing observable: no transition is counted
/// and subscribers are not woken.
#[derive(Debug)]
pub struct DemoPanelSelector {
    current: PanelKey,
    transitions: u64,
    notifier: watch::Sender<PanelKey>,
}

impl Default for DemoPanelSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoPanelSelector {
    /// Create a selector showing the RTLS panel
    pub fn new() -> Self {
        Self::with_initial(DEFAULT_PANEL)
    }

    pub fn with_initial(initial: PanelKey) -> Self {
        let (notifier, _) = watch::channel(initial);
        Self { current: initial, transitions: 0, notifier }
    }

    /// Make `key` the active panel. Returns whether the active panel changed.
    pub fn select(&mut self, key: PanelKey) -> bool {
        if self.current == key {
            return false;
        }

        tracing::debug!(from = %self.current, to = %key, "Switching demo panel");
        self.current = key;
        self.transitions += 1;
        self.notifier.send_replace(key);
        true
    }

    /// Validate a raw panel name and select it
    pub fn select_str(&mut self, raw: &str) -> Result<PanelKey, PanelError> {
        let key = raw.parse::<PanelKey>()?;
        self.select(key);
        Ok(key)
    }

    pub fn current(&self) -> PanelKey {
        self.current
    }

    /// Number of effective panel changes since construction
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Receive the active panel whenever it changes
    pub fn subscribe(&self) -> watch::Receiver<PanelKey> {
        self.notifier.subscribe()
    }
}
