//! Lethal-contact detection for the swimmer.
//!
//! Physics lives outside this crate; trigger contacts arrive as the tag of
//! the other body. The first contact with a dangerous tag latches the hit
//! flag, and observers (death animation, stage reset) are told exactly once.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerSettings {
    /// Tags of bodies that kill on contact
    pub tags: Vec<String>,
}

#[derive(Debug)]
pub struct DangerSensor {
    tags: HashSet<String>,
    hit_sender: watch::Sender<bool>,
}

impl DangerSensor {
    pub fn new<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags: HashSet<String> = tags.into_iter().map(Into::into).collect();
        debug!("Creating danger sensor for tags {:?}", tags);
        let (hit_sender, _) = watch::channel(false);
        Self { tags, hit_sender }
    }

    pub fn from_settings(settings: &DangerSettings) -> Self {
        Self::new(settings.tags.iter().cloned())
    }

    /// Feeds one trigger contact; returns true when this contact latched the hit
    pub fn on_trigger_enter(&self, other_tag: &str) -> bool {
        if self.is_hit() || !self.tags.contains(other_tag) {
            return false;
        }
        self.hit_sender.send_replace(true);
        info!("Danger contact with '{}'", other_tag);
        true
    }

    pub fn is_hit(&self) -> bool {
        *self.hit_sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.hit_sender.subscribe()
    }
}
