use crate::models::Video;
use log::warn;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Videos saved during this server session, newest first. Nothing is persisted.
#[derive(Clone)]
pub struct VideoCollection {
    videos: Arc<Mutex<VecDeque<Video>>>,
}

impl Default for VideoCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoCollection {
    pub fn new() -> Self {
        VideoCollection {
            videos: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Prepends `video`. Returns false when the store is unusable and nothing was saved.
    pub fn add(&self, video: Video) -> bool {
        match self.videos.lock() {
            Ok(mut videos) => {
                videos.push_front(video);
                true
            }
            Err(e) => {
                warn!("Dropping video {}, collection lock poisoned: {e}", video.id);
                false
            }
        }
    }

    pub fn list(&self) -> Vec<Video> {
        if let Ok(videos) = self.videos.lock() {
            videos.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        if let Ok(videos) = self.videos.lock() {
            videos.len()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let videos = self.videos.clone();
        let _ = std::thread::spawn(move || {
            let _guard = videos.lock();
            panic!("poisoning collection lock");
        })
        .join();
    }
}
