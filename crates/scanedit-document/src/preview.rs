// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background preview rendering with last-write-wins publication.
//
// Every request takes a generation ticket. Rendering runs on tokio's blocking
// pool; when it finishes the result is published only if no newer ticket has
// been issued in the meantime. Older results are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use scanedit_core::AdjustmentParams;
use scanedit_core::error::{Result, ScanEditError};
use tracing::{debug, instrument, warn};

use crate::pipeline::render;
use crate::raster::RasterImage;

/// Generation number handed out with each preview request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreviewTicket(u64);

impl PreviewTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// A rendered preview and the request it answers.
#[derive(Debug, Clone)]
pub struct PublishedPreview {
    pub ticket: PreviewTicket,
    pub params: AdjustmentParams,
    /// Baseline the preview was rendered from.
    pub source: Arc<RasterImage>,
    pub image: Arc<RasterImage>,
}

#[derive(Debug, Default)]
struct Shared {
    generation: AtomicU64,
    latest: Mutex<Option<PublishedPreview>>,
}

/// Cheap to clone; clones share generations and the published slot.
#[derive(Debug, Clone, Default)]
pub struct PreviewScheduler {
    shared: Arc<Shared>,
}

impl PreviewScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding every earlier one.
    pub fn ticket(&self) -> PreviewTicket {
        PreviewTicket(self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the newest request.
    pub fn is_current(&self, ticket: PreviewTicket) -> bool {
        self.shared.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Render `params` against `original` off the async runtime.
    ///
    /// Resolves to `Some` with the published preview, or `None` when a newer
    /// request overtook this one while it was rendering.
    #[instrument(skip(self, original), fields(width = original.width(), height = original.height()))]
    pub async fn render(
        &self,
        original: Arc<RasterImage>,
        params: AdjustmentParams,
    ) -> Result<Option<PublishedPreview>> {
        let ticket = self.ticket();
        let source = Arc::clone(&original);
        let image = tokio::task::spawn_blocking(move || render(&original, &params))
            .await
            .map_err(|err| ScanEditError::Io(std::io::Error::other(err)))?;
        Ok(self.publish(ticket, params, source, Arc::new(image)))
    }

    /// Publish a finished render if its ticket is still current.
    pub fn publish(
        &self,
        ticket: PreviewTicket,
        params: AdjustmentParams,
        source: Arc<RasterImage>,
        image: Arc<RasterImage>,
    ) -> Option<PublishedPreview> {
        let mut latest = self.shared.latest.lock().unwrap_or_else(PoisonError::into_inner);
        // Checked under the lock so a stale render cannot overwrite a newer
        // one that published first.
        if !self.is_current(ticket) {
            warn!(generation = ticket.0, "dropping stale preview");
            return None;
        }
        debug!(generation = ticket.0, "preview published");
        let preview = PublishedPreview {
            ticket,
            params,
            source,
            image,
        };
        *latest = Some(preview.clone());
        Some(preview)
    }

    /// Most recently published preview.
    pub fn latest(&self) -> Option<PublishedPreview> {
        self.shared
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> Arc<RasterImage> {
        Arc::new(RasterImage::from_fn(32, 24, |x, y| [(x * 7) as u8, (y * 9) as u8, 90, 255]).unwrap())
    }

    #[tokio::test]
    async fn render_publishes_latest_request() {
        let scheduler = PreviewScheduler::new();
        let params = AdjustmentParams::NEUTRAL.with_brightness(80).unwrap();
        let original = photo();
        let published = scheduler.render(Arc::clone(&original), params).await.unwrap().unwrap();
        assert_eq!(published.params, params);
        assert!(Arc::ptr_eq(&published.source, &original));
        assert_eq!(*published.image, render(&photo(), &params));
        assert_eq!(scheduler.latest().unwrap().ticket, published.ticket);
    }

    #[tokio::test]
    async fn stale_result_is_dropped() {
        let scheduler = PreviewScheduler::new();
        let old = scheduler.ticket();
        let new = scheduler.ticket();
        assert!(!scheduler.is_current(old));

        let img = photo();
        assert!(scheduler.publish(new, AdjustmentParams::NEUTRAL, Arc::clone(&img), Arc::clone(&img)).is_some());
        assert!(scheduler.publish(old, AdjustmentParams::NEUTRAL, Arc::clone(&img), img).is_none());
        assert_eq!(scheduler.latest().unwrap().ticket, new);
    }

    #[tokio::test]
    async fn concurrent_requests_settle_on_the_newest() {
        let scheduler = PreviewScheduler::new();
        let mut handles = Vec::new();
        for level in [10u8, 30, 60, 90] {
            let s = scheduler.clone();
            let params = AdjustmentParams::NEUTRAL.with_brightness(level).unwrap();
            handles.push(tokio::spawn(async move { s.render(photo(), params).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        // The final ticket holder always publishes, and nothing older can
        // replace it afterwards.
        let latest = scheduler.latest().unwrap();
        assert_eq!(latest.ticket.generation(), 4);
        assert!(scheduler.is_current(latest.ticket));
    }
}
