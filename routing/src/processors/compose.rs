// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::{
    Error, Node, NodeHandle, NodeId, NodeKind, Rect, Result, Routed, Size, SourceNode, StreamKey,
    StreamMetadata, Subscription, SubscriptionMode, Transforms,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    #[default]
    Yuv420p,
    Rgba,
    Bgra,
}

/// Placement of one pin's video within the composed picture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComposePart {
    pub pin: String,
    pub opacity: f64,
    pub z_index: i32,
    /// cut out of the pin's picture, relative to the reference resolution
    pub source_rect: Rect,
    /// placement in the output, relative to the reference resolution
    pub dest_rect: Rect,
}

impl ComposePart {
    /// Opaque part covering the whole picture.
    #[must_use]
    pub fn full_frame(pin: impl Into<String>, z_index: i32, reference: Size) -> Self {
        Self {
            pin: pin.into(),
            opacity: 1.0,
            z_index,
            source_rect: Rect::full(reference),
            dest_rect: Rect::full(reference),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComposeVideoSettings {
    pub id: NodeId,
    /// pin whose stream drives the output timing
    pub reference_stream: String,
    pub output_resolution: Size,
    #[serde(default = "default_reference_resolution")]
    pub reference_resolution: Size,
    #[serde(default)]
    pub output_pixel_format: PixelFormat,
    pub parts: Vec<ComposePart>,
}

fn default_reference_resolution() -> Size {
    Size::PERCENT
}

impl ComposeVideoSettings {
    /// # Errors
    ///
    /// Fails for empty or duplicate pins, a reference stream which is not a
    /// pin, opacities outside of `[0, 1]` and rects leaving the reference
    /// resolution.
    pub fn validate(&self) -> Result<()> {
        if self.output_resolution.is_empty() || self.reference_resolution.is_empty() {
            return Err(Error::invalid(&self.id, "resolutions must not be empty"));
        }
        if self.parts.is_empty() {
            return Err(Error::invalid(&self.id, "compose needs at least one part"));
        }

        let mut pins = BTreeSet::new();
        for part in &self.parts {
            if !pins.insert(part.pin.as_str()) {
                return Err(Error::invalid(
                    &self.id,
                    format!("pin '{}' used twice", part.pin),
                ));
            }
            if !(0.0..=1.0).contains(&part.opacity) {
                return Err(Error::invalid(
                    &self.id,
                    format!("opacity {} of pin '{}' outside of [0, 1]", part.opacity, part.pin),
                ));
            }
            for rect in [&part.source_rect, &part.dest_rect] {
                if !rect.fits(self.reference_resolution) {
                    return Err(Error::invalid(
                        &self.id,
                        format!(
                            "rect {rect:?} of pin '{}' exceeds reference resolution {}",
                            part.pin, self.reference_resolution
                        ),
                    ));
                }
            }
        }

        if !pins.contains(self.reference_stream.as_str()) {
            return Err(Error::invalid(
                &self.id,
                format!("reference stream '{}' is not a pin", self.reference_stream),
            ));
        }

        Ok(())
    }

    /// Parts in drawing order (lowest z-index first).
    #[must_use]
    pub fn drawing_order(&self) -> Vec<&ComposePart> {
        let mut parts: Vec<_> = self.parts.iter().collect();
        parts.sort_by_key(|part| part.z_index);
        parts
    }
}

/// Composes the videos routed to its pins into one picture.
///
/// Announces a single video stream once the reference pin receives video.
#[derive(Debug, Clone)]
pub struct ComposeOverlay {
    node: NodeHandle,
    settings: ComposeVideoSettings,
}

impl ComposeOverlay {
    #[must_use]
    pub fn settings(&self) -> &ComposeVideoSettings {
        &self.settings
    }

    /// Replace the pin subscriptions.
    ///
    /// # Errors
    ///
    /// Fails if the node has been closed or the client has been shut down.
    pub fn subscribe_to_pins(&self, subscriptions: Vec<Subscription>) -> Result<()> {
        self.node.subscribe(SubscriptionMode::Pins, subscriptions)
    }

    #[must_use]
    pub fn routed(&self) -> Routed {
        self.node.routed()
    }
}

impl Node for ComposeOverlay {
    fn node(&self) -> &NodeHandle {
        &self.node
    }
}

impl SourceNode for ComposeOverlay {}

impl Transforms<'_> {
    /// Create a compose node.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the id is taken.
    pub async fn compose_overlay(&self, settings: ComposeVideoSettings) -> Result<ComposeOverlay> {
        settings.validate()?;
        let node = self
            .client
            .register(&settings.id, NodeKind::Processor, "compose_overlay")?;

        let id = settings.id.clone();
        let reference = settings.reference_stream.clone();
        let pins: BTreeSet<String> = settings.parts.iter().map(|part| part.pin.clone()).collect();
        let node = node.derive_announcements(move |routed| {
            for pin in routed.pins.keys().filter(|pin| !pins.contains(*pin)) {
                warn!("'{id}' has no part for pin '{pin}'");
            }
            if routed.pin(&reference).iter().any(StreamMetadata::is_video) {
                vec![StreamMetadata::video(StreamKey::new(id.as_str(), 1))]
            } else {
                Vec::new()
            }
        })?;

        Ok(ComposeOverlay { node, settings })
    }
}
