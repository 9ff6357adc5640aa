// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! In-process engine.
//!
//! The [`Client`] owns all nodes of a pipeline. Each node announces the
//! metadata of the streams it produces, and each downstream node runs one
//! routing task which re-evaluates its subscriptions whenever one of its
//! sources announces something new. Media itself never flows through here.

use derivative::Derivative;
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    sync::{Arc, Weak},
};
use tokio::sync::watch;
use url::Url;

pub mod debug;
mod node;

pub use node::*;

use crate::{Error, Result};

/// Base URL used for playlist and player URLs if none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/";

/// Hook called once when the client shuts down.
pub type ShutdownHook = Box<dyn FnOnce() + Send + 'static>;

/// Options for [`Client::connect`].
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ClientOptions {
    /// URL under which outputs publish their playlists and players
    pub base_url: String,
    #[derivative(Debug = "ignore")]
    pub on_shutdown: Option<ShutdownHook>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            on_shutdown: None,
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn on_shutdown(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_shutdown = Some(Box::new(hook));
        self
    }
}

pub(crate) struct Shared {
    base_url: Url,
    pub(crate) nodes: Mutex<BTreeMap<NodeId, NodeHandle>>,
    pub(crate) shutdown: watch::Sender<bool>,
    on_shutdown: Mutex<Option<ShutdownHook>>,
}

/// Handle to the engine, cheap to clone.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.shared.base_url.as_str())
            .field("nodes", &self.shared.nodes.lock().len())
            .finish()
    }
}

impl Client {
    /// Connect to the engine.
    ///
    /// # Errors
    ///
    /// Fails if `options.base_url` is not a valid URL.
    pub async fn connect(options: ClientOptions) -> Result<Self> {
        let mut base_url = Url::parse(&options.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        info!("connected to engine at {base_url}");

        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            shared: Arc::new(Shared {
                base_url,
                nodes: Mutex::new(BTreeMap::new()),
                shutdown,
                on_shutdown: Mutex::new(options.on_shutdown),
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.shared.base_url
    }

    /// Factories for input nodes.
    #[must_use]
    pub fn input(&self) -> Inputs<'_> {
        Inputs { client: self }
    }

    /// Factories for processor nodes.
    #[must_use]
    pub fn processor(&self) -> Processors<'_> {
        Processors { client: self }
    }

    /// Factories for output nodes.
    #[must_use]
    pub fn output(&self) -> Outputs<'_> {
        Outputs { client: self }
    }

    /// Factories for duplex nodes.
    #[must_use]
    pub fn duplex(&self) -> Duplexes<'_> {
        Duplexes { client: self }
    }

    /// Look up a registered node.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<NodeHandle> {
        self.shared.nodes.lock().get(id).cloned()
    }

    /// All registered nodes ordered by id.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeHandle> {
        self.shared.nodes.lock().values().cloned().collect()
    }

    /// Close the node registered under `id`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnknownNode`] if no such node is registered.
    pub fn close(&self, id: &NodeId) -> Result<()> {
        let node = self
            .node(id)
            .ok_or_else(|| Error::UnknownNode(id.clone()))?;
        node.close();
        Ok(())
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        *self.shared.shutdown.borrow()
    }

    /// Stop all routing and run the shutdown hook (once).
    pub fn shutdown(&self) {
        if self.shared.shutdown.send_replace(true) {
            return;
        }
        info!("engine shutting down");

        if let Some(hook) = self.shared.on_shutdown.lock().take() {
            hook();
        }
    }

    /// Resolves once [`Client::shutdown`] has been called.
    pub async fn wait_for_shutdown(&self) {
        let mut shutdown = self.shared.shutdown.subscribe();
        _ = shutdown.wait_for(|down| *down).await;
    }

    /// Write a DOT graph of the pipeline, see [`debug::dot_file`].
    pub fn dot(&self, filename_without_extension: &str) {
        debug::dot_file(self, filename_without_extension);
    }

    pub(crate) fn register(
        &self,
        id: &NodeId,
        kind: NodeKind,
        type_name: &'static str,
    ) -> Result<NodeHandle> {
        if self.is_shut_down() {
            return Err(Error::Shutdown);
        }

        let mut nodes = self.shared.nodes.lock();
        if nodes.contains_key(id) {
            warn!("Cannot add node with ID {id} twice.");
            return Err(Error::DuplicateNode(id.clone()));
        }

        let node = NodeHandle::new(id.clone(), kind, type_name, self.weak());
        nodes.insert(id.clone(), node.clone());

        info!("created {kind} node '{id}' ({type_name})");
        Ok(node)
    }

    /// URL below the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        Ok(self.shared.base_url.join(path)?)
    }

    fn weak(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }
}

/// Input node factories, see [`Client::input`].
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'c> {
    pub(crate) client: &'c Client,
}

/// Processor node factories, see [`Client::processor`].
#[derive(Debug, Clone, Copy)]
pub struct Processors<'c> {
    client: &'c Client,
}

impl<'c> Processors<'c> {
    /// Factories for transforming processors.
    #[must_use]
    pub fn transform(&self) -> Transforms<'c> {
        Transforms {
            client: self.client,
        }
    }
}

/// Transforming processor factories.
#[derive(Debug, Clone, Copy)]
pub struct Transforms<'c> {
    pub(crate) client: &'c Client,
}

/// Output node factories, see [`Client::output`].
#[derive(Debug, Clone, Copy)]
pub struct Outputs<'c> {
    pub(crate) client: &'c Client,
}

/// Duplex node factories, see [`Client::duplex`].
#[derive(Debug, Clone, Copy)]
pub struct Duplexes<'c> {
    pub(crate) client: &'c Client,
}
