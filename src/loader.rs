use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use rayon::prelude::*;

use crate::{
    data::{LoadedAsset, LoadedBinary, LoadedTexture},
    error::{GameError, GameResult},
    game::Services,
    handles::{AssetHandle, AssetKind},
    textures::Texture,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub path: PathBuf,
    pub kind: AssetKind,
}

type LoadResult = (PathBuf, Result<LoadedAsset, String>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderPhase {
    Queueing,
    Loading,
    Resolved,
    Failed,
}

/// Identifies the single consumer of one loading cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub usize);

/// Implemented by anything that waits on a loader batch.
pub trait AssetsLoadedListener {
    fn listener_id(&self) -> Option<ListenerId>;

    /// Runs on the main thread once every queued asset is resident.
    fn on_assets_loaded(&mut self, services: &mut Services) -> GameResult<()>;
}

pub struct AsyncAssetLoader {
    request_tx: Sender<Vec<AssetRequest>>,
    result_rx: Receiver<LoadResult>,

    cycle: usize,
    phase: LoaderPhase,
    listener: Option<ListenerId>,
    listener_notified: bool,

    queued: Vec<AssetRequest>,
    staged: HashMap<PathBuf, LoadedAsset>,
    resident: HashMap<PathBuf, AssetHandle>,
}

impl AsyncAssetLoader {
    pub fn new<P: AsRef<Path>>(root: P, cycle: usize) -> Self {
        let (request_tx, request_rx) = unbounded::<Vec<AssetRequest>>();
        let (result_tx, result_rx) = unbounded::<LoadResult>();
        let root = root.as_ref().to_path_buf();

        std::thread::spawn(move || {
            for batch in request_rx {
                log::debug!("Loader thread: loading batch of {} assets", batch.len());

                batch
                    .par_iter()
                    .for_each_with(result_tx.clone(), |tx, request| {
                        let result = load_request(&root, request);
                        if let Err(e) = &result {
                            log::error!("Failed to load {:?}: {}", request.path, e);
                        }
                        if tx.send((request.path.clone(), result)).is_err() {
                            log::debug!("Loader dropped before {:?} finished", request.path);
                        }
                    });
            }
        });

        Self {
            request_tx,
            result_rx,
            cycle,
            phase: LoaderPhase::Queueing,
            listener: None,
            listener_notified: false,
            queued: Vec::new(),
            staged: HashMap::new(),
            resident: HashMap::new(),
        }
    }

    pub fn phase(&self) -> LoaderPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, LoaderPhase::Resolved | LoaderPhase::Failed)
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    pub fn add_asset_to_load<P: AsRef<Path>>(&mut self, path: P, kind: AssetKind) -> GameResult<()> {
        let path = path.as_ref();

        if self.phase != LoaderPhase::Queueing {
            return Err(GameError::invalid_state(format!(
                "cannot queue {} after loading has started",
                path.display()
            )));
        }

        if let Some(existing) = self.queued.iter().find(|r| r.path == path) {
            if existing.kind != kind {
                return Err(GameError::Configuration(format!(
                    "{} already queued as {}, requested again as {}",
                    path.display(),
                    existing.kind,
                    kind
                )));
            }
            return Ok(());
        }

        log::debug!("Queued {} {:?}", kind, path);
        self.queued.push(AssetRequest {
            path: path.to_path_buf(),
            kind,
        });
        Ok(())
    }

    pub fn register_listener(&mut self) -> GameResult<ListenerId> {
        if self.listener.is_some() {
            return Err(GameError::invalid_state(
                "a listener is already registered for this loading cycle",
            ));
        }

        let id = ListenerId(self.cycle);
        self.listener = Some(id);
        Ok(id)
    }

    pub fn get_asset<P: AsRef<Path>>(&self, path: P, kind: AssetKind) -> GameResult<&AssetHandle> {
        let path = path.as_ref();
        self.resident
            .get(path)
            .filter(|handle| handle.kind() == kind)
            .ok_or_else(|| GameError::not_loaded(path))
    }

    pub fn get_texture<P: AsRef<Path>>(&self, path: P) -> GameResult<Texture> {
        let path = path.as_ref();
        self.get_asset(path, AssetKind::Texture)?
            .as_texture()
            .cloned()
            .ok_or_else(|| GameError::not_loaded(path))
    }

    pub fn get_binary<P: AsRef<Path>>(&self, path: P) -> GameResult<std::rc::Rc<Vec<u8>>> {
        let path = path.as_ref();
        self.get_asset(path, AssetKind::Binary)?
            .as_binary()
            .cloned()
            .ok_or_else(|| GameError::not_loaded(path))
    }

    /// Per-tick poll. The first call hands the whole queue to the worker;
    /// later calls collect results. Returns the registered listener exactly
    /// once, on the poll that makes the batch resident.
    pub fn update(&mut self) -> GameResult<Option<ListenerId>> {
        match self.phase {
            LoaderPhase::Queueing => {
                self.start_loading();
            }
            LoaderPhase::Loading => {}
            LoaderPhase::Resolved => return Ok(self.take_notification()),
            LoaderPhase::Failed => return Ok(None),
        }

        while let Ok(result) = self.result_rx.try_recv() {
            self.stage(result)?;
        }

        self.try_resolve();
        Ok(self.take_notification())
    }

    /// Blocking counterpart of `update` for headless runs.
    pub fn block_until_resolved(&mut self, timeout: Duration) -> GameResult<Option<ListenerId>> {
        let deadline = Instant::now() + timeout;

        let mut notification = self.update()?;
        while self.phase == LoaderPhase::Loading {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok(result) => {
                    self.stage(result)?;
                    notification = self.update()?;
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(GameError::invalid_state(format!(
                        "asset batch not resolved after {:?}",
                        timeout
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.phase = LoaderPhase::Failed;
                    return Err(GameError::invalid_state("asset loader thread stopped"));
                }
            }
        }

        Ok(notification)
    }

    fn start_loading(&mut self) {
        self.phase = LoaderPhase::Loading;
        log::info!("Loading {} assets", self.queued.len());

        if self.queued.is_empty() {
            return;
        }

        if let Err(e) = self.request_tx.send(self.queued.clone()) {
            log::error!("AssetLoader: failed to send load request: {:?}", e);
        }
    }

    fn stage(&mut self, (path, result): LoadResult) -> GameResult<()> {
        if self.phase != LoaderPhase::Loading {
            return Ok(());
        }

        match result {
            Ok(asset) => {
                self.staged.insert(path, asset);
                Ok(())
            }
            Err(reason) => {
                self.phase = LoaderPhase::Failed;
                self.staged.clear();
                Err(GameError::LoadFailed { path, reason })
            }
        }
    }

    fn try_resolve(&mut self) {
        if self.phase != LoaderPhase::Loading || self.staged.len() < self.queued.len() {
            return;
        }

        for (path, asset) in self.staged.drain() {
            self.resident.insert(path, AssetHandle::from(asset));
        }
        self.phase = LoaderPhase::Resolved;
        log::info!("All {} assets loaded", self.resident.len());
    }

    fn take_notification(&mut self) -> Option<ListenerId> {
        if self.phase != LoaderPhase::Resolved || self.listener_notified {
            return None;
        }

        let listener = self.listener?;
        self.listener_notified = true;
        Some(listener)
    }
}

fn load_request(root: &Path, request: &AssetRequest) -> Result<LoadedAsset, String> {
    let full_path = root.join(&request.path);

    match request.kind {
        AssetKind::Texture => {
            let img = image::open(&full_path)
                .map_err(|e| format!("{:?}: {}", full_path, e))?
                .to_rgba8();
            let (width, height) = img.dimensions();

            Ok(LoadedAsset::Texture(LoadedTexture {
                path: request.path.clone(),
                width,
                height,
                data: img.into_raw(),
            }))
        }
        AssetKind::Binary => {
            let bytes = std::fs::read(&full_path).map_err(|e| format!("{:?}: {}", full_path, e))?;

            Ok(LoadedAsset::Binary(LoadedBinary {
                path: request.path.clone(),
                bytes,
            }))
        }
    }
}

/// Owns the session's loader. `get_instance` creates one lazily and
/// `free_instance` drops it; each instance is one loading cycle.
pub struct AssetLoaderService {
    root: PathBuf,
    instance: Option<AsyncAssetLoader>,
    cycles: usize,
}

impl AssetLoaderService {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            instance: None,
            cycles: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get_instance(&mut self) -> &mut AsyncAssetLoader {
        if self.instance.is_none() {
            self.cycles += 1;
            log::debug!("Creating asset loader for cycle {}", self.cycles);
        }

        let (root, cycle) = (&self.root, self.cycles);
        self.instance
            .get_or_insert_with(|| AsyncAssetLoader::new(root, cycle))
    }

    pub fn instance(&self) -> Option<&AsyncAssetLoader> {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut AsyncAssetLoader> {
        self.instance.as_mut()
    }

    pub fn loaded_instance(&self) -> GameResult<&AsyncAssetLoader> {
        self.instance
            .as_ref()
            .ok_or_else(|| GameError::invalid_state("the asset loader has been released"))
    }

    pub fn is_allocated(&self) -> bool {
        self.instance.is_some()
    }

    pub fn free_instance(&mut self) {
        if let Some(loader) = self.instance.take() {
            if !loader.is_finished() {
                log::warn!("Asset loader released in phase {:?}", loader.phase());
            }
            log::debug!("Released asset loader for cycle {}", loader.cycle);
        }
    }
}
