//! In-memory scripted world used by renderer tests and benches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::source::{ChunkSource, GenTicket};
use crate::{ChunkBuf, ChunkCoord};

type ChunkMap = HashMap<ChunkCoord, Arc<ChunkBuf>>;
type GenReply = Option<Arc<ChunkBuf>>;

/// Scripted `ChunkSource`: chunks are staged as resident, loadable, or
/// generable, and every collaborator call is counted so tests can assert
/// what the scanner touched.
#[derive(Default)]
pub struct MemoryWorld {
    loaded: AtomicBool,
    resident: Mutex<ChunkMap>,
    loadable: Mutex<ChunkMap>,
    generable: Mutex<ChunkMap>,
    deferred: Mutex<HashMap<ChunkCoord, Receiver<GenReply>>>,
    load_calls: AtomicUsize,
    gen_calls: AtomicUsize,
    is_loaded_calls: AtomicUsize,
    unload_after: AtomicUsize,
}

impl MemoryWorld {
    pub fn new() -> Self {
        let w = Self::default();
        w.loaded.store(true, Ordering::Relaxed);
        w.unload_after.store(usize::MAX, Ordering::Relaxed);
        w
    }

    pub fn insert_resident(&self, chunk: ChunkBuf) {
        self.resident
            .lock()
            .expect("resident lock")
            .insert(chunk.coord, Arc::new(chunk));
    }

    pub fn insert_loadable(&self, chunk: ChunkBuf) {
        self.loadable
            .lock()
            .expect("loadable lock")
            .insert(chunk.coord, Arc::new(chunk));
    }

    pub fn insert_generable(&self, chunk: ChunkBuf) {
        self.generable
            .lock()
            .expect("generable lock")
            .insert(chunk.coord, Arc::new(chunk));
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::Relaxed);
    }

    /// Reports the world as unloaded starting with the n-th
    /// `is_loaded` query, simulating a world that vanishes mid-scan.
    pub fn unload_after_queries(&self, n: usize) {
        self.unload_after.store(n, Ordering::Relaxed);
    }

    /// Stages a generation request whose completion the test controls:
    /// the returned sender finishes the ticket.
    pub fn stage_deferred_generation(&self, coord: ChunkCoord) -> Sender<GenReply> {
        let (tx, rx) = bounded(1);
        self.deferred
            .lock()
            .expect("deferred lock")
            .insert(coord, rx);
        tx
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::Relaxed)
    }

    pub fn gen_calls(&self) -> usize {
        self.gen_calls.load(Ordering::Relaxed)
    }
}

impl ChunkSource for MemoryWorld {
    fn is_loaded(&self) -> bool {
        let n = self.is_loaded_calls.fetch_add(1, Ordering::Relaxed);
        if n + 1 >= self.unload_after.load(Ordering::Relaxed) {
            return false;
        }
        self.loaded.load(Ordering::Relaxed)
    }

    fn resident(&self, coord: ChunkCoord) -> Option<Arc<ChunkBuf>> {
        self.resident
            .lock()
            .expect("resident lock")
            .get(&coord)
            .cloned()
    }

    fn load(&self, coord: ChunkCoord) -> Option<Arc<ChunkBuf>> {
        self.load_calls.fetch_add(1, Ordering::Relaxed);
        let chunk = self
            .loadable
            .lock()
            .expect("loadable lock")
            .get(&coord)
            .cloned()?;
        self.resident
            .lock()
            .expect("resident lock")
            .insert(coord, Arc::clone(&chunk));
        Some(chunk)
    }

    fn request_generation(&self, coord: ChunkCoord) -> GenTicket {
        self.gen_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(rx) = self.deferred.lock().expect("deferred lock").remove(&coord) {
            return GenTicket::from_receiver(rx);
        }
        let chunk = self
            .generable
            .lock()
            .expect("generable lock")
            .get(&coord)
            .cloned();
        GenTicket::ready(chunk)
    }
}
