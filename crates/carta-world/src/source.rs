//! External world collaborator: chunk acquisition interface.

use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError, bounded};

use crate::{ChunkBuf, ChunkCoord};

/// Handle for an in-flight generation request. The source completes it
/// with a chunk, or with `None` when generation produced nothing; both
/// are valid outcomes, not failures.
pub struct GenTicket {
    rx: Receiver<Option<Arc<ChunkBuf>>>,
}

impl GenTicket {
    pub fn from_receiver(rx: Receiver<Option<Arc<ChunkBuf>>>) -> Self {
        Self { rx }
    }

    /// Ticket that is already complete; for sources that generate
    /// synchronously.
    pub fn ready(chunk: Option<Arc<ChunkBuf>>) -> Self {
        let (tx, rx) = bounded(1);
        let _ = tx.send(chunk);
        Self { rx }
    }

    /// `None` while the request is still in flight. A dropped sender
    /// counts as completion with no chunk.
    pub fn try_poll(&self) -> Option<Option<Arc<ChunkBuf>>> {
        match self.rx.try_recv() {
            Ok(chunk) => Some(chunk),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(None),
        }
    }

    /// Blocks until the source signals completion.
    pub fn wait(&self) -> Option<Arc<ChunkBuf>> {
        self.rx.recv().unwrap_or(None)
    }
}

/// Read-only view of the host world. Returned chunks are never mutated
/// by the renderer.
pub trait ChunkSource {
    /// Whether the world is still usable; a scan ends early (without
    /// error) once this turns false.
    fn is_loaded(&self) -> bool;

    /// Chunk already resident in memory, if any.
    fn resident(&self, coord: ChunkCoord) -> Option<Arc<ChunkBuf>>;

    /// Synchronously load a chunk from backing storage; `None` when the
    /// chunk does not exist there.
    fn load(&self, coord: ChunkCoord) -> Option<Arc<ChunkBuf>>;

    /// Kick off generation of a missing chunk.
    fn request_generation(&self, coord: ChunkCoord) -> GenTicket;
}
