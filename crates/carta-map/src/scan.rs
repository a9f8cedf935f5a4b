//! Cooperative region scan: acquisition state machine and throttling.

use std::sync::Arc;

use carta_world::{ChunkBuf, ChunkCoord, ChunkSource, GenTicket, Region};

use crate::render::{RateLimit, RenderConfig};

/// Why `pump` returned control to the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum Pump {
    /// A throughput limit tripped; resume after exactly one tick.
    Yielded,
    /// Parked on an in-flight generation request; resume once the
    /// ticket completes (`pump` polls it, `wait_generation` blocks).
    Pending,
    Finished,
}

enum State {
    Next,
    AwaitGen(GenTicket),
    GenReady(Option<Arc<ChunkBuf>>),
    Done,
}

/// Drives chunk acquisition over a region in Z-inner/X-outer order.
/// Between suspensions execution is run-to-completion and deterministic;
/// the machine holds no external resources across a suspension.
pub struct RegionScan {
    region: Region,
    chunks_per_tick: u32,
    chunk_loads: RateLimit,
    chunk_gens: RateLimit,
    next_cx: i32,
    next_cz: i32,
    state: State,
    processed: u32,
    loaded: u32,
    generated: u32,
}

impl RegionScan {
    pub fn new(cfg: &RenderConfig, region: Region) -> Self {
        Self {
            region,
            chunks_per_tick: cfg.chunks_per_tick.max(1),
            chunk_loads: cfg.chunk_loads,
            chunk_gens: cfg.chunk_gens,
            next_cx: region.x1,
            next_cz: region.z1,
            state: State::Next,
            processed: 0,
            loaded: 0,
            generated: 0,
        }
    }

    /// Z advances first within the current X; X advances on Z wrap;
    /// exhaustion of X ends the scan.
    fn advance(&mut self) -> Option<ChunkCoord> {
        if self.next_cx > self.region.x2 {
            return None;
        }
        let coord = ChunkCoord::new(self.next_cx, self.next_cz);
        self.next_cz += 1;
        if self.next_cz > self.region.z2 {
            self.next_cz = self.region.z1;
            self.next_cx += 1;
        }
        Some(coord)
    }

    /// Runs the machine until it suspends or finishes, handing every
    /// acquired chunk to `sink`. Chunks that cannot be obtained are
    /// skipped without emission or counter changes; a world that is no
    /// longer loaded ends the scan early (partial result, not an error).
    pub fn pump<W, F>(&mut self, world: &W, sink: &mut F) -> Pump
    where
        W: ChunkSource + ?Sized,
        F: FnMut(&ChunkBuf),
    {
        loop {
            match std::mem::replace(&mut self.state, State::Next) {
                State::Done => {
                    self.state = State::Done;
                    return Pump::Finished;
                }
                State::AwaitGen(ticket) => match ticket.try_poll() {
                    None => {
                        self.state = State::AwaitGen(ticket);
                        return Pump::Pending;
                    }
                    Some(chunk) => {
                        if let Some(p) = self.consume_generated(chunk, sink) {
                            return p;
                        }
                    }
                },
                State::GenReady(chunk) => {
                    if let Some(p) = self.consume_generated(chunk, sink) {
                        return p;
                    }
                }
                State::Next => {
                    let Some(coord) = self.advance() else {
                        self.state = State::Done;
                        return Pump::Finished;
                    };
                    if !world.is_loaded() {
                        self.state = State::Done;
                        return Pump::Finished;
                    }
                    let mut loaded = false;
                    let mut chunk = world.resident(coord);
                    if chunk.is_none() && self.chunk_loads.enabled() {
                        chunk = world.load(coord);
                        loaded = chunk.is_some();
                    }
                    if chunk.is_none() && self.chunk_gens.enabled() {
                        let ticket = world.request_generation(coord);
                        match ticket.try_poll() {
                            None => {
                                self.state = State::AwaitGen(ticket);
                                return Pump::Pending;
                            }
                            Some(generated) => {
                                if let Some(p) = self.consume_generated(generated, sink) {
                                    return p;
                                }
                                continue;
                            }
                        }
                    }
                    match chunk {
                        None => continue,
                        Some(c) => {
                            sink(&c);
                            if self.throttle(loaded, false) {
                                return Pump::Yielded;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Resolves a parked generation by blocking on the ticket; the next
    /// `pump` picks up the completed chunk-or-none.
    pub fn wait_generation(&mut self) {
        if let State::AwaitGen(ticket) = std::mem::replace(&mut self.state, State::Next) {
            self.state = State::GenReady(ticket.wait());
        }
    }

    fn consume_generated<F>(&mut self, chunk: Option<Arc<ChunkBuf>>, sink: &mut F) -> Option<Pump>
    where
        F: FnMut(&ChunkBuf),
    {
        match chunk {
            // Generation completed with nothing; skip the coordinate.
            None => None,
            Some(c) => {
                sink(&c);
                if self.throttle(false, true) {
                    Some(Pump::Yielded)
                } else {
                    None
                }
            }
        }
    }

    /// Counts the iteration and decides whether to suspend. All three
    /// counters reset together on every suspension, so none exceeds its
    /// configured cap between ticks.
    fn throttle(&mut self, loaded: bool, generated: bool) -> bool {
        self.processed += 1;
        if loaded {
            self.loaded += 1;
        }
        if generated {
            self.generated += 1;
        }
        let mut suspend = self.processed % self.chunks_per_tick == 0;
        if let RateLimit::PerTick(n) = self.chunk_loads {
            if n > 0 && self.loaded > 0 && self.loaded % n == 0 {
                suspend = true;
            }
        }
        if let RateLimit::PerTick(n) = self.chunk_gens {
            if n > 0 && self.generated > 0 && self.generated % n == 0 {
                suspend = true;
            }
        }
        if suspend {
            self.processed = 0;
            self.loaded = 0;
            self.generated = 0;
        }
        suspend
    }
}
