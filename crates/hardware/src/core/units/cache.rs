//! Set-associative LRU data cache.
//!
//! The cache models *timing and counting* for data-side memory accesses;
//! the memory image stays authoritative for values. Instruction fetch does
//! not go through it.
//!
//! Geometry is power-of-two: `S = 2^s` sets, `E` ways, `B = 2^b` byte
//! blocks. An address splits as `tag | set | offset` with the tag taking
//! every bit above `s + b`. Replacement is true LRU via a monotonically
//! increasing use stamp; the victim is the first invalid way, else the way
//! with the smallest stamp (ties break to the lowest way index).

use tracing::trace;

use crate::common::SimError;
use crate::config::CacheConfig;

/// An address split into its cache fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrParts {
    /// Everything above the set and offset bits.
    pub tag: u64,
    /// Set index.
    pub set: u64,
    /// Byte offset within the block.
    pub offset: u64,
}

/// Outcome of a counted lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The block was resident.
    Hit,
    /// The block was not resident and has now been installed.
    Miss {
        /// Whether installing it displaced a valid line.
        evicted: bool,
    },
}

/// State of the cache port as seen by the memory stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    /// The access can complete this cycle.
    Ready,
    /// A miss is still being serviced; retry next cycle.
    Busy,
}

#[derive(Debug, Clone, Copy, Default)]
struct Line {
    valid: bool,
    tag: u64,
    last_used: u64,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    block: u64,
    remaining: u64,
}

/// The cache proper. One outstanding miss at a time; while it is pending
/// the port reports [`Port::Busy`] and the requester is expected to retry
/// the same access each cycle.
#[derive(Debug, Clone)]
pub struct Cache {
    lines: Vec<Line>,
    set_bits: u32,
    block_bits: u32,
    ways: usize,
    miss_penalty: u64,
    clock: u64,
    pending: Option<Pending>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Cache {
    /// Builds a cache for the given geometry.
    ///
    /// # Errors
    ///
    /// Rejects zero ways and an address split that does not leave room for
    /// a tag.
    pub fn new(config: &CacheConfig) -> Result<Self, SimError> {
        if config.associativity == 0 {
            return Err(SimError::CacheGeometry(String::from(
                "associativity must be at least 1",
            )));
        }
        if config.set_bits + config.block_bits >= u64::BITS {
            return Err(SimError::CacheGeometry(format!(
                "set bits ({}) + block bits ({}) must leave tag bits in a 64-bit address",
                config.set_bits, config.block_bits
            )));
        }
        let sets = 1usize << config.set_bits;
        Ok(Cache {
            lines: vec![Line::default(); sets * config.associativity],
            set_bits: config.set_bits,
            block_bits: config.block_bits,
            ways: config.associativity,
            miss_penalty: config.miss_penalty,
            clock: 0,
            pending: None,
            hits: 0,
            misses: 0,
            evictions: 0,
        })
    }

    /// Number of sets.
    pub fn sets(&self) -> usize {
        1 << self.set_bits
    }

    /// Ways per set.
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Block size in bytes.
    pub fn block_size(&self) -> u64 {
        1 << self.block_bits
    }

    /// Splits an address into tag, set index, and block offset.
    pub fn decompose(&self, addr: u64) -> AddrParts {
        AddrParts {
            tag: addr >> (self.set_bits + self.block_bits),
            set: (addr >> self.block_bits) & ((1 << self.set_bits) - 1),
            offset: addr & (self.block_size() - 1),
        }
    }

    /// Hit count so far.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Miss count so far.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Eviction count so far.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Total counted lookups.
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// True while a miss is being serviced.
    pub fn busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Valid lines currently in a set. Never exceeds the way count.
    pub fn valid_lines(&self, set: usize) -> usize {
        self.set_lines(set).iter().filter(|l| l.valid).count()
    }

    /// Invalidate every line and zero the counters.
    pub fn reset(&mut self) {
        for line in &mut self.lines {
            *line = Line::default();
        }
        self.clock = 0;
        self.pending = None;
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    /// One counted lookup: bumps exactly one of the hit/miss counters,
    /// refreshes the LRU stamp on a hit, installs the block (evicting if
    /// necessary) on a miss.
    pub fn lookup(&mut self, addr: u64) -> Lookup {
        let parts = self.decompose(addr);
        self.clock += 1;
        let stamp = self.clock;

        let set = usize::try_from(parts.set).unwrap_or(0);
        if let Some(way) = self
            .set_lines(set)
            .iter()
            .position(|l| l.valid && l.tag == parts.tag)
        {
            self.set_lines_mut(set)[way].last_used = stamp;
            self.hits += 1;
            trace!(target: "ysim::cache", addr = format_args!("{addr:#x}"), set, way, "hit");
            return Lookup::Hit;
        }

        self.misses += 1;
        let victim = self.victim_way(set);
        let evicted = self.set_lines(set)[victim].valid;
        if evicted {
            self.evictions += 1;
        }
        self.set_lines_mut(set)[victim] = Line {
            valid: true,
            tag: parts.tag,
            last_used: stamp,
        };
        trace!(
            target: "ysim::cache",
            addr = format_args!("{addr:#x}"),
            set,
            way = victim,
            evicted,
            "miss"
        );
        Lookup::Miss { evicted }
    }

    /// A timed access from the memory stage.
    ///
    /// The first call for an access performs the counted [`lookup`]. A hit
    /// (or a zero miss penalty) completes immediately; a miss parks the
    /// port for `miss_penalty` cycles, during which every call returns
    /// [`Port::Busy`]. The caller retries the same access each cycle until
    /// the port reports [`Port::Ready`], then performs the memory
    /// operation exactly once.
    ///
    /// [`lookup`]: Cache::lookup
    pub fn request(&mut self, addr: u64) -> Port {
        if let Some(pending) = &mut self.pending {
            debug_assert_eq!(pending.block, addr >> self.block_bits);
            pending.remaining -= 1;
            if pending.remaining == 0 {
                self.pending = None;
                return Port::Ready;
            }
            return Port::Busy;
        }
        match self.lookup(addr) {
            Lookup::Hit => Port::Ready,
            Lookup::Miss { .. } if self.miss_penalty == 0 => Port::Ready,
            Lookup::Miss { .. } => {
                self.pending = Some(Pending {
                    block: addr >> self.block_bits,
                    remaining: self.miss_penalty,
                });
                Port::Busy
            }
        }
    }

    fn set_lines(&self, set: usize) -> &[Line] {
        &self.lines[set * self.ways..(set + 1) * self.ways]
    }

    fn set_lines_mut(&mut self, set: usize) -> &mut [Line] {
        let ways = self.ways;
        &mut self.lines[set * ways..(set + 1) * ways]
    }

    /// First invalid way, else the least-recently-used one. The stamp scan
    /// uses strict less-than so ties resolve to the lowest way index.
    fn victim_way(&self, set: usize) -> usize {
        let lines = self.set_lines(set);
        if let Some(way) = lines.iter().position(|l| !l.valid) {
            return way;
        }
        let mut victim = 0;
        for (way, line) in lines.iter().enumerate() {
            if line.last_used < lines[victim].last_used {
                victim = way;
            }
        }
        victim
    }
}
