//! Minimal process group abstraction. The SCF driver only needs to know which
//! rank it is and to synchronise all ranks once integrals are staged.
use std::sync::{Arc, Barrier};

#[cfg(feature = "mpi")]
use mpi::traits::{Communicator, CommunicatorCollectives};

pub trait ProcessGroup {
    /// Rank of the calling process, `0` is the root
    fn rank(&self) -> usize;

    /// Number of processes in the group
    fn size(&self) -> usize;

    /// Blocks until every process of the group has reached this point
    fn barrier(&self);

    fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

/// A group consisting of only the calling process
#[derive(Copy, Clone, Debug, Default)]
pub struct SingleProcess;

impl ProcessGroup for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) {}
}

/// One member of a group of threads within a single process. Every member of
/// the group has to be moved to its own thread.
#[derive(Clone, Debug)]
pub struct LocalGroup {
    rank: usize,
    size: usize,
    barrier: Arc<Barrier>,
}

impl LocalGroup {
    /// Creates the `n` members of a new group, ordered by rank
    pub fn split(n: usize) -> Vec<Self> {
        let barrier = Arc::new(Barrier::new(n));

        (0..n)
            .map(|rank| Self {
                rank,
                size: n,
                barrier: Arc::clone(&barrier),
            })
            .collect()
    }
}

impl ProcessGroup for LocalGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.barrier.wait();
    }
}

/// The world communicator of an MPI job. Holding on to this keeps MPI
/// initialized, it is finalized once the group is dropped.
#[cfg(feature = "mpi")]
pub struct MpiGroup {
    world: mpi::topology::SimpleCommunicator,
    _universe: mpi::environment::Universe,
}

#[cfg(feature = "mpi")]
impl MpiGroup {
    /// Initializes MPI, `None` if it was initialized before
    pub fn initialize() -> Option<Self> {
        let universe = mpi::initialize()?;
        let world = universe.world();
        log::debug!("joined mpi world of size {}", world.size());

        Some(Self {
            world,
            _universe: universe,
        })
    }
}

#[cfg(feature = "mpi")]
impl ProcessGroup for MpiGroup {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn barrier(&self) {
        self.world.barrier();
    }
}
