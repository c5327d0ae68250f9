//! Relaying packets over one channel between two chains.

pub mod batch;
pub mod error;
pub mod proofs;
pub mod relay_msgs;
pub mod relay_path;

use crate::chain::handle::ChainHandle;
use crate::config::Config;
use crate::path::ChainEnd;

use self::error::LinkError;

/// The two endpoints of a channel, each one bound to a handle to its chain.
///
/// Operations read a link, they never modify it: tuning an operation means
/// building a link from another configuration.
#[derive(Clone, Debug)]
pub struct Link<ChainA, ChainB> {
    pub src: ChainEnd<ChainA>,
    pub dst: ChainEnd<ChainB>,
}

impl<ChainA: ChainHandle, ChainB: ChainHandle> Link<ChainA, ChainB> {
    pub fn new(src: ChainEnd<ChainA>, dst: ChainEnd<ChainB>) -> Self {
        Self { src, dst }
    }

    /// Bind the configured path to the two chain handles, with the tunables
    /// of `config`.
    pub fn from_config(
        src_chain: ChainA,
        dst_chain: ChainB,
        config: &Config,
    ) -> Result<Self, LinkError> {
        let src = ChainEnd::new(src_chain, config.path.src.clone(), config.src.clone())?;
        let dst = ChainEnd::new(dst_chain, config.path.dst.clone(), config.dst.clone())?;

        Ok(Self::new(src, dst))
    }

    /// The same link, relaying from the destination to the source.
    pub fn reversed(&self) -> Link<ChainB, ChainA> {
        Link {
            src: self.dst.clone(),
            dst: self.src.clone(),
        }
    }
}
