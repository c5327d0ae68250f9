//! Light client header synchronization.
//!
//! Headers are fetched fresh for every operation and every retry attempt:
//! a chain's consensus state moves on between two rounds, and a header is only
//! fit to prove state committed at or below its height.

use std::collections::HashMap;

use tracing::debug;

use packet_relayer_types::core::ics02_client::header::Header;
use packet_relayer_types::core::ics24_host::identifier::ChainId;

use crate::chain::handle::ChainHandle;
use crate::error::Error;

/// The latest headers of the chains of a link, fetched in one pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncHeaders {
    headers: HashMap<ChainId, Header>,
}

impl SyncHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: Header) {
        self.headers.insert(header.chain_id.clone(), header);
    }

    pub fn get(&self, chain_id: &ChainId) -> Result<&Header, Error> {
        self.headers
            .get(chain_id)
            .ok_or_else(|| Error::missing_header(chain_id.clone()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl FromIterator<Header> for SyncHeaders {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        let mut headers = SyncHeaders::new();

        for header in iter {
            headers.insert(header);
        }

        headers
    }
}

/// Fetch the latest header of both chains.
pub fn updates_with_headers<ChainA: ChainHandle, ChainB: ChainHandle>(
    src: &ChainA,
    dst: &ChainB,
) -> Result<SyncHeaders, Error> {
    let src_header = update_lite_with_header(src)?;
    let dst_header = update_lite_with_header(dst)?;

    Ok([src_header, dst_header].into_iter().collect())
}

/// Fetch the latest header of a single chain.
pub fn update_lite_with_header<Chain: ChainHandle>(chain: &Chain) -> Result<Header, Error> {
    let header = chain.query_latest_header()?;

    debug!(
        chain = %chain.id(),
        height = %header.height(),
        "fetched latest header"
    );

    Ok(header)
}
