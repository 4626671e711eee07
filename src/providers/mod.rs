pub mod blob_store;
pub mod height;
pub mod ipfs_votes;
pub mod price_decoder;

pub use blob_store::BlobRecordStore;
pub use height::ExplorerHeightOracle;
pub use ipfs_votes::IpfsVoteStore;
pub use price_decoder::SlotPriceDecoder;
