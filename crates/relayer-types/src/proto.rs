//! Protobuf representations of the messages the relayer submits.
//!
//! Field numbers follow the ibc-go definitions, so the encoded length of a
//! message is a faithful estimate of its weight inside a transaction.

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct RawHeight {
    #[prost(uint64, tag = "1")]
    pub revision_number: u64,
    #[prost(uint64, tag = "2")]
    pub revision_height: u64,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RawCoin {
    #[prost(string, tag = "1")]
    pub denom: String,
    #[prost(string, tag = "2")]
    pub amount: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RawHeader {
    #[prost(string, tag = "1")]
    pub chain_id: String,
    #[prost(message, optional, tag = "2")]
    pub height: Option<RawHeight>,
    #[prost(uint64, tag = "3")]
    pub timestamp: u64,
    #[prost(bytes = "vec", tag = "4")]
    pub app_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub next_validators_hash: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RawMsgUpdateClient {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(message, optional, tag = "2")]
    pub header: Option<RawHeader>,
    #[prost(string, tag = "3")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RawMsgTransfer {
    #[prost(string, tag = "1")]
    pub source_port: String,
    #[prost(string, tag = "2")]
    pub source_channel: String,
    #[prost(message, optional, tag = "3")]
    pub token: Option<RawCoin>,
    #[prost(string, tag = "4")]
    pub sender: String,
    #[prost(string, tag = "5")]
    pub receiver: String,
    #[prost(message, optional, tag = "6")]
    pub timeout_height: Option<RawHeight>,
    #[prost(uint64, tag = "7")]
    pub timeout_timestamp: u64,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RawPacket {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(string, tag = "2")]
    pub source_port: String,
    #[prost(string, tag = "3")]
    pub source_channel: String,
    #[prost(string, tag = "4")]
    pub destination_port: String,
    #[prost(string, tag = "5")]
    pub destination_channel: String,
    #[prost(bytes = "vec", tag = "6")]
    pub data: Vec<u8>,
    #[prost(message, optional, tag = "7")]
    pub timeout_height: Option<RawHeight>,
    #[prost(uint64, tag = "8")]
    pub timeout_timestamp: u64,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RawMsgRecvPacket {
    #[prost(message, optional, tag = "1")]
    pub packet: Option<RawPacket>,
    #[prost(bytes = "vec", tag = "2")]
    pub proof_commitment: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub proof_height: Option<RawHeight>,
    #[prost(string, tag = "4")]
    pub signer: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RawMsgSendPacket {
    #[prost(string, tag = "1")]
    pub source_port: String,
    #[prost(string, tag = "2")]
    pub source_channel: String,
    #[prost(bytes = "vec", tag = "3")]
    pub data: Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub timeout_height: Option<RawHeight>,
    #[prost(uint64, tag = "5")]
    pub timeout_timestamp: u64,
    #[prost(string, tag = "6")]
    pub signer: String,
}
