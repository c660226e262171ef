//! Remote call contract and lightweight adapters.

mod call;

pub use call::{
    CallRequest, CallResponse, MemoryRemoteService, NoopRemoteService, RecordedCall, RemoteError,
    RemoteFuture, RemoteService, CODE_FAILED, CODE_OK,
};
