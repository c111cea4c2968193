//! # Hello Service
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide protobuf message types and
//! a descriptor pool for testing `pbcall-core`.
//! It is not intended for production use.
use prost_reflect::DescriptorPool;
use std::sync::LazyLock;

pub mod pb {
    include!(concat!(env!("OUT_DIR"), "/hello.rs"));
}

/// Encoded `FileDescriptorSet` for every file under `proto/`.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("descriptors");

/// Pool backing the [`prost_reflect::ReflectMessage`] impls of the [`pb`] types.
pub static DESCRIPTOR_POOL: LazyLock<DescriptorPool> = LazyLock::new(|| {
    DescriptorPool::decode(FILE_DESCRIPTOR_SET).expect("Invalid hello file descriptor set")
});

/// Fully qualified name of the service declared in `hello.proto`.
pub const SERVICE_NAME: &str = "hello.HelloService";
