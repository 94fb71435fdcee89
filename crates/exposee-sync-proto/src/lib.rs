//! Protobuf models for the exposee batch endpoint.
//!
//! The message definitions mirror `proto/exposed.proto`. They are written
//! out with `prost` derives instead of being generated at build time, which
//! keeps `protoc` out of the build. Any change to the schema file must be
//! reflected here with the same field tags.

#[allow(clippy::all)]
pub mod exposed {
    /// A single published diagnosis key and its onset date.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ProtoExposee {
        /// Opaque diagnosis key material.
        #[prost(bytes = "vec", tag = "1")]
        pub key: ::prost::alloc::vec::Vec<u8>,
        /// Onset of the key in milliseconds since the Unix epoch.
        #[prost(int64, tag = "2")]
        pub key_date: i64,
    }

    /// Container returned for one batch; `exposed` keeps transport order.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ProtoExposedList {
        #[prost(message, repeated, tag = "1")]
        pub exposed: ::prost::alloc::vec::Vec<ProtoExposee>,
    }
}

pub use exposed::*;
