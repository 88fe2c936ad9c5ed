//! Hand-written prost types for the frame payloads.
//!
//! Field tags are part of the wire contract and must never be reused.
//! Protobuf skips unknown fields, so later versions may add fields to any
//! of these messages without breaking existing readers.

/// Stream header. Currently carries no fields.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {}

/// Columnar line table embedded in a [`RangeV1`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LineTable {
    /// First entry is relative to the range's address, the rest are deltas
    /// from the previous entry.
    #[prost(uint32, repeated, tag = "1")]
    pub offset: ::prost::alloc::vec::Vec<u32>,
    #[prost(uint32, repeated, tag = "2")]
    pub line_number: ::prost::alloc::vec::Vec<u32>,
}

/// One node of a flattened inline tree.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RangeV1 {
    #[prost(oneof = "range_v1::ElfVa", tags = "1, 2")]
    pub elf_va: ::core::option::Option<range_v1::ElfVa>,
    #[prost(uint64, tag = "3")]
    pub length: u64,
    #[prost(oneof = "range_v1::Func", tags = "4, 5")]
    pub func: ::core::option::Option<range_v1::Func>,
    #[prost(oneof = "range_v1::File", tags = "6, 7")]
    pub file: ::core::option::Option<range_v1::File>,
    #[prost(uint32, tag = "8")]
    pub call_line: u32,
    #[prost(oneof = "range_v1::CallFile", tags = "9, 10")]
    pub call_file: ::core::option::Option<range_v1::CallFile>,
    #[prost(uint32, tag = "11")]
    pub depth: u32,
    #[prost(message, optional, tag = "12")]
    pub line_table: ::core::option::Option<LineTable>,
}

pub mod range_v1 {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ElfVa {
        #[prost(uint64, tag = "1")]
        SetElfVa(u64),
        #[prost(sint64, tag = "2")]
        DeltaElfVa(i64),
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Func {
        #[prost(string, tag = "4")]
        FuncStr(::prost::alloc::string::String),
        #[prost(uint32, tag = "5")]
        FuncRef(u32),
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum File {
        #[prost(string, tag = "6")]
        FileStr(::prost::alloc::string::String),
        #[prost(uint32, tag = "7")]
        FileRef(u32),
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum CallFile {
        #[prost(string, tag = "9")]
        CallFileStr(::prost::alloc::string::String),
        #[prost(uint32, tag = "10")]
        CallFileRef(u32),
    }
}

/// Inline stack at a call-return address, stored column-wise.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReturnPadV1 {
    #[prost(oneof = "return_pad_v1::ElfVa", tags = "1, 2")]
    pub elf_va: ::core::option::Option<return_pad_v1::ElfVa>,
    /// String-table indices, outermost frame first.
    #[prost(uint32, repeated, tag = "3")]
    pub func: ::prost::alloc::vec::Vec<u32>,
    /// String-table indices, outermost frame first.
    #[prost(uint32, repeated, tag = "4")]
    pub file: ::prost::alloc::vec::Vec<u32>,
    #[prost(uint32, repeated, tag = "5")]
    pub line: ::prost::alloc::vec::Vec<u32>,
}

pub mod return_pad_v1 {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ElfVa {
        #[prost(uint64, tag = "1")]
        SetElfVa(u64),
        #[prost(sint64, tag = "2")]
        DeltaElfVa(i64),
    }
}

/// Replaces the active string table.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringTableV1 {
    #[prost(string, repeated, tag = "1")]
    pub strings: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
