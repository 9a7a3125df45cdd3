pub mod codec;
pub mod ffi;
pub mod pipe;
