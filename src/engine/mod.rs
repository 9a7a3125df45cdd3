pub mod api;
pub mod shim;

#[cfg(test)]
pub(crate) mod testing;
