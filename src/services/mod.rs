pub mod allocator;
pub mod selection;
