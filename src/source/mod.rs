// Remote derivative store abstraction — pluggable backends for the Forge
// service and in-memory test doubles.

pub mod forge;
pub mod traits;
