// Container inspection — recognizing fetched derivatives that reference
// further assets, and extracting those references.

pub mod container;
pub mod nested;
