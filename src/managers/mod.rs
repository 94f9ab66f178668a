// linkvault state managers
// Managers own mutable state and persist it through the storage gateway.

pub mod bookmark_manager;
