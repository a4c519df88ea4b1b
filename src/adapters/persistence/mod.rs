//! Persistence adapters. Implement RatingRepoPort.

pub mod libsql_repo;

pub use libsql_repo::LibsqlRatingRepo;
