// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod incident;
pub mod repositories;
pub mod task;
pub mod team;
