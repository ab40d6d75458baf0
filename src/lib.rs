//! # Tranquility Library
//!
//! Orchestration core of the Tranquility chat backend:
//! - Credential lifecycle (login, registration, access-token refresh)
//! - Attachment lifecycle kept consistent across PostgreSQL and file storage
//! - Atomic guild provisioning and joined-guild aggregation
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, store traits and collaborator contracts
//! - **Application Layer**: Services and the orchestrator facade
//! - **Infrastructure Layer**: PostgreSQL adapters, file storage, credentials
//!
//! ## Module Structure
//!
//! ```text
//! tranquility/
//! +-- config/         Configuration management
//! +-- domain/         Entities, store traits, transaction handle
//! +-- application/    Services, orchestrator, error classification
//! +-- infrastructure/ Database, storage and credential implementations
//! +-- shared/         Request context and adapter errors
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Shared utilities
pub mod shared;

// Application startup and wiring
pub mod startup;

// Telemetry and observability
pub mod telemetry;
