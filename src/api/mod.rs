//! API module containing route handlers and initialization logic
//!
//! This module is responsible for:
//! - Defining the catalog, user and checkout routes
//! - Initializing the API router with its middleware
//! - Providing API documentation through the index endpoint

/// Route handlers for the catalog endpoints
pub mod handlers;

/// API documentation and index endpoint
pub mod index;

/// Router initialization and configuration
pub mod init;

// Re-export the router initialization function for easier access
pub use init::initialize_router;
