//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When the seeded catalog changes, update only this file and fixtures.rs.

// ============================================================================
// Seeded Persons (ids follow insertion order)
// ============================================================================

pub const BACH_ID: i64 = 1;
pub const BACH_SURNAME: &str = "Bach";
pub const BACH_GIVEN_NAME: &str = "Johann Sebastian";

pub const MOZART_ID: i64 = 2;
pub const MOZART_SURNAME: &str = "Mozart";
pub const MOZART_GIVEN_NAME: &str = "Wolfgang Amadeus";

pub const BRAHMS_ID: i64 = 3;
pub const BRAHMS_SURNAME: &str = "Brahms";
pub const BRAHMS_GIVEN_NAME: &str = "Johannes";

/// Seeded without given name
pub const PALESTRINA_ID: i64 = 4;
pub const PALESTRINA_SURNAME: &str = "Palestrina";

pub const SEEDED_PERSON_COUNT: usize = 4;

// ============================================================================
// Seeded Pieces
// ============================================================================

/// "Jesu, meine Freude" by Bach, Motette, 1723, digitized
pub const JESU_MEINE_FREUDE_ID: i64 = 1;
pub const JESU_MEINE_FREUDE_TITLE: &str = "Jesu, meine Freude";

/// "Ave verum corpus" by Mozart, arranged by Brahms, Motette, 1791, not digitized
pub const AVE_VERUM_ID: i64 = 2;
pub const AVE_VERUM_TITLE: &str = "Ave verum corpus";

/// "Geistliches Lied" by Brahms, Choral, no year, digitized unknown
pub const GEISTLICHES_LIED_ID: i64 = 3;
pub const GEISTLICHES_LIED_TITLE: &str = "Geistliches Lied";

/// "Sicut cervus" by Palestrina, Motette, 1584, digitized
pub const SICUT_CERVUS_ID: i64 = 4;
pub const SICUT_CERVUS_TITLE: &str = "Sicut cervus";

pub const SEEDED_PIECE_COUNT: u64 = 4;

/// An id that no seeded entity uses
pub const MISSING_ID: i64 = 9999;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
