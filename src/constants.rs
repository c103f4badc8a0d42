// Constants module - centralized default values for configuration
//
// Defaults used by the config layer, the request handler and the image
// pipeline live here so each value has exactly one definition.

// =============================================================================
// Server defaults
// =============================================================================

/// Default listen address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 4;

// =============================================================================
// Routing defaults
// =============================================================================

/// Path prefix served by the image handler
pub const DEFAULT_ROUTE_PREFIX: &str = "/files/";

/// Health check endpoint
pub const HEALTH_PATH: &str = "/health";

// =============================================================================
// Response defaults
// =============================================================================

/// Cache-Control sent with every transformed image
pub const DEFAULT_CACHE_CONTROL: &str = "public,max-age=3600";

/// Content-Type sent with every transformed image
pub const IMAGE_CONTENT_TYPE: &str = "image";

/// Body returned when the source object does not exist
pub const NOT_FOUND_BODY: &str = "File not found";

/// Body returned for every other failure
pub const ERROR_BODY: &str = "Error retrieving file";

// =============================================================================
// Image defaults
// =============================================================================

/// Default quality for lossy encoders
pub const DEFAULT_IMAGE_QUALITY: u8 = 80;

/// Largest dimension a request may ask for (the WebP format limit)
pub const DEFAULT_MAX_DIMENSION: u32 = 16383;
