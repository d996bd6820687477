//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Project name used by most fixtures.
pub const PROJECT_NAME: &str = "demo";

/// Key pair name used by most fixtures.
pub const KEY_PAIR_NAME: &str = "demo-key";

/// First-boot command used by most fixtures.
pub const BOOTSTRAP_COMMAND: &str = "yum install -y git";

/// Stack name used when none is configured.
pub const DEFAULT_STACK_NAME: &str = "SpinUpServerStack";

/// Instance type used when none is configured.
pub const DEFAULT_INSTANCE_TYPE: &str = "t3.micro";
