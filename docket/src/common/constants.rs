// document fields managed by the repository
pub const DOC_ID: &str = "id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";
pub const IS_ACTIVE: &str = "is_active";
pub const DELETED_AT: &str = "deleted_at";
pub const RESERVED_FIELDS: [&str; 5] = [DOC_ID, CREATED_AT, UPDATED_AT, IS_ACTIVE, DELETED_AT];

// Compile-time assertion for reserved fields count
const _: () = {
    const RESERVED_FIELDS_COUNT: usize = 5;
    const ACTUAL_COUNT: usize = RESERVED_FIELDS.len();
    const _: [(); 1] = [(); (ACTUAL_COUNT == RESERVED_FIELDS_COUNT) as usize];
};

// embedded field paths
pub const FIELD_SEPARATOR: &str = ".";

// store constants
pub const MEMORY_SCHEME: &str = "memory://";
pub const DEFAULT_STORE_ADDRESS: &str = "memory://default";
pub const DEFAULT_DATABASE: &str = "docket";
pub const DEFAULT_MIN_POOL_SIZE: usize = 1;
pub const DEFAULT_MAX_POOL_SIZE: usize = 10;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 5_000;

// query constants
pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 1_000;

pub const DOCKET_VERSION: &str = env!("CARGO_PKG_VERSION");
