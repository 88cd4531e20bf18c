pub const CONUS_WMS_URL: &str = "https://opengeo.ncep.noaa.gov/geoserver/conus/ows";
pub const MRMS_WMS_URL: &str = "https://opengeo.ncep.noaa.gov/geoserver/mrms/ows";

pub const DEFAULT_STATION_ID: &str = "KCLE";
pub const DEFAULT_LAYER_ID: &str = "reflectivity";
pub const DEFAULT_LISTEN_PORT: u16 = 5000;
pub const DEFAULT_LAST_IMAGE_PATH: &str = "last_radar.png";

pub const DEFAULT_IMAGE_TIMEOUT_SECONDS: u64 = 20;
pub const DEFAULT_TIMESTAMP_TIMEOUT_SECONDS: u64 = 15;
pub const CONNECT_TIMEOUT_SECONDS: u64 = 8;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const STANDARD_LAT_SPAN_DEG: f64 = 5.0;
pub const STANDARD_LON_SPAN_DEG: f64 = 6.0;
pub const WIDE_LAT_SPAN_DEG: f64 = 6.0;
pub const WIDE_LON_SPAN_DEG: f64 = 8.0;

pub const IMAGE_WIDTH_PX: u32 = 700;
pub const IMAGE_HEIGHT_PX: u32 = 600;
pub const IMAGE_FORMAT: &str = "image/png";
pub const WMS_CRS: &str = "EPSG:4326";
pub const WMS_BGCOLOR: &str = "0x00000000";
pub const CONUS_BREF_LAYER: &str = "conus:conus_bref_qcd";

pub const PNG_SIGNATURE: [u8; 8] = *b"\x89PNG\r\n\x1a\n";

// Assumed total upstream cache lifetime; a calibration guess, not a
// documented property of the WMS service.
pub const ASSUMED_CACHE_LIFETIME_SECONDS: i64 = 120;
pub const FALLBACK_DATA_DELAY_MINUTES: i64 = 2;
pub const NO_DATA_FALLBACK_MINUTES: i64 = 5;

pub const HISTORY_CAPACITY: usize = 3;
pub const HISTORY_DEDUP_WINDOW_SECONDS: i64 = 30;

pub const LOG_URL_PREFIX_CHARS: usize = 120;
pub const LOG_ERROR_SNIPPET_CHARS: usize = 200;
