/// Accent color used when an event carries none.
pub const DEFAULT_COLOR: &str = "#3366ff";

/// Title given to events composed or imported without one.
pub const DEFAULT_TITLE: &str = "Event";

/// Pixel height of one hour on the day timeline.
pub const DEFAULT_HOUR_HEIGHT_PX: u32 = 60;

/// Smallest height a timeline block is drawn with, so short events stay clickable.
pub const MIN_BLOCK_HEIGHT_PX: u32 = 28;

/// Length given to timed events without a usable end.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Number of colored markers shown per grid day before collapsing into `+N`.
pub const DAY_MARKER_LIMIT: usize = 3;

/// Luminance above which a background counts as light (0-255 scale).
pub const LIGHT_BACKGROUND_LUMINANCE: f64 = 200.0;
